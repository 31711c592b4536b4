//! Error types for shapeswarm.
//!
//! Initialization and asset failures are surfaced through these types.
//! Per-frame numeric problems never reach them: the simulation kernel
//! resets bad texels in place and the pointer projector holds its last
//! good point.

use std::fmt;

/// Errors that can occur during GPU initialization or readback.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// The adapter reports no usable format for the window surface.
    SurfaceUnsupported,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// A shader or pipeline failed wgpu validation.
    Validation(String),
    /// Failed to map buffer for reading.
    BufferMapping(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::SurfaceUnsupported => write!(f, "Window surface reports no supported texture format"),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::Validation(msg) => write!(f, "GPU validation failed: {}", msg),
            GpuError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while loading room textures.
#[derive(Debug)]
pub enum TextureError {
    /// Failed to decode image file.
    ImageLoad(image::ImageError),
    /// Failed to read file from disk.
    Io(std::io::Error),
    /// Raw pixel data does not match the stated dimensions.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::ImageLoad(e) => write!(f, "Failed to load image: {}", e),
            TextureError::Io(e) => write!(f, "Failed to read texture file: {}", e),
            TextureError::SizeMismatch { expected, actual } => write!(
                f,
                "RGBA data size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::ImageLoad(e) => Some(e),
            TextureError::Io(e) => Some(e),
            TextureError::SizeMismatch { .. } => None,
        }
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::ImageLoad(e)
    }
}

impl From<std::io::Error> for TextureError {
    fn from(e: std::io::Error) -> Self {
        TextureError::Io(e)
    }
}

/// Errors that can occur when running a swarm.
#[derive(Debug)]
pub enum SwarmError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// A room texture could not be loaded.
    Texture(TextureError),
    /// No target shape was provided.
    NoShape,
}

impl fmt::Display for SwarmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwarmError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            SwarmError::Window(e) => write!(f, "Failed to create window: {}", e),
            SwarmError::Gpu(e) => write!(f, "GPU error: {}", e),
            SwarmError::Texture(e) => write!(f, "Texture error: {}", e),
            SwarmError::NoShape => write!(f, "No target shape provided. Use .with_mesh() or .with_text() to set one."),
        }
    }
}

impl std::error::Error for SwarmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SwarmError::EventLoop(e) => Some(e),
            SwarmError::Window(e) => Some(e),
            SwarmError::Gpu(e) => Some(e),
            SwarmError::Texture(e) => Some(e),
            SwarmError::NoShape => None,
        }
    }
}

impl From<winit::error::EventLoopError> for SwarmError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SwarmError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SwarmError {
    fn from(e: winit::error::OsError) -> Self {
        SwarmError::Window(e)
    }
}

impl From<GpuError> for SwarmError {
    fn from(e: GpuError) -> Self {
        SwarmError::Gpu(e)
    }
}

impl From<TextureError> for SwarmError {
    fn from(e: TextureError) -> Self {
        SwarmError::Texture(e)
    }
}
