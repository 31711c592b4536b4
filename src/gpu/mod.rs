//! GPU resources: device setup, the headless compute path and the
//! windowed renderer.

pub mod camera;
mod particles;
mod room;
mod shadow;
mod simulate;
mod state_store;

use std::sync::Arc;

use glam::Vec4;
use winit::window::Window;

pub use camera::Camera;
pub use particles::{ParticleRenderer, ADDITIVE_BLEND};
pub use room::{room_vertices, Room, RoomVertex, ROOM_SIZE};
pub use shadow::{ShadowDepthPass, SHADOW_FORMAT};
pub use simulate::SimulationPass;
pub use state_store::{StateStore, StateTexture, STATE_FORMAT};

use crate::error::GpuError;
use crate::kernel::SimParams;
use crate::pointer::PointerAttraction;
use crate::sampler::OriginTexture;
use crate::state::GridSize;
use crate::textures::RoomTextures;
use crate::uniforms::{FrameContext, ParticleUniforms, RoomUniforms, SimUniforms};
use crate::visuals::{Lighting, Shading, ShadowSettings};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Adapter, device and queue.
async fn request_device(
    instance: &wgpu::Instance,
    compatible_surface: Option<&wgpu::Surface<'_>>,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), GpuError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(GpuError::NoAdapter)?;

    let info = adapter.get_info();
    log::info!("using adapter {} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await?;

    device.on_uncaptured_error(Box::new(|e: wgpu::Error| log::error!("uncaptured wgpu error: {}", e)));

    Ok((adapter, device, queue))
}

fn new_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    })
}

/// Run `build` inside a validation error scope.
///
/// Shader compile and pipeline errors become [`GpuError::Validation`]
/// instead of reaching the uncaptured error handler.
async fn validated<T>(device: &wgpu::Device, build: impl FnOnce() -> T) -> Result<T, GpuError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    match device.pop_error_scope().await {
        Some(e) => Err(GpuError::Validation(e.to_string())),
        None => Ok(value),
    }
}

/// Surface-less simulation: state store and compute pass only.
///
/// Steps the swarm on the GPU and reads the result back, for tests and
/// offline tools.
pub struct SwarmCompute {
    device: wgpu::Device,
    queue: wgpu::Queue,
    store: StateStore,
    simulation: SimulationPass,
    params: SimParams,
}

impl SwarmCompute {
    /// Blocking constructor.
    pub fn new(origin: &OriginTexture, params: SimParams) -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async(origin, params))
    }

    pub async fn new_async(origin: &OriginTexture, params: SimParams) -> Result<Self, GpuError> {
        let instance = new_instance();
        let (_adapter, device, queue) = request_device(&instance, None).await?;

        let (store, simulation) = validated(&device, || {
            let store = StateStore::new(&device, &queue, origin);
            let simulation = SimulationPass::new(&device, &store);
            (store, simulation)
        })
        .await?;

        Ok(Self {
            device,
            queue,
            store,
            simulation,
            params,
        })
    }

    pub fn grid(&self) -> GridSize {
        self.store.grid()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Advance one step and submit it.
    pub fn step(&mut self, phase: f32, pointer: &PointerAttraction) {
        let uniforms = SimUniforms::from_parts(phase, pointer, &self.params, self.store.grid());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Compute Encoder"),
            });
        self.simulation
            .encode(&self.queue, &mut encoder, &mut self.store, &uniforms);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Current state in raster order. Blocks.
    pub fn read_current(&self) -> Result<Vec<Vec4>, GpuError> {
        self.store.read_current(&self.device, &self.queue)
    }
}

/// Scene configuration handed to [`GpuState::new`].
#[derive(Debug, Clone, Default)]
pub struct SceneSettings {
    pub params: SimParams,
    pub shading: Shading,
    pub shadow: ShadowSettings,
    pub lighting: Lighting,
    pub room: RoomTextures,
}

/// Windowed renderer: surface, simulation, shadow map, room and sprites.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    store: StateStore,
    simulation: SimulationPass,
    shadow: ShadowDepthPass,
    room: Room,
    particles: ParticleRenderer,
    settings: SceneSettings,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        origin: &OriginTexture,
        settings: SceneSettings,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = new_instance();
        let surface = instance.create_surface(window)?;
        let (adapter, device, queue) = request_device(&instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(GpuError::SurfaceUnsupported)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let (store, simulation, shadow, room, particles) = validated(&device, || {
            let store = StateStore::new(&device, &queue, origin);
            let simulation = SimulationPass::new(&device, &store);
            let shadow = ShadowDepthPass::new(&device, &settings.shadow, &store);
            let room = Room::new(&device, &queue, surface_format, &settings.room, &shadow);
            let particles = ParticleRenderer::new(&device, surface_format, &store);
            (store, simulation, shadow, room, particles)
        })
        .await?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            store,
            simulation,
            shadow,
            room,
            particles,
            settings,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Reconfigure with the current size, after `SurfaceError::Lost`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn grid(&self) -> GridSize {
        self.store.grid()
    }

    pub fn shading(&self) -> &Shading {
        &self.settings.shading
    }

    /// Replace the sprite shading; takes effect next frame.
    pub fn set_shading(&mut self, shading: Shading) {
        self.settings.shading = shading;
    }

    /// One frame: simulate, shadow, room, sprites.
    pub fn render(&mut self, ctx: &FrameContext) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        if ctx.advance {
            let uniforms = SimUniforms::new(ctx, &self.settings.params, self.store.grid());
            self.simulation
                .encode(&self.queue, &mut encoder, &mut self.store, &uniforms);
        }

        self.shadow.encode(&mut encoder, &self.store);

        self.room.update_uniforms(
            &self.queue,
            &RoomUniforms::new(ctx, &self.settings.shadow, &self.settings.lighting),
        );
        self.particles.update_uniforms(
            &self.queue,
            &ParticleUniforms::new(ctx, &self.settings.shading, self.store.grid()),
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Opaque room first, then additive sprites tested against it.
            self.room.draw(&mut render_pass);
            self.particles.draw(&mut render_pass, &self.store);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
