//! Ping-pong position textures plus the immutable origin texture.

use glam::Vec4;

use crate::error::GpuError;
use crate::sampler::OriginTexture;
use crate::state::{GridSize, PingPong};

/// Texel format of every state texture: one `vec4<f32>` per particle.
pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

const BYTES_PER_TEXEL: u32 = 16;

/// A state texture and its default view.
pub struct StateTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl StateTexture {
    fn new(device: &wgpu::Device, grid: GridSize, label: &str, usage: wgpu::TextureUsages) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(grid),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    fn upload(&self, queue: &wgpu::Queue, grid: GridSize, bytes: &[u8]) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(grid.width * BYTES_PER_TEXEL),
                rows_per_image: Some(grid.height),
            },
            extent(grid),
        );
    }
}

fn extent(grid: GridSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: grid.width,
        height: grid.height,
        depth_or_array_layers: 1,
    }
}

/// Owns the two position textures and decides which one is current.
///
/// Both are seeded from the origin so the first frame reads defined data.
/// The simulation reads the current texture and writes the other; the
/// renderers only ever read [`current`](Self::current).
pub struct StateStore {
    grid: GridSize,
    textures: PingPong<StateTexture>,
    origin: StateTexture,
}

impl StateStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, origin: &OriginTexture) -> Self {
        let grid = origin.grid();
        let state_usage = wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC;

        let a = StateTexture::new(device, grid, "State Texture A", state_usage);
        let b = StateTexture::new(device, grid, "State Texture B", state_usage);
        let origin_texture = StateTexture::new(
            device,
            grid,
            "Origin Texture",
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );

        let bytes = origin.as_bytes();
        origin_texture.upload(queue, grid, bytes);
        a.upload(queue, grid, bytes);
        b.upload(queue, grid, bytes);

        log::info!(
            "state store: {}x{} ({} particles)",
            grid.width,
            grid.height,
            grid.count()
        );

        Self {
            grid,
            textures: PingPong::new(a, b),
            origin: origin_texture,
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// The texture last written by a completed step.
    pub fn current(&self) -> &StateTexture {
        self.textures.current()
    }

    pub fn current_index(&self) -> usize {
        self.textures.current_index()
    }

    pub fn write_index(&self) -> usize {
        self.textures.write_index()
    }

    /// Both state textures, in index order.
    pub fn textures(&self) -> &[StateTexture; 2] {
        self.textures.buffers()
    }

    pub fn origin(&self) -> &StateTexture {
        &self.origin
    }

    /// Run `f(read_index, write_index)` once and make the written
    /// texture current. Indices address pre-built bind groups.
    pub fn step_indexed<R>(&mut self, f: impl FnOnce(usize, usize) -> R) -> R {
        self.textures.step_indexed(f)
    }

    /// Copy the current texture back to the CPU in raster order.
    ///
    /// Blocks until the GPU is done.
    pub fn read_current(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<Vec4>, GpuError> {
        let row_bytes = self.grid.width * BYTES_PER_TEXEL;
        let padded_row_bytes = row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let buffer_size = padded_row_bytes as u64 * self.grid.height as u64;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("State Readback Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("State Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.current().texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    // Rows must be aligned to COPY_BYTES_PER_ROW_ALIGNMENT (256)
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(self.grid.height),
                },
            },
            extent(self.grid),
        );
        queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(GpuError::BufferMapping(e.to_string())),
            Err(e) => return Err(GpuError::BufferMapping(e.to_string())),
        }

        let mut texels = Vec::with_capacity(self.grid.count() as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(padded_row_bytes as usize) {
                texels.extend(
                    row[..row_bytes as usize]
                        .chunks_exact(BYTES_PER_TEXEL as usize)
                        .map(|texel| Vec4::from_array(bytemuck::pod_read_unaligned(texel))),
                );
            }
        }
        staging.unmap();
        Ok(texels)
    }
}
