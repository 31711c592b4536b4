//! The room the swarm floats in: an inward-facing textured box.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

use super::shadow::ShadowDepthPass;
use super::DEPTH_FORMAT;
use crate::shaders::ROOM_WGSL;
use crate::textures::{RoomFace, RoomTextures, LAYER_SIZE};
use crate::uniforms::RoomUniforms;

/// Room extents: width, height, depth.
pub const ROOM_SIZE: Vec3 = Vec3::new(10.24, 4.0, 10.24);

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RoomVertex {
    pub position: [f32; 3],
    /// Points into the room.
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub layer: u32,
    /// 1 for faces that receive light and shadow.
    pub lit: u32,
}

impl RoomVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2, 3 => Uint32, 4 => Uint32];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RoomVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two triangles per face, six faces, centered on the origin.
pub fn room_vertices(size: Vec3) -> Vec<RoomVertex> {
    let half = size * 0.5;
    // (inward normal, u axis, v axis, material)
    let faces = [
        (Vec3::NEG_X, Vec3::Z, Vec3::Y, RoomFace::Side),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y, RoomFace::Side),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z, RoomFace::Ceiling),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z, RoomFace::Floor),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y, RoomFace::Back),
        (Vec3::Z, Vec3::X, Vec3::Y, RoomFace::Back),
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, u_axis, v_axis, face) in faces {
        let center = -normal * half;
        let extent_u = (u_axis * half).length();
        let extent_v = (v_axis * half).length();
        let corner = |s: f32, t: f32| {
            let position = center + u_axis * extent_u * s + v_axis * extent_v * t;
            let uv = Vec2::new(s * 0.5 + 0.5, 0.5 - t * 0.5);
            RoomVertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: uv.to_array(),
                layer: face.layer(),
                lit: u32::from(face == RoomFace::Floor),
            }
        };
        let quad = [corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)];
        vertices.extend_from_slice(&[quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]);
    }
    vertices
}

/// Room geometry, face textures and the floor lighting pipeline.
pub struct Room {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl Room {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        textures: &RoomTextures,
        shadow: &ShadowDepthPass,
    ) -> Self {
        let vertices = room_vertices(ROOM_SIZE);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Room Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let layer_count = RoomFace::ALL.len() as u32;
        let size = wgpu::Extent3d {
            width: LAYER_SIZE,
            height: LAYER_SIZE,
            depth_or_array_layers: layer_count,
        };
        let face_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Room Face Textures"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &face_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &textures.layer_bytes(LAYER_SIZE),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(LAYER_SIZE * 4),
                rows_per_image: Some(LAYER_SIZE),
            },
            size,
        );
        let face_view = face_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Room Face Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let face_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Room Face Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Room Uniform Buffer"),
            contents: bytemuck::bytes_of(&<RoomUniforms as Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Room Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Room Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&face_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&face_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(shadow.map_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(shadow.compare_sampler()),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Room Shader"),
            source: wgpu::ShaderSource::Wgsl(ROOM_WGSL.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Room Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Room Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[RoomVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &RoomUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_size() {
        assert_eq!(std::mem::size_of::<RoomVertex>(), 40);
    }

    #[test]
    fn test_room_faces_inward_and_bounded() {
        let vertices = room_vertices(ROOM_SIZE);
        assert_eq!(vertices.len(), 36);
        let half = ROOM_SIZE * 0.5 + Vec3::splat(1e-5);
        for v in &vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!(p.abs().cmple(half).all(), "{:?}", p);
            // Inward: the normal points from the wall toward the center.
            assert!(n.dot(-p) > 0.0);
        }
    }

    #[test]
    fn test_only_floor_is_lit() {
        let vertices = room_vertices(ROOM_SIZE);
        for v in vertices {
            let is_floor = v.layer == RoomFace::Floor.layer();
            assert_eq!(v.lit == 1, is_floor);
            if is_floor {
                assert!((v.position[1] + 2.0).abs() < 1e-6);
            }
        }
    }
}
