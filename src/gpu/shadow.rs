//! Shadow depth pass: the swarm as discs, seen from the shadow light.
//!
//! Uses the same instancing and state fetch as the particle sprites, so a
//! particle's shadow always sits under the particle. The result is a
//! `Depth32Float` map that the room floor samples with a comparison
//! sampler.

use wgpu::util::DeviceExt;

use super::particles::{state_bind_group_layout, state_bind_groups};
use super::state_store::StateStore;
use crate::shaders::SHADOW_WGSL;
use crate::uniforms::ShadowUniforms;
use crate::visuals::ShadowSettings;

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shadow map plus the pipeline that fills it.
pub struct ShadowDepthPass {
    pipeline: wgpu::RenderPipeline,
    bind_groups: [wgpu::BindGroup; 2],
    // Static: the light never moves.
    _uniform_buffer: wgpu::Buffer,
    map_view: wgpu::TextureView,
    compare_sampler: wgpu::Sampler,
    instance_count: u32,
}

impl ShadowDepthPass {
    pub fn new(device: &wgpu::Device, settings: &ShadowSettings, store: &StateStore) -> Self {
        let map_size = settings.map_size.max(1);
        let map = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: map_size,
                height: map_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let map_view = map.create_view(&wgpu::TextureViewDescriptor::default());

        let compare_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Compare Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_WGSL.into()),
        });

        let uniforms = ShadowUniforms::new(settings, store.grid());
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = state_bind_group_layout(device, "Shadow Bind Group Layout");
        let bind_groups = state_bind_groups(
            device,
            &bind_group_layout,
            &uniform_buffer,
            store,
            "Shadow Bind Group",
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
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
            bind_groups,
            _uniform_buffer: uniform_buffer,
            map_view,
            compare_sampler,
            instance_count: store.grid().count(),
        }
    }

    /// Shadow map view, for binding as `texture_depth_2d`.
    pub fn map_view(&self) -> &wgpu::TextureView {
        &self.map_view
    }

    pub fn compare_sampler(&self) -> &wgpu::Sampler {
        &self.compare_sampler
    }

    /// Clear the shadow map and render the current state into it.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, store: &StateStore) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.map_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[store.current_index()], &[]);
        pass.draw(0..6, 0..self.instance_count);
    }
}
