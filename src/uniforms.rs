//! Per-frame context and the uniform blocks uploaded to the shaders.
//!
//! Every frame the window loop builds one immutable [`FrameContext`]; each
//! pass derives its own `#[repr(C)]` block from it. Layouts match the
//! WGSL structs in `src/shaders/` field for field, including padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::kernel::SimParams;
use crate::pointer::PointerAttraction;
use crate::state::GridSize;
use crate::visuals::{Lighting, Shading, ShadowSettings};

/// Everything that varies per frame, captured once and passed down.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Simulation phase, already derived from elapsed time.
    pub phase: f32,
    pub pointer: PointerAttraction,
    pub view: Mat4,
    pub proj: Mat4,
    /// Framebuffer size in physical pixels.
    pub viewport: (u32, u32),
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f32,
    /// Run the simulation step this frame. False while paused.
    pub advance: bool,
}

impl FrameContext {
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0.max(1) as f32 / self.viewport.1.max(1) as f32
    }
}

/// Compute pass block.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SimUniforms {
    /// xyz position, w radius.
    pub pointer: [f32; 4],
    pub phase: f32,
    pub step_size: f32,
    pub respawn_threshold: f32,
    pub repel_gain: f32,
    pub grid: [u32; 2],
    pub _padding: [u32; 2],
}

impl SimUniforms {
    pub fn new(ctx: &FrameContext, params: &SimParams, grid: GridSize) -> Self {
        Self::from_parts(ctx.phase, &ctx.pointer, params, grid)
    }

    /// Build without a camera, for headless stepping.
    pub fn from_parts(
        phase: f32,
        pointer: &PointerAttraction,
        params: &SimParams,
        grid: GridSize,
    ) -> Self {
        Self {
            pointer: pointer.to_array(),
            phase,
            step_size: params.step_size,
            respawn_threshold: params.respawn_threshold,
            repel_gain: params.repel_gain,
            grid: [grid.width, grid.height],
            _padding: [0; 2],
        }
    }
}

/// Particle sprite pass block.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub position_gain: [f32; 4],
    pub viewport: [f32; 2],
    /// Already multiplied by the pixel ratio.
    pub point_size: f32,
    pub min_point_size: f32,
    pub fade_near: f32,
    pub fade_far: f32,
    pub grid_width: u32,
    pub _padding: u32,
}

impl ParticleUniforms {
    pub fn new(ctx: &FrameContext, shading: &Shading, grid: GridSize) -> Self {
        Self {
            view: ctx.view.to_cols_array_2d(),
            proj: ctx.proj.to_cols_array_2d(),
            base_color: shading.base_color.extend(1.0).to_array(),
            position_gain: shading.position_gain.extend(0.0).to_array(),
            viewport: [ctx.viewport.0 as f32, ctx.viewport.1 as f32],
            point_size: shading.point_size * ctx.pixel_ratio,
            min_point_size: shading.min_point_size,
            fade_near: shading.fade_near,
            fade_far: shading.fade_far,
            grid_width: grid.width,
            _padding: 0,
        }
    }
}

/// Shadow depth pass block.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShadowUniforms {
    pub light_view_proj: [[f32; 4]; 4],
    /// Shadow map size in texels.
    pub viewport: [f32; 2],
    pub point_size: f32,
    pub disc_radius: f32,
    pub grid_width: u32,
    // Scalar pads: a vec3 here would be 16-aligned in WGSL.
    pub _pad0: u32,
    pub _pad1: u32,
    pub _pad2: u32,
}

impl ShadowUniforms {
    pub fn new(shadow: &ShadowSettings, grid: GridSize) -> Self {
        let size = shadow.map_size as f32;
        Self {
            light_view_proj: shadow.light_view_proj().to_cols_array_2d(),
            viewport: [size, size],
            point_size: shadow.point_size,
            disc_radius: shadow.disc_radius,
            grid_width: grid.width,
            _pad0: 0,
            _pad1: 0,
            _pad2: 0,
        }
    }
}

/// Room pass block.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RoomUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// Direction toward the light, w unused.
    pub light_dir: [f32; 4],
    /// direct, shadowed, bias, unused.
    pub lighting: [f32; 4],
}

impl RoomUniforms {
    pub fn new(ctx: &FrameContext, shadow: &ShadowSettings, lighting: &Lighting) -> Self {
        let to_light: Vec3 = -shadow.light_direction();
        Self {
            view_proj: ctx.view_proj().to_cols_array_2d(),
            light_view_proj: shadow.light_view_proj().to_cols_array_2d(),
            light_dir: to_light.extend(0.0).to_array(),
            lighting: [
                lighting.direct_intensity,
                lighting.shadowed_intensity,
                shadow.bias,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FrameContext {
        FrameContext {
            phase: 0.5,
            pointer: PointerAttraction::inactive(0.2),
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            viewport: (1280, 720),
            pixel_ratio: 2.0,
            advance: true,
        }
    }

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<SimUniforms>(), 48);
        assert_eq!(std::mem::size_of::<ParticleUniforms>(), 192);
        assert_eq!(std::mem::size_of::<ShadowUniforms>(), 96);
        assert_eq!(std::mem::size_of::<RoomUniforms>(), 160);
    }

    #[test]
    fn test_sim_uniforms_carry_pointer() {
        let u = SimUniforms::new(&ctx(), &SimParams::default(), GridSize::new(4, 8));
        assert_eq!(u.pointer, [100.0, 100.0, 100.0, 0.2]);
        assert_eq!(u.grid, [4, 8]);
        assert_eq!(u.phase, 0.5);
    }

    #[test]
    fn test_point_size_scaled_by_pixel_ratio() {
        let u = ParticleUniforms::new(&ctx(), &Shading::default(), GridSize::default());
        assert_eq!(u.point_size, 3.0);
        assert_eq!(u.viewport, [1280.0, 720.0]);
    }

    #[test]
    fn test_room_light_points_up() {
        let u = RoomUniforms::new(&ctx(), &ShadowSettings::default(), &Lighting::default());
        assert_eq!(u.light_dir, [0.0, 1.0, 0.0, 0.0]);
        assert!((u.lighting[0] - 0.8).abs() < 1e-6);
    }
}
