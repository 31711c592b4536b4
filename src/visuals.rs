//! Shading, shadow and lighting settings.
//!
//! These control how the swarm looks, separate from the simulation
//! constants in [`SimParams`](crate::SimParams) that control how it moves.
//!
//! ```ignore
//! Swarm::new()
//!     .with_text("RUST")
//!     .with_shading(
//!         Shading::default()
//!             .with_base_color(Vec3::new(0.08, 0.11, 0.5))
//!             .with_position_gain(Vec3::new(0.17, 0.29, 4.0)),
//!     )
//!     .run()?;
//! ```

use glam::{Mat4, Vec3};

/// Allowed range for each base color channel.
pub const BASE_COLOR_RANGE: (f32, f32) = (0.0, 2.0);
/// Allowed range for each position gain channel.
pub const POSITION_GAIN_RANGE: (f32, f32) = (0.0, 10.0);
/// Suggested control increments for the position gain channels. Blue is
/// coarser because depth varies least across the shape.
pub const POSITION_GAIN_STEP: [f32; 3] = [0.01, 0.01, 0.1];
/// Suggested control increment for base color channels.
pub const BASE_COLOR_STEP: f32 = 0.01;

/// Particle sprite shading.
///
/// Color is `base_color + position * position_gain`; alpha fades from 1 at
/// `fade_near` to 0 at `fade_far` (view-space depth).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    pub base_color: Vec3,
    pub position_gain: Vec3,
    /// Sprite size in pixels at unit depth, before the pixel ratio.
    pub point_size: f32,
    /// Sprites never shrink below this many pixels.
    pub min_point_size: f32,
    pub fade_near: f32,
    pub fade_far: f32,
}

impl Shading {
    /// Set the base color, clamped to [`BASE_COLOR_RANGE`].
    pub fn with_base_color(mut self, color: Vec3) -> Self {
        self.set_base_color(color);
        self
    }

    /// Set the position gain, clamped to [`POSITION_GAIN_RANGE`].
    pub fn with_position_gain(mut self, gain: Vec3) -> Self {
        self.set_position_gain(gain);
        self
    }

    pub fn with_point_size(mut self, size: f32) -> Self {
        self.point_size = size.max(0.0);
        self
    }

    pub fn set_base_color(&mut self, color: Vec3) {
        self.base_color = color.clamp(Vec3::splat(BASE_COLOR_RANGE.0), Vec3::splat(BASE_COLOR_RANGE.1));
    }

    pub fn set_position_gain(&mut self, gain: Vec3) {
        self.position_gain =
            gain.clamp(Vec3::splat(POSITION_GAIN_RANGE.0), Vec3::splat(POSITION_GAIN_RANGE.1));
    }

    /// CPU copy of the sprite color, for tests and tooling.
    pub fn color_at(&self, position: Vec3) -> Vec3 {
        self.base_color + position * self.position_gain
    }

    /// CPU copy of the distance fade.
    pub fn fade_at(&self, view_depth: f32) -> f32 {
        let t = ((view_depth - self.fade_near) / (self.fade_far - self.fade_near)).clamp(0.0, 1.0);
        1.0 - t * t * (3.0 - 2.0 * t)
    }

    /// On-screen sprite size in pixels for a given view depth.
    pub fn sprite_pixels(&self, view_depth: f32, pixel_ratio: f32) -> f32 {
        (self.point_size * pixel_ratio / view_depth.max(1e-3)).max(self.min_point_size)
    }
}

impl Default for Shading {
    fn default() -> Self {
        Self {
            base_color: Vec3::new(0.08, 0.11, 0.5),
            position_gain: Vec3::new(0.17, 0.29, 4.0),
            point_size: 1.5,
            min_point_size: 1.0,
            fade_near: 1.0,
            fade_far: 10.24,
        }
    }
}

/// Shadow-casting light and depth pass settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Square shadow map resolution.
    pub map_size: u32,
    pub light_position: Vec3,
    pub light_target: Vec3,
    /// Orthographic extents: left, right, bottom, top.
    pub extents: [f32; 4],
    pub near: f32,
    pub far: f32,
    /// Sprites are cut to a disc of this radius (quad half-size = 1).
    pub disc_radius: f32,
    /// Sprite size in shadow-map texels.
    pub point_size: f32,
    /// Depth bias applied by receivers.
    pub bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 1024,
            light_position: Vec3::new(0.0, 2.0, 0.0),
            light_target: Vec3::ZERO,
            extents: [-5.12, 5.12, -1.28, 1.28],
            near: 0.5,
            far: 500.0,
            disc_radius: 0.4,
            point_size: 3.0,
            bias: 0.002,
        }
    }
}

impl ShadowSettings {
    /// Light view looking from `light_position` to `light_target`. Up is
    /// -Z so a light straight above the origin stays well defined.
    pub fn light_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.light_position, self.light_target, Vec3::NEG_Z)
    }

    pub fn light_projection(&self) -> Mat4 {
        let [left, right, bottom, top] = self.extents;
        Mat4::orthographic_rh(left, right, bottom, top, self.near, self.far)
    }

    pub fn light_view_proj(&self) -> Mat4 {
        self.light_projection() * self.light_view()
    }

    /// Unit direction the light travels.
    pub fn light_direction(&self) -> Vec3 {
        (self.light_target - self.light_position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Y)
    }
}

/// Directional light split used by the room floor: an unshadowed part and
/// a part that is attenuated by the swarm's shadow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub direct_intensity: f32,
    pub shadowed_intensity: f32,
}

impl Lighting {
    /// Split a total intensity of 1 so that `shadow_intensity` of it casts
    /// shadows.
    pub fn with_shadow_intensity(shadow_intensity: f32) -> Self {
        let s = shadow_intensity.clamp(0.0, 1.0);
        Self {
            direct_intensity: 1.0 - s,
            shadowed_intensity: s,
        }
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::with_shadow_intensity(0.2)
    }
}
