//! Cursor-to-world projection for the pointer repulsion.
//!
//! Each frame the cursor (in normalized device coordinates) is turned into
//! a ray from the camera and intersected with the world plane `z = 0`. The
//! hit point plus a fixed radius becomes the [`PointerAttraction`] fed to
//! the simulation.
//!
//! ```ignore
//! let mut projector = PointerProjector::new(0.2);
//! projector.set_cursor(input.mouse_ndc());
//! let pointer = projector.update(camera.view_proj(aspect));
//! ```

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Parked position used until the cursor first moves. Far enough from any
/// particle that the repulsion never triggers.
pub const POINTER_SENTINEL: Vec3 = Vec3::new(100.0, 100.0, 100.0);

/// Smallest `|direction.z|` for which the plane intersection is solved.
const MIN_RAY_DZ: f32 = 1e-6;

/// World-space repulsion point for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerAttraction {
    pub position: Vec3,
    /// Activation radius. Also scales the push strength.
    pub radius: f32,
}

impl PointerAttraction {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }

    /// Pointer parked at [`POINTER_SENTINEL`].
    pub fn inactive(radius: f32) -> Self {
        Self::new(POINTER_SENTINEL, radius)
    }

    /// `(x, y, z, radius)` as uploaded to the GPU.
    pub fn to_array(&self) -> [f32; 4] {
        self.position.extend(self.radius).to_array()
    }
}

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Ray through an NDC point, built by unprojecting it on the near and
    /// far planes (wgpu depth range 0..1).
    pub fn from_ndc(ndc: Vec2, inverse_view_proj: Mat4) -> Self {
        let unproject = |depth: f32| {
            let p = inverse_view_proj * Vec4::new(ndc.x, ndc.y, depth, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        Self {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }

    /// Intersection with the plane `z = 0`, or `None` when the ray runs
    /// parallel to it.
    pub fn intersect_z0(&self) -> Option<Vec3> {
        if self.direction.z.abs() < MIN_RAY_DZ {
            return None;
        }
        let k = -self.origin.z / self.direction.z;
        let hit = self.origin + self.direction * k;
        hit.is_finite().then_some(hit)
    }
}

/// Tracks the cursor and produces the per-frame pointer.
#[derive(Debug, Clone)]
pub struct PointerProjector {
    radius: f32,
    cursor: Option<Vec2>,
    last: Vec3,
}

impl PointerProjector {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            cursor: None,
            last: POINTER_SENTINEL,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    /// Record the latest cursor position in NDC.
    pub fn set_cursor(&mut self, ndc: Vec2) {
        self.cursor = Some(ndc);
    }

    /// Whether the cursor has ever been reported.
    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    /// Project the cursor for this frame.
    ///
    /// Keeps the previous point when the ray is parallel to the plane, and
    /// stays at the sentinel until a cursor position arrives.
    pub fn update(&mut self, view_proj: Mat4) -> PointerAttraction {
        if let Some(ndc) = self.cursor {
            let ray = Ray::from_ndc(ndc, view_proj.inverse());
            if let Some(hit) = ray.intersect_z0() {
                self.last = hit;
            }
        }
        PointerAttraction::new(self.last, self.radius)
    }
}

impl Default for PointerProjector {
    fn default() -> Self {
        Self::new(0.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn front_view_proj() -> Mat4 {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(50f32.to_radians(), 1.0, 1.0, 1024.0);
        proj * view
    }

    #[test]
    fn test_sentinel_until_cursor_moves() {
        let mut projector = PointerProjector::new(0.2);
        let pointer = projector.update(front_view_proj());
        assert_eq!(pointer.position, POINTER_SENTINEL);
        assert_eq!(pointer.radius, 0.2);
    }

    #[test]
    fn test_center_cursor_hits_origin() {
        let mut projector = PointerProjector::new(0.2);
        projector.set_cursor(Vec2::ZERO);
        let pointer = projector.update(front_view_proj());
        assert!(pointer.position.length() < 1e-3, "{:?}", pointer.position);
    }

    #[test]
    fn test_hit_lies_on_plane() {
        let mut projector = PointerProjector::new(0.2);
        projector.set_cursor(Vec2::new(0.5, -0.25));
        let pointer = projector.update(front_view_proj());
        assert!(pointer.position.z.abs() < 1e-3);
        assert!(pointer.position.x > 0.0);
        assert!(pointer.position.y < 0.0);
    }

    #[test]
    fn test_parallel_ray_holds_previous_point() {
        let mut projector = PointerProjector::new(0.2);
        projector.set_cursor(Vec2::ZERO);
        let first = projector.update(front_view_proj());

        // Camera looking along -X lies in a plane parallel to z = 0.
        let view = Mat4::look_at_rh(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(50f32.to_radians(), 1.0, 1.0, 1024.0);
        let held = projector.update(proj * view);
        assert_eq!(held.position, first.position);
        assert!(held.position.is_finite());
    }

    #[test]
    fn test_intersect_formula() {
        let ray = Ray {
            origin: Vec3::new(1.0, 2.0, 4.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert_eq!(ray.intersect_z0(), Some(Vec3::new(1.0, 2.0, 0.0)));
    }
}
