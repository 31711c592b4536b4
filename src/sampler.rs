//! Area-weighted random sampling of mesh surfaces.
//!
//! The origin texture is filled once at startup: every texel receives one
//! point drawn uniformly over the target mesh's surface. Sampling is two
//! explicit steps:
//!
//! 1. pick a triangle with probability proportional to its area, by binary
//!    search over a prefix sum of areas;
//! 2. pick a point inside it from two uniform numbers, reflecting the pair
//!    when `u + v > 1` so the point stays inside.
//!
//! Zero-area triangles are left out of the prefix sum entirely, so they can
//! never be selected.

use glam::{Vec3, Vec4};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::mesh::Mesh;
use crate::state::GridSize;

/// Area-weighted triangle sampler over a borrowed mesh.
pub struct SurfaceSampler<'a> {
    mesh: &'a Mesh,
    /// `(running area total, triangle index)` for every triangle with
    /// positive, finite area.
    cumulative: Vec<(f64, usize)>,
    total_area: f64,
}

impl<'a> SurfaceSampler<'a> {
    /// Build the prefix sum over triangle areas.
    pub fn new(mesh: &'a Mesh) -> Self {
        let mut total_area = 0.0f64;
        let mut cumulative = Vec::with_capacity(mesh.len());
        for (index, triangle) in mesh.triangles().iter().enumerate() {
            let area = triangle.area() as f64;
            if area.is_finite() && area > 0.0 {
                total_area += area;
                cumulative.push((total_area, index));
            }
        }
        Self {
            mesh,
            cumulative,
            total_area,
        }
    }

    /// Sum of all selectable triangle areas.
    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// True when no triangle has positive area.
    pub fn is_degenerate(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Map a value in `[0, total_area)` to a triangle index.
    ///
    /// Values at or past the end map to the last selectable triangle.
    pub fn pick_triangle(&self, r: f64) -> Option<usize> {
        if self.cumulative.is_empty() {
            return None;
        }
        let slot = self.cumulative.partition_point(|&(running, _)| running <= r);
        let slot = slot.min(self.cumulative.len() - 1);
        Some(self.cumulative[slot].1)
    }

    /// Draw one surface point, or `None` if the mesh has no area.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<Vec3> {
        if self.is_degenerate() {
            return None;
        }
        let triangle_index = self.pick_triangle(rng.gen_range(0.0..self.total_area))?;
        let (u, v) = fold_barycentric(rng.gen(), rng.gen());
        Some(self.mesh.triangles()[triangle_index].point_at(u, v))
    }
}

/// Reflect `(u, v)` back into the lower-left triangle of the unit square.
#[inline]
pub fn fold_barycentric(u: f32, v: f32) -> (f32, f32) {
    if u + v > 1.0 {
        (1.0 - u, 1.0 - v)
    } else {
        (u, v)
    }
}

/// One surface sample per grid texel, in raster order.
///
/// Each texel is `(x, y, z, 0)`. The fourth channel is reserved and always
/// zero.
#[derive(Debug, Clone)]
pub struct OriginTexture {
    grid: GridSize,
    texels: Vec<Vec4>,
}

impl OriginTexture {
    /// Sample `mesh` into a texture using a freshly seeded RNG.
    pub fn from_mesh(mesh: &Mesh, grid: GridSize) -> Self {
        let mut rng = SmallRng::from_entropy();
        Self::from_mesh_with_rng(mesh, grid, &mut rng)
    }

    /// Sample `mesh` with a caller-provided RNG (for reproducible tests).
    ///
    /// A mesh with no surface area does not fail: every texel collapses to
    /// the mesh centroid and a warning is logged.
    pub fn from_mesh_with_rng<R: Rng>(mesh: &Mesh, grid: GridSize, rng: &mut R) -> Self {
        let count = grid.count() as usize;
        let sampler = SurfaceSampler::new(mesh);

        if sampler.is_degenerate() {
            let centroid = mesh.centroid();
            log::warn!(
                "target mesh has no surface area ({} triangles); collapsing {} samples to centroid {:?}",
                mesh.len(),
                count,
                centroid
            );
            return Self::filled(grid, centroid);
        }

        let mut texels = Vec::with_capacity(count);
        for _ in 0..count {
            // `sample` only fails for degenerate samplers, handled above.
            let point = sampler.sample(rng).unwrap_or(Vec3::ZERO);
            texels.push(point.extend(0.0));
        }
        log::debug!(
            "sampled {} origin points over {:.4} units^2 of surface",
            count,
            sampler.total_area()
        );
        Self { grid, texels }
    }

    /// Every texel set to `point`.
    pub fn filled(grid: GridSize, point: Vec3) -> Self {
        Self {
            grid,
            texels: vec![point.extend(0.0); grid.count() as usize],
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    /// Texel at raster position `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.texels[self.grid.index(x, y) as usize]
    }

    /// Raw bytes for upload as an `Rgba32Float` texture.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}
