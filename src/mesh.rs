//! Triangle meshes used as swarm targets.
//!
//! The swarm only needs a triangle soup: the surface sampler reads each
//! triangle's corners and area, nothing else. Meshes can come from any
//! external source via [`Mesh::from_triangles`], or be generated with
//! [`Mesh::block_text`] for extruded bitmap lettering.
//!
//! ```ignore
//! use shapeswarm::Mesh;
//!
//! let mut mesh = Mesh::block_text("RUST", 1.0, 0.25);
//! mesh.center();
//! ```

use glam::Vec3;

use crate::glyphs::{cell_filled, glyph, GLYPH_COLUMNS, GLYPH_ROWS};

/// A single triangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Surface area. Zero for degenerate triangles.
    #[inline]
    pub fn area(&self) -> f32 {
        0.5 * (self.b - self.a).cross(self.c - self.a).length()
    }

    /// Point from barycentric weights on the `b` and `c` edges.
    #[inline]
    pub fn point_at(&self, u: f32, v: f32) -> Vec3 {
        self.a + (self.b - self.a) * u + (self.c - self.a) * v
    }
}

/// Triangle-soup mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing list of triangles.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Build a mesh from indexed geometry. Index triples that point past
    /// the end of `positions` are skipped.
    pub fn from_indexed(positions: &[Vec3], indices: &[u32]) -> Self {
        let triangles = indices
            .chunks_exact(3)
            .filter_map(|tri| {
                let a = *positions.get(tri[0] as usize)?;
                let b = *positions.get(tri[1] as usize)?;
                let c = *positions.get(tri[2] as usize)?;
                Some(Triangle::new(a, b, c))
            })
            .collect();
        Self { triangles }
    }

    /// Closed axis-aligned box spanning `min..max`.
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let mut mesh = Self::new();
        for face in Face::ALL {
            mesh.push_face(min, max, face);
        }
        mesh
    }

    /// Extruded block lettering built from 5x7 bitmap glyphs.
    ///
    /// `size` is the cap height, `depth` the extrusion along +Z. Only
    /// faces on the outside of the letters are emitted, so the result
    /// has no hidden interior walls for the sampler to waste points on.
    /// Characters without a glyph are skipped but still advance the pen.
    pub fn block_text(text: &str, size: f32, depth: f32) -> Self {
        let cell = size / GLYPH_ROWS as f32;
        let advance = GLYPH_COLUMNS + 1;
        let mut mesh = Self::new();

        for (index, ch) in text.chars().enumerate() {
            let Some(rows) = glyph(ch) else {
                continue;
            };
            let filled = |col: isize, row: isize| {
                col >= 0
                    && row >= 0
                    && (row as usize) < GLYPH_ROWS
                    && cell_filled(&rows, col as usize, row as usize)
            };

            for row in 0..GLYPH_ROWS as isize {
                for col in 0..GLYPH_COLUMNS as isize {
                    if !filled(col, row) {
                        continue;
                    }
                    let x = (index * advance) as f32 * cell + col as f32 * cell;
                    // Row 0 is the top of the glyph.
                    let y = (GLYPH_ROWS as isize - 1 - row) as f32 * cell;
                    let min = Vec3::new(x, y, 0.0);
                    let max = Vec3::new(x + cell, y + cell, depth);

                    mesh.push_face(min, max, Face::Front);
                    mesh.push_face(min, max, Face::Back);
                    if !filled(col - 1, row) {
                        mesh.push_face(min, max, Face::Left);
                    }
                    if !filled(col + 1, row) {
                        mesh.push_face(min, max, Face::Right);
                    }
                    if !filled(col, row - 1) {
                        mesh.push_face(min, max, Face::Top);
                    }
                    if !filled(col, row + 1) {
                        mesh.push_face(min, max, Face::Bottom);
                    }
                }
            }
        }
        mesh
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Append all triangles of another mesh.
    pub fn extend(&mut self, other: &Mesh) {
        self.triangles.extend_from_slice(&other.triangles);
    }

    /// Total surface area.
    pub fn area(&self) -> f32 {
        self.triangles.iter().map(Triangle::area).sum()
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.triangles.first()?.a;
        let bounds = self
            .triangles
            .iter()
            .flat_map(|t| [t.a, t.b, t.c])
            .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(bounds)
    }

    /// Average of all triangle corners. The origin for an empty mesh.
    pub fn centroid(&self) -> Vec3 {
        if self.triangles.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = self.triangles.iter().map(|t| t.a + t.b + t.c).sum();
        sum / (self.triangles.len() * 3) as f32
    }

    /// Move every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for t in &mut self.triangles {
            t.a += offset;
            t.b += offset;
            t.c += offset;
        }
    }

    /// Translate so the bounding box is centered on the origin.
    pub fn center(&mut self) {
        if let Some((lo, hi)) = self.bounds() {
            self.translate(-(lo + hi) * 0.5);
        }
    }

    fn push_face(&mut self, min: Vec3, max: Vec3, face: Face) {
        let corner = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        // Quads wound counter-clockwise when viewed from outside.
        let [p0, p1, p2, p3] = match face {
            Face::Front => [
                corner(false, false, true),
                corner(true, false, true),
                corner(true, true, true),
                corner(false, true, true),
            ],
            Face::Back => [
                corner(true, false, false),
                corner(false, false, false),
                corner(false, true, false),
                corner(true, true, false),
            ],
            Face::Left => [
                corner(false, false, false),
                corner(false, false, true),
                corner(false, true, true),
                corner(false, true, false),
            ],
            Face::Right => [
                corner(true, false, true),
                corner(true, false, false),
                corner(true, true, false),
                corner(true, true, true),
            ],
            Face::Top => [
                corner(false, true, true),
                corner(true, true, true),
                corner(true, true, false),
                corner(false, true, false),
            ],
            Face::Bottom => [
                corner(false, false, false),
                corner(true, false, false),
                corner(true, false, true),
                corner(false, false, true),
            ],
        };
        self.triangles.push(Triangle::new(p0, p1, p2));
        self.triangles.push(Triangle::new(p0, p2, p3));
    }
}

#[derive(Clone, Copy)]
enum Face {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl Face {
    const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
        Face::Top,
        Face::Bottom,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_area() {
        let mesh = Mesh::cuboid(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.len(), 12);
        // 2 * (1*2 + 2*3 + 1*3)
        assert!((mesh.area() - 22.0).abs() < 1e-4);
    }

    #[test]
    fn test_center_moves_bounds_to_origin() {
        let mut mesh = Mesh::cuboid(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 5.0, 2.0));
        mesh.center();
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo + hi).length() < 1e-5);
    }

    #[test]
    fn test_block_text_has_no_interior_faces() {
        // 'I' top row is three adjacent cells; a naive cuboid per cell
        // would produce 3 * 12 triangles for that row alone.
        let row = Mesh::block_text("-", 7.0, 1.0);
        // One 5x1 bar: front + back = 5 cells * 2 faces * 2 tris,
        // top + bottom = 5 * 2 * 2, two end caps = 2 * 2.
        assert_eq!(row.len(), 20 + 20 + 4);
        assert!((row.area() - (5.0 * 2.0 + 5.0 * 2.0 + 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_block_text_skips_unknown_and_spaces() {
        assert!(Mesh::block_text("  ", 1.0, 0.25).is_empty());
        assert!(Mesh::block_text("@", 1.0, 0.25).is_empty());
        assert!(!Mesh::block_text("A", 1.0, 0.25).is_empty());
    }

    #[test]
    fn test_block_text_height_matches_size() {
        let mesh = Mesh::block_text("H", 1.0, 0.25);
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((hi.y - lo.y - 1.0).abs() < 1e-5);
        assert!((hi.z - lo.z - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_from_indexed_skips_bad_indices() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let mesh = Mesh::from_indexed(&positions, &[0, 1, 2, 0, 1, 9]);
        assert_eq!(mesh.len(), 1);
    }

    #[test]
    fn test_empty_mesh_centroid_is_origin() {
        assert_eq!(Mesh::new().centroid(), Vec3::ZERO);
        assert!(Mesh::new().bounds().is_none());
    }
}
