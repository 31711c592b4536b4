//! # shapeswarm - GPU particle swarm shaped by a mesh
//!
//! A large population of particles lives in a pair of floating-point
//! textures on the GPU. Every frame a compute pass rewrites each texel from
//! its previous value: it drifts through a bounded turbulence field, gets
//! pushed away from the mouse pointer, and now and then respawns on a point
//! sampled from the surface of a target mesh. Seen from afar the swarm
//! keeps the silhouette of the mesh while constantly boiling.
//!
//! The particles are drawn as additive sprites inside a textured room whose
//! floor receives the swarm's shadow.
//!
//! ## Quick Start
//!
//! ```ignore
//! use shapeswarm::prelude::*;
//!
//! fn main() -> Result<(), SwarmError> {
//!     Swarm::new()
//!         .with_text("RUST")
//!         .with_grid(512, 512)
//!         .with_room_textures(RoomTextures::from_dir("media"))
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Origin texture
//!
//! [`OriginTexture`] holds one point per particle, sampled uniformly over
//! the mesh surface by [`SurfaceSampler`]: triangles are picked by area,
//! then a point is placed inside with folded barycentric coordinates. It is
//! uploaded once and never changes.
//!
//! ### State textures
//!
//! Two state textures of the same size are read and written alternately
//! ([`PingPong`]). A texel's `xyz` is a position; `w` is carried along
//! unchanged.
//!
//! ### Update rule
//!
//! The rule lives in `shaders/simulate.wgsl` and, for tests and benchmarks,
//! in [`kernel`] on the CPU. Both share an integer hash, so they respawn
//! exactly the same texels for a given phase.
//!
//! ## Controls
//!
//! | Input | Effect |
//! |-------|--------|
//! | Mouse move | Pushes particles near the cursor away |
//! | Left drag | Orbits the camera |
//! | Space | Pauses and resumes the simulation |
//! | Escape | Quits |

mod error;
pub mod glyphs;
pub mod gpu;
pub mod input;
pub mod kernel;
pub mod mesh;
pub mod pointer;
pub mod sampler;
pub mod shaders;
mod simulation;
pub mod state;
pub mod textures;
pub mod time;
pub mod uniforms;
pub mod visuals;

pub use bytemuck;
pub use error::{GpuError, SwarmError, TextureError};
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use gpu::{camera::Camera, SwarmCompute};
pub use kernel::{ReferenceSwarm, SimParams, StepStats};
pub use mesh::{Mesh, Triangle};
pub use pointer::{PointerAttraction, PointerProjector, POINTER_SENTINEL};
pub use sampler::{OriginTexture, SurfaceSampler};
pub use simulation::{text_mesh, Swarm, TEXT_DEPTH, TEXT_SIZE};
pub use state::{GridSize, PingPong};
pub use textures::{FaceImage, RoomFace, RoomTextures};
pub use time::Time;
pub use uniforms::FrameContext;
pub use visuals::{Lighting, Shading, ShadowSettings};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use shapeswarm::prelude::*;
/// ```
///
/// This imports the [`Swarm`] builder, the mesh types, the scene settings
/// and the glam vector types.
pub mod prelude {
    pub use crate::error::SwarmError;
    pub use crate::input::{Input, KeyCode, MouseButton};
    pub use crate::kernel::SimParams;
    pub use crate::mesh::{Mesh, Triangle};
    pub use crate::simulation::Swarm;
    pub use crate::textures::{FaceImage, RoomFace, RoomTextures};
    pub use crate::time::Time;
    pub use crate::visuals::{Lighting, Shading, ShadowSettings};
    pub use crate::{Vec2, Vec3, Vec4};
}
