//! CPU-side Resources
//!
//! Mesh data and procedural primitives, independent of the GPU:
//! - [`MeshData`]: indexed position/normal meshes
//! - [`primitives`]: sphere and plane generators

pub mod geometry;
pub mod primitives;

pub use geometry::{MeshData, Vertex};
