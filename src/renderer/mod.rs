//! WebGPU rendering module
//!
//! Everything is tessellated on the CPU into pixel-space triangles and
//! drawn with a single pass-through pipeline.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{Flash, SceneOptions, build_scene};
pub use vertex::Vertex;
