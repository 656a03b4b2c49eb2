//! Shader compilation and program linking.
//!
//! Both steps run on the CPU against naga's IR, so a shader pair can be
//! checked before any GPU object exists. Backends only ever receive shaders
//! that compiled and programs that linked.

mod compile;
mod error;
mod link;
mod stage;

pub use compile::{compile, CompiledShader};
pub use error::ShaderError;
pub use link::{link, LinkedProgram};
pub use stage::ShaderStage;

/// Vertex stage of the triangle program: forwards the position attribute.
pub const TRIANGLE_VERTEX_SOURCE: &str = include_str!("shaders/triangle.vert.wgsl");

/// Fragment stage of the triangle program: constant orange.
pub const TRIANGLE_FRAGMENT_SOURCE: &str = include_str!("shaders/triangle.frag.wgsl");
