//! CPU-side vertex data and its memory layout description.

mod triangle;
mod vertex;

pub use triangle::{triangle_bytes, TRIANGLE};
pub use vertex::{Vertex, VertexAttribute, VertexFormat, VertexLayout};
