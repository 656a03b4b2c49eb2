//! Render backend seam.
//!
//! Every GPU resource is addressed through a typed handle issued by a
//! [`RenderBackend`]. Nothing is bound globally: a [`DrawCall`] names the
//! program and vertex array it uses.
//!
//! Two implementations exist:
//! - [`WgpuBackend`] renders into a window surface through wgpu
//! - [`RecordingBackend`] runs headless and records every call

mod error;
mod handle;
mod recording;
mod validate;
mod wgpu_backend;

pub use error::BackendError;
pub use handle::{BufferId, ProgramId, ShaderId, VertexArrayId};
pub use recording::{Command, RecordingBackend};
pub use wgpu_backend::WgpuBackend;

use crate::coords::Viewport;
use crate::geometry::VertexLayout;
use crate::paint::Color;
use crate::shader::{CompiledShader, LinkedProgram};

/// How vertices of a draw are assembled into primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Triangles,
    Lines,
    Points,
}

/// Expected update frequency of a buffer's contents.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times.
    Static,
}

/// Inputs for creating a program object.
#[derive(Debug, Copy, Clone)]
pub struct ProgramDesc<'a> {
    pub linked: &'a LinkedProgram,
    pub vertex: ShaderId,
    pub fragment: ShaderId,
    pub primitive: Primitive,
}

/// One non-indexed draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DrawCall {
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub primitive: Primitive,
    pub first: u32,
    pub count: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentOutcome {
    Presented,
    /// Nothing reached the screen (zero-sized or temporarily unavailable surface).
    Skipped,
}

/// Operations the setup sequence and frame loop need from a GPU.
///
/// Handles are only valid on the backend that issued them.
pub trait RenderBackend {
    /// Creates a shader object from already compiled source.
    fn create_shader(&mut self, shader: &CompiledShader) -> Result<ShaderId, BackendError>;

    /// Releases a shader object. Programs created from it stay valid.
    fn release_shader(&mut self, id: ShaderId) -> Result<(), BackendError>;

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramId, BackendError>;

    /// Allocates a vertex buffer and uploads `contents` into it.
    fn create_vertex_buffer(
        &mut self,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<BufferId, BackendError>;

    /// Describes how `buffer` is read as vertex attributes.
    fn create_vertex_array(
        &mut self,
        buffer: BufferId,
        layout: &VertexLayout,
    ) -> Result<VertexArrayId, BackendError>;

    /// Adapts the backbuffer to a new framebuffer size. Does not touch the viewport.
    fn resize(&mut self, width: u32, height: u32);

    fn set_viewport(&mut self, viewport: Viewport);

    fn viewport(&self) -> Viewport;

    /// Clears the color buffer of the frame being built.
    fn clear(&mut self, color: Color);

    fn draw(&mut self, call: &DrawCall) -> Result<(), BackendError>;

    /// Finishes the frame and shows it.
    fn present(&mut self) -> Result<PresentOutcome, BackendError>;
}
