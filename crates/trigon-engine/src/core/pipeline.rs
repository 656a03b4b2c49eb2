use crate::backend::{
    BufferId, BufferUsage, DrawCall, Primitive, ProgramDesc, ProgramId, RenderBackend,
    VertexArrayId,
};
use crate::geometry::{triangle_bytes, Vertex, VertexLayout};
use crate::shader::{self, ShaderStage, TRIANGLE_FRAGMENT_SOURCE, TRIANGLE_VERTEX_SOURCE};

use super::SetupError;

/// Everything needed to build a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineSource<'a> {
    pub vertex_shader: &'a str,
    pub fragment_shader: &'a str,
    /// Tightly packed vertex data, read according to `layout`.
    pub vertices: &'a [u8],
    pub layout: VertexLayout,
    pub primitive: Primitive,
}

impl PipelineSource<'static> {
    /// The orange triangle.
    pub fn triangle() -> Self {
        Self {
            vertex_shader: TRIANGLE_VERTEX_SOURCE,
            fragment_shader: TRIANGLE_FRAGMENT_SOURCE,
            vertices: triangle_bytes(),
            layout: Vertex::layout(),
            primitive: Primitive::Triangles,
        }
    }
}

/// Handles for one program and the geometry it draws.
///
/// Passed explicitly to every draw; nothing is left bound between frames.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pipeline {
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub buffer: BufferId,
    pub primitive: Primitive,
    pub vertex_count: u32,
}

impl Pipeline {
    /// Compiles and links the shaders, creates the program and uploads the
    /// vertex data.
    ///
    /// Shader objects are released once the program exists, or once program
    /// creation failed.
    pub fn build<B>(backend: &mut B, source: &PipelineSource<'_>) -> Result<Self, SetupError>
    where
        B: RenderBackend + ?Sized,
    {
        let vertex_count = geometry_vertex_count(source)?;

        let vs = shader::compile(ShaderStage::Vertex, source.vertex_shader)?;
        let fs = shader::compile(ShaderStage::Fragment, source.fragment_shader)?;
        let linked = shader::link(&vs, &fs, &source.layout)?;

        let vertex = backend.create_shader(&vs)?;
        let fragment = match backend.create_shader(&fs) {
            Ok(id) => id,
            Err(e) => {
                backend.release_shader(vertex)?;
                return Err(e.into());
            }
        };

        let program = backend.create_program(&ProgramDesc {
            linked: &linked,
            vertex,
            fragment,
            primitive: source.primitive,
        });

        backend.release_shader(vertex)?;
        backend.release_shader(fragment)?;
        let program = program?;

        let buffer = backend.create_vertex_buffer(source.vertices, BufferUsage::Static)?;
        let vertex_array = backend.create_vertex_array(buffer, &source.layout)?;

        log::debug!(
            "pipeline ready: {program}, {vertex_array}, {vertex_count} vertices as {:?}",
            source.primitive
        );

        Ok(Self {
            program,
            vertex_array,
            buffer,
            primitive: source.primitive,
            vertex_count,
        })
    }

    /// The single draw issued each frame: every vertex, starting at 0.
    pub fn draw_call(&self) -> DrawCall {
        DrawCall {
            program: self.program,
            vertex_array: self.vertex_array,
            primitive: self.primitive,
            first: 0,
            count: self.vertex_count,
        }
    }
}

fn geometry_vertex_count(source: &PipelineSource<'_>) -> Result<u32, SetupError> {
    source.layout.validate().map_err(SetupError::Geometry)?;

    let len = source.vertices.len() as u64;
    let stride = source.layout.stride;
    if len == 0 {
        return Err(SetupError::Geometry("no vertices".to_string()));
    }
    if len % stride != 0 {
        return Err(SetupError::Geometry(format!(
            "{len} bytes is not a whole number of {stride}-byte vertices"
        )));
    }

    u32::try_from(source.layout.vertex_count(len))
        .map_err(|_| SetupError::Geometry(format!("too many vertices in {len} bytes")))
}
