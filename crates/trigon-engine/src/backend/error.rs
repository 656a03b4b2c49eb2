use std::fmt;

use crate::shader::ShaderStage;

use super::{BufferId, Primitive, ProgramId, ShaderId, VertexArrayId};

/// Rejected backend operation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BackendError {
    UnknownShader(ShaderId),
    UnknownProgram(ProgramId),
    UnknownBuffer(BufferId),
    UnknownVertexArray(VertexArrayId),
    StageMismatch {
        shader: ShaderId,
        expected: ShaderStage,
        found: ShaderStage,
    },
    InvalidLayout(String),
    EmptyBuffer,
    UnsupportedColorTargets(u32),
    LayoutMismatch {
        program: ProgramId,
        vertex_array: VertexArrayId,
    },
    PrimitiveMismatch {
        program: ProgramId,
        expected: Primitive,
        found: Primitive,
    },
    DrawOutOfRange {
        first: u32,
        count: u32,
        available: u64,
    },
    /// The surface cannot be recovered (commonly out of memory).
    SurfaceLost,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::UnknownShader(id) => write!(f, "unknown or released shader {id}"),
            BackendError::UnknownProgram(id) => write!(f, "unknown program {id}"),
            BackendError::UnknownBuffer(id) => write!(f, "unknown buffer {id}"),
            BackendError::UnknownVertexArray(id) => write!(f, "unknown vertex array {id}"),
            BackendError::StageMismatch {
                shader,
                expected,
                found,
            } => write!(f, "{shader} is a {found} shader, expected {expected}"),
            BackendError::InvalidLayout(msg) => write!(f, "invalid vertex layout: {msg}"),
            BackendError::EmptyBuffer => f.write_str("vertex buffer contents are empty"),
            BackendError::UnsupportedColorTargets(n) => {
                write!(f, "program writes {n} color targets; exactly one is supported")
            }
            BackendError::LayoutMismatch {
                program,
                vertex_array,
            } => write!(f, "{vertex_array} layout does not match the layout {program} was linked with"),
            BackendError::PrimitiveMismatch {
                program,
                expected,
                found,
            } => write!(f, "{program} draws {expected:?}, draw call asked for {found:?}"),
            BackendError::DrawOutOfRange {
                first,
                count,
                available,
            } => write!(
                f,
                "draw of {count} vertices from {first} exceeds the {available} available"
            ),
            BackendError::SurfaceLost => f.write_str("render surface lost"),
        }
    }
}

impl std::error::Error for BackendError {}
