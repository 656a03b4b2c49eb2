//! Checks shared by every backend, so they reject the same calls.

use crate::geometry::VertexLayout;
use crate::shader::ShaderStage;

use super::{BackendError, BufferId, DrawCall, Primitive, ShaderId};

/// What a backend remembers about a program besides its GPU object.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ProgramInfo {
    pub layout: VertexLayout,
    pub primitive: Primitive,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct VertexArrayInfo {
    pub buffer: BufferId,
    pub layout: VertexLayout,
    pub vertex_count: u64,
}

pub(crate) fn check_stage(
    shader: ShaderId,
    found: ShaderStage,
    expected: ShaderStage,
) -> Result<(), BackendError> {
    if found == expected {
        Ok(())
    } else {
        Err(BackendError::StageMismatch {
            shader,
            expected,
            found,
        })
    }
}

pub(crate) fn check_contents(contents: &[u8]) -> Result<(), BackendError> {
    if contents.is_empty() {
        Err(BackendError::EmptyBuffer)
    } else {
        Ok(())
    }
}

pub(crate) fn vertex_array_info(
    buffer: BufferId,
    buffer_len: u64,
    layout: &VertexLayout,
) -> Result<VertexArrayInfo, BackendError> {
    layout.validate().map_err(BackendError::InvalidLayout)?;
    Ok(VertexArrayInfo {
        buffer,
        layout: layout.clone(),
        vertex_count: layout.vertex_count(buffer_len),
    })
}

pub(crate) fn check_draw(
    call: &DrawCall,
    program: &ProgramInfo,
    vertex_array: &VertexArrayInfo,
) -> Result<(), BackendError> {
    if program.primitive != call.primitive {
        return Err(BackendError::PrimitiveMismatch {
            program: call.program,
            expected: program.primitive,
            found: call.primitive,
        });
    }

    if program.layout != vertex_array.layout {
        return Err(BackendError::LayoutMismatch {
            program: call.program,
            vertex_array: call.vertex_array,
        });
    }

    let end = call.first as u64 + call.count as u64;
    if end > vertex_array.vertex_count {
        return Err(BackendError::DrawOutOfRange {
            first: call.first,
            count: call.count,
            available: vertex_array.vertex_count,
        });
    }

    Ok(())
}
