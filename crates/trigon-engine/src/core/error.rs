use std::fmt;

use crate::backend::BackendError;
use crate::shader::ShaderError;

/// Failure while building the pipeline. Setup never partially succeeds:
/// no frame is drawn after one of these.
#[derive(Debug)]
pub enum SetupError {
    Shader(ShaderError),
    Backend(BackendError),
    /// Vertex data does not fit the declared layout.
    Geometry(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Shader(_) => f.write_str("shader setup failed"),
            SetupError::Backend(_) => f.write_str("backend rejected setup"),
            SetupError::Geometry(msg) => write!(f, "invalid vertex data: {msg}"),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Shader(e) => Some(e),
            SetupError::Backend(e) => Some(e),
            SetupError::Geometry(_) => None,
        }
    }
}

impl From<ShaderError> for SetupError {
    fn from(e: ShaderError) -> Self {
        SetupError::Shader(e)
    }
}

impl From<BackendError> for SetupError {
    fn from(e: BackendError) -> Self {
        SetupError::Backend(e)
    }
}
