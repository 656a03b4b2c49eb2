use std::fmt;

use super::ShaderStage;

/// Compile or link failure, carrying the full diagnostic log.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ShaderError {
    Compile { stage: ShaderStage, log: String },
    Link { log: String },
}

impl ShaderError {
    /// Diagnostic text produced by the compiler or linker.
    pub fn log(&self) -> &str {
        match self {
            ShaderError::Compile { log, .. } | ShaderError::Link { log } => log,
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Compile { stage, log } => {
                write!(f, "{stage} shader compilation failed:\n{log}")
            }
            ShaderError::Link { log } => write!(f, "program link failed:\n{log}"),
        }
    }
}

impl std::error::Error for ShaderError {}
