use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{ShaderError, ShaderStage};

/// WGSL source that parsed, validated, and exposes exactly one entry point of
/// its stage.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    stage: ShaderStage,
    source: String,
    module: naga::Module,
    entry_index: usize,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Name of the stage's entry point function.
    pub fn entry_point(&self) -> &str {
        &self.entry().name
    }

    /// Original WGSL text, handed to the GPU driver when the shader object is created.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }
}

/// Compiles `source` for `stage`.
///
/// On failure the returned error carries the complete diagnostic, with source
/// spans rendered inline.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledShader, ShaderError> {
    let fail = |log: String| ShaderError::Compile { stage, log };

    let module = naga::front::wgsl::parse_str(source).map_err(|e| fail(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(source)))?;

    let mut candidates = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == stage.to_naga());

    let entry_index = match (candidates.next(), candidates.next()) {
        (Some((index, _)), None) => index,
        (None, _) => return Err(fail(format!("no {stage} entry point found"))),
        (Some(_), Some(_)) => {
            return Err(fail(format!(
                "more than one {stage} entry point found; expected exactly one"
            )));
        }
    };

    log::debug!(
        "compiled {stage} shader (entry point `{}`)",
        module.entry_points[entry_index].name
    );

    Ok(CompiledShader {
        stage,
        source: source.to_owned(),
        module,
        entry_index,
    })
}
