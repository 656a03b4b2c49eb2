use crate::geometry::{VertexFormat, VertexLayout};

use super::{CompiledShader, ShaderError, ShaderStage};

/// Vertex/fragment pair whose stage interfaces were checked against each other
/// and against the vertex layout that will feed them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LinkedProgram {
    vertex_entry: String,
    fragment_entry: String,
    layout: VertexLayout,
    color_targets: u32,
}

impl LinkedProgram {
    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    /// Layout the vertex stage was linked against.
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Number of color outputs written by the fragment stage.
    pub fn color_targets(&self) -> u32 {
        self.color_targets
    }
}

/// Links a vertex and a fragment shader into one program description.
///
/// All interface problems are collected into a single log rather than
/// stopping at the first one.
pub fn link(
    vertex: &CompiledShader,
    fragment: &CompiledShader,
    layout: &VertexLayout,
) -> Result<LinkedProgram, ShaderError> {
    let mut problems: Vec<String> = Vec::new();

    if vertex.stage() != ShaderStage::Vertex {
        problems.push(format!(
            "shader attached as the vertex stage is a {} shader",
            vertex.stage()
        ));
    }
    if fragment.stage() != ShaderStage::Fragment {
        problems.push(format!(
            "shader attached as the fragment stage is a {} shader",
            fragment.stage()
        ));
    }
    if !problems.is_empty() {
        return Err(ShaderError::Link {
            log: problems.join("\n"),
        });
    }

    if let Err(e) = layout.validate() {
        problems.push(format!("invalid vertex layout: {e}"));
    }

    let vs_in = Interface::inputs(vertex);
    let vs_out = Interface::outputs(vertex);
    let fs_in = Interface::inputs(fragment);
    let fs_out = Interface::outputs(fragment);

    if !vs_out.position {
        problems.push(format!(
            "vertex entry point `{}` does not write @builtin(position)",
            vertex.entry_point()
        ));
    }

    for (location, ty) in &fs_in.locations {
        match vs_out.get(*location) {
            None => problems.push(format!(
                "fragment input at location {location} is not written by the vertex stage"
            )),
            Some(out) if out != ty => problems.push(format!(
                "location {location}: vertex stage writes {} but fragment stage reads {}",
                describe(out),
                describe(ty)
            )),
            Some(_) => {}
        }
    }

    for (location, ty) in &vs_in.locations {
        match layout.attribute(*location) {
            None => problems.push(format!(
                "vertex input at location {location} has no attribute in the vertex layout"
            )),
            Some(attr) => {
                // Component counts may differ; missing components are filled
                // in by vertex fetch. Only the scalar type has to agree.
                let provided = attribute_type(attr.format);
                if scalar_of(&provided) != scalar_of(ty) {
                    problems.push(format!(
                        "location {location}: vertex layout provides {} but the shader reads {}",
                        describe(&provided),
                        describe(ty)
                    ));
                }
            }
        }
    }

    if fs_out.locations.is_empty() {
        problems.push(format!(
            "fragment entry point `{}` writes no color output",
            fragment.entry_point()
        ));
    } else if fs_out.get(0).is_none() {
        problems.push(format!(
            "fragment entry point `{}` does not write color target 0",
            fragment.entry_point()
        ));
    }

    if !problems.is_empty() {
        return Err(ShaderError::Link {
            log: problems.join("\n"),
        });
    }

    log::debug!(
        "linked program `{}` + `{}` ({} color target(s))",
        vertex.entry_point(),
        fragment.entry_point(),
        fs_out.locations.len()
    );

    Ok(LinkedProgram {
        vertex_entry: vertex.entry_point().to_owned(),
        fragment_entry: fragment.entry_point().to_owned(),
        layout: layout.clone(),
        color_targets: fs_out.locations.len() as u32,
    })
}

/// Location-bound values and builtins flowing into or out of one entry point.
#[derive(Debug, Default)]
struct Interface {
    locations: Vec<(u32, naga::TypeInner)>,
    position: bool,
}

impl Interface {
    fn inputs(shader: &CompiledShader) -> Self {
        let module = shader.module();
        let mut out = Self::default();
        for arg in &shader.entry().function.arguments {
            out.collect(module, arg.ty, arg.binding.as_ref());
        }
        out
    }

    fn outputs(shader: &CompiledShader) -> Self {
        let module = shader.module();
        let mut out = Self::default();
        if let Some(result) = &shader.entry().function.result {
            out.collect(module, result.ty, result.binding.as_ref());
        }
        out
    }

    fn collect(
        &mut self,
        module: &naga::Module,
        ty: naga::Handle<naga::Type>,
        binding: Option<&naga::Binding>,
    ) {
        match binding {
            Some(naga::Binding::Location { location, .. }) => {
                self.locations.push((*location, module.types[ty].inner.clone()));
            }
            Some(naga::Binding::BuiltIn(naga::BuiltIn::Position { .. })) => self.position = true,
            Some(_) => {}
            // Unbound values are structs whose members carry the bindings.
            None => {
                if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                    for member in members {
                        self.collect(module, member.ty, member.binding.as_ref());
                    }
                }
            }
        }
    }

    fn get(&self, location: u32) -> Option<&naga::TypeInner> {
        self.locations
            .iter()
            .find(|(l, _)| *l == location)
            .map(|(_, ty)| ty)
    }
}

fn attribute_type(format: VertexFormat) -> naga::TypeInner {
    let scalar = naga::Scalar::F32;
    match format {
        VertexFormat::Float32 => naga::TypeInner::Scalar(scalar),
        VertexFormat::Float32x2 => naga::TypeInner::Vector {
            size: naga::VectorSize::Bi,
            scalar,
        },
        VertexFormat::Float32x3 => naga::TypeInner::Vector {
            size: naga::VectorSize::Tri,
            scalar,
        },
        VertexFormat::Float32x4 => naga::TypeInner::Vector {
            size: naga::VectorSize::Quad,
            scalar,
        },
    }
}

fn scalar_of(ty: &naga::TypeInner) -> Option<naga::Scalar> {
    match ty {
        naga::TypeInner::Scalar(s) | naga::TypeInner::Vector { scalar: s, .. } => Some(*s),
        _ => None,
    }
}

fn describe(ty: &naga::TypeInner) -> String {
    fn scalar_name(s: naga::Scalar) -> String {
        match s.kind {
            naga::ScalarKind::Float => format!("f{}", s.width * 8),
            naga::ScalarKind::Sint => format!("i{}", s.width * 8),
            naga::ScalarKind::Uint => format!("u{}", s.width * 8),
            naga::ScalarKind::Bool => "bool".to_string(),
            other => format!("{other:?}"),
        }
    }

    match ty {
        naga::TypeInner::Scalar(s) => scalar_name(*s),
        naga::TypeInner::Vector { size, scalar } => {
            format!("vec{}<{}>", *size as u8, scalar_name(*scalar))
        }
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vertex;
    use crate::shader::{compile, TRIANGLE_FRAGMENT_SOURCE, TRIANGLE_VERTEX_SOURCE};

    fn vs(src: &str) -> CompiledShader {
        compile(ShaderStage::Vertex, src).unwrap()
    }

    fn fs(src: &str) -> CompiledShader {
        compile(ShaderStage::Fragment, src).unwrap()
    }

    fn link_log(vertex: &CompiledShader, fragment: &CompiledShader, layout: &VertexLayout) -> String {
        link(vertex, fragment, layout).unwrap_err().log().to_string()
    }

    #[test]
    fn triangle_program_links() {
        let program = link(
            &vs(TRIANGLE_VERTEX_SOURCE),
            &fs(TRIANGLE_FRAGMENT_SOURCE),
            &Vertex::layout(),
        )
        .unwrap();

        assert_eq!(program.vertex_entry(), "vs_main");
        assert_eq!(program.fragment_entry(), "fs_main");
        assert_eq!(program.color_targets(), 1);
        assert_eq!(program.layout(), &Vertex::layout());
    }

    #[test]
    fn swapped_stages_are_rejected() {
        let v = vs(TRIANGLE_VERTEX_SOURCE);
        let f = fs(TRIANGLE_FRAGMENT_SOURCE);
        let log = link_log(&f, &v, &Vertex::layout());
        assert!(log.contains("vertex stage is a fragment shader"), "{log}");
        assert!(log.contains("fragment stage is a vertex shader"), "{log}");
    }

    #[test]
    fn fragment_input_without_vertex_output() {
        let f = fs(r#"
            @fragment
            fn fs_main(@location(1) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        "#);
        let log = link_log(&vs(TRIANGLE_VERTEX_SOURCE), &f, &Vertex::layout());
        assert!(log.contains("location 1 is not written"), "{log}");
    }

    #[test]
    fn varying_type_mismatch() {
        let v = vs(r#"
            struct Out {
                @builtin(position) pos: vec4<f32>,
                @location(0) uv: vec2<f32>,
            }
            @vertex
            fn vs_main(@location(0) a_pos: vec3<f32>) -> Out {
                return Out(vec4<f32>(a_pos, 1.0), a_pos.xy);
            }
        "#);
        let f = fs(r#"
            @fragment
            fn fs_main(@location(0) uv: vec3<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(uv, 1.0);
            }
        "#);
        let log = link_log(&v, &f, &Vertex::layout());
        assert!(log.contains("writes vec2<f32> but fragment stage reads vec3<f32>"), "{log}");
    }

    #[test]
    fn struct_outputs_feed_fragment_inputs() {
        let v = vs(r#"
            struct Out {
                @builtin(position) pos: vec4<f32>,
                @location(0) color: vec4<f32>,
            }
            @vertex
            fn vs_main(@location(0) a_pos: vec3<f32>) -> Out {
                return Out(vec4<f32>(a_pos, 1.0), vec4<f32>(1.0));
            }
        "#);
        let f = fs(r#"
            @fragment
            fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
                return color;
            }
        "#);
        assert!(link(&v, &f, &Vertex::layout()).is_ok());
    }

    #[test]
    fn vertex_input_missing_from_layout() {
        let layout = VertexLayout::new(12).with_attribute(3, VertexFormat::Float32x3, 0);
        let log = link_log(&vs(TRIANGLE_VERTEX_SOURCE), &fs(TRIANGLE_FRAGMENT_SOURCE), &layout);
        assert!(log.contains("location 0 has no attribute"), "{log}");
    }

    #[test]
    fn vertex_input_scalar_type_mismatch() {
        let v = vs(r#"
            @vertex
            fn vs_main(@location(0) a_pos: vec3<i32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(vec3<f32>(a_pos), 1.0);
            }
        "#);
        let log = link_log(&v, &fs(TRIANGLE_FRAGMENT_SOURCE), &Vertex::layout());
        assert!(log.contains("provides vec3<f32> but the shader reads vec3<i32>"), "{log}");
    }

    #[test]
    fn vertex_input_may_have_more_components_than_the_attribute() {
        let v = vs(r#"
            @vertex
            fn vs_main(@location(0) a_pos: vec4<f32>) -> @builtin(position) vec4<f32> {
                return a_pos;
            }
        "#);
        assert!(link(&v, &fs(TRIANGLE_FRAGMENT_SOURCE), &Vertex::layout()).is_ok());

        let layout = VertexLayout::new(8).with_attribute(0, VertexFormat::Float32x2, 0);
        assert!(link(&vs(TRIANGLE_VERTEX_SOURCE), &fs(TRIANGLE_FRAGMENT_SOURCE), &layout).is_ok());
    }

    #[test]
    fn color_target_zero_must_be_written() {
        let f = fs(r#"
            @fragment
            fn fs_main() -> @location(1) vec4<f32> {
                return vec4<f32>(1.0);
            }
        "#);
        let log = link_log(&vs(TRIANGLE_VERTEX_SOURCE), &f, &Vertex::layout());
        assert!(log.contains("does not write color target 0"), "{log}");
    }

    #[test]
    fn position_inside_output_struct_is_found() {
        let v = vs(r#"
            struct Out {
                @builtin(position) pos: vec4<f32>,
            }
            @vertex
            fn vs_main() -> Out {
                return Out(vec4<f32>(0.0));
            }
        "#);
        assert!(link(&v, &fs(TRIANGLE_FRAGMENT_SOURCE), &Vertex::layout()).is_ok());
    }

    #[test]
    fn every_problem_is_reported() {
        let f = fs(r#"
            @fragment
            fn fs_main(@location(2) a: f32) -> @location(0) vec4<f32> {
                return vec4<f32>(a);
            }
        "#);
        let layout = VertexLayout::new(12).with_attribute(5, VertexFormat::Float32x3, 0);
        let log = link_log(&vs(TRIANGLE_VERTEX_SOURCE), &f, &layout);
        assert_eq!(log.lines().count(), 2, "{log}");
    }
}
