use crate::coords::Viewport;
use crate::geometry::VertexLayout;
use crate::paint::Color;
use crate::shader::{CompiledShader, ShaderStage};

use super::handle::Slots;
use super::validate::{self, ProgramInfo, VertexArrayInfo};
use super::{
    BackendError, BufferId, BufferUsage, DrawCall, PresentOutcome, Primitive, ProgramDesc,
    ProgramId, RenderBackend, ShaderId, VertexArrayId,
};

/// One accepted backend call, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateShader {
        id: ShaderId,
        stage: ShaderStage,
    },
    ReleaseShader(ShaderId),
    CreateProgram {
        id: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
        primitive: Primitive,
    },
    CreateVertexBuffer {
        id: BufferId,
        contents: Vec<u8>,
        usage: BufferUsage,
    },
    CreateVertexArray {
        id: VertexArrayId,
        buffer: BufferId,
        layout: VertexLayout,
    },
    Resize {
        width: u32,
        height: u32,
    },
    SetViewport(Viewport),
    Clear(Color),
    Draw(DrawCall),
    Present,
}

/// Headless backend that validates like a real one and records what it was asked to do.
///
/// Rejected calls are not recorded.
pub struct RecordingBackend {
    commands: Vec<Command>,
    shaders: Slots<ShaderId, ShaderStage>,
    programs: Slots<ProgramId, ProgramInfo>,
    buffers: Slots<BufferId, Vec<u8>>,
    vertex_arrays: Slots<VertexArrayId, VertexArrayInfo>,
    framebuffer: (u32, u32),
    viewport: Viewport,
}

impl RecordingBackend {
    /// Creates a backend with a `width` x `height` framebuffer and a viewport covering it.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            commands: Vec::new(),
            shaders: Slots::new(),
            programs: Slots::new(),
            buffers: Slots::new(),
            vertex_arrays: Slots::new(),
            framebuffer: (width, height),
            viewport: Viewport::full(width, height),
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns and forgets everything recorded so far.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> + '_ {
        self.commands.iter().filter_map(|c| match c {
            Command::Draw(call) => Some(call),
            _ => None,
        })
    }

    pub fn presents(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Present))
            .count()
    }

    pub fn buffer_contents(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(id).map(Vec::as_slice)
    }

    /// Shader objects created and not yet released.
    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer
    }
}

impl RenderBackend for RecordingBackend {
    fn create_shader(&mut self, shader: &CompiledShader) -> Result<ShaderId, BackendError> {
        let stage = shader.stage();
        let id = self.shaders.insert(stage);
        self.commands.push(Command::CreateShader { id, stage });
        Ok(id)
    }

    fn release_shader(&mut self, id: ShaderId) -> Result<(), BackendError> {
        self.shaders
            .remove(id)
            .ok_or(BackendError::UnknownShader(id))?;
        self.commands.push(Command::ReleaseShader(id));
        Ok(())
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramId, BackendError> {
        let vertex = *self
            .shaders
            .get(desc.vertex)
            .ok_or(BackendError::UnknownShader(desc.vertex))?;
        let fragment = *self
            .shaders
            .get(desc.fragment)
            .ok_or(BackendError::UnknownShader(desc.fragment))?;

        validate::check_stage(desc.vertex, vertex, ShaderStage::Vertex)?;
        validate::check_stage(desc.fragment, fragment, ShaderStage::Fragment)?;

        let id = self.programs.insert(ProgramInfo {
            layout: desc.linked.layout().clone(),
            primitive: desc.primitive,
        });
        self.commands.push(Command::CreateProgram {
            id,
            vertex: desc.vertex,
            fragment: desc.fragment,
            primitive: desc.primitive,
        });
        Ok(id)
    }

    fn create_vertex_buffer(
        &mut self,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<BufferId, BackendError> {
        validate::check_contents(contents)?;
        let id = self.buffers.insert(contents.to_vec());
        self.commands.push(Command::CreateVertexBuffer {
            id,
            contents: contents.to_vec(),
            usage,
        });
        Ok(id)
    }

    fn create_vertex_array(
        &mut self,
        buffer: BufferId,
        layout: &VertexLayout,
    ) -> Result<VertexArrayId, BackendError> {
        let len = self
            .buffers
            .get(buffer)
            .ok_or(BackendError::UnknownBuffer(buffer))?
            .len() as u64;
        let info = validate::vertex_array_info(buffer, len, layout)?;
        let id = self.vertex_arrays.insert(info);
        self.commands.push(Command::CreateVertexArray {
            id,
            buffer,
            layout: layout.clone(),
        });
        Ok(id)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer = (width, height);
        self.commands.push(Command::Resize { width, height });
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.push(Command::SetViewport(viewport));
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(Command::Clear(color));
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), BackendError> {
        let program = self
            .programs
            .get(call.program)
            .ok_or(BackendError::UnknownProgram(call.program))?;
        let vertex_array = self
            .vertex_arrays
            .get(call.vertex_array)
            .ok_or(BackendError::UnknownVertexArray(call.vertex_array))?;

        validate::check_draw(call, program, vertex_array)?;
        self.commands.push(Command::Draw(*call));
        Ok(())
    }

    fn present(&mut self) -> Result<PresentOutcome, BackendError> {
        let (width, height) = self.framebuffer;
        if width == 0 || height == 0 {
            return Ok(PresentOutcome::Skipped);
        }
        self.commands.push(Command::Present);
        Ok(PresentOutcome::Presented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::handle::Handle;
    use crate::geometry::{triangle_bytes, Vertex, VertexFormat};
    use crate::shader::{
        compile, link, LinkedProgram, TRIANGLE_FRAGMENT_SOURCE, TRIANGLE_VERTEX_SOURCE,
    };

    struct Fixture {
        backend: RecordingBackend,
        program: ProgramId,
        vertex_array: VertexArrayId,
    }

    fn linked() -> (CompiledShader, CompiledShader, LinkedProgram) {
        let vs = compile(ShaderStage::Vertex, TRIANGLE_VERTEX_SOURCE).unwrap();
        let fs = compile(ShaderStage::Fragment, TRIANGLE_FRAGMENT_SOURCE).unwrap();
        let program = link(&vs, &fs, &Vertex::layout()).unwrap();
        (vs, fs, program)
    }

    fn fixture() -> Fixture {
        let mut backend = RecordingBackend::new(800, 600);
        let (vs, fs, linked) = linked();
        let vertex = backend.create_shader(&vs).unwrap();
        let fragment = backend.create_shader(&fs).unwrap();
        let program = backend
            .create_program(&ProgramDesc {
                linked: &linked,
                vertex,
                fragment,
                primitive: Primitive::Triangles,
            })
            .unwrap();
        let buffer = backend
            .create_vertex_buffer(triangle_bytes(), BufferUsage::Static)
            .unwrap();
        let vertex_array = backend
            .create_vertex_array(buffer, &Vertex::layout())
            .unwrap();
        Fixture {
            backend,
            program,
            vertex_array,
        }
    }

    fn triangle_call(f: &Fixture) -> DrawCall {
        DrawCall {
            program: f.program,
            vertex_array: f.vertex_array,
            primitive: Primitive::Triangles,
            first: 0,
            count: 3,
        }
    }

    #[test]
    fn starts_with_full_viewport() {
        let backend = RecordingBackend::new(800, 600);
        assert_eq!(backend.viewport(), Viewport::full(800, 600));
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn accepted_draw_is_recorded() {
        let mut f = fixture();
        let call = triangle_call(&f);
        f.backend.draw(&call).unwrap();
        assert_eq!(f.backend.draws().copied().collect::<Vec<_>>(), vec![call]);
    }

    #[test]
    fn released_shader_cannot_be_used_or_released_again() {
        let mut backend = RecordingBackend::new(1, 1);
        let (vs, fs, linked) = linked();
        let vertex = backend.create_shader(&vs).unwrap();
        let fragment = backend.create_shader(&fs).unwrap();
        backend.release_shader(vertex).unwrap();

        assert_eq!(
            backend.release_shader(vertex),
            Err(BackendError::UnknownShader(vertex))
        );
        let err = backend
            .create_program(&ProgramDesc {
                linked: &linked,
                vertex,
                fragment,
                primitive: Primitive::Triangles,
            })
            .unwrap_err();
        assert_eq!(err, BackendError::UnknownShader(vertex));
        assert_eq!(backend.live_shaders(), 1);
    }

    #[test]
    fn program_rejects_swapped_stages() {
        let mut backend = RecordingBackend::new(1, 1);
        let (vs, fs, linked) = linked();
        let vertex = backend.create_shader(&vs).unwrap();
        let fragment = backend.create_shader(&fs).unwrap();
        let err = backend
            .create_program(&ProgramDesc {
                linked: &linked,
                vertex: fragment,
                fragment: vertex,
                primitive: Primitive::Triangles,
            })
            .unwrap_err();
        assert!(matches!(err, BackendError::StageMismatch { .. }));
    }

    #[test]
    fn draw_with_unknown_program_fails() {
        let mut f = fixture();
        let mut call = triangle_call(&f);
        let bogus = ProgramId::from_raw(99);
        call.program = bogus;
        assert_eq!(f.backend.draw(&call), Err(BackendError::UnknownProgram(bogus)));
        assert_eq!(f.backend.draws().count(), 0);
    }

    #[test]
    fn draw_past_end_of_buffer_fails() {
        let mut f = fixture();
        let mut call = triangle_call(&f);
        call.first = 1;
        assert!(matches!(
            f.backend.draw(&call),
            Err(BackendError::DrawOutOfRange { available: 3, .. })
        ));
    }

    #[test]
    fn draw_with_other_primitive_fails() {
        let mut f = fixture();
        let mut call = triangle_call(&f);
        call.primitive = Primitive::Lines;
        assert!(matches!(
            f.backend.draw(&call),
            Err(BackendError::PrimitiveMismatch { .. })
        ));
    }

    #[test]
    fn draw_with_foreign_layout_fails() {
        let mut f = fixture();
        let layout = VertexLayout::new(16).with_attribute(0, VertexFormat::Float32x3, 0);
        let buffer = f
            .backend
            .create_vertex_buffer(&[0u8; 48], BufferUsage::Static)
            .unwrap();
        let vertex_array = f.backend.create_vertex_array(buffer, &layout).unwrap();
        let mut call = triangle_call(&f);
        call.vertex_array = vertex_array;
        assert!(matches!(
            f.backend.draw(&call),
            Err(BackendError::LayoutMismatch { .. })
        ));
    }

    #[test]
    fn empty_buffer_is_rejected() {
        let mut backend = RecordingBackend::new(1, 1);
        assert_eq!(
            backend.create_vertex_buffer(&[], BufferUsage::Static),
            Err(BackendError::EmptyBuffer)
        );
    }

    #[test]
    fn vertex_array_needs_known_buffer() {
        let mut backend = RecordingBackend::new(1, 1);
        let bogus = BufferId::from_raw(7);
        assert_eq!(
            backend.create_vertex_array(bogus, &Vertex::layout()),
            Err(BackendError::UnknownBuffer(bogus))
        );
    }

    #[test]
    fn uploaded_bytes_are_kept_verbatim() {
        let mut backend = RecordingBackend::new(1, 1);
        let id = backend
            .create_vertex_buffer(triangle_bytes(), BufferUsage::Static)
            .unwrap();
        assert_eq!(backend.buffer_contents(id), Some(triangle_bytes()));
    }

    #[test]
    fn zero_sized_framebuffer_skips_present() {
        let mut backend = RecordingBackend::new(800, 600);
        backend.resize(0, 0);
        assert_eq!(backend.present(), Ok(PresentOutcome::Skipped));
        assert_eq!(backend.presents(), 0);
        backend.resize(640, 480);
        assert_eq!(backend.present(), Ok(PresentOutcome::Presented));
        assert_eq!(backend.framebuffer_size(), (640, 480));
    }

    #[test]
    fn resize_does_not_move_viewport() {
        let mut backend = RecordingBackend::new(800, 600);
        backend.resize(1024, 768);
        assert_eq!(backend.viewport(), Viewport::full(800, 600));
    }
}
