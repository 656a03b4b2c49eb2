use anyhow::Result;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::geometry::{VertexFormat, VertexLayout};
use crate::paint::Color;
use crate::shader::{CompiledShader, ShaderStage};

use super::handle::Slots;
use super::validate::{self, ProgramInfo, VertexArrayInfo};
use super::{
    BackendError, BufferId, BufferUsage, DrawCall, PresentOutcome, Primitive, ProgramDesc,
    ProgramId, RenderBackend, ShaderId, VertexArrayId,
};

struct GpuShader {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
}

struct GpuProgram {
    info: ProgramInfo,
    pipeline: wgpu::RenderPipeline,
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    len: u64,
}

/// Backend rendering into a window surface through wgpu.
///
/// Clears and draws are collected while a frame is built and encoded into a
/// single render pass on [`present`](RenderBackend::present).
pub struct WgpuBackend<'w> {
    window: &'w Window,
    gpu: Gpu<'w>,

    shaders: Slots<ShaderId, GpuShader>,
    programs: Slots<ProgramId, GpuProgram>,
    buffers: Slots<BufferId, GpuBuffer>,
    vertex_arrays: Slots<VertexArrayId, VertexArrayInfo>,

    viewport: Viewport,
    clear: Option<Color>,
    pending: Vec<DrawCall>,
}

impl<'w> WgpuBackend<'w> {
    /// Acquires a GPU context for `window`. The viewport starts out covering
    /// the whole framebuffer.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let gpu = Gpu::new(window, init).await?;
        let size = gpu.size();

        Ok(Self {
            window,
            gpu,
            shaders: Slots::new(),
            programs: Slots::new(),
            buffers: Slots::new(),
            vertex_arrays: Slots::new(),
            viewport: Viewport::full(size.width, size.height),
            clear: None,
            pending: Vec::new(),
        })
    }

    fn encode_draw(&self, rpass: &mut wgpu::RenderPass<'_>, call: &DrawCall) {
        // Handles were checked in `draw` and programs/buffers are never released.
        let Some(program) = self.programs.get(call.program) else { return };
        let Some(vertex_array) = self.vertex_arrays.get(call.vertex_array) else { return };
        let Some(buffer) = self.buffers.get(vertex_array.buffer) else { return };

        rpass.set_pipeline(&program.pipeline);
        rpass.set_vertex_buffer(0, buffer.buffer.slice(..));
        rpass.draw(call.first..call.first + call.count, 0..1);
    }
}

impl RenderBackend for WgpuBackend<'_> {
    fn create_shader(&mut self, shader: &CompiledShader) -> Result<ShaderId, BackendError> {
        let label = format!("trigon {} shader", shader.stage());
        let module = self
            .gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(shader.source().into()),
            });

        Ok(self.shaders.insert(GpuShader {
            stage: shader.stage(),
            module,
        }))
    }

    fn release_shader(&mut self, id: ShaderId) -> Result<(), BackendError> {
        self.shaders
            .remove(id)
            .map(drop)
            .ok_or(BackendError::UnknownShader(id))
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramId, BackendError> {
        let vertex = self
            .shaders
            .get(desc.vertex)
            .ok_or(BackendError::UnknownShader(desc.vertex))?;
        let fragment = self
            .shaders
            .get(desc.fragment)
            .ok_or(BackendError::UnknownShader(desc.fragment))?;

        validate::check_stage(desc.vertex, vertex.stage, ShaderStage::Vertex)?;
        validate::check_stage(desc.fragment, fragment.stage, ShaderStage::Fragment)?;

        let linked = desc.linked;
        if linked.color_targets() != 1 {
            return Err(BackendError::UnsupportedColorTargets(linked.color_targets()));
        }

        let layout = linked.layout();
        layout.validate().map_err(BackendError::InvalidLayout)?;

        let attributes = vertex_attributes(layout);
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: layout.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        let pipeline = self
            .gpu
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("trigon program"),
                // No bind groups; let wgpu derive the empty layout.
                layout: None,

                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(linked.vertex_entry()),
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(linked.fragment_entry()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.gpu.surface_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: topology(desc.primitive),
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!(
            "created program ({} -> {}, {:?})",
            linked.vertex_entry(),
            linked.fragment_entry(),
            desc.primitive
        );

        Ok(self.programs.insert(GpuProgram {
            info: ProgramInfo {
                layout: layout.clone(),
                primitive: desc.primitive,
            },
            pipeline,
        }))
    }

    fn create_vertex_buffer(
        &mut self,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Result<BufferId, BackendError> {
        validate::check_contents(contents)?;

        // Static contents never need COPY_DST.
        let usage = match usage {
            BufferUsage::Static => wgpu::BufferUsages::VERTEX,
        };

        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("trigon vertex buffer"),
                contents,
                usage,
            });

        Ok(self.buffers.insert(GpuBuffer {
            buffer,
            len: contents.len() as u64,
        }))
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
            .len;
        let info = validate::vertex_array_info(buffer, len, layout)?;
        Ok(self.vertex_arrays.insert(info))
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self, color: Color) {
        // Anything drawn earlier in this frame would be overwritten.
        self.pending.clear();
        self.clear = Some(color);
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

        validate::check_draw(call, &program.info, vertex_array)?;
        self.pending.push(*call);
        Ok(())
    }

    fn present(&mut self) -> Result<PresentOutcome, BackendError> {
        let clear = self.clear.take();
        let draws = std::mem::take(&mut self.pending);

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(PresentOutcome::Skipped);
        }

        let mut frame = match self.gpu.acquire_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match self.gpu.recover(err) {
                    SurfaceErrorAction::Fatal => Err(BackendError::SurfaceLost),
                    _ => Ok(PresentOutcome::Skipped),
                };
            }
        };

        {
            let load = match clear {
                Some(color) => wgpu::LoadOp::Clear(color.into()),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trigon frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            // Viewports must lie inside the attachment.
            if let Some(v) = self.viewport.clipped_to(size.width, size.height) {
                rpass.set_viewport(
                    v.x as f32,
                    v.y as f32,
                    v.width as f32,
                    v.height as f32,
                    0.0,
                    1.0,
                );
                for call in &draws {
                    self.encode_draw(&mut rpass, call);
                }
            }
        }

        self.window.pre_present_notify();
        self.gpu.present(frame);

        Ok(PresentOutcome::Presented)
    }
}

fn vertex_attributes(layout: &VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .attributes
        .iter()
        .map(|a| wgpu::VertexAttribute {
            format: vertex_format(a.format),
            offset: a.offset,
            shader_location: a.location,
        })
        .collect()
}

fn vertex_format(format: VertexFormat) -> wgpu::VertexFormat {
    match format {
        VertexFormat::Float32 => wgpu::VertexFormat::Float32,
        VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
        VertexFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
    }
}

fn topology(primitive: Primitive) -> wgpu::PrimitiveTopology {
    match primitive {
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
        Primitive::Lines => wgpu::PrimitiveTopology::LineList,
        Primitive::Points => wgpu::PrimitiveTopology::PointList,
    }
}
