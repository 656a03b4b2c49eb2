use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::backend::WgpuBackend;
use crate::core::{Event, FrameLoop, LoopState, Pipeline, PipelineSource};
use crate::device::GpuInit;
use crate::input::{InputEvent, Key, KeyState};
use crate::paint::Color;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial framebuffer size in physical pixels.
    pub size: PhysicalSize<u32>,
    pub resizable: bool,
    pub clear_color: Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "learnOpenGL".to_string(),
            size: PhysicalSize::new(800, 600),
            resizable: true,
            clear_color: Color::BLACK,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, builds the triangle pipeline and renders until the
    /// window is closed or Escape is pressed.
    ///
    /// Returns the number of frames rendered. Any setup or fatal surface
    /// failure ends the loop and is returned as the error.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit) -> Result<u64> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(err) = state.failure.take() {
            return Err(err);
        }

        let frames = state.frame_loop.as_ref().map_or(0, FrameLoop::frames_rendered);
        log::info!("terminated after {frames} frame(s)");
        Ok(frames)
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    backend: WgpuBackend<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,
    frame_loop: Option<FrameLoop>,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            gpu_init,
            entry: None,
            frame_loop: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let mut entry = WindowEntryTryBuilder {
            window,
            backend_builder: |w| pollster::block_on(WgpuBackend::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        let pipeline = entry
            .with_backend_mut(|backend| Pipeline::build(backend, &PipelineSource::triangle()))
            .context("failed to build the triangle pipeline")?;

        let size = entry.with_window(|w| w.inner_size());
        log::info!(
            "window \"{}\" ready ({}x{})",
            self.config.title,
            size.width,
            size.height
        );

        self.frame_loop = Some(FrameLoop::new(pipeline, self.config.clear_color));
        self.entry = Some(entry);
        Ok(())
    }

    fn dispatch(&mut self, event: Event) {
        let (Some(entry), Some(frame_loop)) = (self.entry.as_mut(), self.frame_loop.as_mut())
        else {
            return;
        };
        entry.with_backend_mut(|backend| frame_loop.handle_event(backend, event));
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(entry), Some(frame_loop)) = (self.entry.as_mut(), self.frame_loop.as_mut())
        else {
            return;
        };

        match entry.with_backend_mut(|backend| frame_loop.frame(backend)) {
            Ok(LoopState::Running) => {}
            Ok(LoopState::Terminated) => event_loop.exit(),
            Err(e) => {
                let err = anyhow::Error::new(e).context("frame failed");
                self.fail(event_loop, err);
            }
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return;
        };

        if frame_loop.poll_close() == LoopState::Terminated {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; pacing comes from the present mode.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.dispatch(Event::CloseRequested),

            WindowEvent::Resized(size) => {
                self.dispatch(Event::Resized {
                    width: size.width,
                    height: size.height,
                });
                if let Some(entry) = &self.entry {
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.dispatch(Event::Resized {
                        width: size.width,
                        height: size.height,
                    });
                }
            }

            WindowEvent::Focused(focused) => {
                self.dispatch(Event::Input(InputEvent::Focused(focused)));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let state = match event.state {
                    ElementState::Pressed => KeyState::Pressed,
                    ElementState::Released => KeyState::Released,
                };
                self.dispatch(Event::Input(InputEvent::Key {
                    key: map_key(event.physical_key),
                    state,
                    repeat: event.repeat,
                }));
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // GPU objects go before the window they render into.
        self.entry = None;
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        PhysicalKey::Code(KeyCode::Enter) => Key::Enter,
        PhysicalKey::Code(KeyCode::Space) => Key::Space,
        PhysicalKey::Code(other) => Key::Unknown(other as u32),
        // NativeKeyCode carries no stable numeric code.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}
