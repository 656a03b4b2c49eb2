use crate::backend::{BackendError, PresentOutcome, RenderBackend};
use crate::coords::Viewport;
use crate::input::{InputEvent, InputState, Key};
use crate::paint::Color;

use super::Pipeline;

/// Events applied between frames.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    /// New framebuffer size in physical pixels.
    Resized { width: u32, height: u32 },
    /// The window system asked the window to close.
    CloseRequested,
    Input(InputEvent),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Per-frame driver: input, clear, one draw, present.
///
/// The close flag is only acted on at the start of a frame. A frame that
/// sets it still finishes drawing.
#[derive(Debug)]
pub struct FrameLoop {
    pipeline: Pipeline,
    clear_color: Color,
    input: InputState,
    state: LoopState,
    close_requested: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new(pipeline: Pipeline, clear_color: Color) -> Self {
        Self {
            pipeline,
            clear_color,
            input: InputState::default(),
            state: LoopState::Running,
            close_requested: false,
            frames: 0,
        }
    }

    pub fn handle_event<B>(&mut self, backend: &mut B, event: Event)
    where
        B: RenderBackend + ?Sized,
    {
        match event {
            Event::Resized { width, height } => {
                log::debug!("framebuffer resized to {width}x{height}");
                backend.resize(width, height);
                backend.set_viewport(Viewport::full(width, height));
            }
            Event::CloseRequested => self.request_close(),
            Event::Input(ev) => self.input.apply_event(ev),
        }
    }

    pub fn request_close(&mut self) {
        if !self.close_requested {
            log::info!("close requested");
        }
        self.close_requested = true;
    }

    /// Checks the close flag and moves to `Terminated` when it is set.
    pub fn poll_close(&mut self) -> LoopState {
        if self.close_requested {
            self.state = LoopState::Terminated;
        }
        self.state
    }

    /// Runs one iteration. Returns `Terminated` without drawing once the close
    /// flag has been seen.
    pub fn frame<B>(&mut self, backend: &mut B) -> Result<LoopState, BackendError>
    where
        B: RenderBackend + ?Sized,
    {
        if self.poll_close() == LoopState::Terminated {
            return Ok(LoopState::Terminated);
        }

        self.process_input();

        backend.clear(self.clear_color);
        backend.draw(&self.pipeline.draw_call())?;
        if backend.present()? == PresentOutcome::Skipped {
            log::trace!("frame {} not presented", self.frames);
        }

        self.frames += 1;
        Ok(LoopState::Running)
    }

    /// Drives frames until the loop terminates, pulling events from
    /// `poll_events` after each one. The callback receives the number of
    /// frames rendered so far.
    pub fn run<B, F>(&mut self, backend: &mut B, mut poll_events: F) -> Result<u64, BackendError>
    where
        B: RenderBackend + ?Sized,
        F: FnMut(u64) -> Vec<Event>,
    {
        while self.frame(backend)? == LoopState::Running {
            for event in poll_events(self.frames) {
                self.handle_event(backend, event);
            }
        }
        Ok(self.frames)
    }

    fn process_input(&mut self) {
        if self.input.key_down(Key::Escape) {
            self.request_close();
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Command, Primitive, RecordingBackend};
    use crate::core::PipelineSource;

    fn setup() -> (RecordingBackend, FrameLoop) {
        let mut backend = RecordingBackend::new(800, 600);
        let pipeline = Pipeline::build(&mut backend, &PipelineSource::triangle()).unwrap();
        backend.take_commands();
        (backend, FrameLoop::new(pipeline, Color::BLACK))
    }

    #[test]
    fn initial_viewport_covers_the_framebuffer() {
        let (backend, _) = setup();
        assert_eq!(backend.viewport(), Viewport::new(0, 0, 800, 600));
    }

    #[test]
    fn resize_sets_full_viewport() {
        let (mut backend, mut frames) = setup();
        frames.handle_event(
            &mut backend,
            Event::Resized {
                width: 1024,
                height: 768,
            },
        );
        assert_eq!(backend.viewport(), Viewport::new(0, 0, 1024, 768));
        assert_eq!(backend.framebuffer_size(), (1024, 768));
    }

    #[test]
    fn frame_clears_draws_and_presents_in_order() {
        let (mut backend, mut frames) = setup();
        assert_eq!(frames.frame(&mut backend).unwrap(), LoopState::Running);

        let pipeline = *frames.pipeline();
        assert_eq!(
            backend.commands(),
            [
                Command::Clear(Color::BLACK),
                Command::Draw(pipeline.draw_call()),
                Command::Present,
            ]
        );
        assert_eq!(frames.frames_rendered(), 1);
    }

    #[test]
    fn escape_closes_after_the_current_frame() {
        let (mut backend, mut frames) = setup();
        frames.handle_event(&mut backend, Event::Input(InputEvent::pressed(Key::Escape)));

        assert_eq!(frames.frame(&mut backend).unwrap(), LoopState::Running);
        assert!(frames.close_requested());
        assert_eq!(backend.draws().count(), 1);

        assert_eq!(frames.frame(&mut backend).unwrap(), LoopState::Terminated);
        assert_eq!(backend.draws().count(), 1);
        assert!(!frames.is_running());
    }

    #[test]
    fn released_escape_does_not_close() {
        let (mut backend, mut frames) = setup();
        frames.handle_event(&mut backend, Event::Input(InputEvent::pressed(Key::Escape)));
        frames.handle_event(&mut backend, Event::Input(InputEvent::released(Key::Escape)));
        frames.frame(&mut backend).unwrap();
        assert!(!frames.close_requested());
    }

    #[test]
    fn close_request_terminates_without_drawing() {
        let (mut backend, mut frames) = setup();
        frames.handle_event(&mut backend, Event::CloseRequested);
        assert_eq!(frames.frame(&mut backend).unwrap(), LoopState::Terminated);
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn minimized_window_keeps_drawing_without_presenting() {
        let (mut backend, mut frames) = setup();
        frames.handle_event(&mut backend, Event::Resized { width: 0, height: 0 });
        backend.take_commands();

        frames.frame(&mut backend).unwrap();
        assert_eq!(backend.draws().count(), 1);
        assert_eq!(backend.presents(), 0);
    }

    #[test]
    fn run_draws_the_triangle_once_per_frame_until_escape() {
        let (mut backend, mut frames) = setup();
        let program = frames.pipeline().program;

        let rendered = frames
            .run(&mut backend, |n| match n {
                2 => vec![Event::Resized {
                    width: 640,
                    height: 480,
                }],
                5 => vec![Event::Input(InputEvent::pressed(Key::Escape))],
                _ => Vec::new(),
            })
            .unwrap();

        // Escape arrives after frame 5; frame 6 sees it and still draws.
        assert_eq!(rendered, 6);
        assert_eq!(backend.presents(), 6);

        let draws: Vec<_> = backend.draws().copied().collect();
        assert_eq!(draws.len(), 6);
        for call in draws {
            assert_eq!(call.program, program);
            assert_eq!(call.primitive, Primitive::Triangles);
            assert_eq!((call.first, call.count), (0, 3));
        }

        assert_eq!(backend.viewport(), Viewport::new(0, 0, 640, 480));
        assert_eq!(frames.state(), LoopState::Terminated);
    }

    #[test]
    fn run_stops_on_close_request() {
        let (mut backend, mut frames) = setup();
        let rendered = frames
            .run(&mut backend, |n| {
                if n == 3 {
                    vec![Event::CloseRequested]
                } else {
                    Vec::new()
                }
            })
            .unwrap();
        assert_eq!(rendered, 3);
        assert_eq!(backend.draws().count(), 3);
    }
}
