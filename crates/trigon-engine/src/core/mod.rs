//! Setup sequence and per-frame loop.
//!
//! Both are written against [`RenderBackend`](crate::backend::RenderBackend),
//! so the window runtime and headless tests drive the same code.

mod error;
mod frame_loop;
mod pipeline;

pub use error::SetupError;
pub use frame_loop::{Event, FrameLoop, LoopState};
pub use pipeline::{Pipeline, PipelineSource};
