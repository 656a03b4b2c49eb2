//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, and wires them to the
//! wgpu backend and the frame loop.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
