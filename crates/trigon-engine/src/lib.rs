//! Trigon engine crate.
//!
//! Shader checks, geometry, the render backend seam and the frame loop behind
//! the triangle demo, plus the winit runtime that drives them in a window.

pub mod backend;
pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod coords;
pub mod geometry;
pub mod paint;
pub mod shader;
