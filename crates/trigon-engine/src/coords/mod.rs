//! Framebuffer coordinates.
//!
//! Viewports are expressed in physical framebuffer pixels, the unit the window
//! reports in resize events.

mod viewport;

pub use viewport::Viewport;
