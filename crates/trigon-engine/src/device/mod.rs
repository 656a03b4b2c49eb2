//! GPU device + surface management.
//!
//! Resolves the adapter and device for a window, keeps its surface configured
//! across resizes and hands out one swapchain image per frame.

mod context;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
