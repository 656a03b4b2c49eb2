//! Input subsystem.
//!
//! Public API does not expose winit types. The window runtime translates
//! platform events into `InputEvent`s.

mod state;
mod types;

pub use state::InputState;
pub use types::{InputEvent, Key, KeyState};
