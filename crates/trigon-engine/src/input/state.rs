use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Current input state for the window.
///
/// Holds the set of keys that are down right now. Polled once per frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Keys currently held.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies one input event to the held-key set.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases are not delivered to unfocused windows.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(key) {
                        log::trace!("key down: {key}");
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(&key);
                }
            },
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_track_held_keys() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::pressed(Key::Escape));
        assert!(input.key_down(Key::Escape));
        assert!(!input.key_down(Key::Space));

        input.apply_event(InputEvent::released(Key::Escape));
        assert!(!input.key_down(Key::Escape));
    }

    #[test]
    fn repeats_keep_the_key_held() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::pressed(Key::Space));
        input.apply_event(InputEvent::Key {
            key: Key::Space,
            state: KeyState::Pressed,
            repeat: true,
        });
        assert_eq!(input.keys_down.len(), 1);
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::Focused(true));
        input.apply_event(InputEvent::pressed(Key::Escape));
        input.apply_event(InputEvent::pressed(Key::Unknown(42)));

        input.apply_event(InputEvent::Focused(false));
        assert!(!input.focused);
        assert!(input.keys_down.is_empty());
    }

    #[test]
    fn unknown_keys_are_distinct_by_code() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::pressed(Key::Unknown(1)));
        assert!(input.key_down(Key::Unknown(1)));
        assert!(!input.key_down(Key::Unknown(2)));
        assert_eq!(Key::Unknown(7).to_string(), "Unknown(7)");
    }
}
