//! Input mapping from raw events to semantic actions
//!
//! The viewer reacts to a single input: Escape pressed ends the main loop.
//! Every other key, and key releases, map to nothing.

use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Actions triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Leave the main loop (Escape)
    Exit,
}

/// Maps raw input events to semantic actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `Some(action)` for a key-down of a mapped key
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        // Only handle key presses, not releases
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Escape => Some(InputAction::Exit),
            _ => None,
        }
    }

    /// Map a physical key; keys without a known code map to nothing
    pub fn map_physical_key(key: PhysicalKey, state: ElementState) -> Option<InputAction> {
        match key {
            PhysicalKey::Code(code) => Self::map_keyboard(code, state),
            PhysicalKey::Unidentified(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn test_escape_exits() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Pressed);
        assert_eq!(action, Some(InputAction::Exit));
    }

    #[test]
    fn test_key_release_ignored() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Released);
        assert_eq!(action, None);
    }

    #[test]
    fn test_other_keys_not_mapped() {
        for key in [
            KeyCode::KeyQ,
            KeyCode::KeyW,
            KeyCode::Space,
            KeyCode::Enter,
            KeyCode::F4,
        ] {
            let action = InputMapper::map_keyboard(key, ElementState::Pressed);
            assert_eq!(action, None, "Key {:?} should not be mapped", key);
        }
    }

    #[test]
    fn test_physical_key() {
        assert_eq!(
            InputMapper::map_physical_key(PhysicalKey::Code(KeyCode::Escape), ElementState::Pressed),
            Some(InputAction::Exit)
        );
        assert_eq!(
            InputMapper::map_physical_key(
                PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
                ElementState::Pressed
            ),
            None
        );
    }
}
