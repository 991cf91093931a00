//! Input events.

/// Composable event handlers.
pub mod handler;
/// Keyboard events.
pub mod key;
/// Mouse events.
pub mod mouse;

/// A resolved terminal input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A keystroke.
    Key(key::KeyEvent),
    /// A mouse action.
    Mouse(mouse::MouseEvent),
}
