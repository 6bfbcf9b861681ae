// Physical inputs that can be held down

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// A keyboard key or mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
    Mouse(MouseButton),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }

    /// Create a mouse button input source
    pub fn mouse(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

impl From<KeyCode> for InputSource {
    fn from(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }
}

impl From<MouseButton> for InputSource {
    fn from(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}
