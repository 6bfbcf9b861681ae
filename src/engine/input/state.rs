// Per-frame input state

use glam::Vec2;
use log::info;
use std::collections::HashMap;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::InputSource;

/// Keys, mouse and quit flag as of the last poll
///
/// Inputs that were never seen read as released.
#[derive(Debug, Clone)]
pub struct Input {
    held: HashMap<InputSource, bool>,
    mouse_position: Vec2,
    cursor_visible: bool,
    quit: bool,
}

impl Input {
    pub fn new() -> Self {
        Self {
            held: HashMap::new(),
            mouse_position: Vec2::ZERO,
            cursor_visible: true,
            quit: false,
        }
    }

    /// Whether the source is currently held down
    pub fn is_pressed(&self, source: impl Into<InputSource>) -> bool {
        self.held.get(&source.into()).copied().unwrap_or(false)
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.is_pressed(key)
    }

    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.is_pressed(button)
    }

    pub fn press(&mut self, source: impl Into<InputSource>) {
        self.held.insert(source.into(), true);
    }

    pub fn release(&mut self, source: impl Into<InputSource>) {
        self.held.insert(source.into(), false);
    }

    /// Cursor position in window pixels
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Show or hide the cursor; the backend applies it on its next poll
    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Ask the frame loop to stop after the current frame
    pub fn request_quit(&mut self) {
        if !self.quit {
            info!("Quit requested");
            self.quit = true;
        }
    }

    /// Fold one window event into the state
    pub fn process_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.request_quit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.set_held(code.into(), event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.set_held((*button).into(), *state);
            }
            _ => {}
        }
    }

    fn set_held(&mut self, source: InputSource, state: ElementState) {
        self.held.insert(source, state == ElementState::Pressed);
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_read_released() {
        let input = Input::new();
        assert!(!input.is_key_pressed(KeyCode::KeyQ));
        assert!(!input.is_mouse_pressed(MouseButton::Right));
        assert!(!input.quit_requested());
        assert!(input.cursor_visible());
    }

    #[test]
    fn test_press_and_release() {
        let mut input = Input::new();
        input.press(KeyCode::Space);
        input.press(MouseButton::Left);
        assert!(input.is_key_pressed(KeyCode::Space));
        assert!(input.is_mouse_pressed(MouseButton::Left));

        input.release(KeyCode::Space);
        assert!(!input.is_key_pressed(KeyCode::Space));
        assert!(input.is_mouse_pressed(MouseButton::Left));
    }

    #[test]
    fn test_close_request_sets_quit() {
        let mut input = Input::new();
        input.process_window_event(&WindowEvent::CloseRequested);
        assert!(input.quit_requested());

        // Stays set
        input.process_window_event(&WindowEvent::Focused(true));
        assert!(input.quit_requested());
    }

    #[test]
    fn test_cursor_visibility_flag() {
        let mut input = Input::new();
        input.set_cursor_visible(false);
        assert!(!input.cursor_visible());
        input.set_mouse_position(Vec2::new(10.0, 20.0));
        assert_eq!(input.mouse_position(), Vec2::new(10.0, 20.0));
    }
}
