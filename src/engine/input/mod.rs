// Input handling
//
// - `source`: keys and mouse buttons as one hashable type
// - `state`: the `Input` snapshot components read through the scene context
// - `winit_backend`: window creation and the per-frame event pump
//
// ## Usage Example
//
// ```rust
// // Inside a behaviour hook
// if ctx.input.is_key_pressed(KeyCode::Escape) {
//     ctx.input.request_quit();
// }
// ```

mod source;
mod state;
mod winit_backend;

pub use source::InputSource;
pub use state::Input;
pub use winit_backend::WinitInput;

// Re-exported so games do not need winit as a direct dependency
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

use anyhow::Result;

/// Per-frame event pump that fills `Input`
pub trait InputBackend {
    /// Apply every event that arrived since the last poll
    fn poll(&mut self, input: &mut Input) -> Result<()>;
}

/// Backend with no event source; the game runs until stopped otherwise
#[derive(Debug, Default)]
pub struct HeadlessInput {
    polls: u64,
}

impl HeadlessInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl InputBackend for HeadlessInput {
    fn poll(&mut self, _input: &mut Input) -> Result<()> {
        self.polls += 1;
        Ok(())
    }
}
