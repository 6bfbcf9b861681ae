// Window and event pump backed by winit

use anyhow::Result;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

use super::{Input, InputBackend};
use crate::engine::config::GameConfig;

/// Drains pending window events once per frame without blocking
pub struct WinitInput {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    cursor_visible: bool,
}

impl WinitInput {
    /// Open the game window; the renderer draws into the returned handle
    pub fn new(config: &GameConfig) -> Result<(Self, Arc<Window>)> {
        let event_loop = EventLoop::new()?;
        let (width, height) = config.screen_size;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.title.as_str())
                .with_inner_size(PhysicalSize::new(width, height))
                .with_resizable(false)
                .build(&event_loop)?,
        );

        info!("Window created: '{}' {}x{}", config.title, width, height);

        let input = Self {
            event_loop,
            window: Arc::clone(&window),
            cursor_visible: true,
        };
        Ok((input, window))
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    fn apply_cursor(&mut self, input: &Input) {
        if input.cursor_visible() != self.cursor_visible {
            self.cursor_visible = input.cursor_visible();
            self.window.set_cursor_visible(self.cursor_visible);
            debug!("Cursor visible: {}", self.cursor_visible);
        }
    }
}

impl InputBackend for WinitInput {
    fn poll(&mut self, input: &mut Input) -> Result<()> {
        let window_id = self.window.id();
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _elwt| {
                if let Event::WindowEvent {
                    window_id: id,
                    event,
                } = event
                {
                    if id != window_id {
                        return;
                    }
                    if let WindowEvent::Resized(size) = &event {
                        debug!("Window resized to {:?}", size);
                    }
                    input.process_window_event(&event);
                }
            });

        if let PumpStatus::Exit(code) = status {
            info!("Event loop exited with code {}", code);
            input.request_quit();
        }

        self.apply_cursor(input);
        Ok(())
    }
}
