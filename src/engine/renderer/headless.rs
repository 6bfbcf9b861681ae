use anyhow::Result;
use glam::{Mat4, Vec3};
use log::info;

use super::{LightParams, MatrixStack, Primitive, RenderBackend};
use crate::core::Color;
use crate::engine::component::LightSlot;

/// One backend call, as recorded by `HeadlessRenderer`
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Viewport(u32, u32),
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    LoadIdentity,
    Clear,
    PushMatrix,
    PopMatrix,
    Translate(Vec3),
    Rotate(f32, Vec3),
    Scale(Vec3),
    MultMatrix(Mat4),
    Draw(Primitive, Color),
    EnableLight {
        slot: LightSlot,
        params: LightParams,
    },
    DisableLight(LightSlot),
}

/// A draw with the model-view matrix it was issued under
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub color: Color,
    pub model_view: Mat4,
}

/// Everything issued between two presents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<RenderCommand>,
    pub draws: Vec<DrawCall>,
}

/// Backend that draws nothing and records every call
///
/// Used for tests and for running a game without a window.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    current: Frame,
    last_frame: Option<Frame>,
    stack: MatrixStack,
    frames_presented: u64,
    shut_down: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the frame in progress
    pub fn commands(&self) -> &[RenderCommand] {
        &self.current.commands
    }

    /// Draws of the frame in progress
    pub fn draws(&self) -> &[DrawCall] {
        &self.current.draws
    }

    /// The most recently presented frame
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Top of the model-view stack
    pub fn current_matrix(&self) -> Mat4 {
        self.stack.top()
    }

    fn record(&mut self, command: RenderCommand) {
        self.current.commands.push(command);
    }
}

impl RenderBackend for HeadlessRenderer {
    fn set_viewport(&mut self, width: u32, height: u32) {
        self.record(RenderCommand::Viewport(width, height));
    }

    fn set_perspective(&mut self, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.record(RenderCommand::Perspective {
            fov_y: fov_y_degrees,
            aspect,
            near,
            far,
        });
    }

    fn load_identity(&mut self) {
        self.stack.load_identity();
        self.record(RenderCommand::LoadIdentity);
    }

    fn clear(&mut self) {
        self.record(RenderCommand::Clear);
    }

    fn push_matrix(&mut self) {
        self.stack.push();
        self.record(RenderCommand::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.stack.pop();
        self.record(RenderCommand::PopMatrix);
    }

    fn translate(&mut self, offset: Vec3) {
        self.stack.translate(offset);
        self.record(RenderCommand::Translate(offset));
    }

    fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        self.stack.rotate(angle_degrees, axis);
        self.record(RenderCommand::Rotate(angle_degrees, axis));
    }

    fn scale(&mut self, factors: Vec3) {
        self.stack.scale(factors);
        self.record(RenderCommand::Scale(factors));
    }

    fn mult_matrix(&mut self, matrix: Mat4) {
        self.stack.mult(matrix);
        self.record(RenderCommand::MultMatrix(matrix));
    }

    fn draw(&mut self, primitive: Primitive, color: Color) {
        self.current.draws.push(DrawCall {
            primitive,
            color,
            model_view: self.stack.top(),
        });
        self.record(RenderCommand::Draw(primitive, color));
    }

    fn enable_light(&mut self, slot: LightSlot, light: &LightParams) {
        self.record(RenderCommand::EnableLight {
            slot,
            params: *light,
        });
    }

    fn disable_light(&mut self, slot: LightSlot) {
        self.record(RenderCommand::DisableLight(slot));
    }

    fn present(&mut self) -> Result<()> {
        self.last_frame = Some(std::mem::take(&mut self.current));
        self.frames_presented += 1;
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.shut_down {
            info!(
                "Headless renderer shut down after {} frames",
                self.frames_presented
            );
            self.shut_down = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_rolls_frame_over() {
        let mut renderer = HeadlessRenderer::new();
        renderer.clear();
        renderer.draw(Primitive::Sphere, Color::BLUE);
        renderer.present().unwrap();

        assert!(renderer.commands().is_empty());
        assert_eq!(renderer.frames_presented(), 1);
        let frame = renderer.last_frame().unwrap();
        assert_eq!(frame.commands.len(), 2);
        assert_eq!(frame.draws[0].primitive, Primitive::Sphere);
    }

    #[test]
    fn test_draw_captures_matrix() {
        let mut renderer = HeadlessRenderer::new();
        renderer.push_matrix();
        renderer.translate(Vec3::new(1.0, 2.0, 3.0));
        renderer.draw(Primitive::Cube, Color::RED);
        renderer.pop_matrix();
        renderer.draw(Primitive::Cube, Color::RED);

        let draws = renderer.draws();
        assert_eq!(
            draws[0].model_view,
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(draws[1].model_view, Mat4::IDENTITY);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut renderer = HeadlessRenderer::new();
        renderer.shutdown();
        renderer.shutdown();
        assert!(renderer.is_shut_down());
    }
}
