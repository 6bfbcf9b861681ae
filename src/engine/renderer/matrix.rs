use glam::{Mat4, Vec3};
use log::warn;

/// Model-view matrix stack
///
/// Never empty: the bottom entry can be replaced but not popped.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Mat4>,
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            stack: vec![Mat4::IDENTITY],
        }
    }

    pub fn top(&self) -> Mat4 {
        self.stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        if self.stack.is_empty() {
            self.stack.push(Mat4::IDENTITY);
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn load_identity(&mut self) {
        *self.top_mut() = Mat4::IDENTITY;
    }

    pub fn push(&mut self) {
        let top = self.top();
        self.stack.push(top);
    }

    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            warn!("Matrix stack underflow");
        }
    }

    /// Post-multiply the top by `matrix`
    pub fn mult(&mut self, matrix: Mat4) {
        let top = self.top_mut();
        *top = *top * matrix;
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.mult(Mat4::from_translation(offset));
    }

    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        self.mult(Mat4::from_axis_angle(axis, angle_degrees.to_radians()));
    }

    pub fn scale(&mut self, factors: Vec3) {
        self.mult(Mat4::from_scale(factors));
    }

    /// Drop everything but a fresh identity
    pub fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(Mat4::IDENTITY);
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}
