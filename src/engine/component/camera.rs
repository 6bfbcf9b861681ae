use glam::{Mat4, Vec3};

use super::Behaviour;
use crate::engine::renderer::RenderBackend;

/// View transform source
///
/// The camera sits `distance` away from its owner's position and looks along
/// the owner's view direction, turned by `orientation` (degrees around x, y
/// and z).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub distance: Vec3,
    pub orientation: Vec3,
}

impl Camera {
    pub fn new(distance: Vec3, orientation: Vec3) -> Self {
        Self {
            distance,
            orientation,
        }
    }

    pub fn with_distance(distance: Vec3) -> Self {
        Self::new(distance, Vec3::ZERO)
    }

    /// Push the view transform for a camera at `position`
    pub fn push(&self, renderer: &mut dyn RenderBackend, position: Vec3) {
        let [a, b, c] = self.orientation.to_array();

        renderer.push_matrix();
        renderer.translate(-self.distance);
        renderer.rotate(-a, Vec3::X);
        renderer.rotate(-b, Vec3::Y);
        renderer.rotate(c, Vec3::Z);
        renderer.translate(Vec3::new(-position.x, -position.y, position.z));
    }

    /// Undo `push`
    pub fn pop(&self, renderer: &mut dyn RenderBackend) {
        renderer.pop_matrix();
    }

    /// The matrix `push` multiplies onto the stack
    pub fn view_matrix(&self, position: Vec3) -> Mat4 {
        let [a, b, c] = self.orientation.to_array();
        Mat4::from_translation(-self.distance)
            * Mat4::from_rotation_x((-a).to_radians())
            * Mat4::from_rotation_y((-b).to_radians())
            * Mat4::from_rotation_z(c.to_radians())
            * Mat4::from_translation(Vec3::new(-position.x, -position.y, position.z))
    }
}

impl Behaviour for Camera {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::renderer::{HeadlessRenderer, RenderCommand};
    use approx::assert_relative_eq;

    #[test]
    fn test_push_sequence() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 20.0), Vec3::new(10.0, 20.0, 30.0));
        let mut renderer = HeadlessRenderer::new();

        camera.push(&mut renderer, Vec3::new(1.0, 2.0, 3.0));
        camera.pop(&mut renderer);

        assert_eq!(
            renderer.commands(),
            &[
                RenderCommand::PushMatrix,
                RenderCommand::Translate(Vec3::new(0.0, 0.0, -20.0)),
                RenderCommand::Rotate(-10.0, Vec3::X),
                RenderCommand::Rotate(-20.0, Vec3::Y),
                RenderCommand::Rotate(30.0, Vec3::Z),
                RenderCommand::Translate(Vec3::new(-1.0, -2.0, 3.0)),
                RenderCommand::PopMatrix,
            ]
        );
    }

    #[test]
    fn test_view_matrix_matches_stack() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 20.0), Vec3::new(15.0, -40.0, 5.0));
        let position = Vec3::new(3.0, -1.0, 2.0);
        let mut renderer = HeadlessRenderer::new();

        camera.push(&mut renderer, position);
        let expected = camera.view_matrix(position).to_cols_array();
        let actual = renderer.current_matrix().to_cols_array();
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_default_camera_only_moves_to_owner() {
        let view = Camera::default().view_matrix(Vec3::new(1.0, 2.0, 3.0));
        let origin = view.transform_point3(Vec3::new(1.0, 2.0, -3.0));
        assert_relative_eq!(origin.length(), 0.0, epsilon = 1e-6);
    }
}
