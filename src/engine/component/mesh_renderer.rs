use glam::{Mat3, Mat4, Vec3};

use super::Behaviour;
use crate::core::Color;
use crate::engine::renderer::{Primitive, RenderBackend};

/// Draws one of the built-in meshes at its owner's pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRenderer {
    pub primitive: Primitive,
    pub color: Color,
}

impl MeshRenderer {
    pub fn new(primitive: Primitive, color: Color) -> Self {
        Self { primitive, color }
    }

    pub fn cube(color: Color) -> Self {
        Self::new(Primitive::Cube, color)
    }

    pub fn sphere(color: Color) -> Self {
        Self::new(Primitive::Sphere, color)
    }

    /// Model matrix for a pose; z is flipped into view space
    pub fn model_matrix(position: Vec3, rotation: Mat3) -> Mat4 {
        let mut model = Mat4::from_mat3(rotation);
        model.w_axis = Vec3::new(position.x, position.y, -position.z).extend(1.0);
        model
    }

    pub fn render(
        &self,
        renderer: &mut dyn RenderBackend,
        position: Vec3,
        rotation: Mat3,
        scale: Vec3,
    ) {
        renderer.push_matrix();
        renderer.mult_matrix(Self::model_matrix(position, rotation));
        if scale != Vec3::ONE {
            renderer.scale(scale);
        }
        renderer.draw(self.primitive, self.color);
        renderer.pop_matrix();
    }
}

impl Behaviour for MeshRenderer {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::renderer::{HeadlessRenderer, RenderCommand};

    #[test]
    fn test_model_matrix() {
        let rotation = Mat3::from_rotation_z(0.5);
        let model = MeshRenderer::model_matrix(Vec3::new(1.0, 2.0, 3.0), rotation);

        assert_eq!(model.w_axis, glam::Vec4::new(1.0, 2.0, -3.0, 1.0));
        assert_eq!(model.x_axis.truncate(), rotation.x_axis);
        assert_eq!(model.z_axis.truncate(), rotation.z_axis);
    }

    #[test]
    fn test_unit_scale_is_skipped() {
        let mut renderer = HeadlessRenderer::new();
        MeshRenderer::cube(Color::WHITE).render(
            &mut renderer,
            Vec3::ZERO,
            Mat3::IDENTITY,
            Vec3::ONE,
        );

        assert!(!renderer
            .commands()
            .iter()
            .any(|c| matches!(c, RenderCommand::Scale(_))));
        assert_eq!(renderer.draws().len(), 1);
        assert_eq!(renderer.draws()[0].primitive, Primitive::Cube);
    }

    #[test]
    fn test_scaled_draw() {
        let mut renderer = HeadlessRenderer::new();
        let scale = Vec3::new(2.0, 1.0, 1.0);
        MeshRenderer::sphere(Color::GREEN).render(
            &mut renderer,
            Vec3::new(0.0, 5.0, 0.0),
            Mat3::IDENTITY,
            scale,
        );

        assert!(renderer.commands().contains(&RenderCommand::Scale(scale)));
        let draw = renderer.draws()[0];
        assert_eq!(draw.color, Color::GREEN);
        assert_eq!(
            draw.model_view,
            Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)) * Mat4::from_scale(scale)
        );
        // The stack is balanced again
        assert_eq!(renderer.current_matrix(), Mat4::IDENTITY);
    }
}
