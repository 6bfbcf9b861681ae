use glam::{Mat3, Vec3};

use super::{Behaviour, Owner};
use crate::core::math::{mat3_from_rows, mat3_to_rows};
use crate::engine::physics::{BodyBuilder, BodyHandle, PhysicsWorld};
use crate::engine::scene::Context;

/// Position, rotation and scale of a game object
///
/// Position and rotation live in a physics body created with the transform;
/// the body stays disabled until a rigidbody enables it. Scale is plain data
/// and only sizes colliders and rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    body: Option<BodyHandle>,
    scale: Vec3,
}

impl Transform {
    /// Create a transform and the body that stores its pose
    pub fn new(physics: &mut PhysicsWorld, position: Vec3, rotation: Mat3, scale: Vec3) -> Self {
        let body = physics.create_body(BodyBuilder::new().position(position).rotation(rotation));
        Self {
            body: Some(body),
            scale,
        }
    }

    /// Unrotated, unit-scale transform at a position
    pub fn at(physics: &mut PhysicsWorld, position: Vec3) -> Self {
        Self::new(physics, position, Mat3::IDENTITY, Vec3::ONE)
    }

    /// Body behind this transform, `None` once it has been removed
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Vec3 {
        self.body
            .and_then(|b| physics.position(b))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn set_position(&self, physics: &mut PhysicsWorld, position: Vec3) {
        if let Some(body) = self.body {
            physics.set_position(body, position);
        }
    }

    pub fn rotation(&self, physics: &PhysicsWorld) -> Mat3 {
        self.body
            .and_then(|b| physics.rotation(b))
            .unwrap_or(Mat3::IDENTITY)
    }

    pub fn set_rotation(&self, physics: &mut PhysicsWorld, rotation: Mat3) {
        if let Some(body) = self.body {
            physics.set_rotation(body, rotation);
        }
    }

    /// Rotation as 9 scalars in row-major order
    pub fn rotation_rows(&self, physics: &PhysicsWorld) -> [f32; 9] {
        mat3_to_rows(self.rotation(physics))
    }

    pub fn set_rotation_rows(&self, physics: &mut PhysicsWorld, rows: [f32; 9]) {
        self.set_rotation(physics, mat3_from_rows(rows));
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Change the scale
    ///
    /// Colliders already attached keep their old size until they are
    /// re-attached.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Move by an offset
    pub fn translate(&self, physics: &mut PhysicsWorld, offset: Vec3) {
        let position = self.position(physics);
        self.set_position(physics, position + offset);
    }

    /// Apply a rotation on top of the current one
    pub fn rotate(&self, physics: &mut PhysicsWorld, rotation: Mat3) {
        let current = self.rotation(physics);
        self.set_rotation(physics, rotation * current);
    }

    pub(crate) fn reset(&mut self) {
        self.body = None;
        self.scale = Vec3::ONE;
    }
}

impl Behaviour for Transform {
    fn stop(&mut self, _owner: &Owner, ctx: &mut Context) {
        if let Some(body) = self.body.take() {
            ctx.physics.remove_body(body);
        }
    }
}
