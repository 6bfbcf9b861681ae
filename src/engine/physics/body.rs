use glam::{Mat3, Vec3};
use rapier3d::prelude::*;

use crate::core::math::{to_physics_rotation, to_physics_vector};

/// Handle to a rigid body created in one generation of the physics world
///
/// Restarting the world bumps its epoch, so handles from an earlier world
/// never resolve to bodies of the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub(crate) epoch: u32,
    pub(crate) raw: RigidBodyHandle,
}

/// Handle to a collision geometry created in one generation of the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle {
    pub(crate) epoch: u32,
    pub(crate) raw: ColliderHandle,
}

/// Collision geometry shapes supported by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryShape {
    /// Axis-aligned box with full side lengths
    Box { size: Vec3 },
    /// Sphere with the given radius
    Sphere { radius: f32 },
}

impl GeometryShape {
    /// Box sized by a full-extent scale vector
    pub fn cuboid(size: Vec3) -> Self {
        Self::Box { size }
    }

    /// Sphere whose diameter is the x component of a scale vector
    pub fn ball_from_scale(scale: Vec3) -> Self {
        Self::Sphere {
            radius: scale.x / 2.0,
        }
    }

    /// Volume of the shape
    pub fn volume(&self) -> f32 {
        match *self {
            Self::Box { size } => size.x * size.y * size.z,
            Self::Sphere { radius } => 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3),
        }
    }

    /// Mass of the shape at the given density
    pub fn mass(&self, density: f32) -> f32 {
        density * self.volume()
    }

    pub(crate) fn mass_properties(&self, density: f32) -> MassProperties {
        match *self {
            Self::Box { size } => {
                MassProperties::from_cuboid(density, to_physics_vector(size * 0.5))
            }
            Self::Sphere { radius } => MassProperties::from_ball(density, radius),
        }
    }

    pub(crate) fn to_shared_shape(self) -> SharedShape {
        match self {
            Self::Box { size } => SharedShape::cuboid(size.x / 2.0, size.y / 2.0, size.z / 2.0),
            Self::Sphere { radius } => SharedShape::ball(radius),
        }
    }
}

/// Builder for the rigid body that backs every transform
///
/// Bodies are dynamic but start disabled: they take no part in the simulation
/// until something enables them.
pub struct BodyBuilder {
    position: Vec3,
    rotation: Mat3,
    enabled: bool,
    gravity_scale: Real,
    can_sleep: bool,
}

impl BodyBuilder {
    /// Create a disabled dynamic body at the origin
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
            enabled: false,
            gravity_scale: 1.0,
            can_sleep: true,
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the initial rotation of the body
    pub fn rotation(mut self, rotation: Mat3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set whether the body is simulated from the start
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the gravity scale (1.0 = normal gravity, 0.0 = no gravity)
    pub fn gravity_scale(mut self, scale: Real) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Set whether the body can sleep when inactive
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        let isometry = Isometry::from_parts(
            to_physics_vector(self.position).into(),
            to_physics_rotation(self.rotation),
        );

        let mut body = RigidBodyBuilder::dynamic()
            .position(isometry)
            .gravity_scale(self.gravity_scale)
            .can_sleep(self.can_sleep)
            .build();
        body.set_enabled(self.enabled);
        body
    }
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a collider for the given shape
///
/// Colliders carry no mass of their own (the rigidbody sets it explicitly),
/// no friction and no bounce, and route every contact through the world's
/// contact gate.
pub fn build_geometry(shape: GeometryShape) -> Collider {
    ColliderBuilder::new(shape.to_shared_shape())
        .density(0.0)
        .friction(0.0)
        .restitution(0.0)
        .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::MODIFY_SOLVER_CONTACTS)
        .build()
}
