use glam::Vec3;
use log::debug;

use super::{Behaviour, Owner};
use crate::engine::physics::{BodyHandle, GeometryShape, PhysicsWorld};
use crate::engine::scene::Context;

/// Makes the owner's body take part in the simulation
///
/// Mass comes from the owner's collider shape at the given density, or from a
/// box of the transform's scale when there is no collider.
#[derive(Debug, Clone, PartialEq)]
pub struct Rigidbody {
    density: f32,
    mass: f32,
    body: Option<BodyHandle>,
}

impl Rigidbody {
    pub fn new(density: f32) -> Self {
        Self {
            density,
            mass: 0.0,
            body: None,
        }
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Mass set on the body when last started, zero while unattached
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Body this rigidbody drives, `None` while unattached
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn is_enabled(&self, physics: &PhysicsWorld) -> bool {
        self.body.map(|b| physics.is_enabled(b)).unwrap_or(false)
    }

    pub fn velocity(&self, physics: &PhysicsWorld) -> Vec3 {
        self.body
            .and_then(|b| physics.linear_velocity(b))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn set_velocity(&self, physics: &mut PhysicsWorld, velocity: Vec3) {
        if let Some(body) = self.body {
            physics.set_linear_velocity(body, velocity);
        }
    }

    pub fn use_gravity(&self, physics: &PhysicsWorld) -> bool {
        self.body
            .map(|b| physics.gravity_enabled(b))
            .unwrap_or(false)
    }

    pub fn set_use_gravity(&self, physics: &mut PhysicsWorld, enabled: bool) {
        if let Some(body) = self.body {
            physics.set_gravity_enabled(body, enabled);
        }
    }

    /// Apply a force for the next physics step
    pub fn add_force(&self, physics: &mut PhysicsWorld, force: Vec3) {
        if let Some(body) = self.body {
            physics.add_force(body, force);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.body = None;
        self.mass = 0.0;
    }
}

impl Behaviour for Rigidbody {
    fn start(&mut self, owner: &Owner, ctx: &mut Context) {
        let Some(body) = owner.body else {
            debug!("Rigidbody attached to an object without a body");
            return;
        };

        let shape = owner
            .shape
            .unwrap_or_else(|| GeometryShape::cuboid(owner.scale));
        ctx.physics.set_enabled(body, true);
        ctx.physics.set_mass(body, shape, self.density);

        self.body = Some(body);
        self.mass = shape.mass(self.density);
    }

    fn stop(&mut self, _owner: &Owner, ctx: &mut Context) {
        if let Some(body) = self.body.take() {
            ctx.physics.set_enabled(body, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::component::Transform;
    use crate::engine::config::PhysicsConfig;
    use approx::assert_relative_eq;

    fn context() -> Context {
        let mut ctx = Context::new();
        ctx.physics.start(PhysicsConfig::default());
        ctx
    }

    #[test]
    fn test_start_enables_body() {
        let mut ctx = context();
        let transform = Transform::at(&mut ctx.physics, Vec3::ZERO);
        let mut rigidbody = Rigidbody::new(2.0);
        let owner = Owner {
            scale: Vec3::new(1.0, 2.0, 3.0),
            ..Owner::for_test(transform.body())
        };

        rigidbody.start(&owner, &mut ctx);

        assert!(rigidbody.is_enabled(&ctx.physics));
        assert!(rigidbody.use_gravity(&ctx.physics));
        assert_relative_eq!(rigidbody.mass(), 12.0);
    }

    #[test]
    fn test_mass_follows_collider_shape() {
        let mut ctx = context();
        let transform = Transform::at(&mut ctx.physics, Vec3::ZERO);
        let mut rigidbody = Rigidbody::new(10.0);
        let owner = Owner {
            shape: Some(GeometryShape::Sphere { radius: 0.5 }),
            ..Owner::for_test(transform.body())
        };

        rigidbody.start(&owner, &mut ctx);
        assert_relative_eq!(rigidbody.mass(), 10.0 * 4.0 / 3.0 * std::f32::consts::PI * 0.125);
    }

    #[test]
    fn test_gravity_toggle() {
        let mut ctx = context();
        let transform = Transform::at(&mut ctx.physics, Vec3::ZERO);
        let mut rigidbody = Rigidbody::new(1.0);
        rigidbody.start(&Owner::for_test(transform.body()), &mut ctx);

        rigidbody.set_use_gravity(&mut ctx.physics, false);
        assert!(!rigidbody.use_gravity(&ctx.physics));
        rigidbody.set_use_gravity(&mut ctx.physics, true);
        assert!(rigidbody.use_gravity(&ctx.physics));
    }

    #[test]
    fn test_stop_disables_body() {
        let mut ctx = context();
        let transform = Transform::at(&mut ctx.physics, Vec3::ZERO);
        let body = transform.body().unwrap();
        let owner = Owner::for_test(Some(body));
        let mut rigidbody = Rigidbody::new(1.0);

        rigidbody.start(&owner, &mut ctx);
        rigidbody.stop(&owner, &mut ctx);

        assert!(!ctx.physics.is_enabled(body));
        assert!(!rigidbody.is_enabled(&ctx.physics));
        assert_eq!(rigidbody.velocity(&ctx.physics), Vec3::ZERO);
    }

    #[test]
    fn test_unattached_is_inert() {
        let mut ctx = context();
        let rigidbody = Rigidbody::new(1.0);
        rigidbody.set_velocity(&mut ctx.physics, Vec3::X);
        rigidbody.add_force(&mut ctx.physics, Vec3::Y);

        assert!(!rigidbody.is_enabled(&ctx.physics));
        assert_eq!(rigidbody.mass(), 0.0);
    }
}
