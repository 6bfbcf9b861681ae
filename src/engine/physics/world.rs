use glam::{Mat3, Vec3};
use log::{debug, info, warn};
use rapier3d::parry::query;
use rapier3d::prelude::*;

use super::body::{build_geometry, BodyBuilder, BodyHandle, GeometryHandle, GeometryShape};
use super::collision::{ContactGate, ContactGroup, ContactJoint, Touch};
use crate::core::math::{
    from_physics_rotation, from_physics_vector, to_physics_rotation, to_physics_vector,
};
use crate::engine::config::PhysicsConfig;
use crate::engine::scene::GameObjectId;

/// Errors raised when the world is driven outside its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhysicsError {
    #[error("Physics world must be started before calling {0}")]
    NotStarted(&'static str),
}

/// Lifecycle of the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsState {
    Uninitialized,
    Started,
    Stopped,
}

/// A collision geometry registered in the shared collision space
#[derive(Debug, Clone, Copy)]
struct SpaceEntry {
    handle: ColliderHandle,
    owner: GameObjectId,
}

/// Physics world that owns the simulation, the collision space and the contact group
pub struct PhysicsWorld {
    state: PhysicsState,

    /// Bumped on every start so that stale handles stop resolving
    epoch: u32,

    /// Gravity, error reduction and constraint mixing parameters
    config: PhysicsConfig,

    /// Gravity vector in the backend's representation
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Query pipeline for scene queries
    query_pipeline: QueryPipeline,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,

    /// Collision space: geometries in registration order with their owners
    space: Vec<SpaceEntry>,

    /// Contact joints created by the last collision test
    contact_group: ContactGroup,
}

impl PhysicsWorld {
    /// Create an uninitialized world; call `start` before stepping it
    pub fn new() -> Self {
        let config = PhysicsConfig::default();
        Self {
            state: PhysicsState::Uninitialized,
            epoch: 0,
            gravity: to_physics_vector(config.gravity),
            config,
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            space: Vec::new(),
            contact_group: ContactGroup::new(),
        }
    }

    /// (Re)create the world, collision space and contact group from scratch
    ///
    /// This is a hard reset: every body and geometry created before the call
    /// is gone, and their handles no longer resolve.
    pub fn start(&mut self, config: PhysicsConfig) {
        *self = Self {
            state: PhysicsState::Started,
            epoch: self.epoch.wrapping_add(1),
            gravity: to_physics_vector(config.gravity),
            config,
            ..Self::new()
        };
        info!(
            "Physics world started (gravity {:?}, erp {}, cfm {})",
            config.gravity, config.erp, config.cfm
        );
    }

    /// Release every body and geometry and stop the world
    pub fn stop(&mut self) {
        let epoch = self.epoch;
        *self = Self {
            state: PhysicsState::Stopped,
            epoch,
            ..Self::new()
        };
        info!("Physics world stopped");
    }

    pub fn state(&self) -> PhysicsState {
        self.state
    }

    /// Advance the simulation by `dt` seconds, then empty the contact group
    pub fn step(&mut self, dt: Real) -> Result<(), PhysicsError> {
        if self.state != PhysicsState::Started {
            return Err(PhysicsError::NotStarted("step"));
        }

        self.integration_parameters.dt = dt;
        self.resolve_contact_joints(dt);
        let gate = ContactGate::new(&self.contact_group);

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &gate,
            &(),
        );

        // Forces apply to a single step
        for (_, body) in self.rigid_body_set.iter_mut() {
            body.reset_forces(false);
        }

        self.contact_group.clear();
        Ok(())
    }

    /// Apply the contact group's normal impulses to body velocities
    ///
    /// Each joint stops its bodies from approaching along the contact normal
    /// and pushes them apart by `erp` of the penetration depth over `dt`.
    /// Contacts are frictionless, so tangential velocity is left alone.
    fn resolve_contact_joints(&mut self, dt: Real) {
        let erp = self.config.erp;
        for joint in self.contact_group.joints() {
            let (h1, h2) = (joint.bodies.0.raw, joint.bodies.1.raw);
            let (Some(body1), Some(body2)) =
                (self.rigid_body_set.get(h1), self.rigid_body_set.get(h2))
            else {
                continue;
            };

            let inv_mass1 = inverse_mass(body1);
            let inv_mass2 = inverse_mass(body2);
            let inv_mass_sum = inv_mass1 + inv_mass2;
            if inv_mass_sum <= 0.0 {
                continue;
            }

            let v1 = from_physics_vector(body1.linvel());
            let v2 = from_physics_vector(body2.linvel());
            let normal = joint.normal;

            // Positive when the bodies separate
            let normal_speed = (v2 - v1).dot(normal);
            let target_speed = if dt > 0.0 {
                erp * joint.depth.max(0.0) / dt
            } else {
                0.0
            };
            if normal_speed >= target_speed {
                continue;
            }

            let impulse = (target_speed - normal_speed) / inv_mass_sum;
            if let Some(body) = self.rigid_body_set.get_mut(h1) {
                body.set_linvel(to_physics_vector(v1 - normal * impulse * inv_mass1), true);
            }
            if let Some(body) = self.rigid_body_set.get_mut(h2) {
                body.set_linvel(to_physics_vector(v2 + normal * impulse * inv_mass2), true);
            }
        }
    }

    /// Test every pair of geometries in the space for overlap
    ///
    /// Each overlapping pair is reported as a `Touch` whether or not its
    /// bodies are simulated. Contact joints are only created when both
    /// bodies are enabled.
    pub fn collide(&mut self) -> Result<Vec<Touch>, PhysicsError> {
        if self.state != PhysicsState::Started {
            return Err(PhysicsError::NotStarted("collide"));
        }

        let mut touches = Vec::new();
        for (i, first) in self.space.iter().enumerate() {
            for second in &self.space[i + 1..] {
                let (Some(c1), Some(c2)) = (
                    self.collider_set.get(first.handle),
                    self.collider_set.get(second.handle),
                ) else {
                    continue;
                };
                let (Some(b1), Some(b2)) = (c1.parent(), c2.parent()) else {
                    continue;
                };
                if b1 == b2 {
                    continue;
                }
                let (Some(body1), Some(body2)) =
                    (self.rigid_body_set.get(b1), self.rigid_body_set.get(b2))
                else {
                    continue;
                };

                // Narrow phase: the contact points between the two geometries
                let contacts: Vec<_> = match query::contact(
                    body1.position(),
                    c1.shape(),
                    body2.position(),
                    c2.shape(),
                    0.0,
                ) {
                    Ok(contact) => contact.into_iter().collect(),
                    Err(_) => {
                        warn!("Unsupported shape pair in collision test, skipping");
                        continue;
                    }
                };
                if contacts.is_empty() {
                    continue;
                }

                touches.push(Touch {
                    first: first.owner,
                    second: second.owner,
                });

                for contact in contacts {
                    let joint = ContactJoint {
                        geometries: (
                            GeometryHandle {
                                epoch: self.epoch,
                                raw: first.handle,
                            },
                            GeometryHandle {
                                epoch: self.epoch,
                                raw: second.handle,
                            },
                        ),
                        bodies: (
                            BodyHandle {
                                epoch: self.epoch,
                                raw: b1,
                            },
                            BodyHandle {
                                epoch: self.epoch,
                                raw: b2,
                            },
                        ),
                        point: from_physics_vector(&contact.point1.coords),
                        normal: from_physics_vector(&contact.normal1),
                        depth: -contact.dist,
                        friction: 0.0,
                        restitution: 0.0,
                    };

                    // A disabled body ends contact processing for the whole pair
                    if !body1.is_enabled() || !body2.is_enabled() {
                        break;
                    }
                    self.contact_group.attach(joint);
                }
            }
        }

        if !touches.is_empty() {
            debug!(
                "Collision test: {} touches, {} contact joints",
                touches.len(),
                self.contact_group.len()
            );
        }
        Ok(touches)
    }

    /// Contact joints waiting for the next step
    pub fn contact_group(&self) -> &ContactGroup {
        &self.contact_group
    }

    /// Add a rigid body to the world
    pub fn create_body(&mut self, builder: BodyBuilder) -> BodyHandle {
        BodyHandle {
            epoch: self.epoch,
            raw: self.rigid_body_set.insert(builder.build()),
        }
    }

    /// Remove a rigid body; its geometries stay in the space, detached
    pub fn remove_body(&mut self, handle: BodyHandle) {
        if handle.epoch != self.epoch {
            return;
        }
        self.rigid_body_set.remove(
            handle.raw,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            false, // keep attached colliders, their owners release them
        );
    }

    /// Create a geometry bound to a body and register it in the collision space
    pub fn create_geometry(
        &mut self,
        shape: GeometryShape,
        body: BodyHandle,
        owner: GameObjectId,
    ) -> Option<GeometryHandle> {
        if body.epoch != self.epoch || !self.rigid_body_set.contains(body.raw) {
            warn!("Cannot create geometry for a body from another world");
            return None;
        }

        let handle = self.collider_set.insert_with_parent(
            build_geometry(shape),
            body.raw,
            &mut self.rigid_body_set,
        );
        self.space.push(SpaceEntry { handle, owner });

        Some(GeometryHandle {
            epoch: self.epoch,
            raw: handle,
        })
    }

    /// Remove a geometry from the collision space
    pub fn remove_geometry(&mut self, handle: GeometryHandle) {
        if handle.epoch != self.epoch {
            return;
        }
        self.space.retain(|entry| entry.handle != handle.raw);
        self.collider_set.remove(
            handle.raw,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true, // wake up attached body
        );
    }

    /// Get the game object that owns a geometry
    pub fn geometry_owner(&self, handle: GeometryHandle) -> Option<GameObjectId> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.space
            .iter()
            .find(|entry| entry.handle == handle.raw)
            .map(|entry| entry.owner)
    }

    /// Get the shape of a geometry
    pub fn geometry_shape(&self, handle: GeometryHandle) -> Option<GeometryShape> {
        let collider = self.get_collider(handle)?;
        if let Some(ball) = collider.shape().as_ball() {
            return Some(GeometryShape::Sphere {
                radius: ball.radius,
            });
        }
        collider.shape().as_cuboid().map(|cuboid| GeometryShape::Box {
            size: from_physics_vector(&cuboid.half_extents) * 2.0,
        })
    }

    /// Number of geometries in the collision space
    pub fn geometry_count(&self) -> usize {
        self.space.len()
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Get a reference to a rigid body
    pub fn get_rigid_body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.rigid_body_set.get(handle.raw)
    }

    /// Get a mutable reference to a rigid body
    pub fn get_rigid_body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.rigid_body_set.get_mut(handle.raw)
    }

    /// Get a reference to a collider
    pub fn get_collider(&self, handle: GeometryHandle) -> Option<&Collider> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.collider_set.get(handle.raw)
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec3> {
        self.get_rigid_body(handle)
            .map(|body| from_physics_vector(body.translation()))
    }

    pub fn set_position(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.get_rigid_body_mut(handle) {
            body.set_translation(to_physics_vector(position), true);
        }
    }

    pub fn rotation(&self, handle: BodyHandle) -> Option<Mat3> {
        self.get_rigid_body(handle)
            .map(|body| from_physics_rotation(body.rotation()))
    }

    pub fn set_rotation(&mut self, handle: BodyHandle, rotation: Mat3) {
        if let Some(body) = self.get_rigid_body_mut(handle) {
            body.set_rotation(to_physics_rotation(rotation), true);
        }
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.get_rigid_body(handle)
            .map(|body| from_physics_vector(body.linvel()))
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.get_rigid_body_mut(handle) {
            body.set_linvel(to_physics_vector(velocity), true);
        }
    }

    /// Check if gravity acts on a body
    pub fn gravity_enabled(&self, handle: BodyHandle) -> bool {
        self.get_rigid_body(handle)
            .map(|body| body.gravity_scale() != 0.0)
            .unwrap_or(false)
    }

    pub fn set_gravity_enabled(&mut self, handle: BodyHandle, enabled: bool) {
        if let Some(body) = self.get_rigid_body_mut(handle) {
            body.set_gravity_scale(if enabled { 1.0 } else { 0.0 }, true);
        }
    }

    /// Check if a body takes part in the simulation
    pub fn is_enabled(&self, handle: BodyHandle) -> bool {
        self.get_rigid_body(handle)
            .map(|body| body.is_enabled())
            .unwrap_or(false)
    }

    pub fn set_enabled(&mut self, handle: BodyHandle, enabled: bool) {
        if let Some(body) = self.get_rigid_body_mut(handle) {
            body.set_enabled(enabled);
        }
    }

    /// Give a body the mass of `shape` at `density`
    pub fn set_mass(&mut self, handle: BodyHandle, shape: GeometryShape, density: Real) {
        if let Some(body) = self.get_rigid_body_mut(handle) {
            body.set_additional_mass_properties(shape.mass_properties(density), true);
        }
    }

    /// Apply a force for the next step
    pub fn add_force(&mut self, handle: BodyHandle, force: Vec3) {
        if let Some(body) = self.get_rigid_body_mut(handle) {
            body.add_force(to_physics_vector(force), true);
        }
    }

    /// Get current gravity
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Error reduction parameter the world was started with
    pub fn erp(&self) -> f32 {
        self.config.erp
    }

    /// Constraint force mixing the world was started with
    pub fn cfm(&self) -> f32 {
        self.config.cfm
    }
}

fn inverse_mass(body: &RigidBody) -> Real {
    let mass = body.mass();
    if body.is_dynamic() && mass > 0.0 {
        1.0 / mass
    } else {
        0.0
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn started() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.start(PhysicsConfig::default());
        world
    }

    fn ball_at(world: &mut PhysicsWorld, owner: u64, y: f32, enabled: bool) -> BodyHandle {
        let body = world.create_body(BodyBuilder::new().position(Vec3::new(0.0, y, 0.0)));
        let shape = GeometryShape::ball_from_scale(Vec3::ONE);
        world.create_geometry(shape, body, GameObjectId::from_raw(owner));
        if enabled {
            world.set_enabled(body, true);
            world.set_mass(body, shape, 1.0);
        }
        body
    }

    #[test]
    fn test_lifecycle() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.state(), PhysicsState::Uninitialized);
        assert_eq!(world.step(1.0 / 60.0), Err(PhysicsError::NotStarted("step")));
        assert!(world.collide().is_err());

        world.start(PhysicsConfig::default());
        assert_eq!(world.state(), PhysicsState::Started);
        assert!(world.step(1.0 / 60.0).is_ok());

        world.stop();
        assert_eq!(world.state(), PhysicsState::Stopped);
        assert!(world.collide().is_err());
    }

    #[test]
    fn test_restart_invalidates_handles() {
        let mut world = started();
        let body = world.create_body(BodyBuilder::new().position(Vec3::ONE));
        assert!(world.position(body).is_some());

        world.start(PhysicsConfig::default());
        assert_eq!(world.body_count(), 0);
        assert!(world.position(body).is_none());

        // A new body in the fresh world does not alias the stale handle
        let fresh = world.create_body(BodyBuilder::new());
        assert_ne!(fresh, body);
        assert!(world.position(body).is_none());
    }

    #[test]
    fn test_body_accessors() {
        let mut world = started();
        let body = world.create_body(BodyBuilder::new());
        assert!(!world.is_enabled(body));
        assert!(world.gravity_enabled(body));

        world.set_position(body, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(world.position(body), Some(Vec3::new(1.0, 2.0, 3.0)));

        world.set_linear_velocity(body, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(world.linear_velocity(body), Some(Vec3::new(0.0, 4.0, 0.0)));

        world.set_gravity_enabled(body, false);
        assert!(!world.gravity_enabled(body));

        world.set_enabled(body, true);
        assert!(world.is_enabled(body));

        let rotation = Mat3::from_rotation_z(0.5);
        world.set_rotation(body, rotation);
        let back = world.rotation(body).unwrap();
        assert_relative_eq!(back.x_axis.x, rotation.x_axis.x, epsilon = 1e-5);
        assert_relative_eq!(back.x_axis.y, rotation.x_axis.y, epsilon = 1e-5);
    }

    #[test]
    fn test_disabled_pair_touches_without_joints() {
        let mut world = started();
        ball_at(&mut world, 1, 0.0, false);
        ball_at(&mut world, 2, 0.5, false);

        let touches = world.collide().unwrap();
        assert_eq!(touches.len(), 1);
        assert_eq!(touches[0].first, GameObjectId::from_raw(1));
        assert_eq!(touches[0].second, GameObjectId::from_raw(2));
        assert!(world.contact_group().is_empty());
    }

    #[test]
    fn test_one_disabled_body_suppresses_joints() {
        let mut world = started();
        ball_at(&mut world, 1, 0.0, true);
        ball_at(&mut world, 2, 0.5, false);

        assert_eq!(world.collide().unwrap().len(), 1);
        assert!(world.contact_group().is_empty());
    }

    #[test]
    fn test_enabled_pair_creates_frictionless_joint() {
        let mut world = started();
        let a = ball_at(&mut world, 1, 0.0, true);
        ball_at(&mut world, 2, 0.5, true);

        assert_eq!(world.collide().unwrap().len(), 1);
        assert_eq!(world.contact_group().len(), 1);

        let joint = world.contact_group().joints()[0];
        assert_eq!(joint.friction, 0.0);
        assert_eq!(joint.restitution, 0.0);
        assert!(joint.depth > 0.0);
        assert!(world.contact_group().involves(a));
    }

    #[test]
    fn test_joint_responds_in_the_same_step() {
        let mut world = started();
        let resting = ball_at(&mut world, 1, 0.0, true);
        let falling = ball_at(&mut world, 2, 5.0, true);
        world.set_gravity_enabled(resting, false);
        world.set_gravity_enabled(falling, false);
        // Settle mass properties before the bodies meet
        world.step(1.0 / 60.0).unwrap();

        world.set_position(falling, Vec3::new(0.0, 0.9, 0.0));
        world.set_linear_velocity(falling, Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(world.collide().unwrap().len(), 1);
        world.step(1.0 / 60.0).unwrap();

        let v_falling = world.linear_velocity(falling).unwrap();
        let v_resting = world.linear_velocity(resting).unwrap();
        assert!(v_falling.y > v_resting.y, "{v_falling} vs {v_resting}");
        assert!(v_resting.y < 0.0);
    }

    #[test]
    fn test_start_keeps_parameters() {
        let mut world = PhysicsWorld::new();
        let config = PhysicsConfig {
            gravity: Vec3::new(0.0, -1.0, 0.0),
            erp: 0.5,
            cfm: 1e-3,
        };
        world.start(config);
        assert_eq!(world.gravity(), config.gravity);
        assert_eq!(world.erp(), 0.5);
        assert_eq!(world.cfm(), 1e-3);
    }

    #[test]
    fn test_step_clears_contact_group() {
        let mut world = started();
        ball_at(&mut world, 1, 0.0, true);
        ball_at(&mut world, 2, 0.5, true);

        world.collide().unwrap();
        assert!(!world.contact_group().is_empty());

        world.step(1.0 / 60.0).unwrap();
        assert!(world.contact_group().is_empty());
    }

    #[test]
    fn test_separated_geometries_do_not_touch() {
        let mut world = started();
        ball_at(&mut world, 1, 0.0, true);
        ball_at(&mut world, 2, 5.0, true);

        assert!(world.collide().unwrap().is_empty());
        assert!(world.contact_group().is_empty());
    }

    #[test]
    fn test_removed_geometry_leaves_space() {
        let mut world = started();
        let body = world.create_body(BodyBuilder::new());
        let geom = world
            .create_geometry(
                GeometryShape::cuboid(Vec3::ONE),
                body,
                GameObjectId::from_raw(7),
            )
            .unwrap();
        assert_eq!(world.geometry_owner(geom), Some(GameObjectId::from_raw(7)));
        assert_eq!(
            world.geometry_shape(geom),
            Some(GeometryShape::Box { size: Vec3::ONE })
        );

        world.remove_geometry(geom);
        assert_eq!(world.geometry_count(), 0);
        assert_eq!(world.geometry_owner(geom), None);
    }

    #[test]
    fn test_gravity_moves_enabled_bodies_only() {
        let mut world = started();
        let falling = ball_at(&mut world, 1, 10.0, true);
        let resting = ball_at(&mut world, 2, 20.0, false);

        for _ in 0..10 {
            world.step(1.0 / 60.0).unwrap();
        }

        assert!(world.position(falling).unwrap().y < 10.0);
        assert_eq!(world.position(resting).unwrap().y, 20.0);
    }
}
