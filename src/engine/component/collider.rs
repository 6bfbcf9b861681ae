use glam::Vec3;
use log::debug;

use super::{Behaviour, Owner};
use crate::engine::physics::{GeometryHandle, GeometryShape};
use crate::engine::scene::Context;

/// Shape family of a collider; the size comes from the owner's scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderShape {
    /// Box with the full scale as its side lengths
    Box,
    /// Sphere with half the x scale as its radius
    Sphere,
}

impl ColliderShape {
    /// Geometry of this shape for a given scale
    pub fn geometry(self, scale: Vec3) -> GeometryShape {
        match self {
            Self::Box => GeometryShape::cuboid(scale),
            Self::Sphere => GeometryShape::ball_from_scale(scale),
        }
    }
}

/// Collision geometry bound to the owner's body
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    shape: ColliderShape,
    geometry: Option<GeometryHandle>,
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            geometry: None,
        }
    }

    pub fn box_collider() -> Self {
        Self::new(ColliderShape::Box)
    }

    pub fn sphere_collider() -> Self {
        Self::new(ColliderShape::Sphere)
    }

    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    /// Geometry in the collision space, `None` while unattached
    pub fn geometry(&self) -> Option<GeometryHandle> {
        self.geometry
    }

    pub(crate) fn reset(&mut self) {
        self.geometry = None;
    }
}

impl Behaviour for Collider {
    fn start(&mut self, owner: &Owner, ctx: &mut Context) {
        let Some(body) = owner.body else {
            debug!("Collider attached to an object without a body");
            return;
        };

        if let Some(old) = self.geometry.take() {
            ctx.physics.remove_geometry(old);
        }
        self.geometry =
            ctx.physics
                .create_geometry(self.shape.geometry(owner.scale), body, owner.id);

        // Static colliders collide without moving
        if !owner.has_rigidbody {
            ctx.physics.set_enabled(body, false);
        }
    }

    fn stop(&mut self, _owner: &Owner, ctx: &mut Context) {
        if let Some(geometry) = self.geometry.take() {
            ctx.physics.remove_geometry(geometry);
        }
    }
}
