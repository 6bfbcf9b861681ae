use glam::Vec3;
use rapier3d::prelude::*;
use std::collections::HashSet;

use super::body::{BodyHandle, GeometryHandle};
use crate::engine::scene::GameObjectId;

/// Two game objects whose geometries overlapped during a collision test
///
/// Every touch is dispatched both ways: `first` hears about `second`
/// and `second` hears about `first`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touch {
    pub first: GameObjectId,
    pub second: GameObjectId,
}

/// Contact response between two active bodies for a single physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactJoint {
    pub geometries: (GeometryHandle, GeometryHandle),
    pub bodies: (BodyHandle, BodyHandle),
    /// Contact point on the first geometry, in world space
    pub point: Vec3,
    /// Contact normal pointing from the first geometry to the second
    pub normal: Vec3,
    /// Penetration depth (positive when the shapes overlap)
    pub depth: f32,
    /// Always zero: contacts are frictionless
    pub friction: f32,
    /// Always zero: contacts never bounce
    pub restitution: f32,
}

impl ContactJoint {
    /// Check if the joint connects the two colliders, in either order
    pub fn connects(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        let (g1, g2) = self.geometries;
        (g1.raw == a && g2.raw == b) || (g1.raw == b && g2.raw == a)
    }
}

/// Per-step container of contact joints
///
/// Joints live for at most one step: the world empties the group right after
/// integrating.
#[derive(Debug, Default)]
pub struct ContactGroup {
    joints: Vec<ContactJoint>,
}

impl ContactGroup {
    pub fn new() -> Self {
        Self {
            joints: Vec::with_capacity(32),
        }
    }

    /// Attach a joint to the group
    pub fn attach(&mut self, joint: ContactJoint) {
        self.joints.push(joint);
    }

    /// Remove every joint
    pub fn clear(&mut self) {
        self.joints.clear();
    }

    pub fn joints(&self) -> &[ContactJoint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Check if any joint in the group involves the given body
    pub fn involves(&self, body: BodyHandle) -> bool {
        self.joints
            .iter()
            .any(|j| j.bodies.0 == body || j.bodies.1 == body)
    }
}

/// Physics hooks that only let the solver respond to pairs with a contact joint
///
/// Solver contacts that pass the gate are forced to be frictionless and
/// non-bouncy.
pub(crate) struct ContactGate {
    allowed: HashSet<(ColliderHandle, ColliderHandle)>,
}

impl ContactGate {
    pub(crate) fn new(group: &ContactGroup) -> Self {
        let mut allowed = HashSet::with_capacity(group.len() * 2);
        for joint in group.joints() {
            let (g1, g2) = joint.geometries;
            allowed.insert((g1.raw, g2.raw));
            allowed.insert((g2.raw, g1.raw));
        }
        Self { allowed }
    }

    fn allows(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.allowed.contains(&(a, b))
    }
}

impl PhysicsHooks for ContactGate {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        if self.allows(context.collider1, context.collider2) {
            Some(SolverFlags::COMPUTE_IMPULSES)
        } else {
            None
        }
    }

    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = 0.0;
            contact.restitution = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(a: u32, b: u32) -> ContactJoint {
        let body = BodyHandle {
            epoch: 1,
            raw: RigidBodyHandle::from_raw_parts(a, 0),
        };
        let other = BodyHandle {
            epoch: 1,
            raw: RigidBodyHandle::from_raw_parts(b, 0),
        };
        ContactJoint {
            geometries: (
                GeometryHandle {
                    epoch: 1,
                    raw: ColliderHandle::from_raw_parts(a, 0),
                },
                GeometryHandle {
                    epoch: 1,
                    raw: ColliderHandle::from_raw_parts(b, 0),
                },
            ),
            bodies: (body, other),
            point: Vec3::ZERO,
            normal: Vec3::Y,
            depth: 0.0,
            friction: 0.0,
            restitution: 0.0,
        }
    }

    #[test]
    fn test_group_clear() {
        let mut group = ContactGroup::new();
        assert!(group.is_empty());

        group.attach(joint(0, 1));
        group.attach(joint(1, 2));
        assert_eq!(group.len(), 2);

        group.clear();
        assert!(group.is_empty());
    }

    #[test]
    fn test_joint_connects_either_order() {
        let j = joint(3, 4);
        let a = ColliderHandle::from_raw_parts(3, 0);
        let b = ColliderHandle::from_raw_parts(4, 0);
        let c = ColliderHandle::from_raw_parts(5, 0);

        assert!(j.connects(a, b));
        assert!(j.connects(b, a));
        assert!(!j.connects(a, c));
    }

    #[test]
    fn test_gate_only_allows_grouped_pairs() {
        let mut group = ContactGroup::new();
        group.attach(joint(0, 1));
        let gate = ContactGate::new(&group);

        let a = ColliderHandle::from_raw_parts(0, 0);
        let b = ColliderHandle::from_raw_parts(1, 0);
        let c = ColliderHandle::from_raw_parts(2, 0);
        assert!(gate.allows(a, b));
        assert!(gate.allows(b, a));
        assert!(!gate.allows(a, c));
    }
}
