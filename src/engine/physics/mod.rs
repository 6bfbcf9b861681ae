// Physics system using rapier3d

pub mod body;
mod collision;
mod world;

pub use body::{BodyBuilder, BodyHandle, GeometryHandle, GeometryShape};
pub use collision::{ContactGroup, ContactJoint, Touch};
pub use world::{PhysicsError, PhysicsState, PhysicsWorld};
