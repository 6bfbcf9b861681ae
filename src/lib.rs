// scenegine: a small 3D game engine built from a scene graph of components

pub mod core;
pub mod engine;

/// The types most games need in one import
pub mod prelude {
    pub use crate::core::Color;
    pub use crate::engine::component::{
        Behaviour, Camera, Collider, Component, ComponentKind, Light, MeshRenderer, Owner,
        Rigidbody, Transform,
    };
    pub use crate::engine::config::{GameConfig, PhysicsConfig};
    pub use crate::engine::game::Game;
    pub use crate::engine::input::{Input, KeyCode, MouseButton};
    pub use crate::engine::scene::{Context, GameObject, GameObjectId, Scene};
    pub use glam::{Mat3, Vec2, Vec3};
    pub use serde_json::Value;
}
