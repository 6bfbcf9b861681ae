// Scene tree and the state its components share

mod context;
mod object;

pub use context::{ComponentRef, Context};
pub use object::{GameObject, GameObjectId, DEFAULT_DENSITY};

use glam::Vec3;
use log::{debug, info, warn};
use serde_json::Value;

use crate::engine::component::{Camera, Component, ComponentId, Light};
use crate::engine::config::PhysicsConfig;
use crate::engine::physics::PhysicsError;

/// Root game object plus the context every hook runs against
pub struct Scene {
    root: GameObject,
    ctx: Context,
}

impl Scene {
    /// Start the physics world and create an empty root
    pub fn new(physics: PhysicsConfig) -> Self {
        let mut ctx = Context::new();
        ctx.physics.start(physics);
        let root = GameObject::empty(&mut ctx).with_name("Scene");
        info!("Scene created");
        Self { root, ctx }
    }

    pub fn root(&self) -> &GameObject {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut GameObject {
        &mut self.root
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Borrow the tree and the context at the same time
    pub fn split_mut(&mut self) -> (&mut GameObject, &mut Context) {
        (&mut self.root, &mut self.ctx)
    }

    /// Add an object under the root
    pub fn add(&mut self, object: GameObject) -> GameObjectId {
        let id = object.id();
        self.root.add_child(object);
        id
    }

    pub fn find(&self, id: GameObjectId) -> Option<&GameObject> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.root.find_mut(id)
    }

    pub fn add_component(
        &mut self,
        object: GameObjectId,
        component: impl Into<Component>,
    ) -> Option<ComponentId> {
        let object = self.root.find_mut(object)?;
        Some(object.add_component(component, &mut self.ctx))
    }

    pub fn remove_component(
        &mut self,
        object: GameObjectId,
        component: ComponentId,
    ) -> Option<Component> {
        self.root
            .find_mut(object)?
            .remove_component(component, &mut self.ctx)
    }

    /// Detach an object from its parent and tear its subtree down
    ///
    /// Returns false when no such object is in the tree.
    pub fn destroy(&mut self, id: GameObjectId) -> bool {
        if id == self.root.id() {
            warn!("The scene root cannot be destroyed");
            return false;
        }
        match self.root.take_descendant(id) {
            Some(mut object) => {
                debug!("Destroying '{}' {}", object.name, id);
                object.teardown(&mut self.ctx);
                true
            }
            None => false,
        }
    }

    /// Send a message to one object's components
    pub fn send_message(&mut self, object: GameObjectId, name: &str, data: &Value) -> Option<Value> {
        self.root
            .find_mut(object)?
            .handle_message(name, data, &mut self.ctx)
    }

    /// Run every component's update hook, root first
    pub fn update(&mut self) {
        self.root.update(&mut self.ctx);
    }

    /// Collision test plus dispatch of `on_collision` to both sides of every touch
    ///
    /// Returns the number of touching pairs.
    pub fn collide(&mut self) -> Result<usize, PhysicsError> {
        let touches = self.ctx.physics.collide()?;
        for touch in &touches {
            if let Some(object) = self.root.find_mut(touch.first) {
                object.on_collision(touch.second, &mut self.ctx);
            }
            if let Some(object) = self.root.find_mut(touch.second) {
                object.on_collision(touch.first, &mut self.ctx);
            }
        }
        Ok(touches.len())
    }

    /// Advance the physics world by a fixed step
    pub fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        self.ctx.physics.step(dt)
    }

    /// Active camera and the position of the object carrying it
    pub fn active_camera(&self) -> Option<(&Camera, Vec3)> {
        let reference = self.ctx.active_camera()?;
        let object = self.root.find(reference.object)?;
        let camera = object.component(reference.component)?.as_camera()?;
        Some((camera, object.position(&self.ctx.physics)))
    }

    /// Registered lights with their positions, in registration order
    ///
    /// Lights on objects that are no longer in the tree are skipped.
    pub fn lights(&self) -> impl Iterator<Item = (&Light, Vec3)> + '_ {
        self.ctx.lights().iter().filter_map(move |reference| {
            let object = self.root.find(reference.object)?;
            let light = object.component(reference.component)?.as_light()?;
            Some((light, object.position(&self.ctx.physics)))
        })
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.ctx.physics.stop();
    }
}
