use crate::engine::component::{ComponentId, LightPool};
use crate::engine::input::Input;
use crate::engine::physics::PhysicsWorld;

use super::GameObjectId;

/// Address of a component somewhere in the scene tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    pub object: GameObjectId,
    pub component: ComponentId,
}

/// Scene-wide state shared with every component hook
pub struct Context {
    /// Simulation world, collision space and contact group
    pub physics: PhysicsWorld,
    /// Input state filled by the backend each frame
    pub input: Input,
    active_camera: Option<ComponentRef>,
    lights: Vec<ComponentRef>,
    light_pool: LightPool,
}

impl Context {
    /// Create a context with an unstarted physics world
    pub fn new() -> Self {
        Self {
            physics: PhysicsWorld::new(),
            input: Input::new(),
            active_camera: None,
            lights: Vec::new(),
            light_pool: LightPool::new(),
        }
    }

    /// The most recently attached camera still in the scene
    pub fn active_camera(&self) -> Option<ComponentRef> {
        self.active_camera
    }

    pub(crate) fn set_active_camera(&mut self, camera: Option<ComponentRef>) {
        self.active_camera = camera;
    }

    /// Lights in registration order
    pub fn lights(&self) -> &[ComponentRef] {
        &self.lights
    }

    pub(crate) fn register_light(&mut self, light: ComponentRef) {
        self.lights.push(light);
    }

    pub(crate) fn unregister_light(&mut self, light: ComponentRef) {
        self.lights.retain(|l| *l != light);
    }

    pub fn light_pool(&self) -> &LightPool {
        &self.light_pool
    }

    pub fn light_pool_mut(&mut self) -> &mut LightPool {
        &mut self.light_pool
    }

    /// Drop every registry entry pointing at a component
    pub(crate) fn forget(&mut self, component: ComponentRef) {
        self.unregister_light(component);
        if self.active_camera == Some(component) {
            self.active_camera = None;
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
