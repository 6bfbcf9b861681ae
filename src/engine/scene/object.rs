use glam::{Mat3, Vec3};
use log::{debug, warn};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ComponentRef, Context};
use crate::core::Color;
use crate::engine::component::{
    Collider, Component, ComponentId, ComponentKind, MeshRenderer, Owner, Rigidbody, Slot,
    Transform,
};
use crate::engine::physics::PhysicsWorld;
use crate::engine::renderer::RenderBackend;

/// Density used by the primitive constructors when none is given
pub const DEFAULT_DENSITY: f32 = 10.0;

/// Unique identifier for a game object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectId(u64);

impl GameObjectId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an id from its raw value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GameObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the scene tree
///
/// A game object owns its components and its children. The transform,
/// rigidbody and collider slots point into the component list; the transform
/// slot is filled for the whole life of the object.
#[derive(Debug)]
pub struct GameObject {
    id: GameObjectId,
    pub name: String,
    pub tag: String,
    parent: Option<GameObjectId>,
    children: Vec<GameObject>,
    components: Vec<Component>,
    transform: Option<ComponentId>,
    rigidbody: Option<ComponentId>,
    collider: Option<ComponentId>,
    renderables: Vec<ComponentId>,
}

impl GameObject {
    /// Create an object around a transform
    pub fn new(transform: Transform, ctx: &mut Context) -> Self {
        Self::with_components(transform, Vec::new(), ctx)
    }

    /// Create an object with a transform at the origin
    pub fn empty(ctx: &mut Context) -> Self {
        let transform = Transform::at(&mut ctx.physics, Vec3::ZERO);
        Self::new(transform, ctx)
    }

    /// Create an object and attach components in order
    pub fn with_components(
        transform: Transform,
        components: impl IntoIterator<Item = Component>,
        ctx: &mut Context,
    ) -> Self {
        let mut object = Self {
            id: GameObjectId::next(),
            name: String::from("GameObject"),
            tag: String::new(),
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            transform: None,
            rigidbody: None,
            collider: None,
            renderables: Vec::new(),
        };

        object.add_component(transform, ctx);
        for component in components {
            object.add_component(component, ctx);
        }
        object
    }

    /// Simulated, rendered box
    pub fn cube_primitive(
        transform: Transform,
        color: Color,
        density: f32,
        ctx: &mut Context,
    ) -> Self {
        let components = [
            Component::from(Rigidbody::new(density)),
            Component::from(MeshRenderer::cube(color)),
            Component::from(Collider::box_collider()),
        ];
        Self::with_components(transform, components, ctx).with_name("Cube")
    }

    /// Simulated, rendered sphere
    pub fn sphere_primitive(
        transform: Transform,
        color: Color,
        density: f32,
        ctx: &mut Context,
    ) -> Self {
        let components = [
            Component::from(Rigidbody::new(density)),
            Component::from(MeshRenderer::sphere(color)),
            Component::from(Collider::sphere_collider()),
        ];
        Self::with_components(transform, components, ctx).with_name("Sphere")
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn id(&self) -> GameObjectId {
        self.id
    }

    pub fn parent(&self) -> Option<GameObjectId> {
        self.parent
    }

    // ---- Components ----

    /// Attach a component and start it
    ///
    /// A transform, rigidbody or collider evicts the current occupant of its
    /// slot. A camera becomes the scene's active camera.
    pub fn add_component(&mut self, component: impl Into<Component>, ctx: &mut Context) -> ComponentId {
        let mut component = component.into();
        let id = component.id();
        let reference = ComponentRef {
            object: self.id,
            component: id,
        };

        component.set_owner(self.id);
        let kind = component.kind().name();
        let slot = component.kind().slot();
        match component.kind() {
            ComponentKind::Renderer(_) => self.renderables.push(id),
            ComponentKind::Light(_) => ctx.register_light(reference),
            ComponentKind::Camera(_) => {
                debug!("Active camera is now on '{}'", self.name);
                ctx.set_active_camera(Some(reference));
            }
            _ => {}
        }
        self.components.push(component);

        let previous = slot.and_then(|slot| self.occupy(slot, id));
        if let Some(previous) = previous {
            debug!("Replacing the {} of '{}'", kind, self.name);
            self.detach(previous, ctx);
        }

        self.start_component(id, ctx);

        match slot {
            Some(Slot::Transform) if previous.is_some() => {
                if let Some(collider) = self.collider {
                    self.restart_component(collider, ctx);
                }
                if let Some(rigidbody) = self.rigidbody {
                    self.start_component(rigidbody, ctx);
                }
            }
            Some(Slot::Collider) => {
                // Mass follows the new shape
                if let Some(rigidbody) = self.rigidbody {
                    self.start_component(rigidbody, ctx);
                }
            }
            _ => {}
        }

        id
    }

    /// Detach a component, stop it and hand it back in its reset state
    ///
    /// The current transform cannot be removed.
    pub fn remove_component(&mut self, id: ComponentId, ctx: &mut Context) -> Option<Component> {
        if self.transform == Some(id) {
            warn!("Cannot remove the transform of '{}'", self.name);
            return None;
        }
        self.detach(id, ctx)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    /// First attached component, in attachment order, whose kind matches
    pub fn find_component(&self, matches: impl Fn(&ComponentKind) -> bool) -> Option<&Component> {
        self.components.iter().find(|c| matches(c.kind()))
    }

    pub fn find_component_mut(
        &mut self,
        matches: impl Fn(&ComponentKind) -> bool,
    ) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| matches(c.kind()))
    }

    pub fn transform_slot(&self) -> Option<ComponentId> {
        self.transform
    }

    pub fn rigidbody_slot(&self) -> Option<ComponentId> {
        self.rigidbody
    }

    pub fn collider_slot(&self) -> Option<ComponentId> {
        self.collider
    }

    /// Components that draw, in attachment order
    pub fn renderables(&self) -> &[ComponentId] {
        &self.renderables
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform
            .and_then(|id| self.component(id))
            .and_then(Component::as_transform)
    }

    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        let id = self.transform?;
        self.component_mut(id).and_then(Component::as_transform_mut)
    }

    pub fn rigidbody(&self) -> Option<&Rigidbody> {
        self.rigidbody
            .and_then(|id| self.component(id))
            .and_then(Component::as_rigidbody)
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider
            .and_then(|id| self.component(id))
            .and_then(Component::as_collider)
    }

    /// World position of the object's transform
    pub fn position(&self, physics: &PhysicsWorld) -> Vec3 {
        self.transform()
            .map(|t| t.position(physics))
            .unwrap_or(Vec3::ZERO)
    }

    fn pose(&self, physics: &PhysicsWorld) -> (Vec3, Mat3, Vec3) {
        match self.transform() {
            Some(t) => (t.position(physics), t.rotation(physics), t.scale()),
            None => (Vec3::ZERO, Mat3::IDENTITY, Vec3::ONE),
        }
    }

    fn occupy(&mut self, slot: Slot, id: ComponentId) -> Option<ComponentId> {
        let target = match slot {
            Slot::Transform => &mut self.transform,
            Slot::Rigidbody => &mut self.rigidbody,
            Slot::Collider => &mut self.collider,
        };
        target.replace(id)
    }

    fn owner_view(&self, component: ComponentId) -> Owner {
        let transform = self.transform();
        let scale = transform.map(Transform::scale).unwrap_or(Vec3::ONE);
        Owner {
            id: self.id,
            component,
            body: transform.and_then(Transform::body),
            scale,
            shape: self.collider().map(|c| c.shape().geometry(scale)),
            has_rigidbody: self.rigidbody.is_some(),
        }
    }

    fn start_component(&mut self, id: ComponentId, ctx: &mut Context) {
        let owner = self.owner_view(id);
        if let Some(component) = self.component_mut(id) {
            component.start(&owner, ctx);
        }
    }

    fn restart_component(&mut self, id: ComponentId, ctx: &mut Context) {
        let owner = self.owner_view(id);
        if let Some(component) = self.component_mut(id) {
            component.stop(&owner, ctx);
            component.start(&owner, ctx);
        }
    }

    /// Take a component out of every index, stop it and reset it
    fn detach(&mut self, id: ComponentId, ctx: &mut Context) -> Option<Component> {
        let index = self.components.iter().position(|c| c.id() == id)?;
        let owner = self.owner_view(id);
        let mut component = self.components.remove(index);

        self.renderables.retain(|r| *r != id);
        for slot in [&mut self.transform, &mut self.rigidbody, &mut self.collider] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        ctx.forget(ComponentRef {
            object: self.id,
            component: id,
        });

        component.stop(&owner, ctx);
        component.reset();
        Some(component)
    }

    // ---- Tree ----

    pub fn add_child(&mut self, mut child: GameObject) {
        child.parent = Some(self.id);
        self.children.push(child);
    }

    pub fn add_children(&mut self, children: impl IntoIterator<Item = GameObject>) {
        for child in children {
            self.add_child(child);
        }
    }

    /// Detach a direct child and return its subtree
    pub fn remove_child(&mut self, id: GameObjectId) -> Option<GameObject> {
        let index = self.children.iter().position(|c| c.id == id)?;
        let mut child = self.children.remove(index);
        child.parent = None;
        Some(child)
    }

    pub fn children(&self) -> &[GameObject] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [GameObject] {
        &mut self.children
    }

    /// Find this object or a descendant by id
    pub fn find(&self, id: GameObjectId) -> Option<&GameObject> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// First object in pre-order with the given name
    pub fn find_by_name(&self, name: &str) -> Option<&GameObject> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_name(name))
    }

    /// Detach a descendant at any depth
    pub(crate) fn take_descendant(&mut self, id: GameObjectId) -> Option<GameObject> {
        if let Some(child) = self.remove_child(id) {
            return Some(child);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.take_descendant(id))
    }

    /// Stop and detach every component of the subtree, children first
    pub(crate) fn teardown(&mut self, ctx: &mut Context) {
        for child in &mut self.children {
            child.teardown(ctx);
        }
        let ids: Vec<ComponentId> = self.components.iter().rev().map(Component::id).collect();
        for id in ids {
            self.detach(id, ctx);
        }
    }

    // ---- Per frame ----

    /// Update every component, then the children
    pub fn update(&mut self, ctx: &mut Context) {
        for index in 0..self.components.len() {
            let owner = self.owner_view(self.components[index].id());
            self.components[index].update(&owner, ctx);
        }
        for child in &mut self.children {
            child.update(ctx);
        }
    }

    /// Draw every renderable component, then the children
    pub fn render(&self, renderer: &mut dyn RenderBackend, physics: &PhysicsWorld) {
        let (position, rotation, scale) = self.pose(physics);
        for id in &self.renderables {
            if let Some(mesh) = self.component(*id).and_then(Component::as_renderer) {
                mesh.render(renderer, position, rotation, scale);
            }
        }
        for child in &self.children {
            child.render(renderer, physics);
        }
    }

    /// Tell every component that this object touched `other`
    pub fn on_collision(&mut self, other: GameObjectId, ctx: &mut Context) {
        for index in 0..self.components.len() {
            let owner = self.owner_view(self.components[index].id());
            self.components[index].on_collision(&owner, other, ctx);
        }
    }

    /// Offer a message to components in attachment order
    ///
    /// Stops at the first component that answers.
    pub fn handle_message(&mut self, name: &str, data: &Value, ctx: &mut Context) -> Option<Value> {
        for index in 0..self.components.len() {
            let owner = self.owner_view(self.components[index].id());
            let answer = self.components[index].handle_message(&owner, name, data, ctx);
            if answer.is_some() {
                return answer;
            }
        }
        None
    }
}
