// Component model
//
// Every attachable behavior implements the `Behaviour` hooks. The engine's own
// components (transform, rigidbody, collider, camera, light and mesh renderer)
// are variants of the closed `ComponentKind` union; user behaviours are boxed
// trait objects in the `Behaviour` variant.
//
// ## Usage Example
//
// ```rust
// use scenegine::prelude::*;
//
// struct Spin;
//
// impl Behaviour for Spin {
//     fn update(&mut self, owner: &Owner, ctx: &mut Context) {
//         if let Some(body) = owner.body {
//             let rotation = ctx.physics.rotation(body).unwrap_or_default();
//             ctx.physics.set_rotation(body, Mat3::from_rotation_y(0.01) * rotation);
//         }
//     }
// }
//
// object.add_component(Component::behaviour(Spin), ctx);
// ```

mod camera;
mod collider;
mod light;
mod mesh_renderer;
mod rigidbody;
mod transform;

pub use camera::Camera;
pub use collider::{Collider, ColliderShape};
pub use light::{Light, LightPool, LightSlot, MAX_LIGHTS};
pub use mesh_renderer::MeshRenderer;
pub use rigidbody::Rigidbody;
pub use transform::Transform;

use glam::Vec3;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::physics::{BodyHandle, GeometryShape};
use crate::engine::scene::{Context, GameObjectId};

/// Unique identifier for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// What a hook can see of the game object it runs on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Owner {
    /// The owning game object
    pub id: GameObjectId,
    /// The component receiving the hook
    pub component: ComponentId,
    /// Physics body behind the owner's transform
    pub body: Option<BodyHandle>,
    /// Scale of the owner's transform
    pub scale: Vec3,
    /// Collision shape of the owner's collider, sized by the transform scale
    pub shape: Option<GeometryShape>,
    /// Whether the owner has a rigidbody attached
    pub has_rigidbody: bool,
}

#[cfg(test)]
impl Owner {
    /// Owner view for driving hooks directly in tests
    pub(crate) fn for_test(body: Option<BodyHandle>) -> Self {
        Self {
            id: GameObjectId::from_raw(0),
            component: ComponentId(0),
            body,
            scale: Vec3::ONE,
            shape: None,
            has_rigidbody: false,
        }
    }
}

/// Lifecycle hooks shared by every component
///
/// All hooks default to doing nothing.
pub trait Behaviour {
    /// Called once when attached, after the owner is set
    fn start(&mut self, _owner: &Owner, _ctx: &mut Context) {}

    /// Called once per frame while attached
    fn update(&mut self, _owner: &Owner, _ctx: &mut Context) {}

    /// Called when the owner's collider touches another object's collider
    fn on_collision(&mut self, _owner: &Owner, _other: GameObjectId, _ctx: &mut Context) {}

    /// Answer an ad hoc message; `None` means "not handled"
    fn handle_message(
        &mut self,
        _owner: &Owner,
        _name: &str,
        _data: &Value,
        _ctx: &mut Context,
    ) -> Option<Value> {
        None
    }

    /// Called when detached, to release whatever `start` acquired
    fn stop(&mut self, _owner: &Owner, _ctx: &mut Context) {}
}

/// Privileged per-object slots; each holds at most one live component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Transform,
    Rigidbody,
    Collider,
}

/// The closed set of component variants
pub enum ComponentKind {
    Transform(Transform),
    Rigidbody(Rigidbody),
    Collider(Collider),
    Camera(Camera),
    Light(Light),
    Renderer(MeshRenderer),
    Behaviour(Box<dyn Behaviour>),
}

impl ComponentKind {
    /// The privileged slot this variant occupies, if any
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::Transform(_) => Some(Slot::Transform),
            Self::Rigidbody(_) => Some(Slot::Rigidbody),
            Self::Collider(_) => Some(Slot::Collider),
            _ => None,
        }
    }

    /// Check if the variant issues draw calls
    pub fn is_renderable(&self) -> bool {
        matches!(self, Self::Renderer(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Transform(_) => "Transform",
            Self::Rigidbody(_) => "Rigidbody",
            Self::Collider(c) => match c.shape() {
                ColliderShape::Box => "BoxCollider",
                ColliderShape::Sphere => "SphereCollider",
            },
            Self::Camera(_) => "Camera",
            Self::Light(_) => "Light",
            Self::Renderer(_) => "Renderer",
            Self::Behaviour(_) => "Behaviour",
        }
    }

    fn hooks(&mut self) -> &mut dyn Behaviour {
        match self {
            Self::Transform(c) => c,
            Self::Rigidbody(c) => c,
            Self::Collider(c) => c,
            Self::Camera(c) => c,
            Self::Light(c) => c,
            Self::Renderer(c) => c,
            Self::Behaviour(c) => c.as_mut(),
        }
    }

    /// Drop every physics handle or slot the variant holds
    fn reset(&mut self) {
        match self {
            Self::Transform(c) => c.reset(),
            Self::Rigidbody(c) => c.reset(),
            Self::Collider(c) => c.reset(),
            Self::Light(c) => c.reset(),
            Self::Camera(_) | Self::Renderer(_) | Self::Behaviour(_) => {}
        }
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform(c) => f.debug_tuple("Transform").field(c).finish(),
            Self::Rigidbody(c) => f.debug_tuple("Rigidbody").field(c).finish(),
            Self::Collider(c) => f.debug_tuple("Collider").field(c).finish(),
            Self::Camera(c) => f.debug_tuple("Camera").field(c).finish(),
            Self::Light(c) => f.debug_tuple("Light").field(c).finish(),
            Self::Renderer(c) => f.debug_tuple("Renderer").field(c).finish(),
            Self::Behaviour(_) => f.write_str("Behaviour(..)"),
        }
    }
}

/// A component together with its identity and owner back-reference
#[derive(Debug)]
pub struct Component {
    id: ComponentId,
    owner: Option<GameObjectId>,
    kind: ComponentKind,
}

impl Component {
    /// Wrap a variant in a new, unattached component
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            id: ComponentId::next(),
            owner: None,
            kind,
        }
    }

    /// Wrap a user behaviour
    pub fn behaviour(behaviour: impl Behaviour + 'static) -> Self {
        Self::new(ComponentKind::Behaviour(Box::new(behaviour)))
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The game object this component is attached to
    pub fn owner(&self) -> Option<GameObjectId> {
        self.owner
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ComponentKind {
        &mut self.kind
    }

    pub fn as_transform(&self) -> Option<&Transform> {
        match &self.kind {
            ComponentKind::Transform(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_transform_mut(&mut self) -> Option<&mut Transform> {
        match &mut self.kind {
            ComponentKind::Transform(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_rigidbody(&self) -> Option<&Rigidbody> {
        match &self.kind {
            ComponentKind::Rigidbody(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_collider(&self) -> Option<&Collider> {
        match &self.kind {
            ComponentKind::Collider(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            ComponentKind::Camera(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            ComponentKind::Camera(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            ComponentKind::Light(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            ComponentKind::Light(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_renderer(&self) -> Option<&MeshRenderer> {
        match &self.kind {
            ComponentKind::Renderer(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_renderer_mut(&mut self) -> Option<&mut MeshRenderer> {
        match &mut self.kind {
            ComponentKind::Renderer(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn set_owner(&mut self, owner: GameObjectId) {
        self.owner = Some(owner);
    }

    pub(crate) fn start(&mut self, owner: &Owner, ctx: &mut Context) {
        self.kind.hooks().start(owner, ctx);
    }

    pub(crate) fn update(&mut self, owner: &Owner, ctx: &mut Context) {
        self.kind.hooks().update(owner, ctx);
    }

    pub(crate) fn on_collision(&mut self, owner: &Owner, other: GameObjectId, ctx: &mut Context) {
        self.kind.hooks().on_collision(owner, other, ctx);
    }

    pub(crate) fn handle_message(
        &mut self,
        owner: &Owner,
        name: &str,
        data: &Value,
        ctx: &mut Context,
    ) -> Option<Value> {
        self.kind.hooks().handle_message(owner, name, data, ctx)
    }

    pub(crate) fn stop(&mut self, owner: &Owner, ctx: &mut Context) {
        self.kind.hooks().stop(owner, ctx);
    }

    /// Return to the unattached, empty state
    pub(crate) fn reset(&mut self) {
        self.owner = None;
        self.kind.reset();
    }
}

impl From<ComponentKind> for Component {
    fn from(kind: ComponentKind) -> Self {
        Self::new(kind)
    }
}

impl From<Transform> for Component {
    fn from(c: Transform) -> Self {
        Self::new(ComponentKind::Transform(c))
    }
}

impl From<Rigidbody> for Component {
    fn from(c: Rigidbody) -> Self {
        Self::new(ComponentKind::Rigidbody(c))
    }
}

impl From<Collider> for Component {
    fn from(c: Collider) -> Self {
        Self::new(ComponentKind::Collider(c))
    }
}

impl From<Camera> for Component {
    fn from(c: Camera) -> Self {
        Self::new(ComponentKind::Camera(c))
    }
}

impl From<Light> for Component {
    fn from(c: Light) -> Self {
        Self::new(ComponentKind::Light(c))
    }
}

impl From<MeshRenderer> for Component {
    fn from(c: MeshRenderer) -> Self {
        Self::new(ComponentKind::Renderer(c))
    }
}
