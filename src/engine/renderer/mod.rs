// Rendering: the backend contract, a recording backend and a wgpu backend

mod headless;
mod matrix;
pub mod mesh;
mod pass;
mod uniform;
mod vertex;
mod wgpu_backend;

pub use headless::{DrawCall, Frame, HeadlessRenderer, RenderCommand};
pub use matrix::MatrixStack;
pub use pass::{render_scene, FAR_CLIP, FIELD_OF_VIEW, NEAR_CLIP};
pub use uniform::{FrameUniform, LightUniform};
pub use vertex::{InstanceRaw, Vertex};
pub use wgpu_backend::WgpuRenderer;

use anyhow::Result;
use glam::{Mat4, Vec3, Vec4};

use crate::core::Color;
use crate::engine::component::LightSlot;

/// Built-in meshes, compiled once per backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Unit cube centered on the origin
    Cube,
    /// Sphere of radius 0.5 centered on the origin
    Sphere,
}

/// Light state handed to a backend slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    /// View-space position; `w == 0` makes the light directional
    pub position: Vec4,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub spot_direction: Vec3,
}

/// Immediate-mode drawing interface the render pass talks to
///
/// The model-view matrix is a stack: `translate`, `rotate`, `scale` and
/// `mult_matrix` post-multiply the top, `push_matrix` duplicates it.
pub trait RenderBackend {
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Perspective projection with a vertical field of view in degrees
    fn set_perspective(&mut self, fov_y_degrees: f32, aspect: f32, near: f32, far: f32);

    /// Replace the top of the matrix stack with the identity
    fn load_identity(&mut self);

    /// Clear the color and depth buffers
    fn clear(&mut self);

    fn push_matrix(&mut self);

    fn pop_matrix(&mut self);

    fn translate(&mut self, offset: Vec3);

    /// Rotate by an angle in degrees around an axis
    fn rotate(&mut self, angle_degrees: f32, axis: Vec3);

    fn scale(&mut self, factors: Vec3);

    fn mult_matrix(&mut self, matrix: Mat4);

    /// Draw a primitive with the current model-view matrix
    fn draw(&mut self, primitive: Primitive, color: Color);

    /// Switch a light slot on; the position is taken through the current matrix
    fn enable_light(&mut self, slot: LightSlot, light: &LightParams);

    fn disable_light(&mut self, slot: LightSlot);

    /// Show the finished frame
    fn present(&mut self) -> Result<()>;

    /// Release the backend; called once when the game shuts down
    fn shutdown(&mut self);
}
