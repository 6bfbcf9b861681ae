// Uniform data shared by every draw in a frame

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use super::LightParams;
use crate::core::Color;
use crate::engine::component::MAX_LIGHTS;

/// Linear fog start distance
pub const FOG_START: f32 = 10.0;
/// Linear fog end distance
pub const FOG_END: f32 = 125.0;
/// Fog and clear color
pub const FOG_COLOR: Color = Color::GRAY;
/// Ambient light present even with every light slot off
pub const GLOBAL_AMBIENT: Color = Color::rgba(0.2, 0.2, 0.2, 1.0);

/// One light slot as the shader sees it
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    /// View-space position, `w == 0` for directional lights
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// xyz: view-space spot direction, w: 1 when the slot is on
    pub spot: [f32; 4],
}

impl LightUniform {
    pub const OFF: Self = Self {
        position: [0.0, 0.0, 1.0, 0.0],
        ambient: [0.0; 4],
        diffuse: [0.0; 4],
        specular: [0.0; 4],
        spot: [0.0, 0.0, -1.0, 0.0],
    };

    /// Light in view space under the given model-view matrix
    pub fn new(light: &LightParams, model_view: Mat4) -> Self {
        let position = model_view * light.position;
        let spot = model_view * light.spot_direction.extend(0.0);
        Self {
            position: position.to_array(),
            ambient: light.ambient.to_array(),
            diffuse: light.diffuse.to_array(),
            specular: light.specular.to_array(),
            spot: Vec4::new(spot.x, spot.y, spot.z, 1.0).to_array(),
        }
    }

    pub fn is_on(&self) -> bool {
        self.spot[3] > 0.5
    }
}

/// Per-frame uniform block
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniform {
    pub projection: [[f32; 4]; 4],
    pub fog_color: [f32; 4],
    /// x: start, y: end
    pub fog_range: [f32; 4],
    pub global_ambient: [f32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl FrameUniform {
    pub fn new(projection: Mat4, lights: [LightUniform; MAX_LIGHTS]) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            fog_color: FOG_COLOR.to_array(),
            fog_range: [FOG_START, FOG_END, 0.0, 0.0],
            global_ambient: GLOBAL_AMBIENT.to_array(),
            lights,
        }
    }
}
