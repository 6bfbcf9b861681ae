use glam::{Vec3, Vec4};
use log::{debug, warn};

use super::{Behaviour, Owner};
use crate::core::Color;
use crate::engine::renderer::{LightParams, RenderBackend};
use crate::engine::scene::Context;

/// Number of hardware light slots
pub const MAX_LIGHTS: usize = 8;

/// One of the renderer's fixed light slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightSlot(u8);

impl LightSlot {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Pool of free light slots, always handing out the lowest one
#[derive(Debug, Clone)]
pub struct LightPool {
    free: Vec<LightSlot>,
}

impl LightPool {
    pub fn new() -> Self {
        Self {
            free: (0..MAX_LIGHTS as u8).rev().map(LightSlot).collect(),
        }
    }

    /// Take the lowest free slot
    pub fn acquire(&mut self) -> Option<LightSlot> {
        self.free.pop()
    }

    /// Give a slot back
    pub fn release(&mut self, slot: LightSlot) {
        if self.free.contains(&slot) {
            return;
        }
        self.free.push(slot);
        self.free.sort_unstable_by(|a, b| b.cmp(a));
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}

impl Default for LightPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Light source positioned by its owner's transform
///
/// A light without a slot (the pool was empty when it was attached) is inert.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub spot_direction: Vec3,
    /// Directional lights shine along their position vector from infinity
    pub directional: bool,
    slot: Option<LightSlot>,
}

impl Light {
    pub fn new(ambient: Color, diffuse: Color, specular: Color) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            spot_direction: Vec3::Z,
            directional: false,
            slot: None,
        }
    }

    pub fn slot(&self) -> Option<LightSlot> {
        self.slot
    }

    /// Parameters for the renderer at a world position
    pub fn params(&self, position: Vec3) -> LightParams {
        let w = if self.directional { 0.0 } else { 1.0 };
        LightParams {
            position: Vec4::new(position.x, position.y, -position.z, w),
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            spot_direction: self.spot_direction,
        }
    }

    /// Switch the light on for the current frame
    pub fn enable(&self, renderer: &mut dyn RenderBackend, position: Vec3) {
        if let Some(slot) = self.slot {
            renderer.enable_light(slot, &self.params(position));
        }
    }

    pub fn disable(&self, renderer: &mut dyn RenderBackend) {
        if let Some(slot) = self.slot {
            renderer.disable_light(slot);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.slot = None;
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Color::rgba(0.0, 0.0, 0.0, 1.0), Color::WHITE, Color::WHITE)
    }
}

impl Behaviour for Light {
    fn start(&mut self, _owner: &Owner, ctx: &mut Context) {
        if self.slot.is_some() {
            return;
        }
        self.slot = ctx.light_pool_mut().acquire();
        match self.slot {
            Some(slot) => debug!("Light took slot {}", slot.index()),
            None => warn!("All {} light slots are taken, light will not shine", MAX_LIGHTS),
        }
    }

    fn stop(&mut self, _owner: &Owner, ctx: &mut Context) {
        if let Some(slot) = self.slot.take() {
            ctx.light_pool_mut().release(slot);
        }
    }
}
