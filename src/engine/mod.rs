// Engine modules: scene graph, components, physics, rendering, input and the frame loop

pub mod component;
pub mod config;
pub mod frame_clock;
pub mod game;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod scene;
