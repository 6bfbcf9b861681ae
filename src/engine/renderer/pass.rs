// One frame of drawing: projection, camera, lights, tree, present

use anyhow::Result;

use super::RenderBackend;
use crate::engine::config::GameConfig;
use crate::engine::scene::Scene;

/// Vertical field of view in degrees
pub const FIELD_OF_VIEW: f32 = 45.0;
pub const NEAR_CLIP: f32 = 0.1;
pub const FAR_CLIP: f32 = 100.0;

/// Draw the scene and present it
///
/// Lights are enabled under the camera transform so their positions end up
/// in view space.
pub fn render_scene(
    scene: &Scene,
    renderer: &mut dyn RenderBackend,
    config: &GameConfig,
) -> Result<()> {
    let (width, height) = config.screen_size;

    renderer.set_viewport(width, height);
    renderer.set_perspective(FIELD_OF_VIEW, config.aspect_ratio(), NEAR_CLIP, FAR_CLIP);
    renderer.load_identity();
    renderer.clear();

    let camera = scene.active_camera();
    if let Some((camera, position)) = camera {
        camera.push(renderer, position);
    }

    for (light, position) in scene.lights() {
        light.enable(renderer, position);
    }

    scene.root().render(renderer, &scene.context().physics);

    if let Some((camera, _)) = camera {
        camera.pop(renderer);
    }

    renderer.present()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;
    use crate::engine::component::{Camera, Light, MeshRenderer, Transform, MAX_LIGHTS};
    use crate::engine::config::PhysicsConfig;
    use crate::engine::renderer::{HeadlessRenderer, Primitive, RenderCommand};
    use crate::engine::scene::GameObject;
    use approx::assert_relative_eq;
    use glam::{Mat4, Vec3};

    fn config(width: u32, height: u32) -> GameConfig {
        GameConfig {
            screen_size: (width, height),
            ..Default::default()
        }
    }

    fn scene_with_camera() -> Scene {
        let mut scene = Scene::new(PhysicsConfig::default());
        let (root, ctx) = scene.split_mut();

        let mut viewer = GameObject::empty(ctx);
        viewer.add_component(Camera::with_distance(Vec3::new(0.0, 0.0, 20.0)), ctx);
        viewer.add_component(Light::default(), ctx);
        root.add_child(viewer);

        let transform = Transform::at(&mut ctx.physics, Vec3::new(0.0, 1.0, 0.0));
        let mut cube = GameObject::new(transform, ctx);
        cube.add_component(MeshRenderer::cube(Color::WHITE), ctx);
        root.add_child(cube);

        scene
    }

    #[test]
    fn test_frame_command_order() {
        let scene = scene_with_camera();
        let mut renderer = HeadlessRenderer::new();
        render_scene(&scene, &mut renderer, &config(800, 600)).unwrap();

        let frame = renderer.last_frame().unwrap();
        let commands = &frame.commands;
        assert_eq!(commands[0], RenderCommand::Viewport(800, 600));
        assert_eq!(
            commands[1],
            RenderCommand::Perspective {
                fov_y: FIELD_OF_VIEW,
                aspect: 800.0 / 600.0,
                near: NEAR_CLIP,
                far: FAR_CLIP,
            }
        );
        assert_eq!(commands[2], RenderCommand::LoadIdentity);
        assert_eq!(commands[3], RenderCommand::Clear);
        assert_eq!(commands[4], RenderCommand::PushMatrix);

        let light = commands
            .iter()
            .position(|c| matches!(c, RenderCommand::EnableLight { .. }))
            .unwrap();
        let draw = commands
            .iter()
            .position(|c| matches!(c, RenderCommand::Draw(..)))
            .unwrap();
        assert!(light < draw);
        assert_eq!(commands.last(), Some(&RenderCommand::PopMatrix));
        assert_eq!(renderer.frames_presented(), 1);
    }

    #[test]
    fn test_draw_sees_camera_transform() {
        let scene = scene_with_camera();
        let mut renderer = HeadlessRenderer::new();
        render_scene(&scene, &mut renderer, &config(800, 600)).unwrap();

        let draws = &renderer.last_frame().unwrap().draws;
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].primitive, Primitive::Cube);

        let origin = draws[0].model_view.transform_point3(Vec3::ZERO);
        assert_relative_eq!(origin.x, 0.0);
        assert_relative_eq!(origin.y, 1.0);
        assert_relative_eq!(origin.z, -20.0);
    }

    #[test]
    fn test_no_camera_renders_in_identity_view() {
        let mut scene = Scene::new(PhysicsConfig::default());
        let (root, ctx) = scene.split_mut();
        let mut object = GameObject::empty(ctx);
        object.add_component(MeshRenderer::sphere(Color::GREEN), ctx);
        root.add_child(object);

        let mut renderer = HeadlessRenderer::new();
        render_scene(&scene, &mut renderer, &config(640, 480)).unwrap();

        let frame = renderer.last_frame().unwrap();
        let draw = frame
            .commands
            .iter()
            .position(|c| matches!(c, RenderCommand::Draw(..)))
            .unwrap();
        // Only the object's own push may precede its draw
        let pushes = frame.commands[..draw]
            .iter()
            .filter(|c| **c == RenderCommand::PushMatrix)
            .count();
        assert_eq!(pushes, 1);
        assert!(!frame.commands[..draw]
            .iter()
            .any(|c| matches!(c, RenderCommand::Translate(..) | RenderCommand::Rotate(..))));
        assert_eq!(frame.draws[0].model_view, Mat4::IDENTITY);
    }

    #[test]
    fn test_ninth_light_is_inert() {
        let mut scene = Scene::new(PhysicsConfig::default());
        let (root, ctx) = scene.split_mut();
        for _ in 0..MAX_LIGHTS + 1 {
            let mut object = GameObject::empty(ctx);
            object.add_component(Light::default(), ctx);
            root.add_child(object);
        }
        assert_eq!(scene.lights().count(), MAX_LIGHTS + 1);

        let mut renderer = HeadlessRenderer::new();
        render_scene(&scene, &mut renderer, &config(800, 600)).unwrap();

        let slots: Vec<usize> = renderer
            .last_frame()
            .unwrap()
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::EnableLight { slot, .. } => Some(slot.index()),
                _ => None,
            })
            .collect();
        assert_eq!(slots, (0..MAX_LIGHTS).collect::<Vec<_>>());
    }
}
