use anyhow::Result;
use log::info;

use scenegine::prelude::*;

/// Ends the game when Escape is held
struct QuitOnEscape;

impl Behaviour for QuitOnEscape {
    fn update(&mut self, _owner: &Owner, ctx: &mut Context) {
        if ctx.input.is_key_pressed(KeyCode::Escape) {
            ctx.input.request_quit();
        }
    }
}

/// A heavy floating cube and a sphere dropping onto it
fn build_platformer(scene: &mut Scene) {
    let (root, ctx) = scene.split_mut();

    let mut camera = GameObject::empty(ctx).with_name("Camera");
    camera.add_component(Camera::with_distance(Vec3::new(0.0, 0.0, 20.0)), ctx);
    camera.add_component(Component::behaviour(QuitOnEscape), ctx);

    let mut light = GameObject::empty(ctx).with_name("Light");
    light.add_component(Light::default(), ctx);

    let transform = Transform::at(&mut ctx.physics, Vec3::new(0.0, 1.0, 0.0));
    let cube = GameObject::cube_primitive(transform, Color::WHITE, 10000.0, ctx);
    if let Some(rigidbody) = cube.rigidbody() {
        rigidbody.set_use_gravity(&mut ctx.physics, false);
    }

    let transform = Transform::at(&mut ctx.physics, Vec3::new(0.0, 10.0, 0.0));
    let sphere = GameObject::sphere_primitive(transform, Color::GREEN, 1.0, ctx);

    root.add_children([camera, light, cube, sphere]);
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting platformer...");

    let config = GameConfig {
        title: "Platformer".to_string(),
        ..Default::default()
    };
    let mut game = Game::with_window(config)?;
    build_platformer(game.scene_mut());
    game.run()?;

    info!("Goodbye");
    Ok(())
}
