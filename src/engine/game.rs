// Fixed-step frame loop tying scene, renderer and input together

use anyhow::{bail, Result};
use log::{debug, info};

use crate::engine::config::{ConfigError, GameConfig};
use crate::engine::frame_clock::FrameClock;
use crate::engine::input::{InputBackend, WinitInput};
use crate::engine::renderer::{render_scene, RenderBackend, WgpuRenderer};
use crate::engine::scene::Scene;

/// A scene plus the backends that drive it
pub struct Game<R: RenderBackend, I: InputBackend> {
    config: GameConfig,
    scene: Scene,
    renderer: R,
    input: I,
    clock: FrameClock,
    shut_down: bool,
}

impl<R: RenderBackend, I: InputBackend> Game<R, I> {
    /// Validate the configuration and start an empty scene
    pub fn new(config: GameConfig, renderer: R, input: I) -> Result<Self, ConfigError> {
        config.validate()?;
        let scene = Scene::new(config.physics);
        let clock = FrameClock::new(config.fps);
        info!(
            "Game '{}' ready: {}x{} at {} fps",
            config.title, config.screen_size.0, config.screen_size.1, config.fps
        );
        Ok(Self {
            config,
            scene,
            renderer,
            input,
            clock,
            shut_down: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    /// Frames completed so far
    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Run until input reports a quit request, then shut the game down
    ///
    /// The render backend is shut down on return, including on error.
    pub fn run(&mut self) -> Result<()> {
        info!("Game started");
        let result = self.run_loop(None);
        self.shutdown();
        let frames = result?;
        info!("Game quit after {} frames", frames);
        Ok(())
    }

    /// Run at most `frames` frames, stopping early on a quit request
    ///
    /// Returns the number of frames run. The game stays alive afterwards, so
    /// batches can be chained; it shuts down on `shutdown` or when dropped.
    pub fn run_frames(&mut self, frames: u64) -> Result<u64> {
        debug!("Running {} frames", frames);
        self.run_loop(Some(frames))
    }

    /// Release the render backend
    ///
    /// Idempotent. No frames can run afterwards.
    pub fn shutdown(&mut self) {
        if !self.shut_down {
            self.shut_down = true;
            self.renderer.shutdown();
            debug!("Game shut down after {} frames", self.clock.frame_count());
        }
    }

    fn run_loop(&mut self, limit: Option<u64>) -> Result<u64> {
        if self.shut_down {
            bail!("game has already been shut down");
        }
        let dt = self.config.timestep();

        let mut frames = 0;
        while limit.map_or(true, |limit| frames < limit) {
            if self.scene.context().input.quit_requested() {
                break;
            }

            self.input.poll(&mut self.scene.context_mut().input)?;
            self.scene.update();
            render_scene(&self.scene, &mut self.renderer, &self.config)?;
            self.scene.collide()?;
            self.scene.step(dt)?;
            self.clock.tick();

            frames += 1;
        }

        if self.clock.frame_count() > 0 {
            debug!("Average frame rate: {:.1} fps", self.clock.fps());
        }
        Ok(frames)
    }
}

impl<R: RenderBackend, I: InputBackend> Drop for Game<R, I> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Game<WgpuRenderer, WinitInput> {
    /// Open a window and a GPU renderer for it
    pub fn with_window(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let (input, window) = WinitInput::new(&config)?;
        let renderer = pollster::block_on(WgpuRenderer::new(window, &config))?;
        Ok(Self::new(config, renderer, input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;
    use crate::engine::component::{Behaviour, Collider, Component, LightSlot, Owner, Transform};
    use crate::engine::input::HeadlessInput;
    use crate::engine::renderer::{HeadlessRenderer, LightParams, Primitive};
    use crate::engine::scene::{Context, GameObject, GameObjectId};
    use glam::{Mat4, Vec3};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Backend that only notes presents and shutdowns
    struct LoggingBackend {
        log: Log,
        shut_down: Rc<Cell<bool>>,
        fail_on_present: bool,
    }

    impl RenderBackend for LoggingBackend {
        fn set_viewport(&mut self, _width: u32, _height: u32) {}
        fn set_perspective(&mut self, _fov: f32, _aspect: f32, _near: f32, _far: f32) {}
        fn load_identity(&mut self) {}
        fn clear(&mut self) {}
        fn push_matrix(&mut self) {}
        fn pop_matrix(&mut self) {}
        fn translate(&mut self, _offset: Vec3) {}
        fn rotate(&mut self, _angle: f32, _axis: Vec3) {}
        fn scale(&mut self, _factors: Vec3) {}
        fn mult_matrix(&mut self, _matrix: Mat4) {}
        fn draw(&mut self, _primitive: Primitive, _color: Color) {}
        fn enable_light(&mut self, _slot: LightSlot, _light: &LightParams) {}
        fn disable_light(&mut self, _slot: LightSlot) {}

        fn present(&mut self) -> Result<()> {
            if self.fail_on_present {
                anyhow::bail!("device lost");
            }
            self.log.borrow_mut().push("render");
            Ok(())
        }

        fn shutdown(&mut self) {
            self.shut_down.set(true);
        }
    }

    struct Recorder(Log);

    impl Behaviour for Recorder {
        fn update(&mut self, _owner: &Owner, _ctx: &mut Context) {
            self.0.borrow_mut().push("update");
        }

        fn on_collision(&mut self, _owner: &Owner, _other: GameObjectId, _ctx: &mut Context) {
            self.0.borrow_mut().push("collide");
        }
    }

    struct QuitAfter(u32);

    impl Behaviour for QuitAfter {
        fn update(&mut self, _owner: &Owner, ctx: &mut Context) {
            self.0 = self.0.saturating_sub(1);
            if self.0 == 0 {
                ctx.input.request_quit();
            }
        }
    }

    fn fast_config() -> GameConfig {
        GameConfig {
            fps: 1000,
            ..Default::default()
        }
    }

    fn logging_backend(fail_on_present: bool) -> (LoggingBackend, Log, Rc<Cell<bool>>) {
        let log = Log::default();
        let shut_down = Rc::new(Cell::new(false));
        let backend = LoggingBackend {
            log: Rc::clone(&log),
            shut_down: Rc::clone(&shut_down),
            fail_on_present,
        };
        (backend, log, shut_down)
    }

    fn add_static_box(game: &mut Game<impl RenderBackend, impl InputBackend>, x: f32, log: &Log) {
        let (root, ctx) = game.scene_mut().split_mut();
        let transform = Transform::at(&mut ctx.physics, Vec3::new(x, 0.0, 0.0));
        let mut object = GameObject::new(transform, ctx);
        object.add_component(Collider::box_collider(), ctx);
        object.add_component(Component::behaviour(Recorder(Rc::clone(log))), ctx);
        root.add_child(object);
    }

    #[test]
    fn test_frame_order() {
        let (renderer, log, _) = logging_backend(false);
        let mut game = Game::new(fast_config(), renderer, HeadlessInput::new()).unwrap();
        add_static_box(&mut game, 0.0, &log);
        add_static_box(&mut game, 0.5, &log);

        assert_eq!(game.run_frames(2).unwrap(), 2);
        let frame = ["update", "update", "render", "collide", "collide"];
        assert_eq!(*log.borrow(), [frame, frame].concat());
        assert_eq!(game.input().polls(), 2);
        assert_eq!(game.frame_count(), 2);
    }

    #[test]
    fn test_render_sees_previous_step() {
        let mut game =
            Game::new(fast_config(), HeadlessRenderer::new(), HeadlessInput::new()).unwrap();
        let (root, ctx) = game.scene_mut().split_mut();
        let transform = Transform::at(&mut ctx.physics, Vec3::new(0.0, 10.0, 0.0));
        root.add_child(GameObject::sphere_primitive(transform, Color::GREEN, 1.0, ctx));

        game.run_frames(1).unwrap();
        let first = game.renderer().last_frame().unwrap().draws[0].model_view;
        assert_eq!(first.w_axis.y, 10.0);

        game.run_frames(1).unwrap();
        let second = game.renderer().last_frame().unwrap().draws[0].model_view;
        assert!(second.w_axis.y < 10.0);
    }

    #[test]
    fn test_quit_request_ends_run() {
        let mut game =
            Game::new(fast_config(), HeadlessRenderer::new(), HeadlessInput::new()).unwrap();
        let (root, ctx) = game.scene_mut().split_mut();
        let mut object = GameObject::empty(ctx);
        object.add_component(Component::behaviour(QuitAfter(3)), ctx);
        root.add_child(object);

        game.run().unwrap();
        assert_eq!(game.frame_count(), 3);
        assert_eq!(game.renderer().frames_presented(), 3);
        assert!(game.renderer().is_shut_down());

        assert!(game.is_shut_down());
        assert!(game.run_frames(5).is_err());
        assert_eq!(game.renderer().frames_presented(), 3);
    }

    #[test]
    fn test_batches_keep_backend_alive_until_drop() {
        let (renderer, log, shut_down) = logging_backend(false);
        let mut game = Game::new(fast_config(), renderer, HeadlessInput::new()).unwrap();

        assert_eq!(game.run_frames(2).unwrap(), 2);
        assert!(!shut_down.get());
        assert_eq!(game.run_frames(1).unwrap(), 1);
        assert!(!shut_down.get());
        assert_eq!(log.borrow().len(), 3);

        drop(game);
        assert!(shut_down.get());
    }

    #[test]
    fn test_failing_frame_still_shuts_renderer_down() {
        let (renderer, _, shut_down) = logging_backend(true);
        let mut game = Game::new(fast_config(), renderer, HeadlessInput::new()).unwrap();

        let err = game.run().unwrap_err();
        assert_eq!(err.to_string(), "device lost");
        assert!(shut_down.get());
        assert!(game.is_shut_down());
        assert_eq!(game.frame_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig {
            fps: 0,
            ..Default::default()
        };
        let result = Game::new(config, HeadlessRenderer::new(), HeadlessInput::new());
        assert!(matches!(result, Err(ConfigError::InvalidFrameRate(0))));
    }
}
