// Engine configuration passed in-process at construction

use glam::Vec3;

/// Errors reported synchronously while validating a configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid screen size: {width}x{height}")]
    InvalidScreenSize { width: u32, height: u32 },

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(u32),

    #[error("Error reduction parameter must be within [0, 1], got {0}")]
    InvalidErp(f32),

    #[error("Constraint force mixing must be non-negative, got {0}")]
    InvalidCfm(f32),
}

/// Physics world parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Gravity vector applied to bodies that use gravity
    pub gravity: Vec3,
    /// Error reduction parameter
    pub erp: f32,
    /// Constraint force mixing
    pub cfm: f32,
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.erp) {
            return Err(ConfigError::InvalidErp(self.erp));
        }
        if self.cfm.is_nan() || self.cfm < 0.0 {
            return Err(ConfigError::InvalidCfm(self.cfm));
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            erp: 0.8,
            cfm: 1e-5,
        }
    }
}

/// Top-level game configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Window size in pixels (width, height)
    pub screen_size: (u32, u32),
    /// Window title
    pub title: String,
    /// Request a hardware-accelerated adapter
    pub hardware_acceleration: bool,
    /// Target frames per second; also sets the physics step to 1/fps
    pub fps: u32,
    /// Physics world parameters
    pub physics: PhysicsConfig,
}

impl GameConfig {
    /// Check every field, reporting the first invalid one
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = self.screen_size;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidScreenSize { width, height });
        }
        if self.fps == 0 {
            return Err(ConfigError::InvalidFrameRate(self.fps));
        }
        self.physics.validate()
    }

    /// Fixed physics step in seconds
    pub fn timestep(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.screen_size.0 as f32 / self.screen_size.1 as f32
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_size: (800, 600),
            title: "Scenegine game".to_string(),
            hardware_acceleration: false,
            fps: 60,
            physics: PhysicsConfig::default(),
        }
    }
}
