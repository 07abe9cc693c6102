//! Configuration: the on-disk form, its clamping loader, and the typed,
//! validated `Config` the core consumes.
//!
//! The file is JSON with two sections, mirroring how the demo is tuned:
//!
//! ```json
//! {
//!   "environment": { "gravity_x": 0.0, "gravity_y": 500.0, "fps": 240 },
//!   "main": { "force_applied": 6000.0, "ball_mass": 10.0, ... },
//!   "arena": { "width": 800.0, "height": 600.0 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MIN_FPS;
use crate::error::SimError;

/// How keyboard input is turned into impulses on the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImpulseMode {
    /// Arrow keys push along ±X/±Y at an offset from the ball center
    #[default]
    Directional,
    /// Space applies one fixed impulse vector
    Launch,
}

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl ArenaSize {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// `environment` section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSection {
    pub gravity_x: f32,
    pub gravity_y: f32,
    /// Signed so that out-of-range values survive parsing and get clamped
    pub fps: i64,
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        Self {
            gravity_x: 0.0,
            gravity_y: 500.0,
            fps: 240,
        }
    }
}

/// `main` section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MainSection {
    pub force_applied: f32,
    pub ball_mass: f32,
    pub ball_moment: f32,
    pub wall_elasticity: f32,
    pub ball_elasticity: f32,
    pub impulse_mode: ImpulseMode,
    /// Distance from the ball center at which directional pushes land
    pub push_offset: f32,
    pub launch_impulse_x: f32,
    pub launch_impulse_y: f32,
    pub launch_offset_x: f32,
    pub launch_offset_y: f32,
}

impl Default for MainSection {
    fn default() -> Self {
        Self {
            force_applied: 6000.0,
            ball_mass: 10.0,
            ball_moment: 10.0,
            wall_elasticity: 0.95,
            ball_elasticity: 0.95,
            impulse_mode: ImpulseMode::Directional,
            push_offset: 25.0,
            launch_impulse_x: 0.0,
            launch_impulse_y: -6000.0,
            launch_offset_x: 0.0,
            launch_offset_y: 0.0,
        }
    }
}

/// Config as read from disk: untrusted until `validate` runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub environment: EnvironmentSection,
    #[serde(rename = "main")]
    pub main_section: MainSection,
    pub arena: ArenaSize,
}

/// Errors from loading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] SimError),
}

/// Outcome of `RawConfig::load_or_create`
#[derive(Debug)]
pub enum Loaded {
    /// The file existed and validated
    Existing(Config),
    /// No file was present; defaults were written to the path
    Created(PathBuf),
}

impl RawConfig {
    /// Apply the floor rules: fps is raised to the minimum, non-positive
    /// mass/moment fall back to 1, negative elasticity falls back to 0.
    pub fn clamp(mut self) -> Self {
        let env = &mut self.environment;
        if env.fps < MIN_FPS as i64 {
            log::warn!("fps set to {} (less than {MIN_FPS}), using {MIN_FPS}", env.fps);
            env.fps = MIN_FPS as i64;
        }

        let main = &mut self.main_section;
        if main.ball_mass <= 0.0 {
            log::warn!("ball_mass {} too low, using 1", main.ball_mass);
            main.ball_mass = 1.0;
        }
        if main.ball_moment <= 0.0 {
            log::warn!("ball_moment {} too low, using 1", main.ball_moment);
            main.ball_moment = 1.0;
        }
        for (name, e) in [
            ("wall_elasticity", &mut main.wall_elasticity),
            ("ball_elasticity", &mut main.ball_elasticity),
        ] {
            if *e < 0.0 {
                log::warn!("{name} {e} is negative, using 0");
                *e = 0.0;
            } else if *e > 1.0 {
                log::warn!("{name} {e} is above 1, contacts will treat it as 1");
            }
        }

        self
    }

    /// Clamp, then convert into the typed config
    pub fn validate(self) -> Result<Config, SimError> {
        let raw = self.clamp();
        let fps = u32::try_from(raw.environment.fps)
            .map_err(|_| SimError::invalid("fps", raw.environment.fps as f64))?;
        let main = &raw.main_section;

        let config = Config {
            gravity: Vec2::new(raw.environment.gravity_x, raw.environment.gravity_y),
            fps,
            force_applied: main.force_applied,
            launch_impulse: Vec2::new(main.launch_impulse_x, main.launch_impulse_y),
            push_offset: main.push_offset,
            launch_offset: Vec2::new(main.launch_offset_x, main.launch_offset_y),
            impulse_mode: main.impulse_mode,
            ball_mass: main.ball_mass,
            ball_moment: main.ball_moment,
            wall_elasticity: main.wall_elasticity,
            ball_elasticity: main.ball_elasticity,
            arena: raw.arena,
        };
        config.check()?;
        Ok(config)
    }

    /// Read a config file without validating it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write this config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load and validate `path`, or write the defaults there if it is missing
    pub fn load_or_create(path: &Path) -> Result<Loaded, ConfigError> {
        if !path.is_file() {
            log::info!("Generating {}", path.display());
            RawConfig::default().save(path)?;
            return Ok(Loaded::Created(path.to_path_buf()));
        }

        let config = RawConfig::load(path)?.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(Loaded::Existing(config))
    }
}

/// Validated configuration. Read-only: every field has passed `check`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    gravity: Vec2,
    fps: u32,
    force_applied: f32,
    launch_impulse: Vec2,
    push_offset: f32,
    launch_offset: Vec2,
    impulse_mode: ImpulseMode,
    ball_mass: f32,
    ball_moment: f32,
    wall_elasticity: f32,
    ball_elasticity: f32,
    arena: ArenaSize,
}

impl Default for Config {
    fn default() -> Self {
        let main = MainSection::default();
        let env = EnvironmentSection::default();
        Self {
            gravity: Vec2::new(env.gravity_x, env.gravity_y),
            fps: env.fps as u32,
            force_applied: main.force_applied,
            launch_impulse: Vec2::new(main.launch_impulse_x, main.launch_impulse_y),
            push_offset: main.push_offset,
            launch_offset: Vec2::new(main.launch_offset_x, main.launch_offset_y),
            impulse_mode: main.impulse_mode,
            ball_mass: main.ball_mass,
            ball_moment: main.ball_moment,
            wall_elasticity: main.wall_elasticity,
            ball_elasticity: main.ball_elasticity,
            arena: ArenaSize::default(),
        }
    }
}

fn require_finite(name: &'static str, value: f32) -> Result<(), SimError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid(name, value))
    }
}

fn require_positive(name: &'static str, value: f32) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(name, value))
    }
}

impl Config {
    /// Reject anything the loader should have clamped
    fn check(&self) -> Result<(), SimError> {
        if self.fps < MIN_FPS {
            return Err(SimError::invalid("fps", self.fps));
        }
        require_finite("gravity_x", self.gravity.x)?;
        require_finite("gravity_y", self.gravity.y)?;
        require_finite("force_applied", self.force_applied)?;
        require_finite("launch_impulse_x", self.launch_impulse.x)?;
        require_finite("launch_impulse_y", self.launch_impulse.y)?;
        require_finite("push_offset", self.push_offset)?;
        require_finite("launch_offset_x", self.launch_offset.x)?;
        require_finite("launch_offset_y", self.launch_offset.y)?;
        require_positive("ball_mass", self.ball_mass)?;
        require_positive("ball_moment", self.ball_moment)?;
        require_positive("arena_width", self.arena.width)?;
        require_positive("arena_height", self.arena.height)?;
        for (name, e) in [
            ("wall_elasticity", self.wall_elasticity),
            ("ball_elasticity", self.ball_elasticity),
        ] {
            if !e.is_finite() || e < 0.0 {
                return Err(SimError::invalid(name, e));
            }
        }
        Ok(())
    }

    /// Return a copy with different gravity, fps and ball mass properties
    pub fn with_physics(
        mut self,
        gravity: Vec2,
        fps: u32,
        ball_mass: f32,
        ball_moment: f32,
    ) -> Result<Self, SimError> {
        self.gravity = gravity;
        self.fps = fps;
        self.ball_mass = ball_mass;
        self.ball_moment = ball_moment;
        self.check()?;
        Ok(self)
    }

    /// Return a copy with a different arena size
    pub fn with_arena(mut self, arena: ArenaSize) -> Result<Self, SimError> {
        self.arena = arena;
        self.check()?;
        Ok(self)
    }

    /// Return a copy using a different impulse strategy
    pub fn with_impulse_mode(mut self, mode: ImpulseMode) -> Self {
        self.impulse_mode = mode;
        self
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Fixed physics timestep
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.fps as f32
    }

    pub fn force_applied(&self) -> f32 {
        self.force_applied
    }

    pub fn launch_impulse(&self) -> Vec2 {
        self.launch_impulse
    }

    pub fn push_offset(&self) -> f32 {
        self.push_offset
    }

    pub fn launch_offset(&self) -> Vec2 {
        self.launch_offset
    }

    pub fn impulse_mode(&self) -> ImpulseMode {
        self.impulse_mode
    }

    pub fn ball_mass(&self) -> f32 {
        self.ball_mass
    }

    pub fn ball_moment(&self) -> f32 {
        self.ball_moment
    }

    pub fn wall_elasticity(&self) -> f32 {
        self.wall_elasticity
    }

    pub fn ball_elasticity(&self) -> f32 {
        self.ball_elasticity
    }

    pub fn arena(&self) -> ArenaSize {
        self.arena
    }
}
