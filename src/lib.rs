//! Tower Ball - a fixed-timestep 2D rigid-body arcade demo
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, shapes, contacts, the arena)
//! - `config`: Typed, validated configuration and the JSON loader
//! - `game`: Frame-synchronous game loop, input source and render sink seams
//! - `render`: Draw intent extraction (what to draw, not how)
//! - `error`: Error taxonomy shared by the core

pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod sim;

pub use config::{ArenaSize, Config, ImpulseMode, RawConfig};
pub use error::{Result, SimError};

use glam::Vec2;

/// Scene constants
pub mod consts {
    /// Minimum frame rate accepted by the core
    pub const MIN_FPS: u32 = 30;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 25.0;
    /// Ball spawn height (pixels from the top edge)
    pub const BALL_SPAWN_Y: f32 = 50.0;

    /// Tower dimensions (full width and height)
    pub const TOWER_WIDTH: f32 = 25.0;
    pub const TOWER_HEIGHT: f32 = 600.0;
    /// Tower center offset below the arena center
    pub const TOWER_DROP: f32 = 200.0;
}

/// 2D cross product (z component of a × b)
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Cross product of a scalar angular velocity with a vector (ω × r)
#[inline]
pub fn cross_scalar(w: f32, r: Vec2) -> Vec2 {
    Vec2::new(-w * r.y, w * r.x)
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
