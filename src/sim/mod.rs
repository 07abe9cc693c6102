//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (registration order)
//! - No rendering, wall-clock or platform dependencies

pub mod body;
pub mod collision;
pub mod shape;
pub mod state;
pub mod tick;
pub mod world;

pub use body::{BodyHandle, BodyKind, RigidBody};
pub use collision::{CollisionResult, collide};
pub use shape::{Geometry, Shape, combined_elasticity};
pub use state::{Arena, TowerSlot, WallSide};
pub use tick::{Flow, ImpulseStrategy, InputEvent, Key, apply_input, handle_event, tick};
pub use world::World;
