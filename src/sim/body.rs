//! Rigid bodies: static (infinite mass, fixed pose) or dynamic

use glam::Vec2;

use crate::error::{Result, SimError};
use crate::{cross, rotate};

/// Identifies a body inside a `World`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u32);

/// Type of rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves, infinite mass; may only be removed
    Static,
    /// Finite mass and moment, integrated by the world
    Dynamic,
}

/// A rigid body
#[derive(Debug, Clone)]
pub struct RigidBody {
    handle: BodyHandle,
    kind: BodyKind,
    pub(crate) position: Vec2,
    /// Rotation in radians
    pub(crate) angle: f32,
    pub(crate) velocity: Vec2,
    pub(crate) angular_velocity: f32,
    mass: f32,
    moment: f32,
    inv_mass: f32,
    inv_moment: f32,
}

impl RigidBody {
    /// Create a static body at `position`
    pub fn new_static(handle: BodyHandle, position: Vec2) -> Self {
        Self {
            handle,
            kind: BodyKind::Static,
            position,
            angle: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: f32::INFINITY,
            moment: f32::INFINITY,
            inv_mass: 0.0,
            inv_moment: 0.0,
        }
    }

    /// Create a dynamic body at rest
    ///
    /// Mass and moment must be finite and positive; config validation
    /// guarantees that, and the check is repeated here.
    pub fn new_dynamic(handle: BodyHandle, position: Vec2, mass: f32, moment: f32) -> Result<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SimError::invalid("mass", mass));
        }
        if !(moment.is_finite() && moment > 0.0) {
            return Err(SimError::invalid("moment", moment));
        }
        Ok(Self {
            handle,
            kind: BodyKind::Dynamic,
            position,
            angle: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass,
            moment,
            inv_mass: 1.0 / mass,
            inv_moment: 1.0 / moment,
        })
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Mass (infinite for static bodies)
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Moment of inertia (infinite for static bodies)
    pub fn moment(&self) -> f32 {
        self.moment
    }

    #[inline]
    pub(crate) fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    #[inline]
    pub(crate) fn inv_moment(&self) -> f32 {
        self.inv_moment
    }

    /// Convert a body-local point to world space
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.position + rotate(local, self.angle)
    }

    /// Velocity of the material point at world-space offset `r` from the center
    #[inline]
    pub fn velocity_at(&self, r: Vec2) -> Vec2 {
        self.velocity + crate::cross_scalar(self.angular_velocity, r)
    }

    /// Apply an impulse at a world-space offset `r` from the center of mass.
    /// Static bodies ignore impulses.
    pub fn apply_impulse(&mut self, impulse: Vec2, r: Vec2) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += cross(r, impulse) * self.inv_moment;
    }

    /// Apply an impulse given in body-local coordinates at a body-local point.
    /// Takes effect immediately, the next step integrates from the new velocity.
    pub fn apply_impulse_at_local_point(&mut self, impulse: Vec2, point: Vec2) {
        let impulse = rotate(impulse, self.angle);
        let r = rotate(point, self.angle);
        self.apply_impulse(impulse, r);
    }

    /// Symplectic Euler: velocity first, then position from the new velocity
    pub(crate) fn integrate(&mut self, gravity: Vec2, dt: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity += gravity * dt;
        self.position += self.velocity * dt;
        self.angle += self.angular_velocity * dt;
    }
}
