//! The physics world: live bodies, gravity, and the fixed-step integrator

use glam::Vec2;

use super::body::{BodyHandle, RigidBody};
use super::collision::{CollisionResult, collide};
use super::shape::{Shape, combined_elasticity};
use crate::config::Config;
use crate::consts::MIN_FPS;
use crate::cross;
use crate::error::{Result, SimError};

/// Fraction of the remaining overlap removed per step
const POSITION_CORRECTION: f32 = 0.8;
/// Overlap tolerated before position correction kicks in (pixels)
const PENETRATION_SLOP: f32 = 0.05;

/// A registered body and its single shape
#[derive(Debug, Clone)]
struct Entry {
    body: RigidBody,
    shape: Shape,
}

/// Owns every live body and advances them by a fixed timestep
#[derive(Debug, Clone)]
pub struct World {
    gravity: Vec2,
    fixed_dt: f32,
    /// Registration order; iteration order for integration and contacts
    entries: Vec<Entry>,
    next_handle: u32,
    contacts_last_step: usize,
}

impl World {
    /// Create an empty world stepping at `1 / fps`
    pub fn new(gravity: Vec2, fps: u32) -> Result<Self> {
        if fps < MIN_FPS {
            return Err(SimError::invalid("fps", fps));
        }
        if !gravity.is_finite() {
            return Err(SimError::invalid("gravity", gravity.length()));
        }
        Ok(Self {
            gravity,
            fixed_dt: 1.0 / fps as f32,
            entries: Vec::new(),
            next_handle: 1,
            contacts_last_step: 0,
        })
    }

    /// Create an empty world from validated config
    pub fn from_config(config: &Config) -> Self {
        Self {
            gravity: config.gravity(),
            fixed_dt: config.fixed_dt(),
            entries: Vec::new(),
            next_handle: 1,
            contacts_last_step: 0,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// The timestep `tick` advances by
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Allocate a fresh body handle
    pub fn next_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Register a body together with its shape
    pub fn add_body(&mut self, body: RigidBody, shape: Shape) -> Result<BodyHandle> {
        let handle = body.handle();
        if self.contains(handle) {
            return Err(SimError::DuplicateRegistration(handle));
        }
        // Keep allocated handles ahead of anything registered by hand
        self.next_handle = self.next_handle.max(handle.0.saturating_add(1));
        log::debug!("Added body {:?} ({:?}) at {}", handle, body.kind(), body.position());
        self.entries.push(Entry { body, shape });
        Ok(handle)
    }

    /// Unregister a body and its shape, handing both back
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<(RigidBody, Shape)> {
        let index = self
            .index_of(handle)
            .ok_or(SimError::UnknownEntity(handle))?;
        let Entry { body, shape } = self.entries.remove(index);
        log::debug!("Removed body {:?}", handle);
        Ok((body, shape))
    }

    fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.entries.iter().position(|e| e.body.handle() == handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.index_of(handle).is_some()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.entries
            .iter()
            .find(|e| e.body.handle() == handle)
            .map(|e| &e.body)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.entries
            .iter_mut()
            .find(|e| e.body.handle() == handle)
            .map(|e| &mut e.body)
    }

    pub fn shape(&self, handle: BodyHandle) -> Option<&Shape> {
        self.entries
            .iter()
            .find(|e| e.body.handle() == handle)
            .map(|e| &e.shape)
    }

    /// Live bodies with their shapes, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&RigidBody, &Shape)> {
        self.entries.iter().map(|e| (&e.body, &e.shape))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of contacts resolved during the most recent step
    pub fn contacts_last_step(&self) -> usize {
        self.contacts_last_step
    }

    /// Apply a body-local impulse at a body-local point, immediately
    pub fn apply_impulse_at_local_point(
        &mut self,
        handle: BodyHandle,
        impulse: Vec2,
        point: Vec2,
    ) -> Result<()> {
        let body = self
            .body_mut(handle)
            .ok_or(SimError::UnknownEntity(handle))?;
        body.apply_impulse_at_local_point(impulse, point);
        log::trace!(
            "Impulse {} at {} on {:?} -> v={}, w={}",
            impulse,
            point,
            handle,
            body.velocity(),
            body.angular_velocity()
        );
        Ok(())
    }

    /// Advance by the configured fixed timestep
    pub fn tick(&mut self) {
        self.step(self.fixed_dt);
    }

    /// Advance every dynamic body by exactly `dt` seconds, then resolve contacts
    pub fn step(&mut self, dt: f32) {
        debug_assert!(dt > 0.0 && dt.is_finite(), "step dt must be positive");

        for entry in &mut self.entries {
            entry.body.integrate(self.gravity, dt);
        }

        let mut contacts = 0;
        let count = self.entries.len();
        for j in 1..count {
            // Split so both entries of the pair can be borrowed mutably
            let (head, tail) = self.entries.split_at_mut(j);
            let b = &mut tail[0];
            for a in head.iter_mut() {
                if !a.body.is_dynamic() && !b.body.is_dynamic() {
                    continue;
                }
                let result = collide(&a.body, &a.shape, &b.body, &b.shape);
                if !result.hit {
                    continue;
                }
                let e = combined_elasticity(&a.shape, &b.shape);
                resolve_contact(&mut a.body, &mut b.body, &result, e);
                contacts += 1;
            }
        }

        if contacts > 0 {
            log::trace!("Resolved {} contacts", contacts);
        }
        self.contacts_last_step = contacts;
    }
}

/// Impulse response plus positional correction for one contact.
/// `contact.normal` points from `a` toward `b`.
fn resolve_contact(a: &mut RigidBody, b: &mut RigidBody, contact: &CollisionResult, e: f32) {
    let n = contact.normal;
    let ra = contact.point - a.position();
    let rb = contact.point - b.position();

    let relative = b.velocity_at(rb) - a.velocity_at(ra);
    let approach = relative.dot(n);

    // Only bodies moving toward each other exchange impulse
    if approach < 0.0 {
        let ra_n = cross(ra, n);
        let rb_n = cross(rb, n);
        let k = a.inv_mass()
            + b.inv_mass()
            + ra_n * ra_n * a.inv_moment()
            + rb_n * rb_n * b.inv_moment();
        if k > 0.0 {
            let j = -(1.0 + e) * approach / k;
            let impulse = n * j;
            a.apply_impulse(-impulse, ra);
            b.apply_impulse(impulse, rb);
        }
    }

    let total_inv_mass = a.inv_mass() + b.inv_mass();
    if total_inv_mass > 0.0 {
        let depth = (contact.penetration - PENETRATION_SLOP).max(0.0);
        let correction = n * (depth * POSITION_CORRECTION / total_inv_mass);
        if a.is_dynamic() {
            a.position -= correction * a.inv_mass();
        }
        if b.is_dynamic() {
            b.position += correction * b.inv_mass();
        }
    }
}
