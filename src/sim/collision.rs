//! Narrow-phase contact generation between shapes
//!
//! Every check returns a `CollisionResult` whose normal points from the
//! first shape toward the second, so the solver can push them apart along it.

use glam::Vec2;

use super::body::RigidBody;
use super::shape::{Geometry, Shape};
use crate::rotate;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point in world space (if hit)
    pub point: Vec2,
    /// Unit normal from the first shape toward the second
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    /// Same contact seen from the other shape
    fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Check two circles
pub fn circle_circle(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> CollisionResult {
    let delta = pos_b - pos_a;
    let dist_sq = delta.length_squared();
    let reach = radius_a + radius_b;

    if dist_sq >= reach * reach {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    // Concentric circles: pick an arbitrary but fixed axis
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::Y };
    CollisionResult {
        hit: true,
        point: pos_a + normal * (radius_a - (reach - dist) * 0.5),
        normal,
        penetration: reach - dist,
    }
}

/// Check a circle against an oriented box
///
/// The normal points from the circle toward the box.
pub fn circle_box(
    circle_pos: Vec2,
    radius: f32,
    box_pos: Vec2,
    box_angle: f32,
    half: Vec2,
) -> CollisionResult {
    // Work in the box frame
    let local = rotate(circle_pos - box_pos, -box_angle);
    let closest = local.clamp(-half, half);
    let offset = local - closest;
    let dist_sq = offset.length_squared();

    let (normal_local, point_local, penetration) = if dist_sq > 1e-12 {
        if dist_sq >= radius * radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        // offset points from the box surface out to the circle center
        (offset / dist, closest, radius - dist)
    } else {
        // Center inside the box: push out through the nearest face
        let depth_x = half.x - local.x.abs();
        let depth_y = half.y - local.y.abs();
        if depth_x < depth_y {
            let sign = local.x.signum();
            (
                Vec2::new(sign, 0.0),
                Vec2::new(sign * half.x, local.y),
                radius + depth_x,
            )
        } else {
            let sign = local.y.signum();
            (
                Vec2::new(0.0, sign),
                Vec2::new(local.x, sign * half.y),
                radius + depth_y,
            )
        }
    };

    // normal_local points box -> circle, flip it to circle -> box
    CollisionResult {
        hit: true,
        point: box_pos + rotate(point_local, box_angle),
        normal: -rotate(normal_local, box_angle),
        penetration,
    }
}

/// World-axis half extents of a rotated box
fn bounding_half_extents(half: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    Vec2::new(cos * half.x + sin * half.y, sin * half.x + cos * half.y)
}

/// Check two boxes using their world-axis bounds
///
/// Rotated boxes are approximated by their bounding boxes; the demo only
/// ever collides boxes that are static and axis-aligned.
pub fn box_box(
    pos_a: Vec2,
    angle_a: f32,
    half_a: Vec2,
    pos_b: Vec2,
    angle_b: f32,
    half_b: Vec2,
) -> CollisionResult {
    let ext_a = bounding_half_extents(half_a, angle_a);
    let ext_b = bounding_half_extents(half_b, angle_b);
    let delta = pos_b - pos_a;
    let overlap = ext_a + ext_b - delta.abs();

    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return CollisionResult::miss();
    }

    let sign = |v: f32| if v < 0.0 { -1.0 } else { 1.0 };
    let (normal, penetration) = if overlap.x < overlap.y {
        (Vec2::new(sign(delta.x), 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, sign(delta.y)), overlap.y)
    };

    // Middle of the overlap region
    let min = (pos_a - ext_a).max(pos_b - ext_b);
    let max = (pos_a + ext_a).min(pos_b + ext_b);
    CollisionResult {
        hit: true,
        point: (min + max) * 0.5,
        normal,
        penetration,
    }
}

/// Check a circle against a boundary half-plane
///
/// Depth is measured from the boundary line, so a circle whose center has
/// already crossed it is still pushed back toward the open side.
/// The normal points from the circle toward the boundary.
pub fn circle_boundary(
    circle_pos: Vec2,
    radius: f32,
    plane_pos: Vec2,
    plane_angle: f32,
    normal: Vec2,
) -> CollisionResult {
    let n = rotate(normal, plane_angle);
    let dist = (circle_pos - plane_pos).dot(n);
    if dist >= radius {
        return CollisionResult::miss();
    }
    CollisionResult {
        hit: true,
        point: circle_pos - n * dist,
        normal: -n,
        penetration: radius - dist,
    }
}

/// Check an oriented box against a boundary half-plane using its deepest corner
///
/// The normal points from the box toward the boundary.
pub fn box_boundary(
    box_pos: Vec2,
    box_angle: f32,
    half: Vec2,
    plane_pos: Vec2,
    plane_angle: f32,
    normal: Vec2,
) -> CollisionResult {
    let n = rotate(normal, plane_angle);
    let axis_x = rotate(Vec2::new(half.x, 0.0), box_angle);
    let axis_y = rotate(Vec2::new(0.0, half.y), box_angle);

    let mut deepest = box_pos;
    let mut min_dist = f32::MAX;
    for sx in [-1.0_f32, 1.0] {
        for sy in [-1.0_f32, 1.0] {
            let corner = box_pos + axis_x * sx + axis_y * sy;
            let dist = (corner - plane_pos).dot(n);
            if dist < min_dist {
                min_dist = dist;
                deepest = corner;
            }
        }
    }

    if min_dist >= 0.0 {
        return CollisionResult::miss();
    }
    CollisionResult {
        hit: true,
        point: deepest,
        normal: -n,
        penetration: -min_dist,
    }
}

/// Check two bodies with their shapes; normal points from `a` toward `b`
pub fn collide(a: &RigidBody, shape_a: &Shape, b: &RigidBody, shape_b: &Shape) -> CollisionResult {
    match (shape_a.geometry, shape_b.geometry) {
        (Geometry::Circle { radius: ra }, Geometry::Circle { radius: rb }) => {
            circle_circle(a.position(), ra, b.position(), rb)
        }
        (Geometry::Circle { radius }, Geometry::Box { half_w, half_h }) => circle_box(
            a.position(),
            radius,
            b.position(),
            b.angle(),
            Vec2::new(half_w, half_h),
        ),
        (Geometry::Box { half_w, half_h }, Geometry::Circle { radius }) => circle_box(
            b.position(),
            radius,
            a.position(),
            a.angle(),
            Vec2::new(half_w, half_h),
        )
        .flipped(),
        (
            Geometry::Box { half_w: aw, half_h: ah },
            Geometry::Box { half_w: bw, half_h: bh },
        ) => box_box(
            a.position(),
            a.angle(),
            Vec2::new(aw, ah),
            b.position(),
            b.angle(),
            Vec2::new(bw, bh),
        ),
        (Geometry::Circle { radius }, Geometry::Boundary { normal, .. }) => {
            circle_boundary(a.position(), radius, b.position(), b.angle(), normal)
        }
        (Geometry::Boundary { normal, .. }, Geometry::Circle { radius }) => {
            circle_boundary(b.position(), radius, a.position(), a.angle(), normal).flipped()
        }
        (Geometry::Box { half_w, half_h }, Geometry::Boundary { normal, .. }) => box_boundary(
            a.position(),
            a.angle(),
            Vec2::new(half_w, half_h),
            b.position(),
            b.angle(),
            normal,
        ),
        (Geometry::Boundary { normal, .. }, Geometry::Box { half_w, half_h }) => box_boundary(
            b.position(),
            b.angle(),
            Vec2::new(half_w, half_h),
            a.position(),
            a.angle(),
            normal,
        )
        .flipped(),
        // Boundaries only ever belong to static bodies
        (Geometry::Boundary { .. }, Geometry::Boundary { .. }) => CollisionResult::miss(),
    }
}
