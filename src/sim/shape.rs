//! Collision and render geometry attached to a body

use glam::Vec2;

/// Shape geometry, in body-local space centered on the body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Box { half_w: f32, half_h: f32 },
    Circle { radius: f32 },
    /// Solid half-plane behind the line through the body center.
    /// `normal` is unit length and points out of the solid side;
    /// `half_length` only bounds the drawn edge.
    Boundary { normal: Vec2, half_length: f32 },
}

/// A shape with its contact material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub geometry: Geometry,
    /// Restitution; `None` when the shape never had one assigned
    pub elasticity: Option<f32>,
}

impl Shape {
    /// Box from half-extents
    pub fn cuboid(half_w: f32, half_h: f32) -> Self {
        Self {
            geometry: Geometry::Box { half_w, half_h },
            elasticity: None,
        }
    }

    pub fn ball(radius: f32) -> Self {
        Self {
            geometry: Geometry::Circle { radius },
            elasticity: None,
        }
    }

    /// Arena boundary facing `normal`; a zero normal is replaced by +Y
    pub fn boundary(normal: Vec2, half_length: f32) -> Self {
        Self {
            geometry: Geometry::Boundary {
                normal: normal.try_normalize().unwrap_or(Vec2::Y),
                half_length,
            },
            elasticity: None,
        }
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = Some(elasticity);
        self
    }
}

/// Restitution used for a contact between two shapes: the larger of the
/// two when both are set, the defined one otherwise, clamped to [0, 1].
pub fn combined_elasticity(a: &Shape, b: &Shape) -> f32 {
    let e = match (a.elasticity, b.elasticity) {
        (Some(ea), Some(eb)) => ea.max(eb),
        (Some(e), None) | (None, Some(e)) => e,
        (None, None) => 0.0,
    };
    e.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_elasticity_takes_larger() {
        let a = Shape::ball(1.0).with_elasticity(0.2);
        let b = Shape::cuboid(1.0, 1.0).with_elasticity(0.7);
        assert_eq!(combined_elasticity(&a, &b), 0.7);
        assert_eq!(combined_elasticity(&b, &a), 0.7);
    }

    #[test]
    fn test_combined_elasticity_uses_defined_side() {
        let a = Shape::ball(1.0).with_elasticity(0.4);
        let tower = Shape::cuboid(12.5, 300.0);
        assert_eq!(combined_elasticity(&a, &tower), 0.4);
        assert_eq!(combined_elasticity(&tower, &tower), 0.0);
    }

    #[test]
    fn test_boundary_normal_is_unit() {
        let wall = Shape::boundary(Vec2::new(-3.0, 0.0), 300.0);
        assert_eq!(
            wall.geometry,
            Geometry::Boundary {
                normal: Vec2::NEG_X,
                half_length: 300.0
            }
        );
    }

    #[test]
    fn test_combined_elasticity_is_clamped() {
        let wild = Shape::cuboid(1.0, 1.0).with_elasticity(95.0);
        let ball = Shape::ball(1.0).with_elasticity(0.95);
        assert_eq!(combined_elasticity(&wild, &ball), 1.0);
    }
}
