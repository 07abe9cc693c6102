//! Draw intent for an external renderer
//!
//! The core never draws. Each frame it describes every live body as a
//! rectangle or circle with a color, and a renderer turns that into pixels.

use glam::Vec2;

use crate::sim::{Arena, BodyHandle, Geometry, TowerSlot};

/// Colors for scene elements (RGBA, 0-1)
pub mod colors {
    pub const GRAY: [f32; 4] = [127.0 / 255.0, 127.0 / 255.0, 127.0 / 255.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
}

/// What a body is in the scene, for palette lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Ball,
    Wall,
    Tower,
    /// Bodies added to the world outside the arena layout
    Prop,
}

/// Palette mapping roles to colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: [f32; 4],
    pub ball: [f32; 4],
    pub wall: [f32; 4],
    pub tower: [f32; 4],
    pub prop: [f32; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: colors::GRAY,
            ball: colors::WHITE,
            wall: colors::BLACK,
            tower: colors::BLACK,
            prop: colors::RED,
        }
    }
}

impl Palette {
    pub fn color_for(&self, role: Role) -> [f32; 4] {
        match role {
            Role::Ball => self.ball,
            Role::Wall => self.wall,
            Role::Tower => self.tower,
            Role::Prop => self.prop,
        }
    }
}

/// Geometry in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawShape {
    Rect {
        center: Vec2,
        half_extents: Vec2,
        angle: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        angle: f32,
    },
    /// A boundary edge
    Segment { start: Vec2, end: Vec2 },
}

/// One thing to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub handle: BodyHandle,
    pub role: Role,
    pub shape: DrawShape,
    pub color: [f32; 4],
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Simulation tick the frame was taken at
    pub tick: u64,
    pub clear: [f32; 4],
    pub commands: Vec<DrawCommand>,
}

fn role_of(arena: &Arena, handle: BodyHandle) -> Role {
    if handle == arena.ball_handle() {
        Role::Ball
    } else if arena.walls().contains(&handle) {
        Role::Wall
    } else if arena.tower() == TowerSlot::Present(handle) {
        Role::Tower
    } else {
        Role::Prop
    }
}

/// Describe the current arena, in world registration order
pub fn extract(arena: &Arena, palette: &Palette) -> Frame {
    let commands = arena
        .world()
        .iter()
        .map(|(body, shape)| {
            let role = role_of(arena, body.handle());
            let shape = match shape.geometry {
                Geometry::Box { half_w, half_h } => DrawShape::Rect {
                    center: body.position(),
                    half_extents: Vec2::new(half_w, half_h),
                    angle: body.angle(),
                },
                Geometry::Circle { radius } => DrawShape::Circle {
                    center: body.position(),
                    radius,
                    angle: body.angle(),
                },
                Geometry::Boundary {
                    normal,
                    half_length,
                } => {
                    let along = body.local_to_world(normal.perp() * half_length) - body.position();
                    DrawShape::Segment {
                        start: body.position() - along,
                        end: body.position() + along,
                    }
                }
            };
            DrawCommand {
                handle: body.handle(),
                role,
                shape,
                color: palette.color_for(role),
            }
        })
        .collect();

    Frame {
        tick: arena.time_ticks(),
        clear: palette.background,
        commands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_extract_initial_scene() {
        let arena = Arena::new(&Config::default()).unwrap();
        let frame = extract(&arena, &Palette::default());

        assert_eq!(frame.clear, colors::GRAY);
        assert_eq!(frame.commands.len(), 6);

        let ball = &frame.commands[0];
        assert_eq!(ball.role, Role::Ball);
        assert_eq!(ball.color, colors::WHITE);
        assert_eq!(
            ball.shape,
            DrawShape::Circle {
                center: Vec2::new(400.0, 50.0),
                radius: 25.0,
                angle: 0.0
            }
        );

        assert_eq!(frame.commands[1].role, Role::Tower);
        let walls = frame.commands.iter().filter(|c| c.role == Role::Wall).count();
        assert_eq!(walls, 4);
        assert!(frame.commands[1..].iter().all(|c| c.color == colors::BLACK));

        // Bottom edge spans the full arena width
        let bottom = frame.commands[5];
        assert_eq!(bottom.role, Role::Wall);
        let DrawShape::Segment { start, end } = bottom.shape else {
            panic!("walls are drawn as segments");
        };
        assert_eq!(start.y, 600.0);
        assert_eq!(end.y, 600.0);
        assert_eq!((start.x - end.x).abs(), 800.0);
    }

    #[test]
    fn test_extract_after_tower_removal() {
        let mut arena = Arena::new(&Config::default()).unwrap();
        arena.remove_tower_if_present().unwrap();
        let frame = extract(&arena, &Palette::default());
        assert_eq!(frame.commands.len(), 5);
        assert!(frame.commands.iter().all(|c| c.role != Role::Tower));
    }

    #[test]
    fn test_custom_palette() {
        let arena = Arena::new(&Config::default()).unwrap();
        let palette = Palette {
            ball: colors::RED,
            ..Default::default()
        };
        let frame = extract(&arena, &palette);
        assert_eq!(frame.commands[0].color, colors::RED);
    }
}
