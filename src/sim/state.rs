//! Arena state: the world plus the handles of the demo's bodies
//!
//! The ball and the four walls live for the whole run. The tower starts
//! present and can be removed once; nothing ever puts it back.

use glam::Vec2;

use super::body::{BodyHandle, RigidBody};
use super::shape::Shape;
use super::tick::ImpulseStrategy;
use super::world::World;
use crate::config::Config;
use crate::consts::*;
use crate::error::{Result, SimError};

/// Whether the tower obstacle is still in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TowerSlot {
    Present(BodyHandle),
    /// Terminal
    Removed,
}

impl TowerSlot {
    pub fn is_present(&self) -> bool {
        matches!(self, TowerSlot::Present(_))
    }
}

/// Which edge of the arena a wall covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Top,
    Right,
    Bottom,
}

impl WallSide {
    pub const ALL: [WallSide; 4] = [WallSide::Left, WallSide::Top, WallSide::Right, WallSide::Bottom];

    /// Point on the edge, inward normal and half length of the wall for an
    /// arena of `width` × `height`
    fn placement(self, width: f32, height: f32) -> (Vec2, Vec2, f32) {
        match self {
            WallSide::Left => (Vec2::new(0.0, height / 2.0), Vec2::X, height / 2.0),
            WallSide::Top => (Vec2::new(width / 2.0, 0.0), Vec2::Y, width / 2.0),
            WallSide::Right => (Vec2::new(width, height / 2.0), Vec2::NEG_X, height / 2.0),
            WallSide::Bottom => (Vec2::new(width / 2.0, height), Vec2::NEG_Y, width / 2.0),
        }
    }
}

/// The simulated scene
#[derive(Debug, Clone)]
pub struct Arena {
    world: World,
    ball: BodyHandle,
    walls: [BodyHandle; 4],
    tower: TowerSlot,
    strategy: ImpulseStrategy,
    /// Simulation tick counter
    time_ticks: u64,
}

impl Arena {
    /// Build the world and register the ball, the tower and the walls
    pub fn new(config: &Config) -> Result<Self> {
        let mut world = World::from_config(config);
        let arena = config.arena();

        let ball = RigidBody::new_dynamic(
            world.next_handle(),
            Vec2::new(arena.width / 2.0, BALL_SPAWN_Y),
            config.ball_mass(),
            config.ball_moment(),
        )?;
        let ball = world.add_body(
            ball,
            Shape::ball(BALL_RADIUS).with_elasticity(config.ball_elasticity()),
        )?;

        // The tower never gets an elasticity of its own
        let tower = RigidBody::new_static(
            world.next_handle(),
            arena.center() + Vec2::new(0.0, TOWER_DROP),
        );
        let tower = world.add_body(tower, Shape::cuboid(TOWER_WIDTH / 2.0, TOWER_HEIGHT / 2.0))?;

        let mut walls = [BodyHandle(0); 4];
        for (slot, side) in walls.iter_mut().zip(WallSide::ALL) {
            let (center, normal, half_length) = side.placement(arena.width, arena.height);
            let body = RigidBody::new_static(world.next_handle(), center);
            let shape =
                Shape::boundary(normal, half_length).with_elasticity(config.wall_elasticity());
            *slot = world.add_body(body, shape)?;
        }

        log::info!(
            "Arena {}x{} built: ball {:?}, tower {:?}, {} bodies, dt={:.5}s",
            arena.width,
            arena.height,
            ball,
            tower,
            world.len(),
            world.fixed_dt()
        );

        Ok(Self {
            world,
            ball,
            walls,
            tower: TowerSlot::Present(tower),
            strategy: ImpulseStrategy::from_config(config),
            time_ticks: 0,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn ball_handle(&self) -> BodyHandle {
        self.ball
    }

    /// The ball body
    pub fn ball(&self) -> Result<&RigidBody> {
        self.world
            .body(self.ball)
            .ok_or(SimError::UnknownEntity(self.ball))
    }

    pub fn walls(&self) -> &[BodyHandle; 4] {
        &self.walls
    }

    pub fn tower(&self) -> TowerSlot {
        self.tower
    }

    pub fn strategy(&self) -> &ImpulseStrategy {
        &self.strategy
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Remove the tower if it is still registered.
    ///
    /// Returns whether a removal happened. Presence is checked against the
    /// world's registry, so calling this any number of times never fails.
    pub fn remove_tower_if_present(&mut self) -> Result<bool> {
        let TowerSlot::Present(handle) = self.tower else {
            return Ok(false);
        };
        self.tower = TowerSlot::Removed;
        if !self.world.contains(handle) {
            return Ok(false);
        }
        self.world.remove_body(handle)?;
        log::info!("Tower removed");
        Ok(true)
    }

    /// Apply the ball impulse in body-local coordinates
    pub fn push_ball(&mut self, impulse: Vec2, point: Vec2) -> Result<()> {
        self.world.apply_impulse_at_local_point(self.ball, impulse, point)
    }

    /// Advance the world by one fixed step
    pub fn step(&mut self) {
        self.world.tick();
        self.time_ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shape::Geometry;
    use approx::assert_relative_eq;

    #[test]
    fn test_arena_layout() {
        let arena = Arena::new(&Config::default()).unwrap();
        let world = arena.world();
        // Ball, tower and four walls
        assert_eq!(world.len(), 6);

        let ball = arena.ball().unwrap();
        assert_eq!(ball.position(), Vec2::new(400.0, 50.0));
        assert_eq!(ball.mass(), 10.0);
        assert_eq!(world.shape(arena.ball_handle()).unwrap().elasticity, Some(0.95));

        let TowerSlot::Present(tower) = arena.tower() else {
            panic!("tower should start present");
        };
        assert_eq!(world.body(tower).unwrap().position(), Vec2::new(400.0, 500.0));
        let tower_shape = world.shape(tower).unwrap();
        assert_eq!(tower_shape.geometry, Geometry::Box { half_w: 12.5, half_h: 300.0 });
        assert_eq!(tower_shape.elasticity, None);

        let bottom = world.body(arena.walls()[3]).unwrap();
        assert_eq!(bottom.position(), Vec2::new(400.0, 600.0));
        assert_eq!(
            world.shape(arena.walls()[3]).unwrap().geometry,
            Geometry::Boundary {
                normal: Vec2::NEG_Y,
                half_length: 400.0
            }
        );
    }

    #[test]
    fn test_tower_removal_is_one_shot() {
        let mut arena = Arena::new(&Config::default()).unwrap();
        assert!(arena.remove_tower_if_present().unwrap());
        assert_eq!(arena.tower(), TowerSlot::Removed);
        assert_eq!(arena.world().len(), 5);

        assert!(!arena.remove_tower_if_present().unwrap());
        assert_eq!(arena.world().len(), 5);
    }

    #[test]
    fn test_tower_removed_behind_our_back_is_not_an_error() {
        let mut arena = Arena::new(&Config::default()).unwrap();
        let TowerSlot::Present(tower) = arena.tower() else {
            unreachable!()
        };
        arena.world_mut().remove_body(tower).unwrap();
        assert!(!arena.remove_tower_if_present().unwrap());
        assert_eq!(arena.tower(), TowerSlot::Removed);
    }

    #[test]
    fn test_ball_lands_on_tower_top() {
        let config = Config::default().with_physics(Vec2::new(0.0, 500.0), 240, 10.0, 10.0).unwrap();
        let mut arena = Arena::new(&config).unwrap();
        // Tower top at y = 200, ball radius 25: the ball must stop near y = 175
        // or bounce off it, never pass through
        for _ in 0..(240 * 3) {
            arena.step();
            let y = arena.ball().unwrap().position().y;
            assert!(y < 200.0, "ball went through the tower: y={y}");
        }
        assert_eq!(arena.time_ticks(), 720);
    }

    #[test]
    fn test_push_ball_changes_velocity_immediately() {
        let mut arena = Arena::new(&Config::default()).unwrap();
        arena.push_ball(Vec2::new(6000.0, 0.0), Vec2::new(-25.0, 0.0)).unwrap();
        assert_relative_eq!(arena.ball().unwrap().velocity().x, 600.0);
        assert_eq!(arena.ball().unwrap().position(), Vec2::new(400.0, 50.0));
    }
}
