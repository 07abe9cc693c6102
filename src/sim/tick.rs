//! Per-tick input handling and fixed-step advance
//!
//! Input events are applied in arrival order: every key-down first removes
//! the tower if it is still there, then performs its own action.

use glam::Vec2;

use super::state::Arena;
use crate::config::{Config, ImpulseMode};
use crate::error::Result;

/// Keys the demo reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Escape,
    /// Any other key; still counts as a key press
    Other,
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "left" | "a" => Key::Left,
            "right" | "d" => Key::Right,
            "up" | "w" => Key::Up,
            "down" | "s" => Key::Down,
            "space" => Key::Space,
            "escape" | "esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// A decoded host event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
}

/// What the loop should do after handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// How key presses become impulses on the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpulseStrategy {
    /// Arrow keys push along ±X/±Y, applied `offset` behind the center on the push axis
    Directional { force: f32, offset: f32 },
    /// Space applies one fixed impulse at a fixed local point
    Launch { impulse: Vec2, offset: Vec2 },
}

impl ImpulseStrategy {
    pub fn from_config(config: &Config) -> Self {
        match config.impulse_mode() {
            ImpulseMode::Directional => ImpulseStrategy::Directional {
                force: config.force_applied(),
                offset: config.push_offset(),
            },
            ImpulseMode::Launch => ImpulseStrategy::Launch {
                impulse: config.launch_impulse(),
                offset: config.launch_offset(),
            },
        }
    }

    /// Local impulse and local application point for `key`, if it maps to one
    pub fn impulse_for(&self, key: Key) -> Option<(Vec2, Vec2)> {
        match *self {
            ImpulseStrategy::Directional { force, offset } => match key {
                Key::Right => Some((Vec2::new(force, 0.0), Vec2::new(-offset, 0.0))),
                Key::Left => Some((Vec2::new(-force, 0.0), Vec2::new(offset, 0.0))),
                Key::Up => Some((Vec2::new(0.0, -force), Vec2::new(0.0, -offset))),
                Key::Down => Some((Vec2::new(0.0, force), Vec2::new(0.0, offset))),
                _ => None,
            },
            ImpulseStrategy::Launch { impulse, offset } => match key {
                Key::Space => Some((impulse, offset)),
                _ => None,
            },
        }
    }
}

/// Apply one input event to the arena
pub fn handle_event(arena: &mut Arena, event: InputEvent) -> Result<Flow> {
    let key = match event {
        InputEvent::Quit => return Ok(Flow::Exit),
        InputEvent::KeyDown(key) => key,
    };

    arena.remove_tower_if_present()?;

    if key == Key::Escape {
        return Ok(Flow::Exit);
    }

    if let Some((impulse, point)) = arena.strategy().impulse_for(key) {
        log::debug!("{:?}: impulse {} at {}", key, impulse, point);
        arena.push_ball(impulse, point)?;
    }
    Ok(Flow::Continue)
}

/// Apply a batch of events in order, stopping at the first exit request
pub fn apply_input(arena: &mut Arena, events: &[InputEvent]) -> Result<Flow> {
    for &event in events {
        if handle_event(arena, event)? == Flow::Exit {
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

/// Apply input, then advance the arena by one fixed step.
/// No step happens once an exit has been requested.
pub fn tick(arena: &mut Arena, events: &[InputEvent]) -> Result<Flow> {
    if apply_input(arena, events)? == Flow::Exit {
        return Ok(Flow::Exit);
    }
    arena.step();
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaSize;
    use crate::sim::state::TowerSlot;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn arena_with(config: &Config) -> Arena {
        Arena::new(config).unwrap()
    }

    fn big_arena_config() -> Config {
        Config::default()
            .with_arena(ArenaSize {
                width: 800.0,
                height: 5000.0,
            })
            .unwrap()
    }

    #[test]
    fn test_directional_pushes_match_keys() {
        let cases = [
            (Key::Right, Vec2::new(1.0, 0.0)),
            (Key::Left, Vec2::new(-1.0, 0.0)),
            (Key::Up, Vec2::new(0.0, -1.0)),
            (Key::Down, Vec2::new(0.0, 1.0)),
        ];
        for (key, expected) in cases {
            let mut arena = arena_with(&Config::default());
            handle_event(&mut arena, InputEvent::KeyDown(key)).unwrap();
            let ball = arena.ball().unwrap();
            // 6000 / mass 10
            assert_relative_eq!(ball.velocity().x, expected.x * 600.0);
            assert_relative_eq!(ball.velocity().y, expected.y * 600.0);
            assert_relative_eq!(ball.angular_velocity(), 0.0);
        }
    }

    #[test]
    fn test_first_key_removes_tower_then_acts() {
        let mut arena = arena_with(&Config::default());
        assert!(arena.tower().is_present());

        let flow = apply_input(
            &mut arena,
            &[InputEvent::KeyDown(Key::Right), InputEvent::KeyDown(Key::Right)],
        )
        .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(arena.tower(), TowerSlot::Removed);
        assert_eq!(arena.world().len(), 5);
        // Both presses pushed the ball
        assert_relative_eq!(arena.ball().unwrap().velocity().x, 1200.0);
    }

    #[test]
    fn test_unmapped_key_still_removes_tower() {
        let mut arena = arena_with(&Config::default());
        handle_event(&mut arena, InputEvent::KeyDown(Key::Other)).unwrap();
        assert_eq!(arena.tower(), TowerSlot::Removed);
        assert_eq!(arena.ball().unwrap().velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_escape_and_quit_exit() {
        let mut arena = arena_with(&Config::default());
        assert_eq!(handle_event(&mut arena, InputEvent::Quit).unwrap(), Flow::Exit);
        // Quit is not a key press
        assert!(arena.tower().is_present());

        assert_eq!(
            handle_event(&mut arena, InputEvent::KeyDown(Key::Escape)).unwrap(),
            Flow::Exit
        );
        assert!(!arena.tower().is_present());
    }

    #[test]
    fn test_events_after_exit_are_ignored() {
        let mut arena = arena_with(&Config::default());
        let flow = tick(
            &mut arena,
            &[InputEvent::Quit, InputEvent::KeyDown(Key::Right)],
        )
        .unwrap();
        assert_eq!(flow, Flow::Exit);
        assert_eq!(arena.ball().unwrap().velocity(), Vec2::ZERO);
        assert_eq!(arena.time_ticks(), 0);
    }

    #[test]
    fn test_launch_accumulates_without_cap() {
        let config = Config::default().with_impulse_mode(ImpulseMode::Launch);
        let mut arena = arena_with(&config);
        for _ in 0..3 {
            handle_event(&mut arena, InputEvent::KeyDown(Key::Space)).unwrap();
        }
        assert_relative_eq!(arena.ball().unwrap().velocity().y, -1800.0);

        // Arrow keys do nothing in launch mode
        handle_event(&mut arena, InputEvent::KeyDown(Key::Left)).unwrap();
        assert_relative_eq!(arena.ball().unwrap().velocity().x, 0.0);
    }

    #[test]
    fn test_space_ignored_in_directional_mode() {
        let mut arena = arena_with(&Config::default());
        handle_event(&mut arena, InputEvent::KeyDown(Key::Space)).unwrap();
        assert_eq!(arena.ball().unwrap().velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("Right"), Key::Right);
        assert_eq!(Key::from_name(" esc "), Key::Escape);
        assert_eq!(Key::from_name("w"), Key::Up);
        assert_eq!(Key::from_name("q"), Key::Other);
        assert_eq!(Key::from_name("  SPACE "), Key::Space);
    }

    #[test]
    fn test_free_fall_two_seconds() {
        let config = big_arena_config()
            .with_physics(Vec2::new(0.0, 500.0), 240, 10.0, 10.0)
            .unwrap();
        let mut arena = arena_with(&config);
        // Tower sits below x = 400; take it out of the fall path
        arena.remove_tower_if_present().unwrap();
        assert_eq!(arena.ball().unwrap().position(), Vec2::new(400.0, 50.0));

        let mut last_y = arena.ball().unwrap().position().y;
        for _ in 0..(2 * 240) {
            assert_eq!(tick(&mut arena, &[]).unwrap(), Flow::Continue);
            let y = arena.ball().unwrap().position().y;
            assert!(y > last_y);
            assert_eq!(arena.world().contacts_last_step(), 0);
            last_y = y;
        }
        assert_relative_eq!(arena.ball().unwrap().velocity().y, 1000.0, epsilon = 0.05);
        // 50 + ½·500·2² plus the semi-implicit half-step bias
        assert_relative_eq!(last_y, 50.0 + 1000.0 + 1000.0 / 480.0, epsilon = 0.5);
    }

    #[test]
    fn test_fast_ball_stays_inside_walls() {
        let config = Config::default()
            .with_physics(Vec2::ZERO, 240, 10.0, 10.0)
            .unwrap();
        for (key, presses) in [(Key::Right, 15), (Key::Right, 20), (Key::Left, 30)] {
            let mut arena = arena_with(&config);
            // Faster than one radius per step
            tick(&mut arena, &vec![InputEvent::KeyDown(key); presses]).unwrap();
            for _ in 0..240 {
                tick(&mut arena, &[]).unwrap();
                let x = arena.ball().unwrap().position().x;
                assert!(x > 0.0 && x < 800.0, "{presses}x {key:?}: ball left the arena at x={x}");
            }
            // Still bouncing, not escaping
            assert!(arena.ball().unwrap().velocity().x.abs() > 1000.0);
        }
    }

    #[test]
    fn test_identical_runs_stay_together() {
        let schedule = |t: u64| match t {
            10 => vec![InputEvent::KeyDown(Key::Right)],
            200 => vec![InputEvent::KeyDown(Key::Up), InputEvent::KeyDown(Key::Left)],
            640 => vec![InputEvent::KeyDown(Key::Down)],
            _ => Vec::new(),
        };
        let config = Config::default();
        let mut a = arena_with(&config);
        let mut b = arena_with(&config);
        for t in 0..1000 {
            let events = schedule(t);
            tick(&mut a, &events).unwrap();
            tick(&mut b, &events).unwrap();
        }
        let (ba, bb) = (a.ball().unwrap(), b.ball().unwrap());
        assert!(ba.position().distance(bb.position()) < 1e-6);
        assert!(ba.velocity().distance(bb.velocity()) < 1e-6);
        assert!((ba.angle() - bb.angle()).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_push_sign_matches_key(force in 1.0f32..20000.0, offset in -50.0f32..50.0) {
            let strategy = ImpulseStrategy::Directional { force, offset };
            let (right, _) = strategy.impulse_for(Key::Right).unwrap();
            let (left, _) = strategy.impulse_for(Key::Left).unwrap();
            let (up, _) = strategy.impulse_for(Key::Up).unwrap();
            let (down, _) = strategy.impulse_for(Key::Down).unwrap();
            prop_assert!(right.x > 0.0 && right.y == 0.0);
            prop_assert!(left.x < 0.0 && left.y == 0.0);
            prop_assert!(up.y < 0.0 && up.x == 0.0);
            prop_assert!(down.y > 0.0 && down.x == 0.0);
        }

        #[test]
        fn prop_free_fall_velocity(gy in -1000.0f32..1000.0, steps in 1usize..200) {
            let config = big_arena_config()
                .with_physics(Vec2::new(0.0, gy), 240, 10.0, 10.0)
                .unwrap();
            let mut arena = arena_with(&config);
            arena.remove_tower_if_present().unwrap();
            // Start mid-arena so nothing is touched within 200 steps
            let ball = arena.ball_handle();
            arena.world_mut().body_mut(ball).unwrap().position = Vec2::new(400.0, 2500.0);

            let dt = arena.world().fixed_dt();
            for _ in 0..steps {
                arena.step();
            }
            let vy = arena.ball().unwrap().velocity().y;
            let expected = gy * steps as f32 * dt;
            prop_assert!((vy - expected).abs() <= 1e-3 * (1.0 + expected.abs()));
        }
    }
}
