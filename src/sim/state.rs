//! Game state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::Level;
use crate::consts::*;

/// An axis-aligned travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Velocity for this direction at the given speed. Screen-style
    /// coordinates: up is negative y.
    pub fn velocity(self, speed: f32) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -speed),
            Direction::Down => Vec2::new(0.0, speed),
            Direction::Left => Vec2::new(-speed, 0.0),
            Direction::Right => Vec2::new(speed, 0.0),
        }
    }

    /// Rotation for a sprite drawn facing up
    pub fn angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            Direction::Up => 0.0,
            Direction::Right => FRAC_PI_2,
            Direction::Down => PI,
            Direction::Left => -FRAC_PI_2,
        }
    }
}

/// Current session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Active play
    Playing,
    /// Every listed destination delivered (Cycle levels only)
    Won,
    /// Out of lives
    Lost,
}

/// Something the tick produced that the host may want to react to
/// (sound cues, logging). Ordered as they occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    CartSpawned,
    /// Correct delivery at this building index
    Delivered { building: usize },
    /// Wrong building; a life was spent
    Mismatch { building: usize },
    /// A cart escaped the world; a life was spent
    CartLost,
    Won,
    Lost,
}

/// A junction's runtime state: its spec data plus the cyclic cursor
#[derive(Debug, Clone)]
pub struct Junction {
    pub name: String,
    pub pos: Vec2,
    cycle: Vec<Direction>,
    current: usize,
    default_index: usize,
}

impl Junction {
    pub fn from_spec(spec: &super::level::JunctionSpec) -> Self {
        // Validation guarantees the default is a member of the cycle
        let default_index = spec
            .cycle
            .iter()
            .position(|&d| d == spec.default_dir)
            .unwrap_or(0);
        Self {
            name: spec.name.clone(),
            pos: spec.pos,
            cycle: spec.cycle.clone(),
            current: default_index,
            default_index,
        }
    }

    /// The direction the junction currently routes carts toward
    pub fn direction(&self) -> Direction {
        self.cycle[self.current]
    }

    /// Cycle to the next allowed direction, wrapping after the last
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.cycle.len();
    }

    pub fn reset(&mut self) {
        self.current = self.default_index;
    }
}

/// A cart in flight
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: u32,
    pub pos: Vec2,
    /// Exactly one non-zero axis at any time
    pub vel: Vec2,
    /// Fixed at spawn; magnitude of `vel`
    pub speed: f32,
    /// Building index the cart must reach; fixed at spawn
    pub destination: usize,
    /// Cosmetic sprite variant
    pub style: u8,
    /// Drives the bobbing offset; cosmetic only
    pub anim_phase: f32,
    /// One flag per level junction, by declaration index. Set when the
    /// junction redirects this cart; a cart lingering inside a trigger
    /// radius for several ticks must not re-read the direction.
    pub turned: Vec<bool>,
}

impl Cart {
    pub fn new(
        id: u32,
        pos: Vec2,
        dir: Direction,
        speed: f32,
        destination: usize,
        style: u8,
        junction_count: usize,
    ) -> Self {
        Self {
            id,
            pos,
            vel: dir.velocity(speed),
            speed,
            destination,
            style,
            anim_phase: 0.0,
            turned: vec![false; junction_count],
        }
    }
}

/// Complete session state. Owns the active carts and the junction
/// states exclusively; everything the tick mutates lives here.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub mode: GameMode,
    pub score: u32,
    pub lives: u8,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks until the next spawn
    pub spawn_timer: u32,
    /// Carts spawned so far (drives Cycle destination assignment)
    pub spawn_count: u32,
    /// One flag per destination-list entry (Cycle win check)
    pub delivered: Vec<bool>,
    pub carts: Vec<Cart>,
    pub junctions: Vec<Junction>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh session for a validated level
    pub fn new(level: &Level, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode: GameMode::Playing,
            score: 0,
            lives: level.lives,
            time_ticks: 0,
            spawn_timer: level.spawn_delay,
            spawn_count: 0,
            delivered: vec![false; level.destinations.len()],
            carts: Vec::new(),
            junctions: level.junctions.iter().map(Junction::from_spec).collect(),
            next_id: 1,
        }
    }

    /// Back to Playing: counters cleared, carts emptied, junction
    /// directions reset to level defaults.
    pub fn restart(&mut self, level: &Level, seed: u64) {
        *self = Self::new(level, seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Apply a tap at world coordinates. Every junction whose distance
    /// to the tap is strictly inside the tap radius advances - no
    /// exclusivity when radii overlap. Returns how many advanced.
    pub fn tap(&mut self, world: Vec2) -> usize {
        if self.mode != GameMode::Playing {
            return 0;
        }
        let mut advanced = 0;
        for junction in &mut self.junctions {
            if junction.pos.distance(world) < TAP_RADIUS {
                junction.advance();
                advanced += 1;
            }
        }
        advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::JunctionSpec;

    fn two_way(cycle: Vec<Direction>, default_dir: Direction) -> Junction {
        Junction::from_spec(&JunctionSpec {
            name: "test".into(),
            pos: Vec2::new(100.0, 100.0),
            cycle,
            default_dir,
        })
    }

    #[test]
    fn velocity_mapping_is_axis_aligned_per_direction() {
        assert_eq!(Direction::Up.velocity(2.5), Vec2::new(0.0, -2.5));
        assert_eq!(Direction::Down.velocity(2.5), Vec2::new(0.0, 2.5));
        assert_eq!(Direction::Left.velocity(2.5), Vec2::new(-2.5, 0.0));
        assert_eq!(Direction::Right.velocity(2.5), Vec2::new(2.5, 0.0));
    }

    #[test]
    fn direction_cycles_with_wraparound_parity() {
        let mut junction = two_way(vec![Direction::Up, Direction::Right], Direction::Up);

        for taps in 0..8 {
            let expected = if taps % 2 == 0 {
                Direction::Up
            } else {
                Direction::Right
            };
            assert_eq!(junction.direction(), expected, "after {taps} taps");
            junction.advance();
        }
    }

    #[test]
    fn reset_returns_to_default_direction() {
        let mut junction = two_way(
            vec![Direction::Left, Direction::Up, Direction::Right],
            Direction::Up,
        );
        assert_eq!(junction.direction(), Direction::Up);
        junction.advance();
        assert_eq!(junction.direction(), Direction::Right);
        junction.reset();
        assert_eq!(junction.direction(), Direction::Up);
    }

    #[test]
    fn tap_advances_every_junction_inside_the_radius() {
        let mut level = Level::downtown();
        // Two junctions 30 units apart: one tap can reach both
        level.junctions[1].pos = Vec2::new(620.0, 590.0);
        let mut state = GameState::new(&level, 1);

        let before: Vec<Direction> = state.junctions.iter().map(|j| j.direction()).collect();
        let advanced = state.tap(Vec2::new(610.0, 575.0));
        assert_eq!(advanced, 2);
        assert_ne!(state.junctions[0].direction(), before[0]);
        assert_ne!(state.junctions[1].direction(), before[1]);
        // The far junction is untouched
        assert_eq!(state.junctions[2].direction(), before[2]);
    }

    #[test]
    fn tap_radius_is_strict() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 1);
        let pos = state.junctions[0].pos;

        assert_eq!(state.tap(pos + Vec2::new(TAP_RADIUS, 0.0)), 0);
        assert_eq!(state.tap(pos + Vec2::new(TAP_RADIUS - 0.1, 0.0)), 1);
    }

    #[test]
    fn taps_are_ignored_once_terminal() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 1);
        state.mode = GameMode::Lost;

        let before = state.junctions[0].direction();
        assert_eq!(state.tap(state.junctions[0].pos), 0);
        assert_eq!(state.junctions[0].direction(), before);
    }

    #[test]
    fn restart_resets_session_and_junctions() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 1);

        state.tap(state.junctions[0].pos);
        state.score = 9;
        state.lives = 1;
        state.mode = GameMode::Lost;
        state.carts.push(Cart::new(
            99,
            level.spawn_point,
            level.spawn_dir,
            BASE_CART_SPEED,
            0,
            0,
            level.junctions.len(),
        ));

        state.restart(&level, 2);
        assert_eq!(state.mode, GameMode::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, level.lives);
        assert!(state.carts.is_empty());
        assert_eq!(state.junctions[0].direction(), Direction::Up);
        assert_eq!(state.spawn_timer, level.spawn_delay);
    }
}
