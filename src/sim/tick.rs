//! Fixed timestep simulation tick
//!
//! Advances every active cart, applies junction turns, resolves
//! building arrivals and drives the spawner. Deterministic: the same
//! level, seed and tap schedule produce the same run.

use glam::Vec2;
use rand::Rng;

use super::level::{DestinationPolicy, Level};
use super::state::{Cart, GameEvent, GameMode, GameState};
use crate::consts::*;

/// Advance the game state by one tick. Returns the events produced,
/// in the order they occurred. A no-op once the session is terminal.
pub fn tick(state: &mut GameState, level: &Level) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.mode != GameMode::Playing {
        return events;
    }

    state.time_ticks += 1;

    // Spawner: countdown, then one cart per expiry
    state.spawn_timer -= 1;
    if state.spawn_timer == 0 {
        state.spawn_timer = level.spawn_delay;
        spawn_cart(state, level);
        events.push(GameEvent::CartSpawned);
    }

    // Motion and junction turns
    for cart in &mut state.carts {
        cart.pos += cart.vel;

        // Scan junctions in declaration order, no early exit. Each
        // junction redirects a cart exactly once, on the first tick the
        // cart is inside its trigger radius; the flag keeps a cart that
        // lingers in the radius from re-reading a retargeted junction.
        for (j, junction) in state.junctions.iter().enumerate() {
            if cart.turned[j] {
                continue;
            }
            if cart.pos.distance(junction.pos) < TRIGGER_RADIUS {
                cart.vel = junction.direction().velocity(cart.speed);
                cart.turned[j] = true;
            }
        }

        cart.anim_phase += ANIM_PHASE_STEP;
    }

    // Arrivals: a cart is consumed by the first building in declaration
    // order whose arrival radius it enters, match or not.
    let mut i = 0;
    while i < state.carts.len() {
        let pos = state.carts[i].pos;
        let hit = level
            .buildings
            .iter()
            .position(|b| pos.distance(b.pos) < ARRIVAL_RADIUS);

        if let Some(building) = hit {
            let cart = state.carts.remove(i);
            resolve_arrival(state, level, &cart, building, &mut events);
            if state.mode != GameMode::Playing {
                return events;
            }
            continue;
        }

        // A cart that escapes the world can never arrive
        if out_of_bounds(pos) {
            let cart = state.carts.remove(i);
            log::debug!("cart {} lost out of bounds at {:?}", cart.id, cart.pos);
            events.push(GameEvent::CartLost);
            lose_life(state, &mut events);
            if state.mode != GameMode::Playing {
                return events;
            }
            continue;
        }

        i += 1;
    }

    events
}

/// Spawn speed steps up with score and stays fixed for the cart's life
pub fn spawn_speed(score: u32) -> f32 {
    (BASE_CART_SPEED + (score / SPEED_STEP_SCORE) as f32 * SPEED_STEP_BOOST).min(MAX_CART_SPEED)
}

fn spawn_cart(state: &mut GameState, level: &Level) {
    let dest_name = match level.policy {
        DestinationPolicy::Cycle => {
            &level.destinations[state.spawn_count as usize % level.destinations.len()]
        }
        DestinationPolicy::Random => {
            let i = state.rng.random_range(0..level.destinations.len());
            &level.destinations[i]
        }
    };
    // Validation guarantees every destination names a building
    let destination = level.building_index(dest_name).unwrap_or(0);

    let speed = spawn_speed(state.score);
    let style = state.rng.random_range(0..CART_STYLES);
    let id = state.next_entity_id();
    state.carts.push(Cart::new(
        id,
        level.spawn_point,
        level.spawn_dir,
        speed,
        destination,
        style,
        state.junctions.len(),
    ));
    state.spawn_count += 1;
}

fn resolve_arrival(
    state: &mut GameState,
    level: &Level,
    cart: &Cart,
    building: usize,
    events: &mut Vec<GameEvent>,
) {
    if building == cart.destination {
        state.score += 1;
        // Mark every destination-list entry this building satisfies
        for (i, name) in level.destinations.iter().enumerate() {
            if level.building_index(name) == Some(building) {
                state.delivered[i] = true;
            }
        }
        events.push(GameEvent::Delivered { building });

        if level.policy == DestinationPolicy::Cycle && state.delivered.iter().all(|&d| d) {
            state.mode = GameMode::Won;
            events.push(GameEvent::Won);
            log::info!("all destinations delivered, score {}", state.score);
        }
    } else {
        events.push(GameEvent::Mismatch { building });
        lose_life(state, events);
    }
}

fn lose_life(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.lives = state.lives.saturating_sub(1);
    if state.lives == 0 {
        state.mode = GameMode::Lost;
        events.push(GameEvent::Lost);
        log::info!("out of lives at tick {}, score {}", state.time_ticks, state.score);
    }
}

fn out_of_bounds(pos: Vec2) -> bool {
    pos.x < -OUT_OF_BOUNDS_MARGIN
        || pos.x > WORLD_WIDTH + OUT_OF_BOUNDS_MARGIN
        || pos.y < -OUT_OF_BOUNDS_MARGIN
        || pos.y > WORLD_HEIGHT + OUT_OF_BOUNDS_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Direction;
    use proptest::prelude::*;

    /// Hand-place a cart, bypassing the spawner
    fn push_cart(state: &mut GameState, pos: Vec2, dir: Direction, destination: usize) {
        let id = state.next_entity_id();
        let junction_count = state.junctions.len();
        state.carts.push(Cart::new(
            id,
            pos,
            dir,
            BASE_CART_SPEED,
            destination,
            0,
            junction_count,
        ));
    }

    #[test]
    fn up_at_a_junction_continues_upward() {
        // Junction (604,567) allowing [up,left,right], default up; a
        // cart rising from (599,846) keeps vy negative through it.
        let level = Level::downtown();
        let mut state = GameState::new(&level, 42);
        push_cart(&mut state, Vec2::new(599.0, 846.0), Direction::Up, 0);

        for _ in 0..120 {
            tick(&mut state, &level);
        }
        let cart = &state.carts[0];
        assert!(cart.turned[0], "cart should have passed the south fork");
        assert!(cart.pos.y < 567.0);
        assert_eq!(cart.vel, Vec2::new(0.0, -2.5));
    }

    #[test]
    fn junction_redirects_along_its_current_direction() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 42);
        // Point the south fork left before the cart gets there
        state.tap(level.junctions[0].pos);
        push_cart(&mut state, Vec2::new(599.0, 846.0), Direction::Up, 0);

        for _ in 0..120 {
            tick(&mut state, &level);
        }
        let cart = &state.carts[0];
        assert!(cart.turned[0]);
        assert_eq!(cart.vel, Vec2::new(-2.5, 0.0));
    }

    #[test]
    fn cart_turns_at_most_once_per_junction() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 42);
        push_cart(&mut state, Vec2::new(599.0, 846.0), Direction::Up, 0);

        // Run until the turn fires, while the cart is still inside the
        // trigger radius
        while !state.carts[0].turned[0] {
            tick(&mut state, &level);
        }
        let vel = state.carts[0].vel;

        // Retarget the junction under the lingering cart; the flag must
        // keep the cart's velocity unchanged
        state.tap(level.junctions[0].pos);
        tick(&mut state, &level);
        tick(&mut state, &level);
        assert_eq!(state.carts[0].vel, vel);
    }

    #[test]
    fn spawner_fires_on_exact_tick_boundaries() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 7);

        let mut spawn_ticks = Vec::new();
        for t in 1..=400u64 {
            let events = tick(&mut state, &level);
            if events.contains(&GameEvent::CartSpawned) {
                spawn_ticks.push(t);
            }
        }
        assert_eq!(spawn_ticks, vec![200, 400]);
        assert_eq!(state.carts.len(), 2);
    }

    #[test]
    fn matched_arrival_scores_and_removes_the_cart() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 1);
        // Destination 0 is the depot at (600,128); approach from below
        push_cart(&mut state, Vec2::new(600.0, 160.0), Direction::Up, 0);

        let mut all = Vec::new();
        for _ in 0..10 {
            all.extend(tick(&mut state, &level));
        }
        assert!(all.contains(&GameEvent::Delivered { building: 0 }));
        assert_eq!(state.score, 1);
        assert_eq!(state.lives, level.lives);
        assert!(state.carts.is_empty());
    }

    #[test]
    fn mismatched_arrival_costs_a_life_not_score() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 1);
        push_cart(&mut state, Vec2::new(600.0, 160.0), Direction::Up, 1);

        let mut all = Vec::new();
        for _ in 0..10 {
            all.extend(tick(&mut state, &level));
        }
        assert!(all.contains(&GameEvent::Mismatch { building: 0 }));
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, level.lives - 1);
        assert!(state.carts.is_empty());
    }

    #[test]
    fn third_mismatch_ends_the_session_not_earlier() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 1);

        for round in 1..=3u8 {
            push_cart(&mut state, Vec2::new(600.0, 160.0), Direction::Up, 1);
            let mut all = Vec::new();
            while !state.carts.is_empty() {
                all.extend(tick(&mut state, &level));
            }
            if round < 3 {
                assert_eq!(state.mode, GameMode::Playing, "round {round}");
                assert!(!all.contains(&GameEvent::Lost));
            } else {
                assert_eq!(state.mode, GameMode::Lost);
                assert!(all.contains(&GameEvent::Lost));
            }
            assert_eq!(state.lives, 3 - round);
        }
    }

    #[test]
    fn terminal_state_is_idempotent_under_ticks() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 1);
        state.lives = 1;
        push_cart(&mut state, Vec2::new(600.0, 160.0), Direction::Up, 1);
        while state.mode == GameMode::Playing {
            tick(&mut state, &level);
        }

        let (mode, score, lives, ticks) = (state.mode, state.score, state.lives, state.time_ticks);
        for _ in 0..10 {
            assert!(tick(&mut state, &level).is_empty());
        }
        assert_eq!(state.mode, mode);
        assert_eq!(state.score, score);
        assert_eq!(state.lives, lives);
        assert_eq!(state.time_ticks, ticks);
        assert!(state.carts.is_empty());
    }

    #[test]
    fn escaped_cart_is_lost_and_costs_a_life() {
        let level = Level::downtown();
        let mut state = GameState::new(&level, 1);
        // Above the depot and still climbing: nothing left to hit
        push_cart(&mut state, Vec2::new(599.0, 50.0), Direction::Up, 1);

        let mut all = Vec::new();
        for _ in 0..60 {
            all.extend(tick(&mut state, &level));
        }
        assert!(all.contains(&GameEvent::CartLost));
        assert_eq!(state.lives, level.lives - 1);
        assert!(state.carts.is_empty());
    }

    #[test]
    fn spawn_speed_steps_with_score() {
        assert_eq!(spawn_speed(0), 2.5);
        assert_eq!(spawn_speed(4), 2.5);
        assert_eq!(spawn_speed(5), 3.0);
        assert_eq!(spawn_speed(14), 3.5);
        // Capped well below the trigger diameter
        assert_eq!(spawn_speed(1000), MAX_CART_SPEED);
    }

    #[test]
    fn cycle_level_is_won_after_full_coverage() {
        // crossroads destinations cycle farm, mine, dock. Route cart 1
        // straight up, cart 2 left, cart 3 right.
        let level = Level::crossroads();
        let mut state = GameState::new(&level, 7);
        let fork = level.junctions[0].pos;

        let mut all = Vec::new();
        for t in 1..=1200u64 {
            if t == 500 {
                state.tap(fork); // up -> left, for the mine cart
            }
            if t == 740 {
                state.tap(fork); // left -> right, for the dock cart
            }
            all.extend(tick(&mut state, &level));
            if state.mode == GameMode::Won {
                break;
            }
        }
        assert_eq!(state.mode, GameMode::Won);
        assert_eq!(state.score, 3);
        assert!(all.contains(&GameEvent::Won));
    }

    proptest! {
        /// Whatever the tap schedule, cart motion never leaves the axes
        #[test]
        fn motion_stays_axis_aligned(
            seed in any::<u64>(),
            taps in prop::collection::vec(
                (0f32..1200.0, 0f32..900.0, 1u64..500), 0..24),
        ) {
            let level = Level::downtown();
            let mut state = GameState::new(&level, seed);

            for t in 1..=500u64 {
                for &(x, y, at) in &taps {
                    if at == t {
                        state.tap(Vec2::new(x, y));
                    }
                }
                tick(&mut state, &level);
                for cart in &state.carts {
                    prop_assert!(
                        cart.vel.x == 0.0 || cart.vel.y == 0.0,
                        "cart {} vel {:?} at tick {}", cart.id, cart.vel, t
                    );
                    prop_assert!(cart.vel.length() > 0.0);
                }
            }
        }
    }
}
