//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick = one frame)
//! - Seeded RNG only
//! - Stable iteration order (level declaration order)
//! - No rendering or platform dependencies

pub mod level;
pub mod state;
pub mod tick;

pub use level::{BuildingSpec, DestinationPolicy, JunctionSpec, Level, LevelError};
pub use state::{Cart, Direction, GameEvent, GameMode, GameState, Junction};
pub use tick::{spawn_speed, tick};
