//! Rail Rush - a top-down cart routing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (carts, junctions, deliveries)
//! - `viewport`: Letterbox mapping between window pixels and the world
//! - `render`: Canvas 2D drawing + DOM HUD glue (browser only)
//! - `audio`: Procedurally generated sound effects (browser only)
//! - `assets`: Image loading with per-image readiness (browser only)
//! - `settings`: Player preferences

pub mod settings;
pub mod sim;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod assets;
#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod render;

pub use settings::Settings;
pub use viewport::Viewport;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz; one tick = one frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical world dimensions
    pub const WORLD_WIDTH: f32 = 1200.0;
    pub const WORLD_HEIGHT: f32 = 900.0;

    /// Distance at which a junction redirects a cart. Smaller than the
    /// tap radius: redirection wants rail-level precision, taps don't.
    pub const TRIGGER_RADIUS: f32 = 7.0;
    /// Distance at which a tap is accepted as targeting a junction
    pub const TAP_RADIUS: f32 = 40.0;
    /// Distance at which a building consumes a cart
    pub const ARRIVAL_RADIUS: f32 = 22.0;
    /// Carts farther than this outside the world are lost
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 40.0;

    /// Base cart speed (world units per tick)
    pub const BASE_CART_SPEED: f32 = 2.5;
    /// Deliveries per spawn-speed step
    pub const SPEED_STEP_SCORE: u32 = 5;
    /// Speed added per step (world units per tick)
    pub const SPEED_STEP_BOOST: f32 = 0.5;
    /// Spawn-speed cap; must stay below the trigger diameter so a cart
    /// cannot tunnel past a junction in a single tick
    pub const MAX_CART_SPEED: f32 = 6.0;

    /// Animation phase advance per tick (drives the bobbing offset)
    pub const ANIM_PHASE_STEP: f32 = 0.2;
    /// Number of cosmetic cart sprite variants
    pub const CART_STYLES: u8 = 4;
}

/// Rotation for a sprite drawn facing up, from an axis-aligned velocity
#[inline]
pub fn heading_angle(vel: Vec2) -> f32 {
    vel.y.atan2(vel.x) + std::f32::consts::FRAC_PI_2
}
