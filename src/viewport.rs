//! Letterbox mapping between window pixels and the logical world
//!
//! The world is a fixed 1200x900 plane scaled uniformly to fit the
//! window and centered, leaving letterbox bars on the longer axis.
//! Pointer events arrive in canvas pixels and are mapped back through
//! the same scale/offset before the simulation sees them.

use glam::Vec2;

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Current canvas size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Uniform world-to-screen scale factor
    pub fn scale(&self) -> f32 {
        (self.width / WORLD_WIDTH).min(self.height / WORLD_HEIGHT)
    }

    /// Screen position of the world origin
    pub fn offset(&self) -> Vec2 {
        let s = self.scale();
        Vec2::new(
            (self.width - WORLD_WIDTH * s) / 2.0,
            (self.height - WORLD_HEIGHT * s) / 2.0,
        )
    }

    /// Map a canvas-relative pointer position to world coordinates
    pub fn screen_to_world(&self, x: f32, y: f32) -> Vec2 {
        let s = self.scale();
        let off = self.offset();
        Vec2::new((x - off.x) / s, (y - off.y) / s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_window_letterboxes_horizontally() {
        let vp = Viewport::new(2400.0, 900.0);
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.offset(), Vec2::new(600.0, 0.0));

        assert_eq!(vp.screen_to_world(600.0, 0.0), Vec2::new(0.0, 0.0));
        assert_eq!(vp.screen_to_world(1800.0, 900.0), Vec2::new(1200.0, 900.0));
    }

    #[test]
    fn tall_window_letterboxes_vertically() {
        let vp = Viewport::new(600.0, 900.0);
        assert_eq!(vp.scale(), 0.5);
        assert_eq!(vp.offset(), Vec2::new(0.0, 225.0));

        // Center of the screen is the center of the world
        let center = vp.screen_to_world(300.0, 450.0);
        assert_eq!(center, Vec2::new(600.0, 450.0));
    }

    #[test]
    fn round_trips_through_scale_and_offset() {
        let vp = Viewport::new(1731.0, 977.0);
        let world = Vec2::new(604.0, 567.0);
        let s = vp.scale();
        let off = vp.offset();
        let screen = world * s + off;
        let back = vp.screen_to_world(screen.x, screen.y);
        assert!((back - world).length() < 1e-3);
    }
}
