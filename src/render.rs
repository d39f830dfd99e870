//! Canvas 2D rendering and DOM HUD glue
//!
//! Draws the letterboxed world (map, junction arrows, carts) and keeps
//! the HUD/banner DOM elements in sync with the session. Pure
//! read-only over the simulation state.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::assets::{self, CART_CELL, GameAssets};
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::heading_angle;
use crate::sim::{GameMode, GameState, Level};
use crate::viewport::Viewport;

/// World size an arrow sprite is drawn at
const ARROW_SIZE: f64 = 36.0;
/// World size a cart sprite is drawn at
const CART_SIZE: f64 = 44.0;
/// Bobbing amplitude in world units
const BOB_AMPLITUDE: f32 = 1.5;

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx })
    }

    /// Draw one frame
    pub fn draw(
        &self,
        state: &GameState,
        level: &Level,
        assets: &GameAssets,
        viewport: &Viewport,
    ) {
        let ctx = &self.ctx;

        // Letterbox bars
        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        ctx.set_fill_style_str("#101418");
        ctx.fill_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);

        let s = viewport.scale() as f64;
        let off = viewport.offset();
        let _ = ctx.set_transform(s, 0.0, 0.0, s, off.x as f64, off.y as f64);

        // Map (rails and buildings baked in)
        if assets::ready(&assets.map) {
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                &assets.map,
                0.0,
                0.0,
                WORLD_WIDTH as f64,
                WORLD_HEIGHT as f64,
            );
        } else {
            ctx.set_fill_style_str("#2c4a2c");
            ctx.fill_rect(0.0, 0.0, WORLD_WIDTH as f64, WORLD_HEIGHT as f64);
        }

        self.draw_junctions(state, assets);
        self.draw_carts(state, level, assets);
    }

    /// Arrows showing each junction's current routing
    fn draw_junctions(&self, state: &GameState, assets: &GameAssets) {
        if !assets::ready(&assets.arrow) {
            return;
        }
        let ctx = &self.ctx;
        for junction in &state.junctions {
            ctx.save();
            let _ = ctx.translate(junction.pos.x as f64, junction.pos.y as f64);
            let _ = ctx.rotate(junction.direction().angle() as f64);
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                &assets.arrow,
                -ARROW_SIZE / 2.0,
                -ARROW_SIZE / 2.0,
                ARROW_SIZE,
                ARROW_SIZE,
            );
            ctx.restore();
        }
    }

    fn draw_carts(&self, state: &GameState, level: &Level, assets: &GameAssets) {
        let ctx = &self.ctx;
        let strip_ready = assets::ready(&assets.carts);

        for cart in &state.carts {
            let bob = (cart.anim_phase.sin() * BOB_AMPLITUDE) as f64;

            if strip_ready {
                ctx.save();
                let _ = ctx.translate(cart.pos.x as f64, cart.pos.y as f64);
                let _ = ctx.rotate(heading_angle(cart.vel) as f64);
                let _ = ctx
                    .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        &assets.carts,
                        cart.style as f64 * CART_CELL,
                        0.0,
                        CART_CELL,
                        CART_CELL,
                        -CART_SIZE / 2.0,
                        -CART_SIZE / 2.0 + bob,
                        CART_SIZE,
                        CART_SIZE,
                    );
                ctx.restore();
            }

            // Destination tag rides above the cart, unrotated
            if let Some(building) = level.buildings.get(cart.destination) {
                ctx.set_fill_style_str("#f4f0e6");
                ctx.set_font("15px sans-serif");
                ctx.set_text_align("center");
                let _ = ctx.fill_text(
                    &building.name,
                    cart.pos.x as f64,
                    cart.pos.y as f64 - CART_SIZE / 2.0 - 6.0 + bob,
                );
            }
        }
    }
}

/// Update HUD elements and terminal banners in the DOM
pub fn update_hud(state: &GameState, level: &Level, fps: u32, show_fps: bool) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
        el.set_text_content(Some(&state.score.to_string()));
    }

    if let Some(el) = document.query_selector("#hud-lives .hud-value").ok().flatten() {
        el.set_text_content(Some(&state.lives.to_string()));
    }

    if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
        el.set_text_content(Some(&level.name));
    }

    if let Some(el) = document.get_element_by_id("hud-fps") {
        if show_fps {
            let _ = el.set_attribute("class", "hud-item");
            if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                val.set_text_content(Some(&fps.to_string()));
            }
        } else {
            let _ = el.set_attribute("class", "hud-item hidden");
        }
    }

    // Terminal banners
    if let Some(el) = document.get_element_by_id("game-won") {
        let class = if state.mode == GameMode::Won { "" } else { "hidden" };
        let _ = el.set_attribute("class", class);
    }
    if let Some(el) = document.get_element_by_id("game-over") {
        if state.mode == GameMode::Lost {
            let _ = el.set_attribute("class", "");
            if let Some(score_el) = document.get_element_by_id("final-score") {
                score_el.set_text_content(Some(&state.score.to_string()));
            }
        } else {
            let _ = el.set_attribute("class", "hidden");
        }
    }
}
