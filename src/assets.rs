//! Image assets
//!
//! Images load in the background. An entity whose image has not
//! finished decoding is skipped for that frame only; the simulation
//! never waits on assets.

use wasm_bindgen::JsValue;
use web_sys::HtmlImageElement;

/// Pixel size of one cell in the cart sprite strip
pub const CART_CELL: f64 = 48.0;

/// Image handles for everything the renderer blits
pub struct GameAssets {
    /// Full-world background with rails and buildings baked in
    pub map: HtmlImageElement,
    /// Horizontal strip of cart sprite variants, facing up
    pub carts: HtmlImageElement,
    /// Junction arrow, drawn pointing up
    pub arrow: HtmlImageElement,
}

impl GameAssets {
    pub fn load() -> Result<Self, JsValue> {
        Ok(Self {
            map: load_image("assets/map.png")?,
            carts: load_image("assets/carts.png")?,
            arrow: load_image("assets/arrow.png")?,
        })
    }
}

/// True once the browser has decoded the image
pub fn ready(img: &HtmlImageElement) -> bool {
    img.complete() && img.natural_width() > 0
}

fn load_image(src: &str) -> Result<HtmlImageElement, JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_src(src);
    Ok(img)
}
