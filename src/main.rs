//! Rail Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use rail_rush::assets::GameAssets;
    use rail_rush::audio::AudioManager;
    use rail_rush::consts::*;
    use rail_rush::render::{self, Renderer};
    use rail_rush::settings::Settings;
    use rail_rush::sim::{GameState, Level, tick};
    use rail_rush::viewport::Viewport;

    /// Game instance holding all state
    struct Game {
        level: Level,
        state: GameState,
        renderer: Renderer,
        assets: GameAssets,
        audio: AudioManager,
        settings: Settings,
        viewport: Viewport,
        accumulator: f32,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(level: Level, seed: u64, renderer: Renderer, assets: GameAssets) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_volume(settings.effective_volume());
            Self {
                state: GameState::new(&level, seed),
                level,
                renderer,
                assets,
                audio,
                settings,
                viewport: Viewport::new(0.0, 0.0),
                accumulator: 0.0,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks for this frame's wall-clock delta
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let events = tick(&mut self.state, &self.level);
                for event in &events {
                    self.audio.play(event);
                }
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame and sync the DOM HUD
        fn render(&self) {
            self.renderer
                .draw(&self.state, &self.level, &self.assets, &self.viewport);
            render::update_hud(&self.state, &self.level, self.fps, self.settings.show_fps);
        }

        /// Forward a pointer event (canvas-relative pixels) to the
        /// simulation as a world-space tap
        fn tap_screen(&mut self, x: f32, y: f32) {
            // Browsers require a gesture before audio can start
            self.audio.resume();
            let world = self.viewport.screen_to_world(x, y);
            let advanced = self.state.tap(world);
            if advanced > 0 {
                log::debug!("tap at {world:?} advanced {advanced} junction(s)");
            }
        }

        /// Reset the session for a fresh run
        fn restart(&mut self, seed: u64) {
            self.state.restart(&self.level, seed);
            self.accumulator = 0.0;
            log::info!("Game restarted with seed: {seed}");
        }

        fn apply_volume(&mut self) {
            self.audio.set_volume(self.settings.effective_volume());
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Rail Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // `?level=crossroads` selects the early map
        let level = match window.location().search() {
            Ok(search) if search.contains("crossroads") => Level::crossroads(),
            _ => Level::downtown(),
        };
        level.validate().expect("built-in level is valid");
        log::info!(
            "Level {:?}: {} junctions, {} buildings",
            level.name,
            level.junctions.len(),
            level.buildings.len()
        );

        let renderer = Renderer::new(&canvas).expect("2d context");
        let assets = GameAssets::load().expect("image elements");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(level, seed, renderer, assets)));
        log::info!("Game initialized with seed: {seed}");

        fit_canvas(&canvas, &game);
        setup_input_handlers(&canvas, game.clone());
        setup_resize_handler(canvas.clone(), game.clone());
        setup_restart_button(game.clone());
        setup_blur_mute(game.clone());

        // Show HUD
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Rail Rush running!");
    }

    /// Size the canvas to its CSS box and refresh the letterbox mapping
    fn fit_canvas(canvas: &HtmlCanvasElement, game: &Rc<RefCell<Game>>) {
        let w = canvas.client_width();
        let h = canvas.client_height();
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        game.borrow_mut().viewport = Viewport::new(w as f32, h as f32);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .tap_screen(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    game.borrow_mut().tap_screen(x, y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "r" | "R" => {
                        let seed = js_sys::Date::now() as u64;
                        g.restart(seed);
                    }
                    "m" | "M" => {
                        g.settings.muted = !g.settings.muted;
                        g.settings.save();
                        g.apply_volume();
                        log::info!("Muted: {}", g.settings.muted);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            fit_canvas(&canvas, &game);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Silence audio while the window is unfocused (if enabled)
    fn setup_blur_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_volume(0.0);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().apply_volume();
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rail_rush::sim::{GameEvent, GameMode, GameState, Level, tick};

    env_logger::init();
    log::info!("Rail Rush (native) starting...");

    // Headless demo: a minute of the downtown level with every junction
    // left on its default direction.
    let level = Level::downtown();
    level.validate().expect("built-in level is valid");
    let mut state = GameState::new(&level, 0xC0FFEE);

    let mut delivered = 0u32;
    let mut missed = 0u32;
    for _ in 0..3600 {
        for event in tick(&mut state, &level) {
            match event {
                GameEvent::Delivered { .. } => delivered += 1,
                GameEvent::Mismatch { .. } | GameEvent::CartLost => missed += 1,
                _ => {}
            }
        }
        if state.mode != GameMode::Playing {
            break;
        }
    }

    println!(
        "demo over: {delivered} delivered, {missed} missed, score {}, lives {}, mode {:?}",
        state.score, state.lives, state.mode
    );
    println!("Run with `trunk serve` for the playable web version");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
