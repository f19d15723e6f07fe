//! Rising Targets entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent};

    use rising_targets::audio::{AudioManager, SoundEffect};
    use rising_targets::renderer::{Flash, RenderState, SceneOptions, build_scene};
    use rising_targets::sim::{FrameStats, GameEvent, GameState, level_speed, tick};
    use rising_targets::{Settings, Tuning};

    /// How long the level toast stays up
    const TOAST_MS: f64 = 1400.0;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        audio: AudioManager,
        settings: Settings,
        paused: bool,
        flash: Flash,
        toast_until: f64,
        /// Last stats written to the DOM
        shown_stats: Option<FrameStats>,
    }

    impl Game {
        fn new(tuning: Tuning, width: u32, height: u32, seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_muted(settings.muted);
            audio.set_master_volume(settings.master_volume);
            Self {
                state: GameState::new(tuning, width as f32, height as f32, seed),
                render_state: None,
                audio,
                settings,
                paused: false,
                flash: Flash::default(),
                toast_until: 0.0,
                shown_stats: None,
            }
        }

        /// Run one frame of simulation unless paused
        fn update(&mut self, time: f64) {
            if !self.paused {
                tick(&mut self.state, time);
            }
            for event in self.state.drain_events() {
                self.handle_event(event, time);
            }
        }

        fn handle_event(&mut self, event: GameEvent, time: f64) {
            match event {
                // Level 1 is only ever spawned by a reset
                GameEvent::BatchSpawned { level: 1, .. } => {
                    self.announce_level(1, time);
                    self.audio.play(SoundEffect::SessionStart);
                }
                GameEvent::LevelAdvanced { level, .. } => {
                    self.announce_level(level, time);
                    self.audio.play(SoundEffect::LevelUp);
                }
                GameEvent::Completed { killed, escaped } => {
                    log::info!("Final score: {} killed, {} escaped", killed, escaped);
                    self.audio.play(SoundEffect::SessionComplete);
                }
                GameEvent::BatchSpawned { .. } | GameEvent::CircleRemoved { .. } => {}
            }
        }

        fn announce_level(&mut self, level: u32, time: f64) {
            self.flash.trigger(time);
            self.toast_until = time + TOAST_MS;

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let speed = level_speed(&self.state.tuning, level);
            set_text(&document, "toastTitle", &format!("Level {} started", level));
            set_text(&document, "toastSpeed", &format!("Speed {:.2}", speed));
            if let Some(el) = document.get_element_by_id("levelToast") {
                let _ = el.set_attribute("class", "toast show");
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let flash_alpha = if self.settings.effective_level_flash() {
                self.flash.alpha(time)
            } else {
                0.0
            };
            let options = SceneOptions {
                paused: self.paused,
                flash_alpha,
            };
            let vertices = build_scene(&self.state, &options);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, time: f64) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if self.toast_until > 0.0 && time >= self.toast_until {
                self.toast_until = 0.0;
                if let Some(el) = document.get_element_by_id("levelToast") {
                    let _ = el.set_attribute("class", "toast");
                }
            }

            let stats = self.state.stats();
            if self.shown_stats == Some(stats) {
                return;
            }
            self.shown_stats = Some(stats);

            let killed_pct = stats.killed_pct();
            set_text(&document, "levelNow", &stats.level.to_string());
            set_text(&document, "speedNow", &format!("{:.2}", stats.speed));
            set_text(&document, "killedCount", &stats.killed_total.to_string());
            set_text(&document, "killedPct", &format!("{:.1}%", killed_pct));
            set_text(&document, "escapedCount", &stats.escaped_total.to_string());
            set_text(&document, "escapedPct", &format!("{:.1}%", stats.escaped_pct()));
            set_text(
                &document,
                "progressText",
                &format!("{} / {}", stats.killed_total, stats.total_budget),
            );

            if let Some(bar) = document
                .get_element_by_id("progressBar")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let width = format!("{:.1}%", killed_pct.clamp(0.0, 100.0));
                let _ = bar.style().set_property("width", &width);
            }
        }

        fn toggle_pause(&mut self) {
            self.paused = !self.paused;
            log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
            update_pause_ui(self.paused);
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.audio.set_muted(muted);
            self.settings.save();
            update_mute_ui(muted);
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.state.resize(width as f32, height as f32);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }
    }

    fn set_text(document: &web_sys::Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn update_pause_ui(paused: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let (icon, text) = if paused {
            ("bi bi-play-fill me-1", "Resume")
        } else {
            ("bi bi-pause-fill me-1", "Pause")
        };
        if let Some(el) = document.get_element_by_id("pauseIcon") {
            let _ = el.set_attribute("class", icon);
        }
        set_text(&document, "pauseText", text);
    }

    fn update_mute_ui(muted: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let (icon, text) = if muted {
            ("bi bi-volume-mute-fill me-1", "Unmute")
        } else {
            ("bi bi-volume-up-fill me-1", "Mute")
        };
        if let Some(el) = document.get_element_by_id("muteIcon") {
            let _ = el.set_attribute("class", icon);
        }
        set_text(&document, "muteText", text);
    }

    /// Canvas backing size: half the window in each direction
    fn canvas_size(window: &web_sys::Window) -> (u32, u32) {
        let w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        (((w / 2.0) as u32).max(1), ((h / 2.0) as u32).max(1))
    }

    /// Pointer position in canvas pixels, accounting for CSS scaling
    fn canvas_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        let scale_x = if rect.width() > 0.0 {
            canvas.width() as f64 / rect.width()
        } else {
            1.0
        };
        let scale_y = if rect.height() > 0.0 {
            canvas.height() as f64 / rect.height()
        } else {
            1.0
        };
        Vec2::new(
            ((event.client_x() as f64 - rect.left()) * scale_x) as f32,
            ((event.client_y() as f64 - rect.top()) * scale_y) as f32,
        )
    }

    /// Optional JSON tuning from the canvas `data-tuning` attribute
    fn load_tuning(canvas: &HtmlCanvasElement) -> Tuning {
        let Some(json) = canvas.get_attribute("data-tuning") else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from data-tuning");
                tuning
            }
            Err(e) => {
                log::warn!("Invalid data-tuning ({}), using defaults", e);
                Tuning::default()
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Rising Targets starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No <canvas id=\"canvas\"> found");
            return;
        };

        let (width, height) = canvas_size(&window);
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let tuning = load_tuning(&canvas);
        let game = Rc::new(RefCell::new(Game::new(tuning, width, height, seed)));

        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {}", e),
        }

        {
            let g = game.borrow();
            update_pause_ui(g.paused);
            update_mute_ui(g.settings.muted);
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_resize(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Rising Targets running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Hover
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = canvas_point(&canvas_clone, &event);
                game.borrow_mut().state.pointer_move(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.pointer_leave();
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click kills the hovered circle
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.paused {
                    return;
                }
                if g.state.pointer_click().is_some() {
                    g.audio.play(SoundEffect::Kill);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("pauseBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().toggle_pause();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("muteBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().toggle_mute();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restartBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.reset();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = canvas_size(&window);
            canvas.set_width(width);
            canvas.set_height(height);
            game.borrow_mut().resize(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render(time);
            g.update_hud(time);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use rising_targets::Tuning;
    use rising_targets::sim::{GamePhase, GameState, tick};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up on sessions that somehow never finish
    const MAX_FRAMES: u64 = 1_000_000;

    /// Outcome of an auto-played session
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Summary {
        pub frames: u64,
        pub level: u32,
        pub killed: u32,
        pub escaped: u32,
        pub completed: bool,
    }

    /// Play a session with a bot that clicks the newest circle with
    /// probability `accuracy` on every `reaction_frames`-th frame
    pub fn auto_play(tuning: Tuning, seed: u64, accuracy: f64, reaction_frames: u64) -> Summary {
        let mut state = GameState::new(tuning, 800.0, 600.0, seed);
        let mut bot = Pcg32::seed_from_u64(seed.wrapping_add(1));
        let reaction_frames = reaction_frames.max(1);
        let mut frame = 0u64;

        while state.phase != GamePhase::Completed && frame < MAX_FRAMES {
            if frame % reaction_frames == 0 && bot.random_bool(accuracy.clamp(0.0, 1.0)) {
                let target = state.circles.iter().rev().find(|c| !c.fading).map(|c| c.pos);
                if let Some(pos) = target {
                    state.pointer_move(pos);
                    state.pointer_click();
                }
            }
            tick(&mut state, frame as f64 * FRAME_MS);
            frame += 1;
        }

        Summary {
            frames: frame,
            level: state.progress.current_level,
            killed: state.progress.killed_total,
            escaped: state.progress.escaped_total,
            completed: state.phase == GamePhase::Completed,
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rising Targets (native) starting...");
    log::info!("Native mode runs a headless session - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let accuracy = args.next().and_then(|s| s.parse().ok()).unwrap_or(0.8);

    let tuning = match std::env::var("RISING_TARGETS_TUNING") {
        Ok(json) => rising_targets::Tuning::from_json(&json).unwrap_or_else(|e| {
            log::warn!("Invalid RISING_TARGETS_TUNING ({}), using defaults", e);
            rising_targets::Tuning::default()
        }),
        Err(_) => rising_targets::Tuning::default(),
    };

    let summary = headless::auto_play(tuning, seed, accuracy, 6);
    println!(
        "seed {}: level {} after {} frames, {} killed, {} escaped{}",
        seed,
        summary.level,
        summary.frames,
        summary.killed,
        summary.escaped,
        if summary.completed { "" } else { " (unfinished)" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
