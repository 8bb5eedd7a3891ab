//! Dot Hunt entry point
//!
//! The browser build draws the session on a 2D canvas and feeds it pointer
//! events. The native build plays a short scripted run headlessly and prints
//! the resulting leaderboard.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent};

    use dot_hunt::Settings;
    use dot_hunt::theme::ThemePreset;
    use dot_hunt::consts::*;
    use dot_hunt::leaderboard::{LEADERBOARD_ROWS, Leaderboard, LocalStorageStore, format_date, submit_score};
    use dot_hunt::sim::{
        GameEvent, GamePhase, PointerEvent, Session, Snapshot, Viewport, dismiss_intro,
        finish_run, pointer_moved, resize, restart, start_level, tick,
    };

    /// Seconds the "level complete" banner stays up before the next level
    const NEXT_LEVEL_DELAY: f32 = 1.5;

    /// Game instance holding all state
    struct Game {
        session: Session,
        store: LocalStorageStore,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        dpr: f64,
        last_time: f64,
        /// Time spent on the Won banner
        won_timer: f32,
    }

    impl Game {
        fn update(&mut self, dt: f32) {
            tick(&mut self.session, dt);

            if matches!(self.session.phase, GamePhase::Won { .. }) {
                self.won_timer += dt;
                if self.won_timer >= NEXT_LEVEL_DELAY {
                    self.next_level();
                }
            }

            for event in self.session.drain_events() {
                match event {
                    GameEvent::RunLost { .. } | GameEvent::RunFinished { .. } => {
                        self.show_leaderboard()
                    }
                    GameEvent::LevelStarted { .. } => self.won_timer = 0.0,
                    _ => log::debug!("{:?}", event),
                }
            }
        }

        fn next_level(&mut self) {
            self.won_timer = 0.0;
            if let Err(e) = start_level(&mut self.session) {
                log::error!("Could not start level {}: {}", self.session.level, e);
            }
        }

        /// Stop on the level-complete screen and save
        fn finish(&mut self) {
            finish_run(&mut self.session);
            self.submit();
        }

        /// Move to the next theme preset and remember it
        fn cycle_theme(&mut self) {
            let current = self.session.settings.theme;
            let i = ThemePreset::ALL.iter().position(|&p| p == current).unwrap_or(0);
            let next = ThemePreset::ALL[(i + 1) % ThemePreset::ALL.len()];
            self.session.set_theme(next);
            self.session.settings.save();
        }

        fn restart(&mut self) {
            if let Err(e) = restart(&mut self.session, None) {
                log::error!("Could not restart: {}", e);
            }
        }

        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
            let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
            self.dpr = window.device_pixel_ratio();
            self.canvas.set_width((w * self.dpr) as u32);
            self.canvas.set_height((h * self.dpr) as u32);

            if let Err(e) = resize(&mut self.session, Viewport::new(w as f32, h as f32)) {
                log::error!("Viewport {}x{} too small for level {}: {}", w, h, self.session.level, e);
            }
        }

        /// Prompt for a nickname and store the finished run
        fn submit(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let Ok(Some(nickname)) = window.prompt_with_message_and_default("Nickname", "") else {
                return;
            };
            let result = submit_score(
                &mut self.session,
                &mut self.store,
                &nickname,
                js_sys::Date::now(),
            );
            match result {
                Ok(record) => {
                    log::info!("Saved {} targets for {}", record.total_targets, record.nickname);
                    self.show_leaderboard();
                }
                Err(e) => {
                    let _ = window.alert_with_message(&e.to_string());
                }
            }
        }

        fn show_leaderboard(&self) {
            match Leaderboard::load(&self.store) {
                Ok(board) if board.is_empty() => log::info!("No scores yet. Be the first!"),
                Ok(board) => {
                    for (i, e) in board.top(LEADERBOARD_ROWS).iter().enumerate() {
                        log::info!(
                            "{:>2}. {:<20} {:>4} targets {:>3} levels  {}",
                            i + 1,
                            e.nickname,
                            e.total_targets,
                            e.levels_completed,
                            format_date(e.created_at)
                        );
                    }
                }
                Err(e) => log::warn!("Could not load leaderboard: {}", e),
            }
        }

        fn render(&self) {
            let snap = self.session.snapshot();
            let ctx = &self.ctx;
            let width = self.canvas.width() as f64;
            let height = self.canvas.height() as f64;

            if let Some(body) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.body())
            {
                let _ = body
                    .style()
                    .set_property("background", &snap.feedback.to_css_gradient());
            }

            let _ = ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
            ctx.clear_rect(0.0, 0.0, width, height);

            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            for dot in &snap.dots {
                ctx.set_global_alpha(dot.opacity as f64);
                ctx.set_fill_style_str(&dot.color.to_css());
                let (x, y) = (dot.pos.x as f64, dot.pos.y as f64);
                match dot.glyph {
                    Some(glyph) => {
                        ctx.set_font(&format!("bold {}px monospace", snap.glyph_size * dot.scale));
                        let _ = ctx.fill_text(glyph.encode_utf8(&mut [0; 4]), x, y);
                    }
                    None => fill_circle(ctx, x, y, 2.0 * dot.scale as f64),
                }
            }
            ctx.set_global_alpha(1.0);
            ctx.set_text_align("start");
            ctx.set_text_baseline("alphabetic");

            for target in snap.targets.iter().filter(|t| t.revealed) {
                ctx.set_fill_style_str("#ffd54a");
                fill_circle(ctx, target.pos.x as f64, target.pos.y as f64, target.size as f64 / 2.0);
            }

            if snap.phase.is_between_levels() {
                // Show everything once the level is over
                for hazard in &snap.hazards {
                    ctx.set_fill_style_str("#d63b3b");
                    fill_circle(ctx, hazard.pos.x as f64, hazard.pos.y as f64, hazard.size as f64 / 2.0);
                }
            }

            if matches!(snap.phase, GamePhase::Active) {
                draw_indicators(ctx, &snap);
            }

            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("16px sans-serif");
            let _ = ctx.fill_text(&snap.status_line(), 16.0, 28.0);
            let _ = ctx.fill_text(snap.feedback.hint, 16.0, 50.0);
            if snap.phase == GamePhase::Lost {
                let text = if snap.score_submitted {
                    "Press R to play again"
                } else {
                    "Press S to save your score, R to play again"
                };
                let _ = ctx.fill_text(text, 16.0, 72.0);
            } else if matches!(snap.phase, GamePhase::Won { .. }) {
                let _ = ctx.fill_text("Press F to finish and save your score", 16.0, 72.0);
            }
        }
    }

    fn fill_circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) {
        ctx.begin_path();
        if ctx.arc(x, y, r.max(0.0), 0.0, TAU).is_ok() {
            ctx.fill();
        }
    }

    /// Closeness bars next to the cursor
    fn draw_indicators(ctx: &CanvasRenderingContext2d, snap: &Snapshot) {
        let x = snap.cursor.x as f64 + 20.0;
        let y = snap.cursor.y as f64 - 20.0;
        let bar = |offset: f64, percent: f32, color: &str| {
            ctx.set_fill_style_str("rgba(0, 0, 0, 0.3)");
            ctx.fill_rect(x, y + offset, 50.0, 5.0);
            ctx.set_fill_style_str(color);
            ctx.fill_rect(x, y + offset, 50.0 * percent as f64 / 100.0, 5.0);
        };
        bar(0.0, snap.feedback.target_percent, "#4caf50");
        bar(8.0, snap.feedback.hazard_percent, "#e53935");
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger already set: {}", e).into());
        }

        log::info!("Dot Hunt starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let viewport = Viewport::new(
            canvas.client_width() as f32,
            canvas.client_height() as f32,
        );
        let game = Rc::new(RefCell::new(Game {
            session: Session::new(settings, viewport, seed),
            store: LocalStorageStore,
            canvas: canvas.clone(),
            ctx,
            dpr: window.device_pixel_ratio(),
            last_time: 0.0,
            won_timer: 0.0,
        }));
        log::info!("Session seeded with {}", game.borrow().session.seed());

        {
            let mut g = game.borrow_mut();
            g.resize();
            g.next_level();
        }

        setup_input_handlers(game.clone())?;
        request_animation_frame(game);

        log::info!("Dot Hunt running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Mouse move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let e = PointerEvent::mouse(event.client_x() as f32, event.client_y() as f32);
                pointer_moved(&mut g.session, e);
            });
            window.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start and move share a handler
        for kind in ["touchstart", "touchmove"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let e = PointerEvent::touch(touch.client_x() as f32, touch.client_y() as f32);
                    pointer_moved(&mut g.session, e);
                }
            });
            window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match (event.key().as_str(), g.session.phase) {
                    (_, GamePhase::Ready) if g.session.intro_pending => {
                        dismiss_intro(&mut g.session)
                    }
                    (" " | "Enter", GamePhase::Won { .. }) => g.next_level(),
                    ("f" | "F", GamePhase::Won { .. }) => g.finish(),
                    ("t" | "T", _) => g.cycle_theme(),
                    ("r" | "R", GamePhase::Lost) => g.restart(),
                    ("s" | "S", GamePhase::Lost) => g.submit(),
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FRAME_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Dot Hunt (native) starting...");
    log::info!("Native mode is headless - build for wasm32 to play in the browser");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    headless::play(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run: sweep every target for a few levels, then walk into a hazard
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use dot_hunt::consts::FRAME_DT;
    use dot_hunt::leaderboard::{Leaderboard, format_date, submit_score};
    use dot_hunt::sim::{GamePhase, PointerEvent, Session, Viewport, pointer_moved, start_level, tick};
    use dot_hunt::{MemoryStore, ScoreStore, Settings};

    /// Levels cleared before the script goes looking for trouble
    const LEVELS_TO_CLEAR: u32 = 4;

    pub fn play(seed: u64) {
        let mut session = Session::new(Settings::load(), Viewport::new(1280.0, 800.0), seed);
        let mut store = MemoryStore::new();
        log::info!("Headless run with seed {}", session.seed());

        if let Err(e) = start_level(&mut session) {
            log::error!("Could not start: {}", e);
            return;
        }

        while session.levels_completed < LEVELS_TO_CLEAR {
            let targets: Vec<_> = session.targets.iter().map(|t| t.pos).collect();
            for pos in targets {
                for _ in 0..10 {
                    tick(&mut session, FRAME_DT);
                }
                pointer_moved(&mut session, PointerEvent::mouse(pos.x, pos.y));
                if !session.is_running() {
                    break;
                }
            }

            match session.phase {
                GamePhase::Won { .. } => {
                    if let Err(e) = start_level(&mut session) {
                        log::error!("Could not start level {}: {}", session.level, e);
                        return;
                    }
                }
                GamePhase::Lost => break,
                _ => {}
            }
        }

        if let Some(hazard) = session.hazards.first().map(|h| h.pos) {
            pointer_moved(&mut session, PointerEvent::mouse(hazard.x, hazard.y));
        }

        match session.snapshot().to_json() {
            Ok(json) => log::debug!("Final frame: {}", json),
            Err(e) => log::warn!("Could not serialize snapshot: {}", e),
        }
        println!("{}", session.snapshot().status_line());

        if session.phase == GamePhase::Lost {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as f64)
                .unwrap_or(0.0);
            if let Err(e) = submit_score(&mut session, &mut store, "headless", now) {
                log::warn!("{}", e);
            }
        }

        match store.entries().map(Leaderboard::sorted) {
            Ok(board) => {
                for e in &board.entries {
                    println!(
                        "{:<20} {:>4} targets {:>3} levels  {}",
                        e.nickname,
                        e.total_targets,
                        e.levels_completed,
                        format_date(e.created_at)
                    );
                }
            }
            Err(e) => log::warn!("{}", e),
        }
    }
}
