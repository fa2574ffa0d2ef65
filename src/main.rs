//! Echo Pairs entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use glam::Vec2;

    use echo_pairs::audio::{AudioBank, SoundCue};
    use echo_pairs::consts::*;
    use echo_pairs::game::{
        GameEvent, GameState, Rating, SessionStats, TickInput, hit_test, tick,
    };
    use echo_pairs::render::{BoardRenderState, SceneKind};
    use echo_pairs::view_from_screen;

    /// Which screen the shell is showing
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Screen {
        Menu,
        Playing,
        Win(SessionStats),
    }

    /// Game instance holding all state
    struct App {
        screen: Screen,
        state: GameState,
        render_state: Option<BoardRenderState>,
        audio: AudioBank,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        client_size: (f32, f32),
    }

    impl App {
        fn new(seed: u64) -> Self {
            Self {
                screen: Screen::Menu,
                state: GameState::new(seed),
                render_state: None,
                audio: AudioBank::new(),
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                client_size: (0.0, 0.0),
            }
        }

        fn set_client_size(&mut self, w: f32, h: f32) {
            self.client_size = (w, h);
        }

        /// Convert a canvas-relative pointer position to a card slot
        fn slot_at(&self, x: f32, y: f32) -> Option<usize> {
            let surface = Vec2::new(self.client_size.0, self.client_size.1);
            hit_test(view_from_screen(Vec2::new(x, y), surface))
        }

        /// Start a fresh play-through, discarding any pending resolutions
        fn start_game(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.state = GameState::new(seed);
            self.input = TickInput::default();
            self.accumulator = 0.0;
            self.screen = Screen::Playing;
            self.audio.resume();
            log::info!("Game started with seed: {}", seed);
        }

        fn to_menu(&mut self) {
            self.screen = Screen::Menu;
        }

        /// Run fixed-timestep simulation
        fn update(&mut self, dt: f32) {
            if !matches!(self.screen, Screen::Playing) {
                return;
            }

            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.press = None;
            }

            self.drain_events();
        }

        /// Route simulation events to audio and screen transitions
        fn drain_events(&mut self) {
            for event in self.state.take_events() {
                match event {
                    GameEvent::Flip => self.audio.play(SoundCue::Flip),
                    GameEvent::Match => self.audio.play(SoundCue::Match),
                    GameEvent::Mismatch => {}
                    GameEvent::AllMatched(stats) => {
                        self.audio.play(SoundCue::Win);
                        log::info!(
                            "All pairs found: {} moves in {}s",
                            stats.moves,
                            stats.seconds
                        );
                    }
                    GameEvent::Won(stats) => {
                        self.screen = Screen::Win(stats);
                        show_win_screen(&stats);
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let scene = match self.screen {
                Screen::Menu => SceneKind::Menu,
                Screen::Playing => SceneKind::Board,
                Screen::Win(_) => SceneKind::Victory,
            };
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, scene, time) {
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
        fn update_hud(&self) {
            if !matches!(self.screen, Screen::Playing) {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-moves .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.moves.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-time .hud-value").ok().flatten() {
                el.set_text_content(Some(&format_clock(self.state.elapsed_seconds())));
            }
        }
    }

    /// Format whole seconds as M:SS
    fn format_clock(seconds: u32) -> String {
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }

    /// Toggle an element's visibility by class (markup keeps ids stable)
    fn set_visible(id: &str, visible: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Populate and show the win overlay
    fn show_win_screen(stats: &SessionStats) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(el) = document.get_element_by_id("win-moves") {
            el.set_text_content(Some(&stats.moves.to_string()));
        }
        if let Some(el) = document.get_element_by_id("win-time") {
            el.set_text_content(Some(&format_clock(stats.seconds)));
        }

        let rating = Rating::grade(stats.moves, stats.seconds);
        if let Some(el) = document.get_element_by_id("win-rating") {
            el.set_text_content(Some(rating.verdict));
        }
        if let Some(el) = document.get_element_by_id("win-stars") {
            el.set_text_content(Some(&rating.star_row()));
        }

        set_visible("hud", false);
        set_visible("win-screen", true);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Echo Pairs starting...");

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

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize app on the menu screen
        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed)));
        app.borrow_mut()
            .set_client_size(client_w as f32, client_h as f32);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = BoardRenderState::new(surface, &adapter, width, height).await;
        app.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, app.clone());
        setup_buttons(app.clone());

        // Menu overlay is visible in the markup by default
        request_animation_frame(app);

        log::info!("Echo Pairs running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse move - hover feedback
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                a.set_client_size(w, h);
                let slot = a.slot_at(event.offset_x() as f32, event.offset_y() as f32);
                a.input.hover = slot;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - flip
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                a.set_client_size(w, h);
                let slot = a.slot_at(event.offset_x() as f32, event.offset_y() as f32);
                a.input.press = slot;
                // Audio contexts unlock on the first user gesture
                a.audio.resume();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start - flip
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut a = app.borrow_mut();
                    let w = canvas_clone.client_width() as f32;
                    let h = canvas_clone.client_height() as f32;
                    a.set_client_size(w, h);
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    let slot = a.slot_at(x, y);
                    a.input.press = slot;
                    a.audio.resume();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Play (menu screen)
        if let Some(btn) = document.get_element_by_id("play-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().start_game();
                set_visible("menu-screen", false);
                set_visible("win-screen", false);
                set_visible("hud", true);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Play again (win screen)
        if let Some(btn) = document.get_element_by_id("play-again-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().start_game();
                set_visible("win-screen", false);
                set_visible("hud", true);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Back to menu (win screen)
        if let Some(btn) = document.get_element_by_id("win-menu-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().to_menu();
                set_visible("win-screen", false);
                set_visible("menu-screen", true);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Abandon run (HUD)
        if let Some(btn) = document.get_element_by_id("quit-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().to_menu();
                set_visible("hud", false);
                set_visible("menu-screen", true);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render(time);
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Echo Pairs (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    println!("\nRunning headless playthrough...");
    solve_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn solve_demo() {
    use echo_pairs::consts::{PAIR_COUNT, SIM_DT};
    use echo_pairs::game::{GameEvent, GameState, Rating, RoundPhase, TickInput, tick};

    let mut state = GameState::new(42);

    // Group slots by icon, then play them back two at a time
    let mut order: Vec<usize> = Vec::new();
    for pair in 0..PAIR_COUNT as u8 {
        for (slot, card) in state.cards.iter().enumerate() {
            if card.pair == pair {
                order.push(slot);
            }
        }
    }

    let mut presses = order.into_iter();
    let mut won = None;
    for _ in 0..20_000 {
        let mut input = TickInput::default();
        if !state.gate_closed() {
            input.press = presses.next();
        }
        tick(&mut state, &input, SIM_DT);
        for event in state.take_events() {
            if let GameEvent::Won(stats) = event {
                won = Some(stats);
            }
        }
        if state.round == RoundPhase::Won {
            break;
        }
    }

    let stats = won.expect("playthrough should reach the win transition");
    let rating = Rating::grade(stats.moves, stats.seconds);
    println!(
        "✓ Solved in {} moves and {}s - {} {}",
        stats.moves,
        stats.seconds,
        rating.verdict,
        rating.star_row()
    );
    assert_eq!(stats.moves, PAIR_COUNT as u32);
}
