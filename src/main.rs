//! Hitplane entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Document, HtmlAudioElement, HtmlCanvasElement, HtmlElement, HtmlInputElement,
        HtmlTextAreaElement, MouseEvent, Request, RequestInit, Response,
    };

    use hitplane::audio::HtmlAudioTrack;
    use hitplane::chart::parse_chart;
    use hitplane::platform::{AudioSources, chart_fetch_url};
    use hitplane::renderer::{NoteField, SdfRenderState};
    use hitplane::{Game, PlayError, Settings};

    // JS binding for pointer lock
    #[wasm_bindgen(inline_js = "
        export function request_pointer_lock() {
            const canvas = document.getElementById('canvas');
            if (canvas) {
                const result = canvas.requestPointerLock();
                if (result && result.catch) {
                    result.catch(e => console.error('Pointer lock failed:', e));
                }
            }
        }
    ")]
    extern "C" {
        fn request_pointer_lock();
    }

    /// Notifications stay on screen this long
    const NOTIFY_MS: i32 = 4000;

    /// Browser-side state around the engine
    struct App {
        game: Game<HtmlAudioTrack, NoteField>,
        render_state: Option<SdfRenderState>,
        pointer_locked: bool,
    }

    impl App {
        /// Draw the current frame
        fn render(&mut self) {
            let App {
                game, render_state, ..
            } = self;
            if let Some(render_state) = render_state {
                if game.hit_this_frame() {
                    render_state.flash();
                }
                let spawn_distance = game.tuning().spawn_distance;
                match render_state.render(game.sink(), game.cursor().position(), spawn_distance) {
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
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_display(el: &HtmlElement, display: &str) {
        let _ = el.style().set_property("display", display);
    }

    fn hide_menus(document: &Document) {
        let Ok(cards) = document.query_selector_all(".menu-card") else {
            return;
        };
        for i in 0..cards.length() {
            if let Some(card) = cards.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
                set_display(&card, "none");
            }
        }
    }

    /// Show one menu card, hiding the rest
    fn show_menu(id: &str) {
        let Some(document) = document() else {
            return;
        };
        hide_menus(&document);
        if let Some(target) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            set_display(&target, "block");
        }
    }

    /// Push a message onto the notification stack
    fn notify(text: &str) {
        log::info!("{}", text);
        let Some(document) = document() else {
            return;
        };
        let Some(stack) = document.get_element_by_id("msg-stack") else {
            return;
        };
        let Ok(msg) = document.create_element("div") else {
            return;
        };
        msg.set_class_name("msg");
        msg.set_text_content(Some(text));
        let _ = stack.prepend_with_node_1(&msg);

        let expire = Closure::once_into_js(move || msg.remove());
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                expire.unchecked_ref(),
                NOTIFY_MS,
            );
        }
    }

    /// Value of a text input or textarea
    fn input_value(id: &str) -> String {
        let Some(el) = document().and_then(|d| d.get_element_by_id(id)) else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn set_input_value(id: &str, value: &str) {
        if let Some(input) = document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(value);
        }
    }

    async fn fetch(url: &str, method: &str) -> Result<Response, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_sys::Error::new("no window"))?;
        let opts = RequestInit::new();
        opts.set_method(method);
        let request = Request::new_with_str_and_init(url, &opts)?;
        let response = JsFuture::from(window.fetch_with_request(&request)).await?;
        response.dyn_into()
    }

    async fn fetch_text(url: &str) -> Result<String, JsValue> {
        let response = fetch(url, "GET").await?;
        if !response.ok() {
            return Err(js_sys::Error::new(&format!("HTTP {}", response.status())).into());
        }
        let text = JsFuture::from(response.text()?).await?;
        text.as_string()
            .ok_or_else(|| js_sys::Error::new("response body is not text").into())
    }

    async fn import_chart(app: Rc<RefCell<App>>) {
        let raw = input_value("map-input");
        let text = match chart_fetch_url(&raw) {
            Some(url) => match fetch_text(&url).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Chart fetch from {} failed: {:?}", url, e);
                    notify("GitHub Fetch Failed");
                    return;
                }
            },
            None => raw,
        };

        match parse_chart(&text) {
            Ok(chart) => {
                let count = chart.len();
                set_text("map-name-display", &format!("ID: {}", chart.id));
                app.borrow_mut().game.load_chart(chart);
                show_menu("start-menu");
                notify(&format!("Imported {count} notes."));
            }
            Err(e) => notify(&e.to_string()),
        }
    }

    /// Resolve the music, then start the session once it can play through
    async fn start_session(app: Rc<RefCell<App>>) {
        let Some(id) = app.borrow().game.chart().map(|c| c.id.clone()) else {
            notify(&PlayError::NoChart.to_string());
            return;
        };

        let sources = AudioSources::for_chart(&id);
        let src = match fetch(&sources.local, "HEAD").await {
            Ok(response) if response.ok() => sources.local,
            _ => {
                log::info!("No bundled audio for {}, using remote asset", id);
                sources.remote
            }
        };

        let element: HtmlAudioElement = app.borrow().game.audio().element().clone();

        let on_ready = {
            let app = app.clone();
            let element = element.clone();
            Closure::<dyn FnMut()>::new(move || {
                element.set_oncanplaythrough(None);
                element.set_onerror(None);
                if let Err(e) = app.borrow_mut().game.play() {
                    notify(&e.to_string());
                    return;
                }
                if let Some(document) = document() {
                    hide_menus(&document);
                }
                request_pointer_lock();
            })
        };
        let on_error = {
            let element = element.clone();
            Closure::<dyn FnMut()>::new(move || {
                element.set_oncanplaythrough(None);
                element.set_onerror(None);
                notify("Audio Load Failed");
            })
        };
        element.set_oncanplaythrough(Some(on_ready.as_ref().unchecked_ref()));
        element.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_ready.forget();
        on_error.forget();

        app.borrow().game.audio().load(&src);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Hitplane starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let audio: HtmlAudioElement = document
            .get_element_by_id("audio-track")
            .expect("no audio-track element")
            .dyn_into()
            .expect("not an audio element");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        set_input_value("set-speed", &settings.note_speed.to_string());
        set_input_value("set-sens", &settings.sensitivity.to_string());

        let app = Rc::new(RefCell::new(App {
            game: Game::new(HtmlAudioTrack::new(audio), NoteField::new(), settings),
            render_state: None,
            pointer_locked: false,
        }));

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

        match SdfRenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => {
                app.borrow_mut().render_state = Some(render_state);
            }
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                notify("WebGPU unavailable");
            }
        }

        setup_input_handlers(app.clone());
        setup_menu_buttons(app.clone());
        show_menu("start-menu");

        // Start game loop
        request_animation_frame(app);

        log::info!("Hitplane running!");
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Pointer lock change handler
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let locked = document().and_then(|d| d.pointer_lock_element()).is_some();
                if locked {
                    log::info!("Pointer lock acquired");
                } else {
                    log::info!("Pointer lock released");
                }
                app.borrow_mut().pointer_locked = locked;
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Mouse move steers the cursor only while locked
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                if a.pointer_locked {
                    a.game
                        .cursor_mut()
                        .apply_movement(event.movement_x() as f32, event.movement_y() as f32);
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Bind a click handler that swallows the default action
    fn bind(id: &str, handler: impl FnMut() + 'static) {
        let Some(el) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let mut handler = handler;
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            event.prevent_default();
            event.stop_propagation();
            handler();
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_menu_buttons(app: Rc<RefCell<App>>) {
        bind("nav-import", || show_menu("import-menu"));
        bind("nav-settings", || show_menu("settings-menu"));
        {
            let app = app.clone();
            bind("confirm-import-button", move || {
                wasm_bindgen_futures::spawn_local(import_chart(app.clone()));
            });
        }
        {
            let app = app.clone();
            bind("start-button", move || {
                wasm_bindgen_futures::spawn_local(start_session(app.clone()));
            });
        }
        bind("save-settings", move || {
            let mut a = app.borrow_mut();
            let mut settings = a.game.settings().clone();
            settings.apply_form(&input_value("set-speed"), &input_value("set-sens"));
            settings.save();
            a.game.set_settings(settings);
            show_menu("start-menu");
            notify("Settings Saved.");
        });
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.game.frame(time);
            a.render();
            set_text("score-board", &a.game.hud_text());
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
    log::info!("Hitplane (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(7);
    autoplay(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a practice chart headlessly, steering the cursor onto each note
#[cfg(not(target_arch = "wasm32"))]
fn autoplay(seed: u64) {
    use hitplane::audio::{AudioTrack, SimulatedTrack};
    use hitplane::consts::MOUSE_SCALE;
    use hitplane::renderer::NoteField;
    use hitplane::{Chart, Game, Settings};

    const FRAME_MS: f64 = 10.0;

    let chart = Chart::practice(seed, 32, 0.4);
    let deadline_ms = (chart.duration() + 10.0) * 1000.0;
    let mut game = Game::new(SimulatedTrack::new(), NoteField::new(), Settings::default());
    game.load_chart(chart);
    if let Err(e) = game.play() {
        log::error!("{}", e);
        return;
    }

    let mut now = 0.0;
    game.frame(now);
    while now < deadline_ms && !game.session().is_some_and(|s| s.is_finished()) {
        let target = game
            .session()
            .and_then(|s| s.notes.iter().min_by(|a, b| a.time.total_cmp(&b.time)))
            .map(|n| n.pos);
        if let Some(target) = target {
            let delta = game.cursor().position() - target;
            let scale = game.settings().sensitivity * MOUSE_SCALE;
            game.cursor_mut()
                .apply_movement(delta.x / scale, delta.y / scale);
        }

        now += FRAME_MS;
        game.audio_mut().advance(FRAME_MS / 1000.0);
        game.frame(now);
    }
    game.audio_mut().stop();

    if let Some(session) = game.session() {
        let summary = session.summary();
        log::info!(
            "Chart {} finished: score {}, {}/{} hits, {} misses, max combo {}",
            session.chart.id,
            summary.score,
            summary.hits,
            summary.total,
            summary.misses,
            summary.max_combo
        );
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    }
}
