// Re-export all public modules so they can be used from main.rs
pub mod assets;
pub mod config;
pub mod logging;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

pub use assets::{LoadEvent, Pipeline, WorldDescriptor};
pub use config::Config;
pub use controller::{CaptureHost, FrameContext, InputEvent, SessionMode};
pub use model::WorldAsset;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;
    use tracing::{info, warn};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::wasm_bindgen;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Document, Event, HtmlElement, KeyboardEvent, MouseEvent, Window};

    use crate::assets::{LoadEvent, Pipeline, WebFetcher, WorldDescriptor};
    use crate::config::Config;
    use crate::controller::{CaptureHost, FrameContext, InputEvent};
    use crate::model::WorldAsset;
    use crate::{logging, view};

    // Host DOM ids, matching the overlay markup the demo pages ship.
    const LOADING_SCREEN: &str = "loadingScreen";
    const PAUSE_MENU: &str = "pauseMenu";
    const DIALOGUE_BOX: &str = "dialogueBox";
    const RESUME_BUTTON: &str = "resumeBtn";
    const CLOSE_DIALOGUE_BUTTON: &str = "closeDialogueBtn";
    const VIEWPORT: &str = "viewport";

    /// Pointer-lock capture side effects. A denied request is a silent
    /// no-op; the session simply stays uncaptured until the next resume.
    struct WebCaptureHost {
        document: Document,
        target: HtmlElement,
    }

    impl CaptureHost for WebCaptureHost {
        fn request_capture(&mut self) {
            self.target.request_pointer_lock();
        }

        fn release_capture(&mut self) {
            self.document.exit_pointer_lock();
        }
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        logging::init();

        let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
        let document = window
            .document()
            .ok_or_else(|| js_error("no document on window"))?;
        run_app(window, document)
    }

    fn run_app(window: Window, document: Document) -> Result<(), JsValue> {
        let config = Config::default();
        let (width, height) = viewport_size(&window);

        let ctx = Rc::new(RefCell::new(FrameContext::new(
            config.clone(),
            width,
            height,
            Vec3::new(0.0, 0.0, 15.0),
        )));

        let target = element(&document, VIEWPORT)
            .or_else(|| document.body())
            .ok_or_else(|| js_error("no capture target element"))?;
        let host = Rc::new(RefCell::new(WebCaptureHost {
            document: document.clone(),
            target,
        }));

        let world: Rc<RefCell<Option<WorldAsset>>> = Rc::new(RefCell::new(None));

        setup_input_listeners(&window, &document, &ctx)?;
        setup_overlay_buttons(&document, &ctx, &host)?;
        spawn_world_load(document.clone(), world, config);
        start_frame_loop(window, document, ctx, host);
        Ok(())
    }

    /// Wire DOM input events into the aggregator. Events only mutate
    /// aggregator state here; all interpretation happens inside
    /// `FrameContext::tick`, keeping the aggregate-then-transition order.
    fn setup_input_listeners(
        window: &Window,
        document: &Document,
        ctx: &Rc<RefCell<FrameContext>>,
    ) -> Result<(), JsValue> {
        // Keyboard down
        {
            let ctx = ctx.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                let key = e.key();
                if matches!(
                    key.as_str(),
                    "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | "w" | "a" | "s"
                        | "d" | "W" | "A" | "S" | "D" | " " | "Shift"
                ) {
                    e.prevent_default();
                }
                ctx.borrow_mut().handle_event(&InputEvent::KeyDown(key));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let ctx = ctx.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                ctx.borrow_mut().handle_event(&InputEvent::KeyUp(e.key()));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Relative pointer motion; the aggregator ignores it uncaptured.
        {
            let ctx = ctx.clone();
            let mousemove = Closure::wrap(Box::new(move |e: MouseEvent| {
                ctx.borrow_mut().handle_event(&InputEvent::PointerMove {
                    dx: e.movement_x() as f32,
                    dy: e.movement_y() as f32,
                });
            }) as Box<dyn FnMut(MouseEvent)>);
            document
                .add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
            mousemove.forget();
        }

        // Pointer lock changes, including OS-level exits while playing.
        {
            let ctx = ctx.clone();
            let doc = document.clone();
            let plc = Closure::wrap(Box::new(move |_e: Event| {
                let captured = doc.pointer_lock_element().is_some();
                ctx.borrow_mut()
                    .handle_event(&InputEvent::CaptureChanged { captured });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback(
                "pointerlockchange",
                plc.as_ref().unchecked_ref(),
            )?;
            plc.forget();
        }

        // Focus loss and tab switches drop held keys.
        for event_name in ["blur", "visibilitychange"] {
            let ctx = ctx.clone();
            let listener = Closure::wrap(Box::new(move |_e: Event| {
                ctx.borrow_mut().handle_event(&InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            if event_name == "blur" {
                window.add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())?;
            } else {
                document
                    .add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())?;
            }
            listener.forget();
        }

        Ok(())
    }

    fn setup_overlay_buttons(
        document: &Document,
        ctx: &Rc<RefCell<FrameContext>>,
        host: &Rc<RefCell<WebCaptureHost>>,
    ) -> Result<(), JsValue> {
        if let Some(resume) = element(document, RESUME_BUTTON) {
            let ctx = ctx.clone();
            let host = host.clone();
            let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
                ctx.borrow_mut().session.resume(&mut *host.borrow_mut());
            }) as Box<dyn FnMut(MouseEvent)>);
            resume.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
            click.forget();
        } else {
            warn!("resume button #{} not found", RESUME_BUTTON);
        }

        if let Some(close) = element(document, CLOSE_DIALOGUE_BUTTON) {
            let ctx = ctx.clone();
            let host = host.clone();
            let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
                ctx.borrow_mut()
                    .session
                    .close_dialogue(&mut *host.borrow_mut());
            }) as Box<dyn FnMut(MouseEvent)>);
            close.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
            click.forget();
        }

        // Clicking the viewport while paused also resumes.
        if let Some(viewport) = element(document, VIEWPORT) {
            let ctx = ctx.clone();
            let host = host.clone();
            let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
                ctx.borrow_mut().session.resume(&mut *host.borrow_mut());
            }) as Box<dyn FnMut(MouseEvent)>);
            viewport.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
            click.forget();
        }

        Ok(())
    }

    fn spawn_world_load(
        document: Document,
        world: Rc<RefCell<Option<WorldAsset>>>,
        config: Config,
    ) {
        wasm_bindgen_futures::spawn_local(async move {
            let loading = element(&document, LOADING_SCREEN);
            let pipeline = Pipeline::new(WorldDescriptor::mortal_realm(), &config);

            pipeline
                .run(&WebFetcher, |event| match event {
                    LoadEvent::Progress(update) => {
                        if let Some(el) = &loading {
                            let text = match update.fraction {
                                Some(f) => format!("Loading world... {:.0}%", f * 100.0),
                                None => "Loading world...".to_string(),
                            };
                            el.set_inner_text(&text);
                        }
                    }
                    // Already logged by the pipeline; the fallback binding
                    // keeps the world renderable.
                    LoadEvent::PartialFailure { .. } => {}
                    LoadEvent::Complete(asset) => {
                        info!(surfaces = asset.surfaces.len(), "world ready");
                        if let Some(el) = &loading {
                            set_display(el, false, "flex");
                        }
                        *world.borrow_mut() = Some(asset);
                        call_js_hook(&document, "realmwalkWorldReady", &[]);
                    }
                    LoadEvent::FatalFailure(_) => {
                        if let Some(el) = &loading {
                            el.set_inner_text("Failed to load world");
                        }
                    }
                })
                .await;
        });
    }

    fn start_frame_loop(
        window: Window,
        document: Document,
        ctx: Rc<RefCell<FrameContext>>,
        host: Rc<RefCell<WebCaptureHost>>,
    ) {
        let pause_menu = element(&document, PAUSE_MENU);
        let dialogue_box = element(&document, DIALOGUE_BOX);

        let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let starter = callback.clone();
        let loop_window = window.clone();

        *starter.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let now = loop_window
                .performance()
                .map(|p| p.now())
                .unwrap_or(0.0);

            let pose = ctx
                .borrow_mut()
                .tick(now, &mut *host.borrow_mut());
            let overlays = view::overlays_for(ctx.borrow().session.mode());

            if let Some(el) = &pause_menu {
                set_display(el, overlays.pause_menu, "flex");
            }
            if let Some(el) = &dialogue_box {
                set_display(el, overlays.dialogue, "flex");
            }

            // Hand the camera pose to the external renderer, if one is hooked.
            call_js_hook(
                &document,
                "realmwalkRender",
                &[
                    pose.position.x as f64,
                    pose.position.y as f64,
                    pose.position.z as f64,
                    pose.yaw as f64,
                    pose.pitch as f64,
                ],
            );

            schedule_frame(&loop_window, &callback);
        }) as Box<dyn FnMut()>));

        schedule_frame(&window, &starter);
    }

    fn schedule_frame(window: &Window, callback: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
        if let Some(cb) = callback.borrow().as_ref() {
            if window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .is_err()
            {
                warn!("requestAnimationFrame unavailable, frame loop stopped");
            }
        }
    }

    /// Call `window.<name>(...)` when the host page defines it.
    fn call_js_hook(document: &Document, name: &str, args: &[f64]) {
        let global = match document.default_view() {
            Some(w) => w,
            None => return,
        };
        let hook = js_sys::Reflect::get(global.as_ref(), &JsValue::from_str(name));
        if let Ok(hook) = hook {
            if let Some(func) = hook.dyn_ref::<js_sys::Function>() {
                let array = js_sys::Array::new();
                for &a in args {
                    array.push(&JsValue::from_f64(a));
                }
                let _ = func.apply(&JsValue::NULL, &array);
            }
        }
    }

    fn element(document: &Document, id: &str) -> Option<HtmlElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn set_display(el: &HtmlElement, visible: bool, mode: &str) {
        let value = if visible { mode } else { "none" };
        let _ = el.style().set_property("display", value);
    }

    fn viewport_size(window: &Window) -> (u32, u32) {
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0) as u32;
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0) as u32;
        (width.max(1), height.max(1))
    }

    fn js_error(msg: &str) -> JsValue {
        JsValue::from_str(msg)
    }
}
