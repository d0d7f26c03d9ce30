/// Orbscape Web - WASM host for the orbscape scene
///
/// Renders the scene into a WebGL2 canvas, drives it from
/// `requestAnimationFrame`, feeds it pointer and resize events, and wires the
/// scroll-triggered section reveal.

use log::{error, info, warn, Level};
use orbscape_core::{
    CancellationToken, Clock, Error, FrameLoop, FrameSink, FrameStatus, HostEvent, RevealConfig,
    Scene, SceneConfig, Viewport,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Event, EventTarget, HtmlCanvasElement, MouseEvent, Performance, WebGl2RenderingContext, Window,
};

pub mod gl;
pub mod reveal;

pub use gl::WebGlRenderer;
pub use reveal::RevealObserver;

/// Canvas the page ships with
pub const DEFAULT_CANVAS_SELECTOR: &str = "#webgl";

/// Seconds since construction, from `performance.now()`
pub struct PerformanceClock {
    performance: Performance,
    start: f64,
}

impl PerformanceClock {
    pub fn new(window: &Window) -> Result<Self, Error> {
        let performance = window
            .performance()
            .ok_or_else(|| Error::Context("performance timer unavailable".to_string()))?;
        let start = performance.now();
        Ok(Self { performance, start })
    }
}

impl Clock for PerformanceClock {
    fn elapsed_secs(&self) -> f32 {
        ((self.performance.now() - self.start) / 1000.0) as f32
    }
}

type SharedLoop = Rc<RefCell<FrameLoop<PerformanceClock>>>;
type SharedRenderer = Rc<RefCell<WebGlRenderer>>;

/// DOM event listener, removed again on drop
struct EventListener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, Error> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|e| Error::Surface(format!("failed to listen for {}: {:?}", kind, e)))?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// A mounted scene. Dropping it stops the frame chain and detaches listeners.
struct ActiveScene {
    token: CancellationToken,
    _listeners: Vec<EventListener>,
    _reveal: Option<RevealObserver>,
}

impl Drop for ActiveScene {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveScene>> = const { RefCell::new(None) };
}

fn to_js(e: Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn window() -> Result<Window, Error> {
    web_sys::window().ok_or_else(|| Error::Surface("no global window".to_string()))
}

fn current_viewport(window: &Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(1.0) as u32
    };
    Viewport::with_pixel_ratio(
        dimension(window.inner_width()),
        dimension(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

fn create_context(canvas: &HtmlCanvasElement) -> Result<WebGl2RenderingContext, Error> {
    let options = js_sys::Object::new();
    for (key, value) in [("antialias", true), ("alpha", true)] {
        js_sys::Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_bool(value))
            .map_err(|e| Error::Context(format!("failed to build context options: {:?}", e)))?;
    }

    canvas
        .get_context_with_context_options("webgl2", &options)
        .map_err(|e| Error::Context(format!("{:?}", e)))?
        .ok_or_else(|| Error::Context("WebGL2 is not supported".to_string()))?
        .dyn_into::<WebGl2RenderingContext>()
        .map_err(|_| Error::Context("unexpected rendering context type".to_string()))
}

fn dispatch(frame_loop: &SharedLoop, renderer: &SharedRenderer, event: HostEvent) {
    let (Ok(mut frame_loop), Ok(mut renderer)) =
        (frame_loop.try_borrow_mut(), renderer.try_borrow_mut())
    else {
        warn!("Dropped {:?}: scene busy", event);
        return;
    };
    if let Err(e) = frame_loop.handle_event(event, &mut *renderer) {
        error!("Failed to apply {:?}: {}", event, e);
    }
}

fn request_frame(window: &Window, callback: &Closure<dyn FnMut()>) -> Result<(), Error> {
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map(|_| ())
        .map_err(|e| Error::Render(format!("requestAnimationFrame failed: {:?}", e)))
}

/// Start the `requestAnimationFrame` chain. Each callback renders one frame
/// and requests the next; the chain ends when the loop reports `Stopped` or
/// a frame fails.
fn schedule_frames(
    window: Window,
    frame_loop: SharedLoop,
    renderer: SharedRenderer,
) -> Result<(), Error> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let handle = Rc::clone(&callback);
    let host = window.clone();

    *callback.borrow_mut() = Some(Closure::new(move || {
        let status = frame_loop.borrow_mut().frame(&mut *renderer.borrow_mut());
        let keep_going = match status {
            Ok(FrameStatus::Continue) => true,
            Ok(FrameStatus::Stopped) => false,
            Err(e) => {
                error!("Frame failed, stopping: {}", e);
                false
            }
        };

        if keep_going {
            let requested = match handle.borrow().as_ref() {
                Some(next) => request_frame(&host, next),
                None => return,
            };
            match requested {
                Ok(()) => return,
                Err(e) => error!("{}", e),
            }
        }

        // Drop our own closure so the chain and everything it captured is freed
        let _ = handle.borrow_mut().take();
    }));

    let pending = callback.borrow();
    match pending.as_ref() {
        Some(first) => request_frame(&window, first),
        None => Err(Error::Render("frame callback missing".to_string())),
    }
}

fn mount(selector: &str) -> Result<ActiveScene, Error> {
    let window = window()?;
    let document = window
        .document()
        .ok_or_else(|| Error::Surface("no document".to_string()))?;
    let canvas = document
        .query_selector(selector)
        .map_err(|e| Error::Surface(format!("bad selector {}: {:?}", selector, e)))?
        .ok_or_else(|| Error::Surface(format!("no element matches {}", selector)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| Error::Surface(format!("{} is not a canvas", selector)))?;

    let gl = create_context(&canvas)?;
    let mut renderer = WebGlRenderer::new(canvas, gl)?;
    let viewport = current_viewport(&window);
    renderer.resize(&viewport)?;

    let scene = Scene::compose(&SceneConfig::default(), &mut StdRng::from_entropy());
    let frame_loop = FrameLoop::new(scene, viewport, PerformanceClock::new(&window)?);
    let token = frame_loop.cancellation_token();

    let frame_loop: SharedLoop = Rc::new(RefCell::new(frame_loop));
    let renderer: SharedRenderer = Rc::new(RefCell::new(renderer));

    let pointer = {
        let (frame_loop, renderer) = (Rc::clone(&frame_loop), Rc::clone(&renderer));
        EventListener::new(&window, "mousemove", move |event: Event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let moved = HostEvent::PointerMoved {
                    client_x: event.client_x() as f32,
                    client_y: event.client_y() as f32,
                };
                dispatch(&frame_loop, &renderer, moved);
            }
        })?
    };
    let resize = {
        let (frame_loop, renderer) = (Rc::clone(&frame_loop), Rc::clone(&renderer));
        let host = window.clone();
        EventListener::new(&window, "resize", move |_: Event| {
            dispatch(&frame_loop, &renderer, HostEvent::Resized(current_viewport(&host)));
        })?
    };

    // Reveal styling is cosmetic and independent of the scene
    let reveal = match RevealObserver::install(&document, &RevealConfig::default()) {
        Ok(observer) => Some(observer),
        Err(e) => {
            warn!("Section reveal unavailable: {:?}", e);
            None
        }
    };

    schedule_frames(window, frame_loop, renderer)?;
    info!("Scene mounted on {}", selector);

    Ok(ActiveScene {
        token,
        _listeners: vec![pointer, resize],
        _reveal: reveal,
    })
}

/// Mount the scene on `canvas_selector` (default `#webgl`), replacing any running scene.
#[wasm_bindgen]
pub fn start(canvas_selector: Option<String>) -> Result<(), JsValue> {
    let selector = canvas_selector
        .as_deref()
        .unwrap_or(DEFAULT_CANVAS_SELECTOR);
    let active = mount(selector).map_err(|e| {
        error!("Failed to start scene: {}", e);
        to_js(e)
    })?;
    ACTIVE.with(|slot| slot.borrow_mut().replace(active));
    Ok(())
}

/// Stop the running scene at its next frame and detach its listeners.
#[wasm_bindgen]
pub fn stop() {
    ACTIVE.with(|slot| slot.borrow_mut().take());
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    console_log::init_with_level(Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

    // Boot straight away on pages that carry the default canvas
    let document = window()
        .map_err(to_js)?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if document.query_selector(DEFAULT_CANVAS_SELECTOR)?.is_some() {
        start(None)?;
    }
    Ok(())
}
