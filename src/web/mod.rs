//! Browser side: canvas drawing, the animation-frame loop, pointer tracking
//! and the bridges to host-page callbacks.
//!
//! The host page hands every frame an explicit canvas element and a host
//! object. The host object may provide:
//! - `startRecorder()` / `hideRecorder()` / `stopRecorder()`: webcam recorder
//! - `onTrialComplete(recordJson)`: persistence of the trial record
//! - `onFatalError(message)`: a game session died mid-trial
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, window};

use crate::capture::Point;
use crate::error::FrameError;
use crate::frame::{FullscreenController, RecordingController};
use crate::surface::{Arena, Surface};

mod games;
mod story;

pub use games::GamesFrame;
pub use story::StoryFrame;

pub(crate) fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

// --- Canvas ------------------------------------------------------------------

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, FrameError> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| FrameError::RenderingFailure(format!("{e:?}")))?
            .ok_or_else(|| FrameError::RenderingFailure("2d context unavailable".into()))?
            .dyn_into()
            .map_err(|_| FrameError::RenderingFailure("unexpected context type".into()))?;
        ctx.set_font("20px 'Fira Code', monospace");
        ctx.set_text_align("left");
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn arena(&self) -> Arena {
        Arena::new(self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn clear(&mut self, color: &str) -> Result<(), FrameError> {
        let a = self.arena();
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(0.0, 0.0, a.width, a.height);
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) -> Result<(), FrameError> {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
        Ok(())
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str) -> Result<(), FrameError> {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        self.ctx
            .arc(cx, cy, r.max(0.0), 0.0, std::f64::consts::TAU)
            .map_err(|e| FrameError::RenderingFailure(format!("{e:?}")))?;
        self.ctx.fill();
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str) -> Result<(), FrameError> {
        self.ctx.set_fill_style_str(color);
        self.ctx
            .fill_text(text, x, y)
            .map_err(|e| FrameError::RenderingFailure(format!("{e:?}")))
    }
}

// --- Host capabilities ---------------------------------------------------------

/// Calls `host[name](...args)`.
pub(crate) fn call_host(host: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, FrameError> {
    let f = js_sys::Reflect::get(host, &JsValue::from_str(name))?;
    let f: js_sys::Function = f
        .dyn_into()
        .map_err(|_| FrameError::Js(format!("host has no `{name}` method")))?;
    let args: js_sys::Array = args.iter().collect();
    Ok(f.apply(host, &args)?)
}

/// Fire-and-forget notification to the host; failures are only logged.
pub(crate) fn notify_host(host: &JsValue, name: &str, arg: &str) {
    if let Err(err) = call_host(host, name, &[JsValue::from_str(arg)]) {
        log::warn!("host callback {name} failed: {err}");
    }
}

pub struct BrowserFullscreen {
    element: Element,
}

impl BrowserFullscreen {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl FullscreenController for BrowserFullscreen {
    fn request_fullscreen(&mut self) {
        if let Err(e) = self.element.request_fullscreen() {
            log::debug!("fullscreen request refused: {e:?}");
        }
    }

    fn exit_fullscreen(&mut self) {
        if let Some(doc) = window().and_then(|w| w.document()) {
            if doc.fullscreen_element().is_some() {
                doc.exit_fullscreen();
            }
        }
    }
}

pub struct HostRecorder {
    host: JsValue,
}

impl HostRecorder {
    pub fn new(host: JsValue) -> Self {
        Self { host }
    }
}

impl RecordingController for HostRecorder {
    fn start_recording(&mut self) -> Result<(), FrameError> {
        call_host(&self.host, "startRecorder", &[])
            .map(|_| ())
            .map_err(|e| FrameError::RecordingUnavailable(e.to_string()))
    }

    fn hide_recorder_widget(&mut self) {
        if let Err(err) = call_host(&self.host, "hideRecorder", &[]) {
            log::debug!("hideRecorder: {err}");
        }
    }

    fn stop_recording(&mut self) {
        if let Err(err) = call_host(&self.host, "stopRecorder", &[]) {
            log::warn!("stopRecorder: {err}");
        }
    }
}

// --- Animation loop ----------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// requestAnimationFrame loop. `on_frame` returns false to stop rescheduling.
pub(crate) struct AnimationLoop {
    callback: FrameCallback,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    pub fn start(mut on_frame: impl FnMut(f64) -> bool + 'static) -> Result<Self, FrameError> {
        let win = window().ok_or_else(|| FrameError::Js("no window".into()))?;
        let f: FrameCallback = Rc::new(RefCell::new(None));
        let g = f.clone();
        let handle = Rc::new(Cell::new(None));
        let h = handle.clone();
        *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            h.set(None);
            if !on_frame(ts) {
                return;
            }
            if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
                h.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
            }
        }) as Box<dyn FnMut(f64)>));
        if let Some(cb) = g.borrow().as_ref() {
            handle.set(Some(win.request_animation_frame(cb.as_ref().unchecked_ref())?));
        }
        Ok(Self { callback: g, handle })
    }

    /// Cancels the pending frame and releases the callback (breaking its Rc cycle).
    pub fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(w) = window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
        self.callback.borrow_mut().take();
    }
}

// --- Pointer -----------------------------------------------------------------

/// Tracks the last pointer position over the canvas, in canvas pixels.
pub(crate) struct PointerTracker {
    canvas: HtmlCanvasElement,
    position: Rc<Cell<Option<Point>>>,
    on_move: Closure<dyn FnMut(MouseEvent)>,
}

impl PointerTracker {
    pub fn attach(canvas: &HtmlCanvasElement) -> Result<Self, FrameError> {
        let position = Rc::new(Cell::new(None));
        let pos = position.clone();
        let target = canvas.clone();
        let on_move = Closure::wrap(Box::new(move |evt: MouseEvent| {
            // offset_x/offset_y are CSS pixels; scale into the canvas backing store.
            let sx = scale(target.width(), target.client_width());
            let sy = scale(target.height(), target.client_height());
            pos.set(Some(Point::new(
                evt.offset_x() as f64 * sx,
                evt.offset_y() as f64 * sy,
            )));
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
        Ok(Self {
            canvas: canvas.clone(),
            position,
            on_move,
        })
    }

    pub fn shared(&self) -> Rc<Cell<Option<Point>>> {
        self.position.clone()
    }

    pub fn detach(&self) {
        let _ = self
            .canvas
            .remove_event_listener_with_callback("mousemove", self.on_move.as_ref().unchecked_ref());
    }
}

fn scale(backing: u32, css: i32) -> f64 {
    if css <= 0 {
        1.0
    } else {
        backing as f64 / css as f64
    }
}
