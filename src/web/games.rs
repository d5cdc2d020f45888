// `GamesFrame`: the games frame as exported to JS.
use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use super::{
    AnimationLoop, BrowserFullscreen, CanvasSurface, HostRecorder, PointerTracker, notify_host,
};
use crate::config::FrameConfig;
use crate::error::FrameError;
use crate::frame::{FrameController, FrameState, TickReport};

struct GamesInner {
    controller: FrameController,
    host: JsValue,
}

#[wasm_bindgen]
pub struct GamesFrame {
    inner: Rc<RefCell<GamesInner>>,
    canvas: HtmlCanvasElement,
    pointer: Option<PointerTracker>,
    animation: Option<AnimationLoop>,
}

#[wasm_bindgen]
impl GamesFrame {
    /// `canvas` is the frame's own canvas; `host` carries the recorder and
    /// persistence callbacks.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, canvas: HtmlCanvasElement, host: JsValue) -> Result<GamesFrame, JsValue> {
        let config = FrameConfig::from_json(config_json)?;
        let controller = FrameController::new(
            config,
            Box::new(BrowserFullscreen::new(canvas.clone().into())),
            Box::new(HostRecorder::new(host.clone())),
        )?;
        Ok(GamesFrame {
            inner: Rc::new(RefCell::new(GamesInner { controller, host })),
            canvas,
            pointer: None,
            animation: None,
        })
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.inner.borrow().controller.state())
    }

    /// Display flags plus the progress skin, for the page template.
    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        let inner = self.inner.borrow();
        let ctl = &inner.controller;
        let display = ctl.display();
        let skin = ctl.skin();
        let cfg = ctl.config();
        let view = json!({
            "showIntro": display.show_intro,
            "showProgress": display.show_progress,
            "showInstructions": display.show_instructions,
            "instructions": cfg.instructions,
            "gameDescription": cfg.game_description,
            "source": cfg.source,
            "sourceButton": cfg.source_button,
            "buttonPosition": skin.button_class,
            "machineUrls": skin.machine_urls,
            "arrowUrls": skin.arrow_urls,
            "exitUrl": skin.exit_url,
        });
        Ok(serde_json::to_string(&view).map_err(FrameError::from)?)
    }

    pub fn play(&mut self) -> Result<(), JsValue> {
        let surface = CanvasSurface::new(self.canvas.clone())?;
        self.inner.borrow_mut().controller.play(Box::new(surface))?;

        let tracker = PointerTracker::attach(&self.canvas)?;
        let pointer = tracker.shared();
        self.pointer = Some(tracker);

        let inner = self.inner.clone();
        let animation = AnimationLoop::start(move |ts| {
            // Release the borrow before calling back into JS.
            let (report, keep_going, host) = {
                let Ok(mut st) = inner.try_borrow_mut() else {
                    return true;
                };
                let report = st.controller.tick(ts, pointer.get());
                let keep = st.controller.state() == FrameState::Playing && !st.controller.is_torn_down();
                (report, keep, st.host.clone())
            };
            match report {
                Ok(TickReport::Idle) => keep_going,
                Ok(TickReport::Running) => true,
                Ok(TickReport::Complete { record, summary }) => {
                    log::info!("{:?} complete after {} ticks", summary.kind, summary.ticks);
                    match record.to_json() {
                        Ok(json) => notify_host(&host, "onTrialComplete", &json),
                        Err(err) => log::error!("could not serialize trial record: {err}"),
                    }
                    false
                }
                Err(err) => {
                    log::error!("game session failed: {err}");
                    notify_host(&host, "onFatalError", &err.to_string());
                    false
                }
            }
        })?;
        self.animation = Some(animation);
        Ok(())
    }

    #[wasm_bindgen(js_name = recordingStarted)]
    pub fn recording_started(&self, video_id: &str) {
        match self.inner.try_borrow_mut() {
            Ok(mut st) => st.controller.on_recording_started(video_id),
            Err(_) => log::warn!("recording start ({video_id}) arrived while the frame was busy; dropped"),
        }
    }

    /// External "next": returns the trial record JSON if a game was played.
    pub fn next(&mut self) -> Result<Option<String>, JsValue> {
        self.stop_loop();
        let record = self.inner.borrow_mut().controller.next();
        Ok(record.map(|r| r.to_json()).transpose()?)
    }

    pub fn destroy(&mut self) {
        self.stop_loop();
        if let Ok(mut st) = self.inner.try_borrow_mut() {
            st.controller.teardown();
        }
    }
}

impl GamesFrame {
    fn stop_loop(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.stop();
        }
        if let Some(pointer) = self.pointer.take() {
            pointer.detach();
        }
    }
}

impl Drop for GamesFrame {
    fn drop(&mut self) {
        self.destroy();
    }
}
