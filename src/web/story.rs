// `StoryFrame`: the storybook page as exported to JS. The page template owns
// the <img>/<audio> elements; this side decides what is shown and when.
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use super::{BrowserFullscreen, HostRecorder, now_ms};
use crate::assets::DirectoryExpander;
use crate::error::FrameError;
use crate::story::{StoryPage, StoryPageConfig, StoryStatus};

#[wasm_bindgen]
pub struct StoryFrame {
    page: StoryPage,
}

#[wasm_bindgen]
impl StoryFrame {
    /// `element` is the page container, shown fullscreen once displayed.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, element: Element, host: JsValue) -> Result<StoryFrame, JsValue> {
        let config = StoryPageConfig::from_json(config_json)?;
        let page = StoryPage::new(
            config,
            &DirectoryExpander,
            Box::new(HostRecorder::new(host)),
            Box::new(BrowserFullscreen::new(element)),
        )?;
        Ok(StoryFrame { page })
    }

    /// Resolved images, audio segments, parent text and navigation buttons.
    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        let nav = self.page.navigation();
        let cfg = self.page.config();
        let view = json!({
            "images": self.page.images(),
            "audioSources": self.page.segments(),
            "parentTextBlock": self.page.parent_text(),
            "backgroundColor": cfg.background_color,
            "pageColor": cfg.page_color,
            "showNext": nav.next,
            "showPrevious": nav.previous,
            "showReplay": nav.replay,
        });
        Ok(serde_json::to_string(&view).map_err(FrameError::from)?)
    }

    /// Called once the page is inserted; false while waiting for the recorder.
    pub fn begin(&mut self) -> bool {
        self.page.begin(now_ms())
    }

    #[wasm_bindgen(js_name = recordingStarted)]
    pub fn recording_started(&mut self, video_id: &str) {
        self.page.on_recording_started(video_id, now_ms());
    }

    /// Id of the segment that should be playing now.
    #[wasm_bindgen(js_name = currentAudio)]
    pub fn current_audio(&self) -> Option<String> {
        self.page.current_segment().map(|s| s.id.clone())
    }

    #[wasm_bindgen(js_name = finishedAudio)]
    pub fn finished_audio(&mut self) {
        self.page.finished_audio();
    }

    pub fn replay(&mut self) {
        self.page.replay();
    }

    #[wasm_bindgen(js_name = highlightedImage)]
    pub fn highlighted_image(&self, clip_seconds: f64) -> Option<String> {
        self.page.highlighted_image(clip_seconds).map(str::to_string)
    }

    #[wasm_bindgen(js_name = nextEnabled)]
    pub fn next_enabled(&self) -> bool {
        self.page.next_enabled(now_ms())
    }

    pub fn progress(&self) -> Option<f64> {
        self.page.progress_fraction(now_ms())
    }

    /// "hidden", "showing" or "proceed".
    pub fn status(&self) -> String {
        match self.page.tick(now_ms()) {
            StoryStatus::Hidden => "hidden",
            StoryStatus::Showing => "showing",
            StoryStatus::Proceed => "proceed",
        }
        .to_string()
    }

    #[wasm_bindgen(js_name = recordJson)]
    pub fn record_json(&self) -> Result<String, JsValue> {
        Ok(self.page.record().to_json()?)
    }

    pub fn destroy(&mut self) {
        self.page.teardown();
    }
}
