//! Storybook trial page: an image (or several) placed on the page while a
//! sequence of audio clips plays, with optional image highlights keyed to
//! clip time.
//!
//! The page is shown fullscreen. With `doRecording` it stays hidden and audio
//! does not start until the recorder reports that it is running. The participant may proceed once the
//! audio is done and `durationSeconds` has elapsed; with `autoProceed` the page
//! advances by itself at that point.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::assets::{AssetExpander, AudioSource};
use crate::capture::TrialRecord;
use crate::error::FrameError;
use crate::frame::{FullscreenController, RecordingController};

// --- Configuration -----------------------------------------------------------

/// A percentage given either as a JSON number or a numeric string ("34.47").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Percent {
    Number(f64),
    Text(String),
}

impl Percent {
    fn value(&self, field: &str, image: &str) -> Result<f64, FrameError> {
        let v = match self {
            Percent::Number(n) => Some(*n),
            Percent::Text(s) => s.trim().parse::<f64>().ok(),
        };
        v.filter(|n| n.is_finite()).ok_or_else(|| {
            FrameError::invalid(format!("image {image}: `{field}` is not a number: {self:?}"))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
    #[serde(default)]
    pub id: Option<String>,
    pub src: String,
    pub left: Percent,
    pub width: Percent,
    pub top: Percent,
}

/// Either a short name expanded through `baseDir`/`audioTypes`, or explicit sources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AudioRef {
    Name(String),
    Sources(Vec<AudioSource>),
}

impl Default for AudioRef {
    fn default() -> Self {
        AudioRef::Sources(Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub range: [f64; 2],
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSegmentSpec {
    pub audio_id: String,
    pub sources: AudioRef,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentTextBlock {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub emph: Option<bool>,
    #[serde(default)]
    pub css: Map<String, Value>,
}

impl ParentTextBlock {
    /// `{}` means no parent text block at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.text.is_none() && self.emph.is_none() && self.css.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPageConfig {
    #[serde(default)]
    pub auto_proceed: bool,
    #[serde(default)]
    pub do_recording: bool,
    #[serde(default = "no_duration")]
    pub duration_seconds: f64,
    #[serde(default)]
    pub show_progress_bar: bool,
    #[serde(default = "default_true")]
    pub show_previous_button: bool,
    #[serde(default = "default_true")]
    pub show_replay_button: bool,
    #[serde(default)]
    pub parent_text_block: ParentTextBlock,
    #[serde(default)]
    pub image: Option<ImageSpec>,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_page_color")]
    pub page_color: String,
    #[serde(default)]
    pub base_dir: String,
    #[serde(default = "default_audio_types")]
    pub audio_types: Vec<String>,
    #[serde(default)]
    pub audio: AudioRef,
    #[serde(default)]
    pub audio_sources: Vec<AudioSegmentSpec>,
}

fn no_duration() -> f64 {
    -1.0
}
fn default_true() -> bool {
    true
}
fn default_background() -> String {
    "black".to_string()
}
fn default_page_color() -> String {
    "white".to_string()
}
fn default_audio_types() -> Vec<String> {
    vec!["mp3".to_string()]
}

impl StoryPageConfig {
    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        serde_json::from_str(json).map_err(|e| FrameError::invalid(e.to_string()))
    }
}

// --- Resolved page -----------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoryImage {
    pub id: String,
    pub src: String,
    pub left: f64,
    pub width: f64,
    pub top: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AudioSegment {
    pub id: String,
    pub sources: Vec<AudioSource>,
    pub highlights: Vec<Highlight>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoryStatus {
    /// Waiting for the recorder; nothing shown, no audio.
    Hidden,
    Showing,
    /// Auto-proceed conditions met.
    Proceed,
}

/// Which navigation buttons the page shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub next: bool,
    pub previous: bool,
    pub replay: bool,
}

pub struct StoryPage {
    config: StoryPageConfig,
    images: Vec<StoryImage>,
    segments: Vec<AudioSegment>,
    recording: Box<dyn RecordingController>,
    fullscreen: Box<dyn FullscreenController>,
    record: TrialRecord,
    awaiting_recording: bool,
    started_at: Option<f64>,
    segment: usize,
    torn_down: bool,
}

impl StoryPage {
    pub fn new(
        config: StoryPageConfig,
        expander: &dyn AssetExpander,
        mut recording: Box<dyn RecordingController>,
        fullscreen: Box<dyn FullscreenController>,
    ) -> Result<Self, FrameError> {
        let images = resolve_images(&config, expander)?;
        validate_css(&config.parent_text_block)?;
        let segments = resolve_segments(&config, expander, &images)?;

        if config.do_recording {
            recording.start_recording().map_err(|err| match err {
                FrameError::RecordingUnavailable(_) => err,
                other => FrameError::RecordingUnavailable(other.to_string()),
            })?;
            recording.hide_recorder_widget();
        }
        log::debug!(
            "story page ready: {} images, {} audio segments",
            images.len(),
            segments.len()
        );
        Ok(Self {
            awaiting_recording: config.do_recording,
            config,
            images,
            segments,
            recording,
            fullscreen,
            record: TrialRecord::default(),
            started_at: None,
            segment: 0,
            torn_down: false,
        })
    }

    pub fn images(&self) -> &[StoryImage] {
        &self.images
    }

    pub fn segments(&self) -> &[AudioSegment] {
        &self.segments
    }

    pub fn config(&self) -> &StoryPageConfig {
        &self.config
    }

    pub fn record(&self) -> &TrialRecord {
        &self.record
    }

    pub fn parent_text(&self) -> Option<&ParentTextBlock> {
        (!self.config.parent_text_block.is_empty()).then_some(&self.config.parent_text_block)
    }

    /// Page is inserted. Returns whether it is displayed now.
    pub fn begin(&mut self, now_ms: f64) -> bool {
        if !self.awaiting_recording && !self.torn_down {
            self.show(now_ms);
        }
        self.is_displayed()
    }

    fn show(&mut self, now_ms: f64) {
        if self.started_at.is_none() {
            self.started_at = Some(now_ms);
            self.fullscreen.request_fullscreen();
        }
    }

    pub fn on_recording_started(&mut self, video_id: &str, now_ms: f64) {
        if self.torn_down {
            log::debug!("ignoring late recording start ({video_id}) after teardown");
            return;
        }
        self.record.video_id = video_id.to_string();
        if !self.record.video_list.iter().any(|v| v == video_id) {
            self.record.video_list.push(video_id.to_string());
        }
        self.awaiting_recording = false;
        self.show(now_ms);
    }

    pub fn is_displayed(&self) -> bool {
        self.started_at.is_some()
    }

    /// Segment that should be playing, if audio is still running.
    pub fn current_segment(&self) -> Option<&AudioSegment> {
        if !self.is_displayed() {
            return None;
        }
        self.segments.get(self.segment)
    }

    /// The current clip ended; move on to the next one.
    pub fn finished_audio(&mut self) {
        if self.segment < self.segments.len() {
            self.segment += 1;
        }
    }

    pub fn audio_done(&self) -> bool {
        self.segment >= self.segments.len()
    }

    /// Restart the audio sequence; the minimum-duration clock keeps running.
    pub fn replay(&mut self) {
        self.segment = 0;
    }

    /// Image highlighted `clip_seconds` into the current clip.
    pub fn highlighted_image(&self, clip_seconds: f64) -> Option<&str> {
        self.current_segment()?
            .highlights
            .iter()
            .find(|h| h.range[0] <= clip_seconds && clip_seconds <= h.range[1])
            .map(|h| h.image.as_str())
    }

    fn min_duration_elapsed(&self, now_ms: f64) -> bool {
        match self.started_at {
            None => false,
            Some(_) if self.config.duration_seconds <= 0.0 => true,
            Some(start) => now_ms - start >= self.config.duration_seconds * 1000.0,
        }
    }

    pub fn next_enabled(&self, now_ms: f64) -> bool {
        self.is_displayed() && self.audio_done() && self.min_duration_elapsed(now_ms)
    }

    /// Fill level of the optional progress bar, 0.0..=1.0.
    pub fn progress_fraction(&self, now_ms: f64) -> Option<f64> {
        if !self.config.show_progress_bar || self.config.duration_seconds <= 0.0 {
            return None;
        }
        let start = self.started_at?;
        Some(((now_ms - start) / (self.config.duration_seconds * 1000.0)).clamp(0.0, 1.0))
    }

    pub fn navigation(&self) -> Navigation {
        let manual = !self.config.auto_proceed;
        Navigation {
            next: manual,
            previous: manual && self.config.show_previous_button,
            replay: manual && self.config.show_replay_button,
        }
    }

    pub fn tick(&self, now_ms: f64) -> StoryStatus {
        if !self.is_displayed() || self.torn_down {
            StoryStatus::Hidden
        } else if self.config.auto_proceed && self.next_enabled(now_ms) {
            StoryStatus::Proceed
        } else {
            StoryStatus::Showing
        }
    }

    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.awaiting_recording = false;
        if self.config.do_recording {
            self.recording.stop_recording();
        }
        if self.is_displayed() {
            self.fullscreen.exit_fullscreen();
        }
    }
}

fn resolve_images(
    config: &StoryPageConfig,
    expander: &dyn AssetExpander,
) -> Result<Vec<StoryImage>, FrameError> {
    let specs: Vec<&ImageSpec> = config.image.iter().chain(config.images.iter()).collect();
    let mut images: Vec<StoryImage> = Vec::with_capacity(specs.len());
    for (n, spec) in specs.into_iter().enumerate() {
        let id = spec.id.clone().unwrap_or_else(|| format!("image_{}", n + 1));
        if id.is_empty() {
            return Err(FrameError::invalid(format!("image {} has an empty id", n + 1)));
        }
        if images.iter().any(|img| img.id == id) {
            return Err(FrameError::invalid(format!("duplicate image id {id}")));
        }
        if spec.src.trim().is_empty() {
            return Err(FrameError::invalid(format!("image {id} has no src")));
        }
        images.push(StoryImage {
            src: expander.image_url(&config.base_dir, &spec.src),
            left: spec.left.value("left", &id)?,
            width: spec.width.value("width", &id)?,
            top: spec.top.value("top", &id)?,
            id,
        });
    }
    Ok(images)
}

fn resolve_segments(
    config: &StoryPageConfig,
    expander: &dyn AssetExpander,
    images: &[StoryImage],
) -> Result<Vec<AudioSegment>, FrameError> {
    let expand = |audio: &AudioRef| match audio {
        AudioRef::Name(name) => expander.audio_sources(&config.base_dir, name, &config.audio_types),
        AudioRef::Sources(list) => list.clone(),
    };

    let mut segments = Vec::with_capacity(config.audio_sources.len() + 1);
    let frame_audio = expand(&config.audio);
    if !frame_audio.is_empty() {
        segments.push(AudioSegment {
            id: "audio".to_string(),
            sources: frame_audio,
            highlights: Vec::new(),
        });
    }
    for spec in &config.audio_sources {
        for h in &spec.highlights {
            let [start, end] = h.range;
            if !(start >= 0.0 && start <= end) {
                return Err(FrameError::invalid(format!(
                    "audio {}: bad highlight range {:?}",
                    spec.audio_id, h.range
                )));
            }
            if !images.iter().any(|img| img.id == h.image) {
                return Err(FrameError::invalid(format!(
                    "audio {}: highlight refers to unknown image {}",
                    spec.audio_id, h.image
                )));
            }
        }
        segments.push(AudioSegment {
            id: spec.audio_id.clone(),
            sources: expand(&spec.sources),
            highlights: spec.highlights.clone(),
        });
    }
    Ok(segments)
}

fn validate_css(block: &ParentTextBlock) -> Result<(), FrameError> {
    for (key, value) in &block.css {
        if !(value.is_string() || value.is_number()) {
            return Err(FrameError::invalid(format!(
                "parentTextBlock.css.{key} must be a string or number"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::assets::DirectoryExpander;

    type CallLog = Rc<RefCell<Vec<&'static str>>>;

    struct FakeRecorder {
        log: CallLog,
        fail: bool,
    }
    impl RecordingController for FakeRecorder {
        fn start_recording(&mut self) -> Result<(), FrameError> {
            self.log.borrow_mut().push("start_recording");
            if self.fail {
                return Err(FrameError::RecordingUnavailable("no camera".into()));
            }
            Ok(())
        }
        fn hide_recorder_widget(&mut self) {}
        fn stop_recording(&mut self) {
            self.log.borrow_mut().push("stop_recording");
        }
    }

    struct FakeFullscreen(CallLog);
    impl FullscreenController for FakeFullscreen {
        fn request_fullscreen(&mut self) {
            self.0.borrow_mut().push("fullscreen");
        }
        fn exit_fullscreen(&mut self) {
            self.0.borrow_mut().push("exit_fullscreen");
        }
    }

    fn build(config: StoryPageConfig, fail_recording: bool) -> (Result<StoryPage, FrameError>, CallLog) {
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let page = StoryPage::new(
            config,
            &DirectoryExpander,
            Box::new(FakeRecorder {
                log: log.clone(),
                fail: fail_recording,
            }),
            Box::new(FakeFullscreen(log.clone())),
        );
        (page, log)
    }

    const STORY: &str = r#"{
        "autoProceed": true,
        "durationSeconds": 2,
        "showProgressBar": true,
        "baseDir": "https://cdn.example/study/",
        "audioTypes": ["mp3", "ogg"],
        "parentTextBlock": {"title": "Parents!", "text": "some instructions", "emph": true,
                            "css": {"color": "red", "font-size": "12px"}},
        "images": [
            {"id": "leftA", "src": "flurps1.jpg", "left": "10", "width": "30", "top": "34.47"},
            {"id": "rightA", "src": "zazzes1.jpg", "left": "60", "width": "30", "top": "34.47"}
        ],
        "audioSources": [
            {"audioId": "firstAudio", "sources": "intro1",
             "highlights": [{"range": [3.017343, 5.600283], "image": "leftA"},
                            {"range": [5.752911, 8.899402], "image": "rightA"}]}
        ]
    }"#;

    fn page(json: &str) -> Result<StoryPage, FrameError> {
        build(StoryPageConfig::from_json(json)?, false).0
    }

    #[test]
    fn full_story_resolves() {
        let p = page(STORY).unwrap();
        assert_eq!(p.images().len(), 2);
        assert_eq!(p.images()[0].src, "https://cdn.example/study/img/flurps1.jpg");
        assert_eq!(p.images()[1].top, 34.47);
        assert_eq!(p.segments()[0].sources.len(), 2);
        assert!(p.parent_text().is_some());
    }

    #[test]
    fn single_image_gets_synthesized_id() {
        let p = page(r#"{"image": {"src": "a.jpg", "left": "10", "width": "30", "top": "34"}}"#)
            .unwrap();
        assert_eq!(p.images().len(), 1);
        assert_eq!(p.images()[0].id, "image_1");
        assert!(p.parent_text().is_none());
    }

    #[test]
    fn malformed_entries_are_rejected() {
        let bad_width = r#"{"images": [{"src": "a.jpg", "left": "10", "width": "wide", "top": "0"}]}"#;
        assert!(matches!(page(bad_width), Err(FrameError::InvalidConfiguration(_))));
        let bad_block = r#"{"parentTextBlock": "read this"}"#;
        assert!(matches!(page(bad_block), Err(FrameError::InvalidConfiguration(_))));
        let bad_css = r#"{"parentTextBlock": {"css": {"color": ["red"]}}}"#;
        assert!(matches!(page(bad_css), Err(FrameError::InvalidConfiguration(_))));
        let unknown_image = STORY.replace("\"image\": \"rightA\"", "\"image\": \"nope\"");
        assert!(matches!(page(&unknown_image), Err(FrameError::InvalidConfiguration(_))));
    }

    #[test]
    fn highlights_follow_clip_time() {
        let mut p = page(STORY).unwrap();
        assert!(p.begin(0.0));
        assert_eq!(p.highlighted_image(1.0), None);
        assert_eq!(p.highlighted_image(4.0), Some("leftA"));
        assert_eq!(p.highlighted_image(6.0), Some("rightA"));
        p.finished_audio();
        assert_eq!(p.highlighted_image(4.0), None);
    }

    #[test]
    fn auto_proceed_waits_for_audio_and_duration() {
        let mut p = page(STORY).unwrap();
        p.begin(1_000.0);
        assert_eq!(p.tick(5_000.0), StoryStatus::Showing);
        p.finished_audio();
        assert_eq!(p.tick(2_500.0), StoryStatus::Showing);
        assert_eq!(p.progress_fraction(2_000.0), Some(0.5));
        assert_eq!(p.tick(3_000.0), StoryStatus::Proceed);
        assert!(!p.navigation().next);
    }

    #[test]
    fn replay_restarts_audio() {
        let mut p = page(STORY).unwrap();
        p.begin(0.0);
        p.finished_audio();
        assert!(p.audio_done());
        p.replay();
        assert!(!p.audio_done());
        assert_eq!(p.current_segment().map(|s| s.id.as_str()), Some("firstAudio"));
    }

    #[test]
    fn recording_gates_display() {
        let config = StoryPageConfig::from_json(r#"{"doRecording": true}"#).unwrap();
        let (p, log) = build(config.clone(), false);
        let mut p = p.unwrap();
        assert!(!p.begin(0.0));
        assert_eq!(p.tick(0.0), StoryStatus::Hidden);
        assert_eq!(*log.borrow(), vec!["start_recording"]);
        p.on_recording_started("vid", 100.0);
        assert!(p.is_displayed());
        assert!(p.next_enabled(100.0));
        assert_eq!(*log.borrow(), vec!["start_recording", "fullscreen"]);

        let (err, _) = build(config, true);
        assert!(matches!(err.err(), Some(FrameError::RecordingUnavailable(_))));
    }

    #[test]
    fn listed_image_without_id_gets_synthesized_id() {
        let p = page(r#"{"images": [{"src": "a.jpg", "left": "10", "width": "30", "top": "34"},
                                    {"id": "b", "src": "b.jpg", "left": 50, "width": 30, "top": 34}]}"#)
            .unwrap();
        let ids: Vec<&str> = p.images().iter().map(|img| img.id.as_str()).collect();
        assert_eq!(ids, ["image_1", "b"]);
    }

    #[test]
    fn duplicate_image_ids_are_rejected() {
        let dup = r#"{"images": [{"id": "x", "src": "a.jpg", "left": 0, "width": 10, "top": 0},
                                 {"id": "x", "src": "b.jpg", "left": 50, "width": 10, "top": 0}]}"#;
        assert!(matches!(page(dup), Err(FrameError::InvalidConfiguration(_))));
        // A synthesized id still collides with an explicit one.
        let synth = r#"{"image": {"src": "a.jpg", "left": 0, "width": 10, "top": 0},
                        "images": [{"id": "image_1", "src": "b.jpg", "left": 50, "width": 10, "top": 0}]}"#;
        assert!(matches!(page(synth), Err(FrameError::InvalidConfiguration(_))));
    }

    #[test]
    fn bad_highlight_ranges_are_rejected() {
        let reversed = STORY.replace("[3.017343, 5.600283]", "[5, 3]");
        assert!(matches!(page(&reversed), Err(FrameError::InvalidConfiguration(_))));
        let negative = STORY.replace("[3.017343, 5.600283]", "[-1, 3]");
        assert!(matches!(page(&negative), Err(FrameError::InvalidConfiguration(_))));
        let point = STORY.replace("[3.017343, 5.600283]", "[4, 4]");
        assert!(page(&point).is_ok());
    }

    #[test]
    fn teardown_stops_recording_and_leaves_fullscreen() {
        let config = StoryPageConfig::from_json(r#"{"doRecording": true}"#).unwrap();
        let (p, log) = build(config, false);
        let mut p = p.unwrap();
        p.on_recording_started("vid", 0.0);
        p.teardown();
        p.teardown();
        assert_eq!(
            *log.borrow(),
            vec!["start_recording", "fullscreen", "stop_recording", "exit_fullscreen"]
        );
        assert_eq!(p.tick(10.0), StoryStatus::Hidden);
    }

    #[test]
    fn teardown_without_recording_only_exits_fullscreen() {
        let (p, log) = build(StoryPageConfig::from_json("{}").unwrap(), false);
        let mut p = p.unwrap();
        assert!(p.begin(0.0));
        p.teardown();
        assert_eq!(*log.borrow(), vec!["fullscreen", "exit_fullscreen"]);
    }
}
