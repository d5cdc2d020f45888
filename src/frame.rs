//! Games frame lifecycle: intro / progress panels, the game itself, and the
//! trial record handed to persistence once the game is over.
//!
//! Fullscreen and webcam recording are capabilities supplied by the host and
//! injected here as trait objects; the controller never looks anything up
//! globally.

use crate::capture::{Point, TrialRecord};
use crate::config::{FrameConfig, GameKind};
use crate::error::FrameError;
use crate::game::{GameSession, SessionStatus, SessionSummary};
use crate::skin::{SkinAssets, SkinTable};
use crate::surface::Surface;

/// Fullscreen capability. Implementations fail silently when unsupported.
pub trait FullscreenController {
    fn request_fullscreen(&mut self);
    fn exit_fullscreen(&mut self);
}

/// Webcam recording capability. `start_recording` only kicks the recorder
/// off; the video id arrives later through
/// [`FrameController::on_recording_started`].
pub trait RecordingController {
    fn start_recording(&mut self) -> Result<(), FrameError>;
    fn hide_recorder_widget(&mut self);
    /// Stop a recording started by this frame. Called once, on teardown.
    fn stop_recording(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Intro,
    Progress,
    Playing,
    Done,
}

/// Which panel is rendered. At most one flag is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub show_intro: bool,
    pub show_progress: bool,
    pub show_instructions: bool,
}

/// Partial update for [`DisplayState`]; `None` leaves a flag unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayPatch {
    pub show_intro: Option<bool>,
    pub show_progress: Option<bool>,
    pub show_instructions: Option<bool>,
}

impl DisplayPatch {
    pub fn hide_all() -> Self {
        Self {
            show_intro: Some(false),
            show_progress: Some(false),
            show_instructions: Some(false),
        }
    }
}

impl DisplayState {
    fn patched(self, patch: DisplayPatch) -> Result<Self, FrameError> {
        let next = DisplayState {
            show_intro: patch.show_intro.unwrap_or(self.show_intro),
            show_progress: patch.show_progress.unwrap_or(self.show_progress),
            show_instructions: patch.show_instructions.unwrap_or(self.show_instructions),
        };
        let shown = [next.show_intro, next.show_progress, next.show_instructions]
            .iter()
            .filter(|b| **b)
            .count();
        if shown > 1 {
            return Err(FrameError::invalid(format!(
                "display modes are mutually exclusive, got {next:?}"
            )));
        }
        Ok(next)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickReport {
    /// Nothing to advance: not playing, torn down, or waiting on the recorder.
    Idle,
    Running,
    Complete {
        record: TrialRecord,
        summary: SessionSummary,
    },
}

pub struct FrameController {
    config: FrameConfig,
    kind: GameKind,
    skin: SkinAssets,
    display: DisplayState,
    state: FrameState,
    fullscreen: Box<dyn FullscreenController>,
    recording: Box<dyn RecordingController>,
    session: Option<GameSession>,
    record: TrialRecord,
    awaiting_recording: bool,
    recording_active: bool,
    torn_down: bool,
}

impl FrameController {
    /// Validates the configuration, requests fullscreen when configured and
    /// picks the progress skin for this frame's game.
    pub fn new(
        config: FrameConfig,
        mut fullscreen: Box<dyn FullscreenController>,
        recording: Box<dyn RecordingController>,
    ) -> Result<Self, FrameError> {
        let kind = config.validate()?;
        let skin = SkinTable::new(&config.skin_base_url)
            .lookup(config.game_type)?
            .clone();
        if config.fullscreen {
            fullscreen.request_fullscreen();
        }
        let display = DisplayState {
            show_intro: config.show_intro,
            show_progress: config.show_progress,
            show_instructions: config.show_instructions,
        };
        let state = if display.show_intro {
            FrameState::Intro
        } else {
            FrameState::Progress
        };
        log::debug!("games frame initialized: {} in {state:?}", kind.title());
        Ok(Self {
            config,
            kind,
            skin,
            display,
            state,
            fullscreen,
            recording,
            session: None,
            record: TrialRecord::default(),
            awaiting_recording: false,
            recording_active: false,
            torn_down: false,
        })
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn display(&self) -> DisplayState {
        self.display
    }

    pub fn skin(&self) -> &SkinAssets {
        &self.skin
    }

    pub fn record(&self) -> &TrialRecord {
        &self.record
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn is_waiting_for_recording(&self) -> bool {
        self.awaiting_recording
    }

    /// The only way display flags change.
    pub fn apply_state(&mut self, patch: DisplayPatch) -> Result<(), FrameError> {
        self.display = self.display.patched(patch)?;
        Ok(())
    }

    /// Start the game on `surface`. With recording enabled the session is
    /// built now but does not tick until the recorder reports a video id.
    pub fn play(&mut self, surface: Box<dyn Surface>) -> Result<(), FrameError> {
        if self.torn_down {
            return Err(FrameError::invalid("frame has been torn down"));
        }
        if !matches!(self.state, FrameState::Intro | FrameState::Progress) {
            return Err(FrameError::invalid(format!(
                "play is not available in state {:?}",
                self.state
            )));
        }
        if self.config.do_recording {
            self.recording.start_recording().map_err(|err| match err {
                FrameError::RecordingUnavailable(_) => err,
                other => FrameError::RecordingUnavailable(other.to_string()),
            })?;
            self.recording_active = true;
        }
        let session = GameSession::new(surface, self.config.game_type, &self.config)?;

        self.fullscreen.request_fullscreen();
        self.apply_state(DisplayPatch::hide_all())?;
        self.record.export_arr.clear();
        self.recording.hide_recorder_widget();
        self.session = Some(session);
        self.awaiting_recording = self.config.do_recording;
        self.state = FrameState::Playing;
        Ok(())
    }

    /// Recorder notification. Ignored once the frame is gone.
    pub fn on_recording_started(&mut self, video_id: &str) {
        if self.torn_down {
            log::debug!("ignoring late recording start ({video_id}) after teardown");
            return;
        }
        self.record.video_id = video_id.to_string();
        if !self.record.video_list.iter().any(|v| v == video_id) {
            self.record.video_list.push(video_id.to_string());
        }
        self.awaiting_recording = false;
    }

    /// Per-frame entry point from the animation loop.
    pub fn tick(&mut self, now_ms: f64, pointer: Option<Point>) -> Result<TickReport, FrameError> {
        if self.torn_down || self.state != FrameState::Playing || self.awaiting_recording {
            return Ok(TickReport::Idle);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(TickReport::Idle);
        };
        match session.tick(now_ms, pointer) {
            Ok(SessionStatus::Running) => Ok(TickReport::Running),
            Ok(SessionStatus::Complete(summary)) => {
                self.finish_session();
                Ok(TickReport::Complete {
                    record: self.record.clone(),
                    summary,
                })
            }
            Err(err) => {
                // Keep what was captured before the failure.
                self.finish_session();
                Err(err)
            }
        }
    }

    /// External advance. Returns the record if a game was played.
    pub fn next(&mut self) -> Option<TrialRecord> {
        let played = self.session.is_some() || self.state == FrameState::Playing;
        self.finish_session();
        played.then(|| self.record.clone())
    }

    /// Stop everything; late notifications and ticks are ignored afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.session = None;
        self.awaiting_recording = false;
        self.torn_down = true;
        if std::mem::take(&mut self.recording_active) {
            self.recording.stop_recording();
        }
        self.fullscreen.exit_fullscreen();
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn finish_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            self.record.export_arr = session.flush_capture();
            log::info!(
                "trial record ready: {} samples, video {:?}",
                self.record.export_arr.len(),
                self.record.video_id
            );
        }
        self.awaiting_recording = false;
        self.state = FrameState::Done;
    }
}
