// Integration tests (native) for the `exp-games` crate.
// Everything here goes through the public API with an in-memory surface, so
// the tests run under `cargo test` on the host without a browser.

use std::cell::RefCell;
use std::rc::Rc;

use exp_games::frame::{DisplayPatch, TickReport};
use exp_games::game::TrialOutcome;
use exp_games::skin::SkinTable;
use exp_games::{
    Arena, FrameConfig, FrameController, FrameError, FrameState, FullscreenController, GameKind,
    GameSession, GameVariant, Point, RecordingController, SessionStatus, Surface,
};
use rand::RngCore;

// --- Fakes -------------------------------------------------------------------

struct MemorySurface {
    arena: Arena,
    draws: Rc<RefCell<u32>>,
}

impl MemorySurface {
    fn boxed(draws: Rc<RefCell<u32>>) -> Box<dyn Surface> {
        Box::new(Self {
            arena: Arena::new(800.0, 600.0),
            draws,
        })
    }
}

impl Surface for MemorySurface {
    fn arena(&self) -> Arena {
        self.arena
    }
    fn clear(&mut self, _color: &str) -> Result<(), FrameError> {
        *self.draws.borrow_mut() += 1;
        Ok(())
    }
    fn fill_rect(&mut self, _: f64, _: f64, _: f64, _: f64, _: &str) -> Result<(), FrameError> {
        Ok(())
    }
    fn fill_circle(&mut self, _: f64, _: f64, _: f64, _: &str) -> Result<(), FrameError> {
        Ok(())
    }
    fn fill_text(&mut self, _: &str, _: f64, _: f64, _: &str) -> Result<(), FrameError> {
        Ok(())
    }
}

/// A game where nothing ever happens; trials only end by timing out.
struct Idle;

impl GameVariant for Idle {
    fn kind(&self) -> GameKind {
        GameKind::CatchRat
    }
    fn start_trial(&mut self, _arena: Arena, _rng: &mut dyn RngCore) {}
    fn step(&mut self, _: Arena, _: Option<Point>, _: f64) -> Option<TrialOutcome> {
        None
    }
    fn positions(&self) -> (Point, Point) {
        (Point::new(1.0, 2.0), Point::new(3.0, 4.0))
    }
    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FrameError> {
        surface.clear("black")
    }
}

struct NoFullscreen;

impl FullscreenController for NoFullscreen {
    fn request_fullscreen(&mut self) {}
    fn exit_fullscreen(&mut self) {}
}

struct Recorder {
    started: Rc<RefCell<u32>>,
}

impl RecordingController for Recorder {
    fn start_recording(&mut self) -> Result<(), FrameError> {
        *self.started.borrow_mut() += 1;
        Ok(())
    }
    fn hide_recorder_widget(&mut self) {}
    fn stop_recording(&mut self) {}
}

fn config(json: &str) -> FrameConfig {
    FrameConfig::from_json(json).unwrap()
}

fn controller(cfg: FrameConfig) -> Result<FrameController, FrameError> {
    FrameController::new(
        cfg,
        Box::new(NoFullscreen),
        Box::new(Recorder {
            started: Rc::new(RefCell::new(0)),
        }),
    )
}

// --- Session -----------------------------------------------------------------

#[test]
fn three_timed_out_trials_complete_after_three_ticks() {
    let cfg = config(r#"{"gameType": 2, "trialsNumber": 3, "maxTicksPerTrial": 1}"#);
    let draws = Rc::new(RefCell::new(0));
    let mut session = GameSession::with_variant(MemorySurface::boxed(draws.clone()), Box::new(Idle), &cfg);

    assert_eq!(session.tick(0.0, None).unwrap(), SessionStatus::Running);
    assert_eq!(session.tick(16.0, None).unwrap(), SessionStatus::Running);
    let SessionStatus::Complete(summary) = session.tick(32.0, None).unwrap() else {
        panic!("session should be complete after the third trial");
    };
    assert_eq!(summary.trials.len(), 3);
    assert!(summary.trials.iter().all(|t| t.outcome == TrialOutcome::TimedOut));
    assert_eq!(*draws.borrow(), 3);

    let samples = session.flush_capture();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].ball_position, Point::new(1.0, 2.0));
    assert_eq!(samples[2].timestamp_millis, 32.0);
    assert!(session.flush_capture().is_empty());
}

#[test]
fn unknown_game_type_is_rejected() {
    let cfg = config(r#"{"gameType": 7}"#);
    let draws = Rc::new(RefCell::new(0));
    let err = GameSession::new(MemorySurface::boxed(draws.clone()), 7, &cfg).err();
    assert!(matches!(err, Some(FrameError::InvalidConfiguration(_))));
    assert!(matches!(controller(cfg), Err(FrameError::InvalidConfiguration(_))));
    assert_eq!(*draws.borrow(), 0);
}

#[test]
fn every_game_type_gets_its_session_and_skin() {
    let table = SkinTable::new("https://img.example/");
    for (index, kind) in GameKind::ALL.iter().enumerate() {
        let cfg = config(&format!(r#"{{"gameType": {index}, "seed": 7}}"#));
        let session = GameSession::new(MemorySurface::boxed(Rc::new(RefCell::new(0))), index as i64, &cfg).unwrap();
        assert_eq!(session.kind(), *kind);
        let skin = table.get(*kind).unwrap();
        assert_eq!(skin.button_class, format!("button button-{}", index + 1));
    }
}

// --- Frame lifecycle ---------------------------------------------------------

#[test]
fn recorded_game_runs_to_a_trial_record() {
    let cfg = config(
        r#"{"gameType": 0, "trialsNumber": 2, "maxTicksPerTrial": 5, "showIntro": true, "seed": 42}"#,
    );
    let started = Rc::new(RefCell::new(0));
    let mut ctl = FrameController::new(
        cfg,
        Box::new(NoFullscreen),
        Box::new(Recorder {
            started: started.clone(),
        }),
    )
    .unwrap();
    assert_eq!(ctl.state(), FrameState::Intro);
    assert!(ctl.display().show_intro);

    ctl.play(MemorySurface::boxed(Rc::new(RefCell::new(0)))).unwrap();
    assert_eq!(*started.borrow(), 1);
    assert!(!ctl.display().show_intro);
    assert_eq!(ctl.tick(0.0, None).unwrap(), TickReport::Idle);

    ctl.on_recording_started("video-1");
    let mut now = 0.0;
    let record = loop {
        now += 16.0;
        match ctl.tick(now, Some(Point::new(400.0, 550.0))).unwrap() {
            TickReport::Complete { record, .. } => break record,
            TickReport::Running => assert!(now < 1_000.0, "session never completed"),
            TickReport::Idle => panic!("idle while playing"),
        }
    };
    assert_eq!(ctl.state(), FrameState::Done);
    assert_eq!(record.video_id, "video-1");
    assert_eq!(record.video_list, vec!["video-1".to_string()]);
    assert!((2..=10).contains(&record.export_arr.len()));
    assert!(
        record
            .export_arr
            .windows(2)
            .all(|w| w[0].timestamp_millis <= w[1].timestamp_millis)
    );
}

#[test]
fn conflicting_display_patch_is_rejected() {
    let mut ctl = controller(config(r#"{"gameType": 1, "showProgress": true}"#)).unwrap();
    let patch = DisplayPatch {
        show_intro: Some(true),
        ..DisplayPatch::default()
    };
    assert!(ctl.apply_state(patch).is_err());
    assert!(ctl.display().show_progress);
    assert!(!ctl.display().show_intro);
}

#[test]
fn teardown_stops_everything() {
    let mut ctl = controller(config(r#"{"gameType": 4, "doRecording": false}"#)).unwrap();
    ctl.play(MemorySurface::boxed(Rc::new(RefCell::new(0)))).unwrap();
    assert_eq!(ctl.tick(0.0, None).unwrap(), TickReport::Running);
    ctl.teardown();
    ctl.on_recording_started("late");
    assert_eq!(ctl.tick(16.0, None).unwrap(), TickReport::Idle);
    assert!(ctl.record().video_id.is_empty());
}
