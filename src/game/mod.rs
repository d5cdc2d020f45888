//! Canvas mini-games played inside the games frame.
//!
//! A [`GameSession`] owns one [`GameVariant`] bound to a [`Surface`] and is
//! advanced once per animation frame. Every tick steps the variant's physics,
//! redraws, and appends one [`Sample`] to the session's [`CaptureBuffer`].
//!
//! Trials end when the variant reports an outcome or after
//! `maxTicksPerTrial` ticks. The session ends when the configured number of
//! trials is used up or the variant reports a session-level result.
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::capture::{CaptureBuffer, Point, Sample};
use crate::config::{FrameConfig, GameKind};
use crate::error::FrameError;
use crate::surface::{Arena, Surface};

// Variant definitions live in separate files:
mod game_break_wall;
mod game_catch_rat;
mod game_monster_slime;
mod game_night_sky;
mod game_space_mechanic;

pub use game_break_wall::BreakWall;
pub use game_catch_rat::CatchRat;
pub use game_monster_slime::MonsterSlime;
pub use game_night_sky::NightSky;
pub use game_space_mechanic::SpaceMechanic;

/// Longest simulated step; larger gaps (tab in background) are clamped so
/// entities do not tunnel through each other.
pub const MAX_STEP_MS: f64 = 50.0;

// --- Outcomes ----------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialOutcome {
    Hit,
    Miss,
    Dodged,
    Caught,
    Escaped,
    Repaired,
    /// No outcome within `maxTicksPerTrial` ticks.
    TimedOut,
}

/// Session-level result some variants reach before trials run out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialResult {
    pub index: u32,
    pub outcome: TrialOutcome,
    pub ticks: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub kind: GameKind,
    pub trials: Vec<TrialResult>,
    pub result: Option<GameResult>,
    pub ticks: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionStatus {
    Running,
    Complete(SessionSummary),
}

// --- Variant seam ------------------------------------------------------------

/// One game's rules. `result` is consulted only at trial boundaries.
pub trait GameVariant {
    fn kind(&self) -> GameKind;
    /// Reset per-trial entities (launch a new ball, respawn the rat, ...).
    fn start_trial(&mut self, arena: Arena, rng: &mut dyn RngCore);
    fn step(&mut self, arena: Arena, pointer: Option<Point>, dt_ms: f64) -> Option<TrialOutcome>;
    /// (ball, paddle): the free entity and the participant-controlled one.
    fn positions(&self) -> (Point, Point);
    fn result(&self) -> Option<GameResult> {
        None
    }
    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FrameError>;
}

pub fn new_variant(kind: GameKind, arena: Arena) -> Box<dyn GameVariant> {
    match kind {
        GameKind::NightSky => Box::new(NightSky::new(arena)),
        GameKind::MonsterSlime => Box::new(MonsterSlime::new(arena)),
        GameKind::CatchRat => Box::new(CatchRat::new(arena)),
        GameKind::SpaceMechanic => Box::new(SpaceMechanic::new(arena)),
        GameKind::BreakWall => Box::new(BreakWall::new(arena)),
    }
}

// --- Session -----------------------------------------------------------------

pub struct GameSession {
    surface: Box<dyn Surface>,
    variant: Box<dyn GameVariant>,
    capture: CaptureBuffer,
    rng: SmallRng,
    trials_number: u32,
    max_ticks_per_trial: u32,
    trial_ticks: u32,
    total_ticks: u64,
    results: Vec<TrialResult>,
    last_ts: Option<f64>,
    finished: bool,
}

impl GameSession {
    /// Starts a session for `game_type`; indices outside the known variants
    /// are rejected before anything is drawn.
    pub fn new(
        surface: Box<dyn Surface>,
        game_type: i64,
        config: &FrameConfig,
    ) -> Result<Self, FrameError> {
        let kind = GameKind::from_index(game_type)?;
        let variant = new_variant(kind, surface.arena());
        Ok(Self::with_variant(surface, variant, config))
    }

    pub fn with_variant(
        surface: Box<dyn Surface>,
        mut variant: Box<dyn GameVariant>,
        config: &FrameConfig,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        variant.start_trial(surface.arena(), &mut rng);
        log::info!(
            "session started: {} ({} trials)",
            variant.kind().title(),
            config.trials_number
        );
        Self {
            surface,
            variant,
            capture: CaptureBuffer::with_capacity(config.capture_capacity()),
            rng,
            trials_number: config.trials_number,
            max_ticks_per_trial: config.max_ticks_per_trial.max(1),
            trial_ticks: 0,
            total_ticks: 0,
            results: Vec::new(),
            last_ts: None,
            finished: false,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.variant.kind()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn capture(&self) -> &CaptureBuffer {
        &self.capture
    }

    pub fn flush_capture(&mut self) -> Vec<Sample> {
        self.capture.flush()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            kind: self.variant.kind(),
            trials: self.results.clone(),
            result: self.variant.result(),
            ticks: self.total_ticks,
        }
    }

    /// Advance one animation frame. A failed redraw finishes the session.
    pub fn tick(&mut self, now_ms: f64, pointer: Option<Point>) -> Result<SessionStatus, FrameError> {
        if self.finished {
            return Ok(SessionStatus::Complete(self.summary()));
        }
        if self.trials_number == 0 {
            self.finished = true;
            return Ok(SessionStatus::Complete(self.summary()));
        }

        // High-res timestamps can jitter backwards across frames; keep samples ordered.
        let now = self.last_ts.map_or(now_ms, |prev| now_ms.max(prev));
        let dt = self.last_ts.map_or(0.0, |prev| (now - prev).min(MAX_STEP_MS));
        self.last_ts = Some(now);

        let arena = self.surface.arena();
        self.trial_ticks += 1;
        self.total_ticks += 1;

        let outcome = self.variant.step(arena, pointer, dt).or_else(|| {
            (self.trial_ticks >= self.max_ticks_per_trial).then_some(TrialOutcome::TimedOut)
        });

        if let Err(err) = self.variant.draw(self.surface.as_mut()) {
            log::error!("session aborted on tick {}: {}", self.total_ticks, err);
            self.finished = true;
            return Err(err);
        }

        let (ball, paddle) = self.variant.positions();
        self.capture.append(Sample {
            ball_position: ball,
            paddle_position: paddle,
            timestamp_millis: now,
        });

        if let Some(outcome) = outcome {
            let index = self.results.len() as u32;
            log::debug!("trial {index} ended: {outcome:?} after {} ticks", self.trial_ticks);
            self.results.push(TrialResult {
                index,
                outcome,
                ticks: self.trial_ticks,
            });
            self.trial_ticks = 0;

            let result = self.variant.result();
            if self.results.len() >= self.trials_number as usize || result.is_some() {
                self.finished = true;
                log::info!(
                    "session finished: {} trials, result {:?}, {} samples",
                    self.results.len(),
                    result,
                    self.capture.len()
                );
                return Ok(SessionStatus::Complete(self.summary()));
            }
            self.variant.start_trial(arena, &mut self.rng);
        }
        Ok(SessionStatus::Running)
    }
}

// --- Shared physics ----------------------------------------------------------

/// A moving circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Body {
    pub pos: Point,
    pub vel: Point,
    pub radius: f64,
}

impl Body {
    pub fn new(pos: Point, vel: Point, radius: f64) -> Self {
        Self { pos, vel, radius }
    }

    pub fn advance(&mut self, dt_ms: f64) {
        self.pos.x += self.vel.x * dt_ms;
        self.pos.y += self.vel.y * dt_ms;
    }

    /// Reflect off the left/right edges. Returns true if a bounce happened.
    pub fn bounce_sides(&mut self, arena: Arena) -> bool {
        if self.pos.x - self.radius < 0.0 && self.vel.x < 0.0 {
            self.pos.x = self.radius;
            self.vel.x = -self.vel.x;
            true
        } else if self.pos.x + self.radius > arena.width && self.vel.x > 0.0 {
            self.pos.x = arena.width - self.radius;
            self.vel.x = -self.vel.x;
            true
        } else {
            false
        }
    }

    /// Reflect off the top/bottom edges.
    pub fn bounce_top_bottom(&mut self, arena: Arena) -> bool {
        if self.pos.y - self.radius < 0.0 && self.vel.y < 0.0 {
            self.pos.y = self.radius;
            self.vel.y = -self.vel.y;
            true
        } else if self.pos.y + self.radius > arena.height && self.vel.y > 0.0 {
            self.pos.y = arena.height - self.radius;
            self.vel.y = -self.vel.y;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
    Both,
}

/// Axis-aligned rectangle described by its center, used for paddles and bricks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Paddle {
    pub center: Point,
    pub half_w: f64,
    pub half_h: f64,
}

impl Paddle {
    pub fn new(center: Point, half_w: f64, half_h: f64) -> Self {
        Self {
            center,
            half_w,
            half_h,
        }
    }

    /// Move toward the pointer along `axis`, kept fully inside the arena.
    pub fn follow(&mut self, pointer: Option<Point>, axis: Axis, arena: Arena) {
        let Some(p) = pointer else { return };
        if matches!(axis, Axis::X | Axis::Both) {
            self.center.x = clamp_span(p.x, self.half_w, arena.width);
        }
        if matches!(axis, Axis::Y | Axis::Both) {
            self.center.y = clamp_span(p.y, self.half_h, arena.height);
        }
    }

    pub fn overlaps(&self, body: &Body) -> bool {
        let nx = body
            .pos
            .x
            .clamp(self.center.x - self.half_w, self.center.x + self.half_w);
        let ny = body
            .pos
            .y
            .clamp(self.center.y - self.half_h, self.center.y + self.half_h);
        let dx = body.pos.x - nx;
        let dy = body.pos.y - ny;
        dx * dx + dy * dy <= body.radius * body.radius
    }

    pub fn draw(&self, surface: &mut dyn Surface, color: &str) -> Result<(), FrameError> {
        surface.fill_rect(
            self.center.x - self.half_w,
            self.center.y - self.half_h,
            self.half_w * 2.0,
            self.half_h * 2.0,
            color,
        )
    }
}

fn clamp_span(v: f64, half: f64, extent: f64) -> f64 {
    if extent <= half * 2.0 {
        extent / 2.0
    } else {
        v.clamp(half, extent - half)
    }
}
