// Game 1: Monster slime.
// The player walks along the bottom following the pointer horizontally while a
// slime blob falls with some sideways drift. Getting touched costs a life.
use rand::{Rng, RngCore};

use super::{Axis, Body, GameResult, GameVariant, Paddle, TrialOutcome};
use crate::capture::Point;
use crate::config::GameKind;
use crate::error::FrameError;
use crate::surface::{Arena, Surface};

pub const MAX_HITS: u32 = 3;
const SLIME_RADIUS: f64 = 18.0;

pub struct MonsterSlime {
    slime: Body,
    player: Paddle,
    hits: u32,
}

impl MonsterSlime {
    pub fn new(arena: Arena) -> Self {
        Self {
            slime: Body::new(
                Point::new(arena.width / 2.0, SLIME_RADIUS),
                Point::default(),
                SLIME_RADIUS,
            ),
            player: Paddle::new(
                Point::new(arena.width / 2.0, arena.height * 0.92),
                arena.width * 0.07,
                12.0,
            ),
            hits: 0,
        }
    }

    pub fn lives(&self) -> u32 {
        MAX_HITS.saturating_sub(self.hits)
    }
}

impl GameVariant for MonsterSlime {
    fn kind(&self) -> GameKind {
        GameKind::MonsterSlime
    }

    fn start_trial(&mut self, arena: Arena, rng: &mut dyn RngCore) {
        let x = if arena.width > SLIME_RADIUS * 2.0 {
            rng.gen_range(SLIME_RADIUS..arena.width - SLIME_RADIUS)
        } else {
            arena.width / 2.0
        };
        self.slime = Body::new(
            Point::new(x, SLIME_RADIUS),
            Point::new(rng.gen_range(-0.15..0.15), rng.gen_range(0.2..0.32)),
            SLIME_RADIUS,
        );
    }

    fn step(&mut self, arena: Arena, pointer: Option<Point>, dt_ms: f64) -> Option<TrialOutcome> {
        self.player.follow(pointer, Axis::X, arena);
        self.slime.advance(dt_ms);
        self.slime.bounce_sides(arena);

        if self.player.overlaps(&self.slime) {
            self.hits += 1;
            return Some(TrialOutcome::Hit);
        }
        if self.slime.pos.y - self.slime.radius > arena.height {
            return Some(TrialOutcome::Dodged);
        }
        None
    }

    fn positions(&self) -> (Point, Point) {
        (self.slime.pos, self.player.center)
    }

    fn result(&self) -> Option<GameResult> {
        (self.hits >= MAX_HITS).then_some(GameResult::Lost)
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FrameError> {
        surface.clear("#1d2b1f")?;
        surface.fill_circle(self.slime.pos.x, self.slime.pos.y, self.slime.radius, "#6fdc5a")?;
        self.player.draw(surface, "#f2c14e")?;
        surface.fill_text(&format!("Lives: {}", self.lives()), 12.0, 24.0, "#ffffff")
    }
}
