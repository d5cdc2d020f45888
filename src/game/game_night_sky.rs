// Game 0: Light the night sky.
// The paddle sits on the left edge and follows the pointer vertically. A comet
// enters from the right and bounces off the top and bottom edges; catching it
// lights a star, letting it pass the left edge is a miss.
use rand::{Rng, RngCore};

use super::{Axis, Body, GameResult, GameVariant, Paddle, TrialOutcome};
use crate::capture::Point;
use crate::config::GameKind;
use crate::error::FrameError;
use crate::surface::{Arena, Surface};

pub const STAR_COUNT: u32 = 10;
const COMET_RADIUS: f64 = 10.0;

pub struct NightSky {
    comet: Body,
    paddle: Paddle,
    stars_lit: u32,
    arena: Arena,
}

impl NightSky {
    pub fn new(arena: Arena) -> Self {
        Self {
            comet: Body::new(
                Point::new(arena.width - COMET_RADIUS, arena.height / 2.0),
                Point::default(),
                COMET_RADIUS,
            ),
            paddle: Paddle::new(
                Point::new(arena.width * 0.06, arena.height / 2.0),
                8.0,
                arena.height * 0.09,
            ),
            stars_lit: 0,
            arena,
        }
    }

    pub fn stars_lit(&self) -> u32 {
        self.stars_lit
    }
}

impl GameVariant for NightSky {
    fn kind(&self) -> GameKind {
        GameKind::NightSky
    }

    fn start_trial(&mut self, arena: Arena, rng: &mut dyn RngCore) {
        self.arena = arena;
        let vy = rng.gen_range(0.1..0.3) * if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.comet = Body::new(
            Point::new(
                arena.width - COMET_RADIUS,
                rng.gen_range(arena.height * 0.2..=arena.height * 0.8),
            ),
            Point::new(-rng.gen_range(0.35..0.5), vy),
            COMET_RADIUS,
        );
    }

    fn step(&mut self, arena: Arena, pointer: Option<Point>, dt_ms: f64) -> Option<TrialOutcome> {
        self.arena = arena;
        self.paddle.follow(pointer, Axis::Y, arena);
        self.comet.advance(dt_ms);
        self.comet.bounce_top_bottom(arena);

        if self.comet.vel.x < 0.0 && self.paddle.overlaps(&self.comet) {
            self.stars_lit = (self.stars_lit + 1).min(STAR_COUNT);
            return Some(TrialOutcome::Hit);
        }
        if self.comet.pos.x + self.comet.radius < 0.0 {
            return Some(TrialOutcome::Miss);
        }
        None
    }

    fn positions(&self) -> (Point, Point) {
        (self.comet.pos, self.paddle.center)
    }

    fn result(&self) -> Option<GameResult> {
        (self.stars_lit >= STAR_COUNT).then_some(GameResult::Won)
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FrameError> {
        surface.clear("#0b1030")?;
        // Star row across the top; lit stars glow.
        let gap = self.arena.width / (STAR_COUNT as f64 + 1.0);
        for i in 0..STAR_COUNT {
            let color = if i < self.stars_lit { "#ffe680" } else { "#333a5c" };
            surface.fill_circle(gap * (i as f64 + 1.0), self.arena.height * 0.07, 6.0, color)?;
        }
        self.paddle.draw(surface, "#9ad0ff")?;
        surface.fill_circle(self.comet.pos.x, self.comet.pos.y, self.comet.radius, "#fff3b0")
    }
}
