// Game 4: Break the wall.
// Breakout with one shot per trial: the ball is launched from the paddle and
// the trial ends when it breaks a brick (hit) or falls past the paddle (miss).
// Clearing the whole wall wins the game.
use rand::{Rng, RngCore};

use super::{Axis, Body, GameResult, GameVariant, Paddle, TrialOutcome};
use crate::capture::Point;
use crate::config::GameKind;
use crate::error::FrameError;
use crate::surface::{Arena, Surface};

pub const BRICK_COLS: usize = 8;
pub const BRICK_ROWS: usize = 3;
const BALL_RADIUS: f64 = 8.0;
const LAUNCH_SPEED_Y: f64 = 0.35;

pub struct BreakWall {
    ball: Body,
    paddle: Paddle,
    /// Remaining bricks; laid out once from the arena at construction.
    bricks: Vec<Paddle>,
}

impl BreakWall {
    pub fn new(arena: Arena) -> Self {
        let brick_w = arena.width / BRICK_COLS as f64;
        let brick_h = arena.height * 0.05;
        let top = arena.height * 0.08;
        let mut bricks = Vec::with_capacity(BRICK_COLS * BRICK_ROWS);
        for row in 0..BRICK_ROWS {
            for col in 0..BRICK_COLS {
                bricks.push(Paddle::new(
                    Point::new(
                        brick_w * (col as f64 + 0.5),
                        top + brick_h * (row as f64 + 0.5),
                    ),
                    brick_w / 2.0 - 2.0,
                    brick_h / 2.0 - 2.0,
                ));
            }
        }
        let paddle = Paddle::new(
            Point::new(arena.width / 2.0, arena.height * 0.94),
            arena.width * 0.08,
            8.0,
        );
        Self {
            ball: Body::new(paddle.center, Point::default(), BALL_RADIUS),
            paddle,
            bricks,
        }
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.len()
    }
}

impl GameVariant for BreakWall {
    fn kind(&self) -> GameKind {
        GameKind::BreakWall
    }

    fn start_trial(&mut self, _arena: Arena, rng: &mut dyn RngCore) {
        let vx = rng.gen_range(0.15..0.25) * if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.ball = Body::new(
            Point::new(
                self.paddle.center.x,
                self.paddle.center.y - self.paddle.half_h - BALL_RADIUS - 1.0,
            ),
            Point::new(vx, -LAUNCH_SPEED_Y),
            BALL_RADIUS,
        );
    }

    fn step(&mut self, arena: Arena, pointer: Option<Point>, dt_ms: f64) -> Option<TrialOutcome> {
        self.paddle.follow(pointer, Axis::X, arena);
        self.ball.advance(dt_ms);
        self.ball.bounce_sides(arena);
        if self.ball.pos.y - self.ball.radius < 0.0 && self.ball.vel.y < 0.0 {
            self.ball.pos.y = self.ball.radius;
            self.ball.vel.y = -self.ball.vel.y;
        }

        if self.ball.vel.y > 0.0 && self.paddle.overlaps(&self.ball) {
            // Off-center hits steer the ball.
            let offset = (self.ball.pos.x - self.paddle.center.x) / self.paddle.half_w;
            self.ball.vel.y = -self.ball.vel.y.abs();
            self.ball.vel.x += offset * 0.1;
        }

        if let Some(i) = self.bricks.iter().position(|b| b.overlaps(&self.ball)) {
            self.bricks.swap_remove(i);
            return Some(TrialOutcome::Hit);
        }
        (self.ball.pos.y - self.ball.radius > arena.height).then_some(TrialOutcome::Miss)
    }

    fn positions(&self) -> (Point, Point) {
        (self.ball.pos, self.paddle.center)
    }

    fn result(&self) -> Option<GameResult> {
        self.bricks.is_empty().then_some(GameResult::Won)
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FrameError> {
        surface.clear("#14141c")?;
        for brick in &self.bricks {
            brick.draw(surface, "#d1495b")?;
        }
        self.paddle.draw(surface, "#edae49")?;
        surface.fill_circle(self.ball.pos.x, self.ball.pos.y, self.ball.radius, "#ffffff")
    }
}
