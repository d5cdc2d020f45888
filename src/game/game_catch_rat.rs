// Game 2: Catch the rat.
// A rat runs along the floor lane from one edge to the other. The paw follows
// the pointer freely; touching the rat catches it.
use rand::{Rng, RngCore};

use super::{Axis, Body, GameVariant, Paddle, TrialOutcome};
use crate::capture::Point;
use crate::config::GameKind;
use crate::error::FrameError;
use crate::surface::{Arena, Surface};

const RAT_RADIUS: f64 = 14.0;
const PAW_HALF: f64 = 22.0;

pub struct CatchRat {
    rat: Body,
    paw: Paddle,
    caught: u32,
    arena: Arena,
}

impl CatchRat {
    pub fn new(arena: Arena) -> Self {
        Self {
            rat: Body::new(
                Point::new(RAT_RADIUS, lane_y(arena)),
                Point::default(),
                RAT_RADIUS,
            ),
            paw: Paddle::new(
                Point::new(arena.width / 2.0, arena.height * 0.4),
                PAW_HALF,
                PAW_HALF,
            ),
            caught: 0,
            arena,
        }
    }

    pub fn caught(&self) -> u32 {
        self.caught
    }
}

fn lane_y(arena: Arena) -> f64 {
    arena.height * 0.75
}

impl GameVariant for CatchRat {
    fn kind(&self) -> GameKind {
        GameKind::CatchRat
    }

    fn start_trial(&mut self, arena: Arena, rng: &mut dyn RngCore) {
        self.arena = arena;
        let speed = rng.gen_range(0.25..0.4);
        let (x, vx) = if rng.gen_bool(0.5) {
            (RAT_RADIUS, speed)
        } else {
            (arena.width - RAT_RADIUS, -speed)
        };
        self.rat = Body::new(Point::new(x, lane_y(arena)), Point::new(vx, 0.0), RAT_RADIUS);
    }

    fn step(&mut self, arena: Arena, pointer: Option<Point>, dt_ms: f64) -> Option<TrialOutcome> {
        self.arena = arena;
        self.paw.follow(pointer, Axis::Both, arena);
        self.rat.advance(dt_ms);

        if self.paw.overlaps(&self.rat) {
            self.caught += 1;
            return Some(TrialOutcome::Caught);
        }
        let gone_right = self.rat.vel.x > 0.0 && self.rat.pos.x - self.rat.radius > arena.width;
        let gone_left = self.rat.vel.x < 0.0 && self.rat.pos.x + self.rat.radius < 0.0;
        (gone_right || gone_left).then_some(TrialOutcome::Escaped)
    }

    fn positions(&self) -> (Point, Point) {
        (self.rat.pos, self.paw.center)
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FrameError> {
        surface.clear("#3b2a1a")?;
        let lane = lane_y(self.arena);
        surface.fill_rect(0.0, lane + RAT_RADIUS, self.arena.width, 4.0, "#5c4430")?;
        surface.fill_circle(self.rat.pos.x, self.rat.pos.y, self.rat.radius, "#9c9c9c")?;
        self.paw.draw(surface, "#f4a261")?;
        surface.fill_text(&format!("Caught: {}", self.caught), 12.0, 24.0, "#ffffff")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paw_over_rat_catches_it() {
        let arena = Arena::new(800.0, 600.0);
        let mut game = CatchRat::new(arena);
        game.rat = Body::new(Point::new(300.0, lane_y(arena)), Point::new(0.3, 0.0), RAT_RADIUS);
        let out = game.step(arena, Some(Point::new(305.0, lane_y(arena))), 16.0);
        assert_eq!(out, Some(TrialOutcome::Caught));
        assert_eq!(game.caught(), 1);
    }

    #[test]
    fn rat_leaving_the_arena_escapes() {
        let arena = Arena::new(800.0, 600.0);
        let mut game = CatchRat::new(arena);
        game.rat = Body::new(Point::new(812.0, lane_y(arena)), Point::new(0.3, 0.0), RAT_RADIUS);
        let out = game.step(arena, Some(Point::new(100.0, 100.0)), 16.0);
        assert_eq!(out, Some(TrialOutcome::Escaped));
    }

    #[test]
    fn fresh_trial_starts_at_an_edge() {
        use rand::SeedableRng;
        let arena = Arena::new(800.0, 600.0);
        let mut game = CatchRat::new(arena);
        let mut rng = rand::rngs::SmallRng::seed_from_u64(3);
        for _ in 0..8 {
            game.start_trial(arena, &mut rng);
            let at_left = game.rat.pos.x == RAT_RADIUS && game.rat.vel.x > 0.0;
            let at_right = game.rat.pos.x == arena.width - RAT_RADIUS && game.rat.vel.x < 0.0;
            assert!(at_left || at_right);
        }
    }
}
