// Game 3: Space mechanic.
// A broken part drifts around and bounces off every edge. Holding the wrench
// on it for REPAIR_TICKS consecutive ticks repairs it. There is no way to lose.
use rand::{Rng, RngCore};

use super::{Axis, Body, GameVariant, Paddle, TrialOutcome};
use crate::capture::Point;
use crate::config::GameKind;
use crate::error::FrameError;
use crate::surface::{Arena, Surface};

pub const REPAIR_TICKS: u32 = 30;
const PART_RADIUS: f64 = 20.0;

pub struct SpaceMechanic {
    part: Body,
    wrench: Paddle,
    contact_ticks: u32,
}

impl SpaceMechanic {
    pub fn new(arena: Arena) -> Self {
        Self {
            part: Body::new(
                Point::new(arena.width * 0.25, arena.height * 0.25),
                Point::default(),
                PART_RADIUS,
            ),
            wrench: Paddle::new(
                Point::new(arena.width / 2.0, arena.height * 0.85),
                18.0,
                18.0,
            ),
            contact_ticks: 0,
        }
    }

    pub fn repair_progress(&self) -> f64 {
        self.contact_ticks as f64 / REPAIR_TICKS as f64
    }
}

impl GameVariant for SpaceMechanic {
    fn kind(&self) -> GameKind {
        GameKind::SpaceMechanic
    }

    fn start_trial(&mut self, arena: Arena, rng: &mut dyn RngCore) {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = rng.gen_range(0.15..0.25);
        let x = rng.gen_range(0.2..0.8) * arena.width;
        let y = rng.gen_range(0.2..0.5) * arena.height;
        self.part = Body::new(
            Point::new(x, y),
            Point::new(angle.cos() * speed, angle.sin() * speed),
            PART_RADIUS,
        );
        self.contact_ticks = 0;
    }

    fn step(&mut self, arena: Arena, pointer: Option<Point>, dt_ms: f64) -> Option<TrialOutcome> {
        self.wrench.follow(pointer, Axis::Both, arena);
        self.part.advance(dt_ms);
        self.part.bounce_sides(arena);
        self.part.bounce_top_bottom(arena);

        if self.wrench.overlaps(&self.part) {
            self.contact_ticks += 1;
        } else {
            self.contact_ticks = 0;
        }
        (self.contact_ticks >= REPAIR_TICKS).then_some(TrialOutcome::Repaired)
    }

    fn positions(&self) -> (Point, Point) {
        (self.part.pos, self.wrench.center)
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), FrameError> {
        surface.clear("#05060f")?;
        // Part warms from grey to orange while it is being repaired.
        let heat = (self.repair_progress().clamp(0.0, 1.0) * 255.0) as u8;
        let color = format!("rgb({},{},{})", 120u8.max(heat), 120, 120u8.saturating_sub(heat / 2));
        surface.fill_circle(self.part.pos.x, self.part.pos.y, self.part.radius, &color)?;
        self.wrench.draw(surface, "#c0c8d8")
    }
}
