// Drawing seam between game logic and the canvas. The browser implementation
// lives in `web::CanvasSurface`; tests supply their own.

use crate::error::FrameError;

/// Drawable area in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub trait Surface {
    fn arena(&self) -> Arena;
    fn clear(&mut self, color: &str) -> Result<(), FrameError>;
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) -> Result<(), FrameError>;
    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str) -> Result<(), FrameError>;
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str) -> Result<(), FrameError>;
}
