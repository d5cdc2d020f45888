//! Experiment frames for an online research platform.
//!
//! Two frames are exported to JS: [`GamesFrame`], a canvas mini-game whose
//! entity positions are captured every animation frame and uploaded as a
//! trial record, and [`StoryFrame`], an image page with a sequence of audio
//! clips. Both are configured from the frame's JSON block.
//!
//! Everything outside `web` is plain Rust and is tested natively.

use wasm_bindgen::prelude::*;

pub mod assets;
pub mod capture;
pub mod config;
pub mod error;
pub mod frame;
pub mod game;
pub mod skin;
pub mod story;
pub mod surface;
mod web;

pub use capture::{CaptureBuffer, Point, Sample, TrialRecord};
pub use config::{FrameConfig, GameKind, TrialType};
pub use error::FrameError;
pub use frame::{FrameController, FrameState, FullscreenController, RecordingController};
pub use game::{GameSession, GameVariant, SessionStatus};
pub use surface::{Arena, Surface};
pub use web::{CanvasSurface, GamesFrame, StoryFrame};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Fails only if the host bundle already installed a logger.
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Info);
}
