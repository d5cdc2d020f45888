//! Games frame parameters.
//!
//! Parsed from the per-frame JSON block. Unknown keys are ignored and
//! missing keys take the defaults below. The snake_case spellings
//! (`trials_number`, `trial_type`, `source_button`) are accepted as aliases.

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

pub const DEFAULT_TRIALS: u32 = 24;
pub const DEFAULT_MAX_TICKS_PER_TRIAL: u32 = 900;
pub const DEFAULT_SKIN_BASE_URL: &str = "https://piproject.s3.us-east-2.amazonaws.com/Resources/images/";

/// Whether the trial counts toward the study or is a warm-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialType {
    Demo,
    #[default]
    Intervention,
}

/// The fixed set of game variants, indexed by `gameType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameKind {
    NightSky,
    MonsterSlime,
    CatchRat,
    SpaceMechanic,
    BreakWall,
}

impl GameKind {
    pub const ALL: [GameKind; 5] = [
        GameKind::NightSky,
        GameKind::MonsterSlime,
        GameKind::CatchRat,
        GameKind::SpaceMechanic,
        GameKind::BreakWall,
    ];

    pub fn from_index(index: i64) -> Result<Self, FrameError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| {
                FrameError::invalid(format!(
                    "gameType {index} is outside the supported range 0..={}",
                    Self::ALL.len() - 1
                ))
            })
    }

    pub fn index(self) -> usize {
        match self {
            GameKind::NightSky => 0,
            GameKind::MonsterSlime => 1,
            GameKind::CatchRat => 2,
            GameKind::SpaceMechanic => 3,
            GameKind::BreakWall => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::NightSky => "Light the night sky",
            GameKind::MonsterSlime => "Monster slime",
            GameKind::CatchRat => "Catch the rat",
            GameKind::SpaceMechanic => "Space mechanic",
            GameKind::BreakWall => "Break the wall",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameConfig {
    #[serde(default)]
    pub game_type: i64,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub game_description: String,
    #[serde(default = "default_trials", alias = "trials_number")]
    pub trials_number: u32,
    #[serde(default, alias = "trial_type")]
    pub trial_type: TrialType,
    #[serde(default)]
    pub source: String,
    #[serde(default, alias = "source_button")]
    pub source_button: String,
    #[serde(default)]
    pub show_intro: bool,
    #[serde(default)]
    pub show_progress: bool,
    #[serde(default)]
    pub show_instructions: bool,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default = "default_true")]
    pub do_recording: bool,
    #[serde(default = "default_max_ticks")]
    pub max_ticks_per_trial: u32,
    #[serde(default = "default_skin_base")]
    pub skin_base_url: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_trials() -> u32 {
    DEFAULT_TRIALS
}
fn default_true() -> bool {
    true
}
fn default_max_ticks() -> u32 {
    DEFAULT_MAX_TICKS_PER_TRIAL
}
fn default_skin_base() -> String {
    DEFAULT_SKIN_BASE_URL.to_string()
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            game_type: 0,
            instructions: String::new(),
            game_description: String::new(),
            trials_number: DEFAULT_TRIALS,
            trial_type: TrialType::default(),
            source: String::new(),
            source_button: String::new(),
            show_intro: false,
            show_progress: false,
            show_instructions: false,
            fullscreen: false,
            do_recording: true,
            max_ticks_per_trial: DEFAULT_MAX_TICKS_PER_TRIAL,
            skin_base_url: default_skin_base(),
            seed: None,
        }
    }
}

impl FrameConfig {
    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        serde_json::from_str(json).map_err(|e| FrameError::invalid(e.to_string()))
    }

    pub fn game_kind(&self) -> Result<GameKind, FrameError> {
        GameKind::from_index(self.game_type)
    }

    /// Upper bound on samples a session of this frame can legitimately produce.
    pub fn capture_capacity(&self) -> usize {
        (self.trials_number as usize).saturating_mul(self.max_ticks_per_trial.max(1) as usize)
    }

    /// Checks everything that must hold before rendering starts.
    pub fn validate(&self) -> Result<GameKind, FrameError> {
        let kind = self.game_kind()?;
        let shown = [self.show_intro, self.show_progress, self.show_instructions]
            .iter()
            .filter(|b| **b)
            .count();
        if shown > 1 {
            return Err(FrameError::invalid(
                "showIntro, showProgress and showInstructions are mutually exclusive",
            ));
        }
        if self.max_ticks_per_trial == 0 {
            return Err(FrameError::invalid("maxTicksPerTrial must be at least 1"));
        }
        Ok(kind)
    }
}
