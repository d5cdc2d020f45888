//! Progress-page skins: which arcade machines, arrows and exit sign are lit
//! before each game, plus the CSS class positioning the start button.

use std::collections::HashMap;

use crate::config::GameKind;
use crate::error::FrameError;

pub const MACHINE_COUNT: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkinAssets {
    pub button_class: String,
    pub machine_urls: [String; MACHINE_COUNT],
    pub arrow_urls: [String; MACHINE_COUNT],
    pub exit_url: String,
}

impl SkinAssets {
    /// Skin shown before game `index` (0-based): machines up to and including
    /// this game are lit, arrows are lit for every game already played, and
    /// the exit sign lights up before the last game.
    fn for_game(base: &str, index: usize) -> Self {
        let machine = |k: usize| {
            if k <= index + 1 {
                format!("{base}arcade_machine{k}.png")
            } else {
                format!("{base}arcade_machine{k}_off.png")
            }
        };
        let arrow = |k: usize| {
            let state = if k <= index { "on" } else { "off" };
            format!("{base}arrow{k}_{state}.png")
        };
        let exit = if index + 1 == MACHINE_COUNT { "on" } else { "off" };
        Self {
            button_class: format!("button button-{}", index + 1),
            machine_urls: std::array::from_fn(|i| machine(i + 1)),
            arrow_urls: std::array::from_fn(|i| arrow(i + 1)),
            exit_url: format!("{base}exit_{exit}.png"),
        }
    }
}

pub struct SkinTable {
    skins: HashMap<GameKind, SkinAssets>,
}

impl SkinTable {
    pub fn new(base_url: &str) -> Self {
        let skins = GameKind::ALL
            .iter()
            .map(|kind| (*kind, SkinAssets::for_game(base_url, kind.index())))
            .collect();
        Self { skins }
    }

    pub fn get(&self, kind: GameKind) -> Option<&SkinAssets> {
        self.skins.get(&kind)
    }

    pub fn lookup(&self, game_type: i64) -> Result<&SkinAssets, FrameError> {
        let kind = GameKind::from_index(game_type)?;
        self.get(kind)
            .ok_or_else(|| FrameError::invalid(format!("no progress skin for {}", kind.title())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SKIN_BASE_URL;

    #[test]
    fn first_game_lights_only_first_machine() {
        let table = SkinTable::new("base/");
        let skin = table.lookup(0).unwrap();
        assert_eq!(skin.button_class, "button button-1");
        assert_eq!(skin.machine_urls[0], "base/arcade_machine1.png");
        assert_eq!(skin.machine_urls[1], "base/arcade_machine2_off.png");
        assert!(skin.arrow_urls.iter().all(|u| u.ends_with("_off.png")));
        assert_eq!(skin.exit_url, "base/exit_off.png");
    }

    #[test]
    fn last_game_lights_everything_but_last_arrow() {
        let table = SkinTable::new(DEFAULT_SKIN_BASE_URL);
        let skin = table.get(GameKind::BreakWall).unwrap();
        assert_eq!(skin.button_class, "button button-5");
        assert!(skin.machine_urls.iter().all(|u| !u.ends_with("_off.png")));
        assert!(skin.arrow_urls[3].ends_with("arrow4_on.png"));
        assert!(skin.arrow_urls[4].ends_with("arrow5_off.png"));
        assert!(skin.exit_url.ends_with("exit_on.png"));
    }

    #[test]
    fn middle_game_pattern() {
        let table = SkinTable::new("");
        let skin = table.lookup(2).unwrap();
        assert_eq!(skin.machine_urls[2], "arcade_machine3.png");
        assert_eq!(skin.machine_urls[3], "arcade_machine4_off.png");
        assert_eq!(skin.arrow_urls[1], "arrow2_on.png");
        assert_eq!(skin.arrow_urls[2], "arrow3_off.png");
    }

    #[test]
    fn out_of_range_is_an_error() {
        let table = SkinTable::new("");
        assert!(matches!(
            table.lookup(7),
            Err(FrameError::InvalidConfiguration(_))
        ));
    }
}
