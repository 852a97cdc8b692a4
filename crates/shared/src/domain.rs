use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(CharacterId);
id_newtype!(SessionId);

pub const MAX_HOPE: i32 = 10;
pub const MAX_FEAR: i32 = 10;

/// Width of a hope/fear meter in percent, clamped to `0..=100`.
pub fn meter_percent(value: i32, max: i32) -> u8 {
    if max <= 0 {
        return 0;
    }
    let percent = (i64::from(value) * 100) / i64::from(max);
    percent.clamp(0, 100) as u8
}

/// Every full-viewport state the client can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Loading,
    MainMenu,
    CharacterCreation,
    GameScreen,
    Error,
}

impl Screen {
    /// Where `go_back` lands when there is nothing left to pop.
    pub const DEFAULT: Screen = Screen::MainMenu;

    pub const ALL: [Screen; 5] = [
        Screen::Loading,
        Screen::MainMenu,
        Screen::CharacterCreation,
        Screen::GameScreen,
        Screen::Error,
    ];

    pub fn dom_id(self) -> &'static str {
        match self {
            Screen::Loading => "loading-screen",
            Screen::MainMenu => "main-menu",
            Screen::CharacterCreation => "character-creation",
            Screen::GameScreen => "game-screen",
            Screen::Error => "error-screen",
        }
    }

    pub fn from_dom_id(id: &str) -> Option<Screen> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.dom_id() == id.trim())
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_id())
    }
}
