//! Client side of the adventure game: talks to the host platform through
//! [`host_bridge`], to the game server through [`api`], and keeps the screens
//! in order through [`navigation`].

pub mod api;
pub mod app;
pub mod navigation;
pub mod view;

pub use api::{ApiFailure, GameApi, HttpGameApi, TurnOutcome, DEFAULT_API_URL};
pub use app::{
    AppEvent, AppSettings, CharacterForm, Completion, GameApp, GameState, RemoteRequest, UiAction,
};
pub use navigation::{
    chrome_for, ChromeConfig, NavigationController, NavigationState, ScreenSurface,
};
pub use view::View;
