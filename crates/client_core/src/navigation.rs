//! Screen navigation: which screen is active, the back-stack, and keeping the
//! host's chrome (main/back buttons) in step with the active screen.

use std::sync::Arc;

use host_bridge::{HostBridge, DEFAULT_MAIN_BUTTON_LABEL};
use shared::domain::Screen;
use tracing::debug;

/// Which optional host buttons a screen wants visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChromeConfig {
    pub main_button: bool,
    pub back_button: bool,
}

pub fn chrome_for(screen: Screen) -> ChromeConfig {
    match screen {
        Screen::CharacterCreation | Screen::GameScreen => ChromeConfig {
            main_button: false,
            back_button: true,
        },
        Screen::Loading | Screen::MainMenu | Screen::Error => ChromeConfig::default(),
    }
}

/// Whatever actually draws screens.
pub trait ScreenSurface {
    /// Makes `screen` the only visible screen. Returns `false` when the screen
    /// has nothing to present it, in which case nothing changed.
    fn activate(&mut self, screen: Screen) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current: Screen,
    pub history: Vec<Screen>,
}

pub struct NavigationController {
    state: NavigationState,
    bridge: Arc<HostBridge>,
}

impl NavigationController {
    pub fn new(initial: Screen, bridge: Arc<HostBridge>) -> Self {
        Self {
            state: NavigationState {
                current: initial,
                history: Vec::new(),
            },
            bridge,
        }
    }

    pub fn current(&self) -> Screen {
        self.state.current
    }

    pub fn history(&self) -> &[Screen] {
        &self.state.history
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Shows `screen`, remembering the one being left.
    ///
    /// Every successful call grows the history by one, including a call for
    /// the screen already shown. Callers that must not stack a screen on
    /// itself check [`current`](Self::current) first.
    pub fn go_to(&mut self, screen: Screen, surface: &mut dyn ScreenSurface) -> bool {
        if !surface.activate(screen) {
            debug!(%screen, "no surface for screen; navigation skipped");
            return false;
        }
        self.state.history.push(self.state.current);
        self.state.current = screen;
        debug!(%screen, depth = self.state.history.len(), "navigated");
        self.sync_chrome();
        true
    }

    /// Like [`go_to`](Self::go_to) for a presentation id. Unknown ids are ignored.
    pub fn go_to_id(&mut self, id: &str, surface: &mut dyn ScreenSurface) -> bool {
        match Screen::from_dom_id(id) {
            Some(screen) => self.go_to(screen, surface),
            None => {
                debug!(id, "unknown screen id ignored");
                false
            }
        }
    }

    /// Returns to the previous screen, or to the main menu when there is none.
    /// Never grows the history.
    pub fn go_back(&mut self, surface: &mut dyn ScreenSurface) {
        let target = self
            .state
            .history
            .last()
            .copied()
            .unwrap_or(Screen::DEFAULT);

        if !surface.activate(target) {
            debug!(screen = %target, "no surface for previous screen; staying put");
            return;
        }
        self.state.history.pop();
        self.state.current = target;
        debug!(screen = %target, depth = self.state.history.len(), "navigated back");
        self.sync_chrome();
    }

    fn sync_chrome(&self) {
        let chrome = chrome_for(self.state.current);
        if chrome.main_button {
            self.bridge.show_main_button(DEFAULT_MAIN_BUTTON_LABEL, None);
        } else {
            self.bridge.hide_main_button();
        }
        if chrome.back_button {
            self.bridge.show_back_button();
        } else {
            self.bridge.hide_back_button();
        }
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
