//! Game client reducer.
//!
//! All state lives in [`GameApp`] and is touched only from [`GameApp::handle`].
//! Remote calls and confirmation dialogs run as spawned tasks that post a
//! [`Completion`] back onto the app's event channel, so every continuation is
//! applied on the same thread of control as user input.

use std::{future::Future, sync::Arc};

use host_bridge::{HostBridge, ImpactStyle, NotificationKind};
use shared::{
    domain::{Screen, MAX_FEAR, MAX_HOPE},
    error::ApiError,
    protocol::{
        Character, CreateCharacterRequest, GameSessionRequest, RollDiceRequest,
        DEFAULT_DIFFICULTY,
    },
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    api::{ApiFailure, GameApi, TurnOutcome},
    navigation::{chrome_for, NavigationController},
    view::View,
};

const STARTING_HOPE: i32 = 5;
const STARTING_FEAR: i32 = 3;

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const START_GAME_FIRST: &str = "Start a game first";
pub const CREATE_CHARACTER_FIRST: &str = "Create a character first";
pub const NO_SAVED_CHARACTER: &str = "No saved character was found";
pub const UNKNOWN_USER: &str = "Your account could not be identified";
pub const RULES_MESSAGE: &str = "The full game rules are available at daggerheart.su";
pub const ABILITIES_COMING_SOON: &str = "Ability selection is coming soon";
pub const INTERACTION_COMING_SOON: &str = "Interaction is coming soon";
pub const REPLACE_CHARACTER_PROMPT: &str =
    "Start a new game? Your current character will be replaced.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppSettings {
    pub dice_difficulty: i32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dice_difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

/// Raw character creation form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterForm {
    pub name: String,
    pub character_class: String,
    pub ancestry: String,
}

impl CharacterForm {
    pub fn new(
        name: impl Into<String>,
        character_class: impl Into<String>,
        ancestry: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            character_class: character_class.into(),
            ancestry: ancestry.into(),
        }
    }

    fn validate(&self) -> Result<CharacterForm, ApiError> {
        let trimmed = CharacterForm::new(
            self.name.trim(),
            self.character_class.trim(),
            self.ancestry.trim(),
        );
        if trimmed.name.is_empty()
            || trimmed.character_class.is_empty()
            || trimmed.ancestry.is_empty()
        {
            return Err(ApiError::validation(FILL_ALL_FIELDS));
        }
        Ok(trimmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// The loading splash has been shown long enough.
    FinishLoading,
    StartNewGame,
    LoadGame,
    ShowCharacter,
    ShowRules,
    ShowMainMenu,
    SubmitCharacter(CharacterForm),
    RollDice,
    UseAbility,
    Interact,
    BackButton,
    MainButton,
}

#[derive(Debug)]
pub enum Completion {
    CharacterCreated(Result<Character, ApiFailure>),
    CharacterLoaded(Result<Option<Character>, ApiFailure>),
    SessionStarted(Result<TurnOutcome, ApiFailure>),
    DiceRolled(Result<TurnOutcome, ApiFailure>),
    NewGameConfirmed(bool),
}

#[derive(Debug)]
pub enum AppEvent {
    Ui(UiAction),
    Completed(Completion),
}

/// The remote call currently awaiting its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteRequest {
    CreateCharacter,
    LoadCharacter,
    StartSession,
    RollDice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub character: Option<Character>,
    pub hope: i32,
    pub fear: i32,
    pub game_active: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            character: None,
            hope: STARTING_HOPE,
            fear: STARTING_FEAR,
            game_active: false,
        }
    }
}

pub struct GameApp<V: View> {
    bridge: Arc<HostBridge>,
    nav: NavigationController,
    view: V,
    api: Arc<dyn GameApi>,
    events: mpsc::UnboundedSender<AppEvent>,
    settings: AppSettings,
    game: GameState,
    in_flight: Option<RemoteRequest>,
    confirm_open: bool,
    halted: bool,
}

impl<V: View> GameApp<V> {
    pub fn new(
        bridge: Arc<HostBridge>,
        api: Arc<dyn GameApi>,
        view: V,
        settings: AppSettings,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let nav = NavigationController::new(Screen::Loading, bridge.clone());
        let app = Self {
            bridge,
            nav,
            view,
            api,
            events,
            settings,
            game: GameState::default(),
            in_flight: None,
            confirm_open: false,
            halted: false,
        };
        (app, rx)
    }

    /// Sender for feeding user input into [`handle`](Self::handle).
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.events.clone()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.nav
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn in_flight(&self) -> Option<RemoteRequest> {
        self.in_flight
    }

    /// False once the host turned out to be unusable; the app then ignores
    /// every further event.
    pub fn is_running(&self) -> bool {
        !self.halted
    }

    /// Initializes the host bridge. On failure the whole app switches to the
    /// error screen and stays there.
    pub fn start(&mut self) -> bool {
        match self.bridge.initialize() {
            Ok(()) => {
                if let Some(theme) = self.bridge.theme() {
                    self.view.apply_theme(&theme);
                }
                let name = self.bridge.display_name();
                self.view.show_greeting(&name);
                if let Some(viewport) = self.bridge.viewport() {
                    debug!(
                        height = viewport.height,
                        expanded = viewport.is_expanded,
                        language = %self.bridge.language_code(),
                        "host viewport"
                    );
                }
                info!(player = %name, "game client started");
                true
            }
            Err(err) => {
                let api_error = err.to_api_error();
                warn!(code = ?api_error.code, "game client halted: {}", api_error.message);
                self.halted = true;
                self.view.show_error(&api_error.message);
                self.nav.go_to(Screen::Error, &mut self.view);
                false
            }
        }
    }

    pub fn handle(&mut self, event: AppEvent) {
        if self.halted {
            debug!(?event, "host unavailable; event dropped");
            return;
        }
        match event {
            AppEvent::Ui(action) => self.handle_action(action),
            AppEvent::Completed(completion) => self.complete(completion),
        }
    }

    fn handle_action(&mut self, action: UiAction) {
        debug!(?action, screen = %self.nav.current(), "ui action");
        match action {
            UiAction::FinishLoading => {
                if self.nav.current() == Screen::Loading {
                    self.nav.go_to(Screen::MainMenu, &mut self.view);
                }
            }
            UiAction::StartNewGame => self.start_new_game(),
            UiAction::LoadGame => self.load_game(),
            UiAction::ShowCharacter => {
                self.bridge.haptic(ImpactStyle::Light);
                match &self.game.character {
                    Some(character) => self.bridge.alert(&character.summary()),
                    None => self.bridge.alert(CREATE_CHARACTER_FIRST),
                }
            }
            UiAction::ShowRules => {
                self.bridge.haptic(ImpactStyle::Light);
                self.bridge.alert(RULES_MESSAGE);
            }
            UiAction::ShowMainMenu => {
                self.bridge.haptic(ImpactStyle::Light);
                if self.nav.current() != Screen::MainMenu {
                    self.nav.go_to(Screen::MainMenu, &mut self.view);
                }
            }
            UiAction::SubmitCharacter(form) => self.submit_character(form),
            UiAction::RollDice => self.roll_dice(),
            UiAction::UseAbility => {
                if self.require_active_game() {
                    self.bridge.haptic(ImpactStyle::Medium);
                    self.bridge.alert(ABILITIES_COMING_SOON);
                }
            }
            UiAction::Interact => {
                if self.require_active_game() {
                    self.bridge.haptic(ImpactStyle::Light);
                    self.bridge.alert(INTERACTION_COMING_SOON);
                }
            }
            UiAction::BackButton => {
                if chrome_for(self.nav.current()).back_button {
                    self.nav.go_back(&mut self.view);
                } else {
                    debug!(screen = %self.nav.current(), "back button hidden; tap ignored");
                }
            }
            UiAction::MainButton => {
                self.bridge.press_main_button();
            }
        }
    }

    fn start_new_game(&mut self) {
        self.bridge.haptic(ImpactStyle::Medium);
        if self.game.character.is_none() {
            self.nav.go_to(Screen::CharacterCreation, &mut self.view);
            return;
        }
        if self.confirm_open {
            debug!("replacement confirmation already open");
            return;
        }
        self.confirm_open = true;
        let pending = self.bridge.confirm(REPLACE_CHARACTER_PROMPT);
        self.spawn(pending, Completion::NewGameConfirmed);
    }

    fn load_game(&mut self) {
        self.bridge.haptic(ImpactStyle::Light);
        let Some(user_id) = self.bridge.user_id() else {
            self.bridge.alert(UNKNOWN_USER);
            return;
        };
        if !self.begin_request(RemoteRequest::LoadCharacter) {
            return;
        }
        let api = self.api.clone();
        self.spawn(
            async move { api.fetch_character(user_id).await },
            Completion::CharacterLoaded,
        );
    }

    fn submit_character(&mut self, form: CharacterForm) {
        let form = match form.validate() {
            Ok(form) => form,
            Err(err) => {
                debug!(code = ?err.code, "character form rejected");
                self.bridge.alert(&err.message);
                return;
            }
        };
        if !self.begin_request(RemoteRequest::CreateCharacter) {
            return;
        }
        self.bridge.haptic(ImpactStyle::Medium);

        let request = CreateCharacterRequest {
            name: form.name,
            character_class: form.character_class,
            ancestry: form.ancestry,
            user_id: self.bridge.user_id(),
        };
        let api = self.api.clone();
        self.spawn(
            async move { api.create_character(request).await },
            Completion::CharacterCreated,
        );
    }

    fn roll_dice(&mut self) {
        if !self.require_active_game() {
            return;
        }
        let Some(character_id) = self.game.character.as_ref().map(|character| character.id)
        else {
            self.bridge.alert(CREATE_CHARACTER_FIRST);
            return;
        };
        if !self.begin_request(RemoteRequest::RollDice) {
            return;
        }
        self.bridge.haptic(ImpactStyle::Heavy);

        let request = RollDiceRequest::general(
            character_id,
            self.bridge.user_id(),
            self.settings.dice_difficulty,
        );
        let api = self.api.clone();
        self.spawn(
            async move { api.roll_dice(request).await },
            Completion::DiceRolled,
        );
    }

    fn begin_session(&mut self) {
        let Some(character_id) = self.game.character.as_ref().map(|character| character.id)
        else {
            return;
        };
        if !self.begin_request(RemoteRequest::StartSession) {
            return;
        }
        let request = GameSessionRequest {
            character_id,
            user_id: self.bridge.user_id(),
        };
        let api = self.api.clone();
        self.spawn(
            async move { api.start_session(request).await },
            Completion::SessionStarted,
        );
    }

    fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::NewGameConfirmed(accepted) => {
                self.confirm_open = false;
                if accepted {
                    self.nav.go_to(Screen::CharacterCreation, &mut self.view);
                }
            }
            Completion::CharacterCreated(result) => {
                self.finish_request(RemoteRequest::CreateCharacter);
                match result {
                    Ok(character) => self.adopt_character(character),
                    Err(err) => self.report_failure("Character creation failed", &err),
                }
            }
            Completion::CharacterLoaded(result) => {
                self.finish_request(RemoteRequest::LoadCharacter);
                match result {
                    Ok(Some(character)) => self.adopt_character(character),
                    Ok(None) => self.bridge.alert(NO_SAVED_CHARACTER),
                    Err(err) => self.report_failure("Loading the game failed", &err),
                }
            }
            Completion::SessionStarted(result) => {
                self.finish_request(RemoteRequest::StartSession);
                match result {
                    Ok(outcome) => {
                        self.game.game_active = true;
                        self.apply_turn(outcome);
                        info!("game session started");
                    }
                    Err(err) => self.report_failure("Starting the game failed", &err),
                }
            }
            Completion::DiceRolled(result) => {
                self.finish_request(RemoteRequest::RollDice);
                match result {
                    Ok(outcome) => {
                        self.apply_turn(outcome);
                        self.bridge.notify(NotificationKind::Success);
                    }
                    Err(err) => self.report_failure("Dice roll failed", &err),
                }
            }
        }
    }

    fn adopt_character(&mut self, character: Character) {
        info!(character_id = character.id.0, name = %character.name, "character ready");
        self.game.game_active = false;
        self.game.character = Some(character);
        self.bridge.notify(NotificationKind::Success);
        self.nav.go_to(Screen::GameScreen, &mut self.view);
        self.begin_session();
    }

    fn apply_turn(&mut self, outcome: TurnOutcome) {
        if let Some(narrative) = outcome.narrative.as_deref().filter(|text| !text.is_empty()) {
            self.view.append_story(narrative);
        }
        if let Some(character) = outcome.character {
            self.game.character = Some(character);
        }
        self.refresh_meters();
    }

    fn refresh_meters(&mut self) {
        let Some(character) = &self.game.character else {
            return;
        };
        self.game.hope = character.hope.clamp(0, MAX_HOPE);
        self.game.fear = character.fear.clamp(0, MAX_FEAR);
        self.view.update_meters(self.game.hope, self.game.fear);
    }

    fn require_active_game(&self) -> bool {
        if !self.game.game_active {
            self.bridge.alert(START_GAME_FIRST);
        }
        self.game.game_active
    }

    fn begin_request(&mut self, request: RemoteRequest) -> bool {
        if let Some(pending) = self.in_flight {
            warn!(?request, ?pending, "request dropped while another is in flight");
            self.bridge.notify(NotificationKind::Warning);
            return false;
        }
        self.in_flight = Some(request);
        true
    }

    fn finish_request(&mut self, request: RemoteRequest) {
        if self.in_flight != Some(request) {
            warn!(?request, pending = ?self.in_flight, "completion for unexpected request");
        }
        self.in_flight = None;
    }

    fn report_failure(&self, context: &str, err: &ApiFailure) {
        let api_error = err.to_api_error();
        warn!(code = ?api_error.code, "{context}: {}", api_error.message);
        let message = match err {
            ApiFailure::Rejected {
                message: Some(message),
            } => message.clone(),
            _ => format!("{context}: {}", api_error.message),
        };
        self.bridge.notify(NotificationKind::Error);
        self.bridge.alert(&message);
    }

    fn spawn<F, T>(&self, work: F, complete: fn(T) -> Completion)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let output = work.await;
            if events.send(AppEvent::Completed(complete(output))).is_err() {
                debug!("app event loop gone; completion discarded");
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
