use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use shared::domain::UserId;
use tracing::{debug, error, info, warn};

use crate::{
    HostError, HostPlatform, HostUser, ImpactStyle, NotificationKind, PendingConfirm, ThemeParams,
    Viewport,
};

pub const DEFAULT_MAIN_BUTTON_LABEL: &str = "Continue";
const FALLBACK_DISPLAY_NAME: &str = "Adventurer";
const FALLBACK_LANGUAGE: &str = "ru";

/// Callback bound to the host's main action button.
pub type MainButtonAction = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Probing,
    Ready,
    /// Terminal for the session; the reason is shown on the error screen.
    Failed(String),
}

struct BridgeInner {
    state: BridgeState,
    user: Option<HostUser>,
    theme: ThemeParams,
    main_button_action: Option<MainButtonAction>,
}

pub struct HostBridge {
    platform: Arc<dyn HostPlatform>,
    inner: Mutex<BridgeInner>,
}

impl HostBridge {
    pub fn new(platform: Arc<dyn HostPlatform>) -> Self {
        Self {
            platform,
            inner: Mutex::new(BridgeInner {
                state: BridgeState::Uninitialized,
                user: None,
                theme: ThemeParams::default(),
                main_button_action: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BridgeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> BridgeState {
        self.lock().state.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().state == BridgeState::Ready
    }

    /// Probes the host and performs one-time setup.
    ///
    /// Runs at most once: later calls report the outcome of the first.
    pub fn initialize(&self) -> Result<(), HostError> {
        {
            let mut inner = self.lock();
            match &inner.state {
                BridgeState::Uninitialized => inner.state = BridgeState::Probing,
                BridgeState::Probing | BridgeState::Ready => return Ok(()),
                BridgeState::Failed(reason) => return Err(HostError::Unavailable(reason.clone())),
            }
        }

        match self.setup() {
            Ok((user, theme)) => {
                let mut inner = self.lock();
                info!(
                    user_id = ?user.as_ref().map(|user| user.id.0),
                    "host bridge ready"
                );
                inner.user = user;
                inner.theme = theme;
                inner.state = BridgeState::Ready;
                Ok(())
            }
            Err(err) => {
                error!("host bridge initialization failed: {err}");
                self.lock().state = BridgeState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    fn setup(&self) -> Result<(Option<HostUser>, ThemeParams), HostError> {
        self.platform.probe()?;
        self.platform.ready()?;

        let theme = self.platform.theme();
        self.platform.expand();

        let user = self.platform.init_user();
        if user.is_none() {
            warn!("host supplied no user record; identity will be unknown");
        }

        self.platform.set_main_button_text(DEFAULT_MAIN_BUTTON_LABEL);
        self.platform.hide_main_button();
        self.platform.enable_closing_confirmation();

        Ok((user, theme))
    }

    /// Runs `call` only when the bridge is usable.
    fn with_platform(&self, capability: &'static str, call: impl FnOnce(&dyn HostPlatform)) {
        if self.is_ready() {
            call(self.platform.as_ref());
        } else {
            debug!(capability, "host bridge not ready; capability skipped");
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.lock().user.as_ref().map(|user| user.id)
    }

    pub fn display_name(&self) -> String {
        let inner = self.lock();
        inner
            .user
            .as_ref()
            .and_then(|user| user.first_name.clone().or_else(|| user.username.clone()))
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
    }

    pub fn language_code(&self) -> String {
        self.lock()
            .user
            .as_ref()
            .and_then(|user| user.language_code.clone())
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
    }

    /// Theme captured at startup; `None` until the bridge is ready.
    pub fn theme(&self) -> Option<ThemeParams> {
        let inner = self.lock();
        (inner.state == BridgeState::Ready).then(|| inner.theme.clone())
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.is_ready().then(|| self.platform.viewport())
    }

    pub fn haptic(&self, style: ImpactStyle) {
        self.with_platform("haptic", |platform| {
            if let Err(err) = platform.impact_occurred(style) {
                warn!(style = style.as_str(), "haptic feedback failed: {err}");
            }
        });
    }

    pub fn notify(&self, kind: NotificationKind) {
        self.with_platform("notification", |platform| {
            if let Err(err) = platform.notification_occurred(kind) {
                warn!(kind = kind.as_str(), "notification feedback failed: {err}");
            }
        });
    }

    pub fn selection_changed(&self) {
        self.with_platform("selection", |platform| {
            if let Err(err) = platform.selection_changed() {
                warn!("selection feedback failed: {err}");
            }
        });
    }

    pub fn alert(&self, message: &str) {
        self.with_platform("alert", |platform| platform.show_alert(message));
    }

    pub fn confirm(&self, message: &str) -> PendingConfirm {
        if !self.is_ready() {
            debug!("host bridge not ready; confirm resolves as declined");
            return PendingConfirm::declined();
        }
        let (reply, pending) = PendingConfirm::channel();
        self.platform.show_confirm(message, reply);
        pending
    }

    /// Shows the main button. A provided `action` replaces whatever was bound
    /// before; `None` keeps the current binding.
    pub fn show_main_button(&self, label: &str, action: Option<MainButtonAction>) {
        if !self.is_ready() {
            return;
        }
        if let Some(action) = action {
            self.lock().main_button_action = Some(action);
        }
        self.platform.set_main_button_text(label);
        self.platform.show_main_button();
    }

    pub fn hide_main_button(&self) {
        if !self.is_ready() {
            return;
        }
        self.lock().main_button_action = None;
        self.platform.hide_main_button();
    }

    /// Delivers a main button tap from the host. Returns whether an action ran.
    pub fn press_main_button(&self) -> bool {
        let action = self.lock().main_button_action.clone();
        match action {
            Some(action) => {
                action();
                true
            }
            None => {
                debug!("main button pressed with no bound action");
                false
            }
        }
    }

    pub fn show_back_button(&self) {
        self.with_platform("back_button", |platform| platform.show_back_button());
    }

    pub fn hide_back_button(&self) {
        self.with_platform("back_button", |platform| platform.hide_back_button());
    }

    pub fn send_data<T: Serialize>(&self, data: &T) {
        match serde_json::to_string(data) {
            Ok(encoded) => self.with_platform("send_data", |platform| platform.send_data(&encoded)),
            Err(err) => warn!("failed to encode data for host: {err}"),
        }
    }

    pub fn close(&self) {
        self.with_platform("close", |platform| platform.close());
    }
}
