//! In-memory hosts for tests and headless runs.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    ConfirmReply, HostError, HostPlatform, HostUser, ImpactStyle, NotificationKind, ThemeParams,
    Viewport,
};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Probe,
    Ready,
    Expand,
    EnableClosingConfirmation,
    InitUser,
    Theme,
    Viewport,
    Impact(ImpactStyle),
    Notification(NotificationKind),
    SelectionChanged,
    SetMainButtonText(String),
    ShowMainButton,
    HideMainButton,
    ShowBackButton,
    HideBackButton,
    Alert(String),
    Confirm(String),
    SendData(String),
    Close,
}

/// Host that records every call it receives.
pub struct RecordingPlatform {
    available: bool,
    ready_fails: bool,
    user: Option<HostUser>,
    theme: ThemeParams,
    feedback_fails: bool,
    auto_confirm: Option<bool>,
    calls: Mutex<Vec<HostCall>>,
    pending_confirm: Mutex<Option<ConfirmReply>>,
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            available: true,
            ready_fails: false,
            user: None,
            theme: ThemeParams::default(),
            feedback_fails: false,
            auto_confirm: None,
            calls: Mutex::new(Vec::new()),
            pending_confirm: Mutex::new(None),
        }
    }

    /// A host whose probe fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// A host that answers the probe but rejects the ready handshake.
    pub fn with_failing_ready(mut self) -> Self {
        self.ready_fails = true;
        self
    }

    pub fn with_user(mut self, user: HostUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_theme(mut self, theme: ThemeParams) -> Self {
        self.theme = theme;
        self
    }

    /// Haptic calls report an error, as a host without a vibration motor would.
    pub fn with_failing_feedback(mut self) -> Self {
        self.feedback_fails = true;
        self
    }

    /// Answer every confirmation immediately instead of holding it.
    pub fn with_auto_confirm(mut self, accepted: bool) -> Self {
        self.auto_confirm = Some(accepted);
        self
    }

    fn calls_guard(&self) -> MutexGuard<'_, Vec<HostCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: HostCall) {
        self.calls_guard().push(call);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls_guard().clone()
    }

    pub fn clear(&self) {
        self.calls_guard().clear();
    }

    pub fn alerts(&self) -> Vec<String> {
        self.calls_guard()
            .iter()
            .filter_map(|call| match call {
                HostCall::Alert(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<NotificationKind> {
        self.calls_guard()
            .iter()
            .filter_map(|call| match call {
                HostCall::Notification(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// Answers a held confirmation. Returns false when none is open.
    pub fn answer_confirm(&self, accepted: bool) -> bool {
        let reply = self
            .pending_confirm
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match reply {
            Some(reply) => {
                reply.answer(accepted);
                true
            }
            None => false,
        }
    }

    fn feedback_result(&self, capability: &'static str) -> Result<(), HostError> {
        if self.feedback_fails {
            Err(HostError::Call {
                capability,
                message: "feedback unsupported".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl HostPlatform for RecordingPlatform {
    fn probe(&self) -> Result<(), HostError> {
        self.record(HostCall::Probe);
        if self.available {
            Ok(())
        } else {
            Err(HostError::Unavailable("host SDK not found".to_string()))
        }
    }

    fn ready(&self) -> Result<(), HostError> {
        self.record(HostCall::Ready);
        if self.ready_fails {
            return Err(HostError::Call {
                capability: "ready",
                message: "handshake rejected".to_string(),
            });
        }
        Ok(())
    }

    fn expand(&self) {
        self.record(HostCall::Expand);
    }

    fn enable_closing_confirmation(&self) {
        self.record(HostCall::EnableClosingConfirmation);
    }

    fn init_user(&self) -> Option<HostUser> {
        self.record(HostCall::InitUser);
        self.user.clone()
    }

    fn theme(&self) -> ThemeParams {
        self.record(HostCall::Theme);
        self.theme.clone()
    }

    fn viewport(&self) -> Viewport {
        self.record(HostCall::Viewport);
        Viewport {
            height: 640.0,
            stable_height: 600.0,
            is_expanded: true,
        }
    }

    fn impact_occurred(&self, style: ImpactStyle) -> Result<(), HostError> {
        self.record(HostCall::Impact(style));
        self.feedback_result("impact")
    }

    fn notification_occurred(&self, kind: NotificationKind) -> Result<(), HostError> {
        self.record(HostCall::Notification(kind));
        self.feedback_result("notification")
    }

    fn selection_changed(&self) -> Result<(), HostError> {
        self.record(HostCall::SelectionChanged);
        self.feedback_result("selection")
    }

    fn set_main_button_text(&self, text: &str) {
        self.record(HostCall::SetMainButtonText(text.to_string()));
    }

    fn show_main_button(&self) {
        self.record(HostCall::ShowMainButton);
    }

    fn hide_main_button(&self) {
        self.record(HostCall::HideMainButton);
    }

    fn show_back_button(&self) {
        self.record(HostCall::ShowBackButton);
    }

    fn hide_back_button(&self) {
        self.record(HostCall::HideBackButton);
    }

    fn show_alert(&self, message: &str) {
        self.record(HostCall::Alert(message.to_string()));
    }

    fn show_confirm(&self, message: &str, reply: ConfirmReply) {
        self.record(HostCall::Confirm(message.to_string()));
        match self.auto_confirm {
            Some(accepted) => reply.answer(accepted),
            None => {
                *self
                    .pending_confirm
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(reply);
            }
        }
    }

    fn send_data(&self, data: &str) {
        self.record(HostCall::SendData(data.to_string()));
    }

    fn close(&self) {
        self.record(HostCall::Close);
    }
}
