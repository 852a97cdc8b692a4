//! Capability boundary between the game client and the messaging platform
//! that embeds it.
//!
//! [`HostPlatform`] is the raw SDK surface a concrete host implements.
//! [`HostBridge`] wraps it with a probe-once lifecycle and makes every
//! capability best-effort once the host is known to be usable.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use serde::Deserialize;
use shared::{
    domain::UserId,
    error::{ApiError, ErrorCode},
};
use thiserror::Error;
use tokio::sync::oneshot;

mod bridge;
pub mod recording;

pub use bridge::{BridgeState, HostBridge, MainButtonAction, DEFAULT_MAIN_BUTTON_LABEL};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host platform unavailable: {0}")]
    Unavailable(String),
    #[error("host call {capability} failed: {message}")]
    Call {
        capability: &'static str,
        message: String,
    },
}

impl HostError {
    pub fn to_api_error(&self) -> ApiError {
        let code = match self {
            HostError::Unavailable(_) => ErrorCode::HostUnavailable,
            HostError::Call { .. } => ErrorCode::Internal,
        };
        ApiError::new(code, self.to_string())
    }
}

/// Tactile pulse strengths understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
    Rigid,
    Soft,
}

impl ImpactStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ImpactStyle::Light => "light",
            ImpactStyle::Medium => "medium",
            ImpactStyle::Heavy => "heavy",
            ImpactStyle::Rigid => "rigid",
            ImpactStyle::Soft => "soft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
        }
    }
}

/// User record the host hands over at launch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostUser {
    pub id: UserId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThemeParams {
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub header_color: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub height: f64,
    pub stable_height: f64,
    pub is_expanded: bool,
}

/// Reply slot handed to the host when it opens a confirmation dialog.
#[derive(Debug)]
pub struct ConfirmReply(oneshot::Sender<bool>);

impl ConfirmReply {
    pub fn answer(self, accepted: bool) {
        // The requester may have stopped waiting; nothing to report then.
        let _ = self.0.send(accepted);
    }
}

/// Result of a confirmation dialog. Resolves to `false` when the host drops
/// the dialog without answering, or when the bridge never opened one.
#[derive(Debug)]
pub struct PendingConfirm {
    rx: Option<oneshot::Receiver<bool>>,
}

impl PendingConfirm {
    pub(crate) fn channel() -> (ConfirmReply, Self) {
        let (tx, rx) = oneshot::channel();
        (ConfirmReply(tx), Self { rx: Some(rx) })
    }

    pub(crate) fn declined() -> Self {
        Self { rx: None }
    }
}

impl Future for PendingConfirm {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        match self.rx.as_mut() {
            None => Poll::Ready(false),
            Some(rx) => Pin::new(rx).poll(cx).map(|answer| answer.unwrap_or(false)),
        }
    }
}

/// Raw capability surface of the embedding platform's SDK.
pub trait HostPlatform: Send + Sync {
    /// Checks that the host SDK is present. Called once, before anything else.
    fn probe(&self) -> Result<(), HostError>;
    fn ready(&self) -> Result<(), HostError>;
    fn expand(&self);
    fn enable_closing_confirmation(&self);

    fn init_user(&self) -> Option<HostUser>;
    fn theme(&self) -> ThemeParams;
    fn viewport(&self) -> Viewport;

    fn impact_occurred(&self, style: ImpactStyle) -> Result<(), HostError>;
    fn notification_occurred(&self, kind: NotificationKind) -> Result<(), HostError>;
    fn selection_changed(&self) -> Result<(), HostError>;

    fn set_main_button_text(&self, text: &str);
    fn show_main_button(&self);
    fn hide_main_button(&self);
    fn show_back_button(&self);
    fn hide_back_button(&self);

    fn show_alert(&self, message: &str);
    fn show_confirm(&self, message: &str, reply: ConfirmReply);
    fn send_data(&self, data: &str);
    fn close(&self);
}

#[cfg(test)]
#[path = "tests/bridge_tests.rs"]
mod tests;
