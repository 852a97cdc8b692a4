//! Line-oriented host and view used when the client runs in a terminal.

use std::{
    io::{self, Write},
    sync::{Mutex, MutexGuard, PoisonError},
};

use client_core::{ScreenSurface, View};
use host_bridge::{
    ConfirmReply, HostError, HostPlatform, HostUser, ImpactStyle, NotificationKind, ThemeParams,
    Viewport,
};
use shared::domain::{meter_percent, Screen, MAX_FEAR, MAX_HOPE};
use tracing::{debug, warn};

const METER_WIDTH: usize = 10;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Plays the embedding host: dialogs and chrome become printed lines, a
/// pending confirmation is answered by the next `y`/`n` line.
pub struct TerminalPlatform<W: Write + Send> {
    out: Mutex<W>,
    user: Option<HostUser>,
    available: bool,
    pending_confirm: Mutex<Option<ConfirmReply>>,
}

impl TerminalPlatform<io::Stdout> {
    pub fn stdout(user: Option<HostUser>) -> Self {
        Self::new(io::stdout(), user)
    }
}

impl<W: Write + Send> TerminalPlatform<W> {
    pub fn new(out: W, user: Option<HostUser>) -> Self {
        Self {
            out: Mutex::new(out),
            user,
            available: true,
            pending_confirm: Mutex::new(None),
        }
    }

    /// Makes the probe fail, as when the page is opened outside the host.
    pub fn detached(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn has_pending_confirm(&self) -> bool {
        lock(&self.pending_confirm).is_some()
    }

    /// Feeds an input line to an open confirmation. Returns `true` when the
    /// line was a `y`/`n` answer and a dialog took it.
    pub fn answer_confirm(&self, line: &str) -> bool {
        let accepted = match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => return false,
        };
        match lock(&self.pending_confirm).take() {
            Some(reply) => {
                reply.answer(accepted);
                true
            }
            None => false,
        }
    }

    fn print(&self, line: &str) {
        let mut out = lock(&self.out);
        if let Err(err) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            warn!(error = %err, "terminal write failed");
        }
    }
}

impl<W: Write + Send> HostPlatform for TerminalPlatform<W> {
    fn probe(&self) -> Result<(), HostError> {
        if self.available {
            Ok(())
        } else {
            Err(HostError::Unavailable(
                "started without a host session".into(),
            ))
        }
    }

    fn ready(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn expand(&self) {}

    fn enable_closing_confirmation(&self) {}

    fn init_user(&self) -> Option<HostUser> {
        self.user.clone()
    }

    fn theme(&self) -> ThemeParams {
        ThemeParams::default()
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            height: 24.0,
            stable_height: 24.0,
            is_expanded: true,
        }
    }

    fn impact_occurred(&self, style: ImpactStyle) -> Result<(), HostError> {
        debug!(style = style.as_str(), "haptic impact");
        Ok(())
    }

    fn notification_occurred(&self, kind: NotificationKind) -> Result<(), HostError> {
        debug!(kind = kind.as_str(), "haptic notification");
        Ok(())
    }

    fn selection_changed(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn set_main_button_text(&self, text: &str) {
        debug!(text, "main button label");
    }

    fn show_main_button(&self) {
        self.print("[main button: type 'ok']");
    }

    fn hide_main_button(&self) {}

    fn show_back_button(&self) {
        self.print("[back button: type 'back']");
    }

    fn hide_back_button(&self) {}

    fn show_alert(&self, message: &str) {
        self.print(&format!("[alert] {message}"));
    }

    fn show_confirm(&self, message: &str, reply: ConfirmReply) {
        // A newer dialog replaces an unanswered one; dropping the old reply
        // resolves it as declined.
        *lock(&self.pending_confirm) = Some(reply);
        self.print(&format!("[confirm] {message} (y/n)"));
    }

    fn send_data(&self, data: &str) {
        self.print(&format!("[data] {data}"));
    }

    fn close(&self) {
        self.print("[closed]");
    }
}

/// Renders screens and game state as plain text.
pub struct ConsoleView<W: Write> {
    out: W,
}

impl ConsoleView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            warn!(error = %err, "terminal write failed");
        }
    }
}

fn meter_bar(label: &str, value: i32, max: i32) -> String {
    let percent = meter_percent(value, max);
    let filled = usize::from(percent) * METER_WIDTH / 100;
    format!(
        "{label:<5} [{}{}] {value}/{max}",
        "#".repeat(filled),
        "-".repeat(METER_WIDTH - filled)
    )
}

fn screen_title(screen: Screen) -> &'static str {
    match screen {
        Screen::Loading => "Loading...",
        Screen::MainMenu => "Main menu: new | load | character | rules",
        Screen::CharacterCreation => "Create your character: create <name>, <class>, <ancestry>",
        Screen::GameScreen => "Adventure: roll | ability | interact | character",
        Screen::Error => "Something went wrong",
    }
}

impl<W: Write> ScreenSurface for ConsoleView<W> {
    fn activate(&mut self, screen: Screen) -> bool {
        self.line(&format!("== {} ==", screen_title(screen)));
        true
    }
}

impl<W: Write> View for ConsoleView<W> {
    fn show_greeting(&mut self, name: &str) {
        self.line(&format!("Welcome, {name}!"));
    }

    fn apply_theme(&mut self, theme: &ThemeParams) {
        debug!(?theme, "terminal ignores host colors");
    }

    fn append_story(&mut self, text: &str) {
        self.line(&format!("> {text}"));
    }

    fn update_meters(&mut self, hope: i32, fear: i32) {
        self.line(&meter_bar("Hope", hope, MAX_HOPE));
        self.line(&meter_bar("Fear", fear, MAX_FEAR));
    }

    fn show_error(&mut self, message: &str) {
        self.line(&format!("error: {message}"));
    }
}
