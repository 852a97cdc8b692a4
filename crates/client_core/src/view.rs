use host_bridge::ThemeParams;

use crate::navigation::ScreenSurface;

/// Presentation layer driven by [`GameApp`](crate::app::GameApp).
pub trait View: ScreenSurface {
    fn show_greeting(&mut self, name: &str);
    fn apply_theme(&mut self, theme: &ThemeParams);
    /// Appends a paragraph to the running story and scrolls to it.
    fn append_story(&mut self, text: &str);
    fn update_meters(&mut self, hope: i32, fear: i32);
    /// Fills the error screen's message; does not switch screens.
    fn show_error(&mut self, message: &str);
}
