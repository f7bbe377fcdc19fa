//! Colors and styles for the chat UI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette.
pub struct Palette;

impl Palette {
    pub const BG: Color = Color::Rgb(24, 26, 33);
    pub const FG: Color = Color::Rgb(214, 218, 226);
    pub const DIM: Color = Color::Rgb(120, 126, 140);
    pub const ACCENT: Color = Color::Rgb(97, 175, 239);

    pub const STATUS_BG: Color = Color::Rgb(40, 44, 56);
    pub const STATUS_KEY_BG: Color = Color::Rgb(62, 80, 120);

    /// `You:` prefix.
    pub const USER: Color = Color::Rgb(97, 175, 239);
    /// `Bot:` prefix.
    pub const BOT: Color = Color::Rgb(152, 195, 121);
    /// Waiting indicator.
    pub const WARNING: Color = Color::Rgb(229, 192, 123);

    pub const BORDER: Color = Color::Rgb(70, 75, 90);
    pub const BORDER_ACTIVE: Color = Color::Rgb(97, 175, 239);
}

/// Spinner frames for the waiting indicator.
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Spinner frame for a given tick.
pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

/// Named styles.
pub struct Styles;

impl Styles {
    fn on_bg(fg: Color) -> Style {
        Style::new().fg(fg).bg(Palette::BG)
    }

    fn on_status(fg: Color) -> Style {
        Style::new().fg(fg).bg(Palette::STATUS_BG)
    }

    /// Body text.
    pub fn default() -> Style {
        Self::on_bg(Palette::FG)
    }

    /// Secondary text: placeholders, separators, hints.
    pub fn dim() -> Style {
        Self::on_bg(Palette::DIM)
    }

    /// The selected model in the header.
    pub fn highlight() -> Style {
        Self::on_bg(Palette::ACCENT).add_modifier(Modifier::BOLD)
    }

    /// Prompt and cursor of the input box.
    pub fn active() -> Style {
        Self::on_bg(Palette::ACCENT)
    }

    pub fn user() -> Style {
        Self::on_bg(Palette::USER).add_modifier(Modifier::BOLD)
    }

    pub fn bot() -> Style {
        Self::on_bg(Palette::BOT).add_modifier(Modifier::BOLD)
    }

    pub fn warning() -> Style {
        Self::on_bg(Palette::WARNING)
    }

    /// Pane titles.
    pub fn title() -> Style {
        Style::new().fg(Palette::ACCENT).add_modifier(Modifier::BOLD)
    }

    /// Key cap in the status bar.
    pub fn key_hint() -> Style {
        Style::new()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Label next to a key cap.
    pub fn key_label() -> Style {
        Self::on_status(Palette::FG)
    }

    /// Status bar background.
    pub fn status_bar() -> Style {
        Self::on_status(Palette::FG)
    }

    /// Mode badge at the left of the status bar.
    pub fn mode_badge() -> Style {
        Style::new()
            .fg(Palette::BG)
            .bg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::new().fg(Palette::BORDER)
    }

    pub fn border_active() -> Style {
        Style::new().fg(Palette::BORDER_ACTIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_cycles() {
        assert_eq!(spinner_frame(0), "|");
        assert_eq!(spinner_frame(1), "/");
        assert_eq!(spinner_frame(4), "|");
    }

    #[test]
    fn test_speaker_styles_differ() {
        assert_ne!(Styles::user(), Styles::bot());
    }

    #[test]
    fn test_status_styles_share_background() {
        assert_eq!(Styles::key_label().bg, Some(Palette::STATUS_BG));
        assert_eq!(Styles::status_bar().bg, Some(Palette::STATUS_BG));
    }
}
