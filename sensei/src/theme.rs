//! Color themes for sensei.
//!
//! A `Theme` names one `ratatui::style::Color` per UI surface. Two built-ins:
//!
//! - `dark`: ANSI 16 colors only, safe on any terminal.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; needs truecolor.

use ratatui::style::Color;

use sensei_core::types::ScoreBand;

/// All color values used across sensei's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the focused panel.
    pub border_active: Color,
    /// Border color for the other panel.
    pub border_inactive: Color,

    // Editor
    /// Gutter mark for blocks scoring below 5.
    pub gutter_critical: Color,
    /// Gutter mark for blocks scoring below 8.
    pub gutter_warning: Color,
    /// Line-number color.
    pub line_number: Color,
    /// Background behind the active block.
    pub active_highlight_bg: Color,
    /// Plain source text when no highlighting is available yet.
    pub code_text: Color,

    // Report cards
    pub score_good: Color,
    pub score_fair: Color,
    pub score_poor: Color,
    /// Function name in card headers.
    pub card_title: Color,
    /// Secondary text (line ranges, hints, section labels).
    pub muted: Color,
    /// Complexity estimate.
    pub complexity: Color,
    /// Issue titles.
    pub issue: Color,
    /// Suggested fix code.
    pub fix: Color,
    /// Selected tab label.
    pub tab_active: Color,
    /// Error view and inline chat errors.
    pub error: Color,
    /// User chat bubbles.
    pub chat_user: Color,
    /// Assistant chat bubbles.
    pub chat_assistant: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator in INSERT and CHAT modes.
    pub status_mode_insert: Color,
}

impl Theme {
    /// Built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            gutter_critical: Color::Red,
            gutter_warning: Color::Yellow,
            line_number: Color::DarkGray,
            active_highlight_bg: Color::Indexed(17),
            code_text: Color::Reset,

            score_good: Color::Green,
            score_fair: Color::Yellow,
            score_poor: Color::Red,
            card_title: Color::Blue,
            muted: Color::DarkGray,
            complexity: Color::Magenta,
            issue: Color::LightRed,
            fix: Color::Green,
            tab_active: Color::Cyan,
            error: Color::Red,
            chat_user: Color::Blue,
            chat_assistant: Color::Green,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
        }
    }

    /// Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let blue = Color::Rgb(137, 180, 250);     // #89b4fa
        let mauve = Color::Rgb(203, 166, 247);    // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let maroon = Color::Rgb(235, 160, 172);   // #eba0ac
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68);    // #313244
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            gutter_critical: red,
            gutter_warning: yellow,
            line_number: overlay1,
            active_highlight_bg: surface0,
            code_text: text,

            score_good: green,
            score_fair: yellow,
            score_poor: red,
            card_title: blue,
            muted: overlay1,
            complexity: mauve,
            issue: maroon,
            fix: green,
            tab_active: lavender,
            error: red,
            chat_user: blue,
            chat_assistant: green,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
        }
    }

    /// Resolves a theme name from config or the command line.
    ///
    /// Unknown names fall back to `dark()` with a logged warning.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Badge color for a quality score.
    pub fn score(&self, score: f64) -> Color {
        match ScoreBand::of(score) {
            ScoreBand::Good => self.score_good,
            ScoreBand::Fair => self.score_fair,
            ScoreBand::Poor => self.score_poor,
        }
    }
}
