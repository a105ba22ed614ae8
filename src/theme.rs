//! Color themes for rendered book text and the surrounding chrome.
//!
//! A theme is a fixed set of named color slots. Built-in palettes cover the
//! common cases; custom themes load from `themes/<name>.toml` under the
//! config directory and inherit the default palette for any missing slot.

use facet::Facet;
use ratatui::style::Color;
use std::fs;
use std::path::PathBuf;

/// A complete palette, stored as hex strings so themes stay TOML-editable.
#[derive(Facet, Clone)]
pub struct Theme {
    /// Theme identifier used in config and file names.
    #[facet(default = String::from("ember-dark"))]
    pub name: String,

    /// Accent for titles and the application header.
    #[facet(default = String::from("#A78BFA"))]
    pub primary_color: String,
    /// Softer accent for chapter titles and progress text.
    #[facet(default = String::from("#C4B5FD"))]
    pub secondary_color: String,

    /// Body text.
    #[facet(default = String::from("#F3F4F6"))]
    pub text_color: String,
    /// De-emphasized text: rules, borders, quotes.
    #[facet(default = String::from("#9CA3AF"))]
    pub muted_text_color: String,

    /// Heading text.
    #[facet(default = String::from("#DDD6FE"))]
    pub heading_color: String,
    /// Hyperlink text.
    #[facet(default = String::from("#60A5FA"))]
    pub link_color: String,
    /// Blockquote body.
    #[facet(default = String::from("#D1D5DB"))]
    pub quote_color: String,
    /// Blockquote left border.
    #[facet(default = String::from("#7C3AED"))]
    pub quote_border_color: String,
    /// Code background.
    #[facet(default = String::from("#374151"))]
    pub code_bg_color: String,
    /// Code foreground.
    #[facet(default = String::from("#FCD34D"))]
    pub code_text_color: String,
    /// Emphasized (`em`/`i`) text.
    #[facet(default = String::from("#FBBF24"))]
    pub emphasis_color: String,
    /// Strong (`strong`/`b`) text.
    #[facet(default = String::from("#F9A8D4"))]
    pub strong_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::ember_dark()
    }
}

impl Theme {
    /// The default warm purple-tinted dark palette.
    #[must_use]
    pub fn ember_dark() -> Self {
        Self {
            name: "ember-dark".to_string(),
            primary_color: "#A78BFA".to_string(),
            secondary_color: "#C4B5FD".to_string(),
            text_color: "#F3F4F6".to_string(),
            muted_text_color: "#9CA3AF".to_string(),
            heading_color: "#DDD6FE".to_string(),
            link_color: "#60A5FA".to_string(),
            quote_color: "#D1D5DB".to_string(),
            quote_border_color: "#7C3AED".to_string(),
            code_bg_color: "#374151".to_string(),
            code_text_color: "#FCD34D".to_string(),
            emphasis_color: "#FBBF24".to_string(),
            strong_color: "#F9A8D4".to_string(),
        }
    }

    /// Classic Solarized dark.
    #[must_use]
    pub fn solarized_dark() -> Self {
        Self {
            name: "solarized-dark".to_string(),
            primary_color: "#268BD2".to_string(),
            secondary_color: "#2AA198".to_string(),
            text_color: "#839496".to_string(),
            muted_text_color: "#586E75".to_string(),
            heading_color: "#B58900".to_string(),
            link_color: "#268BD2".to_string(),
            quote_color: "#93A1A1".to_string(),
            quote_border_color: "#2AA198".to_string(),
            code_bg_color: "#073642".to_string(),
            code_text_color: "#859900".to_string(),
            emphasis_color: "#CB4B16".to_string(),
            strong_color: "#DC322F".to_string(),
        }
    }

    /// Warm, book-like light palette.
    #[must_use]
    pub fn sepia() -> Self {
        Self {
            name: "sepia".to_string(),
            primary_color: "#8B4513".to_string(),
            secondary_color: "#A0522D".to_string(),
            text_color: "#3E2723".to_string(),
            muted_text_color: "#6D4C41".to_string(),
            heading_color: "#5D4037".to_string(),
            link_color: "#D2691E".to_string(),
            quote_color: "#4E342E".to_string(),
            quote_border_color: "#8D6E63".to_string(),
            code_bg_color: "#EFEBE9".to_string(),
            code_text_color: "#33691E".to_string(),
            emphasis_color: "#BF360C".to_string(),
            strong_color: "#6D4C41".to_string(),
        }
    }

    /// Loads a theme by name: built-ins first, then
    /// `<config dir>/themes/<name>.toml`, else the default palette.
    #[must_use]
    pub fn load(name: &str) -> Self {
        match name {
            "ember-dark" => return Self::ember_dark(),
            "solarized-dark" => return Self::solarized_dark(),
            "sepia" => return Self::sepia(),
            _ => {}
        }

        if let Some(path) = theme_path(name) {
            if let Ok(contents) = fs::read_to_string(path) {
                if let Ok(theme) = facet_toml::from_str::<Self>(&contents) {
                    return theme;
                }
            }
        }

        Self::ember_dark()
    }

    #[must_use]
    /// Accent color for the application header.
    pub fn primary(&self) -> Color {
        parse_hex(&self.primary_color)
    }

    #[must_use]
    /// Secondary accent for chapter titles and progress.
    pub fn secondary(&self) -> Color {
        parse_hex(&self.secondary_color)
    }

    #[must_use]
    /// Body text color.
    pub fn text(&self) -> Color {
        parse_hex(&self.text_color)
    }

    #[must_use]
    /// Muted color for rules and decorations.
    pub fn muted(&self) -> Color {
        parse_hex(&self.muted_text_color)
    }

    #[must_use]
    /// Heading text color.
    pub fn heading(&self) -> Color {
        parse_hex(&self.heading_color)
    }

    #[must_use]
    /// Hyperlink color.
    pub fn link(&self) -> Color {
        parse_hex(&self.link_color)
    }

    #[must_use]
    /// Blockquote text color.
    pub fn quote(&self) -> Color {
        parse_hex(&self.quote_color)
    }

    #[must_use]
    /// Blockquote border color.
    pub fn quote_border(&self) -> Color {
        parse_hex(&self.quote_border_color)
    }

    #[must_use]
    /// Code block background.
    pub fn code_bg(&self) -> Color {
        parse_hex(&self.code_bg_color)
    }

    #[must_use]
    /// Code block foreground.
    pub fn code_text(&self) -> Color {
        parse_hex(&self.code_text_color)
    }

    #[must_use]
    /// Emphasis color.
    pub fn emphasis(&self) -> Color {
        parse_hex(&self.emphasis_color)
    }

    #[must_use]
    /// Strong-text color.
    pub fn strong(&self) -> Color {
        parse_hex(&self.strong_color)
    }
}

/// `#RRGGBB` to an RGB terminal color; anything else falls back to the
/// terminal default.
fn parse_hex(hex: &str) -> Color {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Color::Reset;
    }
    match (
        u8::from_str_radix(&digits[0..2], 16),
        u8::from_str_radix(&digits[2..4], 16),
        u8::from_str_radix(&digits[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
        _ => Color::Reset,
    }
}

/// Path of a custom theme file under the user config directory.
fn theme_path(name: &str) -> Option<PathBuf> {
    let dir = dirs::config_dir()?;
    Some(dir.join("ember").join("themes").join(format!("{name}.toml")))
}

#[cfg(test)]
#[path = "tests/theme.rs"]
mod tests;
