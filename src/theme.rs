//! Form colors, with optional overrides from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Focused field border, button, key hints
    pub danger: Color,      // Inline field errors, failure banner
    pub success: Color,     // Account created view
    pub text: Color,        // Typed values
    pub text_dim: Color,    // Placeholders, hints
    pub inactive: Color,    // Unfocused borders
    pub header: Color,      // Form heading
    pub bg_selected: Color, // Focused button background
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired defaults
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(203, 166, 247),
            bg_selected: Color::Rgb(69, 71, 90),
        }
    }
}

impl Theme {
    /// Defaults with every valid override from the config applied
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();
        let pick = |value: &Option<String>, fallback: Color| {
            match value.as_deref() {
                Some(s) => Self::parse_hex_color(s).unwrap_or_else(|| {
                    tracing::warn!("Ignoring invalid theme color: {}", s);
                    fallback
                }),
                None => fallback,
            }
        };

        Self {
            accent: pick(&config.accent, base.accent),
            danger: pick(&config.danger, base.danger),
            success: pick(&config.success, base.success),
            text: pick(&config.text, base.text),
            text_dim: pick(&config.text_dim, base.text_dim),
            inactive: pick(&config.inactive, base.inactive),
            header: pick(&config.header, base.header),
            bg_selected: pick(&config.bg_selected, base.bg_selected),
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
