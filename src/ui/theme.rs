//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── selector bar ───────────────────────────────────────────
    /// Base style under the whole bar.
    pub fn selector_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn folder_icon_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn path_style() -> Style {
        Style::default().fg(Color::White)
    }

    /// Muted italic text for the "not set" placeholder.
    pub fn placeholder_style() -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn button_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn button_hover_style() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }

    pub fn button_focus_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    // ── picker ─────────────────────────────────────────────────
    pub fn dir_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn symlink_style() -> Style {
        Style::default().fg(Color::Magenta)
    }

    pub fn selected_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn key_style() -> Style {
        Style::default().fg(Color::Yellow)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn error_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::LightRed)
    }
}
