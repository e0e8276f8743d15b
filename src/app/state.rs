//! Central application state.
//!
//! The app is the owner of the selected path: the selector widget only reads
//! it, and every change goes through [`AppState::set_selected`].

use std::path::PathBuf;
use std::time::Instant;

use ratatui::{
    layout::Rect,
    widgets::{Block, BorderType},
};

use super::picker::Picker;
use crate::config::{AppConfig, SELECTOR_HINT};
use crate::core::path::SelectedPath;
use crate::i18n::{MessageKey, Messages};
use crate::ui::selector::{SelectorTarget, WorkingDirSelector};
use crate::ui::theme::Theme;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Selector,
    Picker,
    Help,
}

/// Text shown in the status bar until the next action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Top-level application state.
pub struct AppState {
    /// The working directory, if one is chosen.
    pub selected: Option<SelectedPath>,
    pub config: AppConfig,
    pub messages: Messages,
    pub active_view: ActiveView,
    /// Built-in picker, present while it is open.
    pub picker: Option<Picker>,
    /// Keyboard focus within the selector bar (a button).
    pub focus: SelectorTarget,
    /// Part of the selector bar under the mouse pointer.
    pub hover: Option<SelectorTarget>,
    pub status: Option<StatusMessage>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Bumped for every browse request; results from older requests are
    /// dropped.
    pub browse_generation: u64,
    /// An external picker command is running.
    pub external_pending: bool,
    /// Full terminal area from the last draw (for mouse hit-testing).
    pub terminal_area: Rect,
    /// Last left-clicked picker row and click time, for double-click.
    pub last_click: Option<(PathBuf, Instant)>,
}

impl AppState {
    pub fn new(selected: Option<SelectedPath>, config: AppConfig, messages: Messages) -> Self {
        Self {
            selected,
            config,
            messages,
            active_view: ActiveView::default(),
            picker: None,
            focus: SelectorTarget::Browse,
            hover: None,
            status: None,
            should_quit: false,
            browse_generation: 0,
            external_pending: false,
            terminal_area: Rect::default(),
            last_click: None,
        }
    }

    /// Replace the working directory.  Keeps focus off the clear button
    /// when it disappears.
    pub fn set_selected(&mut self, selected: Option<SelectedPath>) {
        match &selected {
            Some(path) => tracing::info!(path = %path, "working directory selected"),
            None => tracing::info!("working directory cleared"),
        }
        self.selected = selected;
        if self.selected.is_none() {
            if self.focus == SelectorTarget::Clear {
                self.focus = SelectorTarget::Browse;
            }
            if self.hover == Some(SelectorTarget::Clear) {
                self.hover = None;
            }
        }
    }

    /// The selector widget as drawn this frame.  Used for both rendering and
    /// mouse hit-testing so the two always agree.
    pub fn selector(&self) -> WorkingDirSelector<'_> {
        let focus = (self.active_view == ActiveView::Selector).then_some(self.focus);
        WorkingDirSelector::new(self.selected.as_ref(), &self.messages)
            .style(Theme::selector_style())
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Theme::border_style()),
            )
            .label_max_width(self.config.label_max_width)
            .focus(focus)
            .hover(self.hover)
    }

    /// Status-bar text: explicit message, else a running external picker,
    /// else hover tooltip, else the full path and key hint.
    pub fn status_text(&self) -> (String, bool) {
        if let Some(status) = &self.status {
            return (status.text.clone(), status.is_error);
        }
        if self.external_pending {
            return (self.messages.t(MessageKey::StatusBrowsing).to_string(), false);
        }
        if let Some(target) = self.hover {
            if let Some(tip) = self.selector().view().tooltip(target) {
                return (tip.to_string(), false);
            }
        }
        if self.active_view == ActiveView::Selector {
            let focused = match self.focus {
                SelectorTarget::Clear => MessageKey::WorkingDirClear,
                _ => MessageKey::WorkingDirBrowse,
            };
            let path = self
                .selected
                .as_ref()
                .map(|p| format!("{}  ", p.as_str()))
                .unwrap_or_default();
            return (
                format!(
                    "{path}[{}]  {}",
                    self.messages.t(focused),
                    self.config.hint(SELECTOR_HINT, &self.messages)
                ),
                false,
            );
        }
        (String::new(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;

    fn state(path: Option<&str>) -> AppState {
        AppState::new(
            path.and_then(SelectedPath::new),
            AppConfig::default(),
            Messages::new(Locale::En),
        )
    }

    #[test]
    fn clearing_moves_focus_back_to_browse() {
        let mut s = state(Some("/srv/data"));
        s.focus = SelectorTarget::Clear;
        s.hover = Some(SelectorTarget::Clear);
        s.set_selected(None);
        assert_eq!(s.focus, SelectorTarget::Browse);
        assert_eq!(s.hover, None);
    }

    #[test]
    fn hover_on_label_shows_full_path() {
        let mut s = state(Some("/home/user/projects/demo"));
        s.hover = Some(SelectorTarget::Label);
        assert_eq!(s.status_text().0, "/home/user/projects/demo");
    }

    #[test]
    fn hover_on_label_without_path_falls_through_to_hint() {
        let mut s = state(None);
        s.hover = Some(SelectorTarget::Label);
        let (text, is_error) = s.status_text();
        assert!(text.starts_with("[Browse for a working directory]"));
        assert!(!is_error);
    }

    #[test]
    fn running_external_picker_is_shown() {
        let mut s = state(Some("/srv"));
        s.external_pending = true;
        assert_eq!(
            s.status_text(),
            ("Waiting for the external picker…".to_string(), false)
        );
        s.status = Some(StatusMessage::info("done"));
        assert_eq!(s.status_text().0, "done");
    }

    #[test]
    fn selector_bar_uses_theme_style() {
        let s = state(None);
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = ratatui::buffer::Buffer::empty(area);
        ratatui::widgets::Widget::render(s.selector(), area, &mut buf);
        let cell = buf.cell((30, 1)).unwrap();
        assert_eq!(cell.fg, Theme::selector_style().fg.unwrap());
    }

    #[test]
    fn explicit_status_wins() {
        let mut s = state(Some("/srv"));
        s.hover = Some(SelectorTarget::Browse);
        s.status = Some(StatusMessage::error("boom"));
        assert_eq!(s.status_text(), ("boom".to_string(), true));
    }
}
