//! Help overlay listing every action and its current key bindings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::config::{Action, AppConfig, Context};
use crate::i18n::{MessageKey, Messages};

use super::layout::centered_fixed;
use super::theme::Theme;

pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
    pub messages: &'a Messages,
}

impl HelpPopup<'_> {
    fn action_line(&self, action: Action, width: usize) -> Line<'static> {
        let label = format!("   {}", self.messages.t(action.message_key()));
        let keys = self.config.display_bindings(action);
        // Label left-aligned, keys right-aligned.
        let label_width = Line::raw(label.as_str()).width();
        let keys_width = width.saturating_sub(label_width).max(1);
        Line::from(vec![
            Span::styled(label, Theme::path_style()),
            Span::styled(format!("{keys:>keys_width$}"), Theme::key_style()),
        ])
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // actions + 2 section blanks + hint line + 2 border
        let height = Action::ALL.len() as u16 + 5;
        let popup = centered_fixed(48, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(format!(" {} ", self.messages.t(MessageKey::HelpTitle)))
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style());

        let inner = block.inner(popup);
        block.render(popup, buf);

        let width = inner.width as usize;
        let mut lines = Vec::new();
        for context in [Context::Selector, Context::Picker] {
            for &action in Action::ALL.iter().filter(|a| a.context() == context) {
                lines.push(self.action_line(action, width));
            }
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(
            format!("  {}", self.messages.t(MessageKey::HelpHint)),
            Theme::dim_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}
