//! The working-directory selector bar.
//!
//! A one-row widget showing a folder icon, the last segment of the selected
//! path (or a muted "not set" placeholder), a browse button and, only when a
//! path is set, a clear button.
//!
//! The widget owns no state.  It is built fresh every frame from the caller's
//! `Option<&SelectedPath>`, and user intent flows back out as
//! [`SelectorIntent`]s delivered to a [`SelectorHandler`].  Whether browsing
//! succeeds, and what the new path is, is entirely the handler's business.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Widget},
};

use crate::core::path::SelectedPath;
use crate::i18n::{MessageKey, Messages};

use super::theme::Theme;

const FOLDER_ICON: &str = "▸ ";
const ICON_WIDTH: u16 = 2;
const BROWSE_GLYPH: &str = "[…]";
const CLEAR_GLYPH: &str = "[×]";
const BUTTON_WIDTH: u16 = 3;
const GAP: u16 = 1;
const ELLIPSIS: &str = "…";

// ───────────────────────────────────────── intents ───────────

/// Interactive parts of the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorTarget {
    Label,
    Browse,
    Clear,
}

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorIntent {
    Browse,
    Clear,
}

impl SelectorIntent {
    /// Intent triggered by activating `target`.  The label is inert.
    pub fn from_target(target: SelectorTarget) -> Option<Self> {
        match target {
            SelectorTarget::Label => None,
            SelectorTarget::Browse => Some(SelectorIntent::Browse),
            SelectorTarget::Clear => Some(SelectorIntent::Clear),
        }
    }
}

/// Receiver of the selector's two callbacks.
///
/// `browse_requested` only *starts* a browse; it must return promptly and
/// deliver the chosen directory later through the caller's own channels.
pub trait SelectorHandler {
    fn browse_requested(&mut self);
    fn clear_requested(&mut self);
}

/// Forward one intent to `handler`, invoking exactly one callback once.
pub fn dispatch<H: SelectorHandler + ?Sized>(intent: SelectorIntent, handler: &mut H) {
    match intent {
        SelectorIntent::Browse => handler.browse_requested(),
        SelectorIntent::Clear => handler.clear_requested(),
    }
}

// ───────────────────────────────────────── view model ────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView<'a> {
    pub glyph: &'static str,
    pub tooltip: &'a str,
}

/// Everything the bar shows, independent of where it is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorView<'a> {
    /// Text in the label slot (path segment or placeholder).
    pub label: &'a str,
    /// `true` when `label` is the "not set" placeholder.
    pub placeholder: bool,
    /// Full path, shown when hovering the label.
    pub hover_label: Option<&'a str>,
    pub browse: ButtonView<'a>,
    /// Present only when a path is selected.
    pub clear: Option<ButtonView<'a>>,
}

impl<'a> SelectorView<'a> {
    /// Tooltip for a hovered target, if any.
    pub fn tooltip(&self, target: SelectorTarget) -> Option<&'a str> {
        match target {
            SelectorTarget::Label => self.hover_label,
            SelectorTarget::Browse => Some(self.browse.tooltip),
            SelectorTarget::Clear => self.clear.as_ref().map(|c| c.tooltip),
        }
    }
}

/// Screen rectangles of the bar's parts, for drawing and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorGeometry {
    pub icon: Rect,
    pub label: Rect,
    pub browse: Rect,
    pub clear: Option<Rect>,
}

impl SelectorGeometry {
    /// Which part of the bar (if any) is under the terminal cell.
    pub fn hit(&self, column: u16, row: u16) -> Option<SelectorTarget> {
        let pos = Position::new(column, row);
        if self.browse.contains(pos) {
            Some(SelectorTarget::Browse)
        } else if self.clear.is_some_and(|r| r.contains(pos)) {
            Some(SelectorTarget::Clear)
        } else if self.label.contains(pos) || self.icon.contains(pos) {
            Some(SelectorTarget::Label)
        } else {
            None
        }
    }
}

/// Advance `x` by `width` and return the slot it covered, clipped to `row`.
fn slot(x: &mut u16, width: u16, row: Rect) -> Rect {
    let r = Rect::new(*x, row.y, width, row.height).intersection(row);
    *x = x.saturating_add(width);
    r
}

// ───────────────────────────────────────── widget ────────────

/// The selector widget, created fresh each frame.
pub struct WorkingDirSelector<'a> {
    selected: Option<&'a SelectedPath>,
    messages: &'a Messages,
    style: Style,
    block: Option<Block<'a>>,
    label_max_width: u16,
    focus: Option<SelectorTarget>,
    hover: Option<SelectorTarget>,
}

impl<'a> WorkingDirSelector<'a> {
    pub fn new(selected: Option<&'a SelectedPath>, messages: &'a Messages) -> Self {
        Self {
            selected,
            messages,
            style: Style::default(),
            block: None,
            label_max_width: u16::MAX,
            focus: None,
            hover: None,
        }
    }

    /// Base style applied under everything the bar draws.
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Labels wider than this are clipped and end with `…`.
    pub fn label_max_width(mut self, width: u16) -> Self {
        self.label_max_width = width.max(1);
        self
    }

    /// Keyboard-focused button, drawn highlighted.
    pub fn focus(mut self, focus: Option<SelectorTarget>) -> Self {
        self.focus = focus;
        self
    }

    /// Target currently under the mouse pointer.
    pub fn hover(mut self, hover: Option<SelectorTarget>) -> Self {
        self.hover = hover;
        self
    }

    /// The pure view model for the current inputs.
    pub fn view(&self) -> SelectorView<'a> {
        let (label, placeholder, hover_label) = match self.selected {
            Some(path) => (path.label(), false, Some(path.as_str())),
            None => (self.messages.t(MessageKey::WorkingDirNotSet), true, None),
        };
        SelectorView {
            label,
            placeholder,
            hover_label,
            browse: ButtonView {
                glyph: BROWSE_GLYPH,
                tooltip: self.messages.t(MessageKey::WorkingDirBrowse),
            },
            clear: self.selected.map(|_| ButtonView {
                glyph: CLEAR_GLYPH,
                tooltip: self.messages.t(MessageKey::WorkingDirClear),
            }),
        }
    }

    /// Lay the bar out inside `area` (inside the block, if any).
    pub fn geometry(&self, area: Rect) -> SelectorGeometry {
        let inner = match self.block {
            Some(ref block) => block.inner(area),
            None => area,
        };
        // One text row, vertically centred.
        let row = Rect {
            y: inner.y + inner.height.saturating_sub(1) / 2,
            height: inner.height.min(1),
            ..inner
        };

        let view = self.view();
        let buttons = BUTTON_WIDTH
            + if view.clear.is_some() {
                GAP + BUTTON_WIDTH
            } else {
                0
            };
        let natural = Line::raw(view.label).width().min(u16::MAX as usize) as u16;
        let label_width = natural
            .min(self.label_max_width)
            .min(row.width.saturating_sub(ICON_WIDTH + GAP + buttons));

        let mut x = row.x;
        let icon = slot(&mut x, ICON_WIDTH, row);
        let label = slot(&mut x, label_width, row);
        slot(&mut x, GAP, row);
        let browse = slot(&mut x, BUTTON_WIDTH, row);
        let clear = view.clear.as_ref().map(|_| {
            slot(&mut x, GAP, row);
            slot(&mut x, BUTTON_WIDTH, row)
        });

        SelectorGeometry {
            icon,
            label,
            browse,
            clear,
        }
    }

    /// Intent for a click at the given cell, if it lands on a button.
    pub fn intent_at(&self, area: Rect, column: u16, row: u16) -> Option<SelectorIntent> {
        self.geometry(area)
            .hit(column, row)
            .and_then(SelectorIntent::from_target)
    }

    fn button_style(&self, target: SelectorTarget) -> Style {
        let style = if self.focus == Some(target) {
            Theme::button_focus_style()
        } else if self.hover == Some(target) {
            Theme::button_hover_style()
        } else {
            Theme::button_style()
        };
        self.style.patch(style)
    }
}

impl Widget for WorkingDirSelector<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let geometry = self.geometry(area);
        let view = self.view();

        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };
        buf.set_style(inner, self.style);

        if geometry.icon.is_empty() {
            return;
        }

        buf.set_stringn(
            geometry.icon.x,
            geometry.icon.y,
            FOLDER_ICON,
            geometry.icon.width as usize,
            self.style.patch(Theme::folder_icon_style()),
        );

        let label_style = self.style.patch(if view.placeholder {
            Theme::placeholder_style()
        } else {
            Theme::path_style()
        });
        let slot = geometry.label;
        if !slot.is_empty() {
            let natural = Line::raw(view.label).width();
            if natural <= slot.width as usize {
                buf.set_stringn(slot.x, slot.y, view.label, slot.width as usize, label_style);
            } else {
                let keep = slot.width.saturating_sub(1) as usize;
                let (end_x, _) = buf.set_stringn(slot.x, slot.y, view.label, keep, label_style);
                buf.set_string(end_x, slot.y, ELLIPSIS, label_style);
            }
        }

        let browse = geometry.browse;
        buf.set_stringn(
            browse.x,
            browse.y,
            view.browse.glyph,
            browse.width as usize,
            self.button_style(SelectorTarget::Browse),
        );

        if let (Some(rect), Some(clear)) = (geometry.clear, view.clear.as_ref()) {
            buf.set_stringn(
                rect.x,
                rect.y,
                clear.glyph,
                rect.width as usize,
                self.button_style(SelectorTarget::Clear),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use ratatui::style::Modifier;

    #[derive(Default)]
    struct Counter {
        browse: usize,
        clear: usize,
    }

    impl SelectorHandler for Counter {
        fn browse_requested(&mut self) {
            self.browse += 1;
        }
        fn clear_requested(&mut self) {
            self.clear += 1;
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.left()..buf.area.right())
            .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()))
            .collect()
    }

    fn render(widget: WorkingDirSelector<'_>, width: u16) -> Buffer {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf
    }

    #[test]
    fn absent_path_shows_placeholder_without_clear() {
        let messages = Messages::new(Locale::En);
        let view = WorkingDirSelector::new(None, &messages).view();
        assert_eq!(view.label, "Not set");
        assert!(view.placeholder);
        assert_eq!(view.hover_label, None);
        assert!(view.clear.is_none());
        assert_eq!(view.browse.tooltip, "Browse for a working directory");
    }

    #[test]
    fn present_path_shows_last_segment_and_full_hover() {
        let messages = Messages::new(Locale::En);
        let path = SelectedPath::new("/home/user/projects/demo").unwrap();
        let view = WorkingDirSelector::new(Some(&path), &messages).view();
        assert_eq!(view.label, "demo");
        assert!(!view.placeholder);
        assert_eq!(view.hover_label, Some("/home/user/projects/demo"));
        assert_eq!(view.tooltip(SelectorTarget::Label), Some("/home/user/projects/demo"));
        assert_eq!(
            view.clear.map(|c| c.tooltip),
            Some("Clear working directory")
        );
    }

    #[test]
    fn trailing_separator_shows_full_path() {
        let messages = Messages::new(Locale::En);
        let path = SelectedPath::new("/a/b/").unwrap();
        let view = WorkingDirSelector::new(Some(&path), &messages).view();
        assert_eq!(view.label, "/a/b/");
    }

    #[test]
    fn placeholder_follows_locale() {
        let messages = Messages::new(Locale::Zh);
        let view = WorkingDirSelector::new(None, &messages).view();
        assert_eq!(view.label, "未设置");
    }

    #[test]
    fn renders_label_and_both_buttons() {
        let messages = Messages::new(Locale::En);
        let path = SelectedPath::new("/home/user/projects/demo").unwrap();
        let buf = render(WorkingDirSelector::new(Some(&path), &messages), 30);
        assert!(row_text(&buf, 0).starts_with("▸ demo […] [×]"));
    }

    #[test]
    fn renders_placeholder_in_italic_without_clear_button() {
        let messages = Messages::new(Locale::En);
        let buf = render(WorkingDirSelector::new(None, &messages), 30);
        let text = row_text(&buf, 0);
        assert!(text.starts_with("▸ Not set […]"));
        assert!(!text.contains('×'));
        let cell = buf.cell((2, 0)).unwrap();
        assert!(cell.modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn long_labels_are_clipped_with_ellipsis() {
        let messages = Messages::new(Locale::En);
        let path = SelectedPath::new("/x/averyverylongdirectoryname").unwrap();
        let buf = render(
            WorkingDirSelector::new(Some(&path), &messages).label_max_width(8),
            40,
        );
        assert!(row_text(&buf, 0).starts_with("▸ averyve… […] [×]"));
    }

    #[test]
    fn style_hook_is_applied_under_the_bar() {
        let messages = Messages::new(Locale::En);
        let base = Style::default().bg(ratatui::style::Color::Blue);
        let buf = render(WorkingDirSelector::new(None, &messages).style(base), 30);
        assert_eq!(buf.cell((25, 0)).unwrap().bg, ratatui::style::Color::Blue);
    }

    #[test]
    fn hit_testing_matches_layout() {
        let messages = Messages::new(Locale::En);
        let path = SelectedPath::new("/home/user/projects/demo").unwrap();
        let widget = WorkingDirSelector::new(Some(&path), &messages);
        let area = Rect::new(0, 0, 30, 1);
        let geometry = widget.geometry(area);

        assert_eq!(geometry.hit(3, 0), Some(SelectorTarget::Label));
        assert_eq!(geometry.hit(8, 0), Some(SelectorTarget::Browse));
        assert_eq!(geometry.hit(12, 0), Some(SelectorTarget::Clear));
        assert_eq!(geometry.hit(20, 0), None);
        assert_eq!(widget.intent_at(area, 8, 0), Some(SelectorIntent::Browse));
        assert_eq!(widget.intent_at(area, 3, 0), None);
    }

    #[test]
    fn clear_is_unreachable_without_a_path() {
        let messages = Messages::new(Locale::En);
        let widget = WorkingDirSelector::new(None, &messages);
        let area = Rect::new(0, 0, 30, 1);
        let geometry = widget.geometry(area);
        assert!(geometry.clear.is_none());
        for x in 0..30 {
            assert_ne!(widget.intent_at(area, x, 0), Some(SelectorIntent::Clear));
        }
    }

    #[test]
    fn geometry_accounts_for_the_block() {
        let messages = Messages::new(Locale::En);
        let widget = WorkingDirSelector::new(None, &messages)
            .block(Block::bordered());
        let geometry = widget.geometry(Rect::new(0, 0, 30, 3));
        assert_eq!(geometry.icon, Rect::new(1, 1, 2, 1));
        assert_eq!(geometry.browse.y, 1);
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let messages = Messages::new(Locale::En);
        let path = SelectedPath::new("/srv/data").unwrap();
        for width in 0..8 {
            render(WorkingDirSelector::new(Some(&path), &messages), width);
        }
    }

    #[test]
    fn dispatch_invokes_exactly_one_callback() {
        let mut counter = Counter::default();
        dispatch(SelectorIntent::Browse, &mut counter);
        assert_eq!((counter.browse, counter.clear), (1, 0));
        dispatch(SelectorIntent::Clear, &mut counter);
        assert_eq!((counter.browse, counter.clear), (1, 1));
        dispatch(SelectorIntent::Browse, &mut counter);
        assert_eq!((counter.browse, counter.clear), (2, 1));
    }
}
