//! Popup widget for the built-in directory picker: an indented, collapsible
//! tree of directories with a header showing the root and a key hint footer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, StatefulWidget, Widget},
};

use crate::core::tree::{DirTree, NodeId};

use super::layout::centered_fixed;
use super::theme::Theme;

const POPUP_WIDTH: u16 = 64;
const POPUP_HEIGHT: u16 = 20;

// ───────────────────────────────────────── state ─────────────

/// Selection and scroll position of the picker list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PickerListState {
    /// Index into the visible rows that is currently highlighted.
    pub selected: usize,
    /// First visible row.
    pub offset: usize,
}

impl PickerListState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Ensure the selected row is visible within a viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }
}

// ───────────────────────────────────────── widget ────────────

/// What the list body shows.
pub enum PickerBody<'a> {
    Loading(&'a str),
    Failed(&'a str),
    Tree {
        tree: &'a DirTree,
        /// Shown under the root when it has no sub-directories.
        empty: &'a str,
    },
}

pub struct PickerPopup<'a> {
    title: &'a str,
    root: String,
    body: PickerBody<'a>,
    hint: String,
}

impl<'a> PickerPopup<'a> {
    pub fn new(title: &'a str, root: String, body: PickerBody<'a>, hint: String) -> Self {
        Self {
            title,
            root,
            body,
            hint,
        }
    }

    /// Popup rectangle within the full terminal `area`.
    pub fn popup_area(area: Rect) -> Rect {
        centered_fixed(POPUP_WIDTH, POPUP_HEIGHT, area)
    }

    /// Rows available for the directory list: inside the border, minus the
    /// header and footer lines.
    pub fn list_area(area: Rect) -> Rect {
        let inner = Self::block().inner(Self::popup_area(area));
        Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(2),
            ..inner
        }
    }

    fn block() -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style())
    }

    fn node_line(tree: &DirTree, id: NodeId, selected: bool) -> Line<'static> {
        let node = tree.get(id);
        let indent = "  ".repeat(node.depth);
        let icon = if node.loaded && node.children.is_empty() {
            "· "
        } else if node.expanded {
            "▼ "
        } else {
            "▶ "
        };
        let label = if id == tree.root {
            node.meta.path.display().to_string()
        } else {
            node.meta.name.clone()
        };
        let style = if selected {
            Theme::selected_style()
        } else if node.meta.is_symlink {
            Theme::symlink_style()
        } else {
            Theme::dir_style()
        };
        Line::from(vec![
            Span::raw(indent),
            Span::styled(format!("{icon}{label}"), style),
        ])
    }
}

impl StatefulWidget for PickerPopup<'_> {
    type State = PickerListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let popup = Self::popup_area(area);
        Clear.render(popup, buf);

        let block = Self::block()
            .title(format!(" {} ", self.title))
            .title_style(Theme::title_style());
        let inner = block.inner(popup);
        block.render(popup, buf);
        if inner.height == 0 {
            return;
        }

        buf.set_line(
            inner.x,
            inner.y,
            &Line::from(Span::styled(self.root, Theme::dim_style())),
            inner.width,
        );

        let list = Self::list_area(area);
        match self.body {
            PickerBody::Loading(text) => {
                buf.set_stringn(list.x, list.y, text, list.width as usize, Theme::dim_style());
            }
            PickerBody::Failed(text) => {
                buf.set_stringn(list.x, list.y, text, list.width as usize, Theme::error_style());
            }
            PickerBody::Tree { tree, empty } => {
                let rows = tree.visible_nodes();
                state.selected = state.selected.min(rows.len().saturating_sub(1));
                state.clamp_scroll(list.height as usize);

                for (i, (row_idx, &id)) in rows
                    .iter()
                    .enumerate()
                    .skip(state.offset)
                    .take(list.height as usize)
                    .enumerate()
                {
                    let line = Self::node_line(tree, id, row_idx == state.selected);
                    buf.set_line(list.x, list.y + i as u16, &line, list.width);
                }

                let root = tree.get(tree.root);
                if root.loaded && root.children.is_empty() && list.height > 1 {
                    buf.set_stringn(
                        list.x + 2,
                        list.y + 1,
                        empty,
                        list.width.saturating_sub(2) as usize,
                        Theme::dim_style(),
                    );
                }
            }
        }

        if inner.height > 1 {
            buf.set_stringn(
                inner.x,
                inner.bottom() - 1,
                &self.hint,
                inner.width as usize,
                Theme::key_style(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::EntryMeta;
    use std::path::PathBuf;

    fn meta(path: &str, name: &str) -> EntryMeta {
        EntryMeta {
            name: name.to_string(),
            path: PathBuf::from(path),
            is_symlink: false,
        }
    }

    fn screen_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in buf.area.top()..buf.area.bottom() {
            for x in buf.area.left()..buf.area.right() {
                out.push_str(buf.cell((x, y)).map_or(" ", |c| c.symbol()));
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn list_state_scrolls_to_keep_selection_visible() {
        let mut state = PickerListState::default();
        for _ in 0..10 {
            state.select_next(20);
        }
        state.clamp_scroll(4);
        assert_eq!(state.selected, 10);
        assert_eq!(state.offset, 7);
        state.select_prev();
        state.clamp_scroll(4);
        assert_eq!(state.offset, 7);
        state.select_next(11);
        state.select_next(11);
        assert_eq!(state.selected, 10);
    }

    #[test]
    fn list_area_sits_between_header_and_footer() {
        let area = Rect::new(0, 0, 80, 24);
        let popup = PickerPopup::popup_area(area);
        let list = PickerPopup::list_area(area);
        assert_eq!(list.y, popup.y + 2);
        assert_eq!(list.height, POPUP_HEIGHT - 4);
        assert_eq!(list.x, popup.x + 1);
    }

    #[test]
    fn renders_tree_rows() {
        let mut tree = DirTree::new(meta("/work", "work"));
        tree.attach_children(tree.root, vec![meta("/work/alpha", "alpha"), meta("/work/beta", "beta")]);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        let mut state = PickerListState {
            selected: 1,
            offset: 0,
        };

        PickerPopup::new(
            "Choose a directory",
            "/work".into(),
            PickerBody::Tree {
                tree: &tree,
                empty: "(no sub-directories)",
            },
            "Enter: choose".into(),
        )
        .render(area, &mut buf, &mut state);

        let text = screen_text(&buf);
        assert!(text.contains("Choose a directory"));
        assert!(text.contains("▼ /work"));
        assert!(text.contains("  ▶ alpha"));
        assert!(text.contains("  ▶ beta"));
        assert!(text.contains("Enter: choose"));
        assert!(!text.contains("(no sub-directories)"));
    }

    #[test]
    fn selection_is_clamped_to_rows() {
        let tree = DirTree::new(meta("/work", "work"));
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        let mut state = PickerListState {
            selected: 9,
            offset: 0,
        };
        PickerPopup::new(
            "t",
            "/work".into(),
            PickerBody::Tree {
                tree: &tree,
                empty: "(none)",
            },
            String::new(),
        )
        .render(area, &mut buf, &mut state);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn loading_body_shows_text() {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        PickerPopup::new("t", "/".into(), PickerBody::Loading("Loading…"), String::new())
            .render(area, &mut buf, &mut PickerListState::default());
        assert!(screen_text(&buf).contains("Loading…"));
    }
}
