//! Input handling: maps key/mouse events and background results to state
//! mutations.

use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::config::{Action, Context};
use crate::core::fs;
use crate::core::path::SelectedPath;
use crate::i18n::MessageKey;
use crate::ui::browser::PickerPopup;
use crate::ui::layout::AppLayout;
use crate::ui::selector::{self, SelectorHandler, SelectorIntent, SelectorTarget};

use super::browse::{self, BrowseUpdate};
use super::event::AppEvent;
use super::picker::{Picker, PickerOutcome, ScanRequest};
use super::state::{ActiveView, AppState, StatusMessage};

type Sender = mpsc::UnboundedSender<AppEvent>;

/// Apply one event to the state.
pub fn handle_event(state: &mut AppState, event: AppEvent, tx: &Sender) {
    match event {
        AppEvent::Key(key) => handle_key(state, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(state, mouse, tx),
        AppEvent::Browse(update) => handle_browse(state, update),
        AppEvent::Resize(width, height) => {
            state.terminal_area = Rect::new(0, 0, width, height);
        }
        AppEvent::Tick => {}
    }
}

// ── Selector callbacks ──────────────────────────────────────────

/// The host side of the selector: owns the path and starts browsing.
struct Host<'a> {
    state: &'a mut AppState,
    tx: &'a Sender,
}

impl SelectorHandler for Host<'_> {
    fn browse_requested(&mut self) {
        start_browse(self.state, self.tx);
    }

    fn clear_requested(&mut self) {
        self.state.set_selected(None);
        self.state.status = Some(StatusMessage::info(
            self.state.messages.t(MessageKey::StatusCleared),
        ));
    }
}

fn dispatch(state: &mut AppState, intent: SelectorIntent, tx: &Sender) {
    // The clear button only exists while a path is set.
    if intent == SelectorIntent::Clear && state.selected.is_none() {
        return;
    }
    selector::dispatch(intent, &mut Host { state, tx });
}

/// Start a browse.  Any browse still in flight is superseded.
fn start_browse(state: &mut AppState, tx: &Sender) {
    state.browse_generation = state.browse_generation.wrapping_add(1);
    let generation = state.browse_generation;
    let start = fs::picker_start_dir(state.selected.as_ref());

    if let Some(command) = state.config.browse_command.clone() {
        tracing::info!(generation, %command, "browse via external command");
        state.picker = None;
        state.active_view = ActiveView::Selector;
        state.external_pending = true;
        browse::spawn_external(tx.clone(), generation, command, start);
        return;
    }

    tracing::info!(generation, start = %start.display(), "opening picker");
    let picker = Picker::new(start, state.config.scan, generation);
    browse::spawn_scan(tx.clone(), generation, picker.initial_request(), picker.scan);
    state.picker = Some(picker);
    state.active_view = ActiveView::Picker;
    state.hover = None;
    state.last_click = None;
}

fn finish_browse(state: &mut AppState, chosen: Option<&Path>) {
    state.picker = None;
    state.active_view = ActiveView::Selector;
    state.last_click = None;
    match chosen.and_then(SelectedPath::from_path) {
        Some(path) => {
            state.status = Some(StatusMessage::info(format!(
                "{} {}",
                state.messages.t(MessageKey::StatusSelected),
                path
            )));
            state.set_selected(Some(path));
        }
        None => {
            tracing::debug!("browse cancelled");
            state.status = Some(StatusMessage::info(
                state.messages.t(MessageKey::StatusCancelled),
            ));
        }
    }
}

// ── Keyboard ────────────────────────────────────────────────────

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent, tx: &Sender) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Selector => handle_selector_key(state, key, tx),
        ActiveView::Picker => handle_picker_key(state, key, tx),
        ActiveView::Help => handle_help_key(state, key),
    }
}

fn handle_selector_key(state: &mut AppState, key: KeyEvent, tx: &Sender) {
    let Some(action) = state.config.match_key(Context::Selector, key) else {
        return;
    };
    state.status = None;

    match action {
        Action::Browse => dispatch(state, SelectorIntent::Browse, tx),
        Action::Clear => dispatch(state, SelectorIntent::Clear, tx),
        Action::FocusNext => {
            state.focus = match state.focus {
                SelectorTarget::Browse if state.selected.is_some() => SelectorTarget::Clear,
                _ => SelectorTarget::Browse,
            };
        }
        Action::Activate => {
            if let Some(intent) = SelectorIntent::from_target(state.focus) {
                dispatch(state, intent, tx);
            }
        }
        Action::OpenHelp => state.active_view = ActiveView::Help,
        Action::Quit => state.should_quit = true,
        _ => {}
    }
}

fn handle_picker_key(state: &mut AppState, key: KeyEvent, tx: &Sender) {
    let Some(action) = state.config.match_key(Context::Picker, key) else {
        return;
    };
    let Some(picker) = state.picker.as_mut() else {
        state.active_view = ActiveView::Selector;
        return;
    };

    let request = match action {
        Action::MoveUp => {
            picker.move_up();
            None
        }
        Action::MoveDown => {
            picker.move_down();
            None
        }
        Action::Expand => picker.expand_selected(),
        Action::Collapse => {
            picker.collapse_selected();
            None
        }
        Action::ParentDir => picker.go_to_parent(),
        Action::ToggleHidden => Some(picker.toggle_hidden()),
        Action::Choose => {
            if let PickerOutcome::Chosen(path) = picker.choose() {
                finish_browse(state, Some(&path));
            }
            return;
        }
        Action::Cancel => {
            finish_browse(state, None);
            return;
        }
        _ => None,
    };

    if let Some(request) = request {
        request_scan(picker, request, tx);
    }
}

fn request_scan(picker: &Picker, request: ScanRequest, tx: &Sender) {
    browse::spawn_scan(tx.clone(), picker.generation, request, picker.scan);
}

fn handle_help_key(state: &mut AppState, key: KeyEvent) {
    let closes = matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
        || state.config.match_key(Context::Selector, key) == Some(Action::OpenHelp);
    if closes {
        state.active_view = ActiveView::Selector;
    }
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, tx: &Sender) {
    match state.active_view {
        ActiveView::Selector => handle_selector_mouse(state, mouse, tx),
        ActiveView::Picker => handle_picker_mouse(state, mouse, tx),
        ActiveView::Help => {
            if let MouseEventKind::Down(_) = mouse.kind {
                state.active_view = ActiveView::Selector;
            }
        }
    }
}

fn handle_selector_mouse(state: &mut AppState, mouse: MouseEvent, tx: &Sender) {
    let area = AppLayout::from_area(state.terminal_area).selector_area;

    match mouse.kind {
        MouseEventKind::Moved => {
            state.hover = state.selector().geometry(area).hit(mouse.column, mouse.row);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            state.status = None;
            let Some(intent) = state.selector().intent_at(area, mouse.column, mouse.row) else {
                return;
            };
            state.focus = match intent {
                SelectorIntent::Browse => SelectorTarget::Browse,
                SelectorIntent::Clear => SelectorTarget::Clear,
            };
            dispatch(state, intent, tx);
        }
        _ => {}
    }
}

fn handle_picker_mouse(state: &mut AppState, mouse: MouseEvent, tx: &Sender) {
    let list_area = PickerPopup::list_area(state.terminal_area);
    let double_click = Duration::from_millis(state.config.double_click_ms);
    let Some(picker) = state.picker.as_mut() else {
        return;
    };

    match mouse.kind {
        MouseEventKind::ScrollUp => picker.move_up(),
        MouseEventKind::ScrollDown => picker.move_down(),
        MouseEventKind::Down(MouseButton::Left) => {
            if mouse.row < list_area.y
                || mouse.row >= list_area.bottom()
                || mouse.column < list_area.x
                || mouse.column >= list_area.right()
            {
                return;
            }
            let row = (mouse.row - list_area.y) as usize + picker.list.offset;
            if !picker.select_row(row) {
                return;
            }
            let Some(path) = picker.selected_path().map(Path::to_path_buf) else {
                return;
            };

            let now = Instant::now();
            let repeat = state
                .last_click
                .as_ref()
                .is_some_and(|(last, at)| *last == path && now.duration_since(*at) <= double_click);
            if repeat {
                finish_browse(state, Some(&path));
                return;
            }

            // A single click on a collapsed directory opens it.
            if let Some(request) = picker.expand_selected() {
                request_scan(picker, request, tx);
            }
            state.last_click = Some((path, now));
        }
        _ => {}
    }
}

// ── Background results ──────────────────────────────────────────

fn handle_browse(state: &mut AppState, update: BrowseUpdate) {
    match update {
        BrowseUpdate::TreeBuilt { generation, result } => {
            if let Some(picker) = state.picker.as_mut() {
                picker.apply_tree(generation, result);
            }
        }
        BrowseUpdate::ChildrenScanned {
            generation,
            path,
            result,
        } => {
            if let Some(picker) = state.picker.as_mut() {
                picker.apply_children(generation, &path, result);
            }
        }
        BrowseUpdate::ExternalFinished { generation, result } => {
            if generation != state.browse_generation {
                tracing::debug!(generation, "dropping stale external picker result");
                return;
            }
            state.external_pending = false;
            match result {
                Ok(chosen) => finish_browse(state, chosen.as_deref()),
                Err(err) => {
                    tracing::warn!(%err, "external picker failed");
                    state.status = Some(StatusMessage::error(format!(
                        "{} {err}",
                        state.messages.t(MessageKey::StatusBrowseFailed)
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::path::PathBuf;

    use crate::config::AppConfig;
    use crate::core::tree::{DirTree, EntryMeta};
    use crate::error::BrowseError;
    use crate::i18n::{Locale, Messages};

    fn state(path: Option<&str>) -> AppState {
        let mut s = AppState::new(
            path.and_then(SelectedPath::new),
            AppConfig::default(),
            Messages::new(Locale::En),
        );
        s.terminal_area = Rect::new(0, 0, 80, 24);
        s
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn meta(path: &str) -> EntryMeta {
        EntryMeta {
            name: Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: PathBuf::from(path),
            is_symlink: false,
        }
    }

    /// Open a picker over a fixed in-memory tree.
    fn open_picker(s: &mut AppState) {
        s.browse_generation = 1;
        let mut picker = Picker::new(PathBuf::from("/r"), s.config.scan, 1);
        let mut tree = DirTree::new(meta("/r"));
        tree.attach_children(tree.root, vec![meta("/r/a"), meta("/r/b")]);
        picker.apply_tree(1, Ok(tree));
        s.picker = Some(picker);
        s.active_view = ActiveView::Picker;
    }

    #[test]
    fn ctrl_c_quits_from_any_view() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(None);
        s.active_view = ActiveView::Help;
        let mut ev = key(KeyCode::Char('c'));
        ev.modifiers = KeyModifiers::CONTROL;
        handle_key(&mut s, ev, &tx);
        assert!(s.should_quit);
    }

    #[test]
    fn clear_key_clears_and_reports() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(Some("/srv/data"));
        handle_key(&mut s, key(KeyCode::Char('x')), &tx);
        assert!(s.selected.is_none());
        assert_eq!(s.status, Some(StatusMessage::info("Working directory cleared")));
    }

    #[test]
    fn clear_without_path_is_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(None);
        handle_key(&mut s, key(KeyCode::Delete), &tx);
        assert!(s.status.is_none());
    }

    #[test]
    fn tab_only_reaches_clear_when_it_is_visible() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(None);
        handle_key(&mut s, key(KeyCode::Tab), &tx);
        assert_eq!(s.focus, SelectorTarget::Browse);

        s.set_selected(SelectedPath::new("/srv"));
        handle_key(&mut s, key(KeyCode::Tab), &tx);
        assert_eq!(s.focus, SelectorTarget::Clear);
        handle_key(&mut s, key(KeyCode::Enter), &tx);
        assert!(s.selected.is_none());
        assert_eq!(s.focus, SelectorTarget::Browse);
    }

    #[test]
    fn browse_opens_picker_without_touching_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = tmp.path().to_string_lossy().into_owned();
        let mut s = state(Some(start.as_str()));

        handle_key(&mut s, key(KeyCode::Char('b')), &tx);
        assert_eq!(s.active_view, ActiveView::Picker);
        assert_eq!(s.selected.as_ref().map(|p| p.as_str()), Some(start.as_str()));
        let picker = s.picker.as_ref().unwrap();
        assert_eq!(picker.root, tmp.path());
        assert_eq!(picker.generation, s.browse_generation);

        let event = rx.blocking_recv().unwrap();
        handle_event(&mut s, event, &tx);
        assert!(!s.picker.as_ref().unwrap().is_loading());
    }

    #[test]
    fn picker_choose_sets_selection() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(None);
        open_picker(&mut s);
        handle_key(&mut s, key(KeyCode::Down), &tx);
        handle_key(&mut s, key(KeyCode::Enter), &tx);
        assert_eq!(s.active_view, ActiveView::Selector);
        assert!(s.picker.is_none());
        assert_eq!(s.selected.as_ref().map(|p| p.as_str()), Some("/r/a"));
    }

    #[test]
    fn picker_cancel_keeps_selection() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(Some("/keep"));
        open_picker(&mut s);
        handle_key(&mut s, key(KeyCode::Esc), &tx);
        assert_eq!(s.active_view, ActiveView::Selector);
        assert_eq!(s.selected.as_ref().map(|p| p.as_str()), Some("/keep"));
        assert_eq!(s.status, Some(StatusMessage::info("Browse cancelled")));
    }

    #[test]
    fn double_click_in_picker_chooses() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(None);
        open_picker(&mut s);
        let list = PickerPopup::list_area(s.terminal_area);
        let click = mouse(MouseEventKind::Down(MouseButton::Left), list.x + 2, list.y + 2);

        handle_mouse(&mut s, click, &tx);
        assert_eq!(s.active_view, ActiveView::Picker);
        assert_eq!(
            s.picker.as_ref().unwrap().selected_path(),
            Some(Path::new("/r/b"))
        );
        handle_mouse(&mut s, click, &tx);
        assert_eq!(s.selected.as_ref().map(|p| p.as_str()), Some("/r/b"));
    }

    #[test]
    fn mouse_hover_and_click_on_selector() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(Some("/home/user/demo"));
        let area = AppLayout::from_area(s.terminal_area).selector_area;
        let geometry = s.selector().geometry(area);

        handle_mouse(
            &mut s,
            mouse(MouseEventKind::Moved, geometry.label.x, geometry.label.y),
            &tx,
        );
        assert_eq!(s.hover, Some(SelectorTarget::Label));
        assert_eq!(s.status_text().0, "/home/user/demo");

        let clear = geometry.clear.unwrap();
        handle_mouse(
            &mut s,
            mouse(MouseEventKind::Down(MouseButton::Left), clear.x, clear.y),
            &tx,
        );
        assert!(s.selected.is_none());
    }

    #[test]
    fn clicking_browse_opens_picker_and_focuses_it() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(Some("/home/user/demo"));
        s.focus = SelectorTarget::Clear;
        let area = AppLayout::from_area(s.terminal_area).selector_area;
        let browse = s.selector().geometry(area).browse;

        handle_mouse(
            &mut s,
            mouse(MouseEventKind::Down(MouseButton::Left), browse.x, browse.y),
            &tx,
        );
        assert_eq!(s.focus, SelectorTarget::Browse);
        assert_eq!(s.active_view, ActiveView::Picker);
        assert_eq!(s.selected.as_ref().map(|p| p.as_str()), Some("/home/user/demo"));
    }

    #[test]
    fn resize_updates_hit_testing_area() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(Some("/home/user/a-considerably-longer-project-name"));
        let wide = AppLayout::from_area(s.terminal_area).selector_area;
        let before = s.selector().geometry(wide).clear.unwrap();

        handle_event(&mut s, AppEvent::Resize(40, 12), &tx);
        assert_eq!(s.terminal_area, Rect::new(0, 0, 40, 12));

        // The label is clipped harder, so the clear button moves left.
        let narrow = AppLayout::from_area(s.terminal_area).selector_area;
        let clear = s.selector().geometry(narrow).clear.unwrap();
        assert!(clear.x < before.x);
        handle_mouse(
            &mut s,
            mouse(MouseEventKind::Down(MouseButton::Left), clear.x, clear.y),
            &tx,
        );
        assert!(s.selected.is_none());
    }

    #[test]
    fn stale_external_result_is_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(Some("/keep"));
        s.browse_generation = 3;
        s.external_pending = true;
        handle_event(
            &mut s,
            AppEvent::Browse(BrowseUpdate::ExternalFinished {
                generation: 2,
                result: Ok(Some(PathBuf::from("/other"))),
            }),
            &tx,
        );
        assert_eq!(s.selected.as_ref().map(|p| p.as_str()), Some("/keep"));
        assert!(s.external_pending);
    }

    #[test]
    fn external_failure_is_reported_not_applied() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(Some("/keep"));
        s.browse_generation = 1;
        handle_event(
            &mut s,
            AppEvent::Browse(BrowseUpdate::ExternalFinished {
                generation: 1,
                result: Err(BrowseError::EmptyCommand),
            }),
            &tx,
        );
        assert_eq!(s.selected.as_ref().map(|p| p.as_str()), Some("/keep"));
        assert!(s.status.as_ref().is_some_and(|m| m.is_error));
    }

    #[test]
    fn help_opens_and_closes() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut s = state(None);
        handle_key(&mut s, key(KeyCode::Char('?')), &tx);
        assert_eq!(s.active_view, ActiveView::Help);
        handle_key(&mut s, key(KeyCode::Esc), &tx);
        assert_eq!(s.active_view, ActiveView::Selector);
    }
}
