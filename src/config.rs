//! User configuration: keybindings, locale, picker settings and message
//! overrides.
//!
//! Stored as TOML at `<config dir>/workdir-selector/config.toml`
//! (`~/.config/workdir-selector/config.toml` on Linux).  Every field is
//! optional; missing ones fall back to the defaults below.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::core::fs::ScanConfig;
use crate::error::ConfigError;
use crate::i18n::{Locale, MessageKey, Messages};

const DEFAULT_DOUBLE_CLICK_MS: u64 = 250;
const DEFAULT_LABEL_MAX_WIDTH: u16 = 32;

// ───────────────────────────────────────── actions ───────────

/// Where an action is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// The working-directory bar has focus.
    Selector,
    /// The built-in directory picker is open.
    Picker,
}

/// All configurable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Browse,
    Clear,
    FocusNext,
    Activate,
    OpenHelp,
    Quit,
    MoveUp,
    MoveDown,
    Expand,
    Collapse,
    ParentDir,
    ToggleHidden,
    Choose,
    Cancel,
}

impl Action {
    /// Ordered list of all actions (used for the help popup and the config
    /// file).
    pub const ALL: &[Action] = &[
        Action::Browse,
        Action::Clear,
        Action::FocusNext,
        Action::Activate,
        Action::OpenHelp,
        Action::Quit,
        Action::MoveUp,
        Action::MoveDown,
        Action::Expand,
        Action::Collapse,
        Action::ParentDir,
        Action::ToggleHidden,
        Action::Choose,
        Action::Cancel,
    ];

    pub fn context(self) -> Context {
        match self {
            Action::Browse
            | Action::Clear
            | Action::FocusNext
            | Action::Activate
            | Action::OpenHelp
            | Action::Quit => Context::Selector,
            Action::MoveUp
            | Action::MoveDown
            | Action::Expand
            | Action::Collapse
            | Action::ParentDir
            | Action::ToggleHidden
            | Action::Choose
            | Action::Cancel => Context::Picker,
        }
    }

    /// Message used as the human-readable label.
    pub fn message_key(self) -> MessageKey {
        match self {
            Action::Browse => MessageKey::ActionBrowse,
            Action::Clear => MessageKey::ActionClear,
            Action::FocusNext => MessageKey::ActionFocusNext,
            Action::Activate => MessageKey::ActionActivate,
            Action::OpenHelp => MessageKey::ActionHelp,
            Action::Quit => MessageKey::ActionQuit,
            Action::MoveUp => MessageKey::ActionMoveUp,
            Action::MoveDown => MessageKey::ActionMoveDown,
            Action::Expand => MessageKey::ActionExpand,
            Action::Collapse => MessageKey::ActionCollapse,
            Action::ParentDir => MessageKey::ActionParentDir,
            Action::ToggleHidden => MessageKey::ActionToggleHidden,
            Action::Choose => MessageKey::ActionChoose,
            Action::Cancel => MessageKey::ActionCancel,
        }
    }

    /// Key used in the `[keys]` table.
    fn config_key(self) -> &'static str {
        match self {
            Action::Browse => "browse",
            Action::Clear => "clear",
            Action::FocusNext => "focus_next",
            Action::Activate => "activate",
            Action::OpenHelp => "help",
            Action::Quit => "quit",
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::Expand => "expand",
            Action::Collapse => "collapse",
            Action::ParentDir => "parent_dir",
            Action::ToggleHidden => "toggle_hidden",
            Action::Choose => "choose",
            Action::Cancel => "cancel",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

/// Actions listed in the status bar while the selector has focus.
pub const SELECTOR_HINT: &[Action] = &[Action::Browse, Action::Clear, Action::OpenHelp, Action::Quit];

/// Actions listed in the picker footer.
pub const PICKER_HINT: &[Action] = &[
    Action::Choose,
    Action::ParentDir,
    Action::ToggleHidden,
    Action::Cancel,
];

// ───────────────────────────────────────── key bind ──────────

/// A single key binding (key code plus modifiers).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
        .union(KeyModifiers::ALT)
        .union(KeyModifiers::SHIFT);

    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT are
    /// compared.  SHIFT is ignored for character keys because terminals
    /// report `?` as `Shift+?` on some layouts and plain `?` on others.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mut mask = Self::MODIFIER_MASK;
        if matches!(self.code, KeyCode::Char(_)) {
            mask.remove(KeyModifiers::SHIFT);
        }
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Ctrl+b"`, `"↑"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = self.modifier_prefix();
        s.push_str(&match self.code {
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::Char('+') => "+".into(),
            _ => self.code_name(),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"Alt+Up"`, `"Ctrl+c"`, `"q"`).
    pub fn to_config_string(&self) -> String {
        let mut s = self.modifier_prefix();
        s.push_str(&self.code_name());
        s
    }

    fn modifier_prefix(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        s
    }

    fn code_name(&self) -> String {
        match self.code {
            KeyCode::Char(' ') => "Space".into(),
            // A bare "+" would read back as a modifier separator.
            KeyCode::Char('+') => "Plus".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Backspace => "Backspace".into(),
            KeyCode::Delete => "Delete".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        }
    }

    /// Parse a key string like `"Ctrl+b"`, `"Alt+Up"`, `"q"`, `"Enter"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        // A lone "+" is the plus key, not a modifier separator.
        if s == "+" {
            return Some(Self::new(KeyCode::Char('+'), KeyModifiers::NONE));
        }
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let (key_part, mods) = parts.split_last()?;

        for part in mods {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            "plus" => KeyCode::Char('+'),
            lower if lower.starts_with('f') && lower.len() > 1 => {
                let n: u8 = lower[1..].parse().ok()?;
                KeyCode::F(n)
            }
            // Keep the original case for single characters ("B" ≠ "b").
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── file format ───────

/// On-disk representation.  Kept separate from [`AppConfig`] so the runtime
/// type can hold parsed key bindings instead of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
    show_hidden: bool,
    respect_gitignore: bool,
    double_click_ms: u64,
    label_max_width: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    browse_command: Option<String>,
    keys: BTreeMap<String, Vec<String>>,
    messages: BTreeMap<String, String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            locale: None,
            show_hidden: false,
            respect_gitignore: true,
            double_click_ms: DEFAULT_DOUBLE_CLICK_MS,
            label_max_width: DEFAULT_LABEL_MAX_WIDTH,
            browse_command: None,
            keys: BTreeMap::new(),
            messages: BTreeMap::new(),
        }
    }
}

// ───────────────────────────────────────── config ────────────

/// Effective application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Explicit locale; `None` means "detect from the environment".
    pub locale: Option<Locale>,
    /// Listing options for the built-in picker.
    pub scan: ScanConfig,
    /// Double-click detection window for choosing a directory with the mouse.
    pub double_click_ms: u64,
    /// Widest label the selector shows before clipping with `…`.
    pub label_max_width: u16,
    /// External picker command, e.g. `zenity --file-selection --directory`.
    pub browse_command: Option<String>,
    /// Message overrides keyed by message id.
    pub messages: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_file(ConfigFile::default())
    }
}

impl AppConfig {
    /// Built-in key bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(Browse, vec![KeyBind::new(Char('b'), n)]);
        m.insert(Clear, vec![KeyBind::new(Char('x'), n), KeyBind::new(Delete, n)]);
        m.insert(FocusNext, vec![KeyBind::new(Tab, n)]);
        m.insert(Activate, vec![KeyBind::new(Enter, n), KeyBind::new(Char(' '), n)]);
        m.insert(OpenHelp, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);
        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Expand, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(Collapse, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(ParentDir, vec![KeyBind::new(Backspace, n)]);
        m.insert(ToggleHidden, vec![KeyBind::new(Char('.'), n)]);
        m.insert(Choose, vec![KeyBind::new(Enter, n)]);
        m.insert(Cancel, vec![KeyBind::new(Esc, n)]);

        m
    }

    /// Find the action in `context` that matches a key event.  When several
    /// bindings match, the one with the most modifiers wins.
    pub fn match_key(&self, context: Context, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        // Iterate in a fixed order so ties resolve the same way every run.
        for &action in Action::ALL {
            if action.context() != context {
                continue;
            }
            let Some(binds) = self.bindings.get(&action) else {
                continue;
            };
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "—".into(),
        }
    }

    /// Short display of the first binding only.
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build a hint line like `"b: browse | x: clear"` for `actions`.
    pub fn hint(&self, actions: &[Action], messages: &Messages) -> String {
        actions
            .iter()
            .map(|&a| format!("{}: {}", self.short_binding(a), messages.t(a.message_key())))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Messages for the effective locale, with overrides applied.
    /// `cli_locale` wins over the config file, which wins over the
    /// environment.
    pub fn messages(&self, cli_locale: Option<Locale>) -> Messages {
        let locale = cli_locale
            .or(self.locale)
            .unwrap_or_else(Locale::from_env);
        Messages::new(locale).with_overrides(&self.messages)
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path`.  A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(s)?;
        Ok(Self::from_file(file))
    }

    /// Persist the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.to_file())?)
    }

    fn from_file(file: ConfigFile) -> Self {
        let mut bindings = Self::default_bindings();
        for (key, values) in &file.keys {
            let Some(action) = Action::from_config_key(key) else {
                tracing::warn!(key = %key, "ignoring unknown action in [keys]");
                continue;
            };
            let parsed: Vec<KeyBind> = values
                .iter()
                .filter_map(|v| {
                    let bind = KeyBind::parse(v);
                    if bind.is_none() {
                        tracing::warn!(action = %key, key = %v, "ignoring unparsable key");
                    }
                    bind
                })
                .collect();
            if !parsed.is_empty() {
                bindings.insert(action, parsed);
            }
        }

        let locale = file.locale.as_deref().and_then(|l| match l.parse() {
            Ok(locale) => Some(locale),
            Err(err) => {
                tracing::warn!(%err, "ignoring locale from config");
                None
            }
        });

        Self {
            bindings,
            locale,
            scan: ScanConfig {
                show_hidden: file.show_hidden,
                respect_gitignore: file.respect_gitignore,
            },
            // Keep these bounded for predictable UX.
            double_click_ms: file.double_click_ms.clamp(100, 2000),
            label_max_width: file.label_max_width.clamp(8, 120),
            browse_command: file.browse_command.filter(|c| !c.trim().is_empty()),
            messages: file.messages,
        }
    }

    fn to_file(&self) -> ConfigFile {
        let keys = Action::ALL
            .iter()
            .filter_map(|&action| {
                let binds = self.bindings.get(&action)?;
                let values = binds.iter().map(KeyBind::to_config_string).collect();
                Some((action.config_key().to_string(), values))
            })
            .collect();
        ConfigFile {
            locale: self.locale.map(|l| l.code().to_string()),
            show_hidden: self.scan.show_hidden,
            respect_gitignore: self.scan.respect_gitignore,
            double_click_ms: self.double_click_ms,
            label_max_width: self.label_max_width,
            browse_command: self.browse_command.clone(),
            keys,
            messages: self.messages.clone(),
        }
    }
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
        .join("config.toml")
}
