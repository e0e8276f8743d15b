//! Message catalogue: every user-visible string, keyed by a stable id.
//!
//! Built-in texts exist for English and Simplified Chinese.  Individual
//! messages can be overridden from the `[messages]` table of the config file
//! using the same ids (e.g. `"workingDir.notSet" = "nothing yet"`).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ───────────────────────────────────────── locale ────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Guess the locale from `LC_ALL` / `LC_MESSAGES` / `LANG`.
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts plain codes (`en`, `zh`) and POSIX forms (`zh_CN.UTF-8`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s
            .split(|c| c == '_' || c == '-' || c == '.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" | "c" | "posix" => Ok(Locale::En),
            "zh" => Ok(Locale::Zh),
            _ => Err(format!("unsupported locale `{s}`")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ───────────────────────────────────────── keys ──────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    WorkingDirNotSet,
    WorkingDirBrowse,
    WorkingDirClear,
    PickerTitle,
    PickerLoading,
    PickerEmpty,
    HelpTitle,
    HelpHint,
    StatusCleared,
    StatusSelected,
    StatusCancelled,
    StatusBrowseFailed,
    StatusBrowsing,
    ActionBrowse,
    ActionClear,
    ActionFocusNext,
    ActionActivate,
    ActionHelp,
    ActionQuit,
    ActionMoveUp,
    ActionMoveDown,
    ActionExpand,
    ActionCollapse,
    ActionParentDir,
    ActionToggleHidden,
    ActionChoose,
    ActionCancel,
}

impl MessageKey {
    pub const ALL: &[MessageKey] = &[
        MessageKey::WorkingDirNotSet,
        MessageKey::WorkingDirBrowse,
        MessageKey::WorkingDirClear,
        MessageKey::PickerTitle,
        MessageKey::PickerLoading,
        MessageKey::PickerEmpty,
        MessageKey::HelpTitle,
        MessageKey::HelpHint,
        MessageKey::StatusCleared,
        MessageKey::StatusSelected,
        MessageKey::StatusCancelled,
        MessageKey::StatusBrowseFailed,
        MessageKey::StatusBrowsing,
        MessageKey::ActionBrowse,
        MessageKey::ActionClear,
        MessageKey::ActionFocusNext,
        MessageKey::ActionActivate,
        MessageKey::ActionHelp,
        MessageKey::ActionQuit,
        MessageKey::ActionMoveUp,
        MessageKey::ActionMoveDown,
        MessageKey::ActionExpand,
        MessageKey::ActionCollapse,
        MessageKey::ActionParentDir,
        MessageKey::ActionToggleHidden,
        MessageKey::ActionChoose,
        MessageKey::ActionCancel,
    ];

    /// Stable id used in config overrides.
    pub fn id(self) -> &'static str {
        match self {
            MessageKey::WorkingDirNotSet => "workingDir.notSet",
            MessageKey::WorkingDirBrowse => "workingDir.browse",
            MessageKey::WorkingDirClear => "workingDir.clear",
            MessageKey::PickerTitle => "picker.title",
            MessageKey::PickerLoading => "picker.loading",
            MessageKey::PickerEmpty => "picker.empty",
            MessageKey::HelpTitle => "help.title",
            MessageKey::HelpHint => "help.hint",
            MessageKey::StatusCleared => "status.cleared",
            MessageKey::StatusSelected => "status.selected",
            MessageKey::StatusCancelled => "status.cancelled",
            MessageKey::StatusBrowseFailed => "status.browseFailed",
            MessageKey::StatusBrowsing => "status.browsing",
            MessageKey::ActionBrowse => "action.browse",
            MessageKey::ActionClear => "action.clear",
            MessageKey::ActionFocusNext => "action.focusNext",
            MessageKey::ActionActivate => "action.activate",
            MessageKey::ActionHelp => "action.help",
            MessageKey::ActionQuit => "action.quit",
            MessageKey::ActionMoveUp => "action.moveUp",
            MessageKey::ActionMoveDown => "action.moveDown",
            MessageKey::ActionExpand => "action.expand",
            MessageKey::ActionCollapse => "action.collapse",
            MessageKey::ActionParentDir => "action.parentDir",
            MessageKey::ActionToggleHidden => "action.toggleHidden",
            MessageKey::ActionChoose => "action.choose",
            MessageKey::ActionCancel => "action.cancel",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }

    fn builtin(self, locale: Locale) -> &'static str {
        use MessageKey::*;
        match locale {
            Locale::En => match self {
                WorkingDirNotSet => "Not set",
                WorkingDirBrowse => "Browse for a working directory",
                WorkingDirClear => "Clear working directory",
                PickerTitle => "Choose a directory",
                PickerLoading => "Loading…",
                PickerEmpty => "(no sub-directories)",
                HelpTitle => "Controls",
                HelpHint => "Esc: close",
                StatusCleared => "Working directory cleared",
                StatusSelected => "Working directory:",
                StatusCancelled => "Browse cancelled",
                StatusBrowseFailed => "Browse failed:",
                StatusBrowsing => "Waiting for the external picker…",
                ActionBrowse => "browse",
                ActionClear => "clear",
                ActionFocusNext => "next button",
                ActionActivate => "press button",
                ActionHelp => "help",
                ActionQuit => "quit",
                ActionMoveUp => "up",
                ActionMoveDown => "down",
                ActionExpand => "expand",
                ActionCollapse => "collapse",
                ActionParentDir => "parent",
                ActionToggleHidden => "hidden",
                ActionChoose => "choose",
                ActionCancel => "cancel",
            },
            Locale::Zh => match self {
                WorkingDirNotSet => "未设置",
                WorkingDirBrowse => "选择工作目录",
                WorkingDirClear => "清除工作目录",
                PickerTitle => "选择目录",
                PickerLoading => "加载中…",
                PickerEmpty => "（没有子目录）",
                HelpTitle => "按键",
                HelpHint => "Esc: 关闭",
                StatusCleared => "已清除工作目录",
                StatusSelected => "工作目录：",
                StatusCancelled => "已取消选择",
                StatusBrowseFailed => "选择目录失败：",
                StatusBrowsing => "等待外部选择器…",
                ActionBrowse => "浏览",
                ActionClear => "清除",
                ActionFocusNext => "切换按钮",
                ActionActivate => "按下按钮",
                ActionHelp => "帮助",
                ActionQuit => "退出",
                ActionMoveUp => "上移",
                ActionMoveDown => "下移",
                ActionExpand => "展开",
                ActionCollapse => "折叠",
                ActionParentDir => "上级目录",
                ActionToggleHidden => "隐藏项",
                ActionChoose => "选择",
                ActionCancel => "取消",
            },
        }
    }
}

// ───────────────────────────────────────── catalogue ─────────

/// Resolved strings for one locale plus any user overrides.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    locale: Locale,
    overrides: HashMap<MessageKey, String>,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            overrides: HashMap::new(),
        }
    }

    /// Apply overrides keyed by message id.  Unknown ids are logged and
    /// skipped.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (id, text) in overrides {
            match MessageKey::from_id(id) {
                Some(key) => {
                    self.overrides.insert(key, text.clone());
                }
                None => tracing::warn!(id = %id, "ignoring unknown message override"),
            }
        }
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Look up the text for `key`.
    pub fn t(&self, key: MessageKey) -> &str {
        self.overrides
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.builtin(self.locale))
    }
}
