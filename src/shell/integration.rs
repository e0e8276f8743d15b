//! Functions that emit data for the wrapping shell function.

use std::io::{self, Write};

use clap::ValueEnum;

use crate::core::path::SelectedPath;

const WD_PREFIX: &str = "__WD__=";

/// Shells `--init` can emit a wrapper for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
}

/// Machine-readable exit payload, or `None` when nothing is selected.
pub fn exit_payload(selected: Option<&SelectedPath>) -> Option<String> {
    selected.map(|path| format!("{WD_PREFIX}{path}"))
}

/// Print the exit payload on stdout for shell wrappers.
pub fn print_exit_payload(selected: Option<&SelectedPath>) -> io::Result<()> {
    if let Some(line) = exit_payload(selected) {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
    }
    Ok(())
}

/// Returns the wrapper function users add to their shell rc file.
///
/// The function is called `wd`; it invokes the binary by its package name
/// (read from `Cargo.toml` at compile time) and `cd`s into the chosen
/// directory when the TUI exits successfully.
pub fn shell_function(shell: Shell) -> String {
    let bin = env!("CARGO_PKG_NAME");
    let (test_open, test_close) = match shell {
        Shell::Bash => ("[", "]"),
        Shell::Zsh => ("[[", "]]"),
    };
    format!(
        r#"
# ── {bin}: pick a working directory ──────────────────
# Run `wd` (optionally with a starting path); the chosen directory becomes
# the shell's cwd.
wd() {{
    local output
    output="$(command {bin} "$@")"
    local exit_code=$?
    local dest=""
    while IFS= read -r line; do
        case "$line" in
            {WD_PREFIX}*) dest="${{line#{WD_PREFIX}}}" ;;
        esac
    done <<< "$output"
    if {test_open} $exit_code -eq 0 {test_close} && {test_open} -n "$dest" {test_close} && {test_open} -d "$dest" {test_close}; then
        cd "$dest" || return
    fi
}}
"#
    )
}
