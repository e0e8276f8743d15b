//! Background browse jobs: directory scans for the built-in picker and the
//! optional external picker command.
//!
//! Every job reports back through the main event channel tagged with the
//! generation it was started for, so the event loop can drop results that
//! arrive after the user has moved on.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::mpsc;

use super::event::AppEvent;
use super::picker::ScanRequest;
use crate::core::fs::{self, ScanConfig};
use crate::core::tree::{DirTree, EntryMeta};
use crate::error::BrowseError;

/// Placeholder in `browse_command` replaced by the picker's start directory.
const DIR_PLACEHOLDER: &str = "{dir}";

#[derive(Debug)]
pub enum BrowseUpdate {
    TreeBuilt {
        generation: u64,
        result: Result<DirTree, BrowseError>,
    },
    ChildrenScanned {
        generation: u64,
        path: PathBuf,
        result: Result<Vec<EntryMeta>, BrowseError>,
    },
    /// `Ok(None)` means the user cancelled the external dialog.
    ExternalFinished {
        generation: u64,
        result: Result<Option<PathBuf>, BrowseError>,
    },
}

/// Run a picker scan on a plain thread; directory listing is blocking I/O.
pub fn spawn_scan(
    tx: mpsc::UnboundedSender<AppEvent>,
    generation: u64,
    request: ScanRequest,
    scan: ScanConfig,
) {
    std::thread::spawn(move || {
        let update = match request {
            ScanRequest::Tree { root } => {
                let t0 = std::time::Instant::now();
                let result = fs::build_tree(&root, &scan);
                tracing::debug!("build_tree: {:.2?} root={}", t0.elapsed(), root.display());
                BrowseUpdate::TreeBuilt { generation, result }
            }
            ScanRequest::Children { path } => {
                let result = fs::scan_subdirs(&path, &scan);
                BrowseUpdate::ChildrenScanned {
                    generation,
                    path,
                    result,
                }
            }
        };
        let _ = tx.send(AppEvent::Browse(update));
    });
}

/// Run the external picker command on the tokio runtime.
pub fn spawn_external(
    tx: mpsc::UnboundedSender<AppEvent>,
    generation: u64,
    command: String,
    start: PathBuf,
) {
    tokio::spawn(async move {
        let result = run_external_picker(&command, &start).await;
        let _ = tx.send(AppEvent::Browse(BrowseUpdate::ExternalFinished {
            generation,
            result,
        }));
    });
}

/// Run `command` and interpret its stdout as the chosen directory.
///
/// The command is split on whitespace (no shell quoting); a `{dir}` argument
/// is replaced with `start`, which is also the working directory.  Empty
/// output or exit status 1 (the zenity/kdialog convention) means cancelled.
pub async fn run_external_picker(
    command: &str,
    start: &Path,
) -> Result<Option<PathBuf>, BrowseError> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or(BrowseError::EmptyCommand)?;
    let start_arg = start.to_string_lossy();
    let args: Vec<&str> = parts
        .map(|a| if a == DIR_PLACEHOLDER { start_arg.as_ref() } else { a })
        .collect();

    tracing::info!(%program, ?args, "starting external picker");
    let output = Command::new(program)
        .args(&args)
        .current_dir(start)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| BrowseError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if !output.status.success() {
        if output.status.code() == Some(1) {
            return Ok(None);
        }
        tracing::warn!(
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "external picker failed"
        );
        return Err(BrowseError::Failed {
            command: command.to_string(),
            status: output.status,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let chosen = stdout.lines().next().unwrap_or_default().trim();
    if chosen.is_empty() {
        return Ok(None);
    }
    let path = start.join(chosen);
    if !path.is_dir() {
        return Err(BrowseError::NotADirectory(path));
    }
    Ok(Some(path))
}
