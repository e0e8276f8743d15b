//! Event plumbing.
//!
//! Terminal input and background browse results share one channel so the
//! main loop only has to wait on a single receiver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::browse::BrowseUpdate;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New terminal size (columns, rows).
    Resize(u16, u16),
    Tick,
    Browse(BrowseUpdate),
}

/// Poll the terminal on a blocking task and forward events to `tx`.
///
/// Stops once every receiver is gone or `stop` is set.  `stop` is checked
/// between `poll` and `read`, so after the returned handle completes no
/// pending input has been consumed.
pub fn spawn_event_reader(
    tx: mpsc::UnboundedSender<AppEvent>,
    tick_rate: Duration,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let event = match event::poll(tick_rate) {
            Ok(true) => {
                // Leave input queued for whoever owns the terminal next.
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                match event::read() {
                    // Windows reports key releases too; only presses matter.
                    Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => AppEvent::Key(k),
                    Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
                    Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                    Ok(_) => continue,
                    Err(err) => {
                        tracing::error!(%err, "terminal read failed");
                        break;
                    }
                }
            }
            Ok(false) => AppEvent::Tick,
            Err(err) => {
                tracing::error!(%err, "terminal poll failed");
                break;
            }
        };
        if tx.send(event).is_err() {
            break; // receiver dropped
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reader_exits_without_polling_once_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(true));
        spawn_event_reader(tx, Duration::from_millis(10), stop)
            .await
            .unwrap();
        assert!(rx.recv().await.is_none());
    }
}
