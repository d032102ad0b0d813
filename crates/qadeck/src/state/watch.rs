use anyhow::{Context, Result};
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use super::storage::STATE_KEYS;

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches a deck's state directory for writes by other windows.
///
/// Our own writes show up here too; reloading them is a no-op because the
/// stored values already match the in-memory state.
pub struct StorageWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<()>,
}

impl StorageWatcher {
    /// Start watching `dir`. `wake` runs on the watcher thread after each
    /// relevant change, typically to request a repaint.
    pub fn spawn(dir: &Path, wake: impl Fn() + Send + 'static) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| match res {
            Ok(events) => {
                if events.iter().any(|e| is_state_key(&e.path)) && tx.send(()).is_ok() {
                    wake();
                }
            }
            Err(e) => log::warn!("State watcher error: {e}"),
        })
        .context("Failed to start state watcher")?;

        debouncer
            .watcher()
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        log::debug!("Watching {} for external changes", dir.display());
        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Drain pending notifications. Returns whether any arrived.
    pub fn changed(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}

fn is_state_key(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| STATE_KEYS.contains(&name))
}
