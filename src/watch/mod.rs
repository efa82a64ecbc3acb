//! Document file watcher.
//!
//! Relocation is deterministic for a given document and query, so
//! retrying a miss only makes sense after the document has changed.
//! This module watches a document file on disk and emits an event each
//! time it settles after an edit, letting the CLI re-run a relocation
//! against the fresh content.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while watching a document file
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Document file does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("Watched file has no parent directory: {0}")]
    NoParentDirectory(PathBuf),

    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for the document watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Document file to watch
    pub path: PathBuf,

    /// Debounce window for edit bursts (seconds)
    pub debounce_secs: u64,
}

impl WatchConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            debounce_secs: 1,
        }
    }

    /// Check that the watched file exists and has a parent directory.
    pub fn validate(&self) -> Result<(), WatchError> {
        if !self.path.is_file() {
            return Err(WatchError::FileNotFound(self.path.clone()));
        }
        if self.path.parent().is_none() {
            return Err(WatchError::NoParentDirectory(self.path.clone()));
        }
        Ok(())
    }
}

/// Event emitted when the watched document has changed on disk
#[derive(Debug, Clone)]
pub struct DocumentChanged {
    /// Path of the changed document
    pub path: PathBuf,
}

/// Watches a single document file for edits.
///
/// The parent directory is watched rather than the file itself because
/// most editors save by writing a new file and renaming it over the
/// old one, which would drop a direct file watch.
pub struct DocumentWatcher {
    config: WatchConfig,
}

impl DocumentWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            config: WatchConfig::new(path),
        }
    }

    pub fn with_config(config: WatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Watch the document and emit an event per settled edit.
    ///
    /// Runs until stopped via the returned handle.
    pub async fn watch(&self) -> Result<(mpsc::Receiver<DocumentChanged>, WatchHandle)> {
        self.config.validate()?;

        let (event_tx, event_rx) = mpsc::channel::<DocumentChanged>(16);
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

        let config = self.config.clone();

        let task = tokio::spawn(async move {
            if let Err(e) = run_watcher(config, event_tx, &mut stop_rx).await {
                tracing::error!("Watcher error: {}", e);
            }
        });

        Ok((event_rx, WatchHandle { stop_tx, task }))
    }
}

/// Handle to control the watcher
pub struct WatchHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the watcher
    pub async fn stop(self) -> Result<()> {
        let _ = self.stop_tx.send(()).await;
        self.task.await?;
        Ok(())
    }
}

/// Internal watcher loop
async fn run_watcher(
    config: WatchConfig,
    event_tx: mpsc::Sender<DocumentChanged>,
    stop_rx: &mut mpsc::Receiver<()>,
) -> Result<()> {
    let watch_dir = config
        .path
        .parent()
        .ok_or_else(|| WatchError::NoParentDirectory(config.path.clone()))?
        .to_path_buf();
    let file_name = config.path.file_name().map(|n| n.to_os_string());

    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_secs(config.debounce_secs), tx)
        .map_err(WatchError::Notify)?;

    debouncer
        .watcher()
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(WatchError::Notify)?;

    tracing::info!("Watching {} for edits", config.path.display());

    loop {
        if stop_rx.try_recv().is_ok() {
            tracing::info!("Watcher stopping...");
            break;
        }

        match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(Ok(events)) => {
                let ours = events
                    .iter()
                    .any(|e| e.path.file_name().map(|n| n.to_os_string()) == file_name);
                if ours {
                    tracing::debug!("Document changed: {}", config.path.display());
                    let changed = DocumentChanged {
                        path: config.path.clone(),
                    };
                    if event_tx.send(changed).await.is_err() {
                        // Receiver dropped; nothing left to notify.
                        break;
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("Watcher error: {:?}", e);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Expected, loop back to the stop check.
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("Watcher channel disconnected");
                break;
            }
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    Ok(())
}
