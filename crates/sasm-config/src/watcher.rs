//! Manifest and shader file hot-reload
//!
//! Watches the directories of the manifest and its libraries plus the
//! configured include and resource directories, sending change events
//! through a channel so the caller can re-assemble.

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::{Config, ConfigError, ShaderManifest};

/// Default debounce window
const DEBOUNCE_MS: u64 = 100;

/// Events emitted by the manifest watcher
#[derive(Debug, Clone)]
pub enum ManifestEvent {
    /// A watched file was written or created
    Changed(PathBuf),
    /// The underlying watcher reported an error
    WatchError(String),
}

/// Drops repeated events for the same path inside the debounce window
///
/// Each path has its own timestamp, so writing one file never hides a
/// change to another.
struct Debouncer {
    window: Duration,
    last_event: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last_event: HashMap::new(),
        }
    }

    fn ready(&mut self, path: &Path, now: Instant) -> bool {
        if let Some(last) = self.last_event.get(path) {
            if now.duration_since(*last) < self.window {
                return false;
            }
        }
        self.last_event.insert(path.to_path_buf(), now);
        true
    }
}

/// Watches a manifest and the shader files it may reference
pub struct ManifestWatcher {
    watcher: RecommendedWatcher,
    receiver: Receiver<ManifestEvent>,
    watched: Vec<PathBuf>,
}

impl ManifestWatcher {
    /// Create a watcher with the default 100ms debounce
    pub fn new(manifest: &Path, config: &Config) -> Result<Self, ConfigError> {
        Self::with_debounce(manifest, config, Duration::from_millis(DEBOUNCE_MS))
    }

    /// Create a watcher; changes to one path closer together than `debounce`
    /// are reported once
    ///
    /// Library directories are found by building the manifest once. If that
    /// fails only the manifest's own directory is watched; call
    /// [`watch_dir`](Self::watch_dir) after a later successful build.
    pub fn with_debounce(
        manifest: &Path,
        config: &Config,
        debounce: Duration,
    ) -> Result<Self, ConfigError> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = Debouncer::new(debounce);

        let watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }

                    let Some(path) = event.paths.iter().find(|p| !p.is_dir()) else {
                        return;
                    };

                    if !debouncer.ready(path, Instant::now()) {
                        return;
                    }

                    log::info!("Shader input changed: {:?}", path);
                    let _ = tx.send(ManifestEvent::Changed(path.clone()));
                }
                Err(e) => {
                    log::error!("Watch error: {:?}", e);
                    let _ = tx.send(ManifestEvent::WatchError(e.to_string()));
                }
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        let manifest_dir = manifest
            .canonicalize()
            .map_err(|e| ConfigError::ReadError(manifest.to_path_buf(), e))?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let manifest_dirs = match ShaderManifest::build_tracked(manifest, &config.general) {
            Ok((_, dirs)) => dirs,
            Err(e) => {
                log::warn!("Watching {:?} without its libraries: {}", manifest, e);
                vec![manifest_dir]
            }
        };

        let mut this = Self {
            watcher,
            receiver: rx,
            watched: Vec::new(),
        };

        let dirs = manifest_dirs
            .iter()
            .chain(config.paths.include_dirs.iter())
            .chain(config.paths.resource_dirs.iter());
        for dir in dirs {
            this.watch_dir(dir)?;
        }

        Ok(this)
    }

    /// Start watching `dir` recursively
    ///
    /// Returns `Ok(false)` when the directory is missing or already covered.
    pub fn watch_dir(&mut self, dir: &Path) -> Result<bool, ConfigError> {
        let Ok(dir) = dir.canonicalize() else {
            return Ok(false);
        };
        if !dir.is_dir() || self.watched.contains(&dir) {
            return Ok(false);
        }
        self.watcher
            .watch(&dir, RecursiveMode::Recursive)
            .map_err(|e| ConfigError::WatchError(e.to_string()))?;
        log::info!("Watching directory: {:?}", dir);
        self.watched.push(dir);
        Ok(true)
    }

    /// Directories being watched
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<ManifestEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for an event
    ///
    /// Returns `None` on timeout or when the watcher thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ManifestEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Get all pending events
    pub fn drain_events(&self) -> Vec<ManifestEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
