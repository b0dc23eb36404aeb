use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use sha2::{Digest, Sha256};

use crate::events::{Emitter, SubscriptionId};
use crate::logging;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Files up to this size are also compared by content.
const CONTENT_HASH_LIMIT: u64 = 1 << 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
    digest: Option<[u8; 32]>,
}

impl Fingerprint {
    fn read(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }
        let digest = if metadata.len() <= CONTENT_HASH_LIMIT {
            content_digest(path)
        } else {
            None
        };
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
            digest,
        })
    }
}

fn content_digest(path: &Path) -> Option<[u8; 32]> {
    let bytes = fs::read(path).ok()?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    Some(digest)
}

#[derive(Debug)]
struct WatchEntry {
    path: PathBuf,
    fingerprint: Fingerprint,
}

/// Path-level change notification by polling file metadata.
///
/// A path only enters the watch set while its file exists. When the file
/// disappears the path is reported once and then dropped, so callers that
/// want to keep following an editor's save-by-replace must add it again.
#[derive(Debug)]
pub struct FileWatcher {
    interval: Duration,
    last_poll: Option<Instant>,
    entries: Vec<WatchEntry>,
    changed: Emitter<PathBuf>,
}

impl FileWatcher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_poll: None,
            entries: Vec::new(),
            changed: Emitter::new(),
        }
    }

    /// Returns false when the file does not exist or is already watched.
    pub fn add_path(&mut self, path: &Path) -> bool {
        if self.entries.iter().any(|entry| entry.path == path) {
            return false;
        }
        let Some(fingerprint) = Fingerprint::read(path) else {
            logging::debug(format!("watch skipped, no such file: {}", path.display()));
            return false;
        };
        self.entries.push(WatchEntry {
            path: path.to_path_buf(),
            fingerprint,
        });
        true
    }

    pub fn remove_paths(&mut self, paths: &[PathBuf]) {
        self.entries.retain(|entry| !paths.contains(&entry.path));
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|entry| entry.path.clone()).collect()
    }

    pub fn on_changed(&mut self, handler: impl FnMut(&PathBuf) + 'static) -> SubscriptionId {
        self.changed.subscribe(handler)
    }

    /// Polls when the interval has elapsed since the previous poll.
    pub fn poll(&mut self, now: Instant) -> Vec<PathBuf> {
        if let Some(last) = self.last_poll {
            if now.saturating_duration_since(last) < self.interval {
                return Vec::new();
            }
        }
        self.last_poll = Some(now);
        self.poll_now()
    }

    pub fn poll_now(&mut self) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        self.entries.retain_mut(|entry| match Fingerprint::read(&entry.path) {
            Some(fingerprint) if fingerprint == entry.fingerprint => true,
            Some(fingerprint) => {
                entry.fingerprint = fingerprint;
                changed.push(entry.path.clone());
                true
            }
            None => {
                changed.push(entry.path.clone());
                false
            }
        });
        for path in &changed {
            self.changed.emit(path);
        }
        changed
    }
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

/// Keeps exactly one CSV path under watch and turns notifications into reload requests.
#[derive(Debug, Default)]
pub struct CsvWatch {
    watcher: FileWatcher,
    path: Option<PathBuf>,
}

impl CsvWatch {
    pub fn new(watcher: FileWatcher) -> Self {
        Self {
            watcher,
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn watcher(&self) -> &FileWatcher {
        &self.watcher
    }

    /// Switches to `path`. Returns the path to load, or None for an empty path.
    pub fn watch(&mut self, path: &Path) -> Option<PathBuf> {
        logging::debug(format!("csv path changed: {}", path.display()));
        if path.as_os_str().is_empty() {
            return None;
        }
        let previous = self.watcher.files();
        self.watcher.remove_paths(&previous);
        self.watcher.add_path(path);
        self.path = Some(path.to_path_buf());
        Some(path.to_path_buf())
    }

    /// Re-arms the watch if the file is still there; a reload is requested either way.
    pub fn on_file_changed(&mut self, path: &Path) -> PathBuf {
        logging::debug(format!("csv file modified: {}", path.display()));
        if path.exists() {
            self.watcher.add_path(path);
        }
        path.to_path_buf()
    }

    /// Reload requests produced since the last poll.
    pub fn poll(&mut self, now: Instant) -> Vec<PathBuf> {
        let changed = self.watcher.poll(now);
        changed
            .iter()
            .map(|path| self.on_file_changed(path))
            .collect()
    }
}
