use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::Duration;

use log::{debug, error, info};
use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::domain::StageConfig;
use crate::error::{Result, StageError};
use crate::stage::stage_assets;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

pub const fn default_quiet_ms() -> u64 {
    DEFAULT_QUIET_PERIOD.as_millis() as u64
}

/// Inputs worth watching that currently exist. The manifest is watched
/// through its directory so that saves which rename a new file over it are
/// still seen.
pub fn watched_paths(config: &StageConfig) -> Vec<(PathBuf, RecursiveMode)> {
    [
        (manifest_dir(&config.manifest_path), RecursiveMode::NonRecursive),
        (config.baseline_dir.as_path(), RecursiveMode::Recursive),
        (config.source_dir.as_path(), RecursiveMode::Recursive),
    ]
    .into_iter()
    .filter(|(path, _)| path.exists())
    .map(|(path, mode)| (path.to_path_buf(), mode))
    .collect()
}

fn manifest_dir(manifest_path: &Path) -> &Path {
    match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Canonicalizes the deepest existing directory above `path` and re-appends
/// the rest, so a path compares equal to its configured form even after the
/// file itself was removed or replaced.
fn resolve(path: &Path) -> PathBuf {
    let Some(name) = path.file_name() else {
        return path.to_path_buf();
    };
    let mut tail = vec![name];
    let mut dir = manifest_dir(path);
    loop {
        if let Ok(resolved) = dir.canonicalize() {
            return tail.iter().rev().fold(resolved, |acc, part| acc.join(part));
        }
        match dir.file_name() {
            Some(name) => {
                tail.push(name);
                dir = manifest_dir(dir);
            }
            None => return path.to_path_buf(),
        }
    }
}

/// Decides which watcher events concern the stager's inputs. Siblings of the
/// manifest, the output directory among them, are ignored.
#[derive(Debug, Clone)]
pub struct InputFilter {
    manifest: PathBuf,
    trees: Vec<PathBuf>,
}

impl InputFilter {
    pub fn new(config: &StageConfig) -> Self {
        InputFilter {
            manifest: resolve(&config.manifest_path),
            trees: vec![resolve(&config.baseline_dir), resolve(&config.source_dir)],
        }
    }

    pub fn is_input(&self, path: &Path) -> bool {
        let path = resolve(path);
        path == self.manifest || self.trees.iter().any(|tree| path.starts_with(tree))
    }

    pub fn triggers_rebuild(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        // Rescans come without paths.
        event.paths.is_empty() || event.paths.iter().any(|p| self.is_input(p))
    }
}

/// Blocks until a rebuild-worthy event arrives, then drains the channel
/// until it has been silent for `quiet`. Returns how many events were
/// coalesced, or `None` once the sender is gone.
pub fn next_burst(
    rx: &Receiver<notify::Result<Event>>,
    quiet: Duration,
    filter: &InputFilter,
) -> Option<usize> {
    let mut count = 0;
    while count == 0 {
        match rx.recv().ok()? {
            Ok(event) if filter.triggers_rebuild(&event) => count += 1,
            Ok(_) => {}
            Err(e) => error!("Watch error: {e}"),
        }
    }
    loop {
        match rx.recv_timeout(quiet) {
            Ok(Ok(event)) if filter.triggers_rebuild(&event) => count += 1,
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Watch error: {e}"),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return Some(count);
            }
        }
    }
}

fn rebuild(config: &StageConfig) {
    if let Err(e) = stage_assets(config) {
        error!("Build failed: {e}");
    }
}

/// Stages once, then re-stages after every burst of input changes. Only
/// returns on watcher setup failure.
pub fn watch(config: &StageConfig, quiet: Duration) -> Result<()> {
    rebuild(config);

    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(tx).map_err(|source| StageError::Watch {
        path: config.manifest_path.clone(),
        source,
    })?;

    let paths = watched_paths(config);
    for (path, mode) in &paths {
        debug!("Watching {}", path.display());
        watcher
            .watch(path, *mode)
            .map_err(|source| StageError::Watch {
                path: path.clone(),
                source,
            })?;
    }
    info!("Watching {} inputs for changes", paths.len());

    let filter = InputFilter::new(config);
    while let Some(count) = next_burst(&rx, quiet, &filter) {
        info!("{count} changes detected, rebuilding");
        rebuild(config);
    }
    Ok(())
}
