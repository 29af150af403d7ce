use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{info, trace, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::events::{RuntimeCommand, RuntimeCommandSender};

/// Watches the engine config file and asks the event loop to reload it
/// whenever its content changes. Editors that save by rename are covered by
/// watching the parent directory.
pub struct ConfigWatch {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl ConfigWatch {
    pub fn start(
        path: PathBuf,
        command_tx: RuntimeCommandSender,
    ) -> Result<Self, notify::Error> {
        let last_hash = Mutex::new(content_hash(&path).ok());
        let config_path = path.clone();
        let watch_dir = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        info!(
            "watching config '{}' via directory '{}'",
            config_path.display(),
            watch_dir.display()
        );

        let mut watcher = notify::recommended_watcher(move |result| {
            let event: Event = match result {
                Ok(event) => event,
                Err(err) => {
                    warn!(
                        "config watcher failed for '{}': {}",
                        config_path.display(),
                        err
                    );
                    return;
                }
            };

            if !config_changed(&event, &config_path) {
                return;
            }

            let hash = match content_hash(&config_path) {
                Ok(hash) => hash,
                Err(err) => {
                    trace!(
                        "config event before readable file '{}': {}",
                        config_path.display(),
                        err
                    );
                    return;
                }
            };

            let mut guard =
                last_hash.lock().unwrap_or_else(|e| e.into_inner());
            if *guard == Some(hash) {
                trace!("config content unchanged; skipping reload");
                return;
            }
            *guard = Some(hash);
            drop(guard);

            info!("detected config change: {}", config_path.display());
            let _ = command_tx.send(RuntimeCommand::ReloadConfig);
        })?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            path,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn content_hash(path: &Path) -> Result<u64, std::io::Error> {
    let bytes = fs::read(path)?;
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    Ok(hasher.finish())
}

fn config_changed(event: &Event, config_path: &Path) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }

    if event.paths.is_empty() {
        return true;
    }

    event
        .paths
        .iter()
        .any(|path| same_file(path, config_path))
}

fn same_file(path: &Path, target: &Path) -> bool {
    if path == target || path.file_name() == target.file_name() {
        return true;
    }

    match (path.canonicalize(), target.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    use super::*;

    #[test]
    fn test_modify_of_config_counts() {
        let target = Path::new("/tmp/hexglow/hexglow.yaml");
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/hexglow/hexglow.yaml"));
        assert!(config_changed(&event, target));
    }

    #[test]
    fn test_sibling_files_are_ignored() {
        let target = Path::new("/tmp/hexglow/hexglow.yaml");
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/hexglow/notes.txt"));
        assert!(!config_changed(&event, target));
    }

    #[test]
    fn test_access_events_are_ignored() {
        let target = Path::new("/tmp/hexglow/hexglow.yaml");
        let event = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/tmp/hexglow/hexglow.yaml"));
        assert!(!config_changed(&event, target));
    }

    #[test]
    fn test_content_hash_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hexglow.yaml");
        fs::write(&path, "decay: 0.9\n").unwrap();
        let first = content_hash(&path).unwrap();
        fs::write(&path, "decay: 0.9\n").unwrap();
        assert_eq!(content_hash(&path).unwrap(), first);
        fs::write(&path, "decay: 0.8\n").unwrap();
        assert_ne!(content_hash(&path).unwrap(), first);
    }
}
