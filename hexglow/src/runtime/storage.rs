use std::error::Error;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories_next::{BaseDirs, UserDirs};
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

const APP_DIR: &str = "Hexglow";
const SETTINGS_FILE: &str = "viewer_settings.json";

/// Viewer state that survives restarts
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Last theme picked explicitly (`T` key or toggle button)
    pub theme: Option<Theme>,
    /// Logical window size at exit
    pub window_size: Option<[u32; 2]>,
}

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join(APP_DIR))
}

/// Where `S` captures land: the platform pictures folder, falling back to a
/// folder under home, then the working directory.
pub fn default_images_dir() -> PathBuf {
    let primary = UserDirs::new()
        .and_then(|ud| ud.picture_dir().map(|p| p.join(APP_DIR)));

    let fallback = BaseDirs::new()
        .map(|bd| bd.home_dir().join(APP_DIR).join("Images"));

    primary
        .or(fallback)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE)
}

pub fn save_settings(
    dir: &Path,
    settings: &ViewerSettings,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(settings)?;
    let path = settings_path(dir);
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir)?;
    }
    fs::write(&path, json)?;
    Ok(path)
}

pub fn load_settings(dir: &Path) -> Result<ViewerSettings, Box<dyn Error>> {
    let json = fs::read_to_string(settings_path(dir))?;
    let settings = serde_json::from_str::<ViewerSettings>(&json)?;
    Ok(settings)
}

pub fn load_settings_if_exists(
    dir: &Path,
) -> Result<Option<ViewerSettings>, Box<dyn Error>> {
    match load_settings(dir) {
        Ok(settings) => Ok(Some(settings)),
        Err(err) => {
            if err
                .downcast_ref::<std::io::Error>()
                .is_some_and(|e| e.kind() == ErrorKind::NotFound)
            {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let settings = ViewerSettings {
            theme: Some(Theme::Dark),
            window_size: Some([1280, 720]),
        };

        let path = save_settings(&nested, &settings).unwrap();
        assert!(path.ends_with(SETTINGS_FILE));
        assert_eq!(load_settings(&nested).unwrap(), settings);
    }

    #[test]
    fn test_missing_settings_are_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_settings_if_exists(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_corrupt_settings_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(settings_path(dir.path()), "{ not json").unwrap();
        assert!(load_settings_if_exists(dir.path()).is_err());
    }

    #[test]
    fn test_missing_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(settings_path(dir.path()), r#"{ "theme": "light" }"#)
            .unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.theme, Some(Theme::Light));
        assert_eq!(settings.window_size, None);
    }
}
