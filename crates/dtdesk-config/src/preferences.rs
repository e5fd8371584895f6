// ── Persisted client preferences ──
//
// The only client-side state that survives a session: the theme.
// Stored as `theme = "dark"` in `preferences.toml` in the data dir.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{ConfigError, dirs_fallback, project_dirs};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}

pub fn preferences_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("preferences.toml"),
        |dirs| dirs.data_dir().join("preferences.toml"),
    )
}

/// Read the stored theme. A missing file means the default theme.
pub fn load_theme(path: &Path) -> Result<Theme, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Theme::default()),
        Err(e) => return Err(e.into()),
    };
    let prefs: Preferences = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(prefs.theme)
}

pub fn save_theme(path: &Path, theme: Theme) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Preferences { theme })?;
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), %theme, "theme saved");
    Ok(())
}
