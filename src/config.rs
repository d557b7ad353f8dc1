//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mindmap/mindmap.toml`
//! 3. Local config: `<work_dir>/.mindmap.toml`
//! 4. Environment variables: `MINDMAP_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Rendering options for `show` and the interactive shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Spaces drawn per level step
    pub indent: usize,
    /// Append short node ids to every label
    pub show_ids: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            show_ids: false,
        }
    }
}

/// Raw display config; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub indent: Option<usize>,
    pub show_ids: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub map_file: Option<PathBuf>,
    pub root_title: Option<String>,
    #[serde(default)]
    pub display: RawDisplayConfig,
}

impl DisplayConfig {
    fn merge(&self, overlay: &RawDisplayConfig) -> Self {
        Self {
            indent: overlay.indent.unwrap_or(self.indent),
            show_ids: overlay.show_ids.unwrap_or(self.show_ids),
        }
    }
}

/// Unified configuration for mindmap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Map file used when a command gets no FILE argument
    pub map_file: PathBuf,
    /// Title of the root node of new maps
    pub root_title: String,
    /// Tree display settings
    pub display: DisplayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            map_file: PathBuf::from("mindmap.json"),
            root_title: "Root".to_string(),
            display: DisplayConfig::default(),
        }
    }
}

/// Get the XDG config directory for mindmap.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mindmap").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mindmap.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(".mindmap.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.map_file.to_string_lossy().as_ref());
        self.map_file = PathBuf::from(expanded);
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            map_file: overlay
                .map_file
                .clone()
                .unwrap_or_else(|| self.map_file.clone()),
            root_title: overlay
                .root_title
                .clone()
                .unwrap_or_else(|| self.root_title.clone()),
            display: self.display.merge(&overlay.display),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `work_dir` - Optional working directory holding a local `.mindmap.toml`
    ///
    /// A relative `map_file` from the local config is resolved against `work_dir`.
    pub fn load(work_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = work_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                raw.map_file = raw.map_file.map(|p| {
                    if p.is_relative() {
                        dir.join(p)
                    } else {
                        p
                    }
                });
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply MINDMAP_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MINDMAP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("map_file") {
            settings.map_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("root_title") {
            settings.root_title = val;
        }
        if let Ok(val) = config.get::<usize>("display.indent") {
            settings.display.indent = val;
        }
        if let Ok(val) = config.get_bool("display.show_ids") {
            settings.display.show_ids = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# mindmap configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/mindmap/mindmap.toml
#   Local:  <work_dir>/.mindmap.toml
#   Env:    MINDMAP_* environment variables (MINDMAP_DISPLAY__INDENT=4)

# Map file used when no FILE argument is given
# map_file = "mindmap.json"

# Title of the root node for new maps
# root_title = "Root"

[display]
# Spaces per level step
# indent = 2

# Show short node ids next to titles
# show_ids = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
