//! Configuration to acknowledge reader preferences as well as set defaults.
//!
//! Specifically, we try to find an ember/config.toml in the platform config
//! directory, and if present we load settings from there. This provides the
//! library location, theme choice, and reading margins.

use facet::Facet;
use std::fs;
use std::path::PathBuf;

#[derive(Facet, Clone)]
/// User preferences loaded from config.toml or falling back to defaults.
pub struct Config {
    #[facet(default = String::new())]
    /// Directory scanned for books; empty means `~/books`.
    pub library_path: String,
    #[facet(default = String::from("ember-dark"))]
    /// Name of a built-in theme or a theme file in the config directory.
    pub theme_name: String,
    #[facet(default = String::new())]
    /// Where progress is stored; empty means the platform data directory.
    pub data_dir: String,
    #[facet(default = 4)]
    /// Columns of blank space left of the text.
    pub margin_left: u16,
    #[facet(default = 4)]
    /// Columns of blank space right of the text.
    pub margin_right: u16,
}

impl Config {
    #[must_use]
    /// Load configuration from the config directory if present.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be parsed.
    pub fn load() -> Self {
        if let Some(path) = config_file_path() {
            if let Ok(contents) = fs::read_to_string(path) {
                if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
                    return config;
                }
            }
        }
        facet_toml::from_str::<Self>("").unwrap()
    }

    #[must_use]
    /// The directory scanned for books.
    pub fn library_dir(&self) -> PathBuf {
        if !self.library_path.is_empty() {
            return PathBuf::from(&self.library_path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("books")
    }

    #[must_use]
    /// Where the progress file lives.
    pub fn progress_path(&self) -> PathBuf {
        let dir = if self.data_dir.is_empty() {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ember")
        } else {
            PathBuf::from(&self.data_dir)
        };
        dir.join("progress.json")
    }
}

fn config_file_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("ember").join("config.toml"))
}
