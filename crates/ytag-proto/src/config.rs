use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub tagger: TaggerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to, API prefix included.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the job submission endpoint.  Older backends used `/download`.
    #[serde(default = "default_convert_path")]
    pub convert_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaggerConfig {
    /// Identity recorded as the tagger when the form's tagger field is blank.
    #[serde(default)]
    pub name: String,
}

/// How the artist field is filled from a metadata lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtistMode {
    /// All guessed names joined with commas.
    Joined,
    /// Best guess in the field, every name offered as a suggestion.
    #[default]
    Suggest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub artist_mode: ArtistMode,
    /// Prefer a catalog cover of the guessed artist over the video thumbnail.
    #[serde(default = "default_cover_lookup")]
    pub cover_lookup: bool,
}

/// User-configurable paths for downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory downloaded songs are written to.
    /// Defaults to `~/ytag-downloads`.
    #[serde(default = "platform::default_downloads_dir")]
    pub downloads_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            convert_path: default_convert_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            artist_mode: ArtistMode::default(),
            cover_lookup: default_cover_lookup(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            downloads_dir: platform::default_downloads_dir(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v0.0.1".to_string()
}

fn default_convert_path() -> String {
    "/convert".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_cover_lookup() -> bool {
    true
}

impl Config {
    /// Load the config from its default location, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Tagger name to send when the form leaves it blank.
    pub fn default_tagger(&self) -> Option<&str> {
        let name = self.tagger.name.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api.base_url.starts_with("http://"));
        assert_eq!(config.api.convert_path, "/convert");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.ui.artist_mode, ArtistMode::Suggest);
        assert!(config.ui.cover_lookup);
        assert!(config.default_tagger().is_none());
        assert!(config.paths.downloads_dir.ends_with("ytag-downloads"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://tagger.example.org/api/v0.0.1"

            [tagger]
            name = "  kiri  "

            [ui]
            artist_mode = "joined"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://tagger.example.org/api/v0.0.1");
        assert_eq!(config.api.convert_path, "/convert");
        assert_eq!(config.ui.artist_mode, ArtistMode::Joined);
        assert!(config.ui.cover_lookup);
        assert_eq!(config.default_tagger(), Some("kiri"));
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.convert_path, "/convert");

        let again = Config::load_from(&path).unwrap();
        assert_eq!(again.api.base_url, config.api.base_url);
    }
}
