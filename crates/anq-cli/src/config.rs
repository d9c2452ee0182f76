//! Configuration loading.
//!
//! Sources, lowest precedence first: built-in defaults, the user config file
//! (`~/.config/anq/config.toml` on Linux), an explicit `--config` file, then
//! `ANQ_*` environment variables.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "anq";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `SQLite` file holding annotations.
    pub database_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir().map_or_else(|| PathBuf::from("."), |d| d.join(APP_DIR));
        Self {
            database_path: data_dir.join("anq.db"),
        }
    }
}

impl Config {
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(config_path).extract()
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let user_file = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
        [user_file, config_path.map(Path::to_path_buf)]
            .into_iter()
            .flatten()
            .fold(Figment::from(Serialized::defaults(Self::default())), |figment, file| {
                figment.merge(Toml::file(file))
            })
            .merge(Env::prefixed("ANQ_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn default_database_lives_in_data_dir() {
        let config = Config::default();
        assert_eq!(config.database_path.file_name().unwrap(), "anq.db");
        assert_eq!(
            config.database_path.parent().unwrap().file_name().unwrap(),
            APP_DIR
        );
    }

    #[test]
    fn explicit_config_file_overrides_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"database_path = "/tmp/annotations.db""#).unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/annotations.db"));
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.database_path.file_name().unwrap(), "anq.db");
    }
}
