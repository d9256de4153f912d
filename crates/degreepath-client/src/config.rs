//! Configuration loader for the DegreePath client.
//!
//! Reads `config.toml` from the platform config directory
//! (`~/.config/degreepath/` on Linux) and deserializes its `[tutor]`
//! table into [`ClientConfig`]. Falls back to defaults when the file is
//! missing or malformed.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use degreepath_types::config::ClientConfig;

/// Top-level shape of `config.toml`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    tutor: Option<ClientConfig>,
}

/// The directory `config.toml` is looked up in.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("degreepath"))
}

/// Load client configuration from `{config_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the
///   default.
/// - If the file parses but has no `[tutor]` table, returns the default.
pub async fn load_client_config(config_dir: &Path) -> ClientConfig {
    let config_path = config_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => file.tutor.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_client_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.base_url, "http://127.0.0.1:8001");
        assert_eq!(config.read_timeout_secs, 60);
    }

    #[tokio::test]
    async fn load_client_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[tutor]
base_url = "http://tutor.internal:9000"
read_timeout_secs = 120
"#,
        )
        .await
        .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.base_url, "http://tutor.internal:9000");
        assert_eq!(config.read_timeout_secs, 120);
        // Unspecified fields keep their defaults.
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[tokio::test]
    async fn load_client_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.base_url, "http://127.0.0.1:8001");
    }

    #[tokio::test]
    async fn load_client_config_missing_table_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "[other]\nkey = 1\n")
            .await
            .unwrap();

        let config = load_client_config(tmp.path()).await;
        assert_eq!(config.connect_timeout_secs, 10);
    }
}
