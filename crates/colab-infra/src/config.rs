//! Global configuration loader.
//!
//! Reads `colab.toml` from the data directory and applies `COLAB_*`
//! environment overrides on top. CLI flags are applied by the binary.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use colab_types::config::{GlobalConfig, LlmSettings};

use crate::sqlite::pool::default_database_url;

pub const CONFIG_FILE: &str = "colab.toml";

/// `COLAB_DATA_DIR`, or `./data`.
pub fn data_dir() -> PathBuf {
    std::env::var_os("COLAB_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Load `{data_dir}/colab.toml`.
///
/// A missing file gives the defaults. A file that fails to parse is logged
/// and also gives the defaults.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE} found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Apply `COLAB_DATABASE_URL`, `COLAB_HOST` and `COLAB_PORT`.
///
/// `lookup` is `std::env::var` in production. An unparsable port is ignored
/// with a warning.
pub fn apply_env_overrides<F>(config: &mut GlobalConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("COLAB_DATABASE_URL") {
        config.database.url = Some(url);
    }
    if let Some(host) = lookup("COLAB_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("COLAB_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(err) => tracing::warn!(value = %port, "Ignoring invalid COLAB_PORT: {err}"),
        }
    }
}

/// File config plus process environment overrides.
pub async fn load_effective_config(data_dir: &Path) -> GlobalConfig {
    let mut config = load_global_config(data_dir).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// The configured database URL, or the default file in `data_dir`.
pub fn database_url(config: &GlobalConfig, data_dir: &Path) -> String {
    config
        .database
        .url
        .clone()
        .unwrap_or_else(|| default_database_url(data_dir))
}

/// Read the API key from the variable named by `llm.api_key_env`.
pub fn resolve_api_key<F>(settings: &LlmSettings, lookup: F) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(&settings.api_key_env)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}
