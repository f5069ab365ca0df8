//! `colab config`: show what the server would run with.

use std::path::Path;

use serde_json::json;

use colab_infra::config::{CONFIG_FILE, database_url, resolve_api_key};
use colab_types::config::GlobalConfig;

/// Resolved configuration as JSON. The API key is reported only as set or unset.
pub fn render_config(
    config: &GlobalConfig,
    data_dir: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<String> {
    let key_status = match resolve_api_key(&config.llm, lookup) {
        Some(_) => "<redacted>",
        None => "<unset>",
    };
    let value = json!({
        "data_dir": data_dir.display().to_string(),
        "config_file": data_dir.join(CONFIG_FILE).display().to_string(),
        "database_url": database_url(config, data_dir),
        "api_key": key_status,
        "config": config,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_redacts_key() {
        let config = GlobalConfig::default();
        let out = render_config(&config, Path::new("/tmp/colab"), |name| {
            (name == "OPENAI_API_KEY").then(|| "sk-very-secret".to_string())
        })
        .unwrap();

        assert!(!out.contains("sk-very-secret"));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["api_key"], "<redacted>");
        assert_eq!(value["config"]["server"]["port"], 5000);
        assert_eq!(value["config"]["llm"]["model"], "gpt-4o");
    }

    #[test]
    fn test_render_config_without_key() {
        let out = render_config(&GlobalConfig::default(), Path::new("/tmp/colab"), |_| None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["api_key"], "<unset>");
    }
}
