// Configuration loader
// Reads ~/.codekt/config.toml when present, then applies environment
// overrides. Missing files are fine; everything has a default.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::settings::Config;

/// Load configuration from the config file (if any) and the environment.
pub fn load_config() -> Result<Config> {
    let mut config = match config_path() {
        Some(path) if path.exists() => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            parse_config(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        _ => Config::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML config document.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

/// Resolve the config file path: $CODEKT_CONFIG wins, otherwise
/// ~/.codekt/config.toml.
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CODEKT_CONFIG") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::home_dir().map(|home| home.join(".codekt/config.toml"))
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            config.model.api_key = Some(key);
        }
    }
    if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
        if !url.is_empty() {
            config.model.base_url = Some(url);
        }
    }
    if let Ok(addr) = std::env::var("CODEKT_ADDR") {
        if !addr.is_empty() {
            config.server.bind_address = addr;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_reads_file_named_by_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[model]\nmodel = \"gpt-4o-mini\"\nmax_completion_tokens = 256\n")
            .unwrap();

        std::env::set_var("CODEKT_CONFIG", &path);
        let config = load_config().unwrap();
        std::env::remove_var("CODEKT_CONFIG");

        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.max_completion_tokens, 256);
    }

    #[test]
    fn test_parse_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:5000");
        assert!(config.model.credentials().is_none());
    }

    #[test]
    fn test_parse_full_document() {
        let config = parse_config(
            r#"
[server]
bind_address = "0.0.0.0:8080"

[model]
api_key = "sk-test"
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
max_completion_tokens = 512
"#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.max_completion_tokens, 512);
        assert!(config.model.credentials().is_some());
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        assert!(parse_config("[server\nbind_address = 1").is_err());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = parse_config("[model]\nmodel = \"gpt-4.1\"\n").unwrap();
        assert_eq!(config.model.model, "gpt-4.1");
        assert_eq!(config.model.max_completion_tokens, 2048);
        assert_eq!(config.server.bind_address, "127.0.0.1:5000");
    }
}
