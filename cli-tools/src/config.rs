use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER: &str = "http://localhost:8000";

#[derive(Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub server_url: Option<String>,
    /// One of `pretty`, `json`, `table`
    pub output: Option<String>,
}

impl CliConfig {
    /// Server from the command line or environment, then this file, then the default.
    pub fn resolve_server(&self, from_cli: Option<String>) -> String {
        from_cli
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string())
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("docqa")
        .join("cli.toml")
}

pub fn load_config() -> CliConfig {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> CliConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                CliConfig::default()
            }
        },
        Err(_) => CliConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_from(&dir.path().join("nope.toml")), CliConfig::default());
    }

    #[test]
    fn reads_server_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(
            &path,
            "server_url = \"http://qa.internal:9000\"\noutput = \"json\"\n",
        )
        .unwrap();

        let config = load_from(&path);
        assert_eq!(config.server_url.as_deref(), Some("http://qa.internal:9000"));
        assert_eq!(config.output.as_deref(), Some("json"));
    }

    #[test]
    fn malformed_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "server_url = [").unwrap();
        assert_eq!(load_from(&path), CliConfig::default());
    }

    #[test]
    fn server_precedence() {
        let config = CliConfig {
            server_url: Some("http://from-file".into()),
            output: None,
        };
        assert_eq!(config.resolve_server(Some("http://flag".into())), "http://flag");
        assert_eq!(config.resolve_server(None), "http://from-file");
        assert_eq!(CliConfig::default().resolve_server(None), DEFAULT_SERVER);
    }
}
