use std::path::Path;

use serde::Deserialize;

use vjass::ParseOptions;

/// Settings read from a `--config` TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Cap on lines produced by text macro expansion.
    #[serde(default)]
    pub max_expanded_lines: Option<usize>,

    /// Parse `//! zinc` blocks and merge their declarations.
    #[serde(default = "default_zinc")]
    pub zinc: bool,
}

fn default_zinc() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_expanded_lines: None,
            zinc: default_zinc(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config, String> {
        toml::from_str(text).map_err(|e| format!("TOML parse error: {}", e))
    }

    pub fn load(path: &Path) -> Result<Config, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        Config::from_toml(&text)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_expanded_lines: self.max_expanded_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Config::from_toml(""), Ok(Config::default()));
    }

    #[test]
    fn reads_fields() {
        let config = Config::from_toml("max_expanded_lines = 500\nzinc = false\n").unwrap();
        assert_eq!(config.max_expanded_lines, Some(500));
        assert!(!config.zinc);
        assert_eq!(config.parse_options().max_expanded_lines, Some(500));
    }

    #[test]
    fn rejects_unknown_keys() {
        let error = Config::from_toml("max_lines = 1\n").unwrap_err();
        assert!(error.starts_with("TOML parse error"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(error.contains("cannot read"));
    }
}
