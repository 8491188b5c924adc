use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use datespan_engine::date::SEPARATORS;
use datespan_engine::{DayFilter, DurationUnit};
use serde::Deserialize;
use tracing::{debug, info};

/// Settings read from `config.toml`.
///
/// ```toml
/// timezone = "Europe/Berlin"
/// separator = "."
/// data_dir = "/home/me/.local/share/datespan"
///
/// [defaults]
/// days = "work"
/// unit = "hours"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub timezone: Option<String>,
    pub separator: Option<char>,
    pub data_dir: Option<PathBuf>,
    pub defaults: Defaults,
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub days: Option<DayFilter>,
    pub unit: Option<DurationUnit>,
}

impl Config {
    /// Load `explicit` if given (it must exist), otherwise the default
    /// location if a file is there, otherwise built-in defaults.
    #[tracing::instrument]
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|p| p.is_file()),
        };

        let Some(path) = path else {
            debug!("no config file; using defaults");
            return Ok(Self::default());
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config = Self::parse(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        info!(config = %path.display(), "loaded config");
        config.loaded_from = Some(path);
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(text)?;
        if let Some(sep) = config.separator {
            if !SEPARATORS.contains(&sep) {
                bail!("separator must be one of {SEPARATORS:?}, got {sep:?}");
            }
        }
        Ok(config)
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("datespan").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
timezone = "America/New_York"
separator = "/"
data_dir = "/tmp/datespan"

[defaults]
days = "work"
unit = "hours"
"#,
        )
        .unwrap();
        assert_eq!(config.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(config.separator, Some('/'));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/datespan")));
        assert_eq!(config.defaults.days, Some(DayFilter::Work));
        assert_eq!(config.defaults.unit, Some(DurationUnit::Hours));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert!(config.timezone.is_none());
        assert!(config.defaults.days.is_none());
    }

    #[test]
    fn test_rejects_unknown_separator() {
        let err = Config::parse("separator = \"x\"").unwrap_err();
        assert!(err.to_string().contains("separator"), "got: {err}");
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(Config::parse("colour = \"blue\"").is_err());
        assert!(Config::parse("[defaults]\ndays = \"holidays\"").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"), "got: {err:#}");
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timezone = \"Asia/Tokyo\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.timezone.as_deref(), Some("Asia/Tokyo"));
        assert_eq!(config.loaded_from, Some(path));
    }
}
