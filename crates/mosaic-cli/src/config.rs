//! CLI configuration (mosaic.toml)
//!
//! Combines the runtime settings with the log settings:
//!
//! ```toml
//! [runtime]
//! max_call_depth = 64
//!
//! [log]
//! level = "info"
//! dispatch = "trace"
//! ```

use anyhow::Context;
use mosaic_core::RuntimeConfig;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mosaic.toml";

/// Log targets emitted by mosaic-core
pub const TARGETS: [&str; 5] = [
    "mosaic::class",
    "mosaic::interface",
    "mosaic::dispatch",
    "mosaic::runtime",
    "mosaic::host",
];

/// CLI log configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub global: Level,
    pub class: Option<Level>,
    pub interface: Option<Level>,
    pub dispatch: Option<Level>,
    pub runtime: Option<Level>,
    pub host: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            class: None,
            interface: None,
            dispatch: None,
            runtime: None,
            host: None,
        }
    }
}

impl LogConfig {
    /// Get log level for a specific target
    pub fn level_for(&self, target: &str) -> Level {
        let specific = match target {
            "mosaic::class" => self.class,
            "mosaic::interface" => self.interface,
            "mosaic::dispatch" => self.dispatch,
            "mosaic::runtime" => self.runtime,
            "mosaic::host" => self.host,
            _ => None,
        };
        specific.unwrap_or(self.global)
    }
}

/// Everything the CLI reads from mosaic.toml
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub runtime: RuntimeConfig,
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    runtime: RuntimeConfig,
    #[serde(default)]
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    level: Option<String>,
    class: Option<String>,
    interface: Option<String>,
    dispatch: Option<String>,
    runtime: Option<String>,
    host: Option<String>,
}

impl CliConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Failed to parse configuration")?;
        file.runtime.validate()?;

        let section = file.log;
        let mut log = LogConfig::default();
        if let Some(level) = section.level.as_deref() {
            log.global = parse_level(level)?;
        }
        log.class = section.class.as_deref().map(parse_level).transpose()?;
        log.interface = section.interface.as_deref().map(parse_level).transpose()?;
        log.dispatch = section.dispatch.as_deref().map(parse_level).transpose()?;
        log.runtime = section.runtime.as_deref().map(parse_level).transpose()?;
        log.host = section.host.as_deref().map(parse_level).transpose()?;

        Ok(Self {
            runtime: file.runtime,
            log,
        })
    }

    /// Load from `path`, or from ./mosaic.toml if present, else defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Self::default()),
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }
}

/// Parse a level name (`error`, `warn`, `info`, `debug`, `trace`)
pub fn parse_level(level: &str) -> anyhow::Result<Level> {
    Level::from_str(level).map_err(|_| anyhow::anyhow!("Unknown log level: {}", level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.log.level_for("mosaic::class"), Level::WARN);
    }

    #[test]
    fn test_parse_sections() {
        let toml = r#"
[runtime]
max_call_depth = 64

[log]
level = "info"
dispatch = "trace"
"#;
        let config = CliConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.runtime.max_call_depth, 64);
        assert_eq!(config.log.global, Level::INFO);
        assert_eq!(config.log.level_for("mosaic::dispatch"), Level::TRACE);
        assert_eq!(config.log.level_for("mosaic::runtime"), Level::INFO);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(CliConfig::from_toml_str("[log]\nlevel = \"loud\"").is_err());
        assert!(CliConfig::from_toml_str("[runtime]\nmax_call_depth = 0").is_err());
        assert!(CliConfig::from_toml_str("[colors]").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[runtime]\nunique_names = false").unwrap();
        let config = CliConfig::load(Some(file.path())).unwrap();
        assert!(!config.runtime.unique_names);
    }
}
