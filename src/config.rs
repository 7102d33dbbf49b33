//! Configuration for document generation and artifact verification
//!
//! Settings are read from a JSON file so the exclusion list and verifier
//! behaviour can change without recompiling. Missing or malformed files fall
//! back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::FixtureError;
use crate::ignored::ExclusionList;
use crate::platform::TargetPlatform;
use crate::verify::VerifyOptions;

/// Default config location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "ffi_fixtures.json";

/// Complete fixture tooling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Platform to describe instead of the compiled one (short name or triple)
    pub platform: Option<String>,
    /// Declarations excluded on top of the built-in list
    pub excluded_declarations: Vec<String>,
    /// Treat function and constant prefixes of excluded declarations as hits
    pub symbol_prefix_matching: bool,
    /// Report AST declarations a verified artifact never mentions
    pub require_coverage: bool,
    /// Run oracles for excluded enums as well (they are still exported)
    pub include_excluded_oracles: bool,
}

impl Default for FixtureConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            platform: None,
            excluded_declarations: Vec::new(),
            symbol_prefix_matching: true,
            require_coverage: true,
            include_excluded_oracles: true,
        }
    }
}

impl FixtureConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file is missing or
    /// its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load from [`DEFAULT_CONFIG_PATH`] when present, defaults otherwise
    pub fn load() -> Self {
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)
        } else {
            Self::default()
        }
    }

    /// Configured platform, or the compiled one
    pub fn target_platform(&self) -> Result<TargetPlatform, FixtureError> {
        match self.platform.as_deref() {
            Some(name) => name.parse(),
            None => Ok(TargetPlatform::current()),
        }
    }

    pub fn exclusions(&self) -> ExclusionList {
        ExclusionList::with_extra(self.excluded_declarations.iter().cloned())
    }

    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            exclusions: self.exclusions(),
            symbol_prefix_matching: self.symbol_prefix_matching,
            require_coverage: self.require_coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FixtureConfig::default();
        assert_eq!(config.platform, None);
        assert!(config.excluded_declarations.is_empty());
        assert!(config.symbol_prefix_matching);
        assert_eq!(config.target_platform().unwrap(), TargetPlatform::current());
        assert!(config.exclusions().is_excluded("EnumIgnored"));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = FixtureConfig {
            platform: Some("windows".to_string()),
            excluded_declarations: vec!["Enum_Force_UInt64".to_string()],
            symbol_prefix_matching: false,
            ..FixtureConfig::default()
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: FixtureConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
        assert_eq!(parsed.target_platform().unwrap(), TargetPlatform::Windows);
        assert!(parsed.exclusions().is_excluded("Enum_Force_UInt64"));
        assert!(!parsed.verify_options().symbol_prefix_matching);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: FixtureConfig =
            serde_json::from_str(r#"{"excluded_declarations": ["Foo"]}"#).unwrap();
        assert!(parsed.symbol_prefix_matching);
        assert!(parsed.require_coverage);
        assert_eq!(parsed.excluded_declarations, vec!["Foo".to_string()]);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = FixtureConfig::load_from_file("/nonexistent/ffi_fixtures.json");
        assert_eq!(config, FixtureConfig::default());
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "ffi_fixtures_invalid_config_{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").unwrap();
        let config = FixtureConfig::load_from_file(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(config, FixtureConfig::default());
    }

    #[test]
    fn test_unknown_platform_is_an_error() {
        let config = FixtureConfig {
            platform: Some("plan9".to_string()),
            ..FixtureConfig::default()
        };
        assert!(matches!(
            config.target_platform(),
            Err(FixtureError::UnknownPlatform { .. })
        ));
    }
}
