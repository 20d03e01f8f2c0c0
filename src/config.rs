// Wed Oct 14 2026 - Alex

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PLACEHOLDER: &str = "<malformed>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compare the header checksum against the computed Adler-32.
    pub verify_checksum: bool,
    pub parallel_disassembly: bool,
    pub max_threads: usize,
    /// Stand-in for strings whose bytes do not decode.
    pub placeholder_string: String,
    /// Default for `Context::create_analysis` when no flag is given.
    pub create_xrefs: bool,
    pub parse_static_values: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verify_checksum: true,
            parallel_disassembly: true,
            max_threads: num_cpus::get(),
            placeholder_string: DEFAULT_PLACEHOLDER.to_string(),
            create_xrefs: false,
            parse_static_values: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    pub fn with_parallel_disassembly(mut self, parallel: bool) -> Self {
        self.parallel_disassembly = parallel;
        self
    }

    pub fn with_max_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads;
        self
    }

    pub fn with_placeholder_string(mut self, placeholder: &str) -> Self {
        self.placeholder_string = placeholder.to_string();
        self
    }

    pub fn with_create_xrefs(mut self, create: bool) -> Self {
        self.create_xrefs = create;
        self
    }

    pub fn with_parse_static_values(mut self, parse: bool) -> Self {
        self.parse_static_values = parse;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_threads == 0 {
            return Err("max_threads must be greater than 0".to_string());
        }
        if self.placeholder_string.is_empty() {
            return Err("placeholder_string must not be empty".to_string());
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Config = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.verify_checksum);
        assert!(!config.create_xrefs);
        assert_eq!(config.placeholder_string, DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = Config::new().with_max_threads(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = Config::from_json(r#"{"create_xrefs": true, "max_threads": 2}"#).unwrap();
        assert!(config.create_xrefs);
        assert_eq!(config.max_threads, 2);
        assert!(config.parse_static_values);
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::new().with_placeholder_string("??").with_max_threads(3);
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"verify_checksum": false}"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert!(!config.verify_checksum);
    }
}
