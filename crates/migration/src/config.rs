//! Controller configuration.

use serde::{Deserialize, Serialize};

/// Configuration shared by the migration controllers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Label of the legacy top-level domain whose second-level names
    /// are eligible for migration.
    pub legacy_tld: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            legacy_tld: "eth".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_the_eth_tld() {
        assert_eq!(MigrationConfig::default().legacy_tld, "eth");
    }

    #[test]
    fn parses_from_toml_with_defaults() {
        let config: MigrationConfig = toml::from_str("").unwrap();
        assert_eq!(config, MigrationConfig::default());

        let config: MigrationConfig = toml::from_str("legacy_tld = \"test\"").unwrap();
        assert_eq!(config.legacy_tld, "test");
    }
}
