use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ClipcryptError, ClipcryptResult};

/// Top-level client configuration (loaded from clipcrypt.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipcryptConfig {
    pub logging: LoggingConfig,
    pub kdf: KdfConfig,
}

impl ClipcryptConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: defaults are returned and a warning is
    /// logged. A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> ClipcryptResult<Self> {
        if !path.exists() {
            tracing::warn!(
                "config file not found: {}  (using defaults)",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| ClipcryptError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> ClipcryptResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ClipcryptError::Config(e.to_string()))?;
        config.kdf.strong.validate("kdf.strong")?;
        config.kdf.fast.validate("kdf.fast")?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Password-hashing cost profiles.
///
/// The defaults are the protocol values. Any other value produces keys no
/// other client can reproduce, so overriding them is only meant for tests
/// and benchmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Profile for the first derivation from a human keyphrase
    pub strong: KdfProfileConfig,
    /// Profile for re-hashing full-entropy key material
    pub fast: KdfProfileConfig,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            strong: KdfProfileConfig::strong(),
            fast: KdfProfileConfig::fast(),
        }
    }
}

/// Argon2id cost parameters for one profile.
///
/// A profile is all-or-nothing: a table that sets only some fields is
/// rejected rather than silently mixed with another profile's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfProfileConfig {
    /// Memory cost in KiB
    pub mem_cost_kib: u32,
    /// Time cost / iterations
    pub time_cost: u32,
    /// Parallelism (lanes)
    pub parallelism: u32,
}

impl KdfProfileConfig {
    /// 19 MiB, 2 passes, 1 lane
    pub fn strong() -> Self {
        Self {
            mem_cost_kib: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }

    /// 8 KiB (the Argon2 floor for a single lane), 1 pass, 1 lane
    pub fn fast() -> Self {
        Self {
            mem_cost_kib: 8,
            time_cost: 1,
            parallelism: 1,
        }
    }

    /// Argon2 needs at least one pass, one lane, and 8 KiB per lane.
    pub fn validate(&self, section: &str) -> ClipcryptResult<()> {
        if self.time_cost == 0 || self.parallelism == 0 {
            return Err(ClipcryptError::Config(format!(
                "[{section}]: time_cost and parallelism must be at least 1"
            )));
        }
        if u64::from(self.mem_cost_kib) < 8 * u64::from(self.parallelism) {
            return Err(ClipcryptError::Config(format!(
                "[{section}]: mem_cost_kib {} is below 8 KiB per lane",
                self.mem_cost_kib
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[logging]
level = "debug"
format = "json"

[kdf.strong]
mem_cost_kib = 65536
time_cost = 3
parallelism = 4

[kdf.fast]
mem_cost_kib = 16
time_cost = 2
parallelism = 1
"#;
        let config = ClipcryptConfig::from_toml(toml_str).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.kdf.strong.mem_cost_kib, 65536);
        assert_eq!(config.kdf.strong.time_cost, 3);
        assert_eq!(config.kdf.strong.parallelism, 4);
        assert_eq!(config.kdf.fast.mem_cost_kib, 16);
        assert_eq!(config.kdf.fast.time_cost, 2);
    }

    #[test]
    fn test_parse_defaults() {
        let config = ClipcryptConfig::from_toml("").unwrap();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
        assert_eq!(config.kdf.strong, KdfProfileConfig::strong());
        assert_eq!(config.kdf.fast, KdfProfileConfig::fast());
    }

    #[test]
    fn test_empty_kdf_section_keeps_both_profiles() {
        let parsed = ClipcryptConfig::from_toml("[kdf]\n").unwrap();
        assert_eq!(parsed.kdf.strong, KdfProfileConfig::strong());
        assert_eq!(parsed.kdf.fast, KdfProfileConfig::fast());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[kdf.strong]
mem_cost_kib = 1024
time_cost = 1
parallelism = 1
"#;
        let config = ClipcryptConfig::from_toml(toml_str).unwrap();

        // Overridden
        assert_eq!(config.kdf.strong.mem_cost_kib, 1024);
        // Defaults
        assert_eq!(config.kdf.fast, KdfProfileConfig::fast());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_incomplete_profile_rejected() {
        let result = ClipcryptConfig::from_toml("[kdf.fast]\ntime_cost = 2\n");
        assert!(matches!(result, Err(ClipcryptError::Config(_))));
    }

    #[test]
    fn test_unusable_kdf_profile_rejected() {
        let toml_str = r#"
[kdf.fast]
mem_cost_kib = 0
time_cost = 0
parallelism = 1
"#;
        let result = ClipcryptConfig::from_toml(toml_str);
        assert!(matches!(result, Err(ClipcryptError::Config(msg)) if msg.contains("kdf.fast")));
    }

    #[test]
    fn test_memory_below_lane_floor_rejected() {
        let toml_str = r#"
[kdf.strong]
mem_cost_kib = 8
time_cost = 1
parallelism = 2
"#;
        let result = ClipcryptConfig::from_toml(toml_str);
        assert!(matches!(result, Err(ClipcryptError::Config(msg)) if msg.contains("kdf.strong")));
    }

    #[test]
    fn test_load_rejects_unusable_profile() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("clipcrypt.toml");
        std::fs::write(
            &path,
            "[kdf.strong]\nmem_cost_kib = 19456\ntime_cost = 0\nparallelism = 1\n",
        )
        .unwrap();

        assert!(ClipcryptConfig::load(&path).is_err());
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = ClipcryptConfig::from_toml("[logging]\nlevel = 3\n");
        assert!(matches!(result, Err(ClipcryptError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ClipcryptConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.kdf.strong, KdfProfileConfig::strong());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("clipcrypt.toml");
        std::fs::write(&path, "[logging]\nlevel = \"trace\"\n").unwrap();

        let config = ClipcryptConfig::load(&path).unwrap();
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = ClipcryptConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = ClipcryptConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.logging.level, parsed.logging.level);
        assert_eq!(config.kdf.strong, parsed.kdf.strong);
        assert_eq!(config.kdf.fast, parsed.kdf.fast);
    }
}
