//! # Security Configuration
//!
//! Runtime settings for the message security pipeline.
//!
//! Settings load from a JSON file, then `WSSEC_*` environment variables
//! override individual fields. Every loaded configuration is validated.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `WSSEC_DIGEST` | `digest` (`sha1`, `sha256`, `sha512`) |
//! | `WSSEC_ENCODING` | `encoding` (`text`, `binary`) |
//! | `WSSEC_MAX_EVALUATION_PASSES` | `max_evaluation_passes` (`0` = no cap) |
//! | `WSSEC_CANONICAL_DIAGNOSTICS` | `canonical_diagnostics` |
//! | `WSSEC_CLOCK_SKEW_SECS` | `clock_skew_secs` |
//! | `WSSEC_REQUIRE_SIGNED_BODY` | `require_signed_body` |
//! | `WSSEC_IDENTITY_CACHE_CAPACITY` | `identity_cache_capacity` |
//! | `WSSEC_LOG_LEVEL` | `log_level` |

use serde::{Deserialize, Serialize};
use shared_crypto::DigestAlgorithm;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest accepted clock skew.
pub const MAX_CLOCK_SKEW_SECS: u64 = 3600;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value {value:?} for {variable}")]
    InvalidOverride { variable: String, value: String },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Digest used for new references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestSetting {
    Sha1,
    #[default]
    Sha256,
    Sha512,
}

impl DigestSetting {
    pub fn algorithm(self) -> DigestAlgorithm {
        match self {
            Self::Sha1 => DigestAlgorithm::Sha1,
            Self::Sha256 => DigestAlgorithm::Sha256,
            Self::Sha512 => DigestAlgorithm::Sha512,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }
}

/// Wire encoding of messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageEncoding {
    /// UTF-8 XML text
    #[default]
    Text,
    /// Dictionary-compressed binary records
    Binary,
}

impl MessageEncoding {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// Digest for references of outbound signatures.
    pub digest: DigestSetting,
    /// Encoding of inbound and outbound messages.
    pub encoding: MessageEncoding,
    /// Pass cap for policy evaluation. `None` runs to the fixed point.
    pub max_evaluation_passes: Option<usize>,
    /// Emit canonical bytes on the digest trace.
    pub canonical_diagnostics: bool,
    /// Slack added to a message timestamp's expiry.
    pub clock_skew_secs: u64,
    /// Reject inbound messages whose Body is not covered by the signature.
    pub require_signed_body: bool,
    /// Entry limit of the certificate identity cache.
    pub identity_cache_capacity: usize,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            digest: DigestSetting::default(),
            encoding: MessageEncoding::default(),
            max_evaluation_passes: None,
            canonical_diagnostics: false,
            clock_skew_secs: 300,
            require_signed_body: true,
            identity_cache_capacity: 1024,
            log_level: "info".to_string(),
        }
    }
}

impl SecurityConfig {
    /// Load and validate a JSON configuration file. Missing fields take
    /// their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WSSEC_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|variable| std::env::var(variable).ok())
    }

    /// Apply overrides from `lookup`, keyed by variable name.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        fn invalid(variable: &str, value: &str) -> ConfigError {
            ConfigError::InvalidOverride {
                variable: variable.to_string(),
                value: value.to_string(),
            }
        }
        fn parse_bool(variable: &str, value: &str) -> Result<bool, ConfigError> {
            match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" => Ok(false),
                _ => Err(invalid(variable, value)),
            }
        }

        if let Some(value) = lookup("WSSEC_DIGEST") {
            self.digest =
                DigestSetting::parse(&value).ok_or_else(|| invalid("WSSEC_DIGEST", &value))?;
        }
        if let Some(value) = lookup("WSSEC_ENCODING") {
            self.encoding =
                MessageEncoding::parse(&value).ok_or_else(|| invalid("WSSEC_ENCODING", &value))?;
        }
        if let Some(value) = lookup("WSSEC_MAX_EVALUATION_PASSES") {
            let passes: usize = value
                .parse()
                .map_err(|_| invalid("WSSEC_MAX_EVALUATION_PASSES", &value))?;
            self.max_evaluation_passes = (passes > 0).then_some(passes);
        }
        if let Some(value) = lookup("WSSEC_CANONICAL_DIAGNOSTICS") {
            self.canonical_diagnostics = parse_bool("WSSEC_CANONICAL_DIAGNOSTICS", &value)?;
        }
        if let Some(value) = lookup("WSSEC_CLOCK_SKEW_SECS") {
            self.clock_skew_secs = value
                .parse()
                .map_err(|_| invalid("WSSEC_CLOCK_SKEW_SECS", &value))?;
        }
        if let Some(value) = lookup("WSSEC_REQUIRE_SIGNED_BODY") {
            self.require_signed_body = parse_bool("WSSEC_REQUIRE_SIGNED_BODY", &value)?;
        }
        if let Some(value) = lookup("WSSEC_IDENTITY_CACHE_CAPACITY") {
            self.identity_cache_capacity = value
                .parse()
                .map_err(|_| invalid("WSSEC_IDENTITY_CACHE_CAPACITY", &value))?;
        }
        if let Some(value) = lookup("WSSEC_LOG_LEVEL") {
            self.log_level = value;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_evaluation_passes == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_evaluation_passes",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        if self.clock_skew_secs > MAX_CLOCK_SKEW_SECS {
            return Err(ConfigError::Invalid {
                field: "clock_skew_secs",
                reason: format!("must not exceed {MAX_CLOCK_SKEW_SECS}"),
            });
        }
        if self.identity_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "identity_cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_digest(mut self, digest: DigestSetting) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_encoding(mut self, encoding: MessageEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_max_evaluation_passes(mut self, passes: Option<usize>) -> Self {
        self.max_evaluation_passes = passes;
        self
    }

    pub fn with_canonical_diagnostics(mut self, enabled: bool) -> Self {
        self.canonical_diagnostics = enabled;
        self
    }

    pub fn with_clock_skew_secs(mut self, secs: u64) -> Self {
        self.clock_skew_secs = secs;
        self
    }

    pub fn with_require_signed_body(mut self, required: bool) -> Self {
        self.require_signed_body = required;
        self
    }

    pub fn with_identity_cache_capacity(mut self, capacity: usize) -> Self {
        self.identity_cache_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_is_valid() {
        let config = SecurityConfig::default();
        config.validate().unwrap();
        assert_eq!(config.digest.algorithm(), DigestAlgorithm::Sha256);
        assert!(config.require_signed_body);
        assert_eq!(config.max_evaluation_passes, None);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config =
            SecurityConfig::from_json_str(r#"{"digest":"sha512","encoding":"binary"}"#).unwrap();
        assert_eq!(config.digest, DigestSetting::Sha512);
        assert_eq!(config.encoding, MessageEncoding::Binary);
        assert_eq!(config.clock_skew_secs, 300);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            SecurityConfig::from_json_str(r#"{"digets":"sha1"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        assert!(matches!(
            SecurityConfig::from_json_str(r#"{"max_evaluation_passes":0}"#),
            Err(ConfigError::Invalid { field: "max_evaluation_passes", .. })
        ));
        assert!(matches!(
            SecurityConfig::from_json_str(r#"{"clock_skew_secs":7200}"#),
            Err(ConfigError::Invalid { field: "clock_skew_secs", .. })
        ));
    }

    #[test]
    fn test_overrides_apply() {
        let config = SecurityConfig::default()
            .with_overrides(lookup(&[
                ("WSSEC_DIGEST", "SHA1"),
                ("WSSEC_MAX_EVALUATION_PASSES", "16"),
                ("WSSEC_CANONICAL_DIAGNOSTICS", "true"),
                ("WSSEC_REQUIRE_SIGNED_BODY", "0"),
                ("WSSEC_LOG_LEVEL", "debug"),
            ]))
            .unwrap();
        assert_eq!(config.digest, DigestSetting::Sha1);
        assert_eq!(config.max_evaluation_passes, Some(16));
        assert!(config.canonical_diagnostics);
        assert!(!config.require_signed_body);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_zero_passes_override_removes_cap() {
        let config = SecurityConfig::default()
            .with_max_evaluation_passes(Some(8))
            .with_overrides(lookup(&[("WSSEC_MAX_EVALUATION_PASSES", "0")]))
            .unwrap();
        assert_eq!(config.max_evaluation_passes, None);
    }

    #[test]
    fn test_bad_override_rejected() {
        let err = SecurityConfig::default()
            .with_overrides(lookup(&[("WSSEC_ENCODING", "gzip")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { ref variable, .. } if variable == "WSSEC_ENCODING"));
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("wssec-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"require_signed_body":false}"#).unwrap();
        let config = SecurityConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(!config.require_signed_body);

        assert!(matches!(
            SecurityConfig::from_json_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }
}
