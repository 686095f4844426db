//! Trust-anchor registry: TOML-configured source → public-key mapping.
//!
//! Key material for a source can arrive two ways: carried inside the
//! evidence itself, or looked up from a registry the host configures at
//! startup. When a source has a registered anchor, the registry wins — a
//! caller cannot substitute its own key for a source the host has pinned.
//!
//! Example configuration:
//!
//! ```toml
//! [[anchor]]
//! source = "https://x/price"
//! public_key = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use exoclaim_contracts::error::{ClaimError, ClaimResult};

/// One anchor entry as it appears in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorEntry {
    /// The exact source string this anchor signs for.
    pub source: String,
    /// Hex-encoded 32-byte Ed25519 public key.
    pub public_key: String,
}

/// The TOML document shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// All configured anchors.
    #[serde(default)]
    pub anchor: Vec<AnchorEntry>,
}

/// Registry of pinned trust-anchor keys, keyed by exact source string.
#[derive(Debug, Default)]
pub struct TrustAnchorRegistry {
    keys: HashMap<String, [u8; 32]>,
}

impl TrustAnchorRegistry {
    /// An empty registry: every source falls back to evidence-carried keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `s` as TOML anchor configuration.
    ///
    /// Returns `ClaimError::ConfigError` when the TOML is malformed, a key
    /// is not valid hex, or a decoded key is not exactly 32 bytes.
    pub fn from_toml_str(s: &str) -> ClaimResult<Self> {
        let config: AnchorConfig = toml::from_str(s).map_err(|e| ClaimError::ConfigError {
            reason: format!("failed to parse anchor TOML: {}", e),
        })?;

        let mut registry = Self::new();
        for entry in config.anchor {
            let bytes = hex::decode(&entry.public_key).map_err(|e| ClaimError::ConfigError {
                reason: format!("anchor for '{}' has non-hex key: {}", entry.source, e),
            })?;
            let key: [u8; 32] = bytes.try_into().map_err(|_| ClaimError::ConfigError {
                reason: format!("anchor for '{}' must be a 32-byte key", entry.source),
            })?;
            registry.keys.insert(entry.source, key);
        }
        Ok(registry)
    }

    /// Read the file at `path` and parse it as TOML anchor configuration.
    pub fn from_file(path: &Path) -> ClaimResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ClaimError::ConfigError {
            reason: format!("failed to read anchor file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Pin a key programmatically.
    pub fn pin(&mut self, source: impl Into<String>, key: [u8; 32]) {
        self.keys.insert(source.into(), key);
    }

    /// The pinned key for `source`, if one is configured.
    pub fn key_for(&self, source: &str) -> Option<&[u8; 32]> {
        self.keys.get(source)
    }

    /// Number of configured anchors.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no anchor is configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use exoclaim_contracts::error::ClaimError;

    use super::TrustAnchorRegistry;

    const GOOD: &str = r#"
        [[anchor]]
        source = "https://x/price"
        public_key = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60"

        [[anchor]]
        source = "db://accounts"
        public_key = "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c"
    "#;

    #[test]
    fn parses_valid_config() {
        let registry = TrustAnchorRegistry::from_toml_str(GOOD).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.key_for("https://x/price").is_some());
        assert!(registry.key_for("https://unknown").is_none());
    }

    #[test]
    fn rejects_non_hex_key() {
        let bad = r#"
            [[anchor]]
            source = "s"
            public_key = "not-hex"
        "#;
        match TrustAnchorRegistry::from_toml_str(bad) {
            Err(ClaimError::ConfigError { reason }) => {
                assert!(reason.contains("non-hex"), "reason: {}", reason);
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn rejects_wrong_length_key() {
        let bad = r#"
            [[anchor]]
            source = "s"
            public_key = "abcd"
        "#;
        match TrustAnchorRegistry::from_toml_str(bad) {
            Err(ClaimError::ConfigError { reason }) => {
                assert!(reason.contains("32-byte"), "reason: {}", reason);
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn empty_document_is_empty_registry() {
        let registry = TrustAnchorRegistry::from_toml_str("").unwrap();
        assert!(registry.is_empty());
    }
}
