//! Spooler adapter configuration

use serde::Deserialize;

use crate::spooler::{PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL};

/// Spooler adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpoolConfig {
    /// Port reported for a printer missing from the enumeration
    /// (env: CRAB_SPOOL_FALLBACK_PORT)
    pub fallback_port: String,
    /// `EnumPrintersW` flags (env: CRAB_SPOOL_ENUM_FLAGS)
    pub enum_flags: u32,
    /// Datatype for raw documents (env: CRAB_SPOOL_DATATYPE)
    pub datatype: String,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            fallback_port: "LPT1".to_string(),
            enum_flags: PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS,
            datatype: "RAW".to_string(),
        }
    }
}

impl SpoolConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            fallback_port: lookup("CRAB_SPOOL_FALLBACK_PORT")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.fallback_port),
            enum_flags: lookup("CRAB_SPOOL_ENUM_FLAGS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enum_flags),
            datatype: lookup("CRAB_SPOOL_DATATYPE")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.datatype),
        }
    }

    /// Parse a JSON settings fragment; missing keys take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
