// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Structured JSON output instead of human-readable lines.
    pub json: bool,
    pub redaction_enabled: bool,
    /// Hash redacted values so repeated occurrences can be correlated.
    pub hash_for_correlation: bool,
    /// Extra `(pattern, replacement)` pairs applied after the built-in rules.
    pub custom_patterns: Vec<CustomPattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPattern {
    pub pattern: String,
    pub replacement: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            redaction_enabled: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}
