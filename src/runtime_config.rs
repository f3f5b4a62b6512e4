//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for request handling and
//! document output.
//!
//! ## Environment Variables
//!
//! ### `BRRTAPI_MAX_BODY_BYTES`
//!
//! Largest request body an endpoint will decode. Bigger bodies are answered
//! with `413 Payload Too Large` before any parsing. Accepts:
//! - Decimal: `1048576`
//! - Hexadecimal: `0x100000`
//!
//! Default: `0x100000` (1 MiB)
//!
//! ### `BRRTAPI_DOC_PATH`
//!
//! Where [`crate::Api::setup`] writes the rendered API document.
//!
//! Default: `openapi.yaml`
//!
//! ## Usage
//!
//! ```rust
//! use brrtapi::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Body limit: {} bytes", config.max_body_bytes);
//! ```

use std::env;
use std::path::PathBuf;

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 0x10_0000;

/// Default document output path.
pub const DEFAULT_DOC_PATH: &str = "openapi.yaml";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Request body limit in bytes (default: 1 MiB / 0x100000)
    pub max_body_bytes: usize,
    /// Output path of the rendered API document
    pub document_path: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            document_path: PathBuf::from(DEFAULT_DOC_PATH),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let max_body_bytes = env::var("BRRTAPI_MAX_BODY_BYTES")
            .ok()
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let document_path = env::var("BRRTAPI_DOC_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOC_PATH));
        RuntimeConfig {
            max_body_bytes,
            document_path,
        }
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub fn with_document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_path = path.into();
        self
    }
}

/// Decimal or `0x`-prefixed hexadecimal byte count.
fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}
