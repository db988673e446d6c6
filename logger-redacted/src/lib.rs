//! Logging for the directory service
//!
//! [`init_logging`] installs a `tracing` subscriber: JSON lines in production,
//! human-readable output otherwise, with `RUST_LOG` taking precedence over the
//! configured level.
//!
//! [`PiiRedactor`] masks email addresses (and any configured custom patterns)
//! in strings before they reach a log line. Hashed output lets repeated values
//! be correlated without revealing them.
//!
//! ```rust
//! use logger_redacted::{LoggerConfig, PiiRedactor};
//!
//! let redactor = PiiRedactor::new(&LoggerConfig::default()).unwrap();
//! assert!(!redactor.redact("bo@example.com").contains("bo@"));
//! ```

pub mod config;
pub mod error;
pub mod init;
pub mod redactor;

pub use config::*;
pub use error::*;
pub use init::init_logging;
pub use redactor::*;
