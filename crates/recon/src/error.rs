use std::fmt;

/// Errors raised at the engine's boundaries.
///
/// The reconciliation pass itself never fails: malformed field values
/// degrade to defaults during normalization. Only configuration parsing and
/// decoding of raw CSV/JSON text can produce an error.
#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, bad delimiter, etc.).
    ConfigValidation(String),
    /// CSV text could not be decoded.
    Csv { table: String, message: String },
    /// JSON text could not be decoded, or was not an array of objects.
    Json { table: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Csv { table, message } => write!(f, "{table}: invalid CSV: {message}"),
            Self::Json { table, message } => write!(f, "{table}: invalid JSON: {message}"),
        }
    }
}

impl std::error::Error for ReconError {}
