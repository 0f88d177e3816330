use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Unable to load libsodium (tried {}): {reason}", .tried.join(", "))]
    LibraryNotFound { tried: Vec<String>, reason: String },

    #[error("Symbol `{symbol}` not found in {library}: {reason}")]
    MissingSymbol {
        symbol: String,
        library: String,
        reason: String,
    },

    #[error("sodium_init() failed with status {status}")]
    InitFailed { status: i32 },

    #[error("Invalid release version: {value}")]
    InvalidVersion { value: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration validation error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl ProbeError {
    /// Process exit code reported by the binaries.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::LibraryNotFound { .. } | ProbeError::MissingSymbol { .. } => 2,
            _ => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ProbeError::LibraryNotFound { .. } => {
                "libsodium could not be loaded. Install it or pass --library <PATH>.".to_string()
            }
            ProbeError::MissingSymbol { symbol, .. } => {
                format!("The loaded library does not export {}; is it really libsodium?", symbol)
            }
            ProbeError::InitFailed { status } => {
                format!("libsodium failed to initialize (status {})", status)
            }
            ProbeError::InvalidVersion { value } => {
                format!("'{}' is not a valid libsodium release version", value)
            }
            ProbeError::IoError(e) => format!("File operation failed: {}", e),
            ProbeError::ConfigValidationError { field, message } => {
                format!("Configuration problem in {}: {}", field, message)
            }
            ProbeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for {}: {}", field, reason)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
