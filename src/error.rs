//! Error types for persona-interact
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//!
//! Panel errors (transport, backend, import) are surfaced as notices and
//! never end a session; configuration and IO errors end the process.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for panel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Transport errors (3xx)
    TransportFailed = 300,
    TransportTimeout = 301,

    // Backend errors (4xx)
    BackendStatus = 400,
    BackendMalformed = 401,
    ActionMismatch = 402,

    // Import errors (5xx)
    ImportParse = 500,
    ImportEmpty = 501,
    ImportShape = 502,

    // Internal errors (9xx)
    InternalError = 900,
    InvalidArgument = 901,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (one per hundred-group)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Transport Errors
    // ─────────────────────────────────────────────────────────────

    /// Backend could not be reached
    #[error("Backend unreachable during {operation}: {message}")]
    TransportFailure {
        operation: String,
        message: String,
        timed_out: bool,
    },

    // ─────────────────────────────────────────────────────────────
    // Backend Errors
    // ─────────────────────────────────────────────────────────────

    /// Backend answered with a non-success status or an unexpected body
    #[error("Backend rejected {operation} (HTTP {status}): {message}")]
    BackendError {
        operation: String,
        status: u16,
        message: String,
    },

    /// update_action echoed a different identifier than the one sent
    #[error("Backend saved a different action: expected {expected}, got {actual}")]
    ActionMismatch { expected: String, actual: String },

    // ─────────────────────────────────────────────────────────────
    // Import Errors
    // ─────────────────────────────────────────────────────────────

    /// Import input is neither valid JSON nor valid YAML
    #[error("Input is not valid JSON or YAML: {message}")]
    ImportParse { message: String },

    /// Import input parsed but is not a mapping or a list of mappings
    #[error("Import must be a mapping or a list of mappings: {message}")]
    ImportShape { message: String },

    /// Import input parsed but contained nothing
    #[error("No data to import. Please provide valid text or upload a file.")]
    EmptyImport,

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Caller supplied an argument outside the accepted range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::InternalError,

            Error::TransportFailure { timed_out: true, .. } => ErrorCode::TransportTimeout,
            Error::TransportFailure { .. } => ErrorCode::TransportFailed,

            Error::BackendError { status: 200, .. } => ErrorCode::BackendMalformed,
            Error::BackendError { .. } => ErrorCode::BackendStatus,
            Error::ActionMismatch { .. } => ErrorCode::ActionMismatch,

            Error::ImportParse { .. } => ErrorCode::ImportParse,
            Error::EmptyImport => ErrorCode::ImportEmpty,
            Error::ImportShape { .. } => ErrorCode::ImportShape,

            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether the error ends the process rather than just the current action
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::Config(_)
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'persona-interact config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'persona-interact config validate' to see details."
            ),
            Error::ConfigValidation { field: Some(_), .. } => Some(
                "Set the missing value in the [session] section or pass it on the command line (--agent-id, --action-id)."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),

            Error::TransportFailure { .. } => Some(
                "Check that the backend is running and that [backend] url points at it."
            ),
            Error::BackendError { status: 401 | 403, .. } => Some(
                "The backend refused the credentials. Check [backend] token."
            ),
            Error::BackendError { status: 200, .. } => Some(
                "The backend answered with an unexpected payload. Check that the persona action is installed on the agent."
            ),

            Error::ImportParse { .. } => Some(
                "Provide a JSON or YAML mapping, or a list of mappings with condition/response/action fields."
            ),
            Error::ImportShape { .. } => Some(
                "Wrap each parameter in a mapping, e.g. {condition: ..., response: ..., action: ...}."
            ),
            Error::EmptyImport => Some(
                "The input parsed but contained no records."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            self.code().as_str(),
            self
        );

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a config validation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a transport failure
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TransportFailure {
            operation: operation.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    /// Create a backend error for a non-success status
    pub fn backend_status(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Error::BackendError {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a backend error for a 200 response whose body did not match the schema
    pub fn backend_malformed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::BackendError {
            operation: operation.into(),
            status: 200,
            message: message.into(),
        }
    }

    /// Create an import shape error
    pub fn import_shape(message: impl Into<String>) -> Self {
        Error::ImportShape {
            message: message.into(),
        }
    }

    /// Create an import parse error
    pub fn import_parse(message: impl Into<String>) -> Self {
        Error::ImportParse {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
