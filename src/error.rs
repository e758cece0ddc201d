//! Unified error hierarchy for trailstat
//!
//! Separates broken input (`ParseError`), structurally valid but incomplete
//! input (`DataError`) and missing user attributes (`ProfileIncomplete`), so
//! callers can tell "nothing to report" apart from "input was broken".

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all trailstat operations
#[derive(Debug, Error)]
pub enum TrailError {
    /// GPX document could not be read or decoded
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// GPX document decoded but is missing required values
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Energy estimate requested without a complete profile
    #[error("Insufficient profile: {0}")]
    Profile(#[from] ProfileIncomplete),

    /// Invalid calculation parameters
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

}

/// Errors raised while decoding a GPX source
#[derive(Debug, Error)]
pub enum ParseError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File exists but could not be read
    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// Not well-formed XML, or not a GPX document
    #[error("Malformed GPX: {reason}")]
    Malformed { reason: String },

    /// Document lacks the track/segment/point structure
    #[error("Missing GPX structure: {what}")]
    MissingStructure { what: String },
}

/// Errors for GPX documents that decode but carry incomplete points
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("Track point {index} has no elevation")]
    MissingElevation { index: usize },

    #[error("Track point {index} has no timestamp")]
    MissingTimestamp { index: usize },

    /// Latitude outside [-90, 90] or longitude outside [-180, 180)
    #[error("Track point {coordinate} out of range: {value}")]
    CoordinateOutOfRange { coordinate: String, value: f64 },

    /// Timestamp earlier than its predecessor
    #[error("Track point {index} is earlier than the point before it")]
    TimestampOutOfOrder { index: usize },

    /// Elevation extremes requested over an empty list
    #[error("No elevations available")]
    NoElevations,
}

/// A required profile field is missing or not a positive number
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("missing or invalid {field}")]
pub struct ProfileIncomplete {
    pub field: &'static str,
}

impl ProfileIncomplete {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

/// Calculation errors
#[derive(Debug, Error, PartialEq)]
pub enum CalculationError {
    /// Invalid parameter
    #[error("Invalid parameter for {calculation}: {parameter}={value}")]
    InvalidParameter {
        calculation: String,
        parameter: String,
        value: String,
    },
}

/// Result type alias for trailstat operations
pub type Result<T> = std::result::Result<T, TrailError>;

impl TrailError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrailError::Parse(ParseError::FileNotFound { .. }) => ErrorSeverity::Warning,
            TrailError::Profile(_) => ErrorSeverity::Info,
            TrailError::Data(_) => ErrorSeverity::Warning,
            TrailError::Configuration(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            TrailError::Parse(ParseError::FileNotFound { path }) => {
                format!("Could not find track file: {}", path.display())
            }
            TrailError::Parse(ParseError::Malformed { .. }) => {
                "The selected file is not a valid GPX track.".to_string()
            }
            TrailError::Data(DataError::MissingElevation { .. })
            | TrailError::Data(DataError::MissingTimestamp { .. }) => {
                "The track is missing elevation or time data and cannot be analyzed.".to_string()
            }
            TrailError::Profile(_) => {
                "Please select an activity and enter your personal information in settings."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical error, the tool cannot continue
    Critical,
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent other operations
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
