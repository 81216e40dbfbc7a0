//! Error types for the timetable pipeline.

use thiserror::Error;

/// Errors that can occur while parsing a timetable page or exporting it.
///
/// Row, cell and session anomalies never show up here: those are absorbed
/// where they happen and the offending piece is dropped.
#[derive(Debug, Error, Clone)]
pub enum TimetableError {
    /// The schedule table is missing, so the source page changed shape
    #[error("Source page structure changed: {message}")]
    StructureChanged { message: String },

    /// The week/owner header could not be read
    #[error("Could not parse page header: {message}")]
    Header { message: String },

    /// Event dates could not be derived from the schedule metadata
    #[error("Could not compute event dates: {message}")]
    EventDate { message: String },

    /// A configuration file was missing or malformed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// URL parsing/construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },

    /// JSON (de)serialization failed
    #[error("JSON error: {message}")]
    Json { message: String },

    /// Reading or writing a file failed
    #[error("IO error: {message}")]
    Io { message: String },
}

impl TimetableError {
    /// Returns true if the source page no longer looks like a timetable.
    ///
    /// Nothing parsed from such a page can be trusted; callers usually alert
    /// rather than retry.
    pub fn is_structural(&self) -> bool {
        matches!(self, TimetableError::StructureChanged { .. })
    }

    /// Returns true if the schedule parsed but its dates could not be placed
    /// on a calendar.
    pub fn is_date_error(&self) -> bool {
        matches!(self, TimetableError::EventDate { .. })
    }
}

impl From<serde_json::Error> for TimetableError {
    fn from(err: serde_json::Error) -> Self {
        TimetableError::Json {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for TimetableError {
    fn from(err: url::ParseError) -> Self {
        TimetableError::UrlError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for TimetableError {
    fn from(err: std::io::Error) -> Self {
        TimetableError::Io {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TimetableError>;
