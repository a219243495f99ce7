// Error types for the theory crate.
//
// One enum covers the whole crate. Parse failures name the offending input;
// the configuration variants (`NonPositive`, `EmptyLinePool`, `EmptyPool`)
// are grouped by `is_configuration_error` so the CLI and UI can treat them
// as one class.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TheoryError {
    #[error("Invalid root note: {0}")]
    InvalidNote(String),
    #[error("Invalid mode: {0} (expected major or minor)")]
    InvalidMode(String),
    #[error("Invalid scale type: {0}")]
    InvalidScaleType(String),
    #[error("Invalid roman numeral: {0}")]
    InvalidRomanNumeral(String),
    #[error("Invalid line type: {0}")]
    InvalidLineType(String),
    #[error("Invalid guitar string index: {0} (expected 0-5)")]
    InvalidString(usize),
    #[error("Invalid value for {flag}: '{value}'")]
    InvalidArgument { flag: String, value: String },
    #[error("{what} must be positive")]
    NonPositive { what: &'static str },
    #[error("Line {line} has no chords left after '{line_type}' filtering")]
    EmptyLinePool { line: usize, line_type: String },
    #[error("Chord pool is empty")]
    EmptyPool,
    #[error("Playback service already disposed")]
    Disposed,
    #[error("MIDI error: {0}")]
    Midi(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TheoryError {
    /// True for the caller-configuration class: bad counts or a pool that
    /// filtering emptied.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            TheoryError::NonPositive { .. }
                | TheoryError::EmptyLinePool { .. }
                | TheoryError::EmptyPool
        )
    }
}

pub type Result<T> = std::result::Result<T, TheoryError>;
