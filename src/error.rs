//! Typed errors for pattern configuration and scanning.
//!
//! Library code returns these; the CLI wraps them in `anyhow` with context.

use thiserror::Error;

/// A pattern definition could not be accepted. Reported before any scan starts.
#[derive(Error, Debug)]
pub enum PatternError {
    /// `/sub` with nothing before the slash.
    #[error("substitution \"{substitution}\" supplied without a match expression")]
    SubstitutionWithoutExpression { substitution: String },

    /// `exp/` with nothing after the slash.
    #[error("empty substitution provided in pattern \"{pattern}\"")]
    EmptySubstitution { pattern: String },

    #[error("unable to compile regular expression \"{expression}\": {source}")]
    InvalidExpression {
        expression: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure of a scan. Any of these aborts the whole scan; no partial tree is returned.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A directory could not be listed.
    #[error("failed to read directory \"{path}\": {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The shared cancel token fired.
    #[error("scan cancelled")]
    Cancelled,

    /// An enumeration unit went away without reporting (panicked).
    #[error("enumeration of \"{path}\" ended without a result")]
    Disconnected { path: String },
}

impl ScanError {
    /// True for user-requested cancellation, which callers usually should not report as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanError::Cancelled)
    }
}
