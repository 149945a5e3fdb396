//! Error types for the mixing core.
//!
//! Malformed curve data inside an otherwise parseable snippet degrades to an
//! empty contribution rather than erroring; a broken snippet should dim one
//! expression, not crash the pose loop. Errors are reserved for input that
//! cannot be interpreted at all.

/// Errors raised while turning external snippet data into a loadable spec.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SnippetError {
    /// The snippet JSON could not be parsed.
    #[error("snippet parse error: {reason}")]
    Parse { reason: String },
}

impl From<serde_json::Error> for SnippetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
