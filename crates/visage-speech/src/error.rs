//! Errors for the timeline layer.

/// Errors raised by the scheduler. Builder functions are pure and total; they
/// do not produce errors.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SpeechError {
    /// A timeline is already being dispatched. Loading never replaces or
    /// queues; the caller must cancel the active timeline first.
    #[error("a timeline is already scheduled; cancel it before loading another")]
    SchedulerBusy,

    /// An external viseme payload could not be parsed.
    #[error("viseme stream parse error: {reason}")]
    Parse { reason: String },
}

impl From<serde_json::Error> for SpeechError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
