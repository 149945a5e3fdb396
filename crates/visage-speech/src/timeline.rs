//! Timeline event model and token helpers.

use serde::{Deserialize, Serialize};

/// One scheduled speech event. Immutable once placed on a timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TimelineEvent {
    Word { word: String, index: usize },
    Viseme { id: u32, duration_ms: f64 },
    /// Non-text token (emoji and similar) carried through verbatim for the
    /// expressive systems downstream.
    Marker { symbol: String },
}

/// An event with its offset from utterance start, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub event: TimelineEvent,
    pub offset_ms: f64,
}

impl TimedEvent {
    /// Offset plus the event's own duration, where it has one.
    pub fn end_ms(&self) -> f64 {
        match &self.event {
            TimelineEvent::Viseme { duration_ms, .. } => self.offset_ms + duration_ms,
            _ => self.offset_ms,
        }
    }
}

/// An ordered event list for one utterance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub events: Vec<TimedEvent>,
}

impl Timeline {
    pub fn push(&mut self, event: TimelineEvent, offset_ms: f64) {
        self.events.push(TimedEvent { event, offset_ms });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Max of offset + duration over all events; the completion signal fires
    /// here.
    pub fn total_duration_ms(&self) -> f64 {
        self.events.iter().map(TimedEvent::end_ms).fold(0.0, f64::max)
    }
}

/// One sample from an externally timed viseme stream. `position` is either
/// milliseconds or 100-nanosecond ticks; the builder normalizes by magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct VisemeSample {
    #[serde(alias = "number")]
    pub id: u32,
    #[serde(alias = "audioPosition", alias = "offset")]
    pub position: f64,
    #[serde(default, alias = "duration")]
    pub duration_ms: Option<f64>,
}

/// Parse a speech engine's viseme array from its JSON wire form. Accepts
/// both `{number, audioPosition}` and `{id, position, duration}` field
/// spellings.
pub fn viseme_samples_from_json(json: &str) -> Result<Vec<VisemeSample>, crate::SpeechError> {
    Ok(serde_json::from_str(json)?)
}

/// A source-text token: spoken text or a pass-through marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Marker(String),
}

/// Split raw input into text and marker tokens. A whitespace-separated token
/// with no alphanumeric character is a marker (emoji, dingbats); everything
/// else is speakable text.
pub fn parse_tokens(raw: &str) -> Vec<Token> {
    raw.split_whitespace()
        .map(|t| {
            if t.chars().any(char::is_alphanumeric) {
                Token::Text(t.to_string())
            } else {
                Token::Marker(t.to_string())
            }
        })
        .collect()
}

/// Speakable text only, single-space joined.
pub fn stripped_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for t in tokens {
        if let Token::Text(s) = t {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(s);
        }
    }
    out
}
