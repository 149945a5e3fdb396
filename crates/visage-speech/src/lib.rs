//! Speech-to-animation timeline layer.
//!
//! Turns either raw text or an externally timed viseme stream into a list of
//! millisecond-offset events (words, mouth shapes, markers), and dispatches
//! that list through a driver-polled scheduler. The viseme events typically
//! end up as ephemeral snippets in a [`visage_anim::Aggregator`]; the
//! builders here are pure and know nothing about the consumer.

pub mod builders;
pub mod error;
pub mod phoneme;
pub mod scheduler;
pub mod snippets;
pub mod timeline;
pub mod viseme;

pub use builders::{
    timeline_from_text, timeline_from_timed_visemes, LocalEstimate, TimedVisemes, TimelineBuilder,
};
pub use error::SpeechError;
pub use phoneme::{extract_phonemes, Phoneme};
pub use scheduler::{SchedulerState, TimelineListener, TimelineScheduler};
pub use snippets::{viseme_pulse, viseme_snippet};
pub use timeline::{
    parse_tokens, stripped_text, viseme_samples_from_json, TimedEvent, Timeline, TimelineEvent,
    Token, VisemeSample,
};
pub use viseme::{map_phoneme, viseme_for, TimedViseme};
