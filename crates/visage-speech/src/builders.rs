//! Timeline builders: two pure strategies producing the same event shape.
//!
//! The local builder estimates timing from the text itself and is used when
//! the speech backend reports nothing better than word boundaries. The timed
//! builder trusts an externally measured viseme stream and only distributes
//! words and markers proportionally over it. Both return an event list for
//! the [`TimelineScheduler`](crate::scheduler::TimelineScheduler).

use crate::phoneme::extract_phonemes;
use crate::timeline::{parse_tokens, stripped_text, Timeline, TimelineEvent, Token, VisemeSample};
use crate::viseme::map_phoneme;

/// Estimated speaking time per character at rate 1.0.
const MS_PER_CHAR: f64 = 50.0;
/// Mouth-closure gap between words at rate 1.0.
const INTER_WORD_GAP_MS: f64 = 30.0;

/// External positions above this are 100ns ticks, not milliseconds.
const TICKS_THRESHOLD: f64 = 1_000_000.0;
const TICKS_PER_MS: f64 = 10_000.0;

/// Viseme display-time clamp for externally timed streams.
const MIN_VISEME_MS: f64 = 90.0;
const MAX_VISEME_MS: f64 = 250.0;

/// A timeline-construction strategy. Which one applies depends on what the
/// speech backend reported, not on any machine state; callers pick the
/// builder when the data arrives.
pub trait TimelineBuilder {
    fn build(&self) -> Timeline;
}

/// Local-estimation strategy: timing guessed from the text alone.
#[derive(Clone, Copy, Debug)]
pub struct LocalEstimate<'a> {
    pub text: &'a str,
    pub rate: f64,
}

impl TimelineBuilder for LocalEstimate<'_> {
    fn build(&self) -> Timeline {
        timeline_from_text(self.text, self.rate)
    }
}

/// Measured-stream strategy: viseme timing from the speech engine, words and
/// markers distributed proportionally.
#[derive(Clone, Copy, Debug)]
pub struct TimedVisemes<'a> {
    pub samples: &'a [VisemeSample],
    pub text: &'a str,
}

impl TimelineBuilder for TimedVisemes<'_> {
    fn build(&self) -> Timeline {
        timeline_from_timed_visemes(self.samples, self.text)
    }
}

/// Clamp a speech-rate multiplier to a sane range; non-finite inputs fall
/// back to 1.0.
fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.1, 10.0)
    } else {
        1.0
    }
}

/// Build a timeline from raw text with locally estimated timing.
///
/// Per word: one `Word` event at the running offset, then one `Viseme` event
/// per estimated phoneme at sub-offsets. The running offset advances by the
/// larger of the character-count estimate and the summed viseme durations,
/// plus an inter-word gap. Marker tokens are placed proportionally to their
/// character position in the text.
pub fn timeline_from_text(raw: &str, rate: f64) -> Timeline {
    let rate = sanitize_rate(rate);
    let tokens = parse_tokens(raw);
    let text = stripped_text(&tokens);

    let mut timeline = Timeline::default();
    let mut running_ms = 0.0;

    for (index, word) in text.split_whitespace().enumerate() {
        let word_estimate_ms = word.chars().count() as f64 * MS_PER_CHAR / rate;
        timeline.push(
            TimelineEvent::Word {
                word: word.to_string(),
                index,
            },
            running_ms,
        );

        let mut local_ms = 0.0;
        for phoneme in extract_phonemes(word) {
            let tv = map_phoneme(&phoneme);
            let duration_ms = tv.duration_ms / rate;
            timeline.push(
                TimelineEvent::Viseme {
                    id: tv.viseme,
                    duration_ms,
                },
                running_ms + local_ms,
            );
            local_ms += duration_ms;
        }

        running_ms += word_estimate_ms.max(local_ms) + INTER_WORD_GAP_MS / rate;
    }

    place_markers(&mut timeline, &tokens, running_ms);
    timeline
}

/// Build a timeline from an externally timed viseme stream.
///
/// Each sample becomes a `Viseme` event at its measured offset with a
/// duration derived from the gap to the next sample, clamped to
/// [90 ms, 250 ms]. The stream carries no word timing, so `Word` and marker
/// events are spread proportionally by character count over the measured
/// total duration; words are shifted 60 ms early so the mouth leads the
/// boundary callback.
pub fn timeline_from_timed_visemes(samples: &[VisemeSample], raw: &str) -> Timeline {
    let tokens = parse_tokens(raw);
    let text = stripped_text(&tokens);
    let mut timeline = Timeline::default();

    for (i, sample) in samples.iter().enumerate() {
        let cur = normalize_ms(sample.position);
        let next = samples
            .get(i + 1)
            .map(|n| normalize_ms(n.position))
            .unwrap_or(cur + 120.0);
        // Measured durations get the same bounds as gap-derived ones; a
        // mistimed capture must not freeze or strobe a mouth shape.
        let duration_ms = sample
            .duration_ms
            .unwrap_or(next - cur + 20.0)
            .clamp(MIN_VISEME_MS, MAX_VISEME_MS);
        timeline.push(
            TimelineEvent::Viseme {
                id: sample.id,
                duration_ms,
            },
            cur,
        );
    }

    let max_offset_ms = samples
        .iter()
        .map(|s| normalize_ms(s.position))
        .fold(0.0, f64::max)
        + 200.0;

    let words: Vec<&str> = text.split_whitespace().collect();
    let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
    let total_chars = total_chars.max(1);

    let mut running_chars = 0;
    for (index, word) in words.iter().enumerate() {
        running_chars += word.chars().count();
        let ratio = running_chars as f64 / total_chars as f64;
        timeline.push(
            TimelineEvent::Word {
                word: word.to_string(),
                index,
            },
            (ratio * max_offset_ms - 60.0).max(0.0),
        );
    }

    place_markers(&mut timeline, &tokens, max_offset_ms);
    timeline
}

/// Normalize an external timestamp to milliseconds. Values past the
/// threshold can only be 100ns ticks.
pub fn normalize_ms(position: f64) -> f64 {
    if position > TICKS_THRESHOLD {
        position / TICKS_PER_MS
    } else {
        position
    }
}

/// Place marker tokens at offsets proportional to their character position
/// among the text tokens.
fn place_markers(timeline: &mut Timeline, tokens: &[Token], total_ms: f64) {
    let total_chars: usize = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Text(s) => Some(s.chars().count()),
            Token::Marker(_) => None,
        })
        .sum();
    if total_chars == 0 {
        return;
    }

    let mut used_chars = 0;
    for token in tokens {
        match token {
            Token::Text(s) => used_chars += s.chars().count(),
            Token::Marker(symbol) => {
                let ratio = used_chars as f64 / total_chars as f64;
                timeline.push(
                    TimelineEvent::Marker {
                        symbol: symbol.clone(),
                    },
                    ratio * total_ms,
                );
            }
        }
    }
}
