//! Synthesizes one aggregator snippet from a timed viseme stream.

use hashbrown::HashMap;
use visage_anim::{Keyframe, SnippetCategory, SnippetSpec};

use crate::builders::normalize_ms;
use crate::timeline::VisemeSample;

/// Fraction of each phoneme spent at full onset intensity before release.
const HOLD_FRACTION: f64 = 0.9;
/// Gap assumed after the last sample when it carries no duration.
const TRAILING_GAP_MS: f64 = 140.0;

/// Build an ephemeral snippet for a single fired viseme event.
///
/// One curve: onset at full intensity immediately, hold for 90% of the
/// duration, release to zero. Loaded per `Viseme` timeline event on the
/// locally estimated path, where no whole-utterance stream exists.
pub fn viseme_pulse(
    name: impl Into<String>,
    id: u32,
    duration_ms: f64,
    onset_intensity: f32,
) -> SnippetSpec {
    let release = (duration_ms * HOLD_FRACTION / 1000.0) as f32;
    let mut curves: HashMap<String, Vec<Keyframe>> = HashMap::new();
    curves.insert(
        id.to_string(),
        vec![
            Keyframe {
                time: 0.0,
                intensity: onset_intensity,
            },
            Keyframe {
                time: release,
                intensity: 0.0,
            },
        ],
    );

    SnippetSpec {
        name: Some(name.into()),
        curves,
        category: SnippetCategory::Viseme,
        max_time: Some((duration_ms / 1000.0) as f32),
        is_playing: Some(true),
        looped: Some(false),
        ..Default::default()
    }
}

/// Build one viseme-category snippet covering a whole utterance.
///
/// Every curve 0..=20 starts at zero. Each sample jumps its viseme's curve to
/// `onset_intensity` (a percentage) at its measured onset, holds for 90% of
/// the phoneme duration, then releases to zero. Curves end with a closing
/// zero at the snippet's end so the mouth always returns to rest. The
/// playback rate is carried so the curves stay aligned when speech runs
/// faster or slower than 1x.
pub fn viseme_snippet(
    name: impl Into<String>,
    samples: &[VisemeSample],
    onset_intensity: f32,
    speech_rate: f32,
) -> SnippetSpec {
    let mut curves: HashMap<String, Vec<Keyframe>> = HashMap::new();
    for id in 0..=20u32 {
        curves.insert(
            id.to_string(),
            vec![Keyframe {
                time: 0.0,
                intensity: 0.0,
            }],
        );
    }

    let mut max_time = 0.0f64;
    for (i, sample) in samples.iter().enumerate() {
        if sample.id > 20 {
            continue;
        }
        let onset_ms = normalize_ms(sample.position);
        let duration_ms = sample.duration_ms.unwrap_or_else(|| {
            samples
                .get(i + 1)
                .map(|n| normalize_ms(n.position))
                .unwrap_or(onset_ms + TRAILING_GAP_MS)
                - onset_ms
        });

        let t_start = onset_ms / 1000.0;
        let t_end = t_start + duration_ms * HOLD_FRACTION / 1000.0;

        // Curves 0..=20 are pre-seeded above.
        if let Some(frames) = curves.get_mut(&sample.id.to_string()) {
            frames.push(Keyframe {
                time: t_start as f32,
                intensity: onset_intensity,
            });
            frames.push(Keyframe {
                time: t_end as f32,
                intensity: 0.0,
            });
            max_time = max_time.max(t_end + 0.1);
        }
    }

    for frames in curves.values_mut() {
        frames.sort_by(|a, b| a.time.total_cmp(&b.time));
        let needs_close = frames
            .last()
            .map(|last| (last.time as f64) < max_time || last.intensity != 0.0)
            .unwrap_or(true);
        if needs_close {
            frames.push(Keyframe {
                time: max_time as f32,
                intensity: 0.0,
            });
        }
    }

    SnippetSpec {
        name: Some(name.into()),
        curves,
        category: SnippetCategory::Viseme,
        playback_rate: Some(speech_rate),
        intensity_scale: Some(1.0),
        max_time: Some(max_time as f32),
        is_playing: Some(true),
        looped: Some(false),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u32, position: f64, duration_ms: Option<f64>) -> VisemeSample {
        VisemeSample {
            id,
            position,
            duration_ms,
        }
    }

    #[test]
    fn pulse_is_a_one_shot_viseme_snippet() {
        let spec = viseme_pulse("v_11", 11, 120.0, 90.0);
        let frames = &spec.curves["11"];
        assert_eq!(frames[0].intensity, 90.0);
        assert_eq!(frames[1].intensity, 0.0);
        assert!((frames[1].time - 0.108).abs() < 1e-6);
        assert!((spec.max_time.unwrap() - 0.12).abs() < 1e-6);
        assert_eq!(spec.looped, Some(false));
    }

    #[test]
    fn curves_cover_full_viseme_range() {
        let spec = viseme_snippet("u1", &[], 90.0, 1.0);
        assert_eq!(spec.curves.len(), 21);
        for frames in spec.curves.values() {
            assert_eq!(frames[0].intensity, 0.0);
        }
    }

    #[test]
    fn onset_hold_and_release() {
        let spec = viseme_snippet(
            "u1",
            &[sample(11, 100.0, Some(200.0)), sample(4, 300.0, Some(100.0))],
            90.0,
            1.0,
        );
        let frames = &spec.curves["11"];
        // zero, onset at 0.1s, release at 0.1 + 0.18s, closing zero.
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[1].time, 0.1);
        assert_eq!(frames[1].intensity, 90.0);
        assert!((frames[2].time - 0.28).abs() < 1e-6);
        assert_eq!(frames[2].intensity, 0.0);
    }

    #[test]
    fn max_time_trails_the_last_release() {
        let spec = viseme_snippet("u1", &[sample(3, 0.0, Some(100.0))], 90.0, 1.0);
        let max_time = spec.max_time.unwrap();
        assert!((max_time - 0.19).abs() < 1e-6);
        // Every curve closes at max_time with zero intensity.
        for frames in spec.curves.values() {
            let last = frames.last().unwrap();
            assert_eq!(last.intensity, 0.0);
            assert!((last.time - max_time).abs() < 1e-6);
        }
    }

    #[test]
    fn tick_positions_are_normalized() {
        let spec = viseme_snippet("u1", &[sample(5, 2_000_000.0, Some(100.0))], 90.0, 1.0);
        assert_eq!(spec.curves["5"][1].time, 0.2);
    }

    #[test]
    fn out_of_range_ids_are_skipped() {
        let spec = viseme_snippet("u1", &[sample(99, 0.0, Some(100.0))], 90.0, 1.0);
        assert!(!spec.curves.contains_key("99"));
    }

    #[test]
    fn loads_as_a_viseme_snippet() {
        use visage_anim::{Aggregator, Channel, Config};

        let mut agg = Aggregator::new(Config::default());
        let name = agg.load(viseme_snippet("u1", &[sample(20, 0.0, Some(200.0))], 90.0, 1.0));
        assert_eq!(name, "u1");

        let mut sink = |_: &Channel, _: f32, _: u32| {};
        agg.evaluate(&mut sink);
        // Percent intensity normalized on load.
        assert_eq!(agg.value(&Channel::viseme("20")), 0.9);
    }
}
