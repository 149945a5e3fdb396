//! Snippet data model and step-wise evaluation.
//!
//! A snippet is a named bundle of per-channel keyframe curves played against
//! a local clock. Curves use step (hold) interpolation: a keyframe's
//! intensity holds until the next keyframe replaces it. Evaluation therefore
//! reports not just the current values but the local time of the next change,
//! which is what drives the adaptive heartbeat in the aggregator.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A single step on a curve. Time is in seconds on the snippet's local clock,
/// intensity is normalized [0,1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    #[serde(alias = "t")]
    pub time: f32,
    #[serde(alias = "v", alias = "value")]
    pub intensity: f32,
}

/// Routing class for a snippet's channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnippetCategory {
    #[serde(rename = "visemeSnippet", alias = "viseme")]
    Viseme,
    #[default]
    #[serde(other)]
    Default,
}

/// Entry in the `au` shorthand list: one keyframe on one action-unit curve.
#[derive(Clone, Debug, Deserialize)]
pub struct AuEntry {
    pub id: AuId,
    #[serde(alias = "time")]
    pub t: f32,
    #[serde(alias = "value", alias = "intensity")]
    pub v: f32,
}

/// Action-unit ids appear both as numbers and strings in authored data.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AuId {
    Num(u32),
    Str(String),
}

impl AuId {
    fn into_key(self) -> String {
        match self {
            AuId::Num(n) => n.to_string(),
            AuId::Str(s) => s,
        }
    }
}

/// Wire form of a snippet definition. All fields are optional; missing pieces
/// fall back to defaults when the runtime [`Snippet`] is built.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnippetSpec {
    pub name: Option<String>,
    /// Channel key -> keyframes. Either this or `au` may be present; when
    /// both are, `au` entries are merged in.
    pub curves: HashMap<String, Vec<Keyframe>>,
    /// Shorthand used by authored action-unit snippets.
    pub au: Vec<AuEntry>,
    #[serde(alias = "snippetCategory")]
    pub category: SnippetCategory,
    #[serde(alias = "snippetPriority")]
    pub priority: Option<i32>,
    #[serde(alias = "snippetPlaybackRate", alias = "playbackRate")]
    pub playback_rate: Option<f32>,
    #[serde(alias = "snippetIntensityScale", alias = "intensityScale")]
    pub intensity_scale: Option<f32>,
    #[serde(alias = "maxTime")]
    pub max_time: Option<f32>,
    #[serde(alias = "isPlaying")]
    pub is_playing: Option<bool>,
    #[serde(rename = "loop")]
    pub looped: Option<bool>,
}

/// Result of sampling one curve at a point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSample {
    pub value: f32,
    /// Local time of the next keyframe, `f32::INFINITY` once past the last.
    pub next_change: f32,
}

/// Sample a step-interpolated curve at local time `t`. Before the first
/// keyframe the value is 0; at or after a keyframe its intensity holds until
/// the next one.
pub fn step_sample(frames: &[Keyframe], t: f32) -> StepSample {
    let mut value = 0.0;
    let mut next_change = f32::INFINITY;
    for kf in frames {
        if kf.time <= t {
            value = kf.intensity;
        } else {
            next_change = kf.time;
            break;
        }
    }
    StepSample { value, next_change }
}

/// Aggregate sample of every curve in a snippet.
#[derive(Clone, Debug, Default)]
pub struct SnippetPose {
    pub values: HashMap<String, f32>,
    /// Earliest upcoming keyframe across all curves, in local seconds.
    pub next_change: f32,
}

/// Normalize one curve in place: percent intensities scaled down, values
/// clamped to [0,1], keyframes sorted by time. Returns the latest keyframe
/// time.
pub(crate) fn normalize_frames(frames: &mut [Keyframe]) -> f32 {
    let mut latest = 0.0f32;
    for kf in frames.iter_mut() {
        if kf.intensity > 1.0 {
            kf.intensity /= 100.0;
        }
        kf.intensity = kf.intensity.clamp(0.0, 1.0);
        if kf.time > latest {
            latest = kf.time;
        }
    }
    frames.sort_by(|a, b| a.time.total_cmp(&b.time));
    latest
}

/// A loaded snippet with its playback state.
#[derive(Clone, Debug)]
pub struct Snippet {
    pub name: String,
    pub curves: HashMap<String, Vec<Keyframe>>,
    pub category: SnippetCategory,
    pub priority: i32,
    pub current_time: f32,
    pub is_playing: bool,
    /// Set when the clock clamped at `max_time` this heartbeat. The final
    /// pose gets exactly one more evaluation before the flag clears.
    pub just_finished: bool,
    pub looped: bool,
    /// End of the snippet's local clock, seconds. Zero marks a one-shot that
    /// fires its values once and is then pruned.
    pub max_time: f32,
    pub playback_rate: f32,
    pub intensity_scale: f32,
}

impl Snippet {
    /// Build the runtime snippet from its wire form. Intensities above 1 are
    /// treated as percentages. Keyframes are sorted by time per curve. The
    /// end time comes from the explicit `max_time` when given (zero is
    /// allowed and marks a one-shot), otherwise from the latest keyframe
    /// with `min_duration` as a floor.
    pub fn from_spec(spec: SnippetSpec, fallback_name: String, min_duration: f32) -> Self {
        let mut curves = spec.curves;
        for entry in spec.au {
            curves
                .entry(entry.id.into_key())
                .or_default()
                .push(Keyframe {
                    time: entry.t,
                    intensity: entry.v,
                });
        }

        let mut latest = 0.0f32;
        for frames in curves.values_mut() {
            latest = latest.max(normalize_frames(frames));
        }

        let max_time = match spec.max_time {
            Some(t) if t >= 0.0 => t,
            _ => latest.max(min_duration),
        };

        // A zero or negative rate would stall the clock forever and poison
        // the heartbeat math with inf/NaN, so only finite positive rates load.
        let playback_rate = match spec.playback_rate {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => 1.0,
        };

        Snippet {
            name: spec.name.unwrap_or(fallback_name),
            curves,
            category: spec.category,
            priority: spec.priority.unwrap_or(0),
            current_time: 0.0,
            is_playing: spec.is_playing.unwrap_or(true),
            just_finished: false,
            looped: spec.looped.unwrap_or(false),
            max_time,
            playback_rate,
            intensity_scale: spec.intensity_scale.unwrap_or(1.0),
        }
    }

    /// Whether this snippet contributes to evaluation. Zero-length one-shots
    /// contribute even when stopped so their values get sent exactly once
    /// before pruning, and a snippet that just reached its end still sends
    /// its final pose.
    pub fn active(&self) -> bool {
        self.is_playing || self.max_time == 0.0 || self.just_finished
    }

    /// Sample every curve at the current local time, applying the intensity
    /// scale and clamping to [0,1].
    pub fn evaluate(&self) -> SnippetPose {
        let mut pose = SnippetPose {
            values: HashMap::with_capacity(self.curves.len()),
            next_change: f32::INFINITY,
        };
        for (key, frames) in &self.curves {
            let sample = step_sample(frames, self.current_time);
            let scaled = (sample.value * self.intensity_scale).clamp(0.0, 1.0);
            pose.values.insert(key.clone(), scaled);
            if sample.next_change < pose.next_change {
                pose.next_change = sample.next_change;
            }
        }
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(time: f32, intensity: f32) -> Keyframe {
        Keyframe { time, intensity }
    }

    #[test]
    fn step_holds_until_next_keyframe() {
        let frames = [kf(0.0, 0.2), kf(1.0, 0.8), kf(2.0, 0.0)];
        assert_eq!(step_sample(&frames, 0.0).value, 0.2);
        assert_eq!(step_sample(&frames, 0.99).value, 0.2);
        assert_eq!(step_sample(&frames, 1.0).value, 0.8);
        assert_eq!(step_sample(&frames, 1.5).next_change, 2.0);
        let past = step_sample(&frames, 2.5);
        assert_eq!(past.value, 0.0);
        assert!(past.next_change.is_infinite());
    }

    #[test]
    fn value_is_zero_before_first_keyframe() {
        let frames = [kf(0.5, 0.7)];
        let s = step_sample(&frames, 0.1);
        assert_eq!(s.value, 0.0);
        assert_eq!(s.next_change, 0.5);
    }

    #[test]
    fn percent_intensities_normalize() {
        let spec: SnippetSpec = serde_json::from_str(
            r#"{"name":"smile","curves":{"12":[{"t":0,"v":60},{"t":1,"v":0}]}}"#,
        )
        .unwrap();
        let sn = Snippet::from_spec(spec, "anon".into(), 0.5);
        assert_eq!(sn.curves["12"][0].intensity, 0.6);
    }

    #[test]
    fn au_shorthand_merges_into_curves() {
        let spec: SnippetSpec = serde_json::from_str(
            r#"{"au":[{"id":4,"t":0,"v":0.5},{"id":4,"t":0.3,"v":0},{"id":"9","t":0,"v":0.2}]}"#,
        )
        .unwrap();
        let sn = Snippet::from_spec(spec, "anon".into(), 0.5);
        assert_eq!(sn.curves["4"].len(), 2);
        assert_eq!(sn.curves["9"].len(), 1);
        assert_eq!(sn.name, "anon");
    }

    #[test]
    fn max_time_floor_applies_only_when_derived() {
        let derived = Snippet::from_spec(
            serde_json::from_str(r#"{"curves":{"1":[{"t":0,"v":0.5},{"t":0.2,"v":0}]}}"#).unwrap(),
            "a".into(),
            0.5,
        );
        assert_eq!(derived.max_time, 0.5);

        let explicit: SnippetSpec =
            serde_json::from_str(r#"{"curves":{"1":[{"t":0,"v":0.5}]},"maxTime":0}"#).unwrap();
        let one_shot = Snippet::from_spec(explicit, "b".into(), 0.5);
        assert_eq!(one_shot.max_time, 0.0);
        assert!(one_shot.active());
    }

    #[test]
    fn non_positive_playback_rate_falls_back_to_unity() {
        let zero: SnippetSpec = serde_json::from_str(
            r#"{"curves":{"1":[{"t":0,"v":0.5}]},"playbackRate":0}"#,
        )
        .unwrap();
        let sn = Snippet::from_spec(zero, "a".into(), 0.5);
        assert_eq!(sn.playback_rate, 1.0);

        let negative: SnippetSpec = serde_json::from_str(
            r#"{"curves":{"1":[{"t":0,"v":0.5}]},"playbackRate":-2.0}"#,
        )
        .unwrap();
        let sn = Snippet::from_spec(negative, "b".into(), 0.5);
        assert_eq!(sn.playback_rate, 1.0);
    }

    #[test]
    fn keyframes_sort_by_time() {
        let spec: SnippetSpec = serde_json::from_str(
            r#"{"curves":{"1":[{"t":1,"v":0.1},{"t":0,"v":0.9}]}}"#,
        )
        .unwrap();
        let sn = Snippet::from_spec(spec, "anon".into(), 0.5);
        assert_eq!(sn.curves["1"][0].time, 0.0);
    }

    #[test]
    fn intensity_scale_clamps_output() {
        let mut sn = Snippet::from_spec(
            serde_json::from_str(r#"{"curves":{"1":[{"t":0,"v":0.8}]}}"#).unwrap(),
            "a".into(),
            0.5,
        );
        sn.intensity_scale = 2.0;
        let pose = sn.evaluate();
        assert_eq!(pose.values["1"], 1.0);
    }
}
