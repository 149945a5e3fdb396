//! Concurrent snippet playback with per-channel conflict resolution.
//!
//! The aggregator owns every loaded snippet and, on each heartbeat, melts
//! their poses into a single winning value per channel. Winners are picked by
//! priority first, then by strictly greater magnitude at equal priority, so
//! an earlier-loaded snippet keeps the channel on exact ties. Values are only
//! forwarded to the sink when they moved by at least the dead-band since the
//! last send.

use hashbrown::HashMap;

use crate::channel::{Channel, ChannelSink};
use crate::config::Config;
use crate::error::SnippetError;
use crate::snippet::{normalize_frames, Keyframe, Snippet, SnippetCategory, SnippetSpec};

struct Winner {
    priority: i32,
    value: f32,
    /// Wall seconds until the owning snippet's next keyframe, rate already
    /// applied. Infinite when no keyframe is pending.
    remaining: f32,
}

/// Mixes every active snippet into per-channel winners and drives the
/// adaptive heartbeat.
pub struct Aggregator {
    cfg: Config,
    snippets: Vec<Snippet>,
    /// Values as last forwarded to the sink. Channels never sent are treated
    /// as 0 for dead-band purposes.
    previous: HashMap<Channel, f32>,
    seq: u64,
}

impl Aggregator {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            snippets: Vec::new(),
            previous: HashMap::new(),
            seq: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Load a snippet, returning its effective name. Unnamed snippets get a
    /// generated name. Duplicate names coexist; name-based controls then
    /// affect all matches.
    pub fn load(&mut self, spec: SnippetSpec) -> String {
        self.seq += 1;
        let fallback = format!("snippet_{}", self.seq);
        let snippet = Snippet::from_spec(spec, fallback, self.cfg.min_snippet_duration);
        let name = snippet.name.clone();
        log::debug!(
            "loaded snippet '{}' ({} curves, max_time {:.2}s)",
            name,
            snippet.curves.len(),
            snippet.max_time
        );
        self.snippets.push(snippet);
        name
    }

    /// Parse and load a snippet from its JSON wire form.
    pub fn load_json(&mut self, json: &str) -> Result<String, SnippetError> {
        let spec: SnippetSpec = serde_json::from_str(json)?;
        Ok(self.load(spec))
    }

    /// Remove every snippet with this name. Removal does not emit zeros; pair
    /// with a [`Fade`](crate::fade::Fade) for a graceful exit.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.snippets.len();
        self.snippets.retain(|s| s.name != name);
        before - self.snippets.len()
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snippets.iter().any(|s| s.name == name)
    }

    pub fn play_all(&mut self) {
        for s in &mut self.snippets {
            s.is_playing = true;
        }
    }

    pub fn pause_all(&mut self) {
        for s in &mut self.snippets {
            s.is_playing = false;
        }
    }

    /// Pause everything and rewind local clocks to zero.
    pub fn stop_all(&mut self) {
        for s in &mut self.snippets {
            s.is_playing = false;
            s.current_time = 0.0;
        }
    }

    pub fn set_playing(&mut self, name: &str, playing: bool) {
        self.for_each_named(name, |s| s.is_playing = playing);
    }

    pub fn set_time(&mut self, name: &str, time: f32) {
        self.for_each_named(name, |s| s.current_time = time.max(0.0));
    }

    pub fn set_loop(&mut self, name: &str, looped: bool) {
        self.for_each_named(name, |s| s.looped = looped);
    }

    pub fn set_priority(&mut self, name: &str, priority: i32) {
        self.for_each_named(name, |s| s.priority = priority);
    }

    pub fn set_playback_rate(&mut self, name: &str, rate: f32) {
        if rate > 0.0 {
            self.for_each_named(name, |s| s.playback_rate = rate);
        }
    }

    /// Replace one channel's keyframes on every snippet with this name,
    /// keeping local clocks and play state intact. Frames get the same
    /// normalization as loading. `max_time` grows if the new frames extend
    /// past it but never shrinks.
    pub fn set_curves(&mut self, name: &str, channel: &str, mut frames: Vec<Keyframe>) {
        let latest = normalize_frames(&mut frames);
        self.for_each_named(name, |s| {
            s.curves.insert(channel.to_string(), frames.clone());
            s.max_time = s.max_time.max(latest);
        });
    }

    /// Scale a snippet's output intensities. Fades drive this toward zero.
    pub fn set_intensity_scale(&mut self, name: &str, scale: f32) {
        self.for_each_named(name, |s| s.intensity_scale = scale.max(0.0));
    }

    pub fn set_global_playback_rate(&mut self, rate: f32) {
        if rate > 0.0 {
            for s in &mut self.snippets {
                s.playback_rate = rate;
            }
        }
    }

    pub fn set_global_intensity_scale(&mut self, scale: f32) {
        let scale = scale.max(0.0);
        for s in &mut self.snippets {
            s.intensity_scale = scale;
        }
    }

    fn for_each_named(&mut self, name: &str, mut f: impl FnMut(&mut Snippet)) {
        for s in self.snippets.iter_mut().filter(|s| s.name == name) {
            f(s);
        }
    }

    /// Last value forwarded for a channel, 0 if never sent.
    pub fn value(&self, channel: &Channel) -> f32 {
        self.previous.get(channel).copied().unwrap_or(0.0)
    }

    /// Advance every active snippet's local clock by `dt` seconds, scaled by
    /// its playback rate. Snippets reaching their end either wrap back to
    /// zero (looping) or clamp and stop. Non-finite or non-positive deltas
    /// are a no-op.
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() {
            log::warn!("snippet advance rejected: dt={dt}");
            return;
        }
        if dt <= 0.0 {
            return;
        }
        for s in &mut self.snippets {
            if !s.active() {
                continue;
            }
            s.current_time += dt * s.playback_rate;
            if s.current_time >= s.max_time {
                if s.looped {
                    s.current_time = 0.0;
                } else {
                    s.current_time = s.max_time;
                    s.is_playing = false;
                    // Evaluation still owes the pose at the clamped end time.
                    s.just_finished = true;
                }
            }
        }
    }

    /// Resolve per-channel winners at the current local times and forward
    /// changed values to the sink. Zero-length one-shots are pruned once
    /// their values have been through a send.
    pub fn evaluate(&mut self, sink: &mut dyn ChannelSink) {
        let mut best: HashMap<String, (Winner, SnippetCategory)> = HashMap::new();

        for s in &self.snippets {
            if !s.active() {
                continue;
            }
            let pose = s.evaluate();
            let remaining = (pose.next_change - s.current_time) / s.playback_rate;
            for (key, value) in pose.values {
                let candidate = Winner {
                    priority: s.priority,
                    value,
                    remaining,
                };
                match best.get(&key) {
                    Some((cur, _))
                        if !(candidate.priority > cur.priority
                            || (candidate.priority == cur.priority
                                && candidate.value > cur.value)) => {}
                    _ => {
                        best.insert(key, (candidate, s.category));
                    }
                }
            }
        }

        for (key, (winner, category)) in best {
            let channel = match category {
                SnippetCategory::Viseme => Channel::viseme(key),
                SnippetCategory::Default => Channel::au(key),
            };
            let last = self.previous.get(&channel).copied().unwrap_or(0.0);
            if (winner.value - last).abs() >= self.cfg.dead_band {
                let hint = if winner.remaining.is_finite() && winner.remaining > 0.0 {
                    (winner.remaining * 1000.0).round() as u32
                } else {
                    self.cfg.default_duration_hint_ms
                };
                log::trace!("send {} = {:.3} (hint {}ms)", channel, winner.value, hint);
                sink.apply(&channel, winner.value, hint.max(1));
                self.previous.insert(channel, winner.value);
            }
        }

        for s in &mut self.snippets {
            s.just_finished = false;
        }
        self.snippets
            .retain(|s| !(s.max_time == 0.0 && !s.is_playing));
    }

    /// Milliseconds until the earliest upcoming keyframe across playing
    /// snippets, scaled by playback rate. Falls back to the configured idle
    /// delay when nothing is pending so external state can still be re-synced.
    pub fn next_heartbeat_ms(&self) -> u64 {
        let mut soonest = f32::INFINITY;
        for s in &self.snippets {
            if !s.is_playing {
                continue;
            }
            let pose = s.evaluate();
            if pose.next_change.is_finite() {
                let wall = (pose.next_change - s.current_time) / s.playback_rate;
                if wall > 0.0 && wall < soonest {
                    soonest = wall;
                }
            }
        }
        if soonest.is_finite() {
            ((soonest * 1000.0).round() as u64).max(1)
        } else {
            self.cfg.fallback_delay_ms
        }
    }

    /// One driver step: advance clocks, resolve and send winners, report the
    /// delay until the next required call.
    pub fn heartbeat(&mut self, dt: f32, sink: &mut dyn ChannelSink) -> u64 {
        self.advance(dt);
        self.evaluate(sink);
        self.next_heartbeat_ms()
    }
}
