//! Aggregator tunables.

use serde::{Deserialize, Serialize};

/// Heartbeat and normalization constants. Defaults match the reference face
/// rig; hosts with different responsiveness needs override individual fields.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Minimum change in a resolved channel value before it is forwarded
    /// downstream (fraction of full range).
    pub dead_band: f32,

    /// Duration hint sent with a value when no finite next keyframe exists.
    pub default_duration_hint_ms: u32,

    /// Heartbeat delay requested while no snippet has a pending keyframe.
    /// Deliberately long; an idle face should not wake the driver.
    pub fallback_delay_ms: u64,

    /// Floor applied to a snippet's derived duration. Explicit `max_time`
    /// values (including 0 for instantaneous snippets) bypass this.
    pub min_snippet_duration: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dead_band: 0.01,
            default_duration_hint_ms: 60,
            fallback_delay_ms: 60_000,
            min_snippet_duration: 0.5,
        }
    }
}
