//! Channel identity and the downstream sink seam.

use std::fmt;

/// One controllable degree of freedom. Keys are opaque strings: a FACS
/// action-unit id ("12"), a named morph ("browInnerUp"), or a viseme slot
/// ("14"). Action units and visemes address separate downstream tables, so
/// the class is part of the identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    ActionUnit(String),
    Viseme(String),
}

impl Channel {
    pub fn au(key: impl Into<String>) -> Self {
        Channel::ActionUnit(key.into())
    }

    pub fn viseme(key: impl Into<String>) -> Self {
        Channel::Viseme(key.into())
    }

    #[inline]
    pub fn key(&self) -> &str {
        match self {
            Channel::ActionUnit(k) | Channel::Viseme(k) => k,
        }
    }

    #[inline]
    pub fn is_viseme(&self) -> bool {
        matches!(self, Channel::Viseme(_))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::ActionUnit(k) => write!(f, "au:{k}"),
            Channel::Viseme(k) => write!(f, "viseme:{k}"),
        }
    }
}

/// Consumer of resolved channel values (mesh morph targets, a robot face, a
/// test recorder). `duration_hint_ms` is the time until the value is expected
/// to change again; sinks that tween toward targets use it as the tween
/// length. Calls must be side-effect-only and idempotent per (channel,
/// value). Failures are not caught by the aggregator; they propagate to the
/// driver.
pub trait ChannelSink {
    fn apply(&mut self, channel: &Channel, value: f32, duration_hint_ms: u32);
}

impl<F> ChannelSink for F
where
    F: FnMut(&Channel, f32, u32),
{
    fn apply(&mut self, channel: &Channel, value: f32, duration_hint_ms: u32) {
        self(channel, value, duration_hint_ms)
    }
}
