//! Expression mixing core for parametric faces (engine-agnostic).
//!
//! Three cooperating pieces, all advanced by an external driver:
//! - [`TransitionEngine`]: one-shot value tweens keyed by channel, ticked per
//!   frame.
//! - [`Aggregator`]: a set of keyframed [`Snippet`]s evaluated per heartbeat
//!   with step (hold) semantics, conflicts resolved by priority then
//!   magnitude, changed values forwarded to a [`ChannelSink`].
//! - [`Fade`]: stepwise fade-out of one snippet's contribution.
//!
//! Nothing here owns a clock or a thread; the driver supplies deltas and
//! re-invokes the heartbeat after the delay the aggregator asks for.

pub mod aggregator;
pub mod channel;
pub mod config;
pub mod easing;
pub mod error;
pub mod fade;
pub mod snippet;
pub mod transition;

pub use aggregator::Aggregator;
pub use channel::{Channel, ChannelSink};
pub use config::Config;
pub use easing::EasingFn;
pub use error::SnippetError;
pub use fade::{Fade, FadeProgress};
pub use snippet::{AuEntry, AuId, Keyframe, Snippet, SnippetCategory, SnippetSpec, StepSample};
pub use transition::{TransitionEngine, TransitionHandle};
