//! Secondary-motion simulation for hair.
//!
//! A two-axis damped-spring pendulum driven by head orientation, integrated
//! with semi-implicit Euler and mapped to six normalized morph channels. No
//! rendering and no clock; the driver supplies the time delta each step.

pub mod sway;

pub use sway::{HeadState, SwayConfig, SwayOutput, SwayPendulum, SwayState};
