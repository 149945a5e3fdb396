//! Spring-damper pendulum for hair sway.
//!
//! State is a 2D displacement {x, z} in [-1, 1]: x is lateral swing, z is
//! fore-aft. Each step sums spring restoration, damping, a pitch-driven
//! gravity term on the fore-aft axis, head-rotation inertia, and an optional
//! oscillating wind, then integrates with semi-implicit Euler under velocity
//! and position clamps.

use serde::{Deserialize, Serialize};

/// Degenerate or huge deltas (tab switch, debugger pause) are rejected
/// rather than integrated; one bad step can fling the pendulum to the clamp.
const MAX_DT: f32 = 0.1;
const MAX_VELOCITY: f32 = 10.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SwayConfig {
    /// Inertial mass.
    pub mass: f32,
    /// Spring restoration toward rest.
    pub stiffness: f32,
    /// Air-resistance coefficient.
    pub damping: f32,
    pub gravity: f32,
    /// How strongly head rotation drags the pendulum, [0, 1].
    pub head_influence: f32,

    pub wind_enabled: bool,
    pub wind_strength: f32,
    /// Wind direction components, each in [-1, 1].
    pub wind_direction_x: f32,
    pub wind_direction_z: f32,
    /// Magnitude of the higher-frequency turbulence term.
    pub wind_turbulence: f32,
    /// Base wind oscillation frequency, Hz.
    pub wind_frequency: f32,
}

impl Default for SwayConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 15.0,
            damping: 0.8,
            gravity: 9.8,
            head_influence: 0.5,
            wind_enabled: false,
            wind_strength: 0.0,
            wind_direction_x: 1.0,
            wind_direction_z: 0.0,
            wind_turbulence: 0.2,
            wind_frequency: 0.5,
        }
    }
}

/// Head orientation sample, radians. Velocities are optional; zero means
/// "derive from the delta to the previous sample".
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct HeadState {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw_velocity: f32,
    pub pitch_velocity: f32,
}

/// Pendulum state. Positions in [-1, 1], velocities clamped to +/-10.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SwayState {
    pub x: f32,
    pub z: f32,
    pub vx: f32,
    pub vz: f32,
}

/// Morph channel values, each in [0, 1]. Left and right sides mirror the
/// same pendulum; only the positive component of each swing direction is
/// non-zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SwayOutput {
    pub left_hair_left: f32,
    pub left_hair_right: f32,
    pub left_hair_front: f32,
    pub right_hair_left: f32,
    pub right_hair_right: f32,
    pub right_hair_front: f32,
}

impl SwayOutput {
    /// (name, value) pairs in a stable order, for feeding a channel sink.
    pub fn channels(&self) -> [(&'static str, f32); 6] {
        [
            ("L_Hair_Left", self.left_hair_left),
            ("L_Hair_Right", self.left_hair_right),
            ("L_Hair_Front", self.left_hair_front),
            ("R_Hair_Left", self.right_hair_left),
            ("R_Hair_Right", self.right_hair_right),
            ("R_Hair_Front", self.right_hair_front),
        ]
    }
}

/// The simulation. One instance per hair rig.
#[derive(Clone, Debug)]
pub struct SwayPendulum {
    config: SwayConfig,
    state: SwayState,
    time: f32,
    prev_yaw: f32,
    prev_pitch: f32,
}

impl Default for SwayPendulum {
    fn default() -> Self {
        Self::new(SwayConfig::default())
    }
}

impl SwayPendulum {
    pub fn new(config: SwayConfig) -> Self {
        Self {
            config,
            state: SwayState::default(),
            time: 0.0,
            prev_yaw: 0.0,
            prev_pitch: 0.0,
        }
    }

    pub fn state(&self) -> SwayState {
        self.state
    }

    pub fn config(&self) -> &SwayConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SwayConfig) {
        self.config = config;
    }

    /// Return to rest and forget orientation history.
    pub fn reset(&mut self) {
        self.state = SwayState::default();
        self.time = 0.0;
        self.prev_yaw = 0.0;
        self.prev_pitch = 0.0;
    }

    /// Advance one step. `dt` outside (0, 0.1] leaves the state untouched
    /// and returns the previous output.
    pub fn update(&mut self, dt: f32, head: &HeadState) -> SwayOutput {
        if !dt.is_finite() {
            log::warn!("sway step rejected: dt={dt}");
            return self.output();
        }
        if dt <= 0.0 || dt > MAX_DT {
            // Tab switch or paused driver; integrating would fling the
            // pendulum to the clamp.
            return self.output();
        }

        self.time += dt;

        let c = &self.config;
        let yaw_vel = if head.yaw_velocity != 0.0 {
            head.yaw_velocity
        } else {
            (head.yaw - self.prev_yaw) / dt
        };
        let pitch_vel = if head.pitch_velocity != 0.0 {
            head.pitch_velocity
        } else {
            (head.pitch - self.prev_pitch) / dt
        };
        self.prev_yaw = head.yaw;
        self.prev_pitch = head.pitch;

        let spring_fx = -c.stiffness * self.state.x;
        let spring_fz = -c.stiffness * self.state.z;

        let damp_fx = -c.damping * self.state.vx;
        let damp_fz = -c.damping * self.state.vz;

        // Pitch tilts the rest direction; only the fore-aft axis feels it.
        let gravity_fz = c.gravity * head.pitch.sin() * 0.1;

        // Hair lags behind head rotation.
        let inertia_fx = -yaw_vel * c.head_influence * c.mass * 2.0;
        let inertia_fz = -pitch_vel * c.head_influence * c.mass * 2.0;

        let (wind_fx, wind_fz) = self.wind_force();

        let ax = (spring_fx + damp_fx + inertia_fx + wind_fx) / c.mass;
        let az = (spring_fz + damp_fz + gravity_fz + inertia_fz + wind_fz) / c.mass;

        self.state.vx = (self.state.vx + ax * dt).clamp(-MAX_VELOCITY, MAX_VELOCITY);
        self.state.vz = (self.state.vz + az * dt).clamp(-MAX_VELOCITY, MAX_VELOCITY);

        self.state.x = (self.state.x + self.state.vx * dt).clamp(-1.0, 1.0);
        self.state.z = (self.state.z + self.state.vz * dt).clamp(-1.0, 1.0);

        self.output()
    }

    fn wind_force(&self) -> (f32, f32) {
        let c = &self.config;
        if !c.wind_enabled || c.wind_strength <= 0.0 {
            return (0.0, 0.0);
        }

        let oscillation = (self.time * c.wind_frequency * std::f32::consts::TAU).sin();
        // Turbulence runs at an unrelated frequency, perpendicular to the
        // wind direction.
        let turbulence = (self.time * c.wind_frequency * 3.7).sin() * c.wind_turbulence;

        let base = c.wind_strength * (0.5 + 0.5 * oscillation);
        (
            base * c.wind_direction_x + turbulence * -c.wind_direction_z,
            base * c.wind_direction_z + turbulence * c.wind_direction_x,
        )
    }

    /// Map the pendulum position to the six morph channels.
    pub fn output(&self) -> SwayOutput {
        let SwayState { x, z, .. } = self.state;
        let left = (-x).max(0.0);
        let right = x.max(0.0);
        let front = z.max(0.0);
        SwayOutput {
            left_hair_left: left,
            left_hair_right: right,
            left_hair_front: front,
            right_hair_left: left,
            right_hair_right: right,
            right_hair_front: front,
        }
    }
}
