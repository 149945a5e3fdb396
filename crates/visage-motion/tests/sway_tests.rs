use approx::assert_abs_diff_eq;
use visage_motion::{HeadState, SwayConfig, SwayPendulum, SwayState};

fn still_head() -> HeadState {
    HeadState::default()
}

#[test]
fn settles_to_rest_with_no_input() {
    let mut sim = SwayPendulum::default();

    // Kick it, then let it ring down.
    sim.update(
        0.016,
        &HeadState {
            yaw_velocity: 5.0,
            ..HeadState::default()
        },
    );
    for _ in 0..5000 {
        sim.update(0.016, &still_head());
    }

    let s = sim.state();
    assert_abs_diff_eq!(s.x, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(s.z, 0.0, epsilon = 1e-3);
}

#[test]
fn oversized_dt_leaves_state_unchanged() {
    let mut sim = SwayPendulum::default();
    sim.update(
        0.016,
        &HeadState {
            yaw_velocity: 3.0,
            ..HeadState::default()
        },
    );
    let before = sim.state();

    let out = sim.update(0.2, &still_head());
    assert_eq!(sim.state(), before);
    assert_eq!(out, sim.output());

    sim.update(0.0, &still_head());
    sim.update(-1.0, &still_head());
    sim.update(f32::NAN, &still_head());
    assert_eq!(sim.state(), before);
}

#[test]
fn yaw_velocity_swings_laterally_against_rotation() {
    let mut sim = SwayPendulum::default();
    let out = sim.update(
        0.016,
        &HeadState {
            yaw_velocity: 4.0,
            ..HeadState::default()
        },
    );

    // Positive yaw velocity drags hair the other way.
    assert!(sim.state().x < 0.0);
    assert!(out.left_hair_left > 0.0);
    assert_eq!(out.left_hair_right, 0.0);
    // Sides mirror.
    assert_eq!(out.left_hair_left, out.right_hair_left);
}

#[test]
fn forward_pitch_pushes_front_morphs() {
    let mut sim = SwayPendulum::default();
    let mut out = sim.output();
    // Long enough for the derived-velocity transient of the first step to
    // ring down; the pitch-gravity equilibrium is forward of rest.
    for _ in 0..300 {
        out = sim.update(
            0.016,
            &HeadState {
                pitch: 0.5,
                ..HeadState::default()
            },
        );
    }
    assert!(sim.state().z > 0.0);
    assert!(out.left_hair_front > 0.0);
    assert_eq!(out.left_hair_front, out.right_hair_front);
}

#[test]
fn velocity_is_derived_from_orientation_deltas() {
    let mut sim = SwayPendulum::default();
    sim.update(0.016, &HeadState::default());
    // Sudden yaw jump with no explicit velocity: derived velocity kicks the
    // pendulum.
    sim.update(
        0.016,
        &HeadState {
            yaw: 0.3,
            ..HeadState::default()
        },
    );
    assert!(sim.state().x != 0.0);
}

#[test]
fn position_stays_clamped_under_extreme_input() {
    let mut sim = SwayPendulum::default();
    for _ in 0..200 {
        sim.update(
            0.1,
            &HeadState {
                yaw_velocity: 1000.0,
                ..HeadState::default()
            },
        );
    }
    let s = sim.state();
    assert!((-1.0..=1.0).contains(&s.x));
    assert!((-10.0..=10.0).contains(&s.vx));

    let out = sim.output();
    for (_, v) in out.channels() {
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn wind_displaces_along_its_direction() {
    let mut sim = SwayPendulum::new(SwayConfig {
        wind_enabled: true,
        wind_strength: 5.0,
        wind_direction_x: 1.0,
        wind_direction_z: 0.0,
        wind_turbulence: 0.0,
        ..SwayConfig::default()
    });

    let mut max_x = 0.0f32;
    for _ in 0..100 {
        sim.update(0.016, &still_head());
        max_x = max_x.max(sim.state().x);
    }
    assert!(max_x > 0.0);
}

#[test]
fn reset_returns_to_rest() {
    let mut sim = SwayPendulum::default();
    sim.update(
        0.016,
        &HeadState {
            yaw_velocity: 5.0,
            ..HeadState::default()
        },
    );
    assert_ne!(sim.state(), SwayState::default());

    sim.reset();
    assert_eq!(sim.state(), SwayState::default());
    assert_eq!(sim.output().channels().map(|(_, v)| v), [0.0; 6]);
}
