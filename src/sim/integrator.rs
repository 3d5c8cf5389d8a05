use nalgebra::UnitQuaternion;

use crate::dynamics;
use crate::dynamics::state::{KinematicsState, Twist};
use crate::math::Pose;
use crate::physics::EnvironmentState;
use crate::vehicle::MultiRotorParams;

// ---------------------------------------------------------------------------
// 6DOF RK4 integrator with constant rotor signals over the step
// ---------------------------------------------------------------------------

/// Single RK4 step with constant rotor signals and environment over the step.
pub fn rk4_step(
    state: &KinematicsState,
    params: &MultiRotorParams,
    env: &EnvironmentState,
    signals: &[f64],
    dt: f64,
) -> KinematicsState {
    let k1 = dynamics::derivatives(state, params, env, signals);
    let k2 = dynamics::derivatives(&state.apply(&k1, dt * 0.5), params, env, signals);
    let k3 = dynamics::derivatives(&state.apply(&k2, dt * 0.5), params, env, signals);
    let k4 = dynamics::derivatives(&state.apply(&k3, dt), params, env, signals);

    let new_quat_raw = state.pose.orientation.quaternion()
        + (k1.dquat + k2.dquat * 2.0 + k3.dquat * 2.0 + k4.dquat) * (dt / 6.0);

    let dvel = (k1.dvel + 2.0 * k2.dvel + 2.0 * k3.dvel + k4.dvel) / 6.0;
    let domega = (k1.domega + 2.0 * k2.domega + 2.0 * k3.domega + k4.domega) / 6.0;

    KinematicsState {
        time: state.time + dt,
        pose: Pose::new(
            state.pose.position + (k1.dpos + 2.0 * k2.dpos + 2.0 * k3.dpos + k4.dpos) * (dt / 6.0),
            UnitQuaternion::new_normalize(new_quat_raw),
        ),
        twist: Twist {
            linear: state.twist.linear + dvel * dt,
            angular: state.twist.angular + domega * dt,
        },
        accelerations: Twist {
            linear: dvel,
            angular: domega,
        },
    }
}

/// Keep the vehicle on or above the ground plane (`ground_z`, NED).
///
/// A vehicle at or below the plane that is not climbing comes to rest on it.
/// Returns true when the clamp was applied.
pub fn clamp_to_ground(state: &mut KinematicsState, ground_z: f64) -> bool {
    if state.pose.position.z < ground_z || state.twist.linear.z < 0.0 {
        return false;
    }
    state.pose.position.z = ground_z;
    state.twist = Twist::zero();
    state.accelerations = Twist::zero();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Environment, GeoPoint};
    use crate::vehicle::presets;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    fn env() -> EnvironmentState {
        *Environment::new(EnvironmentState::new(
            Vector3::zeros(),
            GeoPoint::new(0.0, 0.0, 0.0),
            0.0,
        ))
        .state()
    }

    #[test]
    fn free_fall_matches_kinematics() {
        let p = presets::quad_x();
        let e = env();
        let mut s = KinematicsState::at_rest(Vector3::new(0.0, 0.0, -100.0));
        let dt = 0.01;
        for _ in 0..100 {
            s = rk4_step(&s, &p, &e, &[], dt);
        }
        // drag only slows the fall, and only a little at these speeds
        let ballistic = 0.5 * e.gravity.z * 1.0;
        let fallen = s.pose.position.z + 100.0;
        assert!(fallen < ballistic);
        assert!((ballistic - fallen) / ballistic < 0.1, "fell {} vs {}", fallen, ballistic);
        assert_abs_diff_eq!(s.time, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn quaternion_stays_unit_while_spinning() {
        let p = presets::quad_x();
        let e = env();
        let mut s = KinematicsState::at_rest(Vector3::new(0.0, 0.0, -10.0));
        s.twist.angular = Vector3::new(0.3, -0.2, 1.5);
        for _ in 0..500 {
            s = rk4_step(&s, &p, &e, &[p.hover_signal(); 4], 0.003);
            let norm = s.pose.orientation.quaternion().norm();
            assert!((norm - 1.0).abs() < 1e-9, "Quaternion norm drifted to {}", norm);
        }
    }

    #[test]
    fn ground_clamp_stops_descent() {
        let mut s = KinematicsState::at_rest(Vector3::new(1.0, 2.0, 0.05));
        s.twist.linear = Vector3::new(0.5, 0.0, 2.0);
        assert!(clamp_to_ground(&mut s, 0.0));
        assert_eq!(s.pose.position.z, 0.0);
        assert_eq!(s.twist.linear, Vector3::zeros());
        assert_eq!(s.pose.position.x, 1.0);
    }

    #[test]
    fn ground_clamp_lets_climb_through() {
        let mut s = KinematicsState::at_rest(Vector3::zeros());
        s.twist.linear.z = -1.0;
        assert!(!clamp_to_ground(&mut s, 0.0));
        let mut airborne = KinematicsState::at_rest(Vector3::new(0.0, 0.0, -3.0));
        assert!(!clamp_to_ground(&mut airborne, 0.0));
    }
}
