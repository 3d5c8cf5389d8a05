use nalgebra::{Quaternion, Vector3};

use crate::dynamics::state::{Deriv, KinematicsState};
use crate::math;
use crate::physics::aerodynamics;
use crate::physics::earth::SEA_LEVEL_AIR_DENSITY;
use crate::physics::EnvironmentState;
use crate::vehicle::MultiRotorParams;

// ---------------------------------------------------------------------------
// Rigid-body multirotor equations of motion
// ---------------------------------------------------------------------------

/// Net body-frame force and torque produced by the rotors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotorWrench {
    pub force: Vector3<f64>,   // N, body FRD
    pub torque: Vector3<f64>,  // N·m, body FRD
}

/// Sum the rotor contributions for the given control signals.
///
/// `signals[i]` drives `params.rotors[i]` (canonical order); missing entries
/// count as zero and signals are clamped to [0, 1].
pub fn rotor_wrench(params: &MultiRotorParams, signals: &[f64], air_density: f64) -> RotorWrench {
    let mut force = Vector3::zeros();
    let mut torque = Vector3::zeros();

    for (i, rotor) in params.rotors.iter().enumerate() {
        let signal = signals.get(i).copied().unwrap_or(0.0);
        let thrust = aerodynamics::density_scaled_thrust(
            rotor.max_thrust,
            signal,
            air_density,
            SEA_LEVEL_AIR_DENSITY,
        );
        // props push along body -z (up)
        let f = Vector3::new(0.0, 0.0, -thrust);
        force += f;
        torque += rotor.position.cross(&f);
        torque.z += rotor.spin.yaw_torque_sign() * rotor.torque_coefficient * thrust;
    }

    RotorWrench { force, torque }
}

/// Compute full 6DOF state derivatives.
///
/// Forces & moments:
///   1. Gravity from the environment snapshot (NED)
///   2. Rotor thrust, scaled by air density, along body -z
///   3. Rotor arm moments and spin reaction torque
///   4. Quadratic drag on world velocity
///   5. Rotational damping on body rates
pub fn derivatives(
    state: &KinematicsState,
    params: &MultiRotorParams,
    env: &EnvironmentState,
    signals: &[f64],
) -> Deriv {
    let q = state.pose.orientation.quaternion();
    let omega = state.twist.angular;

    let wrench = rotor_wrench(params, signals, env.air_density);

    // --- Translational ---
    let thrust_world = math::transform_to_world_frame(&wrench.force, q, true);
    let drag_world = aerodynamics::drag_force(&state.twist.linear, env.air_density, params.cd_area);
    let accel = env.gravity + (thrust_world + drag_world) / params.mass;

    // --- Rotational ---
    let torque_body = wrench.torque
        + aerodynamics::damping_moment(&omega, env.air_density, params.angular_damping);

    // Euler's equation: I * domega = torque - omega × (I * omega)
    let i_vec = params.inertia;
    let i_omega = i_vec.component_mul(&omega);
    let domega = (torque_body - omega.cross(&i_omega)).component_div(&i_vec);

    // Quaternion kinematics: dq/dt = 0.5 * q * omega_quat
    let omega_quat = Quaternion::from_imag(omega);
    let dquat = q * omega_quat * 0.5;

    Deriv {
        dpos: state.twist.linear,
        dvel: accel,
        dquat,
        domega,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
