use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::math::Pose;

// ---------------------------------------------------------------------------
// Kinematics: pose, twist and accelerations, NED world / FRD body
// ---------------------------------------------------------------------------

/// Linear and angular rates.
///
/// `linear` is expressed in the world frame, `angular` in the body frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
}

impl Twist {
    pub fn zero() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicsState {
    pub time: f64,
    pub pose: Pose<f64>,
    pub twist: Twist,              // velocity (world) + body rates
    pub accelerations: Twist,      // linear accel (world) + angular accel (body)
}

impl Default for KinematicsState {
    fn default() -> Self {
        Self::at_rest(Vector3::zeros())
    }
}

impl KinematicsState {
    /// Level and motionless at `position`.
    pub fn at_rest(position: Vector3<f64>) -> Self {
        Self {
            time: 0.0,
            pose: Pose::new(position, UnitQuaternion::identity()),
            twist: Twist::zero(),
            accelerations: Twist::zero(),
        }
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.pose.position
    }

    pub fn velocity(&self) -> &Vector3<f64> {
        &self.twist.linear
    }

    pub fn orientation(&self) -> &UnitQuaternion<f64> {
        &self.pose.orientation
    }

    /// Euler step along `d`, renormalizing the attitude.
    pub fn apply(&self, d: &Deriv, dt: f64) -> KinematicsState {
        let q_raw = self.pose.orientation.quaternion() + d.dquat * dt;
        KinematicsState {
            time: self.time + dt,
            pose: Pose::new(
                self.pose.position + d.dpos * dt,
                UnitQuaternion::new_normalize(q_raw),
            ),
            twist: Twist {
                linear: self.twist.linear + d.dvel * dt,
                angular: self.twist.angular + d.domega * dt,
            },
            accelerations: Twist {
                linear: d.dvel,
                angular: d.domega,
            },
        }
    }

    /// Height above the NED origin (positive up).
    pub fn altitude(&self) -> f64 {
        -self.pose.position.z
    }

    pub fn has_nan(&self) -> bool {
        self.pose.has_nan()
            || crate::math::has_nan(&self.twist.linear)
            || crate::math::has_nan(&self.twist.angular)
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Deriv {
    pub dpos: Vector3<f64>,
    pub dvel: Vector3<f64>,
    pub dquat: Quaternion<f64>,   // raw, not unit
    pub domega: Vector3<f64>,     // angular acceleration, body frame
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.003,        // ~333 Hz physics, AirSim-like
            max_time: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn apply_moves_and_keeps_unit_attitude() {
        let s = KinematicsState::at_rest(Vector3::new(0.0, 0.0, -1.0));
        let d = Deriv {
            dpos: Vector3::new(1.0, 0.0, 0.0),
            dvel: Vector3::new(0.0, 0.0, -2.0),
            dquat: Quaternion::new(0.0, 0.1, 0.0, 0.0),
            domega: Vector3::zeros(),
        };
        let n = s.apply(&d, 0.5);
        assert_relative_eq!(n.time, 0.5);
        assert_relative_eq!(n.pose.position.x, 0.5);
        assert_relative_eq!(n.twist.linear.z, -1.0);
        assert_relative_eq!(n.pose.orientation.quaternion().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.accelerations.linear.z, -2.0);
    }

    #[test]
    fn altitude_is_negated_down() {
        let s = KinematicsState::at_rest(Vector3::new(0.0, 0.0, -12.5));
        assert_relative_eq!(s.altitude(), 12.5);
        assert!(!s.has_nan());
    }

    #[test]
    fn config_from_partial_json() {
        let cfg: SimConfig = serde_json::from_str(r#"{ "max_time": 5.0 }"#).unwrap();
        assert_relative_eq!(cfg.max_time, 5.0);
        assert_relative_eq!(cfg.dt, SimConfig::default().dt);
    }
}
