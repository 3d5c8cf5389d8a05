use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::cancelable::Cancelable;
use super::error::ControllerError;
use super::rc::RcData;
use super::vehicle::VehicleController;
use crate::physics::GeoPoint;

pub const COMMAND_PERIOD: f64 = 1.0 / 50.0;     // s
pub const TAKEOFF_Z: f64 = -3.0;                // m NED, clear of rotor wash
pub const DISTANCE_ACCURACY: f64 = 0.5;         // m

/// Yaw target for velocity/position commands: an absolute heading (deg) or a
/// rate (deg/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YawMode {
    pub is_rate: bool,
    pub yaw_or_rate: f64,
}

impl Default for YawMode {
    fn default() -> Self {
        Self { is_rate: true, yaw_or_rate: 0.0 }
    }
}

impl YawMode {
    pub fn angle(yaw_deg: f64) -> Self {
        Self { is_rate: false, yaw_or_rate: yaw_deg }
    }

    pub fn rate(deg_per_s: f64) -> Self {
        Self { is_rate: true, yaw_or_rate: deg_per_s }
    }
}

/// Limits consumed by the higher-level safety logic (braking, obstacle margin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyParams {
    pub vel_to_breaking_dist: f64,   // s
    pub min_breaking_dist: f64,      // m
    pub max_breaking_dist: f64,      // m
    pub breaking_vel: f64,           // m/s
    pub distance_accuracy: f64,      // m
    pub obs_clearance: f64,          // m
    pub obs_avoidance_vel: f64,      // m/s
}

impl Default for SafetyParams {
    fn default() -> Self {
        Self {
            vel_to_breaking_dist: 0.5,
            min_breaking_dist: 1.0,
            max_breaking_dist: 3.0,
            breaking_vel: 1.0,
            distance_accuracy: 0.1,
            obs_clearance: 2.0,
            obs_avoidance_vel: 0.5,
        }
    }
}

impl SafetyParams {
    /// Distance needed to stop from `speed`, within the configured bounds.
    pub fn breaking_distance(&self, speed: f64) -> f64 {
        (speed.abs() * self.vel_to_breaking_dist)
            .clamp(self.min_breaking_dist, self.max_breaking_dist)
    }
}

/// Multirotor command surface on top of [`VehicleController`].
///
/// Long-running actions take a cancellation handle, poll it at every
/// iteration boundary and return `Err(Canceled)` once it fires.
pub trait DroneController: VehicleController {
    // --- kinematic queries (latest tick) ---
    //
    // Copies taken at the last successful `update`. They stay fixed between
    // ticks and are NaN before the first one.

    /// NED position (m) as of the last tick.
    fn position(&self) -> Vector3<f64>;
    /// NED linear velocity (m/s) as of the last tick.
    fn velocity(&self) -> Vector3<f64>;
    /// Body-to-world attitude as of the last tick.
    fn orientation(&self) -> UnitQuaternion<f64>;

    // --- remote control ---
    fn remote_control_id(&self) -> i32;
    fn rc_data(&self) -> RcData;
    /// Ignored while `rc.is_connected` is false.
    fn set_rc_data(&mut self, rc: &RcData);

    // --- actions ---
    fn arm_disarm(&mut self, arm: bool, cancel: &dyn Cancelable) -> Result<(), ControllerError>;
    fn takeoff(
        &mut self,
        max_wait_seconds: f64,
        cancel: &dyn Cancelable,
    ) -> Result<(), ControllerError>;
    fn land(&mut self, cancel: &dyn Cancelable) -> Result<(), ControllerError>;
    fn go_home(&mut self, cancel: &dyn Cancelable) -> Result<(), ControllerError>;
    fn hover(&mut self, cancel: &dyn Cancelable) -> Result<(), ControllerError>;

    // --- setpoints ---
    fn command_roll_pitch_z(
        &mut self,
        pitch: f64,
        roll: f64,
        z: f64,
        yaw: f64,
    ) -> Result<(), ControllerError>;
    fn command_velocity(
        &mut self,
        vx: f64,
        vy: f64,
        vz: f64,
        yaw_mode: &YawMode,
    ) -> Result<(), ControllerError>;
    fn command_velocity_z(
        &mut self,
        vx: f64,
        vy: f64,
        z: f64,
        yaw_mode: &YawMode,
    ) -> Result<(), ControllerError>;
    fn command_position(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        yaw_mode: &YawMode,
    ) -> Result<(), ControllerError>;

    // --- geodetic ---
    /// `None` until the first tick has been seen.
    fn home_point(&self) -> Option<GeoPoint>;
    fn gps_location(&self) -> Option<GeoPoint>;

    fn report_telemetry(&mut self, render_time: f64);

    fn command_period(&self) -> f64 {
        COMMAND_PERIOD
    }

    fn takeoff_z(&self) -> f64 {
        TAKEOFF_Z
    }

    fn distance_accuracy(&self) -> f64 {
        DISTANCE_ACCURACY
    }

    fn safety_params(&self) -> SafetyParams {
        SafetyParams::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn breaking_distance_is_bounded() {
        let p = SafetyParams::default();
        assert_abs_diff_eq!(p.breaking_distance(0.0), 1.0);
        assert_abs_diff_eq!(p.breaking_distance(4.0), 2.0);
        assert_abs_diff_eq!(p.breaking_distance(-50.0), 3.0);
    }

    #[test]
    fn yaw_mode_constructors() {
        assert!(YawMode::default().is_rate);
        assert_eq!(YawMode::angle(90.0), YawMode { is_rate: false, yaw_or_rate: 90.0 });
        assert!(YawMode::rate(10.0).is_rate);
    }

    #[test]
    fn safety_params_partial_json() {
        let p: SafetyParams = serde_json::from_str(r#"{ "obs_clearance": 5.0 }"#).unwrap();
        assert_abs_diff_eq!(p.obs_clearance, 5.0);
        assert_abs_diff_eq!(p.max_breaking_dist, 3.0);
    }
}
