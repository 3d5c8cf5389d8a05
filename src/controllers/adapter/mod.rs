//! Simulation-only drone controller backed by a firmware running on a
//! simulated board.
//!
//! Per tick the adapter turns kinematics into an IMU sample, hands it to the
//! board and runs one firmware loop. Rotor signals are read back from the
//! board and remapped from canonical vertex order to firmware slot order.

pub mod board;
pub mod comm;
pub mod firmware;

use log::{info, trace, warn};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::controllers::cancelable::Cancelable;
use crate::controllers::drone::{DroneController, YawMode};
use crate::controllers::error::ControllerError;
use crate::controllers::rc::{self, RcData};
use crate::controllers::vehicle::{Lifecycle, Tick, VehicleController};
use crate::dynamics::KinematicsState;
use crate::math;
use crate::physics::{EnvironmentState, GeoPoint};
use crate::vehicle::MultiRotorParams;

pub use board::{ImuSample, SimBoard};
pub use comm::CommLink;
pub use firmware::{Firmware, MixerConfig, MixerFirmware, PidGains};

/// Canonical vertex (CCW from front-right) to quad-X firmware slot.
const VERTEX_TO_FIRMWARE: [usize; 4] = [
    firmware::MOTOR_FR,
    firmware::MOTOR_FL,
    firmware::MOTOR_RL,
    firmware::MOTOR_RR,
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub remote_control_id: i32,
}

/// Latest per-tick snapshot the query methods answer from.
#[derive(Debug, Clone, Copy)]
struct TickSnapshot {
    kinematics: KinematicsState,
    home: GeoPoint,
    environment: EnvironmentState,
}

pub struct SimulationAdapter {
    config: AdapterConfig,
    rotor_count: usize,
    board: SimBoard,
    comm_link: CommLink,
    firmware: Box<dyn Firmware>,
    lifecycle: Lifecycle,
    offboard: bool,
    rc: RcData,
    last: Option<TickSnapshot>,
}

impl SimulationAdapter {
    pub fn new(params: &MultiRotorParams, config: AdapterConfig) -> Self {
        Self::with_firmware(params, config, Box::new(MixerFirmware::default()))
    }

    pub fn with_firmware(
        params: &MultiRotorParams,
        config: AdapterConfig,
        mut firmware: Box<dyn Firmware>,
    ) -> Self {
        let mut board = SimBoard::new(firmware.motor_count());
        let mut comm_link = CommLink::new();
        firmware.setup(&mut board, &mut comm_link);
        if params.rotor_count() > firmware.motor_count() {
            warn!(
                "{}: vehicle has {} rotors, firmware drives {}",
                params.name,
                params.rotor_count(),
                firmware.motor_count()
            );
        }
        info!(
            "adapter: {} on '{}', rc id {}",
            firmware.name(),
            params.name,
            config.remote_control_id
        );
        Self {
            config,
            rotor_count: params.rotor_count(),
            board,
            comm_link,
            firmware,
            lifecycle: Lifecycle::Constructed,
            offboard: false,
            rc: RcData::default(),
            last: None,
        }
    }

    pub fn board(&self) -> &SimBoard {
        &self.board
    }

    pub fn is_armed(&self) -> bool {
        self.board.armed
    }

    /// Accelerometer/gyro reading implied by the kinematics and local gravity.
    fn imu_sample(kinematics: &KinematicsState, env: &EnvironmentState) -> ImuSample {
        let q = kinematics.pose.orientation.quaternion();
        let specific_force_world = kinematics.accelerations.linear - env.gravity;
        ImuSample {
            time: kinematics.time,
            specific_force: math::transform_to_body_frame(&specific_force_world, q, true),
            angular_velocity: kinematics.twist.angular,
        }
    }

    fn action_preamble(
        &self,
        action: &str,
        cancel: &dyn Cancelable,
    ) -> Result<(), ControllerError> {
        cancel.check()?;
        if !self.lifecycle.accepts_updates() {
            return Err(ControllerError::InvalidLifecycle {
                operation: "action",
                state: self.lifecycle,
            });
        }
        trace!("adapter: {}", action);
        Ok(())
    }
}

impl VehicleController for SimulationAdapter {
    fn name(&self) -> &str {
        "simulation-adapter"
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn start(&mut self) -> Result<(), ControllerError> {
        if !self.lifecycle.accepts_updates() {
            info!("adapter: {:?} -> Started", self.lifecycle);
            self.lifecycle = Lifecycle::Started;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.lifecycle != Lifecycle::Stopped {
            info!("adapter: {:?} -> Stopped", self.lifecycle);
        }
        self.board.stop_motors();
        self.lifecycle = Lifecycle::Stopped;
    }

    fn reset(&mut self) {
        self.board.system_reset();
        self.firmware.reset();
        self.rc = RcData::default();
        self.last = None;
        if self.lifecycle == Lifecycle::Running {
            self.lifecycle = Lifecycle::Started;
        }
    }

    fn update(&mut self, tick: &Tick<'_>) -> Result<(), ControllerError> {
        if !self.lifecycle.accepts_updates() {
            return Err(ControllerError::InvalidLifecycle {
                operation: "update",
                state: self.lifecycle,
            });
        }
        if tick.kinematics.has_nan() {
            return Err(ControllerError::NumericInvalid(format!(
                "kinematics at t={:.3}",
                tick.kinematics.time
            )));
        }

        let env = *tick.environment.state();
        let home = tick.environment.initial_state().geo_point;
        self.last = Some(TickSnapshot { kinematics: *tick.kinematics, home, environment: env });

        self.board.notify_imu(Self::imu_sample(tick.kinematics, &env));
        self.firmware.run_loop(&mut self.board, &mut self.comm_link, tick.dt)?;
        self.lifecycle = Lifecycle::Running;
        Ok(())
    }

    fn vertex_count(&self) -> usize {
        self.rotor_count
    }

    fn vertex_control_signal(&self, index: usize) -> Result<f64, ControllerError> {
        let count = self.rotor_count.min(VERTEX_TO_FIRMWARE.len());
        if index >= count {
            return Err(ControllerError::ActuatorIndexOutOfRange { index, count });
        }
        self.board.motor_control_signal(VERTEX_TO_FIRMWARE[index])
    }

    fn status_messages(&mut self) -> Vec<String> {
        self.comm_link.drain_messages()
    }

    fn is_offboard_mode(&self) -> bool {
        self.offboard
    }

    fn is_simulation_mode(&self) -> bool {
        true
    }

    fn set_offboard_mode(&mut self, is_set: bool) -> Result<(), ControllerError> {
        self.firmware.set_offboard(is_set, &mut self.comm_link);
        self.offboard = is_set;
        Ok(())
    }

    fn set_simulation_mode(&mut self, is_set: bool) -> Result<(), ControllerError> {
        if !is_set {
            warn!("adapter: refusing to leave simulation mode");
            return Err(ControllerError::InvalidModeTransition(
                "simulation adapter cannot leave simulation mode".into(),
            ));
        }
        Ok(())
    }
}

impl DroneController for SimulationAdapter {
    fn position(&self) -> Vector3<f64> {
        self.last.map_or_else(math::nan_vector, |s| s.kinematics.pose.position)
    }

    fn velocity(&self) -> Vector3<f64> {
        self.last.map_or_else(math::nan_vector, |s| s.kinematics.twist.linear)
    }

    fn orientation(&self) -> UnitQuaternion<f64> {
        self.last.map_or_else(
            || UnitQuaternion::new_unchecked(math::nan_quaternion()),
            |s| s.kinematics.pose.orientation,
        )
    }

    fn remote_control_id(&self) -> i32 {
        self.config.remote_control_id
    }

    fn rc_data(&self) -> RcData {
        self.rc
    }

    fn set_rc_data(&mut self, rc_data: &RcData) {
        if !rc_data.is_connected {
            return;
        }
        for (channel, pwm) in rc::encode_channels(rc_data).iter().enumerate() {
            self.board.set_input_channel(channel, *pwm);
        }
        self.rc = *rc_data;
    }

    fn arm_disarm(&mut self, arm: bool, cancel: &dyn Cancelable) -> Result<(), ControllerError> {
        self.action_preamble(if arm { "arm" } else { "disarm" }, cancel)?;
        self.board.armed = arm;
        if !arm {
            self.board.stop_motors();
        }
        Ok(())
    }

    fn takeoff(
        &mut self,
        max_wait_seconds: f64,
        cancel: &dyn Cancelable,
    ) -> Result<(), ControllerError> {
        self.action_preamble("takeoff", cancel)?;
        if !self.board.armed {
            return Err(ControllerError::MoveFailed("takeoff requires an armed vehicle".into()));
        }
        let msg = format!(
            "takeoff to z={:.1} within {:.1}s",
            self.takeoff_z(),
            max_wait_seconds
        );
        self.comm_link.log_message(msg);
        Ok(())
    }

    fn land(&mut self, cancel: &dyn Cancelable) -> Result<(), ControllerError> {
        self.action_preamble("land", cancel)?;
        self.comm_link.log_message("land");
        Ok(())
    }

    fn go_home(&mut self, cancel: &dyn Cancelable) -> Result<(), ControllerError> {
        self.action_preamble("go home", cancel)?;
        self.comm_link.log_message("go home");
        Ok(())
    }

    fn hover(&mut self, cancel: &dyn Cancelable) -> Result<(), ControllerError> {
        self.action_preamble("hover", cancel)?;
        self.comm_link.log_message("hover");
        Ok(())
    }

    fn command_roll_pitch_z(
        &mut self,
        _pitch: f64,
        _roll: f64,
        _z: f64,
        _yaw: f64,
    ) -> Result<(), ControllerError> {
        Err(ControllerError::NotImplemented("command_roll_pitch_z".into()))
    }

    fn command_velocity(
        &mut self,
        _vx: f64,
        _vy: f64,
        _vz: f64,
        _yaw_mode: &YawMode,
    ) -> Result<(), ControllerError> {
        Err(ControllerError::NotImplemented("command_velocity".into()))
    }

    fn command_velocity_z(
        &mut self,
        _vx: f64,
        _vy: f64,
        _z: f64,
        _yaw_mode: &YawMode,
    ) -> Result<(), ControllerError> {
        Err(ControllerError::NotImplemented("command_velocity_z".into()))
    }

    fn command_position(
        &mut self,
        _x: f64,
        _y: f64,
        _z: f64,
        _yaw_mode: &YawMode,
    ) -> Result<(), ControllerError> {
        Err(ControllerError::NotImplemented("command_position".into()))
    }

    fn home_point(&self) -> Option<GeoPoint> {
        self.last.map(|s| s.home)
    }

    fn gps_location(&self) -> Option<GeoPoint> {
        self.last.map(|s| s.environment.geo_point)
    }

    fn report_telemetry(&mut self, render_time: f64) {
        let msg = match &self.last {
            Some(s) => format!(
                "t={:.2}s alt={:.2}m render={:.1}ms",
                s.kinematics.time,
                s.kinematics.altitude(),
                render_time * 1000.0
            ),
            None => format!("no tick yet, render={:.1}ms", render_time * 1000.0),
        };
        self.comm_link.log_message(msg);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
