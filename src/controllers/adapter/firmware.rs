use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::board::SimBoard;
use super::comm::CommLink;
use crate::controllers::error::ControllerError;
use crate::controllers::pid::Pid;
use crate::controllers::rc::{self, CH_PITCH, CH_ROLL, CH_THROTTLE, CH_YAW};

/// Flight stack running on a [`SimBoard`].
pub trait Firmware {
    fn name(&self) -> &str;

    /// Motor slots the firmware drives, in its own ordering.
    fn motor_count(&self) -> usize;

    fn setup(&mut self, board: &mut SimBoard, link: &mut CommLink);

    /// One control-loop iteration.
    fn run_loop(
        &mut self,
        board: &mut SimBoard,
        link: &mut CommLink,
        dt: f64,
    ) -> Result<(), ControllerError>;

    fn set_offboard(&mut self, enabled: bool, link: &mut CommLink);

    /// Clear estimator and loop state; board state is reset separately.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// Quad-X rate mixer
// ---------------------------------------------------------------------------

// Motor slots, quad-X firmware convention.
pub const MOTOR_RR: usize = 0;
pub const MOTOR_FR: usize = 1;
pub const MOTOR_FL: usize = 2;
pub const MOTOR_RL: usize = 3;
pub const QUAD_X_MOTORS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub roll_pitch: PidGains,
    pub yaw: PidGains,
    pub max_roll_pitch_rate: f64,   // rad/s at full stick
    pub max_yaw_rate: f64,          // rad/s at full stick
    pub idle_throttle: f64,         // below this the mixer stays out of the loop
    pub max_correction: f64,        // per-axis output limit
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            roll_pitch: PidGains { kp: 0.02, ki: 0.01, kd: 0.0005 },
            yaw: PidGains { kp: 0.2, ki: 0.05, kd: 0.0 },
            max_roll_pitch_rate: 3.0,
            max_yaw_rate: 2.0,
            idle_throttle: 0.05,
            max_correction: 0.25,
        }
    }
}

/// Acro-style firmware: sticks command body rates, a PID per axis tracks
/// them against the gyro, and a quad-X mixer turns throttle plus the three
/// corrections into motor signals.
#[derive(Debug, Clone)]
pub struct MixerFirmware {
    config: MixerConfig,
    roll: Pid,
    pitch: Pid,
    yaw: Pid,
    gyro: Vector3<f64>,
    offboard: bool,
    held_throttle: f64,
    was_armed: bool,
}

impl Default for MixerFirmware {
    fn default() -> Self {
        Self::new(MixerConfig::default())
    }
}

impl MixerFirmware {
    pub fn new(config: MixerConfig) -> Self {
        let limit = config.max_correction;
        let pid = move |g: PidGains| Pid::new(g.kp, g.ki, g.kd).with_limits(1.0, limit);
        Self {
            roll: pid(config.roll_pitch),
            pitch: pid(config.roll_pitch),
            yaw: pid(config.yaw),
            config,
            gyro: Vector3::zeros(),
            offboard: false,
            held_throttle: 0.0,
            was_armed: false,
        }
    }

    fn reset_loops(&mut self) {
        self.roll.reset();
        self.pitch.reset();
        self.yaw.reset();
    }

    /// Stick intent: (desired body rates, throttle).
    fn pilot_intent(&mut self, board: &SimBoard) -> (Vector3<f64>, f64) {
        let throttle = rc::pwm_to_thrust(board.read_input_channel(CH_THROTTLE));
        if self.offboard {
            return (Vector3::zeros(), self.held_throttle);
        }
        self.held_throttle = throttle;

        let roll = rc::pwm_to_angle(board.read_input_channel(CH_ROLL));
        let pitch = -rc::pwm_to_angle(board.read_input_channel(CH_PITCH));
        let yaw = rc::pwm_to_angle(board.read_input_channel(CH_YAW));
        let rates = Vector3::new(
            roll * self.config.max_roll_pitch_rate,
            pitch * self.config.max_roll_pitch_rate,
            yaw * self.config.max_yaw_rate,
        );
        (rates, throttle)
    }
}

/// Quad-X mix in firmware slot order (RR, FR, FL, RL).
pub fn mix_quad_x(throttle: f64, roll: f64, pitch: f64, yaw: f64) -> [f64; QUAD_X_MOTORS] {
    let mut out = [0.0; QUAD_X_MOTORS];
    out[MOTOR_RR] = throttle - roll - pitch - yaw;
    out[MOTOR_FR] = throttle - roll + pitch + yaw;
    out[MOTOR_FL] = throttle + roll + pitch - yaw;
    out[MOTOR_RL] = throttle + roll - pitch + yaw;
    out
}

impl Firmware for MixerFirmware {
    fn name(&self) -> &str {
        "quad-x rate mixer"
    }

    fn motor_count(&self) -> usize {
        QUAD_X_MOTORS
    }

    fn setup(&mut self, board: &mut SimBoard, link: &mut CommLink) {
        board.stop_motors();
        link.log_message(format!("{} ready, {} motors", self.name(), QUAD_X_MOTORS));
    }

    fn run_loop(
        &mut self,
        board: &mut SimBoard,
        link: &mut CommLink,
        dt: f64,
    ) -> Result<(), ControllerError> {
        if let Some(imu) = board.take_imu() {
            if crate::math::has_nan(&imu.angular_velocity) {
                return Err(ControllerError::NumericInvalid("gyro sample".into()));
            }
            self.gyro = imu.angular_velocity;
        }

        if board.armed != self.was_armed {
            link.log_message(if board.armed { "armed" } else { "disarmed" });
            self.was_armed = board.armed;
        }

        if !board.armed {
            board.stop_motors();
            self.reset_loops();
            return Ok(());
        }

        let (rates, throttle) = self.pilot_intent(board);

        let out = if throttle < self.config.idle_throttle {
            self.reset_loops();
            [throttle; QUAD_X_MOTORS]
        } else {
            let err = rates - self.gyro;
            let r = self.roll.update(err.x, dt);
            let p = self.pitch.update(err.y, dt);
            let y = self.yaw.update(err.z, dt);
            mix_quad_x(throttle, r, p, y)
        };

        for (slot, signal) in out.iter().enumerate() {
            board.write_motor(slot, *signal)?;
        }
        Ok(())
    }

    fn set_offboard(&mut self, enabled: bool, link: &mut CommLink) {
        if enabled != self.offboard {
            link.log_message(if enabled { "offboard enabled" } else { "offboard disabled" });
        }
        self.offboard = enabled;
    }

    fn reset(&mut self) {
        self.reset_loops();
        self.gyro = Vector3::zeros();
        self.held_throttle = 0.0;
        self.was_armed = false;
    }
}
