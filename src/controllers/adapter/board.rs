use log::debug;
use nalgebra::Vector3;

use crate::controllers::error::ControllerError;
use crate::controllers::rc::{CHANNEL_COUNT, PWM_CENTER, PWM_MIN, CH_THROTTLE};

/// One inertial sample in the body frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImuSample {
    pub time: f64,
    pub specific_force: Vector3<f64>,    // m/s^2, what an accelerometer reads
    pub angular_velocity: Vector3<f64>,  // rad/s
}

/// Simulated flight-controller board: RC input channels, motor outputs,
/// the latest IMU sample and the arm flag.
#[derive(Debug, Clone)]
pub struct SimBoard {
    input_channels: [u16; CHANNEL_COUNT],
    motor_outputs: Vec<f64>,
    imu: ImuSample,
    imu_fresh: bool,
    pub armed: bool,
}

impl SimBoard {
    pub fn new(motor_count: usize) -> Self {
        Self {
            input_channels: neutral_channels(),
            motor_outputs: vec![0.0; motor_count],
            imu: ImuSample::default(),
            imu_fresh: false,
            armed: false,
        }
    }

    pub fn set_input_channel(&mut self, channel: usize, pwm: u16) {
        if let Some(c) = self.input_channels.get_mut(channel) {
            *c = pwm;
        }
    }

    pub fn read_input_channel(&self, channel: usize) -> u16 {
        self.input_channels.get(channel).copied().unwrap_or(PWM_MIN)
    }

    pub fn input_channels(&self) -> &[u16; CHANNEL_COUNT] {
        &self.input_channels
    }

    pub fn motor_count(&self) -> usize {
        self.motor_outputs.len()
    }

    pub fn write_motor(&mut self, index: usize, signal: f64) -> Result<(), ControllerError> {
        let count = self.motor_outputs.len();
        let slot = self
            .motor_outputs
            .get_mut(index)
            .ok_or(ControllerError::ActuatorIndexOutOfRange { index, count })?;
        *slot = signal.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn motor_control_signal(&self, index: usize) -> Result<f64, ControllerError> {
        self.motor_outputs
            .get(index)
            .copied()
            .ok_or(ControllerError::ActuatorIndexOutOfRange {
                index,
                count: self.motor_outputs.len(),
            })
    }

    pub fn stop_motors(&mut self) {
        self.motor_outputs.iter_mut().for_each(|m| *m = 0.0);
    }

    pub fn notify_imu(&mut self, sample: ImuSample) {
        self.imu = sample;
        self.imu_fresh = true;
    }

    /// Latest IMU sample, if one arrived since the last read.
    pub fn take_imu(&mut self) -> Option<ImuSample> {
        if self.imu_fresh {
            self.imu_fresh = false;
            Some(self.imu)
        } else {
            None
        }
    }

    /// Power-cycle: disarm, stop motors, center sticks, throttle down.
    pub fn system_reset(&mut self) {
        debug!("board: system reset");
        self.input_channels = neutral_channels();
        self.stop_motors();
        self.imu = ImuSample::default();
        self.imu_fresh = false;
        self.armed = false;
    }
}

fn neutral_channels() -> [u16; CHANNEL_COUNT] {
    let mut ch = [PWM_MIN; CHANNEL_COUNT];
    ch[..4].fill(PWM_CENTER);
    ch[CH_THROTTLE] = PWM_MIN;
    ch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::rc::{CH_PITCH, CH_ROLL};

    #[test]
    fn starts_neutral() {
        let b = SimBoard::new(4);
        assert_eq!(b.read_input_channel(CH_ROLL), PWM_CENTER);
        assert_eq!(b.read_input_channel(CH_PITCH), PWM_CENTER);
        assert_eq!(b.read_input_channel(CH_THROTTLE), PWM_MIN);
        assert_eq!(b.read_input_channel(99), PWM_MIN);
        assert!(!b.armed);
    }

    #[test]
    fn motor_writes_are_clamped_and_checked() {
        let mut b = SimBoard::new(4);
        b.write_motor(2, 1.7).unwrap();
        assert_eq!(b.motor_control_signal(2), Ok(1.0));
        assert_eq!(
            b.write_motor(4, 0.5),
            Err(ControllerError::ActuatorIndexOutOfRange { index: 4, count: 4 })
        );
    }

    #[test]
    fn imu_is_consumed_once() {
        let mut b = SimBoard::new(4);
        assert!(b.take_imu().is_none());
        b.notify_imu(ImuSample { time: 1.0, ..Default::default() });
        assert_eq!(b.take_imu().map(|s| s.time), Some(1.0));
        assert!(b.take_imu().is_none());
    }

    #[test]
    fn reset_disarms_and_stops() {
        let mut b = SimBoard::new(4);
        b.armed = true;
        b.write_motor(0, 0.6).unwrap();
        b.set_input_channel(CH_THROTTLE, 1800);
        b.system_reset();
        assert!(!b.armed);
        assert_eq!(b.motor_control_signal(0), Ok(0.0));
        assert_eq!(b.read_input_channel(CH_THROTTLE), PWM_MIN);
    }
}
