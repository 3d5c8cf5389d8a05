use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Remote-control intent and its PWM channel encoding
// ---------------------------------------------------------------------------

pub const PWM_MIN: u16 = 1000;
pub const PWM_CENTER: u16 = 1500;
pub const PWM_MAX: u16 = 2000;

pub const SWITCH_COUNT: usize = 8;
/// Roll, yaw, throttle, pitch, then the switches.
pub const CHANNEL_COUNT: usize = 4 + SWITCH_COUNT;

pub const CH_ROLL: usize = 0;
pub const CH_YAW: usize = 1;
pub const CH_THROTTLE: usize = 2;
pub const CH_PITCH: usize = 3;
pub const CH_SWITCH0: usize = 4;

/// Pilot stick and switch state. Axes are normalized: roll/pitch/yaw in
/// [-1, 1], throttle in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RcData {
    pub timestamp: u64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub throttle: f64,
    pub switches: [u32; SWITCH_COUNT],
    pub is_connected: bool,
}

impl RcData {
    /// Connected, sticks centered, throttle down.
    pub fn centered() -> Self {
        Self { is_connected: true, ..Default::default() }
    }
}

/// Centered stick axis in [-1, 1] to [1000, 2000].
pub fn angle_to_pwm(angle: f64) -> u16 {
    let a = if angle.is_nan() { 0.0 } else { angle.clamp(-1.0, 1.0) };
    (a * 500.0 + f64::from(PWM_CENTER)) as u16
}

/// Throttle in [0, 1] to [1000, 2000]; negative throttle reads as zero.
pub fn thrust_to_pwm(thrust: f64) -> u16 {
    let t = if thrust.is_nan() { 0.0 } else { thrust.clamp(0.0, 1.0) };
    (t * 1000.0 + f64::from(PWM_MIN)) as u16
}

/// Discrete switch position `0..=max` spread linearly over [1000, 2000].
pub fn switch_to_pwm(value: u32, max_value: u32) -> u16 {
    let max = max_value.max(1);
    let v = value.min(max);
    (1000.0 * f64::from(v) / f64::from(max) + f64::from(PWM_MIN)) as u16
}

/// Inverse of [`angle_to_pwm`].
pub fn pwm_to_angle(pwm: u16) -> f64 {
    ((f64::from(pwm) - f64::from(PWM_CENTER)) / 500.0).clamp(-1.0, 1.0)
}

/// Inverse of [`thrust_to_pwm`].
pub fn pwm_to_thrust(pwm: u16) -> f64 {
    ((f64::from(pwm) - f64::from(PWM_MIN)) / 1000.0).clamp(0.0, 1.0)
}

/// Channel values for a connected RC frame. Pitch is sent inverted.
pub fn encode_channels(rc: &RcData) -> [u16; CHANNEL_COUNT] {
    let mut ch = [PWM_MIN; CHANNEL_COUNT];
    ch[CH_ROLL] = angle_to_pwm(rc.roll);
    ch[CH_YAW] = angle_to_pwm(rc.yaw);
    ch[CH_THROTTLE] = thrust_to_pwm(rc.throttle);
    ch[CH_PITCH] = angle_to_pwm(-rc.pitch);
    for (i, s) in rc.switches.iter().enumerate() {
        ch[CH_SWITCH0 + i] = switch_to_pwm(*s, 1);
    }
    ch
}
