use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::physics::earth::G0;

// ---------------------------------------------------------------------------
// Rotor and airframe parameters
// ---------------------------------------------------------------------------

/// Propeller spin direction, seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinDirection {
    Ccw,
    Cw,
}

impl SpinDirection {
    /// Sign of the reaction torque about body +z (down).
    ///
    /// A counter-clockwise prop (seen from above) pushes the airframe
    /// clockwise from above, which is positive yaw in FRD.
    pub fn yaw_torque_sign(&self) -> f64 {
        match self {
            SpinDirection::Ccw => 1.0,
            SpinDirection::Cw => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotorParams {
    pub position: Vector3<f64>,       // m, body FRD relative to CG
    pub spin: SpinDirection,
    pub max_thrust: f64,              // N at sea-level density, full signal
    pub torque_coefficient: f64,      // N·m of yaw reaction per N of thrust
}

/// Rigid multirotor airframe. Rotors are listed in canonical order:
/// counter-clockwise seen from above, starting front-right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRotorParams {
    pub name: String,
    pub mass: f64,                    // kg
    pub inertia: Vector3<f64>,        // [Ixx, Iyy, Izz] principal moments, kg·m^2
    pub rotors: Vec<RotorParams>,
    pub cd_area: f64,                 // drag coefficient times frontal area, m^2
    pub angular_damping: f64,         // N·m·s per (kg/m^3) of air density
}

impl MultiRotorParams {
    pub fn rotor_count(&self) -> usize {
        self.rotors.len()
    }

    pub fn max_total_thrust(&self) -> f64 {
        self.rotors.iter().map(|r| r.max_thrust).sum()
    }

    pub fn thrust_to_weight(&self) -> f64 {
        self.max_total_thrust() / (self.mass * G0)
    }

    /// Uniform rotor signal that balances weight at sea-level density.
    pub fn hover_signal(&self) -> f64 {
        let total = self.max_total_thrust();
        if total > 0.0 {
            (self.mass * G0 / total).min(1.0)
        } else {
            1.0
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct MultiRotorParamsBuilder {
    name: String,
    mass: f64,
    inertia: Vector3<f64>,
    rotors: Vec<RotorParams>,
    cd_area: f64,
    angular_damping: f64,
}

impl MultiRotorParamsBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mass: 1.0,
            inertia: Vector3::new(0.0066, 0.0075, 0.0131),
            rotors: Vec::new(),
            cd_area: 0.0325,
            angular_damping: 0.002,
        }
    }

    pub fn mass(mut self, v: f64) -> Self { self.mass = v; self }
    pub fn inertia(mut self, v: Vector3<f64>) -> Self { self.inertia = v; self }
    pub fn cd_area(mut self, v: f64) -> Self { self.cd_area = v; self }
    pub fn angular_damping(mut self, v: f64) -> Self { self.angular_damping = v; self }

    pub fn rotor(mut self, rotor: RotorParams) -> Self {
        self.rotors.push(rotor);
        self
    }

    /// Place `count` identical rotors evenly on a circle of `arm_length`,
    /// first one at `start_angle` (rad from body +x toward +y), going
    /// counter-clockwise seen from above. Spin alternates, first CCW.
    pub fn symmetric_rotors(
        mut self,
        count: usize,
        arm_length: f64,
        start_angle: f64,
        max_thrust: f64,
        torque_coefficient: f64,
    ) -> Self {
        let step = std::f64::consts::TAU / count.max(1) as f64;
        self.rotors = (0..count)
            .map(|i| {
                // CCW seen from above is decreasing angle in FRD (y to the right)
                let angle = start_angle - step * i as f64;
                RotorParams {
                    position: Vector3::new(arm_length * angle.cos(), arm_length * angle.sin(), 0.0),
                    spin: if i % 2 == 0 { SpinDirection::Ccw } else { SpinDirection::Cw },
                    max_thrust,
                    torque_coefficient,
                }
            })
            .collect();
        self
    }

    pub fn build(self) -> MultiRotorParams {
        MultiRotorParams {
            name: self.name,
            mass: self.mass,
            inertia: self.inertia,
            rotors: self.rotors,
            cd_area: self.cd_area,
            angular_damping: self.angular_damping,
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub mod presets {
    use std::f64::consts::FRAC_PI_4;

    use super::*;

    /// 1 kg quad-X on a 0.2275 m arm, ~1.7 thrust-to-weight.
    /// Rotor order: front-right, front-left, rear-left, rear-right.
    pub fn quad_x() -> MultiRotorParams {
        MultiRotorParamsBuilder::new("Quad-X")
            .mass(1.0)
            .symmetric_rotors(4, 0.2275, FRAC_PI_4, 4.179446, 0.013_294)
            .build()
    }

    /// Heavier hexacopter, used to exercise vehicles the quad mixer can't drive.
    pub fn hex_x() -> MultiRotorParams {
        MultiRotorParamsBuilder::new("Hex-X")
            .mass(2.5)
            .inertia(Vector3::new(0.03, 0.03, 0.055))
            .cd_area(0.06)
            .symmetric_rotors(6, 0.35, std::f64::consts::FRAC_PI_6, 7.0, 0.016)
            .build()
    }
}
