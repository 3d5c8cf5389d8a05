use serde::{Deserialize, Serialize};

use super::error::ControllerError;
use crate::dynamics::KinematicsState;
use crate::physics::Environment;

/// Controller lifecycle. Offboard/simulation flags are orthogonal to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Constructed,
    Started,
    Running,
    Stopped,
}

impl Lifecycle {
    /// Whether `update` may be called.
    pub fn accepts_updates(&self) -> bool {
        matches!(self, Lifecycle::Started | Lifecycle::Running)
    }
}

/// Everything a controller may read during one tick. The references are only
/// valid for the duration of `update`.
#[derive(Debug, Clone, Copy)]
pub struct Tick<'a> {
    pub dt: f64,
    pub environment: &'a Environment,
    pub kinematics: &'a KinematicsState,
}

/// Vehicle-agnostic controller contract.
///
/// Implement this to plug a flight stack into the simulation loop. Actuator
/// outputs are exposed per vertex (rotor) in canonical order: counter-clockwise
/// seen from above, starting front-right.
pub trait VehicleController {
    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }

    fn lifecycle(&self) -> Lifecycle;

    fn start(&mut self) -> Result<(), ControllerError>;
    fn stop(&mut self);

    /// Reset internal state (board, estimator, integrators).
    fn reset(&mut self);

    /// Push sensor state into the flight stack and run one control iteration.
    fn update(&mut self, tick: &Tick<'_>) -> Result<(), ControllerError>;

    fn vertex_count(&self) -> usize;
    fn vertex_control_signal(&self, index: usize) -> Result<f64, ControllerError>;

    /// All vertex signals in canonical order.
    fn vertex_control_signals(&self) -> Result<Vec<f64>, ControllerError> {
        (0..self.vertex_count())
            .map(|i| self.vertex_control_signal(i))
            .collect()
    }

    /// Drain pending status text from the flight stack.
    fn status_messages(&mut self) -> Vec<String>;

    fn is_offboard_mode(&self) -> bool;
    fn is_simulation_mode(&self) -> bool;
    fn set_offboard_mode(&mut self, is_set: bool) -> Result<(), ControllerError>;
    fn set_simulation_mode(&mut self, is_set: bool) -> Result<(), ControllerError>;
}
