use log::{debug, info, warn};
use nalgebra::Vector3;
use thiserror::Error;

use crate::controllers::{
    AdapterConfig, ControllerError, DroneController, NeverCancel, RcData, SimulationAdapter, Tick,
    VehicleController,
};
use crate::dynamics::{KinematicsState, SimConfig};
use crate::math;
use crate::physics::{Environment, EnvironmentError, EnvironmentState, GeoPoint};
use crate::vehicle::MultiRotorParams;
use super::event::{
    AltitudeDetector, EventDetector, EventKind, LiftoffDetector, SimEvent, TouchdownDetector,
};
use super::integrator::{clamp_to_ground, rk4_step};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
}

/// One row of recorded telemetry.
#[derive(Debug, Clone)]
pub struct TelemetrySample {
    pub kinematics: KinematicsState,
    pub environment: EnvironmentState,
    pub signals: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SimResult {
    pub samples: Vec<TelemetrySample>,
    pub events: Vec<SimEvent>,
    pub messages: Vec<String>,
    /// Set when a NaN stopped the run early.
    pub halted: Option<ControllerError>,
}

impl SimResult {
    pub fn final_state(&self) -> Option<&KinematicsState> {
        self.samples.last().map(|s| &s.kinematics)
    }

    pub fn max_altitude(&self) -> f64 {
        self.samples.iter().map(|s| s.kinematics.altitude()).fold(f64::NEG_INFINITY, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Per-tick loop
// ---------------------------------------------------------------------------

/// Run `controller` against the multirotor body until `config.max_time`.
///
/// Tick order: environment follows the vehicle position, the controller
/// runs one iteration, its vertex signals drive one RK4 step. A NaN in the
/// kinematics or the signals stops the run before it reaches the integrator;
/// the partial result is returned with `halted` set.
///
/// `pilot` is polled every tick and may supply fresh RC data.
///
/// A non-positive or NaN `dt`, or a non-finite `max_time`, is rejected with
/// `InvalidConfig` before the controller is touched.
pub fn simulate_with<P>(
    params: &MultiRotorParams,
    config: &SimConfig,
    environment: &mut Environment,
    controller: &mut dyn DroneController,
    mut pilot: P,
) -> Result<SimResult, SimError>
where
    P: FnMut(&KinematicsState) -> Option<RcData>,
{
    validate(config)?;
    controller.start()?;

    let ground_z = environment.state().min_z_over_ground;
    let mut state = KinematicsState::at_rest(environment.state().position);
    state.pose.position.z = state.pose.position.z.min(ground_z);

    let mut detectors: Vec<Box<dyn EventDetector>> = vec![
        Box::new(LiftoffDetector::new(ground_z, 0.1)),
        Box::new(TouchdownDetector::new(ground_z, 0.1)),
        Box::new(AltitudeDetector::new(-controller.takeoff_z(), true)),
    ];

    let cap = ((config.max_time / config.dt) as usize + 1).min(200_000);
    let mut result = SimResult { samples: Vec::with_capacity(cap), ..Default::default() };

    while state.time < config.max_time {
        // Environment first, from the position the integrator left us
        environment.set_position(state.pose.position);
        environment.update()?;

        if let Some(rc) = pilot(&state) {
            controller.set_rc_data(&rc);
        }

        let tick = Tick { dt: config.dt, environment: &*environment, kinematics: &state };
        let stepped = controller.update(&tick).and_then(|_| controller.vertex_control_signals());
        let signals = match stepped {
            Ok(s) => s,
            Err(e @ ControllerError::NumericInvalid(_)) => {
                halt(&mut result, &state, e);
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if signals.iter().any(|s| s.is_nan()) {
            halt(&mut result, &state, ControllerError::NumericInvalid("rotor signal".into()));
            break;
        }

        result.samples.push(TelemetrySample {
            kinematics: state,
            environment: *environment.state(),
            signals: signals.clone(),
        });

        let mut next = rk4_step(&state, params, environment.state(), &signals, config.dt);
        clamp_to_ground(&mut next, ground_z);

        if next.has_nan() {
            let at = format!("integrator at t={:.3}", next.time);
            halt(&mut result, &state, ControllerError::NumericInvalid(at));
            break;
        }

        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&state, &next) {
                debug!("event at t={:.3}: {:?}", next.time, kind);
                result.events.push(SimEvent { time: next.time, kind, state: next });
            }
        }

        result.messages.extend(controller.status_messages());
        state = next;
    }

    result.messages.extend(controller.status_messages());
    info!(
        "simulation done: {} samples, {} events, t={:.2}s",
        result.samples.len(),
        result.events.len(),
        state.time
    );
    Ok(result)
}

// `!(dt > 0.0)` so a NaN step is caught too
#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn validate(config: &SimConfig) -> Result<(), SimError> {
    if !(config.dt > 0.0) {
        return Err(SimError::InvalidConfig(format!("dt must be positive, got {}", config.dt)));
    }
    if !config.max_time.is_finite() {
        return Err(SimError::InvalidConfig(format!(
            "max_time must be finite, got {}",
            config.max_time
        )));
    }
    Ok(())
}

fn halt(result: &mut SimResult, state: &KinematicsState, err: ControllerError) {
    warn!("halting at t={:.3}: {}", state.time, err);
    result.events.push(SimEvent {
        time: state.time,
        kind: EventKind::Halted(err.to_string()),
        state: *state,
    });
    result.halted = Some(err);
}

/// Fly the default simulation adapter from `home`, armed, with `pilot` on the sticks.
pub fn simulate<P>(
    params: &MultiRotorParams,
    config: &SimConfig,
    home: GeoPoint,
    pilot: P,
) -> Result<SimResult, SimError>
where
    P: FnMut(&KinematicsState) -> Option<RcData>,
{
    let mut environment = Environment::new(EnvironmentState::new(Vector3::zeros(), home, 0.0));
    let mut adapter = SimulationAdapter::new(params, AdapterConfig::default());
    adapter.start()?;
    adapter.arm_disarm(true, &NeverCancel)?;
    simulate_with(params, config, &mut environment, &mut adapter, pilot)
}

/// Throttle-only pilot: hold `throttle` with centered sticks.
pub fn constant_throttle(throttle: f64) -> impl FnMut(&KinematicsState) -> Option<RcData> {
    move |_| Some(RcData { throttle, ..RcData::centered() })
}

/// Damped proportional altitude hold around `target` (m, positive up), then descend
/// after `descend_at` seconds.
pub fn climb_and_land(
    target: f64,
    descend_at: f64,
    hover: f64,
) -> impl FnMut(&KinematicsState) -> Option<RcData> {
    move |s| {
        let throttle = if s.time >= descend_at {
            hover - 0.08
        } else {
            let err = target - s.altitude();
            (hover + 0.05 * err - 0.1 * (-s.twist.linear.z)).clamp(0.0, 1.0)
        };
        Some(RcData { throttle, ..RcData::centered() })
    }
}

/// NaN-free check used by the demo binaries on the final result.
pub fn result_is_finite(result: &SimResult) -> bool {
    result
        .samples
        .iter()
        .all(|s| !s.kinematics.has_nan() && !math::has_nan(&s.environment.gravity))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
