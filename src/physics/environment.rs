//! Environment state derived from the vehicle position.
//!
//! The model keeps two snapshots. `initial` is written exactly once, when the
//! home point is established, and is what [`Environment::reset`] returns to.
//! `current` follows the vehicle: its owner calls [`Environment::set_position`]
//! and then [`Environment::update`] once per tick, in that order.

use log::{debug, info};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::atmosphere;
use super::earth::{self, GeoPoint, HomeGeoPoint};
use super::gravity;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("environment already initialized with home {0}; use reinitialize to move home")]
    AlreadyInitialized(GeoPoint),
    #[error("environment used before initialize")]
    NotInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentState {
    // inputs, set at initialization time
    pub geo_point: GeoPoint,
    pub min_z_over_ground: f64,      // NED z of the ground plane, m
    pub position: Vector3<f64>,      // NED relative to home, m

    // outputs, recomputed by every update
    pub gravity: Vector3<f64>,       // m/s^2, NED
    pub air_pressure: f64,           // Pa
    pub temperature: f64,            // K
    pub air_density: f64,            // kg/m^3
}

impl EnvironmentState {
    pub fn new(position: Vector3<f64>, geo_point: GeoPoint, min_z_over_ground: f64) -> Self {
        Self {
            geo_point,
            min_z_over_ground,
            position,
            ..Default::default()
        }
    }

    /// Recompute every output field from `position` and the home reference.
    fn recompute(&mut self, home: &HomeGeoPoint) {
        self.geo_point = earth::ned_to_geodetic(&self.position, home);

        let geopot = atmosphere::geopotential(self.geo_point.altitude / 1000.0);
        self.temperature = atmosphere::standard_temperature(geopot);
        self.air_pressure = atmosphere::standard_pressure(geopot, self.temperature);
        self.air_density = atmosphere::air_density(self.air_pressure, self.temperature);

        self.gravity = gravity::gravity_ned(self.geo_point.altitude);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Environment {
    initial: EnvironmentState,
    current: EnvironmentState,
    home: Option<HomeGeoPoint>,
}

impl Environment {
    /// Build and initialize in one step.
    pub fn new(initial: EnvironmentState) -> Self {
        let mut env = Self::default();
        env.establish(initial);
        env
    }

    pub fn is_initialized(&self) -> bool {
        self.home.is_some()
    }

    /// Establish the home point and the initial snapshot. Only valid once.
    pub fn initialize(&mut self, initial: EnvironmentState) -> Result<(), EnvironmentError> {
        if let Some(home) = &self.home {
            return Err(EnvironmentError::AlreadyInitialized(home.home_point));
        }
        self.establish(initial);
        Ok(())
    }

    /// Replace the home point and initial snapshot explicitly.
    pub fn reinitialize(&mut self, initial: EnvironmentState) {
        if let Some(home) = &self.home {
            info!("environment: moving home from {} to {}", home.home_point, initial.geo_point);
        }
        self.establish(initial);
    }

    fn establish(&mut self, mut initial: EnvironmentState) {
        let home = HomeGeoPoint::new(initial.geo_point);
        initial.recompute(&home);
        info!(
            "environment: home {} g={:.5} rho={:.4} T={:.2}K",
            home.home_point, initial.gravity.z, initial.air_density, initial.temperature
        );
        self.initial = initial;
        self.current = initial;
        self.home = Some(home);
    }

    /// Move the vehicle (local NED). Derived fields are stale until `update`.
    pub fn set_position(&mut self, position: Vector3<f64>) {
        self.current.position = position;
    }

    pub fn initial_state(&self) -> &EnvironmentState {
        &self.initial
    }

    pub fn state(&self) -> &EnvironmentState {
        &self.current
    }

    /// Live snapshot for the owning simulation loop. Derived fields written
    /// here are overwritten by the next `update`.
    pub fn state_mut(&mut self) -> &mut EnvironmentState {
        &mut self.current
    }

    pub fn home_geo_point(&self) -> Option<&HomeGeoPoint> {
        self.home.as_ref()
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// Recompute derived fields from the current position.
    pub fn update(&mut self) -> Result<(), EnvironmentError> {
        let home = self.home.as_ref().ok_or(EnvironmentError::NotInitialized)?;
        self.current.recompute(home);
        debug!(
            "environment: alt={:.2} rho={:.4} p={:.1}",
            self.current.geo_point.altitude, self.current.air_density, self.current.air_pressure
        );
        Ok(())
    }
}
