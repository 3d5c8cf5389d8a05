pub mod event;
pub mod integrator;
pub mod runner;

pub use integrator::{clamp_to_ground, rk4_step};
pub use runner::{simulate, simulate_with, SimError, SimResult, TelemetrySample};
