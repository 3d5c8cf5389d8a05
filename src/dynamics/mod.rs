pub mod multirotor;
pub mod state;

pub use multirotor::{derivatives, rotor_wrench, RotorWrench};
pub use state::{Deriv, KinematicsState, SimConfig, Twist};
