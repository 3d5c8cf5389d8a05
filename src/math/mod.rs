pub mod frame;
pub mod pose;

pub use frame::*;
pub use pose::{Pose, QuaternionDisplay, Transform, VectorDisplay};

/// Double-precision pose, the default throughout the simulator.
pub type Posed = pose::Pose<f64>;
/// Single-precision pose.
pub type Posef = pose::Pose<f32>;
