pub mod math;
pub mod physics;
pub mod dynamics;
pub mod vehicle;
pub mod controllers;
pub mod sim;
pub mod io;

pub mod types {
    pub use crate::controllers::{ControllerError, Lifecycle, RcData, YawMode};
    pub use crate::dynamics::state::{Deriv, KinematicsState, SimConfig, Twist};
    pub use crate::math::{Pose, Posed, Posef, Transform};
    pub use crate::physics::earth::{GeoPoint, HomeGeoPoint, G0, EARTH_RADIUS};
    pub use crate::physics::{EnvironmentError, EnvironmentState};
    pub use crate::vehicle::{MultiRotorParams, RotorParams, SpinDirection};
}
