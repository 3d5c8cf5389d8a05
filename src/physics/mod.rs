pub mod aerodynamics;
pub mod atmosphere;
pub mod earth;
pub mod environment;
pub mod gravity;

pub use earth::{GeoPoint, HomeGeoPoint};
pub use environment::{Environment, EnvironmentError, EnvironmentState};
