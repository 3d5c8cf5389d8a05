pub mod params;

pub use params::{presets, MultiRotorParams, MultiRotorParamsBuilder, RotorParams, SpinDirection};
