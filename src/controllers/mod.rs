pub mod adapter;
pub mod cancelable;
pub mod drone;
pub mod error;
pub mod pid;
pub mod rc;
pub mod vehicle;

pub use adapter::{AdapterConfig, SimulationAdapter};
pub use cancelable::{run_cancelable, CancelToken, Cancelable, Deadline, NeverCancel};
pub use drone::{DroneController, SafetyParams, YawMode};
pub use error::ControllerError;
pub use pid::Pid;
pub use rc::RcData;
pub use vehicle::{Lifecycle, Tick, VehicleController};
