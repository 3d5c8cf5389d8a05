use thiserror::Error;

use super::vehicle::Lifecycle;

/// Failures surfaced by vehicle controllers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// The adapter does not support this command.
    #[error("command not implemented: {0}")]
    NotImplemented(String),

    /// A requested mode change cannot be honored.
    #[error("invalid mode transition: {0}")]
    InvalidModeTransition(String),

    #[error("actuator index {index} out of range for {count} actuators")]
    ActuatorIndexOutOfRange { index: usize, count: usize },

    /// NaN detected in a value on its way to or from the integrator.
    #[error("numeric invalid: {0}")]
    NumericInvalid(String),

    #[error("{operation} called while {state:?}")]
    InvalidLifecycle { operation: &'static str, state: Lifecycle },

    #[error("action canceled")]
    Canceled,

    #[error("move failed: {0}")]
    MoveFailed(String),
}

impl ControllerError {
    /// Programming or configuration errors: retrying the same call fails again.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ControllerError::InvalidModeTransition(_)
                | ControllerError::ActuatorIndexOutOfRange { .. }
                | ControllerError::InvalidLifecycle { .. }
        )
    }

    /// Outcomes a caller may react to and continue from, including an
    /// unsupported command (pick another strategy).
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(ControllerError::NotImplemented("command_velocity".into()).is_recoverable());
        assert!(ControllerError::InvalidModeTransition("sim".into()).is_fatal());
        assert!(ControllerError::ActuatorIndexOutOfRange { index: 4, count: 4 }.is_fatal());
        assert!(ControllerError::Canceled.is_recoverable());
        assert!(ControllerError::NumericInvalid("pose".into()).is_recoverable());
        assert!(ControllerError::MoveFailed("blocked".into()).is_recoverable());
    }

    #[test]
    fn messages_name_the_problem() {
        let e = ControllerError::ActuatorIndexOutOfRange { index: 5, count: 4 };
        assert_eq!(e.to_string(), "actuator index 5 out of range for 4 actuators");
        let e = ControllerError::InvalidLifecycle {
            operation: "update",
            state: Lifecycle::Stopped,
        };
        assert_eq!(e.to_string(), "update called while Stopped");
    }
}
