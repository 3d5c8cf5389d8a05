use crate::dynamics::KinematicsState;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Liftoff,
    Touchdown,
    AltitudeCrossed { altitude: f64, ascending: bool },
    Halted(String),
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub state: KinematicsState,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &KinematicsState, current: &KinematicsState) -> Option<EventKind>;
}

/// Height (m, positive up) above a NED ground plane.
fn height_over(ground_z: f64, s: &KinematicsState) -> f64 {
    ground_z - s.pose.position.z
}

/// Fires every time the vehicle leaves the ground by more than `clearance`.
pub struct LiftoffDetector {
    ground_z: f64,
    clearance: f64,
    airborne: bool,
}

impl LiftoffDetector {
    pub fn new(ground_z: f64, clearance: f64) -> Self {
        Self { ground_z, clearance, airborne: false }
    }
}

impl EventDetector for LiftoffDetector {
    fn check(&mut self, _prev: &KinematicsState, current: &KinematicsState) -> Option<EventKind> {
        let h = height_over(self.ground_z, current);
        if !self.airborne && h > self.clearance {
            self.airborne = true;
            return Some(EventKind::Liftoff);
        }
        if self.airborne && h <= 0.0 {
            self.airborne = false;
        }
        None
    }
}

/// Fires when an airborne vehicle comes back to the ground plane.
pub struct TouchdownDetector {
    ground_z: f64,
    clearance: f64,
    airborne: bool,
}

impl TouchdownDetector {
    pub fn new(ground_z: f64, clearance: f64) -> Self {
        Self { ground_z, clearance, airborne: false }
    }
}

impl EventDetector for TouchdownDetector {
    fn check(&mut self, prev: &KinematicsState, current: &KinematicsState) -> Option<EventKind> {
        if height_over(self.ground_z, current) > self.clearance {
            self.airborne = true;
            return None;
        }
        let landed =
            height_over(self.ground_z, current) <= 0.0 && height_over(self.ground_z, prev) > 0.0;
        if self.airborne && landed {
            self.airborne = false;
            Some(EventKind::Touchdown)
        } else {
            None
        }
    }
}

/// Detects when altitude (positive up) crosses a threshold, once.
pub struct AltitudeDetector {
    pub altitude: f64,
    pub ascending: bool,
    fired: bool,
}

impl AltitudeDetector {
    pub fn new(altitude: f64, ascending: bool) -> Self {
        Self { altitude, ascending, fired: false }
    }
}

impl EventDetector for AltitudeDetector {
    fn check(&mut self, prev: &KinematicsState, current: &KinematicsState) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let (a, b) = (prev.altitude(), current.altitude());
        let crossed = if self.ascending {
            a < self.altitude && b >= self.altitude
        } else {
            a > self.altitude && b <= self.altitude
        };
        if crossed {
            self.fired = true;
            Some(EventKind::AltitudeCrossed { altitude: self.altitude, ascending: self.ascending })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn at_alt(alt: f64) -> KinematicsState {
        KinematicsState::at_rest(Vector3::new(0.0, 0.0, -alt))
    }

    #[test]
    fn liftoff_then_touchdown() {
        let mut up = LiftoffDetector::new(0.0, 0.1);
        let mut down = TouchdownDetector::new(0.0, 0.1);
        let path = [0.0, 0.05, 0.5, 2.0, 0.5, 0.0];
        let mut events = Vec::new();
        for w in path.windows(2) {
            let (p, c) = (at_alt(w[0]), at_alt(w[1]));
            events.extend(up.check(&p, &c));
            events.extend(down.check(&p, &c));
        }
        assert_eq!(events, vec![EventKind::Liftoff, EventKind::Touchdown]);
    }

    #[test]
    fn touchdown_needs_prior_flight() {
        let mut down = TouchdownDetector::new(0.0, 0.1);
        assert!(down.check(&at_alt(0.05), &at_alt(0.0)).is_none());
    }

    #[test]
    fn altitude_detector_ascending() {
        let mut det = AltitudeDetector::new(10.0, true);
        let prev = at_alt(9.0);
        let curr = at_alt(10.5);
        assert_eq!(
            det.check(&prev, &curr),
            Some(EventKind::AltitudeCrossed { altitude: 10.0, ascending: true })
        );
        // Should not fire again
        assert!(det.check(&prev, &curr).is_none());
    }

    #[test]
    fn altitude_detector_descending() {
        let mut det = AltitudeDetector::new(3.0, false);
        assert!(det.check(&at_alt(2.0), &at_alt(4.0)).is_none());
        assert!(det.check(&at_alt(3.5), &at_alt(2.5)).is_some());
    }
}
