use std::fmt;
use std::ops::Sub;

use nalgebra::{Quaternion, RealField, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::frame;

/// Position + orientation of a body in the NED world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: RealField + Copy + Serialize"))]
#[serde(bound(deserialize = "T: RealField + Copy + Deserialize<'de>"))]
pub struct Pose<T: RealField + Copy> {
    pub position: Vector3<T>,
    pub orientation: UnitQuaternion<T>,
}

impl<T: RealField + Copy> Pose<T> {
    pub fn new(position: Vector3<T>, orientation: UnitQuaternion<T>) -> Self {
        Self { position, orientation }
    }

    /// Origin, level, facing north.
    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// Sentinel for "no valid pose yet". Never equal to any pose, itself included.
    pub fn nan() -> Self {
        Self::new(
            frame::nan_vector(),
            UnitQuaternion::new_unchecked(frame::nan_quaternion()),
        )
    }

    pub fn has_nan(&self) -> bool {
        frame::has_nan(&self.position) || frame::has_nan_quaternion(self.orientation.quaternion())
    }
}

impl<T: RealField + Copy> Default for Pose<T> {
    fn default() -> Self {
        Self::zero()
    }
}

/// `a - b` is the pose of `a` relative to `b`.
impl<T: RealField + Copy> Sub for Pose<T> {
    type Output = Pose<T>;

    fn sub(self, rhs: Pose<T>) -> Pose<T> {
        frame::subtract(&self, &rhs)
    }
}

impl<'a, T: RealField + Copy> Sub<&'a Pose<T>> for &'a Pose<T> {
    type Output = Pose<T>;

    fn sub(self, rhs: &'a Pose<T>) -> Pose<T> {
        frame::subtract(self, rhs)
    }
}

impl<T: RealField + Copy + fmt::Display> fmt::Display for Pose<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            VectorDisplay(&self.position),
            QuaternionDisplay::with_euler(self.orientation.quaternion())
        )
    }
}

/// Rigid transform (translation + rotation) between two frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform<T: RealField + Copy> {
    pub translation: Vector3<T>,
    pub rotation: UnitQuaternion<T>,
}

impl<T: RealField + Copy> Transform<T> {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Map a point from the source frame into the target frame.
    pub fn apply(&self, point: &Vector3<T>) -> Vector3<T> {
        self.rotation * point + self.translation
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// `[x, y, z]`
pub struct VectorDisplay<'a, T: RealField + Copy>(pub &'a Vector3<T>);

impl<T: RealField + Copy + fmt::Display> fmt::Display for VectorDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(f, "[{:.6}, {:.6}, {:.6}]", v.x, v.y, v.z)
    }
}

/// `[w, x, y, z]`, optionally followed by `-[pitch, roll, yaw]`.
pub struct QuaternionDisplay<'a, T: RealField + Copy> {
    q: &'a Quaternion<T>,
    euler: bool,
}

impl<'a, T: RealField + Copy> QuaternionDisplay<'a, T> {
    pub fn new(q: &'a Quaternion<T>) -> Self {
        Self { q, euler: false }
    }

    pub fn with_euler(q: &'a Quaternion<T>) -> Self {
        Self { q, euler: true }
    }
}

impl<T: RealField + Copy + fmt::Display> fmt::Display for QuaternionDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.q;
        write!(f, "[{:.6}, {:.6}, {:.6}, {:.6}]", q.w, q.i, q.j, q.k)?;
        if self.euler {
            let (pitch, roll, yaw) = frame::to_eulerian_angle(q);
            write!(f, "-[{:.6}, {:.6}, {:.6}]", pitch, roll, yaw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nan_pose_is_distinguishable_from_zero() {
        let nan = Pose::<f64>::nan();
        let zero = Pose::<f64>::zero();
        assert!(nan.has_nan());
        assert!(!zero.has_nan());
        assert_ne!(nan, zero);
        assert_ne!(nan, nan);
    }

    #[test]
    fn sub_operator_matches_subtract() {
        let a = Pose::new(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
        );
        let b = Pose::new(Vector3::new(-1.0, 0.0, 2.0), UnitQuaternion::identity());
        let d = a - b;
        assert_relative_eq!(d.position, Vector3::new(2.0, 2.0, 1.0), epsilon = 1e-12);
        assert_eq!(&a - &b, d);
    }

    #[test]
    fn display_formats() {
        let v = Vector3::new(1.0, -2.0, 0.5);
        assert_eq!(VectorDisplay(&v).to_string(), "[1.000000, -2.000000, 0.500000]");
        let q = Quaternion::new(1.0, 0.0, 0.0, 0.0);
        assert_eq!(
            QuaternionDisplay::new(&q).to_string(),
            "[1.000000, 0.000000, 0.000000, 0.000000]"
        );
        let with_euler = QuaternionDisplay::with_euler(&q).to_string();
        assert!(with_euler.starts_with("[1.000000, 0.000000, 0.000000, 0.000000]-["));
    }

    #[test]
    fn transform_applies_rotation_then_translation() {
        let t = Transform {
            translation: Vector3::new(0.0, 0.0, -1.0),
            rotation: UnitQuaternion::from_axis_angle(
                &Vector3::z_axis(),
                std::f64::consts::FRAC_PI_2,
            ),
        };
        assert_relative_eq!(t.apply(&Vector3::x()), Vector3::new(0.0, 1.0, -1.0), epsilon = 1e-12);
        assert_eq!(Transform::<f64>::identity().apply(&Vector3::x()), Vector3::x());
    }
}
