use nalgebra::{convert, Quaternion, RealField, UnitQuaternion, Vector3};

use super::pose::Pose;

// ---------------------------------------------------------------------------
// Frame algebra (NED world frame, FRD body frame)
//
// Every function is generic over one scalar type. A computation that starts
// in f32 stays in f32; there is no implicit widening.
// ---------------------------------------------------------------------------

#[inline]
fn c<T: RealField + Copy>(v: f64) -> T {
    convert(v)
}

#[inline]
#[allow(clippy::eq_op)]
fn is_nan<T: RealField + Copy>(x: T) -> bool {
    x != x
}

/// Euclidean length of a vector.
pub fn magnitude<T: RealField + Copy>(v: &Vector3<T>) -> T {
    v.norm()
}

/// Rotate `v` by `q` (q · v · q⁻¹).
///
/// With `assume_unit` the conjugate stands in for the inverse. That is only
/// correct for unit quaternions; a non-unit `q` then scales the result by |q|².
/// A zero quaternion has no inverse and yields [`nan_vector`].
pub fn rotate_vector<T: RealField + Copy>(
    v: &Vector3<T>,
    q: &Quaternion<T>,
    assume_unit: bool,
) -> Vector3<T> {
    match inverse_of(q, assume_unit) {
        Some(qi) => (q * Quaternion::from_imag(*v) * qi).imag(),
        None => nan_vector(),
    }
}

/// Rotate `v` by the inverse of `q` (q⁻¹ · v · q).
pub fn rotate_vector_reverse<T: RealField + Copy>(
    v: &Vector3<T>,
    q: &Quaternion<T>,
    assume_unit: bool,
) -> Vector3<T> {
    match inverse_of(q, assume_unit) {
        Some(qi) => (qi * Quaternion::from_imag(*v) * q).imag(),
        None => nan_vector(),
    }
}

fn inverse_of<T: RealField + Copy>(q: &Quaternion<T>, assume_unit: bool) -> Option<Quaternion<T>> {
    if assume_unit {
        Some(q.conjugate())
    } else {
        q.try_inverse()
    }
}

/// World (NED) vector expressed in the body frame.
pub fn transform_to_body_frame<T: RealField + Copy>(
    v_world: &Vector3<T>,
    q: &Quaternion<T>,
    assume_unit: bool,
) -> Vector3<T> {
    rotate_vector_reverse(v_world, q, assume_unit)
}

/// Body vector expressed in the world (NED) frame.
pub fn transform_to_world_frame<T: RealField + Copy>(
    v_body: &Vector3<T>,
    q: &Quaternion<T>,
    assume_unit: bool,
) -> Vector3<T> {
    rotate_vector(v_body, q, assume_unit)
}

/// Body point to world frame using a pose: translate by the pose position,
/// then rotate by the pose orientation.
pub fn transform_to_world_frame_pose<T: RealField + Copy>(
    v_body: &Vector3<T>,
    pose: &Pose<T>,
    assume_unit: bool,
) -> Vector3<T> {
    let translated = v_body + pose.position;
    transform_to_world_frame(&translated, pose.orientation.quaternion(), assume_unit)
}

/// Componentwise negation (same rotation, opposite hemisphere).
pub fn negate<T: RealField + Copy>(q: &Quaternion<T>) -> Quaternion<T> {
    Quaternion::new(-q.w, -q.i, -q.j, -q.k)
}

/// Mirror a rotation across the XY plane (NED ↔ ENU style z flip).
pub fn flip_z_axis<T: RealField + Copy>(q: &Quaternion<T>) -> Quaternion<T> {
    Quaternion::new(q.w, -q.i, -q.j, q.k)
}

// ---------------------------------------------------------------------------
// Euler angles
// ---------------------------------------------------------------------------

/// Decompose `q` into `(pitch, roll, yaw)` in radians.
///
/// The arcsine argument is clamped to [-1, 1], so at gimbal lock pitch
/// saturates at ±π/2 instead of producing NaN.
pub fn to_eulerian_angle<T: RealField + Copy>(q: &Quaternion<T>) -> (T, T, T) {
    let one = T::one();
    let two: T = c(2.0);

    let ysqr = q.j * q.j;
    let t0 = -two * (ysqr + q.k * q.k) + one;
    let t1 = two * (q.i * q.j + q.w * q.k);
    let t2 = (-two * (q.i * q.k - q.w * q.j)).clamp(-one, one);
    let t3 = two * (q.j * q.k + q.w * q.i);
    let t4 = -two * (q.i * q.i + ysqr) + one;

    let pitch = t2.asin();
    let roll = t3.atan2(t4);
    let yaw = t1.atan2(t0);
    (pitch, roll, yaw)
}

/// Build the unit quaternion for the given `(pitch, roll, yaw)` in radians.
pub fn to_quaternion<T: RealField + Copy>(pitch: T, roll: T, yaw: T) -> UnitQuaternion<T> {
    let half: T = c(0.5);
    let t0 = (yaw * half).cos();
    let t1 = (yaw * half).sin();
    let t2 = (roll * half).cos();
    let t3 = (roll * half).sin();
    let t4 = (pitch * half).cos();
    let t5 = (pitch * half).sin();

    UnitQuaternion::new_unchecked(Quaternion::new(
        t0 * t2 * t4 + t1 * t3 * t5,
        t0 * t3 * t4 - t1 * t2 * t5,
        t0 * t2 * t5 + t1 * t3 * t4,
        t1 * t2 * t4 - t0 * t3 * t5,
    ))
}

/// Body angular velocity between two orientations `delta_sec` apart.
///
/// Euler-angle rates from a finite difference, mapped to body rates with the
/// small-angle kinematic relation evaluated at the end attitude. This is an
/// approximation: it is only meaningful for small `delta_sec` away from
/// gimbal lock, and yaw wrap-around across ±π shows up as a large spike.
pub fn to_angular_velocity<T: RealField + Copy>(
    start: &Quaternion<T>,
    end: &Quaternion<T>,
    delta_sec: T,
) -> Vector3<T> {
    let (p_s, r_s, y_s) = to_eulerian_angle(start);
    let (p_e, r_e, y_e) = to_eulerian_angle(end);

    let p_rate = (p_e - p_s) / delta_sec;
    let r_rate = (r_e - r_s) / delta_sec;
    let y_rate = (y_e - y_s) / delta_sec;

    let wx = r_rate - y_rate * p_e.sin();
    let wy = p_rate * r_e.cos() + y_rate * r_e.sin() * p_e.cos();
    let wz = -p_rate * r_e.sin() + y_rate * r_e.cos() * p_e.cos();

    Vector3::new(wx, wy, wz)
}

/// Yaw (rad) of `q`.
pub fn get_yaw<T: RealField + Copy>(q: &Quaternion<T>) -> T {
    let two: T = c(2.0);
    (two * (q.k * q.w + q.i * q.j)).atan2(-T::one() + two * (q.w * q.w + q.i * q.i))
}

/// Pitch (rad) of `q`, clamped at ±π/2.
pub fn get_pitch<T: RealField + Copy>(q: &Quaternion<T>) -> T {
    let two: T = c(2.0);
    (two * (q.j * q.w - q.k * q.i)).clamp(-T::one(), T::one()).asin()
}

/// Roll (rad) of `q`.
pub fn get_roll<T: RealField + Copy>(q: &Quaternion<T>) -> T {
    let two: T = c(2.0);
    (two * (q.k * q.j + q.w * q.i)).atan2(T::one() - two * (q.i * q.i + q.j * q.j))
}

/// Yaw using the z-y'-x'' convention (identical to RPY about fixed axes).
pub fn yaw_from_quaternion<T: RealField + Copy>(q: &Quaternion<T>) -> T {
    let two: T = c(2.0);
    (two * (q.w * q.k + q.i * q.j)).atan2(T::one() - two * (q.j * q.j + q.k * q.k))
}

/// Pure heading rotation about the down axis.
pub fn quaternion_from_yaw<T: RealField + Copy>(yaw: T) -> UnitQuaternion<T> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw)
}

/// Wrap an angle in degrees into (-180, 180].
pub fn normalize_angle_degrees<T: RealField + Copy>(angle: T) -> T {
    let full: T = c(360.0);
    let half: T = c(180.0);
    let wrapped = angle % full;
    if wrapped > half {
        wrapped - full
    } else if wrapped <= -half {
        wrapped + full
    } else {
        wrapped
    }
}

// ---------------------------------------------------------------------------
// Pose subtraction
// ---------------------------------------------------------------------------

/// Position of `lhs` relative to `rhs`, expressed in `rhs`'s frame.
pub fn coord_position_subtract<T: RealField + Copy>(lhs: &Pose<T>, rhs: &Pose<T>) -> Vector3<T> {
    let delta = Quaternion::from_imag(lhs.position - rhs.position);
    let q = rhs.orientation.quaternion();
    match q.try_inverse() {
        Some(qi) => (qi * (delta * q)).imag(),
        None => nan_vector(),
    }
}

/// Orientation of `lhs` relative to `rhs`: normalize(rhs⁻¹ · lhs).
pub fn coord_orientation_subtract<T: RealField + Copy>(
    lhs: &Quaternion<T>,
    rhs: &Quaternion<T>,
) -> Quaternion<T> {
    match rhs.try_inverse() {
        Some(rhs_inv) => (rhs_inv * lhs).normalize(),
        None => nan_quaternion(),
    }
}

/// Pose of `lhs` relative to `rhs`.
pub fn subtract<T: RealField + Copy>(lhs: &Pose<T>, rhs: &Pose<T>) -> Pose<T> {
    Pose::new(
        coord_position_subtract(lhs, rhs),
        UnitQuaternion::new_unchecked(coord_orientation_subtract(
            lhs.orientation.quaternion(),
            rhs.orientation.quaternion(),
        )),
    )
}

/// Compose a relative pose onto a base pose: the inverse of [`subtract`],
/// so `compose(&subtract(a, b), b) ≈ a`.
pub fn compose<T: RealField + Copy>(relative: &Pose<T>, base: &Pose<T>) -> Pose<T> {
    let q = base.orientation.quaternion();
    let offset = rotate_vector(&relative.position, q, true);
    Pose::new(
        base.position + offset,
        UnitQuaternion::new_normalize(q * relative.orientation.quaternion()),
    )
}

// ---------------------------------------------------------------------------
// NaN sentinels
// ---------------------------------------------------------------------------

/// Vector with every component NaN.
pub fn nan_vector<T: RealField + Copy>() -> Vector3<T> {
    Vector3::repeat(c(f64::NAN))
}

/// Quaternion with every component NaN.
pub fn nan_quaternion<T: RealField + Copy>() -> Quaternion<T> {
    let nan: T = c(f64::NAN);
    Quaternion::new(nan, nan, nan, nan)
}

/// True if any component of `v` is NaN.
pub fn has_nan<T: RealField + Copy>(v: &Vector3<T>) -> bool {
    v.iter().any(|x| is_nan(*x))
}

/// True if any component of `q` is NaN.
pub fn has_nan_quaternion<T: RealField + Copy>(q: &Quaternion<T>) -> bool {
    q.coords.iter().any(|x| is_nan(*x))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn sample_quats() -> Vec<UnitQuaternion<f64>> {
        vec![
            UnitQuaternion::identity(),
            UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1),
            UnitQuaternion::from_euler_angles(-1.2, 0.7, -2.9),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI),
            UnitQuaternion::new_normalize(Quaternion::new(0.1, 0.7, -0.4, 0.5)),
        ]
    }

    fn same_rotation(a: &Quaternion<f64>, b: &Quaternion<f64>) -> bool {
        // q and -q are the same rotation
        (a - b).norm() < 1e-9 || (a + b).norm() < 1e-9
    }

    #[test]
    fn euler_round_trip_up_to_sign() {
        for q in sample_quats() {
            let (p, r, y) = to_eulerian_angle(q.quaternion());
            let back = to_quaternion(p, r, y);
            assert!(
                same_rotation(q.quaternion(), back.quaternion()),
                "round trip failed for {:?} -> {:?}",
                q,
                back
            );
        }
    }

    #[test]
    fn gimbal_lock_clamps_instead_of_nan() {
        let q = to_quaternion(FRAC_PI_2, 0.0, 0.0);
        // push the pitch term slightly past 1 the way float noise would
        let noisy = Quaternion::new(q.w * (1.0 + 1e-12), q.i, q.j * (1.0 + 1e-12), q.k);
        let (pitch, roll, yaw) = to_eulerian_angle(&noisy);
        assert!(!pitch.is_nan() && !roll.is_nan() && !yaw.is_nan());
        assert_abs_diff_eq!(pitch, FRAC_PI_2, epsilon = 1e-6);
        assert!(!get_pitch(&noisy).is_nan());
    }

    #[test]
    fn euler_axis_convention() {
        let q = to_quaternion(0.0, 0.0, FRAC_PI_2);
        // yaw 90 deg turns north into east
        let v = rotate_vector(&Vector3::x(), q.quaternion(), true);
        assert_relative_eq!(v, Vector3::y(), epsilon = 1e-12);
        assert_abs_diff_eq!(get_yaw(q.quaternion()), FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(yaw_from_quaternion(q.quaternion()), FRAC_PI_2, epsilon = 1e-12);

        let q = to_quaternion(0.2, -0.4, 0.0);
        assert_abs_diff_eq!(get_pitch(q.quaternion()), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(get_roll(q.quaternion()), -0.4, epsilon = 1e-12);
    }

    #[test]
    fn rotate_then_reverse_is_identity() {
        let v = Vector3::new(1.5, -2.0, 0.25);
        for q in sample_quats() {
            let there = rotate_vector(&v, q.quaternion(), true);
            let back = rotate_vector_reverse(&there, q.quaternion(), true);
            assert_relative_eq!(back, v, epsilon = 1e-12);
        }
    }

    #[test]
    fn full_inverse_handles_non_unit_quaternion() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 2.0); // 180 deg about z, |q| = 2
        let v = rotate_vector(&Vector3::x(), &q, false);
        assert_relative_eq!(v, -Vector3::x(), epsilon = 1e-12);
        // the conjugate shortcut scales by |q|^2 on a non-unit quaternion
        let scaled = rotate_vector(&Vector3::x(), &q, true);
        assert_relative_eq!(scaled, -4.0 * Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn zero_quaternion_yields_nan_sentinel() {
        let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert!(has_nan(&rotate_vector(&Vector3::x(), &zero, false)));
    }

    #[test]
    fn body_and_world_frames_agree() {
        let q = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let v_world = Vector3::new(3.0, 4.0, -5.0);
        let v_body = transform_to_body_frame(&v_world, q.quaternion(), true);
        assert_relative_eq!(v_body, q.inverse() * v_world, epsilon = 1e-12);
        let again = transform_to_world_frame(&v_body, q.quaternion(), true);
        assert_relative_eq!(again, v_world, epsilon = 1e-12);
    }

    #[test]
    fn pose_transform_translates_then_rotates() {
        let pose = Pose::new(
            Vector3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let w = transform_to_world_frame_pose(&Vector3::new(1.0, 0.0, 0.0), &pose, true);
        assert_relative_eq!(w, Vector3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn subtract_self_is_zero() {
        let a = Pose::new(
            Vector3::new(10.0, -3.0, -7.0),
            UnitQuaternion::from_euler_angles(0.4, -0.1, 2.0),
        );
        let d = subtract(&a, &a);
        assert_relative_eq!(d.position, Vector3::zeros(), epsilon = 1e-12);
        assert!(same_rotation(d.orientation.quaternion(), UnitQuaternion::identity().quaternion()));
    }

    #[test]
    fn subtract_expresses_offset_in_rhs_frame() {
        let b = Pose::new(
            Vector3::zeros(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let a = Pose::new(Vector3::new(0.0, 5.0, 0.0), UnitQuaternion::identity());
        let d = subtract(&a, &b);
        // b faces east, so a point 5 m east is 5 m straight ahead of b
        assert_relative_eq!(d.position, Vector3::new(5.0, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(get_yaw(d.orientation.quaternion()), -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn compose_inverts_subtract() {
        let a = Pose::new(
            Vector3::new(1.0, 2.0, -3.0),
            UnitQuaternion::from_euler_angles(0.3, 0.1, -0.7),
        );
        let b = Pose::new(
            Vector3::new(-4.0, 0.5, -1.0),
            UnitQuaternion::from_euler_angles(-0.2, 0.6, 1.4),
        );
        let back = compose(&subtract(&a, &b), &b);
        assert_relative_eq!(back.position, a.position, epsilon = 1e-9);
        assert!(same_rotation(back.orientation.quaternion(), a.orientation.quaternion()));
    }

    #[test]
    fn angular_velocity_small_yaw_step() {
        let start = to_quaternion(0.0, 0.0, 0.0);
        let end = to_quaternion(0.0, 0.0, 0.01);
        let w = to_angular_velocity(start.quaternion(), end.quaternion(), 0.01);
        assert_relative_eq!(w, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-9);

        let end = to_quaternion(0.0, 0.02, 0.0);
        let w = to_angular_velocity(start.quaternion(), end.quaternion(), 0.01);
        assert_abs_diff_eq!(w.x, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn normalize_angle_wraps_into_half_open_range() {
        assert_abs_diff_eq!(normalize_angle_degrees(190.0), -170.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle_degrees(-190.0), 170.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle_degrees(180.0), 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle_degrees(-180.0), 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle_degrees(725.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn quaternion_helpers() {
        let q = Quaternion::new(0.5, 0.5, -0.5, 0.5);
        assert_eq!(negate(&q), Quaternion::new(-0.5, -0.5, 0.5, -0.5));
        assert_eq!(flip_z_axis(&q), Quaternion::new(0.5, -0.5, 0.5, 0.5));
        let y = quaternion_from_yaw(FRAC_PI_4);
        assert_abs_diff_eq!(get_yaw(y.quaternion()), FRAC_PI_4, epsilon = 1e-12);
        assert_abs_diff_eq!(magnitude(&Vector3::new(3.0, 4.0, 0.0)), 5.0);
    }

    #[test]
    fn single_precision_instantiation() {
        let q = to_quaternion(0.1_f32, 0.2, 0.3);
        let (p, r, y) = to_eulerian_angle(q.quaternion());
        assert!((p - 0.1).abs() < 1e-5 && (r - 0.2).abs() < 1e-5 && (y - 0.3).abs() < 1e-5);
        assert!(has_nan(&nan_vector::<f32>()));
        assert!(has_nan_quaternion(&nan_quaternion::<f32>()));
        assert!(!has_nan(&Vector3::<f32>::zeros()));
    }
}
