use nalgebra::Vector3;

use super::earth::{EARTH_RADIUS, G0};

/// Gravity magnitude (m/s^2) at a geometric altitude, inverse-square law.
///
/// Smooth for every altitude above the earth's centre; there is no clamping
/// at sea level, so terrain below MSL sees slightly stronger gravity.
pub fn gravity_magnitude(altitude: f64) -> f64 {
    let factor = EARTH_RADIUS / (EARTH_RADIUS + altitude);
    G0 * factor * factor
}

/// Gravitational acceleration in the local NED frame (points down, +z).
pub fn gravity_ned(altitude: f64) -> Vector3<f64> {
    Vector3::new(0.0, 0.0, gravity_magnitude(altitude))
}

/// Weight force on a body at given altitude (NED).
pub fn gravity_force(altitude: f64, mass: f64) -> Vector3<f64> {
    gravity_ned(altitude) * mass
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_gravity() {
        let g = gravity_ned(0.0);
        assert!((g.z - G0).abs() < 1e-12);
        assert_eq!(g.x, 0.0);
        assert_eq!(g.y, 0.0);
    }

    #[test]
    fn gravity_decreases_with_altitude() {
        let g0 = gravity_magnitude(0.0);
        let g10k = gravity_magnitude(10_000.0);
        let g100k = gravity_magnitude(100_000.0);
        assert!(g10k < g0);
        assert!(g100k < g10k);
        assert!(gravity_magnitude(-400.0) > g0);
    }

    #[test]
    fn no_discontinuity_across_range() {
        // finite differences must stay bounded by the analytic slope ~2g/R
        let max_step = 2.0 * G0 / EARTH_RADIUS * 1.01;
        let mut h = -20_000.0;
        while h < 200_000.0 {
            let d = (gravity_magnitude(h + 1.0) - gravity_magnitude(h)).abs();
            assert!(d <= max_step, "gravity jumps by {} at {} m", d, h);
            h += 997.0;
        }
    }

    #[test]
    fn weight_scales_with_mass() {
        let f = gravity_force(0.0, 2.0);
        assert!((f.z - 2.0 * G0).abs() < 1e-12);
    }
}
