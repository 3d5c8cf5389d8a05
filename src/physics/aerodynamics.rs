use nalgebra::Vector3;

/// Quadratic drag force opposing the air-relative velocity (world frame).
///
/// `cd_area` is the drag coefficient times reference area (m^2).
pub fn drag_force(vel: &Vector3<f64>, air_density: f64, cd_area: f64) -> Vector3<f64> {
    let speed = vel.norm();
    if speed > 1e-6 {
        let q_dyn = 0.5 * air_density * speed * speed;
        -vel / speed * (q_dyn * cd_area)
    } else {
        Vector3::zeros()
    }
}

/// Rotational damping torque proportional to body rate and air density.
pub fn damping_moment(omega: &Vector3<f64>, air_density: f64, coefficient: f64) -> Vector3<f64> {
    -omega * (air_density * coefficient)
}

/// Rotor thrust scaled from its sea-level rating by the local air density.
pub fn density_scaled_thrust(
    max_thrust: f64,
    signal: f64,
    air_density: f64,
    sea_level_density: f64,
) -> f64 {
    max_thrust * signal.clamp(0.0, 1.0) * air_density / sea_level_density
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::atmosphere;
    use crate::physics::earth::SEA_LEVEL_AIR_DENSITY;

    #[test]
    fn drag_opposes_velocity() {
        let vel = Vector3::new(0.0, 0.0, -12.0);
        let f = drag_force(&vel, atmosphere::isa(0.0).density, 0.05);
        assert!(f.z > 0.0, "Drag should oppose climbing velocity");
    }

    #[test]
    fn no_drag_at_rest() {
        let f = drag_force(&Vector3::zeros(), 1.2, 0.05);
        assert!(f.norm() < 1e-10);
    }

    #[test]
    fn thin_air_reduces_thrust() {
        let sea = density_scaled_thrust(4.0, 0.5, SEA_LEVEL_AIR_DENSITY, SEA_LEVEL_AIR_DENSITY);
        let thin = atmosphere::isa(3_000.0).density;
        let high = density_scaled_thrust(4.0, 0.5, thin, SEA_LEVEL_AIR_DENSITY);
        assert!((sea - 2.0).abs() < 1e-12);
        assert!(high < sea);
        assert_eq!(density_scaled_thrust(4.0, -1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn damping_opposes_rotation() {
        let m = damping_moment(&Vector3::new(1.0, -2.0, 0.0), 1.2, 0.01);
        assert!(m.x < 0.0 && m.y > 0.0);
    }
}
