use super::earth::{
    AIR_GAS_CONSTANT, EARTH_RADIUS_GEOPOTENTIAL_KM, SEA_LEVEL_PRESSURE, SEA_LEVEL_TEMPERATURE,
};

// ---------------------------------------------------------------------------
// U.S. Standard Atmosphere, layered on geopotential height (0 to 84.85 km)
// ---------------------------------------------------------------------------

const GAMMA: f64 = 1.4; // ratio of specific heats
const TOP_OF_MODEL_KM: f64 = 84.852;
const THERMOSPHERE_TEMPERATURE: f64 = 186.946; // K

/// Atmospheric properties at a given geometric altitude.
#[derive(Debug, Clone, Copy)]
pub struct Atmo {
    pub density: f64,      // kg/m^3
    pub pressure: f64,     // Pa
    pub temperature: f64,  // K
    pub sound_speed: f64,  // m/s
}

/// Geopotential height (km) for a geometric altitude (km).
pub fn geopotential(altitude_km: f64) -> f64 {
    EARTH_RADIUS_GEOPOTENTIAL_KM * altitude_km / (EARTH_RADIUS_GEOPOTENTIAL_KM + altitude_km)
}

/// Standard temperature (K) at a geopotential height (km).
///
/// Piecewise-linear profile; above the model top the kinetic temperature is
/// irrelevant to a thermometer in near-vacuum, so a constant is returned.
pub fn standard_temperature(geopot_km: f64) -> f64 {
    let h = geopot_km;
    if h <= 11.0 {
        // Troposphere: lapse -6.5 K/km
        SEA_LEVEL_TEMPERATURE - 6.5 * h
    } else if h <= 20.0 {
        // Tropopause: isothermal
        216.65
    } else if h <= 32.0 {
        // Stratosphere I: +1.0 K/km
        196.65 + h
    } else if h <= 47.0 {
        // Stratosphere II: +2.8 K/km
        228.65 + 2.8 * (h - 32.0)
    } else if h <= 51.0 {
        // Stratopause: isothermal
        270.65
    } else if h <= 71.0 {
        // Mesosphere I: -2.8 K/km
        270.65 - 2.8 * (h - 51.0)
    } else if h <= TOP_OF_MODEL_KM {
        // Mesosphere II: -2.0 K/km
        214.65 - 2.0 * (h - 71.0)
    } else {
        THERMOSPHERE_TEMPERATURE
    }
}

/// Standard pressure (Pa) at a geopotential height (km) and its standard temperature (K).
pub fn standard_pressure(geopot_km: f64, temperature: f64) -> f64 {
    let h = geopot_km;
    if h <= 11.0 {
        SEA_LEVEL_PRESSURE * (SEA_LEVEL_TEMPERATURE / temperature).powf(-5.255_877)
    } else if h <= 20.0 {
        22_632.06 * (-0.157_7 * (h - 11.0)).exp()
    } else if h <= 32.0 {
        5_474.889 * (216.65 / temperature).powf(34.163_19)
    } else if h <= 47.0 {
        868.018_7 * (228.65 / temperature).powf(12.201_1)
    } else if h <= 51.0 {
        110.906_3 * (-0.126_2 * (h - 47.0)).exp()
    } else if h <= 71.0 {
        66.938_87 * (270.65 / temperature).powf(-12.201_1)
    } else if h <= TOP_OF_MODEL_KM {
        3.956_420 * (214.65 / temperature).powf(-17.081_6)
    } else {
        0.0
    }
}

/// Ideal-gas density (kg/m^3).
pub fn air_density(pressure: f64, temperature: f64) -> f64 {
    if temperature > 0.0 {
        pressure / (AIR_GAS_CONSTANT * temperature)
    } else {
        0.0
    }
}

/// Standard atmosphere at a geometric altitude in metres.
pub fn isa(altitude_m: f64) -> Atmo {
    let geopot = geopotential(altitude_m / 1000.0);
    let temperature = standard_temperature(geopot);
    let pressure = standard_pressure(geopot, temperature);

    Atmo {
        density: air_density(pressure, temperature),
        pressure,
        temperature,
        sound_speed: (GAMMA * AIR_GAS_CONSTANT * temperature).sqrt(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::earth::SEA_LEVEL_AIR_DENSITY;

    #[test]
    fn sea_level_standard_values() {
        let a = isa(0.0);
        assert!((a.temperature - 288.15).abs() < 0.01);
        assert!((a.pressure - 101_325.0).abs() < 1.0);
        assert!((a.density - SEA_LEVEL_AIR_DENSITY).abs() < 0.001);
        assert!((a.sound_speed - 340.29).abs() < 0.1);
    }

    #[test]
    fn tropopause_11km() {
        let a = isa(11_019.0); // 11 km geopotential
        assert!((a.temperature - 216.65).abs() < 0.1);
        assert!((a.pressure - 22_632.0).abs() < 10.0);
    }

    #[test]
    fn layer_boundaries_are_continuous() {
        for h in [11.0, 20.0, 32.0, 47.0, 51.0, 71.0] {
            let below_t = standard_temperature(h - 1e-6);
            let above_t = standard_temperature(h + 1e-6);
            assert!((below_t - above_t).abs() < 1e-3, "temperature jump at {} km", h);
            let below_p = standard_pressure(h - 1e-6, below_t);
            let above_p = standard_pressure(h + 1e-6, above_t);
            assert!(
                (below_p - above_p).abs() / below_p < 1e-3,
                "pressure jump at {} km: {} vs {}",
                h,
                below_p,
                above_p
            );
        }
    }

    #[test]
    fn density_monotonically_decreases() {
        let mut prev = isa(-400.0).density;
        let mut h = -400.0;
        while h < 80_000.0 {
            h += 250.0;
            let rho = isa(h).density;
            assert!(rho < prev, "density must fall with altitude at {} m", h);
            prev = rho;
        }
    }

    #[test]
    fn below_sea_level_is_denser() {
        let a = isa(-400.0);
        assert!(a.temperature > 288.15);
        assert!(a.density > SEA_LEVEL_AIR_DENSITY);
    }

    #[test]
    fn vacuum_above_model_top() {
        let a = isa(100_000.0);
        assert_eq!(a.pressure, 0.0);
        assert_eq!(a.density, 0.0);
        assert!(a.temperature > 0.0);
    }
}
