use std::io::{self, Write};

use crate::math;
use crate::sim::TelemetrySample;

/// Write telemetry to CSV format.
///
/// Columns: time, pos_n, pos_e, pos_d, vel_n, vel_e, vel_d,
///          quat_w, quat_x, quat_y, quat_z, rate_p, rate_q, rate_r,
///          roll_deg, pitch_deg, yaw_deg, lat, lon, alt,
///          air_density, air_pressure, temperature, rotor_0 .. rotor_{n-1}
///
/// The rotor column count follows the first sample.
pub fn write_telemetry<W: Write>(writer: &mut W, samples: &[TelemetrySample]) -> io::Result<()> {
    let rotors = samples.first().map_or(0, |s| s.signals.len());

    write!(
        writer,
        "time,pos_n,pos_e,pos_d,vel_n,vel_e,vel_d,\
         quat_w,quat_x,quat_y,quat_z,rate_p,rate_q,rate_r,\
         roll_deg,pitch_deg,yaw_deg,lat,lon,alt,\
         air_density,air_pressure,temperature"
    )?;
    for i in 0..rotors {
        write!(writer, ",rotor_{}", i)?;
    }
    writeln!(writer)?;

    for s in samples {
        let k = &s.kinematics;
        let e = &s.environment;
        let q = k.pose.orientation.quaternion();
        let (pitch, roll, yaw) = math::to_eulerian_angle(q);
        write!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},\
             {:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
             {:.2},{:.2},{:.2},{:.7},{:.7},{:.3},\
             {:.5},{:.1},{:.2}",
            k.time,
            k.pose.position.x, k.pose.position.y, k.pose.position.z,
            k.twist.linear.x, k.twist.linear.y, k.twist.linear.z,
            q.w, q.i, q.j, q.k,
            k.twist.angular.x, k.twist.angular.y, k.twist.angular.z,
            roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees(),
            e.geo_point.latitude, e.geo_point.longitude, e.geo_point.altitude,
            e.air_density, e.air_pressure, e.temperature,
        )?;
        for i in 0..rotors {
            write!(writer, ",{:.4}", s.signals.get(i).copied().unwrap_or(f64::NAN))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Write telemetry to a CSV file at the given path.
pub fn write_telemetry_file(path: &str, samples: &[TelemetrySample]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_telemetry(&mut file, samples)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::KinematicsState;
    use crate::physics::{Environment, EnvironmentState, GeoPoint};
    use nalgebra::Vector3;

    fn sample(time: f64, z: f64) -> TelemetrySample {
        let env = Environment::new(EnvironmentState::new(
            Vector3::zeros(),
            GeoPoint::new(47.641468, -122.140165, 0.0),
            0.0,
        ));
        let mut k = KinematicsState::at_rest(Vector3::new(0.0, 0.0, z));
        k.time = time;
        TelemetrySample { kinematics: k, environment: *env.state(), signals: vec![0.5; 4] }
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let samples = vec![sample(0.0, 0.0), sample(0.003, -0.01)];

        let mut buf = Vec::new();
        write_telemetry(&mut buf, &samples).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,"));
        assert!(lines[0].ends_with(",rotor_3"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].starts_with("0.0000,"));
        assert!(lines[2].ends_with(",0.5000"));

        let header_cols = lines[0].split(',').count();
        assert_eq!(header_cols, 23 + 4);
        assert_eq!(lines[1].split(',').count(), header_cols);
    }

    #[test]
    fn empty_telemetry_writes_header_only() {
        let mut buf = Vec::new();
        write_telemetry(&mut buf, &[]).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.trim_end().ends_with("temperature"));
    }
}
