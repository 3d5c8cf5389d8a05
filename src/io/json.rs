use std::io::{self, Write};

use serde::Serialize;

use crate::math;
use crate::sim::{SimResult, TelemetrySample};
use crate::vehicle::MultiRotorParams;

/// Summary statistics computed from recorded telemetry.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub max_altitude_m: f64,
    pub max_altitude_time_s: f64,
    pub max_climb_rate_ms: f64,
    pub max_speed_ms: f64,
    pub max_tilt_deg: f64,
    pub min_air_density: f64,
    pub mean_rotor_signal: f64,
    pub flight_time_s: f64,
    pub final_speed_ms: f64,
}

impl FlightSummary {
    /// `None` for empty telemetry.
    pub fn from_samples(samples: &[TelemetrySample]) -> Option<Self> {
        let last = samples.last()?;
        let peak = samples
            .iter()
            .max_by(|a, b| a.kinematics.altitude().total_cmp(&b.kinematics.altitude()))?;

        let max_climb_rate = samples
            .iter()
            .map(|s| -s.kinematics.twist.linear.z)
            .fold(0.0_f64, f64::max);

        let max_speed = samples
            .iter()
            .map(|s| s.kinematics.twist.linear.norm())
            .fold(0.0_f64, f64::max);

        // tilt of body z from local down
        let max_tilt = samples
            .iter()
            .map(|s| {
                let q = s.kinematics.pose.orientation.quaternion();
                let (pitch, roll, _) = math::to_eulerian_angle(q);
                (pitch.cos() * roll.cos()).clamp(-1.0, 1.0).acos()
            })
            .fold(0.0_f64, f64::max);

        let min_density = samples
            .iter()
            .map(|s| s.environment.air_density)
            .fold(f64::INFINITY, f64::min);

        let (sum, count) = samples
            .iter()
            .flat_map(|s| s.signals.iter())
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));

        Some(FlightSummary {
            max_altitude_m: peak.kinematics.altitude(),
            max_altitude_time_s: peak.kinematics.time,
            max_climb_rate_ms: max_climb_rate,
            max_speed_ms: max_speed,
            max_tilt_deg: max_tilt.to_degrees(),
            min_air_density: min_density,
            mean_rotor_signal: if count > 0 { sum / count as f64 } else { 0.0 },
            flight_time_s: last.kinematics.time,
            final_speed_ms: last.kinematics.twist.linear.norm(),
        })
    }
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    vehicle: VehicleInfo<'a>,
    performance: &'a FlightSummary,
    events: Vec<EventRecord>,
    halted: Option<String>,
}

#[derive(Serialize)]
struct VehicleInfo<'a> {
    name: &'a str,
    mass_kg: f64,
    rotors: usize,
    thrust_to_weight: f64,
}

#[derive(Serialize)]
struct EventRecord {
    time_s: f64,
    event: String,
}

/// Write flight summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    params: &MultiRotorParams,
    result: &SimResult,
    summary: &FlightSummary,
) -> io::Result<()> {
    let doc = SummaryDocument {
        vehicle: VehicleInfo {
            name: &params.name,
            mass_kg: params.mass,
            rotors: params.rotor_count(),
            thrust_to_weight: params.thrust_to_weight(),
        },
        performance: summary,
        events: result
            .events
            .iter()
            .map(|e| EventRecord { time_s: e.time, event: format!("{:?}", e.kind) })
            .collect(),
        halted: result.halted.as_ref().map(|e| e.to_string()),
    };
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(
    path: &str,
    params: &MultiRotorParams,
    result: &SimResult,
    summary: &FlightSummary,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, params, result, summary)
}
