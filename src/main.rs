use std::process::ExitCode;

use drone_sim::io::{self, FlightSummary};
use drone_sim::math::{self, QuaternionDisplay};
use drone_sim::sim::event::EventKind;
use drone_sim::sim::{self, runner, SimResult};
use drone_sim::types::{GeoPoint, SimConfig, G0};
use drone_sim::vehicle::presets;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // -----------------------------------------------------------------------
    // Vehicle & site
    // -----------------------------------------------------------------------
    let vehicle = presets::quad_x();
    let home = GeoPoint::new(47.641468, -122.140165, 122.0);
    let config = SimConfig { dt: 0.003, max_time: 20.0 };
    let target_alt = 5.0;
    let descend_at = 10.0;

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    let pilot = runner::climb_and_land(target_alt, descend_at, vehicle.hover_signal());
    let result = match sim::simulate(&vehicle, &config, home, pilot) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("simulation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(summary) = FlightSummary::from_samples(&result.samples) else {
        eprintln!("no telemetry recorded");
        return ExitCode::FAILURE;
    };

    print_report(&vehicle, &config, &result, &summary);

    if let Some(path) = std::env::args().nth(1) {
        let json_path = format!("{}.json", path.trim_end_matches(".csv"));
        let written = io::write_telemetry_file(&path, &result.samples)
            .and_then(|_| io::write_summary_file(&json_path, &vehicle, &result, &summary));
        match written {
            Ok(()) => println!("  Telemetry written to {} and {}", path, json_path),
            Err(e) => {
                eprintln!("export failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if result.halted.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_report(
    vehicle: &drone_sim::vehicle::MultiRotorParams,
    config: &SimConfig,
    result: &SimResult,
    summary: &FlightSummary,
) {
    println!();
    println!("====================================================================");
    println!("  MULTIROTOR FLIGHT SIMULATION: {}", vehicle.name);
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>8.2} kg    Rotors:       {:>8}",
        vehicle.mass,
        vehicle.rotor_count()
    );
    println!(
        "  Max thrust:    {:>8.2} N     TWR:          {:>8.2}",
        vehicle.max_total_thrust(),
        vehicle.thrust_to_weight()
    );
    println!(
        "  Hover signal:  {:>8.3}       Weight:       {:>8.2} N",
        vehicle.hover_signal(),
        vehicle.mass * G0
    );
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in &result.events {
        let label = match &e.kind {
            EventKind::Liftoff => "LIFTOFF".to_string(),
            EventKind::Touchdown => "TOUCHDOWN".to_string(),
            EventKind::AltitudeCrossed { altitude, ascending } => {
                format!("ALT {:.0}m {}", altitude, if *ascending { "UP" } else { "DOWN" })
            }
            EventKind::Halted(reason) => format!("HALT ({})", reason),
        };
        println!(
            "  {:<14} t={:>6.2}s   alt={:>7.2}m   vel={:>6.2}m/s",
            label,
            e.time,
            e.state.altitude(),
            e.state.twist.linear.norm()
        );
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Max altitude:  {:>8.2} m   at t={:.2} s",
        summary.max_altitude_m, summary.max_altitude_time_s
    );
    println!("  Max climb:     {:>8.2} m/s", summary.max_climb_rate_ms);
    println!("  Max speed:     {:>8.2} m/s", summary.max_speed_ms);
    println!("  Max tilt:      {:>8.3} deg", summary.max_tilt_deg);
    println!("  Min density:   {:>8.4} kg/m^3", summary.min_air_density);
    println!("  Mean signal:   {:>8.3}", summary.mean_rotor_signal);
    println!();

    // -----------------------------------------------------------------------
    // Telemetry table (sampled)
    // -----------------------------------------------------------------------
    println!("  Telemetry");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>8}  {:>8}  {:>9}  {:>12}  {}",
        "t (s)", "alt (m)", "vz (m/s)", "rho", "lat", "attitude [w,x,y,z]-[p,r,y]"
    );
    println!("  {}", "─".repeat(90));

    let sample_interval = (result.samples.len() / 25).max(1);
    for (i, s) in result.samples.iter().enumerate() {
        if i % sample_interval != 0 && i != result.samples.len() - 1 {
            continue;
        }
        let k = &s.kinematics;
        let q = k.pose.orientation.quaternion();
        let attitude = if math::has_nan_quaternion(q) {
            "n/a".to_string()
        } else {
            QuaternionDisplay::with_euler(q).to_string()
        };
        println!(
            "  {:>7.2}  {:>8.2}  {:>8.2}  {:>9.5}  {:>12.7}  {}",
            k.time,
            k.altitude(),
            k.twist.linear.z,
            s.environment.air_density,
            s.environment.geo_point.latitude,
            attitude
        );
    }

    println!();
    if !result.messages.is_empty() {
        println!("  Flight controller: {}", result.messages.join(" | "));
    }
    println!("  Simulation: {} steps, dt={} s", result.samples.len(), config.dt);
    println!("====================================================================");
    println!();
}
