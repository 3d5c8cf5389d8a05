use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use drone_sim::math;
use drone_sim::sim::{self, runner, SimResult, TelemetrySample};
use drone_sim::types::{GeoPoint, SimConfig};
use drone_sim::vehicle::{presets, MultiRotorParams};

fn main() -> eframe::Result {
    env_logger::init();

    let vehicle = presets::quad_x();
    let config = SimConfig { dt: 0.003, max_time: 20.0 };
    let home = GeoPoint::new(47.641468, -122.140165, 122.0);
    let pilot = runner::climb_and_land(5.0, 10.0, vehicle.hover_signal());
    let result = match sim::simulate(&vehicle, &config, home, pilot) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("simulation failed: {}", e);
            SimResult::default()
        }
    };

    let app = SimViz { result, vehicle };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Multirotor Flight Simulator", options, Box::new(|_| Ok(Box::new(app))))
}

struct SimViz {
    result: SimResult,
    vehicle: MultiRotorParams,
}

fn series(
    samples: &[&TelemetrySample],
    f: impl Fn(&TelemetrySample) -> f64,
) -> PlotPoints<'static> {
    samples.iter().map(|s| [s.kinematics.time, f(s)]).collect()
}

impl eframe::App for SimViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let step = (self.result.samples.len() / 2000).max(1);
        let sampled: Vec<&TelemetrySample> = self.result.samples.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Vehicle: {}", self.vehicle.name));
            ui.label(format!(
                "Max altitude: {:.2} m  |  Rotors: {}  |  TWR: {:.2}  |  Events: {}  |  Flight: {:.1} s",
                self.result.max_altitude().max(0.0),
                self.vehicle.rotor_count(),
                self.vehicle.thrust_to_weight(),
                self.result.events.len(),
                self.result.final_state().map_or(0.0, |s| s.time),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Altitude (m)");
                    let points = series(&sampled, |s| s.kinematics.altitude());
                    Plot::new("altitude")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Altitude", points));
                        });
                });

                ui.vertical(|ui| {
                    ui.label("Air density (kg/m^3)");
                    let points = series(&sampled, |s| s.environment.air_density);
                    Plot::new("density")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Density", points));
                        });
                });
            });

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Attitude (deg)");
                    let euler = |s: &TelemetrySample| {
                        math::to_eulerian_angle(s.kinematics.pose.orientation.quaternion())
                    };
                    let pitch = series(&sampled, |s| euler(s).0.to_degrees());
                    let roll = series(&sampled, |s| euler(s).1.to_degrees());
                    let yaw = series(&sampled, |s| euler(s).2.to_degrees());
                    Plot::new("attitude")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Pitch", pitch));
                            plot_ui.line(Line::new("Roll", roll));
                            plot_ui.line(Line::new("Yaw", yaw));
                        });
                });

                ui.vertical(|ui| {
                    ui.label("Rotor signals");
                    let rotors = sampled.first().map_or(0, |s| s.signals.len());
                    let lines: Vec<Line> = (0..rotors)
                        .map(|i| {
                            let pts =
                                series(&sampled, |s| s.signals.get(i).copied().unwrap_or(0.0));
                            Line::new(format!("Rotor {}", i), pts)
                        })
                        .collect();
                    Plot::new("signals")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            for line in lines {
                                plot_ui.line(line);
                            }
                        });
                });
            });
        });
    }
}
