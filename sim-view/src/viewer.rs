//! Interactive 3D aggregation viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the [`Simulator`] and a
//! pending [`Config`] and implements [`eframe::App`] to render and control
//! the simulation through an egui UI.

use crate::camera::{OrbitCamera, Projected};
use dla_core::{Config, ConfigError, NeighborPolicy, Simulator};
use eframe::App;
use tracing::{info, warn};

const ATTACHED_COLOR: egui::Color32 = egui::Color32::from_rgb(51, 51, 255);
const FREE_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 51, 51);
const FRESH_COLOR: egui::Color32 = egui::Color32::from_rgb(140, 210, 255);

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: a [`Simulator`] stepped at a fixed cadence.
/// - A pending [`Config`] edited in the side panel and applied on demand.
/// - An [`OrbitCamera`] and the eframe/egui callbacks for drawing and input.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render the particles back to front.
///
/// ### Fields
/// - `sim` - The running simulation.
/// - `cfg` - Configuration being edited; only takes effect on apply.
/// - `config_error` - Rejection message from the last apply, if any.
///
/// - `camera` - Orbit camera used for projection.
/// - `running` - Whether the simulation is currently auto-advancing.
///
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    sim: Simulator,
    cfg: Config,
    config_error: Option<String>,

    camera: OrbitCamera,
    running: bool,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a running viewer around a fresh simulator built from `cfg`.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        let sim = Simulator::new(cfg.clone())?;

        Ok(Self {
            sim,
            cfg,
            config_error: None,
            camera: OrbitCamera::default(),
            running: true,
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        })
    }

    /// Restarts the simulation with the configuration it is currently using.
    ///
    /// Without a fixed seed the restart draws a new one.
    fn reset(&mut self) {
        match Simulator::new(self.sim.config().clone()) {
            Ok(sim) => self.sim = sim,
            // The running config was validated when the simulator was built.
            Err(err) => warn!(%err, "reset rejected the running configuration"),
        }
    }

    /// Rebuilds the simulation from the edited configuration.
    ///
    /// On rejection the current simulation keeps running and the error is
    /// shown in the config panel.
    fn apply_config(&mut self) {
        match Simulator::new(self.cfg.clone()) {
            Ok(sim) => {
                info!(seed = sim.seed(), "applied new configuration");
                self.sim = sim;
                self.config_error = None;
            }
            Err(err) => {
                warn!(%err, "configuration rejected");
                self.config_error = Some(err.to_string());
            }
        }
    }

    /// Advances the simulation by a single step.
    fn step_once(&mut self) {
        self.sim.step();
    }

    /// Projects every particle and orders them back to front.
    fn projected_particles(&self, rect: egui::Rect) -> Vec<(Projected, egui::Color32)> {
        let fresh = self.sim.last_attached();
        let mut out: Vec<(Projected, egui::Color32)> = self
            .sim
            .snapshot()
            .iter()
            .enumerate()
            .filter_map(|(id, p)| {
                let projected = self.camera.project(p.pos, p.radius, rect)?;
                let color = if fresh.contains(&id) {
                    FRESH_COLOR
                } else if p.attached {
                    ATTACHED_COLOR
                } else {
                    FREE_COLOR
                };
                Some((projected, color))
            })
            .collect();

        out.sort_by(|a, b| b.0.depth.total_cmp(&a.0.depth));
        out
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.001..=1.0)
                        .speed(0.001),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(
                    egui::Slider::new(&mut self.camera.distance, 0.5..=20.0)
                        .logarithmic(true)
                        .text("Distance"),
                );
            });
        });
    }

    /// Builds the bottom status bar (tick, cluster size, seed).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("seed = {}", self.sim.seed()));
                ui.label(format!("tick = {}", self.sim.tick()));
                ui.label(format!("free = {}", self.sim.free_count()));
                ui.label(format!("attached = {}", self.sim.attached_count()));
            });
        });
    }

    /// Builds the right-hand configuration panel for simulation parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Population");
                Self::labeled_drag_usize(
                    ui,
                    "particle_count:",
                    &mut self.cfg.particle_count,
                    0..=5000,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "particle_radius:",
                    &mut self.cfg.particle_radius,
                    0.001..=0.5,
                    0.001,
                );
                Self::labeled_drag_f32(ui, "boundary:", &mut self.cfg.boundary, 0.05..=10.0, 0.01);

                ui.separator();
                ui.label("Motion");
                Self::labeled_drag_f32(
                    ui,
                    "brownian_scale:",
                    &mut self.cfg.brownian_scale,
                    0.0..=0.5,
                    0.001,
                );
                Self::labeled_drag_f32(
                    ui,
                    "initial_speed:",
                    &mut self.cfg.initial_speed,
                    0.0..=0.1,
                    0.0001,
                );

                ui.separator();
                ui.label("Aggregation");
                Self::labeled_drag_f32(
                    ui,
                    "attraction_range:",
                    &mut self.cfg.attraction_range,
                    0.0..=2.0,
                    0.005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "attraction_force:",
                    &mut self.cfg.attraction_force,
                    0.0..=0.01,
                    0.0001,
                );
                Self::labeled_drag_f32(
                    ui,
                    "attach_factor:",
                    &mut self.cfg.attach_threshold_factor,
                    0.01..=1.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "growth_increment:",
                    &mut self.cfg.growth_increment,
                    0.0..=0.1,
                    0.001,
                );

                egui::ComboBox::from_label("neighbor policy")
                    .selected_text(match self.cfg.neighbor_policy {
                        NeighborPolicy::StepSnapshot => "step snapshot",
                        NeighborPolicy::LiveScan => "live scan",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.cfg.neighbor_policy,
                            NeighborPolicy::StepSnapshot,
                            "step snapshot",
                        );
                        ui.selectable_value(
                            &mut self.cfg.neighbor_policy,
                            NeighborPolicy::LiveScan,
                            "live scan",
                        );
                    });

                ui.separator();
                let mut fixed_seed = self.cfg.seed.is_some();
                ui.horizontal(|ui| {
                    ui.checkbox(&mut fixed_seed, "fixed seed");
                    if let Some(seed) = self.cfg.seed.as_mut() {
                        ui.add(egui::DragValue::new(seed));
                    }
                });
                if fixed_seed != self.cfg.seed.is_some() {
                    self.cfg.seed = fixed_seed.then(|| self.sim.seed());
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Apply & reset").clicked() {
                        self.apply_config();
                    }
                    if ui.button("Defaults").clicked() {
                        self.cfg = Config::default();
                    }
                });

                if let Some(err) = &self.config_error {
                    ui.colored_label(egui::Color32::RED, err);
                }
            });
    }

    /// Builds the central panel where the particles are drawn and the camera is driven.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Orbit with drag.
            if response.dragged() {
                self.camera.orbit(response.drag_delta());
            }

            // Zoom with the scroll wheel.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 && response.hovered() {
                let factor = (1.0 - scroll * 0.001).clamp(0.5, 2.0);
                self.camera.zoom(factor);
            }

            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(12));

            for (p, color) in self.projected_particles(rect) {
                let r = p.radius.max(1.0);
                painter.circle_filled(p.center, r, color);
                // Fake specular highlight for a bit of depth.
                painter.circle_filled(
                    p.center + egui::vec2(-0.3 * r, -0.3 * r),
                    0.3 * r,
                    color.lerp_to_gamma(egui::Color32::WHITE, 0.35),
                );
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
