/*
 * UI Module
 *
 * This module contains functions for creating and updating the user
 * interface using nannou_egui. It provides controls for adjusting
 * simulation parameters and reports which host actions were requested.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::SimulationParams;
use crate::simulation::BoundaryPolicy;

/// Actions requested through the control panel this frame.
#[derive(Default)]
pub struct UiActions {
    pub reset: bool,
    pub clear_obstacles: bool,
}

// Update the UI and collect the requested actions
pub fn update_ui(
    egui: &mut Egui,
    params: &mut SimulationParams,
    debug_info: &DebugInfo,
) -> UiActions {
    let mut actions = UiActions::default();
    let old_num_flocks = params.num_flocks;
    let old_flock_size = params.vehicles_per_flock;

    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Flocks", |ui| {
                ui.add(
                    egui::Slider::new(
                        &mut params.num_flocks,
                        SimulationParams::get_num_flocks_range(),
                    )
                    .text("Number of Flocks"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.vehicles_per_flock,
                        SimulationParams::get_vehicles_per_flock_range(),
                    )
                    .text("Vehicles per Flock"),
                );

                if ui.button("Respawn Flocks").clicked() {
                    actions.reset = true;
                }
            });

            ui.collapsing("Vehicle Awareness", |ui| {
                ui.add(
                    egui::Slider::new(&mut params.max_speed, SimulationParams::get_max_speed_range())
                        .text("Max Speed"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.vision_radius,
                        SimulationParams::get_vision_radius_range(),
                    )
                    .text("Vision Radius"),
                );
            });

            ui.collapsing("Boundary", |ui| {
                ui.radio_value(&mut params.boundary, BoundaryPolicy::Wrap, "Toroidal wrap");
                ui.radio_value(
                    &mut params.boundary,
                    BoundaryPolicy::SteerAway,
                    "Steer away from edges",
                );
            });

            ui.collapsing("Obstacles", |ui| {
                ui.label("Left click: place an obstacle");
                ui.label("Right click: remove obstacles under the cursor");
                if ui.button("Clear Obstacles").clicked() {
                    actions.clear_obstacles = true;
                }
            });

            ui.checkbox(&mut params.use_quadtree, "Use Quadtree Index");
            ui.checkbox(&mut params.show_debug, "Show Debug Info");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");

            if params.show_debug {
                ui.separator();
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!(
                    "Frame time: {:.2} ms",
                    debug_info.frame_time.as_secs_f64() * 1000.0
                ));
            }
        });

    // Resizing the population implies a respawn
    if params.num_flocks != old_num_flocks || params.vehicles_per_flock != old_flock_size {
        actions.reset = true;
    }

    actions
}
