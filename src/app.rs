/*
 * Application Module
 *
 * This module defines the main application model and logic for the
 * vehicle flocking simulation. It owns the window, forwards pointer
 * events to the simulation as obstacle commands, and renders vehicles
 * and obstacles every frame.
 */

use nannou::prelude::*;
use nannou::winit::event::MouseButton;
use nannou_egui::Egui;

use crate::debug::DebugInfo;
use crate::params::SimulationParams;
use crate::simulation::{Arena, BoundaryPolicy, Simulation};
use crate::ui;

const BACKGROUND: (f32, f32, f32) = (22.0 / 255.0, 0.0, 56.0 / 255.0);
// Alpha of the per-frame overlay that leaves motion trails behind vehicles
const TRAIL_ALPHA: f32 = 30.0 / 255.0;

// Main model for the application
pub struct Model {
    pub simulation: Simulation,
    pub params: SimulationParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub mouse_position: Vec2,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    // Get the primary monitor's dimensions
    let monitor = app.primary_monitor().expect("Failed to get primary monitor");
    let monitor_size = monitor.size();

    // Calculate window size based on monitor size (80% of monitor size)
    let window_width = monitor_size.width as f32 * 0.8;
    let window_height = monitor_size.height as f32 * 0.8;

    // Create the main window with dynamic size
    let window_id = app
        .new_window()
        .title("Vehicle Flocking Simulation")
        .size(window_width as u32, window_height as u32)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    // Get the window
    let window = app.window(window_id).unwrap();

    // Create the UI
    let egui = Egui::from_window(&window);

    let params = SimulationParams::default();

    // The window is the arena: the host hands its dimensions to the core
    let simulation = Simulation::new(Arena::new(window_width, window_height), &params);

    Model {
        simulation,
        params,
        egui,
        debug_info: DebugInfo::default(),
        mouse_position: Vec2::ZERO,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    // Update debug info
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let actions = ui::update_ui(&mut model.egui, &mut model.params, &model.debug_info);

    if actions.reset {
        model.simulation = Simulation::new(model.simulation.arena, &model.params);
    }
    if actions.clear_obstacles {
        model.simulation.obstacles.clear();
    }

    // Knobs that apply live, without a respawn
    model.simulation.use_quadtree = model.params.use_quadtree;
    model.simulation.boundary = model.params.boundary;
    for vehicle in &mut model.simulation.vehicles {
        vehicle.max_speed = model.params.max_speed;
        vehicle.vision_radius = model.params.vision_radius;
    }

    // Only advance the simulation if it is not paused
    if !model.params.pause_simulation {
        model.simulation.step();
    }
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    // Begin drawing
    let draw = app.draw();
    let (r, g, b) = BACKGROUND;

    if frame.nth() == 0 {
        draw.background().color(rgb(r, g, b));
    } else {
        // Translucent pass over the previous frame leaves motion trails
        let window_rect = app.window_rect();
        draw.rect()
            .wh(window_rect.wh())
            .color(rgba(r, g, b, TRAIL_ALPHA));
    }

    let arena = &model.simulation.arena;
    for obstacle in &model.simulation.obstacles {
        obstacle.draw(&draw, arena);
    }
    for vehicle in &model.simulation.vehicles {
        vehicle.draw(&draw, arena);
    }

    // Draw debug overlay if enabled
    if model.params.show_debug {
        let window_rect = app.window_rect();
        let x = window_rect.left() + 100.0;

        draw.text(&format!("FPS: {:.1}", model.debug_info.fps))
            .x_y(x, window_rect.top() - 20.0)
            .color(WHITE)
            .font_size(14);

        draw.text(&format!("Vehicles: {}", model.simulation.vehicles.len()))
            .x_y(x, window_rect.top() - 40.0)
            .color(WHITE)
            .font_size(14);

        draw.text(&format!("Obstacles: {}", model.simulation.obstacles.len()))
            .x_y(x, window_rect.top() - 60.0)
            .color(WHITE)
            .font_size(14);

        let mode = if model.simulation.use_quadtree {
            "quadtree"
        } else {
            "linear scan"
        };
        draw.text(&format!("Neighbor search: {}", mode))
            .x_y(x, window_rect.top() - 80.0)
            .color(WHITE)
            .font_size(14);

        let boundary = match model.simulation.boundary {
            BoundaryPolicy::Wrap => "wrap",
            BoundaryPolicy::SteerAway => "steer away",
        };
        draw.text(&format!("Boundary: {}", boundary))
            .x_y(x, window_rect.top() - 100.0)
            .color(WHITE)
            .font_size(14);
    }

    // Finish drawing
    draw.to_frame(app, &frame).unwrap();

    // Draw the egui UI
    model.egui.draw_to_frame(&frame).unwrap();
}

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    model.mouse_position = vec2(pos.x, pos.y);
}

// Mouse pressed event handler: pointer events become obstacle commands
pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    // Ignore clicks on the UI
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    let p = model.simulation.arena.from_view(model.mouse_position);
    match button {
        MouseButton::Left => model.simulation.place_obstacle(p.x, p.y),
        MouseButton::Right => model.simulation.remove_obstacle_near(p.x, p.y),
        _ => {}
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
