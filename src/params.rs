/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains all the
 * adjustable parameters for the vehicle simulation. These parameters can
 * be modified through the UI.
 */

use crate::simulation::BoundaryPolicy;
use crate::vehicle;

// Parameters for the simulation that can be adjusted via UI
#[derive(Clone)]
pub struct SimulationParams {
    pub num_flocks: usize,
    pub vehicles_per_flock: usize,
    pub max_speed: f32,
    pub vision_radius: f32,
    pub use_quadtree: bool,
    pub boundary: BoundaryPolicy,
    pub show_debug: bool,
    pub pause_simulation: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_flocks: 6,
            vehicles_per_flock: 100,
            max_speed: vehicle::MAX_SPEED,
            vision_radius: vehicle::VISION_RADIUS,
            use_quadtree: true,
            boundary: BoundaryPolicy::Wrap,
            show_debug: false,
            pause_simulation: false,
        }
    }
}

impl SimulationParams {
    // Get parameter ranges for UI sliders
    pub fn get_num_flocks_range() -> std::ops::RangeInclusive<usize> {
        1..=12
    }

    pub fn get_vehicles_per_flock_range() -> std::ops::RangeInclusive<usize> {
        10..=400
    }

    pub fn get_max_speed_range() -> std::ops::RangeInclusive<f32> {
        1.0..=10.0
    }

    pub fn get_vision_radius_range() -> std::ops::RangeInclusive<f32> {
        50.0..=300.0
    }
}
