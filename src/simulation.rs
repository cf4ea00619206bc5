/*
 * Simulation Module
 *
 * This module owns the vehicle and obstacle collections and runs the
 * per-frame update: rebuild the spatial index (when enabled), then walk
 * the vehicles in a fixed order applying the steering pipeline. Vehicles
 * are updated one at a time, so a vehicle later in the pass sees the
 * already-moved positions of earlier ones; this order-dependent pass is
 * part of the reference behavior, not an accident.
 *
 * Arena bounds and the obstacle list travel as plain parameters into the
 * vehicle methods; vehicles hold no reference back to the simulation.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::obstacle::Obstacle;
use crate::params::SimulationParams;
use crate::quadtree::{QuadTree, Square};
use crate::vehicle::{SteeringWeights, Vehicle};
use crate::RENDER_BUFFER;

// One color per flock, cycled if there are more flocks than colors
const FLOCK_COLORS: [(u8, u8, u8); 6] = [
    (237, 174, 7),
    (240, 41, 99),
    (43, 90, 237),
    (200, 200, 200),
    (174, 8, 250),
    (19, 92, 1),
];

/// Host-supplied bounds of the simulated area. Arena coordinates are
/// corner-origin with y growing downward; `to_view`/`from_view` convert
/// to and from the window's centered, y-up space.
#[derive(Clone, Copy, Debug)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        assert!(
            width > 0.0 && height > 0.0,
            "arena dimensions must be positive"
        );
        Self { width, height }
    }

    pub fn to_view(&self, p: Point2) -> Point2 {
        pt2(p.x - self.width / 2.0, self.height / 2.0 - p.y)
    }

    pub fn from_view(&self, p: Point2) -> Point2 {
        pt2(p.x + self.width / 2.0, self.height / 2.0 - p.y)
    }
}

/// What happens at the arena boundary. Exactly one policy is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Teleport to the opposite side (toroidal space)
    Wrap,
    /// Steer back towards the interior inside the edge margin
    SteerAway,
}

pub struct Simulation {
    pub vehicles: Vec<Vehicle>,
    pub obstacles: Vec<Obstacle>,
    pub arena: Arena,
    pub boundary: BoundaryPolicy,
    pub use_quadtree: bool,
}

impl Simulation {
    /// Spawn `num_flocks` flocks of `vehicles_per_flock` vehicles each at
    /// random positions. Every flock draws its own steering-weight triple
    /// and gets a palette color.
    pub fn new(arena: Arena, params: &SimulationParams) -> Self {
        let mut rng = rand::thread_rng();
        let mut vehicles = Vec::with_capacity(params.num_flocks * params.vehicles_per_flock);

        for flock_id in 0..params.num_flocks {
            let weights = SteeringWeights {
                alignment: rng.gen_range(0.8..1.5),
                cohesion: rng.gen_range(0.8..1.5),
                separation: rng.gen_range(1.1..1.6),
            };
            let (r, g, b) = FLOCK_COLORS[flock_id % FLOCK_COLORS.len()];

            for _ in 0..params.vehicles_per_flock {
                let x = rng.gen_range(0.0..arena.width);
                let y = rng.gen_range(0.0..arena.height);
                let mut vehicle = Vehicle::new(x, y, flock_id, weights, rgb(r, g, b));
                vehicle.max_speed = params.max_speed;
                vehicle.vision_radius = params.vision_radius;
                vehicles.push(vehicle);
            }
        }

        Self {
            vehicles,
            obstacles: Vec::new(),
            arena,
            boundary: params.boundary,
            use_quadtree: params.use_quadtree,
        }
    }

    /// Build this frame's spatial index from current vehicle positions.
    /// The root covers the whole arena plus the render buffer; entries are
    /// indices into `self.vehicles`.
    pub fn build_index(&self) -> QuadTree<usize> {
        let half = self.arena.width.max(self.arena.height) / 2.0 + RENDER_BUFFER;
        let boundary = Square::new(self.arena.width / 2.0, self.arena.height / 2.0, half);

        let mut index = QuadTree::new(boundary);
        for (i, vehicle) in self.vehicles.iter().enumerate() {
            index.insert(vehicle.position, i);
        }
        index
    }

    /// Advance the simulation by one frame tick.
    pub fn step(&mut self) {
        let index = if self.use_quadtree {
            Some(self.build_index())
        } else {
            None
        };
        let arena = self.arena;

        for i in 0..self.vehicles.len() {
            let force =
                self.vehicles[i].flock_force(i, &self.vehicles, index.as_ref(), &self.obstacles);

            let vehicle = &mut self.vehicles[i];
            vehicle.apply_force(force);
            match self.boundary {
                BoundaryPolicy::Wrap => {
                    vehicle.update();
                    vehicle.wrap_edges(&arena);
                }
                BoundaryPolicy::SteerAway => {
                    vehicle.avoid_edges(&arena);
                    vehicle.update();
                }
            }
        }
    }

    /// Host command: drop a new obstacle at the given arena coordinates.
    pub fn place_obstacle(&mut self, x: f32, y: f32) {
        self.obstacles.push(Obstacle::new(x, y));
    }

    /// Host command: remove every obstacle whose circle covers the given
    /// arena coordinates.
    pub fn remove_obstacle_near(&mut self, x: f32, y: f32) {
        self.obstacles.retain(|obstacle| !obstacle.hit_test(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::OBSTACLE_RADIUS;

    fn small_params() -> SimulationParams {
        SimulationParams {
            num_flocks: 2,
            vehicles_per_flock: 15,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn spawn_fills_every_flock() {
        let params = small_params();
        let sim = Simulation::new(Arena::new(800.0, 600.0), &params);

        assert_eq!(sim.vehicles.len(), 30);
        for flock_id in 0..params.num_flocks {
            let members = sim
                .vehicles
                .iter()
                .filter(|v| v.flock_id == flock_id)
                .count();
            assert_eq!(members, params.vehicles_per_flock);
        }
    }

    #[test]
    fn index_holds_every_vehicle() {
        let sim = Simulation::new(Arena::new(800.0, 600.0), &small_params());
        let index = sim.build_index();
        assert_eq!(index.len(), sim.vehicles.len());
    }

    #[test]
    fn step_preserves_kinematic_invariants() {
        let mut sim = Simulation::new(Arena::new(800.0, 600.0), &small_params());
        for _ in 0..20 {
            sim.step();
        }

        for vehicle in &sim.vehicles {
            assert!(vehicle.velocity.length() <= vehicle.max_speed + 1e-3);
            assert_eq!(vehicle.acceleration, Vec2::ZERO);
            assert!(vehicle.position.x >= -RENDER_BUFFER - 1e-3);
            assert!(vehicle.position.x <= sim.arena.width + RENDER_BUFFER + 1e-3);
            assert!(vehicle.position.y >= -RENDER_BUFFER - 1e-3);
            assert!(vehicle.position.y <= sim.arena.height + RENDER_BUFFER + 1e-3);
        }
    }

    #[test]
    fn linear_scan_mode_keeps_the_same_invariants() {
        let mut params = small_params();
        params.use_quadtree = false;
        let mut sim = Simulation::new(Arena::new(800.0, 600.0), &params);
        for _ in 0..10 {
            sim.step();
        }

        for vehicle in &sim.vehicles {
            assert!(vehicle.velocity.length() <= vehicle.max_speed + 1e-3);
            assert_eq!(vehicle.acceleration, Vec2::ZERO);
        }
    }

    #[test]
    fn obstacles_are_placed_and_removed_by_hit_test() {
        let mut sim = Simulation::new(Arena::new(800.0, 600.0), &small_params());
        sim.place_obstacle(100.0, 100.0);
        sim.place_obstacle(300.0, 300.0);
        assert_eq!(sim.obstacles.len(), 2);

        // A miss leaves both in place
        sim.remove_obstacle_near(100.0 + OBSTACLE_RADIUS, 100.0);
        assert_eq!(sim.obstacles.len(), 2);

        sim.remove_obstacle_near(102.0, 99.0);
        assert_eq!(sim.obstacles.len(), 1);
        assert_eq!(sim.obstacles[0].position, pt2(300.0, 300.0));
    }

    #[test]
    fn view_transform_round_trips() {
        let arena = Arena::new(800.0, 600.0);
        let p = pt2(120.0, 450.0);
        let round_trip = arena.from_view(arena.to_view(p));
        assert!((round_trip - p).length() < 1e-4);
    }
}
