/*
 * Vehicle Module
 *
 * This module defines the Vehicle struct and its steering behavior.
 * Each vehicle reacts only to the neighbors it can see and follows
 * four rules:
 * 1. Alignment: steer towards the average heading of same-flock neighbors
 * 2. Cohesion: steer towards the average position of same-flock neighbors
 * 3. Separation: avoid crowding neighbors of any flock
 * 4. Obstacle avoidance: steer away from nearby obstacles
 */

use nannou::prelude::*;
use rand::Rng;

use crate::math::Vec2Ext;
use crate::obstacle::Obstacle;
use crate::quadtree::{QuadTree, Square};
use crate::simulation::Arena;
use crate::{RENDER_BUFFER, VEHICLE_SIZE};

pub const MAX_SPEED: f32 = 4.0;
pub const MAX_FORCE: f32 = 0.2;
pub const VISION_RADIUS: f32 = 150.0;

// The invisible band, in radians: a neighbor whose bearing relative to the
// current heading falls inside [MIN, MAX] cannot be seen. Everything below
// or above the band is visible.
const MIN_VISION_ANGLE: f32 = 0.75;
const MAX_VISION_ANGLE: f32 = 1.25;

// Obstacle avoidance is weighted the same for every flock
const OBSTACLE_AVOIDANCE_WEIGHT: f32 = 2.0;

// Margin inside which the steer-away boundary policy pushes back
const EDGE_MARGIN: f32 = 150.0;

/// Per-flock steering weights: every member of a flock shares one triple.
#[derive(Clone, Copy, Debug)]
pub struct SteeringWeights {
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
}

#[derive(Clone)]
pub struct Vehicle {
    pub position: Point2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub max_speed: f32,
    pub max_force: f32,
    pub vision_radius: f32,
    pub flock_id: usize,
    pub weights: SteeringWeights,
    pub color: Rgb<u8>,
}

impl Vehicle {
    pub fn new(
        x: f32,
        y: f32,
        flock_id: usize,
        weights: SteeringWeights,
        color: Rgb<u8>,
    ) -> Self {
        let mut rng = rand::thread_rng();

        // Random initial velocity; the first update clamps it to max_speed
        let velocity = vec2(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));

        Self {
            position: pt2(x, y),
            velocity,
            acceleration: Vec2::ZERO,
            max_speed: MAX_SPEED,
            max_force: MAX_FORCE,
            vision_radius: VISION_RADIUS,
            flock_id,
            weights,
            color,
        }
    }

    // Apply a force to the vehicle
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Integrate one step: velocity from acceleration, position from
    /// velocity. Speed never exceeds max_speed and the acceleration is
    /// cleared so forces do not carry over between frames.
    pub fn update(&mut self) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.limit(self.max_speed);
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;
    }

    /// Whether `other` falls outside this vehicle's invisible band.
    fn in_view(&self, other: &Vehicle) -> bool {
        let to_other = other.position - self.position;
        let angle = self.velocity.unsigned_angle(to_other);
        !(MIN_VISION_ANGLE..=MAX_VISION_ANGLE).contains(&angle)
    }

    /// Neighbor discovery by full scan: every other vehicle within the
    /// vision radius and in view.
    pub fn neighbours(&self, self_idx: usize, vehicles: &[Vehicle]) -> Vec<usize> {
        let mut neighbours = Vec::new();
        for (i, other) in vehicles.iter().enumerate() {
            if i != self_idx
                && self.position.distance(other.position) <= self.vision_radius
                && self.in_view(other)
            {
                neighbours.push(i);
            }
        }
        neighbours
    }

    /// Neighbor discovery through the spatial index: query a padded square
    /// around this vehicle, then apply the same distance and visibility
    /// filter as the full scan. Both paths select the same neighbors.
    pub fn neighbours_quad(
        &self,
        self_idx: usize,
        vehicles: &[Vehicle],
        index: &QuadTree<usize>,
    ) -> Vec<usize> {
        let range = Square::new(
            self.position.x,
            self.position.y,
            self.vision_radius + RENDER_BUFFER,
        );
        let mut neighbours = Vec::new();
        for entry in index.query_range(&range) {
            let i = entry.data;
            if i != self_idx
                && self.position.distance(vehicles[i].position) <= self.vision_radius
                && self.in_view(&vehicles[i])
            {
                neighbours.push(i);
            }
        }
        neighbours
    }

    /// Steer towards the average heading of same-flock neighbors.
    pub fn alignment(&self, vehicles: &[Vehicle], neighbours: &[usize]) -> Vec2 {
        let mut steering = Vec2::ZERO;
        let mut total = 0;
        for &i in neighbours {
            let other = &vehicles[i];
            if other.flock_id == self.flock_id {
                steering += other.velocity;
                total += 1;
            }
        }
        if total > 0 {
            steering = steering.set_mag(self.max_speed);
            steering -= self.velocity;
            steering = steering.limit(self.max_force);
        }
        steering
    }

    /// Steer towards the center of the same-flock neighborhood.
    pub fn cohesion(&self, vehicles: &[Vehicle], neighbours: &[usize]) -> Vec2 {
        let mut steering = Vec2::ZERO;
        let mut total = 0;
        for &i in neighbours {
            let other = &vehicles[i];
            if other.flock_id == self.flock_id {
                steering += other.position;
                total += 1;
            }
        }
        if total > 0 {
            steering /= total as f32;
            steering -= self.position;
            steering = steering.set_mag(self.max_speed);
            steering -= self.velocity;
            steering = steering.limit(self.max_force);
        }
        steering
    }

    /// Steer away from all neighbors, weighted by adjacency. Neighbors at
    /// the exact same position are skipped so the distance weighting never
    /// divides by zero.
    pub fn separation(&self, vehicles: &[Vehicle], neighbours: &[usize]) -> Vec2 {
        let mut steering = Vec2::ZERO;
        for &i in neighbours {
            let other = &vehicles[i];
            let dist = self.position.distance(other.position);
            if dist != 0.0 {
                steering += (self.position - other.position) / dist;
            }
        }
        if !neighbours.is_empty() {
            steering /= neighbours.len() as f32;
            steering = steering.set_mag(self.max_speed);
            steering -= self.velocity;
            steering = steering.limit(self.max_force);
        }
        steering
    }

    /// Steer away from every obstacle close enough to matter, with the
    /// push falling off by distance. Evaluated against the global obstacle
    /// list, not the neighbor set.
    pub fn obstacle_avoidance(&self, obstacles: &[Obstacle]) -> Vec2 {
        let mut steering = Vec2::ZERO;
        for obstacle in obstacles {
            let dist = self.position.distance(obstacle.position);
            if dist <= (self.vision_radius + obstacle.radius) * 1.25 {
                let steer_away = (self.position - obstacle.position).set_mag(self.max_speed)
                    / ((dist + obstacle.radius) * 1.2);
                steering += steer_away;
            }
        }
        steering
    }

    /// Combined steering force for this frame. With no visible neighbors
    /// the vehicle coasts: no forces at all, obstacle avoidance included.
    pub fn flock_force(
        &self,
        self_idx: usize,
        vehicles: &[Vehicle],
        index: Option<&QuadTree<usize>>,
        obstacles: &[Obstacle],
    ) -> Vec2 {
        let neighbours = match index {
            Some(tree) => self.neighbours_quad(self_idx, vehicles, tree),
            None => self.neighbours(self_idx, vehicles),
        };
        if neighbours.is_empty() {
            return Vec2::ZERO;
        }

        let mut force = self.alignment(vehicles, &neighbours) * self.weights.alignment;
        force += self.cohesion(vehicles, &neighbours) * self.weights.cohesion;
        force += self.separation(vehicles, &neighbours) * self.weights.separation;
        force += self.obstacle_avoidance(obstacles) * OBSTACLE_AVOIDANCE_WEIGHT;
        force
    }

    /// Toroidal boundary: a vehicle leaving the arena by more than the
    /// render buffer re-enters from the opposite side. Axes wrap
    /// independently, so a diagonal exit wraps both coordinates at once.
    pub fn wrap_edges(&mut self, arena: &Arena) {
        if self.position.x < -RENDER_BUFFER {
            self.position.x = arena.width + RENDER_BUFFER;
        }
        if self.position.x > arena.width + RENDER_BUFFER {
            self.position.x = -RENDER_BUFFER;
        }
        if self.position.y < -RENDER_BUFFER {
            self.position.y = arena.height + RENDER_BUFFER;
        }
        if self.position.y > arena.height + RENDER_BUFFER {
            self.position.y = -RENDER_BUFFER;
        }
    }

    /// Steer-away boundary: inside the edge margin, the desired velocity
    /// overrides the offending axis component to point back into the arena.
    /// Alternative to wrap_edges; the simulation runs exactly one of them.
    pub fn avoid_edges(&mut self, arena: &Arena) {
        let mut desired = self.velocity;
        if self.position.x < EDGE_MARGIN {
            desired.x = self.max_speed;
        }
        if self.position.x > arena.width - EDGE_MARGIN {
            desired.x = -self.max_speed;
        }
        if self.position.y < EDGE_MARGIN {
            desired.y = self.max_speed;
        }
        if self.position.y > arena.height - EDGE_MARGIN {
            desired.y = -self.max_speed;
        }
        let steering = (desired - self.velocity)
            .set_mag(self.max_speed)
            .limit(2.0 * self.max_force);
        self.apply_force(steering);
    }

    /// Orientation for the host's oriented marker.
    pub fn heading(&self) -> f32 {
        self.velocity.heading()
    }

    // Draw the vehicle as a triangle rotated towards its heading
    pub fn draw(&self, draw: &Draw, arena: &Arena) {
        // Arena space is y-down, view space is y-up
        let angle = -self.heading();

        // Alternating flocks get slightly different marker sizes
        let size = VEHICLE_SIZE + (self.flock_id % 2) as f32;
        let points = [
            pt2(size * 2.0, 0.0),
            pt2(-size * 2.0, size),
            pt2(-size * 2.0, -size),
        ];

        draw.polygon()
            .color(self.color)
            .points(points)
            .xy(arena.to_view(self.position))
            .rotate(angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn test_weights() -> SteeringWeights {
        SteeringWeights {
            alignment: 1.0,
            cohesion: 1.0,
            separation: 1.0,
        }
    }

    fn test_vehicle(x: f32, y: f32, flock_id: usize) -> Vehicle {
        let mut vehicle = Vehicle::new(x, y, flock_id, test_weights(), rgb(200, 200, 200));
        vehicle.velocity = vec2(1.0, 0.0);
        vehicle
    }

    fn arena() -> Arena {
        Arena::new(1000.0, 800.0)
    }

    #[test]
    fn update_clamps_speed_and_resets_acceleration() {
        let mut vehicle = test_vehicle(0.0, 0.0, 0);
        vehicle.apply_force(vec2(5000.0, -3000.0));
        vehicle.update();

        assert!(vehicle.velocity.length() <= vehicle.max_speed + EPS);
        assert_eq!(vehicle.acceleration, Vec2::ZERO);
    }

    #[test]
    fn update_leaves_slow_velocity_alone() {
        let mut vehicle = test_vehicle(0.0, 0.0, 0);
        vehicle.velocity = vec2(0.5, 0.5);
        vehicle.update();

        assert!((vehicle.velocity - vec2(0.5, 0.5)).length() < EPS);
        assert_eq!(vehicle.position, pt2(0.5, 0.5));
    }

    #[test]
    fn wrap_is_identity_inside_the_arena() {
        let arena = arena();
        let mut vehicle = test_vehicle(500.0, 400.0, 0);
        vehicle.wrap_edges(&arena);
        assert_eq!(vehicle.position, pt2(500.0, 400.0));
    }

    #[test]
    fn wrap_relocates_past_the_buffer() {
        let arena = arena();
        let mut vehicle = test_vehicle(arena.width + RENDER_BUFFER + 1.0, 400.0, 0);
        vehicle.wrap_edges(&arena);
        assert_eq!(vehicle.position.x, -RENDER_BUFFER);
        assert_eq!(vehicle.position.y, 400.0);
    }

    #[test]
    fn wrap_handles_both_axes_in_one_step() {
        let arena = arena();
        let mut vehicle = test_vehicle(-RENDER_BUFFER - 5.0, arena.height + RENDER_BUFFER + 5.0, 0);
        vehicle.wrap_edges(&arena);
        assert_eq!(vehicle.position.x, arena.width + RENDER_BUFFER);
        assert_eq!(vehicle.position.y, -RENDER_BUFFER);
    }

    #[test]
    fn neighbours_respect_the_invisible_band() {
        // Self heads along +x; bearings are measured from the velocity
        let mut vehicles = vec![test_vehicle(0.0, 0.0, 0)];

        // Directly ahead, bearing 0 < 0.75: visible
        vehicles.push(test_vehicle(50.0, 0.0, 0));
        // Bearing 1.0 falls inside [0.75, 1.25]: invisible
        let bearing = 1.0f32;
        vehicles.push(test_vehicle(
            50.0 * bearing.cos(),
            50.0 * bearing.sin(),
            0,
        ));
        // Directly behind, bearing PI > 1.25: visible
        vehicles.push(test_vehicle(-50.0, 0.0, 0));
        // In view but out of range
        vehicles.push(test_vehicle(500.0, 0.0, 0));

        let found = vehicles[0].neighbours(0, &vehicles);
        assert_eq!(found, vec![1, 3]);
    }

    #[test]
    fn quad_and_scan_paths_agree() {
        let arena = arena();
        let mut vehicles = Vec::new();
        for i in 0..60usize {
            let x = 40.0 + (i % 10) as f32 * 90.0;
            let y = 40.0 + (i / 10) as f32 * 120.0;
            let mut vehicle = test_vehicle(x, y, i % 3);
            // Spread headings so the visibility band varies per vehicle
            let theta = i as f32 * 0.7;
            vehicle.velocity = vec2(theta.cos(), theta.sin()) * 3.0;
            vehicles.push(vehicle);
        }

        let half = arena.width.max(arena.height) / 2.0 + RENDER_BUFFER;
        let mut index = QuadTree::new(Square::new(arena.width / 2.0, arena.height / 2.0, half));
        for (i, vehicle) in vehicles.iter().enumerate() {
            assert!(index.insert(vehicle.position, i));
        }

        for (i, vehicle) in vehicles.iter().enumerate() {
            let mut scan = vehicle.neighbours(i, &vehicles);
            let mut quad = vehicle.neighbours_quad(i, &vehicles, &index);
            scan.sort_unstable();
            quad.sort_unstable();
            assert_eq!(scan, quad, "paths disagree for vehicle {}", i);
        }
    }

    #[test]
    fn out_of_flock_neighbour_separates_but_does_not_attract() {
        let vehicles = vec![test_vehicle(0.0, 0.0, 0), test_vehicle(50.0, 0.0, 1)];
        let neighbours = vehicles[0].neighbours(0, &vehicles);
        assert_eq!(neighbours, vec![1]);

        assert_eq!(vehicles[0].alignment(&vehicles, &neighbours), Vec2::ZERO);
        assert_eq!(vehicles[0].cohesion(&vehicles, &neighbours), Vec2::ZERO);

        let separation = vehicles[0].separation(&vehicles, &neighbours);
        assert!(separation.length() > 0.0);
        assert!(separation.x.is_finite() && separation.y.is_finite());
    }

    #[test]
    fn separation_survives_coincident_positions() {
        let vehicles = vec![test_vehicle(10.0, 10.0, 0), test_vehicle(10.0, 10.0, 0)];
        let separation = vehicles[0].separation(&vehicles, &[1]);
        assert!(separation.x.is_finite() && separation.y.is_finite());
        assert!(separation.length() <= vehicles[0].max_force + EPS);
    }

    #[test]
    fn obstacle_threshold_is_inclusive() {
        let vehicle = test_vehicle(0.0, 0.0, 0);
        // (vision 150 + radius 11) * 1.25 = 201.25, exact in f32
        let threshold = (VISION_RADIUS + crate::obstacle::OBSTACLE_RADIUS) * 1.25;

        let at_threshold = [Obstacle::new(threshold, 0.0)];
        assert!(vehicle.obstacle_avoidance(&at_threshold).length() > 0.0);

        let beyond = [Obstacle::new(threshold + 1.0, 0.0)];
        assert_eq!(vehicle.obstacle_avoidance(&beyond), Vec2::ZERO);
    }

    #[test]
    fn lonely_vehicle_ignores_obstacles() {
        let vehicles = vec![test_vehicle(0.0, 0.0, 0)];
        let obstacles = [Obstacle::new(30.0, 0.0)];
        let force = vehicles[0].flock_force(0, &vehicles, None, &obstacles);
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn avoid_edges_pushes_back_inside_the_margin() {
        let arena = arena();
        let mut vehicle = test_vehicle(20.0, 400.0, 0);
        vehicle.velocity = vec2(-3.0, 0.0);
        vehicle.avoid_edges(&arena);

        assert!(vehicle.acceleration.x > 0.0);
        assert!(vehicle.acceleration.length() <= 2.0 * vehicle.max_force + EPS);
    }

    #[test]
    fn avoid_edges_is_quiet_in_the_interior() {
        let arena = arena();
        let mut vehicle = test_vehicle(500.0, 400.0, 0);
        vehicle.avoid_edges(&arena);
        assert_eq!(vehicle.acceleration, Vec2::ZERO);
    }
}
