/*
 * Obstacle Module
 *
 * This module defines the Obstacle struct: a static circular region that
 * vehicles steer away from. Obstacles are created and removed by pointer
 * events forwarded from the host window and never move.
 */

use nannou::prelude::*;

use crate::simulation::Arena;

pub const OBSTACLE_RADIUS: f32 = 11.0;

const OBSTACLE_COLOR: (u8, u8, u8) = (23, 128, 237);

#[derive(Clone, Copy, Debug)]
pub struct Obstacle {
    pub position: Point2,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: pt2(x, y),
            radius: OBSTACLE_RADIUS,
        }
    }

    /// Whether a removal event at (x, y) hits this obstacle.
    pub fn hit_test(&self, x: f32, y: f32) -> bool {
        self.position.distance(pt2(x, y)) < self.radius
    }

    // Draw the obstacle as a filled circle
    pub fn draw(&self, draw: &Draw, arena: &Arena) {
        let (r, g, b) = OBSTACLE_COLOR;
        draw.ellipse()
            .xy(arena.to_view(self.position))
            .radius(self.radius)
            .color(rgb(r, g, b));
    }
}
