/*
 * Vehicle Flocking Simulation
 *
 * This application simulates emergent group motion among several flocks
 * of autonomous vehicles sharing one arena. Each vehicle reacts only to
 * the neighbors it can see and to obstacles placed with the mouse.
 */

use flocking::app;

fn main() {
    nannou::app(app::model).update(app::update).run();
}
