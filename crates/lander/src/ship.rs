//! Lander kinematics
//!
//! Screen coordinates: x grows to the right, y grows downward. The ship's
//! angle is in degrees, 90 meaning upright with the engine pointing down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::Rect;

/// Physical constants and landing tolerances for a ship
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipParams {
    /// Downward acceleration in pixels/sec^2
    pub gravity: f32,
    /// Acceleration per unit of thrust in pixels/sec^2
    pub thrust_scale: f32,
    /// Largest thrust the engine accepts
    pub max_thrust: f32,
    /// Fuel at spawn; burns at `thrust` units per second
    pub max_fuel: f32,
    /// Bounding box width in pixels
    pub width: f32,
    /// Bounding box height in pixels
    pub height: f32,
    /// Maximum deviation from upright (degrees) for a safe landing
    pub landing_angle_tolerance: f32,
    /// Maximum vertical speed for a safe landing
    pub landing_vertical_speed: f32,
    /// Maximum horizontal speed for a safe landing
    pub landing_horizontal_speed: f32,
}

impl Default for ShipParams {
    fn default() -> Self {
        Self {
            gravity: 60.0,
            thrust_scale: 20.0,
            max_thrust: 4.0,
            max_fuel: 50.0,
            width: 25.0,
            height: 50.0,
            landing_angle_tolerance: 2.0,
            landing_vertical_speed: 20.0,
            landing_horizontal_speed: 10.0,
        }
    }
}

/// Point-mass lander (mass is 1)
#[derive(Debug, Clone)]
pub struct Ship {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees, 90 = upright
    pub angle: f32,
    pub thrust: f32,
    pub fuel: f32,
    pub landed: bool,
}

impl Ship {
    /// Spawn an upright, motionless ship with a full tank
    pub fn new(position: Vec2, params: &ShipParams) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            angle: 90.0,
            thrust: 0.0,
            fuel: params.max_fuel,
            landed: false,
        }
    }

    /// Advance the ship by `dt` seconds
    pub fn update(&mut self, dt: f32, params: &ShipParams) {
        if self.landed {
            return;
        }
        if self.fuel <= 0.0 {
            self.thrust = 0.0;
        }

        let rad = self.angle.to_radians();
        let mut force = Vec2::new(rad.cos(), rad.sin()) * self.thrust * params.thrust_scale;
        force.y -= params.gravity;
        // Physics is y-up, the screen is y-down
        force.y = -force.y;

        self.position += self.velocity * dt;
        self.velocity += force * dt;
        self.fuel -= self.thrust * dt;
    }

    /// Axis-aligned bounding box centred on the ship
    pub fn bounds(&self, params: &ShipParams) -> Rect {
        Rect::from_center(self.position, Vec2::new(params.width, params.height))
    }

    /// Whether touching a flat surface right now would count as a landing
    pub fn within_landing_tolerance(&self, params: &ShipParams) -> bool {
        (self.angle - 90.0).abs() < params.landing_angle_tolerance
            && self.velocity.y.abs() < params.landing_vertical_speed
            && self.velocity.x.abs() < params.landing_horizontal_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_fall_accelerates_down() {
        let params = ShipParams::default();
        let mut ship = Ship::new(Vec2::new(100.0, 100.0), &params);

        ship.update(0.5, &params);
        // Position integrates the old velocity first
        assert_eq!(ship.position, Vec2::new(100.0, 100.0));
        assert!((ship.velocity.y - 30.0).abs() < 1e-4);

        ship.update(0.5, &params);
        assert!((ship.position.y - 115.0).abs() < 1e-4);
        assert!(ship.velocity.x.abs() < 1e-4);
    }

    #[test]
    fn test_upright_thrust_counters_gravity() {
        let params = ShipParams::default();
        let mut ship = Ship::new(Vec2::ZERO, &params);
        // 3 * 20 = 60 exactly cancels gravity
        ship.thrust = 3.0;

        ship.update(1.0, &params);
        assert!(ship.velocity.length() < 1e-3);
        assert!((ship.fuel - 47.0).abs() < 1e-4);
    }

    #[test]
    fn test_full_thrust_climbs() {
        let params = ShipParams::default();
        let mut ship = Ship::new(Vec2::ZERO, &params);
        ship.thrust = 4.0;

        ship.update(0.1, &params);
        assert!(ship.velocity.y < 0.0, "ship should move up the screen");
    }

    #[test]
    fn test_empty_tank_cuts_engine() {
        let params = ShipParams::default();
        let mut ship = Ship::new(Vec2::ZERO, &params);
        ship.fuel = 0.0;
        ship.thrust = 4.0;

        ship.update(0.1, &params);
        assert_eq!(ship.thrust, 0.0);
        assert!(ship.velocity.y > 0.0);
    }

    #[test]
    fn test_tilted_thrust_pushes_sideways() {
        let params = ShipParams::default();
        let mut ship = Ship::new(Vec2::ZERO, &params);
        ship.angle = 0.0;
        ship.thrust = 2.0;

        ship.update(0.1, &params);
        assert!(ship.velocity.x > 0.0);
    }

    #[test]
    fn test_landed_ship_stays_put() {
        let params = ShipParams::default();
        let mut ship = Ship::new(Vec2::new(5.0, 5.0), &params);
        ship.landed = true;

        ship.update(1.0, &params);
        assert_eq!(ship.position, Vec2::new(5.0, 5.0));
        assert_eq!(ship.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_landing_tolerance() {
        let params = ShipParams::default();
        let mut ship = Ship::new(Vec2::ZERO, &params);
        ship.velocity = Vec2::new(5.0, 15.0);
        assert!(ship.within_landing_tolerance(&params));

        ship.velocity = Vec2::new(5.0, 25.0);
        assert!(!ship.within_landing_tolerance(&params));

        ship.velocity = Vec2::new(12.0, 15.0);
        assert!(!ship.within_landing_tolerance(&params));

        ship.velocity = Vec2::ZERO;
        ship.angle = 93.0;
        assert!(!ship.within_landing_tolerance(&params));
    }
}
