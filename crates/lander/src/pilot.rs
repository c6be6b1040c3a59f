//! Genome-driven ship control
//!
//! The genome sees `[vel.x, vel.y, fuel]` and answers with two values: a
//! desired angle and a thrust level. Both are clamped here into what the
//! ship can physically do; the genome itself never knows about those limits.

use lander_neat::{Genome, GenomeError, MutationRates};

use crate::ship::{Ship, ShipParams};

/// Number of genome inputs a pilot provides
pub const SENSOR_COUNT: usize = 3;
/// Number of genome outputs a pilot reads
pub const COMMAND_COUNT: usize = 2;

/// Angle range the ship can be steered to (degrees)
const MIN_ANGLE: f32 = 0.0;
const MAX_ANGLE: f32 = 180.0;

/// Create an empty genome wired for piloting
pub fn new_pilot_genome(rates: MutationRates) -> Result<Genome, GenomeError> {
    Genome::with_rates(SENSOR_COUNT, COMMAND_COUNT, rates)
}

/// Sensor readings fed to the genome each tick
pub fn sense(ship: &Ship) -> [f64; SENSOR_COUNT] {
    [
        f64::from(ship.velocity.x),
        f64::from(ship.velocity.y),
        f64::from(ship.fuel),
    ]
}

/// Clamped control command for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    pub angle: f32,
    pub thrust: f32,
}

impl Command {
    /// Interpret raw genome outputs as a command
    ///
    /// Missing or non-finite outputs fall back to upright with the engine off.
    pub fn from_outputs(outputs: &[f64], params: &ShipParams) -> Self {
        let read = |idx: usize, fallback: f32| {
            outputs
                .get(idx)
                .map(|&v| v as f32)
                .filter(|v| v.is_finite())
                .unwrap_or(fallback)
        };

        Self {
            angle: read(0, 90.0).clamp(MIN_ANGLE, MAX_ANGLE),
            thrust: read(1, 0.0).clamp(0.0, params.max_thrust),
        }
    }

    pub fn apply(&self, ship: &mut Ship) {
        ship.angle = self.angle;
        ship.thrust = self.thrust;
    }
}

/// Run the genome on the ship's sensors and apply the resulting command
pub fn steer(
    genome: &mut Genome,
    ship: &mut Ship,
    params: &ShipParams,
) -> Result<Command, GenomeError> {
    let outputs = genome.evaluate(&sense(ship))?;
    let command = Command::from_outputs(&outputs, params);
    command.apply(ship);
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_sense_reads_velocity_and_fuel() {
        let params = ShipParams::default();
        let mut ship = Ship::new(Vec2::ZERO, &params);
        ship.velocity = Vec2::new(1.5, -2.0);

        assert_eq!(sense(&ship), [1.5, -2.0, 50.0]);
    }

    #[test]
    fn test_command_clamps_outputs() {
        let params = ShipParams::default();

        let cmd = Command::from_outputs(&[400.0, 12.0], &params);
        assert_eq!(
            cmd,
            Command {
                angle: 180.0,
                thrust: 4.0
            }
        );

        let cmd = Command::from_outputs(&[-30.0, -1.0], &params);
        assert_eq!(
            cmd,
            Command {
                angle: 0.0,
                thrust: 0.0
            }
        );

        let cmd = Command::from_outputs(&[f64::NAN], &params);
        assert_eq!(
            cmd,
            Command {
                angle: 90.0,
                thrust: 0.0
            }
        );
    }

    #[test]
    fn test_steer_applies_genome_outputs() {
        let params = ShipParams::default();
        let mut genome = new_pilot_genome(MutationRates::default()).unwrap();
        // fuel -> thrust output, scaled so a full tank asks for thrust 2
        genome.connect(2, 4, 0.04).unwrap();

        let mut ship = Ship::new(Vec2::ZERO, &params);
        let cmd = steer(&mut genome, &mut ship, &params).unwrap();

        assert!((cmd.thrust - 2.0).abs() < 1e-5);
        assert_eq!(cmd.angle, 0.0);
        assert_eq!(ship.thrust, cmd.thrust);
        assert_eq!(ship.angle, 0.0);
    }
}
