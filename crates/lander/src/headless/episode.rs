//! Single-agent episode: fly one genome over one level until something ends it

use glam::Vec2;
use lander_neat::{Genome, GenomeError};

use crate::collision::rect_touches_segment;
use crate::level::{Level, LevelConfig};
use crate::pilot;
use crate::ship::{Ship, ShipParams};

/// Result of the ship touching the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Landed,
    Crashed,
}

/// Why an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpisodeEnd {
    Landed,
    Crashed,
    OutOfBounds,
    TimedOut,
}

/// Summary of a finished episode, consumed by fitness functions
#[derive(Debug, Clone)]
pub struct Episode {
    pub end: EpisodeEnd,
    /// Ticks simulated before the episode ended
    pub ticks: usize,
    pub final_position: Vec2,
    /// Velocity at the moment the episode ended
    pub final_velocity: Vec2,
    pub fuel_left: f32,
}

/// Check the ship against every floor segment
///
/// Touching a flat segment within the landing tolerances is a landing; any
/// other contact, including a good touchdown that also clips a slope, is a crash.
pub fn check_contact(ship: &Ship, level: &Level, params: &ShipParams) -> Option<Contact> {
    let bounds = ship.bounds(params);
    let mut contact = None;

    for (start, end) in level.segments() {
        if !rect_touches_segment(&bounds, start, end) {
            continue;
        }
        let flat = start.y == end.y;
        if flat && ship.within_landing_tolerance(params) {
            contact = Some(Contact::Landed);
        } else {
            return Some(Contact::Crashed);
        }
    }

    contact
}

/// Simulation settings for one episode
#[derive(Debug, Clone, Copy)]
pub struct EpisodeLimits {
    pub max_ticks: usize,
    pub dt: f32,
}

/// Fly `genome` over `level` from the arena's spawn point
///
/// The genome is evaluated once per tick before the physics step, then the
/// ship is checked for floor contact and for leaving the arena.
pub fn run_episode(
    genome: &mut Genome,
    level: &Level,
    arena: &LevelConfig,
    params: &ShipParams,
    limits: EpisodeLimits,
) -> Result<Episode, GenomeError> {
    let mut ship = Ship::new(arena.spawn_point(), params);
    let mut end = EpisodeEnd::TimedOut;
    let mut ticks = 0;

    while ticks < limits.max_ticks {
        ticks += 1;
        pilot::steer(genome, &mut ship, params)?;
        ship.update(limits.dt, params);

        match check_contact(&ship, level, params) {
            Some(Contact::Landed) => {
                ship.landed = true;
                end = EpisodeEnd::Landed;
                break;
            }
            Some(Contact::Crashed) => {
                end = EpisodeEnd::Crashed;
                break;
            }
            None => {}
        }

        if !arena.contains(ship.position) {
            end = EpisodeEnd::OutOfBounds;
            break;
        }
    }

    Ok(Episode {
        end,
        ticks,
        final_position: ship.position,
        final_velocity: ship.velocity,
        fuel_left: ship.fuel.max(0.0),
    })
}
