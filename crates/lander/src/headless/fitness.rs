//! Fitness functions for ranking lander episodes
//!
//! Different fitness functions reward different aspects of a flight.

use crate::level::{Level, LevelConfig};

use super::episode::{Episode, EpisodeEnd};

/// Trait for fitness evaluation functions
pub trait FitnessFunction {
    /// Score a finished episode; higher is better
    fn evaluate(&self, episode: &Episode, level: &Level, arena: &LevelConfig) -> f32;

    /// Get the name of this fitness function
    fn name(&self) -> &str;

    /// Get a description of what this fitness measures
    fn description(&self) -> &str;
}

/// Rewards getting close to the pad and touching down softly
pub struct LandingFitness {
    /// Flat bonus for a successful landing
    pub landed_bonus: f32,
    /// Points for ending right above the pad, falling off linearly with distance
    pub proximity_weight: f32,
    /// Points lost per pixel/sec of speed when the episode ends
    pub speed_penalty: f32,
    /// Cap on the speed penalty, so every crash stays above leaving the arena
    pub max_speed_penalty: f32,
    /// Points per unit of fuel left after landing
    pub fuel_weight: f32,
}

impl LandingFitness {
    pub fn new() -> Self {
        Self {
            landed_bonus: 1000.0,
            proximity_weight: 100.0,
            speed_penalty: 0.5,
            max_speed_penalty: 500.0,
            fuel_weight: 10.0,
        }
    }

    /// One point below the worst crash: no proximity, full speed penalty
    fn out_of_bounds_score(&self) -> f32 {
        -(self.max_speed_penalty + 1.0)
    }
}

impl Default for LandingFitness {
    fn default() -> Self {
        Self::new()
    }
}

impl FitnessFunction for LandingFitness {
    fn evaluate(&self, episode: &Episode, level: &Level, arena: &LevelConfig) -> f32 {
        let proximity = level
            .pad_center()
            .map(|pad| {
                let distance = episode.final_position.distance(pad);
                (1.0 - distance / arena.width.max(1.0)).max(0.0)
            })
            .unwrap_or(0.0);

        let mut score = proximity * self.proximity_weight;

        match episode.end {
            EpisodeEnd::Landed => {
                score += self.landed_bonus + episode.fuel_left * self.fuel_weight;
            }
            EpisodeEnd::Crashed => {
                let penalty = episode.final_velocity.length() * self.speed_penalty;
                score -= penalty.min(self.max_speed_penalty);
            }
            // Leaving the arena is never better than crashing into it
            EpisodeEnd::OutOfBounds => score = self.out_of_bounds_score(),
            EpisodeEnd::TimedOut => {}
        }

        score
    }

    fn name(&self) -> &str {
        "Landing"
    }

    fn description(&self) -> &str {
        "Rewards soft touchdowns on the pad, closeness to the pad and leftover fuel"
    }
}

/// Measures how long the ship stayed in the air or on the pad
pub struct SurvivalFitness;

impl FitnessFunction for SurvivalFitness {
    fn evaluate(&self, episode: &Episode, _level: &Level, _arena: &LevelConfig) -> f32 {
        match episode.end {
            EpisodeEnd::Crashed | EpisodeEnd::OutOfBounds => episode.ticks as f32,
            // Surviving to the end counts double
            EpisodeEnd::Landed | EpisodeEnd::TimedOut => episode.ticks as f32 * 2.0,
        }
    }

    fn name(&self) -> &str {
        "Survival"
    }

    fn description(&self) -> &str {
        "Measures ticks survived without crashing or leaving the arena"
    }
}

/// Look up a fitness function by name (case-insensitive)
pub fn fitness_by_name(name: &str) -> Option<Box<dyn FitnessFunction>> {
    match name.to_lowercase().as_str() {
        "landing" => Some(Box::new(LandingFitness::new())),
        "survival" => Some(Box::new(SurvivalFitness)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn pad_level() -> Level {
        Level::from_points(
            vec![
                Vec2::new(0.0, 650.0),
                Vec2::new(600.0, 700.0),
                Vec2::new(700.0, 700.0),
                Vec2::new(1280.0, 650.0),
            ],
            1,
        )
    }

    fn episode(end: EpisodeEnd, position: Vec2, velocity: Vec2) -> Episode {
        Episode {
            end,
            ticks: 100,
            final_position: position,
            final_velocity: velocity,
            fuel_left: 10.0,
        }
    }

    #[test]
    fn test_landing_beats_crash() {
        let fitness = LandingFitness::new();
        let level = pad_level();
        let arena = LevelConfig::default();
        let on_pad = Vec2::new(650.0, 675.0);

        let landed = fitness.evaluate(
            &episode(EpisodeEnd::Landed, on_pad, Vec2::new(0.0, 5.0)),
            &level,
            &arena,
        );
        let crashed = fitness.evaluate(
            &episode(EpisodeEnd::Crashed, on_pad, Vec2::new(0.0, 50.0)),
            &level,
            &arena,
        );

        assert!(landed > 1000.0);
        assert!(crashed < landed);
        // Right above the pad: full proximity minus 50 * 0.5
        assert!((crashed - (100.0 * (1.0 - 25.0 / 1280.0) - 25.0)).abs() < 1e-3);
    }

    #[test]
    fn test_closer_crash_scores_higher() {
        let fitness = LandingFitness::new();
        let level = pad_level();
        let arena = LevelConfig::default();
        let velocity = Vec2::new(0.0, 30.0);

        let near = fitness.evaluate(
            &episode(EpisodeEnd::Crashed, Vec2::new(640.0, 690.0), velocity),
            &level,
            &arena,
        );
        let far = fitness.evaluate(
            &episode(EpisodeEnd::Crashed, Vec2::new(100.0, 660.0), velocity),
            &level,
            &arena,
        );
        assert!(near > far);
    }

    #[test]
    fn test_out_of_bounds_ranks_below_any_crash() {
        let fitness = LandingFitness::new();
        let level = pad_level();
        let arena = LevelConfig::default();
        let on_pad = Vec2::new(650.0, 675.0);

        let out_of_bounds = fitness.evaluate(
            &episode(EpisodeEnd::OutOfBounds, Vec2::new(-5.0, 100.0), Vec2::ZERO),
            &level,
            &arena,
        );
        for speed in [0.0, 300.0, 1_000.0, 100_000.0] {
            let crashed = fitness.evaluate(
                &episode(EpisodeEnd::Crashed, on_pad, Vec2::new(0.0, speed)),
                &level,
                &arena,
            );
            assert!(
                out_of_bounds < crashed,
                "leaving the arena ({out_of_bounds}) beat a crash at {speed} px/s ({crashed})"
            );
        }

        // Far from the pad and very fast is the worst crash there is
        let worst_crash = fitness.evaluate(
            &episode(EpisodeEnd::Crashed, Vec2::new(-2000.0, 0.0), Vec2::new(1e6, 0.0)),
            &level,
            &arena,
        );
        assert_eq!(worst_crash, -500.0);
        assert!(out_of_bounds < worst_crash);
    }

    #[test]
    fn test_survival_counts_ticks() {
        let level = pad_level();
        let arena = LevelConfig::default();
        let crashed = episode(EpisodeEnd::Crashed, Vec2::ZERO, Vec2::ZERO);
        let timed_out = episode(EpisodeEnd::TimedOut, Vec2::ZERO, Vec2::ZERO);

        assert_eq!(SurvivalFitness.evaluate(&crashed, &level, &arena), 100.0);
        assert_eq!(SurvivalFitness.evaluate(&timed_out, &level, &arena), 200.0);
    }

    #[test]
    fn test_fitness_by_name() {
        assert_eq!(fitness_by_name("landing").unwrap().name(), "Landing");
        assert_eq!(fitness_by_name("SURVIVAL").unwrap().name(), "Survival");
        assert!(fitness_by_name("foraging").is_none());
    }
}
