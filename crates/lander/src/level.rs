//! Procedural terrain with a single flat landing pad

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Arena and terrain generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Arena width in pixels (also the terrain length)
    pub width: f32,
    /// Arena height in pixels; the floor hangs from the bottom
    pub height: f32,
    /// Highest terrain point (smallest y)
    pub min_floor_y: f32,
    /// Lowest terrain point (largest y)
    pub max_floor_y: f32,
    /// Number of terrain segments after the left wall
    pub num_steps: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            min_floor_y: 480.0, // two thirds down the screen
            max_floor_y: 720.0,
            num_steps: 10,
        }
    }
}

impl LevelConfig {
    /// Where ships spawn: the middle of the arena
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether `point` is still inside the arena
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

/// Terrain floor as a polyline
#[derive(Debug, Clone)]
pub struct Level {
    pub floor: Vec<Vec2>,
    /// Index of the first point of the pad segment
    pub landing_index: usize,
}

impl Level {
    /// Generate a random floor with one flat step
    ///
    /// The first point sits on the left wall at x = 0. Every step gets a fresh
    /// random height except the landing step, which repeats the previous one.
    pub fn generate<R: Rng + ?Sized>(config: &LevelConfig, rng: &mut R) -> Self {
        let num_steps = config.num_steps.max(1);
        let step_size = (config.width / num_steps as f32).floor();
        let flat_step = rng.random_range(1..=num_steps);

        let mut last_y = random_height(config, rng);
        let mut floor = Vec::with_capacity(num_steps + 2);
        floor.push(Vec2::new(0.0, last_y));

        for i in 0..=num_steps {
            let x = i as f32 * step_size;
            let y = if i == flat_step {
                last_y
            } else {
                random_height(config, rng)
            };
            floor.push(Vec2::new(x, y));
            last_y = y;
        }

        log::debug!(
            "generated level with {} floor points, pad at segment {}",
            floor.len(),
            flat_step
        );

        Self {
            floor,
            landing_index: flat_step,
        }
    }

    /// Build a level from explicit points
    pub fn from_points(floor: Vec<Vec2>, landing_index: usize) -> Self {
        Self {
            floor,
            landing_index,
        }
    }

    /// Consecutive floor point pairs
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.floor.windows(2).map(|w| (w[0], w[1]))
    }

    /// The landing pad segment, if the index points at one
    pub fn pad(&self) -> Option<(Vec2, Vec2)> {
        let start = *self.floor.get(self.landing_index)?;
        let end = *self.floor.get(self.landing_index + 1)?;
        Some((start, end))
    }

    pub fn pad_center(&self) -> Option<Vec2> {
        self.pad().map(|(start, end)| (start + end) * 0.5)
    }
}

fn random_height<R: Rng + ?Sized>(config: &LevelConfig, rng: &mut R) -> f32 {
    if config.max_floor_y > config.min_floor_y {
        rng.random_range(config.min_floor_y..=config.max_floor_y)
    } else {
        config.min_floor_y
    }
}
