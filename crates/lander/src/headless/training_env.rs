//! Training environment for lander evolution
//!
//! Generational loop: every agent flies the same freshly generated level, the
//! best agents survive unchanged and mutated clones of them refill the
//! population. Agents are evaluated one after another.

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::{Context, Result, ensure};
use indicatif::{ProgressBar, ProgressStyle};
use lander_neat::rng::{GenomeRng, seeded};
use lander_neat::{Genome, MutationOutcome};
use serde::{Deserialize, Serialize};

use crate::config::LanderConfig;
use crate::level::Level;
use crate::pilot::new_pilot_genome;

use super::episode::{EpisodeEnd, EpisodeLimits, run_episode};
use super::fitness::FitnessFunction;

/// Configuration for the training run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of generations to run
    pub generations: usize,
    /// Population size per generation
    pub population_size: usize,
    /// How many top agents survive into the next generation unchanged
    pub survivors: usize,
    /// Mutations applied to each genome of the initial population
    pub initial_mutations: usize,
    /// Mutations applied to each offspring clone
    pub mutations_per_offspring: usize,
    /// Episode length cap in ticks
    pub max_ticks: usize,
    /// Simulation time step (seconds)
    pub dt: f32,
    /// Seed for terrain, weights and mutations
    pub seed: u64,
    /// Fitness function name: landing or survival
    pub fitness: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            generations: 50,
            population_size: 50,
            survivors: 10,
            initial_mutations: 3,
            mutations_per_offspring: 1,
            max_ticks: 1200, // 20 seconds at 60 ticks/sec
            dt: 1.0 / 60.0,
            seed: 42,
            fitness: "landing".to_string(),
        }
    }
}

/// Statistics from one generation
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingStats {
    pub generation: usize,
    pub best_fitness: f32,
    pub avg_fitness: f32,
    /// Agents that touched down safely
    pub landed: usize,
    pub crashed: usize,
    /// Mean node count across the evaluated population
    pub avg_nodes: f32,
    /// Mean connection count across the evaluated population
    pub avg_connections: f32,
}

/// Best genome seen so far
#[derive(Debug, Clone)]
pub struct Champion {
    pub genome: Genome,
    pub fitness: f32,
    pub generation: usize,
}

/// Main training environment
pub struct TrainingEnv {
    /// Full configuration (arena, ship, mutation rates, training)
    pub config: LanderConfig,
    fitness: Box<dyn FitnessFunction>,
    population: Vec<Genome>,
    rng: GenomeRng,
    /// Current generation
    generation: usize,
    /// Statistics history
    pub stats_history: Vec<TrainingStats>,
    champion: Option<Champion>,
}

impl TrainingEnv {
    /// Create a training environment with a freshly seeded population
    pub fn new(config: LanderConfig, fitness: Box<dyn FitnessFunction>) -> Result<Self> {
        let training = &config.training;
        ensure!(
            training.population_size > 0,
            "population size must be at least 1"
        );
        ensure!(
            (1..=training.population_size).contains(&training.survivors),
            "survivors ({}) must be between 1 and the population size ({})",
            training.survivors,
            training.population_size
        );
        ensure!(training.dt > 0.0, "time step must be positive");

        let mut rng = seeded(training.seed);
        let population = (0..training.population_size)
            .map(|_| {
                let mut genome =
                    new_pilot_genome(config.mutation).context("Invalid mutation rates")?;
                for _ in 0..training.initial_mutations {
                    genome.mutate_with(&mut rng);
                }
                Ok(genome)
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "seeded {} pilot genomes with {} mutations each",
            population.len(),
            training.initial_mutations
        );

        Ok(Self {
            config,
            fitness,
            population,
            rng,
            generation: 0,
            stats_history: Vec::new(),
            champion: None,
        })
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    pub fn fitness_name(&self) -> &str {
        self.fitness.name()
    }

    /// Create a progress bar style
    fn progress_style() -> Result<ProgressStyle> {
        Ok(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("█▓░"))
    }

    /// Evaluate the current population, then breed the next one
    pub fn step_generation(&mut self) -> Result<TrainingStats> {
        let level = Level::generate(&self.config.level, &mut self.rng);
        let limits = EpisodeLimits {
            max_ticks: self.config.training.max_ticks,
            dt: self.config.training.dt,
        };

        let mut scores = Vec::with_capacity(self.population.len());
        for (idx, genome) in self.population.iter_mut().enumerate() {
            let episode = run_episode(
                genome,
                &level,
                &self.config.level,
                &self.config.ship,
                limits,
            )
            .with_context(|| format!("Failed to fly agent {idx}"))?;
            let fitness = self
                .fitness
                .evaluate(&episode, &level, &self.config.level);
            scores.push((fitness, episode.end));
        }

        // Highest fitness first; ties keep population order
        let mut ranking: Vec<usize> = (0..scores.len()).collect();
        ranking.sort_by(|&a, &b| {
            scores[b]
                .0
                .partial_cmp(&scores[a].0)
                .unwrap_or(Ordering::Equal)
        });

        let stats = self.collect_stats(&scores, ranking[0]);

        let best_idx = ranking[0];
        let best_fitness = scores[best_idx].0;
        if self
            .champion
            .as_ref()
            .is_none_or(|champion| best_fitness > champion.fitness)
        {
            self.champion = Some(Champion {
                genome: self.population[best_idx].clone_deep(),
                fitness: best_fitness,
                generation: self.generation,
            });
        }

        self.breed(&ranking);
        self.stats_history.push(stats.clone());
        self.generation += 1;
        Ok(stats)
    }

    fn collect_stats(&self, scores: &[(f32, EpisodeEnd)], best_idx: usize) -> TrainingStats {
        let count = scores.len() as f32;
        let best_fitness = scores[best_idx].0;
        // Summed in f64 and capped so the mean never exceeds the best score
        let avg_fitness = (scores.iter().map(|(f, _)| f64::from(*f)).sum::<f64>()
            / scores.len() as f64) as f32;
        let avg_fitness = avg_fitness.min(best_fitness);
        let landed = scores
            .iter()
            .filter(|(_, end)| *end == EpisodeEnd::Landed)
            .count();
        let crashed = scores
            .iter()
            .filter(|(_, end)| *end == EpisodeEnd::Crashed)
            .count();
        let avg_nodes = self
            .population
            .iter()
            .map(|g| g.nodes().len() as f32)
            .sum::<f32>()
            / count;
        let avg_connections = self
            .population
            .iter()
            .map(|g| g.connections().len() as f32)
            .sum::<f32>()
            / count;

        TrainingStats {
            generation: self.generation,
            best_fitness,
            avg_fitness,
            landed,
            crashed,
            avg_nodes,
            avg_connections,
        }
    }

    /// Replace the population with the survivors plus mutated clones of them
    fn breed(&mut self, ranking: &[usize]) {
        let training = &self.config.training;

        let parents: Vec<Genome> = ranking
            .iter()
            .take(training.survivors)
            .map(|&idx| {
                let mut parent = self.population[idx].clone_deep();
                parent.reset_values();
                parent
            })
            .collect();

        let mut next = parents.clone();
        let mut outcomes: HashMap<MutationOutcome, usize> = HashMap::new();

        for parent in parents.iter().cycle() {
            if next.len() >= training.population_size {
                break;
            }
            let mut child = parent.clone_deep();
            for _ in 0..training.mutations_per_offspring {
                *outcomes.entry(child.mutate_with(&mut self.rng)).or_default() += 1;
            }
            next.push(child);
        }

        log::trace!(
            "generation {} offspring mutations: {:?}",
            self.generation,
            outcomes
        );
        self.population = next;
    }

    /// Run the full training loop
    pub fn run(&mut self) -> Result<()> {
        let generations = self.config.training.generations;
        let pb = ProgressBar::new(generations as u64);
        pb.set_style(Self::progress_style()?);

        pb.println(format!(
            "Starting training: {} generations, {} population, fitness: {}",
            generations,
            self.config.training.population_size,
            self.fitness_name()
        ));

        for generation_num in 0..generations {
            let stats = self.step_generation()?;

            log::debug!(
                "Gen {}: best={:.2}, avg={:.2}, landed={}, crashed={}",
                stats.generation,
                stats.best_fitness,
                stats.avg_fitness,
                stats.landed,
                stats.crashed
            );
            if generation_num % 5 == 0 || generation_num + 1 == generations {
                pb.println(format!(
                    "Gen {}: best={:.2}, avg={:.2}, landed={}/{}, nodes={:.1}, connections={:.1}",
                    stats.generation,
                    stats.best_fitness,
                    stats.avg_fitness,
                    stats.landed,
                    self.population.len(),
                    stats.avg_nodes,
                    stats.avg_connections,
                ));
            }

            pb.set_message(format!("best={:.2}", stats.best_fitness));
            pb.inc(1);
        }

        pb.finish_with_message("done");

        if let Some(champion) = &self.champion {
            log::info!(
                "Champion from generation {} with fitness {:.2}: {} nodes, {} connections ({} enabled)",
                champion.generation,
                champion.fitness,
                champion.genome.nodes().len(),
                champion.genome.connections().len(),
                champion.genome.enabled_count()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::fitness::{LandingFitness, SurvivalFitness};
    use lander_neat::MutationRates;

    fn small_config() -> LanderConfig {
        let mut config = LanderConfig::default();
        config.training.population_size = 8;
        config.training.survivors = 3;
        config.training.max_ticks = 240;
        config.training.generations = 3;
        config
    }

    #[test]
    fn test_training_config_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.survivors, 10);
        assert_eq!(config.fitness, "landing");
        assert!((config.dt - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_invalid_survivor_count() {
        let mut config = small_config();
        config.training.survivors = 0;
        assert!(TrainingEnv::new(config.clone(), Box::new(SurvivalFitness)).is_err());

        config.training.survivors = 9;
        assert!(TrainingEnv::new(config, Box::new(SurvivalFitness)).is_err());
    }

    #[test]
    fn test_rejects_invalid_mutation_rates() {
        let mut config = small_config();
        config.mutation = MutationRates::new(0.8, 0.8);
        assert!(TrainingEnv::new(config, Box::new(SurvivalFitness)).is_err());
    }

    #[test]
    fn test_initial_population_is_pilot_shaped() {
        let env = TrainingEnv::new(small_config(), Box::new(LandingFitness::new())).unwrap();
        assert_eq!(env.population().len(), 8);
        for genome in env.population() {
            assert_eq!(genome.num_inputs(), 3);
            assert_eq!(genome.num_outputs(), 2);
            // The first mutation always adds a connection
            assert!(!genome.connections().is_empty());
            assert!(genome.validate().is_ok());
        }
    }

    #[test]
    fn test_step_keeps_population_size() {
        let mut env = TrainingEnv::new(small_config(), Box::new(LandingFitness::new())).unwrap();

        for expected_gen in 0..3 {
            let stats = env.step_generation().unwrap();
            assert_eq!(stats.generation, expected_gen);
            assert_eq!(env.population().len(), 8);
            assert!(stats.best_fitness >= stats.avg_fitness);
            assert!(stats.landed + stats.crashed <= 8);
        }
        assert_eq!(env.generation(), 3);
        assert_eq!(env.stats_history.len(), 3);
        assert!(env.population().iter().all(|g| g.validate().is_ok()));
    }

    #[test]
    fn test_average_of_equal_scores_never_exceeds_best() {
        let env = TrainingEnv::new(small_config(), Box::new(LandingFitness::new())).unwrap();
        let scores = vec![(-42.558205_f32, EpisodeEnd::Crashed); 8];

        let stats = env.collect_stats(&scores, 0);
        assert_eq!(stats.best_fitness, -42.558205);
        assert!(stats.avg_fitness <= stats.best_fitness);
        assert!((stats.avg_fitness - stats.best_fitness).abs() < 1e-4);
        assert_eq!(stats.crashed, 8);
        assert_eq!(stats.landed, 0);
    }

    #[test]
    fn test_best_survivor_leads_next_generation() {
        let mut env = TrainingEnv::new(small_config(), Box::new(LandingFitness::new())).unwrap();
        env.step_generation().unwrap();

        let champion = env.champion().expect("champion after first generation");
        assert_eq!(champion.generation, 0);
        assert_eq!(env.population()[0].connections(), champion.genome.connections());
        // Survivors start the next episode with clean node values
        assert!(env.population()[0].nodes().iter().all(|n| n.value == 0.0));
    }

    #[test]
    fn test_champion_is_best_so_far() {
        let mut env = TrainingEnv::new(small_config(), Box::new(SurvivalFitness)).unwrap();
        env.run().unwrap();

        let champion = env.champion().unwrap();
        for stats in &env.stats_history {
            assert!(champion.fitness >= stats.best_fitness);
        }
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let run = || {
            let mut env =
                TrainingEnv::new(small_config(), Box::new(LandingFitness::new())).unwrap();
            (0..3)
                .map(|_| env.step_generation().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
