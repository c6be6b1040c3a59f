use clap::Parser;
use lander::LanderConfig;
use lander::headless::{LandingFitness, TrainingEnv, fitness_by_name};
use lander::neat::rng::from_entropy;
use rand::Rng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (RON); defaults to ./lander.ron when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations to train
    #[arg(long)]
    generations: Option<usize>,

    /// Population size per generation
    #[arg(long)]
    population: Option<usize>,

    /// Survivors kept unchanged each generation
    #[arg(long)]
    survivors: Option<usize>,

    /// Seed for terrain, weights and mutations
    #[arg(long, conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Pick a seed from the operating system instead of the configured one
    #[arg(long)]
    random_seed: bool,

    /// Fitness function: landing, survival
    #[arg(long)]
    fitness: Option<String>,

    /// Print the champion genome after training
    #[arg(long)]
    show_best: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = LanderConfig::load(args.config.as_deref())?;

    // Command-line flags win over every config layer
    if let Some(generations) = args.generations {
        config.training.generations = generations;
    }
    if let Some(population) = args.population {
        config.training.population_size = population;
    }
    if let Some(survivors) = args.survivors {
        config.training.survivors = survivors;
    }
    if let Some(seed) = args.seed {
        config.training.seed = seed;
    }
    if args.random_seed {
        config.training.seed = from_entropy().random();
    }
    if let Some(fitness) = args.fitness {
        config.training.fitness = fitness;
    }

    let fitness = fitness_by_name(&config.training.fitness).unwrap_or_else(|| {
        log::warn!(
            "Unknown fitness '{}', defaulting to landing",
            config.training.fitness
        );
        Box::new(LandingFitness::new())
    });

    log::info!("Starting lander training");
    log::info!("  Fitness: {} ({})", fitness.name(), fitness.description());
    log::info!("  Generations: {}", config.training.generations);
    log::info!("  Population: {}", config.training.population_size);
    log::info!("  Survivors: {}", config.training.survivors);
    log::info!("  Seed: {}", config.training.seed);
    log::info!(
        "  Mutation rates: node={}, connection={}",
        config.mutation.node,
        config.mutation.connection
    );

    let mut env = TrainingEnv::new(config, fitness)?;
    env.run()?;

    if args.show_best
        && let Some(champion) = env.champion()
    {
        println!(
            "Champion (generation {}, fitness {:.2}):\n{}",
            champion.generation, champion.fitness, champion.genome
        );
    }

    Ok(())
}
