use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use caissa_optimizer::{
    distance_matrix::DistanceMatrix,
    optimizer::Optimizer,
    parsers::{load_roster, load_schedule},
    search::{self, SearchParams},
    team_cost_matrix::TeamCostMatrix,
};

use crate::fetch::{self, FetchArgs};

#[derive(Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    fetch: FetchArgs,

    /// Round-robin schedule template file
    #[arg(short, long)]
    schedule: PathBuf,

    #[arg(short, long, default_value_t = 200)]
    population: usize,

    #[arg(short, long, default_value_t = 10_000)]
    generations: usize,

    #[arg(long, default_value_t = 0.9)]
    crossover_rate: f64,

    #[arg(long, default_value_t = 0.9)]
    mutation_rate: f64,

    /// Fixed RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Best-fitness trace, one value per logged generation
    #[arg(short, long, default_value = "fitness.txt")]
    fitness_log: PathBuf,

    /// Log the best fitness every N generations
    #[arg(long, default_value_t = 100)]
    log_every: usize,
}

pub async fn run(args: OptimizeArgs) -> Result<(), anyhow::Error> {
    let league = load_roster(&args.fetch.roster)
        .with_context(|| format!("loading roster {}", args.fetch.roster.display()))?;
    let schedule = load_schedule(&args.schedule)
        .with_context(|| format!("loading schedule {}", args.schedule.display()))?;

    let entries = fetch::fetch(&args.fetch).await?;
    let distances = DistanceMatrix::from_travel_info(&entries)?;
    info!(
        cities = distances.num_cities(),
        pairs = distances.num_pairs(),
        "distance matrix ready"
    );

    let matrix = Arc::new(TeamCostMatrix::build(&league, &distances)?);
    info!(teams = matrix.num_teams(), "team cost matrix ready");

    let optimizer = Optimizer::new(Arc::clone(&matrix), Arc::new(schedule), &league);

    let params = SearchParams {
        population_size: args.population,
        generations: args.generations,
        crossover_rate: args.crossover_rate,
        mutation_rate: args.mutation_rate,
        seed: args.seed,
    };

    let log = File::create(&args.fitness_log)
        .with_context(|| format!("creating {}", args.fitness_log.display()))?;
    let mut log = BufWriter::new(log);

    let bar = ProgressBar::new(args.generations as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} best: {msg}")
            .context("progress bar template")?,
    );

    let log_every = args.log_every.max(1);
    let mut log_error = None;

    let outcome = search::run(&optimizer, &params, |generation, best| {
        bar.set_position(generation as u64 + 1);
        bar.set_message(format!("{best:.2}"));

        if generation % log_every == 0 && log_error.is_none() {
            if let Err(err) = writeln!(log, "{best:.6}") {
                log_error = Some(err);
            }
        }
    });

    bar.finish_and_clear();

    if let Some(err) = log_error {
        return Err(err).context("writing fitness log");
    }
    writeln!(log, "{:.6}", outcome.best_fitness).context("writing fitness log")?;
    log.flush().context("writing fitness log")?;

    info!(fitness = outcome.best_fitness, "search finished");
    optimizer.describe(&outcome.best);

    Ok(())
}
