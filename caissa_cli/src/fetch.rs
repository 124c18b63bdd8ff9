use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use clap::Args;
use indicatif::ProgressBar;
use tracing::info;

use caissa_matrix_providers::{
    acquisition::fetch_travel_info,
    cache,
    distance_api::{DistanceApiClient, DistanceApiParams},
    travel_info::TravelInfo,
};
use caissa_optimizer::parsers::load_roster;

#[derive(Args)]
pub struct FetchArgs {
    /// League roster file (semicolon-separated)
    #[arg(short, long)]
    pub roster: PathBuf,

    /// Travel information cache file; created when absent
    #[arg(short, long)]
    pub cache: PathBuf,

    /// Distance API key; falls back to CAISSA_API_KEY
    #[arg(short, long)]
    pub api_key: Option<String>,

    /// Pause between remote calls, in milliseconds
    #[arg(long, default_value_t = 1500)]
    pub pause_ms: u64,
}

pub fn resolve_api_key(arg: Option<String>) -> Result<String, anyhow::Error> {
    match arg {
        Some(key) => Ok(key),
        None => std::env::var("CAISSA_API_KEY")
            .context("no API key given and CAISSA_API_KEY is not set"),
    }
}

/// The acquisition library refuses to run without a cache file, so a
/// mistyped path cannot trigger a silent full refetch. Seeding an empty
/// cache is therefore an explicit, logged act of the binary.
pub fn ensure_cache_file(path: &Path) -> Result<(), anyhow::Error> {
    if !path.exists() {
        info!(path = %path.display(), "creating empty travel cache");
        cache::store(path, &[])
            .with_context(|| format!("creating cache {}", path.display()))?;
    }
    Ok(())
}

pub async fn fetch(args: &FetchArgs) -> Result<Vec<TravelInfo>, anyhow::Error> {
    let league = load_roster(&args.roster)
        .with_context(|| format!("loading roster {}", args.roster.display()))?;

    let cities = league.unique_cities();
    info!(
        teams = league.num_teams(),
        cities = cities.len(),
        "loaded roster"
    );

    ensure_cache_file(&args.cache)?;

    let client = DistanceApiClient::new(DistanceApiParams {
        api_key: resolve_api_key(args.api_key.clone())?,
        pause: Duration::from_millis(args.pause_ms),
    });

    let bar = ProgressBar::new(0);
    let entries = fetch_travel_info(&cities, &args.cache, &client, |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
        bar.set_message(format!("{done}/{total} batches"));
    })
    .await;
    bar.finish_and_clear();

    Ok(entries?)
}

pub async fn run(args: FetchArgs) -> Result<(), anyhow::Error> {
    let entries = fetch(&args).await?;
    info!(pairs = entries.len(), "travel cache complete");
    Ok(())
}
