use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cache::{self, CacheError},
    distance_api::{DistanceApiError, MatrixTransport},
    plan::BatchPlan,
    travel_info::TravelInfo,
};

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error(transparent)]
    Api(#[from] DistanceApiError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("not enough results: {got} of {need}, run again")]
    Insufficient { got: usize, need: usize },
}

/// Executes the plan in order, appending every produced entry to `sink`.
///
/// `skip` is the number of entries already present in `sink` from a
/// previous pass; batches wholly covered by it advance the position
/// cursor without a request. A batch only partially covered is refetched
/// whole, after truncating the stale tail, so the stored order never
/// desynchronizes. Entries of completed batches survive a failure; the
/// failing batch contributes nothing.
///
/// `on_batch(done, total)` is invoked after every batch, skipped ones
/// included, for progress reporting.
pub async fn acquire_into<T: MatrixTransport>(
    plan: &BatchPlan,
    transport: &T,
    skip: usize,
    sink: &mut Vec<TravelInfo>,
    mut on_batch: impl FnMut(usize, usize),
) -> Result<(), DistanceApiError> {
    let total = plan.batches().len();
    let mut position = 0;

    for (done, batch) in plan.batches().iter().enumerate() {
        let count = batch.pair_count();

        if position + count <= skip {
            position += count;
            on_batch(done + 1, total);
            continue;
        }

        if position < skip {
            debug!(
                cached = skip,
                batch_start = position,
                "cache ends inside a batch, refetching it whole"
            );
            sink.truncate(position);
        }

        let entries = transport
            .fetch_batch(&batch.origins, &batch.destinations)
            .await?;

        if entries.len() != count {
            return Err(DistanceApiError::Shape {
                expected: count,
                got: entries.len(),
            });
        }

        sink.extend(entries);
        position += count;
        on_batch(done + 1, total);
    }

    Ok(())
}

/// Acquires travel information for every unordered pair of `cities`,
/// resuming from and persisting to the cache at `cache_path`.
///
/// The cache is read first; a missing or malformed file is an error, so
/// a mistyped path fails loudly instead of refetching everything
/// (callers wanting a fresh start seed an empty cache with
/// [`cache::store`]). If the cache already holds the full pair count no
/// request is issued. Otherwise the remainder is fetched and the cache is
/// rewritten with everything obtained so far, on success and on failure
/// alike, so a rerun resumes instead of refetching.
///
/// `on_batch` reports batch progress, as in [`acquire_into`].
pub async fn fetch_travel_info<T: MatrixTransport>(
    cities: &[String],
    cache_path: &Path,
    transport: &T,
    on_batch: impl FnMut(usize, usize),
) -> Result<Vec<TravelInfo>, AcquireError> {
    let mut cities = cities.to_vec();
    cities.sort();
    cities.dedup();

    let required = cities.len() * cities.len().saturating_sub(1) / 2;

    let mut entries = cache::load(cache_path)?;

    if entries.len() >= required {
        entries.truncate(required);
        info!(pairs = required, "travel cache already complete");
        return Ok(entries);
    }

    let plan = BatchPlan::for_cities(&cities);
    debug_assert_eq!(plan.total_pairs(), required);

    info!(
        cities = cities.len(),
        cached = entries.len(),
        required,
        batches = plan.batches().len(),
        "acquiring travel information"
    );

    let skip = entries.len();
    let outcome = acquire_into(&plan, transport, skip, &mut entries, on_batch).await;

    // Persist before surfacing any fetch error; a rerun resumes from here.
    cache::store(cache_path, &entries)?;

    outcome?;

    if entries.len() != required {
        return Err(AcquireError::Insufficient {
            got: entries.len(),
            need: required,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Synthesizes deterministic travel values from the numeric suffix of
    /// `cityNNN` style names, and can be told to fail from a given request
    /// onwards.
    struct ScriptedTransport {
        calls: AtomicUsize,
        fail_from_call: Option<usize>,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            ScriptedTransport {
                calls: AtomicUsize::new(0),
                fail_from_call: None,
            }
        }

        fn failing_from(call: usize) -> Self {
            ScriptedTransport {
                calls: AtomicUsize::new(0),
                fail_from_call: Some(call),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn value_for(origin: &str, destination: &str) -> u64 {
            let index = |name: &str| -> u64 {
                name.trim_start_matches(|c: char| c.is_alphabetic())
                    .parse()
                    .unwrap()
            };
            let (a, b) = (index(origin), index(destination));
            a.abs_diff(b) * 1000 + a.min(b)
        }
    }

    impl MatrixTransport for ScriptedTransport {
        async fn fetch_batch(
            &self,
            origins: &[String],
            destinations: &[String],
        ) -> Result<Vec<TravelInfo>, DistanceApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_from_call.is_some_and(|from| call >= from) {
                return Err(DistanceApiError::Status(String::from(
                    "OVER_QUERY_LIMIT",
                )));
            }

            let mut entries = Vec::new();
            for origin in origins {
                for destination in destinations {
                    let value = Self::value_for(origin, destination);
                    entries.push(TravelInfo {
                        city_pair: [origin.clone(), destination.clone()],
                        distance_meters: value,
                        duration_seconds: value / 20,
                    });
                }
            }

            Ok(entries)
        }
    }

    fn city_names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("city{i:03}")).collect()
    }

    fn normalized(entries: &[TravelInfo]) -> std::collections::HashSet<(String, String)> {
        entries
            .iter()
            .map(|e| {
                let [a, b] = &e.city_pair;
                if a < b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn acquires_every_pair_exactly_once() {
        let cities = city_names(15);
        let plan = BatchPlan::for_cities(&cities);
        let transport = ScriptedTransport::new();

        let mut entries = Vec::new();
        acquire_into(&plan, &transport, 0, &mut entries, |_, _| {})
            .await
            .unwrap();

        assert_eq!(entries.len(), 105);
        assert_eq!(normalized(&entries).len(), 105);
    }

    #[tokio::test]
    async fn full_skip_issues_no_requests() {
        let cities = city_names(15);
        let plan = BatchPlan::for_cities(&cities);
        let transport = ScriptedTransport::new();

        let mut entries = Vec::new();
        acquire_into(&plan, &transport, 0, &mut entries, |_, _| {})
            .await
            .unwrap();
        let full = entries.clone();

        let fresh = ScriptedTransport::new();
        acquire_into(&plan, &fresh, entries.len(), &mut entries, |_, _| {})
            .await
            .unwrap();

        assert_eq!(fresh.calls(), 0);
        assert_eq!(entries, full);
    }

    #[tokio::test]
    async fn resumes_without_refetching_completed_batches() {
        let cities = city_names(15);
        let plan = BatchPlan::for_cities(&cities);

        let failing = ScriptedTransport::failing_from(3);
        let mut entries = Vec::new();
        let error = acquire_into(&plan, &failing, 0, &mut entries, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(error, DistanceApiError::Status(_)));

        // Entries of the three completed batches survive the failure.
        let produced: usize = plan.batches()[..3].iter().map(|b| b.pair_count()).sum();
        assert_eq!(entries.len(), produced);

        let transport = ScriptedTransport::new();
        acquire_into(&plan, &transport, entries.len(), &mut entries, |_, _| {})
            .await
            .unwrap();

        assert_eq!(transport.calls(), plan.batches().len() - 3);
        assert_eq!(entries.len(), 105);

        // The resumed run produces the same sequence as a clean one.
        let clean_transport = ScriptedTransport::new();
        let mut clean = Vec::new();
        acquire_into(&plan, &clean_transport, 0, &mut clean, |_, _| {})
            .await
            .unwrap();
        assert_eq!(entries, clean);
    }

    #[tokio::test]
    async fn refetches_a_partially_cached_batch_whole() {
        let cities = city_names(15);
        let plan = BatchPlan::for_cities(&cities);

        let transport = ScriptedTransport::new();
        let mut clean = Vec::new();
        acquire_into(&plan, &transport, 0, &mut clean, |_, _| {}).await.unwrap();

        // Pretend the cache ended one entry into the second batch.
        let first = plan.batches()[0].pair_count();
        let mut entries = clean[..first + 1].to_vec();

        let resumed = ScriptedTransport::new();
        acquire_into(&plan, &resumed, entries.len(), &mut entries, |_, _| {})
            .await
            .unwrap();

        assert_eq!(resumed.calls(), plan.batches().len() - 1);
        assert_eq!(entries, clean);
    }

    #[tokio::test]
    async fn driver_persists_partial_results_and_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("travel.json");
        cache::store(&path, &[]).unwrap();

        let cities = city_names(15);
        let plan = BatchPlan::for_cities(&cities);

        let failing = ScriptedTransport::failing_from(4);
        let error = fetch_travel_info(&cities, &path, &failing, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(error, AcquireError::Api(_)));

        let persisted = cache::load(&path).unwrap();
        let produced: usize = plan.batches()[..4].iter().map(|b| b.pair_count()).sum();
        assert_eq!(persisted.len(), produced);

        let transport = ScriptedTransport::new();
        let entries = fetch_travel_info(&cities, &path, &transport, |_, _| {})
            .await
            .unwrap();
        assert_eq!(entries.len(), 105);
        assert_eq!(cache::load(&path).unwrap(), entries);

        // A third run is served entirely from the cache.
        let idle = ScriptedTransport::new();
        let again = fetch_travel_info(&cities, &path, &idle, |_, _| {}).await.unwrap();
        assert_eq!(idle.calls(), 0);
        assert_eq!(again, entries);
    }

    #[tokio::test]
    async fn driver_errors_on_a_missing_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never_created.json");
        let transport = ScriptedTransport::new();

        let result = fetch_travel_info(&city_names(4), &path, &transport, |_, _| {}).await;

        assert!(matches!(
            result,
            Err(AcquireError::Cache(CacheError::Io(_)))
        ));
        assert_eq!(transport.calls(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn reports_progress_for_fetched_and_skipped_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("travel.json");
        cache::store(&path, &[]).unwrap();

        let cities = city_names(15);
        let total = BatchPlan::for_cities(&cities).batches().len();

        let failing = ScriptedTransport::failing_from(3);
        let mut seen = Vec::new();
        let _ = fetch_travel_info(&cities, &path, &failing, |done, t| seen.push((done, t))).await;

        // The three completed batches each report once.
        assert_eq!(seen, vec![(1, total), (2, total), (3, total)]);

        // On resume the skipped batches report too, so the bar still
        // runs from start to finish.
        let transport = ScriptedTransport::new();
        let mut seen = Vec::new();
        fetch_travel_info(&cities, &path, &transport, |done, t| seen.push((done, t)))
            .await
            .unwrap();

        let expected: Vec<(usize, usize)> = (1..=total).map(|done| (done, total)).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn driver_propagates_a_corrupt_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("travel.json");
        std::fs::write(&path, "{ not json").unwrap();

        let transport = ScriptedTransport::new();
        let result = fetch_travel_info(&city_names(4), &path, &transport, |_, _| {}).await;

        assert!(matches!(
            result,
            Err(AcquireError::Cache(CacheError::Decode(_)))
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn driver_sorts_and_dedupes_cities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("travel.json");
        cache::store(&path, &[]).unwrap();

        let cities = vec![
            String::from("city002"),
            String::from("city000"),
            String::from("city001"),
            String::from("city000"),
        ];

        let transport = ScriptedTransport::new();
        let entries = fetch_travel_info(&cities, &path, &transport, |_, _| {}).await.unwrap();

        assert_eq!(entries.len(), 3);
    }
}
