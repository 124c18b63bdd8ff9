/// City counts above this threshold are broken into fixed-size chunks
/// before batches are derived.
pub const CHUNK_THRESHOLD: usize = 20;

pub const CHUNK_SIZE: usize = 10;

/// One remote request covering all origin x destination combinations.
#[derive(Debug, Clone)]
pub struct Batch {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
}

impl Batch {
    pub fn pair_count(&self) -> usize {
        self.origins.len() * self.destinations.len()
    }
}

/// The deterministic sequence of batches required to cover every
/// unordered city pair exactly once.
///
/// The sequence is a pure function of the sorted unique city list, which
/// is what makes the on-disk cache resumable: a rerun derives the same
/// plan and skips the prefix it already holds.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    batches: Vec<Batch>,
}

impl BatchPlan {
    /// Derives the plan for a sorted, deduplicated city list.
    pub fn for_cities(cities: &[String]) -> Self {
        debug_assert!(cities.windows(2).all(|w| w[0] < w[1]));

        let mut batches = Vec::new();
        if cities.len() > 1 {
            plan_into(cities, true, &mut batches);
        }

        BatchPlan { batches }
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn total_pairs(&self) -> usize {
        self.batches.iter().map(Batch::pair_count).sum()
    }
}

fn plan_into(cities: &[String], recursive: bool, out: &mut Vec<Batch>) {
    if recursive && cities.len() > CHUNK_THRESHOLD {
        let chunks: Vec<&[String]> = cities.chunks(CHUNK_SIZE).collect();

        for chunk in &chunks {
            plan_into(chunk, true, out);
        }

        // Cross-chunk pairs, one batch per unordered chunk pair. Emitting
        // the chunks directly as origins/destinations keeps the batch free
        // of within-chunk pairs even when the last chunk runs short.
        for x in 0..chunks.len() {
            for y in x + 1..chunks.len() {
                out.push(Batch {
                    origins: chunks[x].to_vec(),
                    destinations: chunks[y].to_vec(),
                });
            }
        }

        return;
    }

    let half = cities.len() / 2;
    let (origins, destinations) = cities.split_at(half);

    out.push(Batch {
        origins: origins.to_vec(),
        destinations: destinations.to_vec(),
    });

    if recursive {
        if origins.len() > 1 {
            plan_into(origins, true, out);
        }

        if destinations.len() > 1 {
            plan_into(destinations, true, out);
        }
    }
}
