use rand::{
    Rng, SeedableRng,
    rngs::SmallRng,
    seq::IteratorRandom,
};
use rayon::prelude::*;
use tracing::debug;

use crate::{genome::Genome, optimizer::Optimizer};

#[derive(Debug, Clone)]
pub struct SearchParams {
    pub population_size: usize,
    pub generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            population_size: 200,
            generations: 10_000,
            crossover_rate: 0.9,
            mutation_rate: 0.9,
            seed: None,
        }
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub best: Genome,
    pub best_fitness: f64,
}

struct Scored {
    genome: Genome,
    fitness: f64,
}

fn tournament<'a>(scored: &'a [Scored], rng: &mut impl Rng) -> &'a Scored {
    if scored.len() == 1 {
        return &scored[0];
    }

    let picks = scored.iter().choose_multiple(rng, 2);
    if picks[0].fitness < picks[1].fitness {
        picks[0]
    } else {
        picks[1]
    }
}

/// Generational genetic search over the optimizer's genome space.
///
/// Binary tournament selection, order crossover and group-confined swap
/// mutation, with the single best genome carried over unchanged each
/// generation. Fitness evaluation is spread across the rayon pool; the
/// variation loop itself stays on one thread so a fixed seed replays
/// exactly.
///
/// `on_generation` is called once per generation with the generation
/// number and the best fitness so far.
pub fn run(
    optimizer: &Optimizer,
    params: &SearchParams,
    mut on_generation: impl FnMut(usize, f64),
) -> SearchOutcome {
    let mut rng = match params.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let mut population: Vec<Genome> = (0..params.population_size.max(2))
        .map(|_| optimizer.random_genome(&mut rng))
        .collect();

    let mut best: Option<Scored> = None;

    for generation in 0..params.generations {
        let mut scored: Vec<Scored> = population
            .into_par_iter()
            .map(|genome| {
                let fitness = optimizer.fitness(&genome);
                Scored { genome, fitness }
            })
            .collect();

        scored.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

        if best
            .as_ref()
            .is_none_or(|held| scored[0].fitness < held.fitness)
        {
            debug!(
                generation,
                fitness = scored[0].fitness,
                "new best genome"
            );
            best = Some(Scored {
                genome: scored[0].genome.clone(),
                fitness: scored[0].fitness,
            });
        }

        let best_fitness = match &best {
            Some(held) => held.fitness,
            None => f64::INFINITY,
        };
        on_generation(generation, best_fitness);

        let mut next = Vec::with_capacity(scored.len());
        next.push(scored[0].genome.clone());

        while next.len() < scored.len() {
            let x = tournament(&scored, &mut rng);

            let (mut a, b) = if rng.random_bool(params.crossover_rate) {
                let y = tournament(&scored, &mut rng);
                optimizer.crossover(&x.genome, &y.genome, &mut rng)
            } else {
                (x.genome.clone(), x.genome.clone())
            };

            if rng.random_bool(params.mutation_rate) {
                optimizer.mutate(&mut a, &mut rng);
            }
            next.push(a);

            if next.len() < scored.len() {
                let mut b = b;
                if rng.random_bool(params.mutation_rate) {
                    optimizer.mutate(&mut b, &mut rng);
                }
                next.push(b);
            }
        }

        population = next;
    }

    match best {
        Some(held) => SearchOutcome {
            best: held.genome,
            best_fitness: held.fitness,
        },
        // generations == 0: score the initial population once.
        None => {
            let held = population
                .into_iter()
                .map(|genome| {
                    let fitness = optimizer.fitness(&genome);
                    Scored { genome, fitness }
                })
                .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
                .unwrap_or_else(|| unreachable!("population is never empty"));

            SearchOutcome {
                best: held.genome,
                best_fitness: held.fitness,
            }
        }
    }
}
