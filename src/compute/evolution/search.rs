//! Generational search for an expression matching a sampled target.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use rand::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

use crate::compute::{Optimized, optimize};
use crate::schema::{ComputingBound, ConfigError, Grid, SearchConfig};

use super::fitness::{FitnessError, FitnessEvaluator};
use super::generator::TreeGenerator;
use super::keeper::{ComputedResult, EliteKeeper};
use super::mutation::{GeneticMutator, MutationError};

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid search config: {0}")]
    Config(#[from] ConfigError),
    #[error("Target grid is {actual:?} but the bounds require {expected:?}")]
    GridMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error(transparent)]
    Fitness(#[from] FitnessError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error("No candidate was scored")]
    EmptyPopulation,
}

/// Snapshot reported after every scored generation.
#[derive(Debug, Clone, Serialize)]
pub struct SearchProgress {
    /// Generations evolved so far; 0 is the initial population.
    pub generation: usize,
    pub total_generations: usize,
    pub best_difference: f64,
    pub best_size: usize,
    /// Candidates currently held by the elite keeper.
    pub elite_count: usize,
}

/// Reason the search stopped.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum StopReason {
    /// Ran every configured generation.
    Completed,
    /// Cancelled through the cancel handle.
    Cancelled,
}

/// Statistics of a finished search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub generations: usize,
    pub evaluations: u64,
    pub elapsed_seconds: f64,
    pub stop_reason: StopReason,
}

/// Outcome of a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best candidate found.
    pub best: ComputedResult,
    pub stats: SearchStats,
    /// Best difference after the initial scoring and after each generation.
    pub history: Vec<f64>,
}

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(&SearchProgress) + Send + Sync>;

/// Evolutionary search engine.
///
/// Seeds a random population, scores it into an elite keeper, then for each
/// generation breeds `population_size` offspring from tournaments over a
/// snapshot of the keeper and submits them back into the same keeper.
/// Generation, mutation and scoring run on the rayon pool with one
/// independently seeded RNG per slot; only the orchestrating thread touches
/// the keeper.
pub struct GeneticExpressionGenerator {
    config: SearchConfig,
    evaluator: FitnessEvaluator,
    theoretical: Grid,
    rng: StdRng,
    initial: TreeGenerator,
    full_mutation: TreeGenerator,
    keeper: EliteKeeper<ComputedResult>,
    generation: usize,
    evaluations: u64,
    history: Vec<f64>,
    cancelled: Arc<AtomicBool>,
}

impl GeneticExpressionGenerator {
    /// Create an engine searching for an expression whose samples over
    /// `x_bound` × `y_bound` match `theoretical`.
    pub fn new(
        theoretical: Grid,
        x_bound: ComputingBound,
        y_bound: ComputingBound,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let evaluator = FitnessEvaluator::new(x_bound, y_bound);
        if theoretical.dims() != evaluator.dims() {
            return Err(SearchError::GridMismatch {
                expected: evaluator.dims(),
                actual: theoretical.dims(),
            });
        }

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let initial = TreeGenerator::with_config(config.initial_depth, &config.generator);
        let full_mutation =
            TreeGenerator::with_config(config.mutation.full_mutation_depth, &config.generator);
        let keeper = EliteKeeper::new(config.elite_capacity());

        Ok(Self {
            config,
            evaluator,
            theoretical,
            rng: StdRng::seed_from_u64(seed),
            initial,
            full_mutation,
            keeper,
            generation: 0,
            evaluations: 0,
            history: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle. Checked between generations.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Current elite keeper.
    pub fn keeper(&self) -> &EliteKeeper<ComputedResult> {
        &self.keeper
    }

    /// One seed per slot, drawn from the master RNG.
    fn slot_seeds(&mut self) -> Vec<u64> {
        (0..self.config.population_size)
            .map(|_| self.rng.r#gen())
            .collect()
    }

    /// Generate the initial population.
    fn seed_population(&mut self) -> Vec<Optimized> {
        let seeds = self.slot_seeds();
        let generator = &self.initial;
        seeds
            .into_par_iter()
            .map(|seed| generator.generate(&mut StdRng::seed_from_u64(seed)))
            .collect()
    }

    /// Score candidates in parallel, then submit them in slot order.
    fn score_population(&mut self, population: Vec<Optimized>) -> Result<(), SearchError> {
        let evaluator = &self.evaluator;
        let theoretical = &self.theoretical;

        let scored = population
            .into_par_iter()
            .map_init(
                || evaluator.grid(),
                |scratch, candidate| {
                    evaluator
                        .difference_with_scratch(&candidate.node, theoretical, scratch)
                        .map(|difference| {
                            ComputedResult::new(candidate.node, candidate.size, difference)
                        })
                },
            )
            .collect::<Result<Vec<_>, _>>()?;

        self.evaluations += scored.len() as u64;
        self.keeper.extend(scored);
        Ok(())
    }

    /// Breed one generation of offspring from the current elites.
    fn breed(&mut self) -> Result<Vec<Optimized>, SearchError> {
        let pool = self.keeper.snapshot();
        if pool.is_empty() {
            return Err(SearchError::EmptyPopulation);
        }
        let seeds = self.slot_seeds();
        let draws = self.config.tournament_draws();
        let rates = &self.config.mutation;
        let full_mutation = &self.full_mutation;

        let offspring = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let (first, donor) = select_parents(&pool, draws, &mut rng);
                let child = GeneticMutator::new(&mut rng, rates)
                    .with_generator(full_mutation.clone())
                    .mutate_with_crossover(
                        &first.expression,
                        first.size,
                        &donor.expression,
                        donor.size,
                    )?;
                Ok(optimize(&child))
            })
            .collect::<Result<Vec<_>, MutationError>>()?;
        Ok(offspring)
    }

    fn progress(&self) -> SearchProgress {
        let best = self.keeper.best();
        SearchProgress {
            generation: self.generation,
            total_generations: self.config.generation_count,
            best_difference: best.map_or(f64::MAX, |b| b.difference),
            best_size: best.map_or(0, |b| b.size),
            elite_count: self.keeper.len(),
        }
    }

    fn record_history(&mut self) {
        let best = self.keeper.best().map_or(f64::MAX, |b| b.difference);
        self.history.push(best);
    }

    /// Run the search with progress callback.
    pub fn run_with_callback<F>(&mut self, callback: F) -> Result<SearchResult, SearchError>
    where
        F: Fn(&SearchProgress),
    {
        let start_time = Instant::now();
        info!(
            "Starting search: population {}, {} generations, elite capacity {}",
            self.config.population_size,
            self.config.generation_count,
            self.keeper.capacity()
        );

        self.keeper.clear();
        self.history.clear();
        self.generation = 0;
        self.evaluations = 0;

        let population = self.seed_population();
        self.score_population(population)?;
        self.record_history();
        callback(&self.progress());

        let mut stop_reason = StopReason::Completed;
        while self.generation < self.config.generation_count {
            if self.cancelled.load(Ordering::Relaxed) {
                warn!("Search cancelled after {} generations", self.generation);
                stop_reason = StopReason::Cancelled;
                break;
            }

            let offspring = self.breed()?;
            self.score_population(offspring)?;
            self.generation += 1;
            self.record_history();

            let progress = self.progress();
            debug!(
                "Generation {}/{}: best difference {} (size {})",
                progress.generation,
                progress.total_generations,
                progress.best_difference,
                progress.best_size
            );
            callback(&progress);
        }

        let best = self
            .keeper
            .best()
            .cloned()
            .ok_or(SearchError::EmptyPopulation)?;
        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        info!(
            "Search finished in {:.2}s: {} (difference {})",
            elapsed_seconds, best.expression, best.difference
        );

        Ok(SearchResult {
            best,
            stats: SearchStats {
                generations: self.generation,
                evaluations: self.evaluations,
                elapsed_seconds,
                stop_reason,
            },
            history: self.history.clone(),
        })
    }

    /// Run the search (blocking).
    pub fn run(&mut self) -> Result<SearchResult, SearchError> {
        self.run_with_callback(|_| {})
    }
}

/// Draw `draws` entries uniformly from `pool`, returning the best and the
/// runner-up among the draws. Ties keep the earlier draw. A single draw
/// fills both slots; an empty pool yields the "no candidate" sentinel.
pub fn tournament<R: Rng + ?Sized>(
    pool: &[ComputedResult],
    draws: usize,
    rng: &mut R,
) -> (ComputedResult, ComputedResult) {
    if pool.is_empty() {
        return (ComputedResult::default(), ComputedResult::default());
    }
    let mut best: Option<&ComputedResult> = None;
    let mut runner_up: Option<&ComputedResult> = None;
    for _ in 0..draws.max(1) {
        let entry = &pool[rng.gen_range(0..pool.len())];
        match best {
            Some(current) if entry <= current => {
                if runner_up.is_none_or(|second| entry > second) {
                    runner_up = Some(entry);
                }
            }
            _ => runner_up = best.replace(entry),
        }
    }
    let best = best.cloned().unwrap_or_default();
    let runner_up = runner_up.cloned().unwrap_or_else(|| best.clone());
    (best, runner_up)
}

/// Two independent tournaments, keeping the winner of each.
fn select_parents<R: Rng + ?Sized>(
    pool: &[ComputedResult],
    draws: usize,
    rng: &mut R,
) -> (ComputedResult, ComputedResult) {
    let (first, _) = tournament(pool, draws, rng);
    let (second, _) = tournament(pool, draws, rng);
    (first, second)
}

/// Search for an expression whose samples over `x_bound` × `y_bound`
/// approximate `theoretical`, returning the best candidate found.
pub fn generate(
    theoretical: &Grid,
    x_bound: ComputingBound,
    y_bound: ComputingBound,
    config: &SearchConfig,
) -> Result<SearchResult, SearchError> {
    GeneticExpressionGenerator::new(theoretical.clone(), x_bound, y_bound, config.clone())?.run()
}
