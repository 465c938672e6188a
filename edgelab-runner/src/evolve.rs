//! Genetic parameter search over the engine's `run(config)` interface.
//!
//! Population of configurations evolved by elitism, crossover among the top
//! performers, and per-gene mutation. Fitness is total P&L (final equity
//! minus starting balance). Fully deterministic for a given seed: the RNG is
//! a seeded `StdRng` and candidate evaluation is a pure function, so the
//! parallel fan-out cannot reorder anything observable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use edgelab_core::domain::BarSeries;
use edgelab_core::engine::{run, ConfigError, EngineConfig};

/// Number of top performers eligible as crossover parents.
const PARENT_POOL: usize = 5;

/// Gene ranges and loop sizing for one evolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Per-gene probability of re-randomizing during mutation.
    pub mutation_rate: f64,
    pub seed: u64,
    pub ma_period_range: (usize, usize),
    pub trailing_stop_range: (f64, f64),
    pub breakeven_trigger_range: (f64, f64),
    pub loss_timeout_range: (u32, u32),
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            generations: 20,
            mutation_rate: 0.2,
            seed: 7,
            ma_period_range: (5, 20),
            trailing_stop_range: (0.05, 0.50),
            breakeven_trigger_range: (0.01, 0.20),
            loss_timeout_range: (5, 50),
        }
    }
}

/// The evolving genes, applied onto a base engine config for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub ma_period: usize,
    pub trailing_stop_distance: f64,
    pub breakeven_trigger_distance: f64,
    pub loss_timeout_bars: u32,
}

impl Genome {
    fn random(rng: &mut StdRng, evo: &EvolutionConfig) -> Self {
        Self {
            ma_period: rng.gen_range(evo.ma_period_range.0..=evo.ma_period_range.1),
            trailing_stop_distance: rng
                .gen_range(evo.trailing_stop_range.0..=evo.trailing_stop_range.1),
            breakeven_trigger_distance: rng
                .gen_range(evo.breakeven_trigger_range.0..=evo.breakeven_trigger_range.1),
            loss_timeout_bars: rng.gen_range(evo.loss_timeout_range.0..=evo.loss_timeout_range.1),
        }
    }

    fn crossover(a: &Genome, b: &Genome, rng: &mut StdRng) -> Self {
        Self {
            ma_period: if rng.gen_bool(0.5) { a.ma_period } else { b.ma_period },
            trailing_stop_distance: if rng.gen_bool(0.5) {
                a.trailing_stop_distance
            } else {
                b.trailing_stop_distance
            },
            breakeven_trigger_distance: if rng.gen_bool(0.5) {
                a.breakeven_trigger_distance
            } else {
                b.breakeven_trigger_distance
            },
            loss_timeout_bars: if rng.gen_bool(0.5) {
                a.loss_timeout_bars
            } else {
                b.loss_timeout_bars
            },
        }
    }

    fn mutate(mut self, rng: &mut StdRng, evo: &EvolutionConfig) -> Self {
        if rng.gen_bool(evo.mutation_rate) {
            self.ma_period = rng.gen_range(evo.ma_period_range.0..=evo.ma_period_range.1);
        }
        if rng.gen_bool(evo.mutation_rate) {
            self.trailing_stop_distance =
                rng.gen_range(evo.trailing_stop_range.0..=evo.trailing_stop_range.1);
        }
        if rng.gen_bool(evo.mutation_rate) {
            self.breakeven_trigger_distance =
                rng.gen_range(evo.breakeven_trigger_range.0..=evo.breakeven_trigger_range.1);
        }
        if rng.gen_bool(evo.mutation_rate) {
            self.loss_timeout_bars =
                rng.gen_range(evo.loss_timeout_range.0..=evo.loss_timeout_range.1);
        }
        self
    }

    fn apply(&self, base: &EngineConfig) -> EngineConfig {
        let mut config = base.clone();
        config.ma_period = self.ma_period;
        config.trailing_stop_distance = self.trailing_stop_distance;
        config.breakeven_trigger_distance = self.breakeven_trigger_distance;
        config.loss_timeout_bars = self.loss_timeout_bars;
        config
    }
}

/// Outcome of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    pub best_genome: Genome,
    pub best_config: EngineConfig,
    pub best_fitness: f64,
    /// Best fitness per generation, for convergence inspection.
    pub history: Vec<f64>,
}

/// Evolve engine parameters against one series.
pub fn evolve(
    series: &BarSeries,
    base: &EngineConfig,
    evo: &EvolutionConfig,
) -> Result<EvolutionResult, ConfigError> {
    assert!(evo.population_size >= 1, "population_size must be >= 1");
    assert!(
        (0.0..=1.0).contains(&evo.mutation_rate),
        "mutation_rate must be within [0, 1]"
    );
    base.validate()?;
    let mut rng = StdRng::seed_from_u64(evo.seed);

    let mut population: Vec<Genome> = (0..evo.population_size)
        .map(|_| Genome::random(&mut rng, evo))
        .collect();
    let mut history = Vec::with_capacity(evo.generations);

    let mut best_genome = population[0];
    let mut best_fitness = f64::NEG_INFINITY;

    for _generation in 0..evo.generations {
        let mut scored: Vec<(Genome, f64)> = population
            .par_iter()
            .map(|genome| {
                let config = genome.apply(base);
                let result = run(series, &config)?;
                Ok((*genome, result.final_equity - config.initial_balance))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        // Stable sort: equal fitness keeps population order, so a fixed seed
        // reproduces the run exactly.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (generation_best, generation_fitness) = scored[0];
        history.push(generation_fitness);
        if generation_fitness > best_fitness {
            best_fitness = generation_fitness;
            best_genome = generation_best;
        }

        // Elitism plus crossover of the top performers.
        let parents: Vec<Genome> = scored
            .iter()
            .take(PARENT_POOL.min(scored.len()))
            .map(|(g, _)| *g)
            .collect();
        let mut next = vec![generation_best];
        while next.len() < evo.population_size {
            let a = parents[rng.gen_range(0..parents.len())];
            let b = parents[rng.gen_range(0..parents.len())];
            next.push(Genome::crossover(&a, &b, &mut rng).mutate(&mut rng, evo));
        }
        population = next;
    }

    Ok(EvolutionResult {
        best_genome,
        best_config: best_genome.apply(base),
        best_fitness,
        history,
    })
}
