//! The annealing loop: calibration, search rounds, termination.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arena::PointerArena;
use crate::cost::CostEngine;
use crate::error::{Result, SolverError};
use crate::tree::GroupTree;

use super::config::AnnealConfig;
use super::mutation::{self, MoveTable};

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The assignment satisfies every weighted constraint exactly.
    CostZero,
    /// Temperature fell below the frozen floor.
    Frozen,
    /// The sliding-window uphill acceptance rate collapsed: the search
    /// can no longer escape local optima.
    Converged,
    /// The configured round cap was reached.
    MaxRounds,
    /// Cancelled externally at a round boundary.
    Cancelled,
}

/// Outcome of one partition's annealing run. The improved assignment
/// itself lives in the arena the caller passed in.
#[derive(Debug, Clone)]
pub struct AnnealResult {
    pub initial_cost: f64,
    pub final_cost: f64,
    /// Post-calibration starting temperature (0 when the run ended
    /// before any searching was needed).
    pub initial_temperature: f64,
    pub final_temperature: f64,
    pub iterations: usize,
    pub rounds: usize,
    pub accepted_moves: usize,
    pub uphill_proposed: usize,
    pub uphill_accepted: usize,
    pub stop: StopReason,
    /// Cost at the end of each round, after any round rollback.
    pub cost_history: Vec<f64>,
}

/// Executes the annealing state machine over a built tree and arena.
pub struct AnnealRunner;

impl AnnealRunner {
    pub fn run(
        tree: &mut GroupTree,
        arena: &mut PointerArena,
        engine: &CostEngine,
        config: &AnnealConfig,
    ) -> Result<AnnealResult> {
        Self::run_with_cancel(tree, arena, engine, config, None)
    }

    /// Runs with an optional cancellation token, honored at round
    /// boundaries only so a round's rollback invariant is never left
    /// half-applied.
    pub fn run_with_cancel(
        tree: &mut GroupTree,
        arena: &mut PointerArena,
        engine: &CostEngine,
        config: &AnnealConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::run_with_rng(tree, arena, engine, config, cancel, &mut rng)
    }

    /// Runs against a caller-owned generator. Random consumption order
    /// is part of observable behavior; sharing one generator across
    /// setup and search keeps a whole run reproducible from one seed.
    pub fn run_with_rng<R: Rng>(
        tree: &mut GroupTree,
        arena: &mut PointerArena,
        engine: &CostEngine,
        config: &AnnealConfig,
        cancel: Option<Arc<AtomicBool>>,
        rng: &mut R,
    ) -> Result<AnnealResult> {
        config.validate()?;
        let moves = MoveTable::default();
        let n = tree.n_records();
        let initial_cost = engine.total(tree, arena);

        let mut result = AnnealResult {
            initial_cost,
            final_cost: initial_cost,
            initial_temperature: 0.0,
            final_temperature: 0.0,
            iterations: 0,
            rounds: 0,
            accepted_moves: 0,
            uphill_proposed: 0,
            uphill_accepted: 0,
            stop: StopReason::CostZero,
            cost_history: Vec::new(),
        };

        // A perfect starting assignment needs no calibration or search.
        if initial_cost == 0.0 {
            info!("assignment already perfect, skipping search");
            return Ok(result);
        }

        let t0 = match config.initial_temperature {
            Some(t0) => t0,
            None => calibrate(tree, arena, engine, config, &mut *rng)?,
        };
        result.initial_temperature = t0;

        let mut cost = engine.total(tree, arena);
        let mut temperature = t0;
        let mut it_scalar = config.initial_scalar;
        let mut rates: VecDeque<f64> = VecDeque::with_capacity(config.uphill_window);

        let stop = loop {
            // Round-boundary checks; a round either runs in full or is
            // rolled back, never abandoned midway.
            if cost == 0.0 {
                break StopReason::CostZero;
            }
            if temperature < config.frozen_temperature {
                break StopReason::Frozen;
            }
            if !rates.is_empty() {
                let average: f64 = rates.iter().sum::<f64>() / rates.len() as f64;
                if average < config.uphill_threshold {
                    break StopReason::Converged;
                }
            }
            if config.max_rounds > 0 && result.rounds >= config.max_rounds {
                break StopReason::MaxRounds;
            }
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    break StopReason::Cancelled;
                }
            }

            arena.save_to_b();
            let round_start_cost = cost;
            let mut uphill_proposed = 0usize;
            let mut uphill_accepted = 0usize;

            for _ in 0..it_scalar * n {
                arena.save_to_a();
                let kind = moves.pick(&mut *rng);
                let changed = mutation::apply(kind, tree, arena, &mut *rng);

                if let Some((i, j)) = changed {
                    engine.invalidate(tree, &[i, j]);
                    let trial_cost = engine.total(tree, arena);
                    let delta = trial_cost - cost;

                    let accept = if delta < 0.0 {
                        true
                    } else {
                        // Metropolis criterion; a tie has probability 1
                        // and does not count as uphill.
                        let probability = (-delta / temperature).exp();
                        let accepted = rng.random_range(0.0..1.0) < probability;
                        if delta > 0.0 {
                            uphill_proposed += 1;
                            if accepted {
                                uphill_accepted += 1;
                            }
                        }
                        accepted
                    };

                    if accept {
                        cost = trial_cost;
                        result.accepted_moves += 1;
                    } else {
                        arena.load_from_a();
                        // The trial recomputation left fresh caches for
                        // windows that no longer match the arena.
                        engine.invalidate(tree, &[i, j]);
                    }
                }

                temperature *= config.cooling_factor;
                result.iterations += 1;

                if cost == 0.0 {
                    break;
                }
            }

            // A round may wander uphill internally but must never end
            // worse than it began.
            if cost > round_start_cost {
                arena.load_from_b();
                tree.wipe_all_costs();
                cost = round_start_cost;
            }

            let rate = if uphill_proposed == 0 {
                1.0
            } else {
                uphill_accepted as f64 / uphill_proposed as f64
            };
            if rates.len() == config.uphill_window {
                rates.pop_front();
            }
            rates.push_back(rate);
            it_scalar = config.scalar_for(rate);

            result.uphill_proposed += uphill_proposed;
            result.uphill_accepted += uphill_accepted;
            result.rounds += 1;
            result.cost_history.push(cost);
            trace!(
                "round {} cost {cost:.3} T {temperature:.3e} uphill rate {rate:.3} next scalar {it_scalar}",
                result.rounds
            );
        };

        result.final_cost = cost;
        result.final_temperature = temperature;
        result.stop = stop;
        info!(
            "annealing stopped after {} rounds ({} iterations): cost {:.3} -> {:.3}, {:?}",
            result.rounds, result.iterations, result.initial_cost, result.final_cost, result.stop
        );
        Ok(result)
    }
}

/// Derives the starting temperature by sampling uphill cost deltas.
///
/// Mutations are applied without rollback between trials — later samples
/// are biased by earlier accepted damage, which the design accepts as an
/// approximation. The quantile delta is pinned to the configured
/// acceptance probability: `T0 = -q / ln(p)`.
fn calibrate<R: Rng>(
    tree: &mut GroupTree,
    arena: &mut PointerArena,
    engine: &CostEngine,
    config: &AnnealConfig,
    rng: &mut R,
) -> Result<f64> {
    arena.save_to_b();
    let mut samples: Vec<f64> = Vec::with_capacity(config.calibration_samples);
    let mut previous = engine.total(tree, arena);

    let mut iterations = 0usize;
    while samples.len() < config.calibration_samples {
        if iterations >= config.calibration_cap {
            arena.load_from_b();
            tree.wipe_all_costs();
            return Err(SolverError::CalibrationFailed {
                collected: samples.len(),
                needed: config.calibration_samples,
                cap: config.calibration_cap,
            });
        }
        iterations += 1;

        if let Some((i, j)) = mutation::swap_between_nodes(tree, arena, rng) {
            engine.invalidate(tree, &[i, j]);
            let cost = engine.total(tree, arena);
            if cost > previous {
                samples.push(cost - previous);
            }
            previous = cost;
        }
    }

    arena.load_from_b();
    tree.wipe_all_costs();

    samples.sort_by(f64::total_cmp);
    let rank = (config.calibration_quantile * samples.len() as f64).ceil() as usize;
    let quantile = samples[rank.clamp(1, samples.len()) - 1];
    let t0 = -quantile / config.calibration_acceptance.ln();
    debug!(
        "calibrated T0 {t0:.4} from {} uphill samples in {iterations} iterations \
         (q{:.0} delta {quantile:.4})",
        samples.len(),
        config.calibration_quantile * 100.0
    );
    Ok(t0)
}
