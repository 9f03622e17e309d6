use rand::{Rng, SeedableRng, rngs::SmallRng};
use rayon::prelude::*;

use crate::{Error, QuboMatrix, Result, SampleSet, Sampler, SamplerParams};

/// Offline Metropolis annealer over a QUBO.
///
/// Every read starts from its own seeded random state and cools along a
/// geometric inverse-temperature schedule. Reads run in parallel but are
/// collected in read order, so a seed always yields the same sample set.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedAnnealingSampler;

impl SimulatedAnnealingSampler {
    pub fn new() -> Self {
        Self
    }
}

impl Sampler for SimulatedAnnealingSampler {
    fn name(&self) -> &str {
        "simulated-annealing"
    }

    #[qtsp_derive::timer("sampler.anneal")]
    fn sample_qubo(&self, qubo: &QuboMatrix, params: &SamplerParams) -> Result<SampleSet> {
        if params.num_reads == 0 {
            return Err(Error::sampler("num_reads must be at least 1"));
        }
        if params.sweeps == 0 {
            return Err(Error::sampler("sweeps must be at least 1"));
        }
        if let Some(strength) = params.chain_strength {
            log::debug!("sampler.anneal: chain_strength={strength} ignored by local sampler");
        }

        let model = LocalModel::from_qubo(qubo);
        let schedule = beta_schedule(&model, params.sweeps);
        log::debug!(
            "sampler.anneal: vars={} reads={} sweeps={} beta=[{:.4}, {:.4}]",
            model.linear.len(),
            params.num_reads,
            params.sweeps,
            schedule.first().copied().unwrap_or_default(),
            schedule.last().copied().unwrap_or_default(),
        );

        let reads: Vec<Vec<bool>> = (0..params.num_reads)
            .into_par_iter()
            .map(|read| {
                let seed = params.seed.wrapping_add(read as u64);
                model.anneal(&schedule, seed)
            })
            .collect();

        let set = SampleSet::from_reads(qubo, reads);
        if let Some(best) = set.first() {
            log::debug!(
                "sampler.anneal: distinct={} best_energy={:.4}",
                set.len(),
                best.energy
            );
        }
        Ok(set)
    }
}

/// Linear biases plus adjacency lists of the off-diagonal couplings.
struct LocalModel {
    linear: Vec<f64>,
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl LocalModel {
    fn from_qubo(qubo: &QuboMatrix) -> Self {
        let n = qubo.num_variables();
        let mut linear = vec![0.0; n];
        let mut neighbors = vec![Vec::new(); n];
        for ((a, b), value) in qubo.iter() {
            if a == b {
                linear[a] += value;
            } else {
                neighbors[a].push((b, value));
                neighbors[b].push((a, value));
            }
        }
        Self { linear, neighbors }
    }

    fn anneal(&self, schedule: &[f64], seed: u64) -> Vec<bool> {
        let n = self.linear.len();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut state: Vec<bool> = (0..n).map(|_| rng.random::<bool>()).collect();

        // field[i] = linear[i] + sum of couplings to currently set neighbours
        let mut field = self.linear.clone();
        for (i, set) in state.iter().enumerate() {
            if *set {
                for &(j, q) in &self.neighbors[i] {
                    field[j] += q;
                }
            }
        }

        for &beta in schedule {
            for i in 0..n {
                let delta = if state[i] { -field[i] } else { field[i] };
                let accept = delta <= 0.0 || rng.random::<f64>() < (-beta * delta).exp();
                if !accept {
                    continue;
                }
                state[i] = !state[i];
                let sign = if state[i] { 1.0 } else { -1.0 };
                for &(j, q) in &self.neighbors[i] {
                    field[j] += sign * q;
                }
            }
        }
        state
    }

    /// Largest single-flip energy change and smallest non-zero coefficient.
    fn delta_bounds(&self) -> Option<(f64, f64)> {
        let mut max_delta = 0.0_f64;
        let mut min_coeff = f64::INFINITY;
        for (i, &h) in self.linear.iter().enumerate() {
            let mut bound = h.abs();
            if h != 0.0 {
                min_coeff = min_coeff.min(h.abs());
            }
            for &(_, q) in &self.neighbors[i] {
                bound += q.abs();
                if q != 0.0 {
                    min_coeff = min_coeff.min(q.abs());
                }
            }
            max_delta = max_delta.max(bound);
        }
        (max_delta > 0.0 && min_coeff.is_finite()).then_some((max_delta, min_coeff))
    }
}

/// Geometric schedule from a hot start (large flips accepted half the time)
/// to a cold end (smallest flips accepted 1% of the time).
fn beta_schedule(model: &LocalModel, sweeps: usize) -> Vec<f64> {
    let Some((max_delta, min_coeff)) = model.delta_bounds() else {
        return vec![1.0; sweeps];
    };
    let hot = std::f64::consts::LN_2 / max_delta;
    let cold = 100.0_f64.ln() / min_coeff;
    if sweeps == 1 {
        return vec![cold];
    }
    let ratio = (cold / hot).powf(1.0 / (sweeps - 1) as f64);
    std::iter::successors(Some(hot), |beta| Some(beta * ratio))
        .take(sweeps)
        .collect()
}
