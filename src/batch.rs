//! Bounded parallel execution of independent jobs (feature-gated).
//!
//! Every job owns its canvas and a random source seeded from the job, so
//! the results are identical to running the jobs one after another.

use crate::encode::EncodedOutput;
use crate::pipeline::Composer;
use crate::trace::trace_span;
use crate::util::{MarkerFillError, MarkerFillResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// One composition request in encoded form.
#[derive(Clone, Debug)]
pub struct ComposeJob {
    pub template: Vec<u8>,
    pub photos: Vec<Vec<u8>>,
    /// Seed for the job's cosmetic jitter.
    pub seed: u64,
}

impl ComposeJob {
    /// Runs the job on the current thread.
    pub fn run(&self, composer: &Composer) -> MarkerFillResult<EncodedOutput> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        composer.compose_bytes(&self.template, &self.photos, &mut rng)
    }
}

/// Runs `jobs` with at most `max_in_flight` of them in progress at once.
///
/// The outer error reports pool construction failures; each job carries
/// its own result, in input order.
pub fn compose_batch(
    composer: &Composer,
    jobs: &[ComposeJob],
    max_in_flight: usize,
) -> MarkerFillResult<Vec<MarkerFillResult<EncodedOutput>>> {
    if max_in_flight == 0 {
        return Err(MarkerFillError::InvalidConfig {
            reason: "max_in_flight must be at least 1",
        });
    }
    let _span = trace_span!("compose_batch", jobs = jobs.len(), workers = max_in_flight).entered();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_in_flight)
        .build()
        .map_err(|err| MarkerFillError::ThreadPool {
            reason: err.to_string(),
        })?;
    Ok(pool.install(|| jobs.par_iter().map(|job| job.run(composer)).collect()))
}
