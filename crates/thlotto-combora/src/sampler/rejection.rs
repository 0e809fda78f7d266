use std::collections::HashSet;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng as _};

use super::{SampleError, SampleResult, UniqueSampler};
use crate::lotto::{HistoricalSet, LottoNumber, NUMBER_SPACE};

/// Rejection sampler over the full number space.
pub struct RejectionSampler {
    rng: Mutex<StdRng>,
}

impl RejectionSampler {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A poisoned lock only means another caller panicked mid-draw; the
        // generator state is still usable.
        let mut guard = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

impl UniqueSampler for RejectionSampler {
    fn sample_unique(
        &self,
        set: &HistoricalSet,
        max_attempts: u64,
    ) -> Result<SampleResult, SampleError> {
        self.with_rng(|rng| sample_unique_with(rng, set, max_attempts))
    }

    fn sample_batch(
        &self,
        set: &HistoricalSet,
        count: usize,
        max_attempts: u64,
    ) -> Result<Vec<SampleResult>, SampleError> {
        self.with_rng(|rng| sample_batch_with(rng, set, count, max_attempts))
    }
}

/// Draw uniformly from `[0, NUMBER_SPACE)` until a candidate is absent
/// from `set`, giving up after `max_attempts` candidates.
pub fn sample_unique_with<R: Rng + ?Sized>(
    rng: &mut R,
    set: &HistoricalSet,
    max_attempts: u64,
) -> Result<SampleResult, SampleError> {
    sample_excluding(rng, set, &HashSet::new(), max_attempts)
}

/// `count` draws, each absent from `set` and from the earlier draws of the
/// batch. Each draw gets its own `max_attempts` budget.
pub fn sample_batch_with<R: Rng + ?Sized>(
    rng: &mut R,
    set: &HistoricalSet,
    count: usize,
    max_attempts: u64,
) -> Result<Vec<SampleResult>, SampleError> {
    let mut picked = HashSet::with_capacity(count);
    let mut results = Vec::with_capacity(count);

    for _ in 0..count {
        let result = sample_excluding(rng, set, &picked, max_attempts)?;
        picked.insert(result.number);
        results.push(result);
    }

    Ok(results)
}

fn sample_excluding<R: Rng + ?Sized>(
    rng: &mut R,
    set: &HistoricalSet,
    picked: &HashSet<LottoNumber>,
    max_attempts: u64,
) -> Result<SampleResult, SampleError> {
    // Nothing left to find: fail without burning the budget.
    if set.remaining() <= picked.len() {
        log::debug!(
            "Sampling skipped: {} drawn, {} already picked",
            set.len(),
            picked.len()
        );
        return Err(SampleError::Exhausted {
            attempts: 0,
            drawn: set.len(),
        });
    }

    for attempts in 1..=max_attempts {
        let candidate = LottoNumber::from_index(rng.gen_range(0..NUMBER_SPACE) as usize);
        if !set.contains(candidate) && !picked.contains(&candidate) {
            log::debug!("Sampled {candidate} after {attempts} attempts");
            return Ok(SampleResult {
                number: candidate,
                attempts,
            });
        }
    }

    log::debug!("Sampling exhausted after {max_attempts} attempts");
    Err(SampleError::Exhausted {
        attempts: max_attempts,
        drawn: set.len(),
    })
}
