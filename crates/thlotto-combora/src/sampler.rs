use crate::lotto::{HistoricalSet, LottoNumber, NUMBER_SPACE};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod rejection;

/// Attempt budget used when the caller does not pick one.
///
/// With `k` numbers drawn the expected cost is `NUMBER_SPACE / (NUMBER_SPACE - k)`
/// attempts; real history keeps that close to 1, so this cap only trips when
/// the set is (nearly) saturated.
pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;

pub enum Sampler {
    /// Rejection sampling seeded from OS entropy.
    Rejection,
    /// Rejection sampling with a fixed seed, for reproducible runs.
    Seeded(u64),
}

impl AsRef<Self> for Sampler {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl Sampler {
    pub fn create_sampler(sampler: impl AsRef<Self>) -> Box<dyn UniqueSampler> {
        match sampler.as_ref() {
            Self::Rejection => Box::new(rejection::RejectionSampler::from_entropy()),
            Self::Seeded(seed) => Box::new(rejection::RejectionSampler::seeded(*seed)),
        }
    }
}

/// A number never seen in the history, and how many candidates it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleResult {
    pub number: LottoNumber,
    pub attempts: u64,
}

impl Display for SampleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} attempts)", self.number, self.attempts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error(
        "number space effectively saturated: no unseen number after {attempts} attempts ({drawn} of {NUMBER_SPACE} drawn)"
    )]
    Exhausted { attempts: u64, drawn: usize },
}

pub trait UniqueSampler: Send + Sync {
    /// Draw a number absent from `set`. Never mutates `set`.
    fn sample_unique(
        &self,
        set: &HistoricalSet,
        max_attempts: u64,
    ) -> Result<SampleResult, SampleError>;

    /// Draw `count` numbers absent from `set` and distinct from each other.
    fn sample_batch(
        &self,
        set: &HistoricalSet,
        count: usize,
        max_attempts: u64,
    ) -> Result<Vec<SampleResult>, SampleError>;
}

/// Expected number of candidates needed against `set`; infinite once saturated.
pub fn expected_attempts(set: &HistoricalSet) -> f64 {
    let remaining = set.remaining();
    if remaining == 0 {
        f64::INFINITY
    } else {
        f64::from(NUMBER_SPACE) / remaining as f64
    }
}
