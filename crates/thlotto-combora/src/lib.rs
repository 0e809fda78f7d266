//! Number-space primitives for the Thai government lottery: the canonical
//! six-digit [`lotto::LottoNumber`], the [`lotto::HistoricalSet`] of numbers
//! already drawn, and samplers that pick numbers absent from that set.

pub mod lotto;
pub mod sampler;

pub use lotto::{HistoricalSet, LottoNumber, NUMBER_SPACE, NumberError};
pub use sampler::{
    DEFAULT_MAX_ATTEMPTS, SampleError, SampleResult, Sampler, UniqueSampler, expected_attempts,
};
