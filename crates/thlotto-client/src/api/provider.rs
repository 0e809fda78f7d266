use std::time::{Duration, Instant};

use strum_macros::{Display, EnumIter};
use tokio::sync::Mutex;

use crate::models::DrawDate;

use super::LottoPayload;

/// Upstream sources of draw results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ApiProvider {
    /// lotto.api.rayriffy.com
    #[strum(to_string = "rayriffy")]
    Rayriffy,
}

impl ApiProvider {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Rayriffy => "rayriffy",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Rayriffy => "https://lotto.api.rayriffy.com",
        }
    }
}

impl std::str::FromStr for ApiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rayriffy" => Ok(Self::Rayriffy),
            _ => Err(format!("Invalid provider: {s}")),
        }
    }
}

/// Result of asking a source for one draw date.
///
/// `Absent` and `Failed` are both "nothing to merge"; they are kept apart so
/// a run can report dates that had no draw separately from dates that could
/// not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(LottoPayload),
    Absent,
    Failed(String),
}

impl FetchOutcome {
    pub fn payload(self) -> Option<LottoPayload> {
        match self {
            Self::Found(payload) => Some(payload),
            Self::Absent | Self::Failed(_) => None,
        }
    }
}

/// Anything that can look up the published results for a draw date.
#[expect(async_fn_in_trait)]
pub trait DrawSource {
    async fn fetch_one(&self, date: DrawDate) -> FetchOutcome;
}

/// Serialises calls and keeps at least `interval` between the end of one
/// call and the start of the next.
#[derive(Debug)]
pub struct PacedExecutor {
    interval: Duration,
    last_request_time: Mutex<Option<Instant>>,
}

impl PacedExecutor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request_time: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn execute<F, T>(&self, request: F) -> T
    where
        F: Future<Output = T>,
    {
        // Held across the request so concurrent callers queue up.
        let mut last_time = self.last_request_time.lock().await;

        let delay = last_time
            .map(|t| self.interval.saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        if delay > Duration::ZERO {
            log::trace!("Pacing: waiting {delay:?}");
            tokio::time::sleep(delay).await;
        }

        let response = request.await;
        *last_time = Some(Instant::now());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_is_not_delayed() {
        let executor = PacedExecutor::new(Duration::from_millis(200));
        let start = Instant::now();
        let value = executor.execute(async { 7 }).await;
        assert_eq!(value, 7);
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn consecutive_calls_are_spaced() {
        let executor = PacedExecutor::new(Duration::from_millis(50));
        let start = Instant::now();
        for _ in 0..3 {
            executor.execute(async {}).await;
        }
        assert!(
            start.elapsed() >= Duration::from_millis(100),
            "three calls need two full intervals, took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn provider_parses_from_id() {
        assert_eq!("Rayriffy".parse::<ApiProvider>(), Ok(ApiProvider::Rayriffy));
        assert_eq!(ApiProvider::Rayriffy.to_string(), ApiProvider::Rayriffy.id());
        assert!("sanook".parse::<ApiProvider>().is_err());
    }
}
