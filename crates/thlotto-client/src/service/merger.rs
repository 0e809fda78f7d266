use std::{fmt::Display, time::Duration};

use crate::{
    api::{DrawSource, FetchOutcome, PacedExecutor},
    config::ClientConfig,
    models::{Dataset, DrawDate},
    store::StoreError,
};

use super::extract::extract;

/// What one merge pass did, date by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Dates committed, in processing order.
    pub added: Vec<DrawDate>,
    /// Category records written across all added dates.
    pub records_added: usize,
    /// Already present before fetching.
    pub skipped: Vec<DrawDate>,
    /// Source had no usable draw.
    pub absent: Vec<DrawDate>,
    /// Could not be fetched; message per date.
    pub failed: Vec<(DrawDate, String)>,
}

impl MergeSummary {
    pub fn new_draws(&self) -> usize {
        self.added.len()
    }

    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty()
    }
}

impl Display for MergeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} added ({} records), {} already present, {} absent, {} failed",
            self.added.len(),
            self.records_added,
            self.skipped.len(),
            self.absent.len(),
            self.failed.len()
        )
    }
}

/// Fetches draws one date at a time and folds them into a [`Dataset`].
#[derive(Debug)]
pub struct Merger<S> {
    source: S,
    executor: PacedExecutor,
    timeout: Duration,
}

impl<S: DrawSource> Merger<S> {
    pub fn new(source: S, pacing: Duration, timeout: Duration) -> Self {
        Self {
            source,
            executor: PacedExecutor::new(pacing),
            timeout,
        }
    }

    pub fn from_config(source: S, config: &ClientConfig) -> Self {
        Self::new(source, config.pacing(), config.timeout())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// One paced, time-limited fetch. A timeout is reported as `Failed`.
    pub async fn fetch(&self, date: DrawDate) -> FetchOutcome {
        let request = tokio::time::timeout(self.timeout, self.source.fetch_one(date));
        match self.executor.execute(request).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => FetchOutcome::Failed(format!("timed out after {:?}", self.timeout)),
        }
    }

    /// Merge `dates` in the order given. Dates already in the dataset are
    /// not fetched; a fetched draw is committed for all its categories or
    /// not at all. Only a dataset invariant violation is an error.
    pub async fn merge_batch(
        &self,
        dataset: &mut Dataset,
        dates: &[DrawDate],
    ) -> Result<MergeSummary, StoreError> {
        let mut summary = MergeSummary::default();

        for &date in dates {
            if dataset.has_draw(date) {
                log::info!("{date}: already present, skipping");
                summary.skipped.push(date);
                continue;
            }

            let payload = match self.fetch(date).await {
                FetchOutcome::Found(payload) => payload,
                FetchOutcome::Absent => {
                    log::warn!("{date}: no draw published");
                    summary.absent.push(date);
                    continue;
                }
                FetchOutcome::Failed(reason) => {
                    log::warn!("{date}: fetch failed: {reason}");
                    summary.failed.push((date, reason));
                    continue;
                }
            };

            let fragments = extract(date, &payload);
            if fragments.is_empty() {
                log::warn!("{date}: response had no recognised prizes");
                summary.absent.push(date);
                continue;
            }
            log::debug!("{date}: source date {:?}", fragments.source_date);

            let records = dataset.append_draw(date, fragments.categories)?;
            log::info!("{date}: added {records} categories");
            summary.added.push(date);
            summary.records_added += records;
        }

        log::info!("Merge finished: {summary}");
        Ok(summary)
    }
}
