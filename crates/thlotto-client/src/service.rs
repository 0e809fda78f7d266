use chrono::NaiveDate;

use crate::{
    api::DrawSource,
    models::{Dataset, DrawDate},
    store::DrawStore,
};

pub mod calendar;
pub mod extract;
pub mod merger;

pub use calendar::{backfill_dates, dates_to_check};
pub use extract::{DrawFragments, extract};
pub use merger::{MergeSummary, Merger};

/// Fetch the latest draw periods into the dataset at `store`.
pub async fn run_update<S: DrawSource>(
    store: &DrawStore,
    merger: &Merger<S>,
    today: NaiveDate,
) -> anyhow::Result<MergeSummary> {
    let dates = dates_to_check(today);
    log::info!(
        "Checking {} recent draw dates: {}",
        dates.len(),
        dates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    run(store, merger, &dates).await
}

/// Walk every draw date back to `end_year_be`, oldest first.
pub async fn run_backfill<S: DrawSource>(
    store: &DrawStore,
    merger: &Merger<S>,
    today: NaiveDate,
    end_year_be: i32,
) -> anyhow::Result<MergeSummary> {
    let mut dates = backfill_dates(today, end_year_be);
    dates.reverse();
    log::info!(
        "Backfilling {} draw dates from {} to {}",
        dates.len(),
        dates.first().map(ToString::to_string).unwrap_or_default(),
        dates.last().map(ToString::to_string).unwrap_or_default()
    );
    run(store, merger, &dates).await
}

async fn run<S: DrawSource>(
    store: &DrawStore,
    merger: &Merger<S>,
    dates: &[DrawDate],
) -> anyhow::Result<MergeSummary> {
    let _lock = store.lock()?;
    let mut dataset = store.load_or_empty()?;

    let summary = merger.merge_batch(&mut dataset, dates).await?;

    if summary.is_unchanged() {
        log::info!("No new draws, leaving {} untouched", store.path().display());
    } else {
        store.save(&dataset)?;
    }
    log_category_summary(&dataset);

    Ok(summary)
}

fn log_category_summary(dataset: &Dataset) {
    for (category, draws) in dataset.categories() {
        log::info!("{category}: {} draws", draws.len());
    }
    let range = &dataset.metadata.date_range;
    if let (Some(from), Some(to)) = (&range.from, &range.to) {
        log::info!(
            "{} draws in total, {from} to {to}",
            dataset.metadata.total_draws
        );
    }
}
