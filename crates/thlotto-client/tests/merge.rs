use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use thlotto_client::{
    DrawStore, Registry,
    api::{DrawSource, FetchOutcome, LottoPayload, RawPrize},
    models::{Dataset, DrawDate, DrawRecord, PrizeCategory},
    service::{Merger, run_backfill, run_update},
};

#[derive(Clone)]
enum Reply {
    Draw(LottoPayload),
    Fail(&'static str),
    Hang,
}

/// In-memory source keyed by `DDMMYYYY` token; unknown dates are absent.
#[derive(Default)]
struct StubSource {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl StubSource {
    fn with_draw(mut self, token: &str, prizes: &[(&str, &[&str])]) -> Self {
        let payload = LottoPayload {
            date: format!("draw {token}"),
            prizes: prizes
                .iter()
                .map(|(id, numbers)| RawPrize {
                    id: (*id).to_owned(),
                    number: numbers.iter().map(|s| (*s).to_owned()).collect(),
                })
                .collect(),
        };
        self.replies.insert(token.to_owned(), Reply::Draw(payload));
        self
    }

    fn with_reply(mut self, token: &str, reply: Reply) -> Self {
        self.replies.insert(token.to_owned(), reply);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl DrawSource for StubSource {
    async fn fetch_one(&self, date: DrawDate) -> FetchOutcome {
        let token = date.token();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(token.clone());
        }
        match self.replies.get(&token).cloned() {
            Some(Reply::Draw(payload)) => FetchOutcome::Found(payload),
            Some(Reply::Fail(reason)) => FetchOutcome::Failed(reason.to_owned()),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                FetchOutcome::Absent
            }
            None => FetchOutcome::Absent,
        }
    }
}

fn merger(source: StubSource) -> Merger<StubSource> {
    Merger::new(source, Duration::ZERO, Duration::from_secs(5))
}

fn date(token: &str) -> anyhow::Result<DrawDate> {
    Ok(DrawDate::from_token(token)?)
}

const THREE_CATEGORIES: &[(&str, &[&str])] = &[
    ("prizeFirst", &["123456"]),
    ("prizeSecond", &["111111", "222222"]),
    ("prizeFifth", &["000005"]),
];

#[tokio::test]
async fn existing_draw_is_not_fetched_again() -> anyhow::Result<()> {
    let mut dataset = Dataset::empty();
    dataset.append(
        PrizeCategory::First,
        DrawRecord {
            date: "16/12/2568".to_owned(),
            numbers: vec!["123456".to_owned()],
        },
    )?;
    let merger = merger(StubSource::default().with_draw("16122568", &[("prizeFirst", &["123456"])]));

    let summary = merger
        .merge_batch(&mut dataset, &[date("16122568")?])
        .await?;

    assert_eq!(summary.new_draws(), 0);
    assert_eq!(summary.skipped.len(), 1);
    assert!(merger.source().calls().is_empty());
    assert_eq!(dataset.total_draws(), 1);
    Ok(())
}

#[tokio::test]
async fn two_dates_fill_three_categories() -> anyhow::Result<()> {
    let merger = merger(
        StubSource::default()
            .with_draw("01122568", THREE_CATEGORIES)
            .with_draw("16122568", THREE_CATEGORIES),
    );
    let mut dataset = Dataset::empty();

    let summary = merger
        .merge_batch(&mut dataset, &[date("01122568")?, date("16122568")?])
        .await?;

    assert_eq!(summary.new_draws(), 2);
    assert_eq!(summary.records_added, 6);
    for (category, draws) in dataset.categories() {
        let expected = match category {
            PrizeCategory::First | PrizeCategory::Second | PrizeCategory::Fifth => 2,
            _ => 0,
        };
        assert_eq!(draws.len(), expected, "{category}");
    }
    assert_eq!(dataset.metadata.total_draws, 2);
    assert_eq!(dataset.metadata.date_range.from.as_deref(), Some("01/12/2568"));
    assert_eq!(dataset.metadata.date_range.to.as_deref(), Some("16/12/2568"));
    assert_eq!(
        dataset.latest(PrizeCategory::First).map(|r| r.date.as_str()),
        Some("16/12/2568")
    );
    Ok(())
}

#[tokio::test]
async fn merge_is_idempotent() -> anyhow::Result<()> {
    let merger = merger(
        StubSource::default()
            .with_draw("01122568", THREE_CATEGORIES)
            .with_draw("16122568", THREE_CATEGORIES),
    );
    let dates = [date("16122568")?, date("01122568")?];
    let mut dataset = Dataset::empty();

    merger.merge_batch(&mut dataset, &dates).await?;
    let after_first = dataset.clone();
    let summary = merger.merge_batch(&mut dataset, &dates).await?;

    assert_eq!(summary.new_draws(), 0);
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(dataset, after_first);
    Ok(())
}

#[tokio::test]
async fn absent_failed_and_timed_out_dates_are_counted_apart() -> anyhow::Result<()> {
    let source = StubSource::default()
        .with_draw("16122568", THREE_CATEGORIES)
        .with_reply("01122568", Reply::Fail("connection reset"))
        .with_reply("16112568", Reply::Hang)
        .with_draw("01112568", &[("runningNumberBackTwo", &["56"])]);
    let merger = Merger::new(source, Duration::ZERO, Duration::from_millis(50));
    let mut dataset = Dataset::empty();

    let summary = merger
        .merge_batch(
            &mut dataset,
            &[
                date("16122568")?,
                date("01122568")?,
                date("16112568")?,
                date("01112568")?,
                date("16102568")?,
            ],
        )
        .await?;

    assert_eq!(summary.added, [date("16122568")?]);
    assert_eq!(summary.failed.len(), 2);
    assert!(summary.failed.iter().any(|(_, r)| r.contains("timed out")));
    // One unrecognised-only response and one unknown date.
    assert_eq!(summary.absent.len(), 2);
    assert_eq!(dataset.total_draws(), 1);
    Ok(())
}

#[tokio::test]
async fn fetches_are_paced() -> anyhow::Result<()> {
    let merger = Merger::new(StubSource::default(), Duration::from_millis(40), Duration::from_secs(1));
    let mut dataset = Dataset::empty();
    let start = Instant::now();

    merger
        .merge_batch(
            &mut dataset,
            &[date("01012568")?, date("16012568")?, date("01022568")?],
        )
        .await?;

    assert_eq!(merger.source().calls().len(), 3);
    assert!(start.elapsed() >= Duration::from_millis(80));
    Ok(())
}

#[tokio::test]
async fn merged_numbers_reach_the_registry() -> anyhow::Result<()> {
    let merger = merger(StubSource::default().with_draw(
        "16122568",
        &[("prizeFirst", &["5"]), ("prizeFifth", &["000005", "654321"])],
    ));
    let mut dataset = Dataset::empty();
    let mut registry = Registry::build(&dataset);

    merger.merge_batch(&mut dataset, &[date("16122568")?]).await?;
    assert!(registry.refresh(&dataset));

    assert_eq!(registry.size(), 2);
    assert!(registry.contains("5"));
    assert!(registry.contains("654321"));
    Ok(())
}

#[tokio::test]
async fn update_writes_file_once_and_reruns_cleanly() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = DrawStore::new(dir.path().join("lotto.json"));
    let today = chrono::NaiveDate::from_ymd_opt(2025, 12, 20)
        .ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let merger = merger(
        StubSource::default()
            .with_draw("16122568", THREE_CATEGORIES)
            .with_draw("16112568", THREE_CATEGORIES),
    );

    let first = run_update(&store, &merger, today).await?;
    assert_eq!(first.new_draws(), 2);
    assert!(store.path().exists());
    assert!(!dir.path().join("lotto.json.lock").exists(), "lock released");

    let second = run_update(&store, &merger, today).await?;
    assert_eq!(second.new_draws(), 0);

    let dataset = store.load()?;
    assert_eq!(dataset.total_draws(), 2);
    Ok(())
}

#[tokio::test]
async fn backfill_merges_oldest_first() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = DrawStore::new(dir.path().join("lotto.json"));
    let today = chrono::NaiveDate::from_ymd_opt(2025, 2, 3)
        .ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let merger = merger(
        StubSource::default()
            .with_draw("01012568", THREE_CATEGORIES)
            .with_draw("16012568", THREE_CATEGORIES)
            .with_draw("01022568", THREE_CATEGORIES),
    );

    let summary = run_backfill(&store, &merger, today, 2568).await?;

    assert_eq!(
        merger.source().calls(),
        ["01012568", "16012568", "01022568"]
    );
    assert_eq!(summary.new_draws(), 3);
    let dataset = store.load()?;
    let dates: Vec<&str> = dataset
        .category(PrizeCategory::First)
        .draws
        .iter()
        .map(|d| d.date.as_str())
        .collect();
    assert_eq!(dates, ["01/02/2568", "16/01/2568", "01/01/2568"]);
    Ok(())
}

#[tokio::test]
async fn store_write_failure_aborts_the_run_and_releases_the_lock() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    // A directory squatting on the temp-file path lets the load succeed but
    // makes the save fail.
    let path = dir.path().join("lotto.json");
    let tmp = dir.path().join("lotto.json.tmp");
    std::fs::create_dir(&tmp)?;
    std::fs::write(tmp.join("keep"), "x")?;
    let store = DrawStore::new(&path);
    let today = chrono::NaiveDate::from_ymd_opt(2025, 12, 20)
        .ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let merger = merger(StubSource::default().with_draw("16122568", THREE_CATEGORIES));

    let result = run_update(&store, &merger, today).await;

    let err = result.err().ok_or_else(|| anyhow::anyhow!("run must fail"))?;
    assert!(
        err.downcast_ref::<thlotto_client::StoreError>()
            .is_some_and(|e| matches!(e, thlotto_client::StoreError::Write { .. })),
        "{err:#}"
    );
    assert!(!dir.path().join("lotto.json.lock").exists(), "lock released");
    assert!(!path.exists(), "nothing may be half-written");
    Ok(())
}
