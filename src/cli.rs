use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use thlotto_client::{
    ClientConfig, DrawStore, Registry,
    api::RayriffyProvider,
    models::{Dataset, PrizeCategory},
    service::{MergeSummary, Merger, run_backfill, run_update},
};
use thlotto_combora::{LottoNumber, SampleResult, Sampler, expected_attempts};

pub fn command() -> Command {
    Command::new("thlotto")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Thai lottery draw history and never-drawn number picker")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Set verbose output level"),
        )
        .arg(
            Arg::new("data-file")
                .long("data-file")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Dataset JSON file (overrides THLOTTO_DATA_FILE)"),
        )
        .arg(
            Arg::new("pacing-ms")
                .long("pacing-ms")
                .value_parser(value_parser!(u64))
                .global(true)
                .help("Delay between upstream requests in milliseconds"),
        )
        .subcommand(
            Command::new("backfill")
                .about("Fetch every draw back to the configured end year")
                .arg(
                    Arg::new("end-year")
                        .long("end-year")
                        .value_parser(value_parser!(i32))
                        .help("Oldest Buddhist-era year to fetch"),
                ),
        )
        .subcommand(Command::new("update").about("Fetch the latest draw periods"))
        .subcommand(
            Command::new("sample")
                .about("Pick numbers that have never been drawn")
                .arg(
                    Arg::new("count")
                        .long("count")
                        .short('n')
                        .value_parser(value_parser!(usize))
                        .default_value("1")
                        .help("How many distinct numbers to pick"),
                )
                .arg(
                    Arg::new("max-attempts")
                        .long("max-attempts")
                        .value_parser(value_parser!(u64))
                        .help("Candidate budget per number"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Seed for a reproducible pick"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("stats")
                .about("Summarise the dataset")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("check")
                .about("Look up a number in the draw history")
                .arg(Arg::new("number").required(true).help("Six-digit number")),
        )
        .subcommand(Command::new("latest").about("Show the newest draw of each category"))
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON")
}

pub fn log_level(matches: &ArgMatches) -> log::LevelFilter {
    match matches.get_count("verbose") {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Resolve configuration and apply command-line overrides.
pub fn resolve_config(matches: &ArgMatches) -> Result<ClientConfig> {
    let mut config = ClientConfig::load()?;
    if let Some(path) = matches.get_one::<PathBuf>("data-file") {
        config.data_file = path.clone();
    }
    if let Some(&pacing_ms) = matches.get_one::<u64>("pacing-ms") {
        config.pacing_ms = pacing_ms;
    }
    Ok(config)
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;
    let store = DrawStore::new(&config.data_file);

    match matches.subcommand() {
        Some(("backfill", sub)) => {
            let end_year_be = sub
                .get_one::<i32>("end-year")
                .copied()
                .unwrap_or(config.backfill_end_year_be);
            let merger = merger(&config);
            let summary = run_backfill(&store, &merger, today(), end_year_be).await?;
            report(&summary);
        }
        Some(("update", _)) => {
            let merger = merger(&config);
            let summary = run_update(&store, &merger, today()).await?;
            report(&summary);
        }
        Some(("sample", sub)) => sample(&store, &config, sub)?,
        Some(("stats", sub)) => stats(&store, sub.get_flag("json"))?,
        Some(("check", sub)) => {
            let raw = sub
                .get_one::<String>("number")
                .context("number is required")?;
            check(&store, raw)?;
        }
        Some(("latest", _)) => latest(&store)?,
        Some((other, _)) => anyhow::bail!("Unknown command: {other}"),
        None => anyhow::bail!("No command given"),
    }

    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn merger(config: &ClientConfig) -> Merger<RayriffyProvider> {
    let provider = RayriffyProvider::new(config.base_url.clone(), Some(config.timeout_ms));
    log::debug!("Using provider {}", provider.provider_type());
    Merger::from_config(provider, config)
}

fn report(summary: &MergeSummary) {
    println!("{summary}");
    for (date, reason) in &summary.failed {
        println!("  failed {date}: {reason}");
    }
}

/// Read-only load; a corrupt file is an error here rather than moved aside.
fn load(store: &DrawStore) -> Result<Dataset> {
    store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))
}

fn sample(store: &DrawStore, config: &ClientConfig, sub: &ArgMatches) -> Result<()> {
    let dataset = load(store)?;
    let registry = Registry::build(&dataset);
    let set = registry.snapshot();

    let count = sub.get_one::<usize>("count").copied().unwrap_or(1);
    let max_attempts = sub
        .get_one::<u64>("max-attempts")
        .copied()
        .unwrap_or(config.max_attempts);
    let kind = match sub.get_one::<u64>("seed") {
        Some(&seed) => Sampler::Seeded(seed),
        None => Sampler::Rejection,
    };
    let sampler = Sampler::create_sampler(kind);

    log::debug!(
        "Sampling {count} from {} drawn numbers, ~{:.2} attempts each",
        registry.size(),
        expected_attempts(&set)
    );

    let results = sampler.sample_batch(&set, count, max_attempts)?;

    print!("{}", render_samples(&results, sub.get_flag("json"))?);
    Ok(())
}

/// JSON output is always an array of `{number, attempts}`, whatever the count.
fn render_samples(results: &[SampleResult], json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(results)?));
    }
    Ok(results.iter().map(|r| format!("{r}\n")).collect())
}

fn stats(store: &DrawStore, json: bool) -> Result<()> {
    let dataset = load(store)?;
    let stats = Registry::build(&dataset).stats(&dataset);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{stats}");
        let range = &dataset.metadata.date_range;
        if let (Some(from), Some(to)) = (&range.from, &range.to) {
            println!("Range:             {from} to {to}");
        }
    }
    Ok(())
}

fn check(store: &DrawStore, raw: &str) -> Result<()> {
    let number: LottoNumber = raw
        .parse()
        .with_context(|| format!("Not a lottery number: {raw:?}"))?;
    let dataset = load(store)?;
    let hits = dataset.find_number(number);

    if hits.is_empty() {
        println!("{number} has never been drawn");
        return Ok(());
    }

    println!("{number} was drawn {} time(s):", hits.len());
    for hit in &hits {
        println!("  {} {} ({})", hit.date, hit.category, hit.category.name());
    }
    if let Some(first) = dataset.first_prize_match(number) {
        println!("First prize on {}", first.date);
    }
    Ok(())
}

fn latest(store: &DrawStore) -> Result<()> {
    let dataset = load(store)?;
    for category in PrizeCategory::ALL {
        match dataset.latest(category) {
            Some(record) => println!(
                "{:<15} {} {}",
                category.key(),
                record.date,
                record.numbers.join(" ")
            ),
            None => println!("{:<15} -", category.key()),
        }
    }
    Ok(())
}
