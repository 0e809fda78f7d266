#![warn(clippy::all, rust_2018_idioms)]

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = thlotto::cli::command().get_matches();

    thlotto_client::setup(Some(thlotto::cli::log_level(&matches)));

    thlotto::cli::run(&matches).await.inspect_err(|e| {
        log::error!("{e:#}");
    })
}
