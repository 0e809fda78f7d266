//! Historical draw registry for the Thai government lottery: the on-disk
//! dataset, the membership set derived from it, and the ingestion pipeline
//! that keeps it current from the public results API.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

pub mod api;
pub mod config;
pub mod models;
pub mod registry;
pub mod service;
pub mod store;

pub use config::ClientConfig;
pub use registry::{Registry, RegistryStats, build_set};
pub use store::{DrawStore, StoreError};

/// Path of the `.env` file that was loaded, if any.
static ENV_GUARD: LazyLock<Option<PathBuf>> = LazyLock::new(|| dotenvy::dotenv().ok());

/// Load `.env` once per process.
pub fn load_env() -> Option<&'static Path> {
    ENV_GUARD.as_deref()
}

/// Initialise logging. `None` defers to `RUST_LOG`, falling back to `info`.
pub fn setup(level: Option<log::LevelFilter>) {
    load_env();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp_millis();

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }

    match load_env() {
        Some(path) => log::debug!("Loaded environment from {}", path.display()),
        None => log::trace!("No .env file found"),
    }
}
