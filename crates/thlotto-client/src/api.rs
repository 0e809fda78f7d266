use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

pub mod provider;
pub mod rayriffy;

pub use provider::{ApiProvider, DrawSource, FetchOutcome, PacedExecutor};
pub use rayriffy::{LottoPayload, LottoResponse, RawPrize, RayriffyProvider};

static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// Endpoint settings shared by every request of one provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiCommon {
    pub name: String,
    pub url: String,
    pub timeout_ms: Option<u64>,
}

impl ApiCommon {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_ms.map(std::time::Duration::from_millis)
    }
}
