use serde::{Deserialize, Serialize};

use super::{ApiCommon, ApiProvider, CLIENT, DrawSource, FetchOutcome};
use crate::models::DrawDate;

pub const STATUS_SUCCESS: &str = "success";

/// Envelope returned by `GET /lotto/{DDMMYYYY}`.
///
/// `response` is left undecoded: error envelopes carry a message string there.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LottoResponse {
    pub status: String,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LottoPayload {
    /// Thai-text date as published, e.g. "16 ธันวาคม 2568". Informational only.
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prizes: Vec<RawPrize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawPrize {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number: Vec<String>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Client for lotto.api.rayriffy.com.
#[derive(Debug, Clone)]
pub struct RayriffyProvider {
    common: ApiCommon,
}

impl RayriffyProvider {
    pub fn new(base_url: impl Into<String>, timeout_ms: Option<u64>) -> Self {
        Self {
            common: ApiCommon {
                name: ApiProvider::Rayriffy.to_string(),
                url: base_url.into(),
                timeout_ms,
            },
        }
    }

    pub fn provider_type(&self) -> ApiProvider {
        ApiProvider::Rayriffy
    }

    fn url_for(&self, date: DrawDate) -> String {
        format!("{}/lotto/{}", self.common.url().trim_end_matches('/'), date.token())
    }

    async fn request(&self, date: DrawDate) -> anyhow::Result<FetchOutcome> {
        let url = self.url_for(date);
        let mut builder = CLIENT.get(&url);
        if let Some(timeout) = self.common.timeout() {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Request to {url} failed: {e}"))?;

        let status = response.status();
        let text = response.text().await?;

        // The envelope decides first, whatever the HTTP status.
        if let Ok(envelope) = serde_json::from_str::<LottoResponse>(&text) {
            return classify(envelope);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::Absent);
        }
        if !status.is_success() {
            log::debug!("{url} returned {status}\n==== Response: ====\n {text}");
            return Err(anyhow::anyhow!("{url} returned status {status}"));
        }
        Err(anyhow::anyhow!("Failed to parse JSON response from {url}"))
    }
}

/// Map a decoded envelope onto a fetch outcome. Any status other than
/// `success` is absent; a success whose payload cannot be decoded is an error.
pub fn classify(envelope: LottoResponse) -> anyhow::Result<FetchOutcome> {
    if envelope.status != STATUS_SUCCESS {
        log::debug!("Source reported status {:?}", envelope.status);
        return Ok(FetchOutcome::Absent);
    }

    match envelope.response {
        None | Some(serde_json::Value::Null) => Ok(FetchOutcome::Absent),
        Some(value) => {
            let payload = serde_json::from_value::<LottoPayload>(value)
                .map_err(|e| anyhow::anyhow!("Failed to parse draw payload: {e}"))?;
            Ok(FetchOutcome::Found(payload))
        }
    }
}

impl DrawSource for RayriffyProvider {
    async fn fetch_one(&self, date: DrawDate) -> FetchOutcome {
        self.request(date)
            .await
            .unwrap_or_else(|e| FetchOutcome::Failed(e.to_string()))
    }
}
