//! Scenario data sources
//!
//! A [`ScenarioSource`] supplies the starting scenario and a feed of live
//! revenue/expense events. The Pathway HTTP client is the production source;
//! [`MockScenarioSource`] serves the built-in defaults with randomized events.

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::AdvisorError;
use crate::models::{LiveUpdate, LiveUpdateKind, ScenarioInput, ScenarioOverrides};

#[async_trait]
pub trait ScenarioSource: Send + Sync {
    /// Starting scenario for a new session
    async fn initial_scenario(&self) -> crate::Result<ScenarioInput>;

    /// Latest revenue and expense events
    async fn live_updates(&self) -> crate::Result<Vec<LiveUpdate>>;
}

/// Load the starting scenario, falling back to the defaults on any failure
pub async fn load_initial_scenario(source: &dyn ScenarioSource) -> ScenarioInput {
    match source.initial_scenario().await {
        Ok(input) => {
            info!("Loaded initial scenario from data source");
            input
        }
        Err(e) => {
            warn!("Scenario source unavailable, running in offline mode: {}", e);
            ScenarioInput::default()
        }
    }
}

//
// ================= Mock =================
//

/// Offline source: default scenario plus randomized live events
pub struct MockScenarioSource {
    rng: Mutex<StdRng>,
}

impl MockScenarioSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for MockScenarioSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScenarioSource for MockScenarioSource {
    async fn initial_scenario(&self) -> crate::Result<ScenarioInput> {
        Ok(ScenarioInput::default())
    }

    async fn live_updates(&self) -> crate::Result<Vec<LiveUpdate>> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Utc::now();

        Ok(vec![
            LiveUpdate {
                kind: LiveUpdateKind::Revenue,
                amount: rng.gen_range(5_000..25_000),
                description: "New customer payment received".to_string(),
                timestamp: now,
            },
            LiveUpdate {
                kind: LiveUpdateKind::Expense,
                amount: rng.gen_range(2_000..12_000),
                description: "Monthly subscription renewed".to_string(),
                timestamp: now,
            },
        ])
    }
}

//
// ================= Pathway =================
//

/// HTTP client for the Pathway financial data API
pub struct PathwayClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PathwayClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> crate::Result<T> {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AdvisorError::DataSourceError(format!("{} request failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(AdvisorError::DataSourceError(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| AdvisorError::DataSourceError(format!("invalid {} response: {}", path, e)))?;

        envelope.into_data(path)
    }
}

#[async_trait]
impl ScenarioSource for PathwayClient {
    async fn initial_scenario(&self) -> crate::Result<ScenarioInput> {
        let overrides: ScenarioOverrides = self.get("/financial/initial-data").await?;
        scenario_from_overrides(&overrides)
    }

    async fn live_updates(&self) -> crate::Result<Vec<LiveUpdate>> {
        let batch: LiveUpdateBatch = self.get("/financial/live-updates").await?;
        Ok(batch.updates)
    }
}

/// Defaults with the source's fields layered on top
fn scenario_from_overrides(overrides: &ScenarioOverrides) -> crate::Result<ScenarioInput> {
    let mut input = ScenarioInput::default();
    input.apply_overrides(overrides);
    input.validate()?;
    Ok(input)
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self, path: &str) -> crate::Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(AdvisorError::DataSourceError(format!(
                "{} unsuccessful: {}",
                path,
                self.error.unwrap_or_else(|| "no data".to_string())
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiveUpdateBatch {
    #[serde(default)]
    updates: Vec<LiveUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OfflineSource;

    #[async_trait]
    impl ScenarioSource for OfflineSource {
        async fn initial_scenario(&self) -> crate::Result<ScenarioInput> {
            Err(AdvisorError::DataSourceError("connection refused".to_string()))
        }

        async fn live_updates(&self) -> crate::Result<Vec<LiveUpdate>> {
            Err(AdvisorError::DataSourceError("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_offline_source_falls_back_to_defaults() {
        let input = load_initial_scenario(&OfflineSource).await;
        assert_eq!(input, ScenarioInput::default());
    }

    #[tokio::test]
    async fn test_mock_live_updates_in_range() {
        let source = MockScenarioSource::with_seed(7);

        for _ in 0..50 {
            let updates = source.live_updates().await.unwrap();
            assert_eq!(updates.len(), 2);
            assert_eq!(updates[0].kind, LiveUpdateKind::Revenue);
            assert!((5_000..25_000).contains(&updates[0].amount));
            assert_eq!(updates[1].kind, LiveUpdateKind::Expense);
            assert!((2_000..12_000).contains(&updates[1].amount));
        }
    }

    #[tokio::test]
    async fn test_seeded_mock_is_reproducible() {
        let a = MockScenarioSource::with_seed(42).live_updates().await.unwrap();
        let b = MockScenarioSource::with_seed(42).live_updates().await.unwrap();
        assert_eq!(a[0].amount, b[0].amount);
        assert_eq!(a[1].amount, b[1].amount);
    }

    #[test]
    fn test_initial_data_envelope_parsing() {
        let raw = r#"{
            "success": true,
            "data": {
                "monthlySpending": 42000,
                "engineers": 0,
                "currentCash": 750000,
                "lastUpdated": "2024-01-01T00:00:00Z"
            }
        }"#;

        let envelope: Envelope<ScenarioOverrides> = serde_json::from_str(raw).unwrap();
        let input = scenario_from_overrides(&envelope.into_data("/financial/initial-data").unwrap()).unwrap();

        assert_eq!(input.monthly_spending, 42_000.0);
        assert_eq!(input.engineers, 4);
        assert_eq!(input.current_cash, 750_000.0);
        assert_eq!(input.product_price, 450.0);
    }

    #[test]
    fn test_non_positive_source_values_ignored() {
        let overrides = ScenarioOverrides {
            marketing_spend: Some(-5.0),
            ..Default::default()
        };
        let input = scenario_from_overrides(&overrides).unwrap();
        assert_eq!(input.marketing_spend, 18_000.0);
    }

    #[test]
    fn test_unsuccessful_envelope_is_error() {
        let envelope: Envelope<LiveUpdateBatch> =
            serde_json::from_str(r#"{"success": false, "error": "rate limited"}"#).unwrap();
        let err = envelope.into_data("/financial/live-updates").unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_live_update_batch_parsing() {
        let raw = r#"{"updates":[{"type":"revenue","amount":12000,"description":"New customer payment received","timestamp":"2024-01-01T00:00:00Z"}]}"#;
        let batch: LiveUpdateBatch = serde_json::from_str(raw).unwrap();
        assert_eq!(batch.updates[0].kind, LiveUpdateKind::Revenue);
        assert_eq!(batch.updates[0].amount, 12_000);
    }
}
