//! Pay-per-use billing
//!
//! The [`UsageLedger`] is the local source of truth for counts and costs.
//! A [`BillingSink`] mirrors each charge to an external billing service;
//! sink failures are logged and never block the operation being billed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::AdvisorError;
use crate::models::{UsageEvent, UsageType};

pub const DEFAULT_BILLING_USER: &str = "demo-user-123";
const BILLING_API_VERSION: &str = "1.0.0";

/// Running usage counters and costs (INR)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLedger {
    pub scenario_count: u64,
    pub report_count: u64,
    pub scenario_cost: u64,
    pub export_cost: u64,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one use and return the event to forward to a sink
    pub fn record(&mut self, usage_type: UsageType) -> UsageEvent {
        let event = UsageEvent::new(usage_type);
        match usage_type {
            UsageType::Scenario => {
                self.scenario_count += 1;
                self.scenario_cost += event.amount;
            }
            UsageType::ReportExport => {
                self.report_count += 1;
                self.export_cost += event.amount;
            }
        }
        event
    }

    pub fn total_cost(&self) -> u64 {
        self.scenario_cost + self.export_cost
    }

    pub fn summary(&self) -> UsageSummary {
        UsageSummary {
            ledger: self.clone(),
            total_cost: self.total_cost(),
            currency: "INR",
        }
    }
}

/// Ledger plus derived totals, as reported to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    #[serde(flatten)]
    pub ledger: UsageLedger,
    pub total_cost: u64,
    pub currency: &'static str,
}

/// Destination for tracked usage
#[async_trait]
pub trait BillingSink: Send + Sync {
    async fn track_usage(&self, event: &UsageEvent) -> crate::Result<()>;
}

/// Sink that only writes usage to the log
#[derive(Debug, Default, Clone)]
pub struct LoggingBillingSink;

#[async_trait]
impl BillingSink for LoggingBillingSink {
    async fn track_usage(&self, event: &UsageEvent) -> crate::Result<()> {
        info!(
            usage_type = %event.usage_type,
            amount = event.amount,
            "Usage tracked: {} - ₹{}",
            event.usage_type,
            event.amount
        );
        Ok(())
    }
}

/// Forward an event, logging and swallowing sink failures
pub async fn track_or_log(sink: &dyn BillingSink, event: &UsageEvent) {
    if let Err(e) = sink.track_usage(event).await {
        warn!("Usage tracking failed, continuing: {}", e);
    }
}

//
// ================= Flexprice =================
//

/// HTTP client for the Flexprice usage-billing API
pub struct FlexpriceClient {
    client: Client,
    base_url: String,
    user_id: String,
}

impl FlexpriceClient {
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn usage_request(&self, event: &UsageEvent) -> TrackUsageRequest {
        TrackUsageRequest {
            user_id: self.user_id.clone(),
            usage_type: event.usage_type,
            amount: event.amount,
            timestamp: event.timestamp.to_rfc3339(),
            metadata: UsageMetadata {
                feature: event.usage_type.feature().to_string(),
                version: BILLING_API_VERSION.to_string(),
            },
        }
    }
}

#[async_trait]
impl BillingSink for FlexpriceClient {
    async fn track_usage(&self, event: &UsageEvent) -> crate::Result<()> {
        let response = self
            .client
            .post(self.endpoint("/billing/track-usage"))
            .json(&self.usage_request(event))
            .send()
            .await
            .map_err(|e| AdvisorError::BillingError(format!("track-usage request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AdvisorError::BillingError(format!(
                "track-usage returned {}",
                response.status()
            )));
        }

        let receipt: TrackUsageResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::BillingError(format!("invalid track-usage response: {}", e)))?;

        info!(
            bill_id = receipt.data.as_ref().map(|d| d.bill_id.as_str()).unwrap_or("-"),
            "Usage tracked: {} - ₹{}",
            event.usage_type,
            event.amount
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackUsageRequest {
    user_id: String,
    usage_type: UsageType,
    amount: u64,
    timestamp: String,
    metadata: UsageMetadata,
}

#[derive(Debug, Serialize)]
struct UsageMetadata {
    feature: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct TrackUsageResponse {
    #[allow(dead_code)]
    success: bool,
    data: Option<BillReceipt>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillReceipt {
    bill_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenSink {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BillingSink for BrokenSink {
        async fn track_usage(&self, _event: &UsageEvent) -> crate::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AdvisorError::BillingError("billing offline".to_string()))
        }
    }

    #[test]
    fn test_ledger_counts_and_costs() {
        let mut ledger = UsageLedger::new();
        ledger.record(UsageType::Scenario);
        ledger.record(UsageType::Scenario);
        let event = ledger.record(UsageType::ReportExport);

        assert_eq!(event.amount, 10);
        assert_eq!(ledger.scenario_count, 2);
        assert_eq!(ledger.report_count, 1);
        assert_eq!(ledger.scenario_cost, 10);
        assert_eq!(ledger.export_cost, 10);
        assert_eq!(ledger.total_cost(), 20);
    }

    #[test]
    fn test_summary_serialization() {
        let mut ledger = UsageLedger::new();
        ledger.record(UsageType::Scenario);

        let json = serde_json::to_value(ledger.summary()).unwrap();
        assert_eq!(json["scenarioCount"], 1);
        assert_eq!(json["scenarioCost"], 5);
        assert_eq!(json["totalCost"], 5);
        assert_eq!(json["currency"], "INR");
    }

    #[test]
    fn test_track_usage_request_body() {
        let client =
            FlexpriceClient::new("https://billing.test/v1/", "user-1", Duration::from_secs(5)).unwrap();
        let event = UsageEvent::new(UsageType::ReportExport);

        assert_eq!(
            client.endpoint("/billing/track-usage"),
            "https://billing.test/v1/billing/track-usage"
        );

        let json = serde_json::to_value(client.usage_request(&event)).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["usageType"], "report-export");
        assert_eq!(json["amount"], 10);
        assert_eq!(json["metadata"]["feature"], "report-export");
        assert_eq!(json["metadata"]["version"], "1.0.0");
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let sink = BrokenSink {
            calls: AtomicUsize::new(0),
        };
        let event = UsageEvent::new(UsageType::Scenario);

        track_or_log(&sink, &event).await;
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logging_sink_accepts_events() {
        let result = LoggingBillingSink
            .track_usage(&UsageEvent::new(UsageType::Scenario))
            .await;
        assert!(result.is_ok());
    }
}
