//! A single user's working session
//!
//! Owns the current scenario, the usage ledger, the advisor and the billing
//! sink. Billable operations record to the ledger synchronously; the charge is
//! then mirrored to the sink on a spawned task, so a slow or unreachable
//! billing service never delays the caller.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::advisor::{Advisor, AdvisorReply};
use crate::billing::{track_or_log, BillingSink, LoggingBillingSink, UsageLedger, UsageSummary};
use crate::engine::{compute_metrics, generate_forecast_with, CashAccumulation};
use crate::models::{
    ChartData, FinancialMetrics, ForecastSeries, ScenarioInput, ScenarioOverrides, UsageEvent,
    UsageType,
};
use crate::report::{scenario_fingerprint, share_text, ScenarioReport};

/// Output of one billed simulation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub scenario: ScenarioInput,
    pub fingerprint: String,
    pub metrics: FinancialMetrics,
    pub forecast: ForecastSeries,
    pub chart: ChartData,
    pub usage: UsageSummary,
}

pub struct Session {
    input: ScenarioInput,
    ledger: UsageLedger,
    advisor: Advisor,
    billing: Arc<dyn BillingSink>,
    rng: StdRng,
    accumulation: CashAccumulation,
    /// Forecast of the last simulation, keyed by the scenario it was drawn for
    last_forecast: Option<(ScenarioInput, ForecastSeries)>,
}

impl Session {
    pub fn new(input: ScenarioInput, advisor: Advisor, billing: Arc<dyn BillingSink>) -> Self {
        Self {
            input,
            ledger: UsageLedger::new(),
            advisor,
            billing,
            rng: StdRng::from_entropy(),
            accumulation: CashAccumulation::default(),
            last_forecast: None,
        }
    }

    /// Offline session: default scenario, local advisor, log-only billing
    pub fn offline() -> Self {
        Self::new(
            ScenarioInput::default(),
            Advisor::local(),
            Arc::new(LoggingBillingSink),
        )
    }

    /// Deterministic forecast jitter
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_accumulation(mut self, accumulation: CashAccumulation) -> Self {
        self.accumulation = accumulation;
        self
    }

    pub fn input(&self) -> &ScenarioInput {
        &self.input
    }

    pub fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    pub fn usage(&self) -> UsageSummary {
        self.ledger.summary()
    }

    /// Metrics for the current scenario; not billed
    pub fn metrics(&self) -> FinancialMetrics {
        compute_metrics(&self.input)
    }

    /// Layer a partial update over the current scenario
    pub fn apply_overrides(&mut self, overrides: &ScenarioOverrides) -> crate::Result<ScenarioInput> {
        let mut next = self.input;
        next.apply_overrides(overrides);
        next.validate()?;
        self.input = next;
        Ok(self.input)
    }

    /// Replace the scenario wholesale
    pub fn set_input(&mut self, input: ScenarioInput) -> crate::Result<()> {
        input.validate()?;
        self.input = input;
        Ok(())
    }

    /// Compute metrics and a forecast for the current scenario, billing one scenario run.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run_simulation(&mut self) -> SimulationResult {
        let metrics = compute_metrics(&self.input);
        let forecast =
            generate_forecast_with(&self.input, &metrics, &mut self.rng, self.accumulation);
        self.last_forecast = Some((self.input, forecast.clone()));

        let event = self.ledger.record(UsageType::Scenario);
        self.bill(event);

        info!(
            scenarios = self.ledger.scenario_count,
            total_cost = self.ledger.total_cost(),
            "Simulation completed"
        );

        SimulationResult {
            scenario: self.input,
            fingerprint: scenario_fingerprint(&self.input),
            metrics,
            chart: forecast.chart_data(),
            forecast,
            usage: self.ledger.summary(),
        }
    }

    /// Build a report for the current scenario, billing one export.
    ///
    /// Reuses the last simulated forecast while the scenario is unchanged.
    /// Must be called from within a Tokio runtime.
    pub fn export_report(&mut self) -> ScenarioReport {
        let metrics = compute_metrics(&self.input);
        let forecast = match &self.last_forecast {
            Some((input, forecast)) if *input == self.input => forecast.clone(),
            _ => generate_forecast_with(&self.input, &metrics, &mut self.rng, self.accumulation),
        };
        let report = ScenarioReport::build(&self.input, &metrics, &forecast);

        let event = self.ledger.record(UsageType::ReportExport);
        self.bill(event);

        info!(report_id = %report.id, "Report exported");
        report
    }

    fn bill(&self, event: UsageEvent) {
        let sink = Arc::clone(&self.billing);
        tokio::spawn(async move {
            track_or_log(sink.as_ref(), &event).await;
        });
    }

    pub fn share_text(&self) -> String {
        share_text(&self.input, &compute_metrics(&self.input))
    }

    /// Ask the advisor about the current scenario
    pub async fn ask(&self, query: &str) -> AdvisorReply {
        self.advisor.ask(query, &self.input).await
    }
}
