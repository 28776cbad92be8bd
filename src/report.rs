//! Scenario reports and share summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use uuid::Uuid;

use crate::advisor::format::{one_decimal, rupees};
use crate::models::{ChartData, FinancialMetrics, ForecastSeries, ScenarioInput};

/// Exported snapshot of a scenario, its metrics, forecast and key insights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub fingerprint: String,
    pub parameters: ScenarioInput,
    pub results: FinancialMetrics,
    pub forecast: ChartData,
    pub insights: Vec<String>,
}

impl ScenarioReport {
    pub fn build(input: &ScenarioInput, metrics: &FinancialMetrics, forecast: &ForecastSeries) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            fingerprint: scenario_fingerprint(input),
            parameters: *input,
            results: *metrics,
            forecast: forecast.chart_data(),
            insights: key_insights(input, metrics),
        }
    }

    /// Plain-text rendering of the report
    pub fn to_text(&self) -> String {
        let p = &self.parameters;
        let r = &self.results;
        let runway = match r.runway_months() {
            Some(months) => format!("{} months", months),
            None => "Infinite (Profitable!)".to_string(),
        };

        let mut out = String::new();
        out.push_str("CFO Helper - Financial Forecast Report\n");
        out.push_str(&format!("Generated on: {}\n\n", self.generated_at.format("%Y-%m-%d")));

        out.push_str("Scenario Parameters:\n");
        out.push_str(&format!("  Monthly Spending: {}\n", rupees(p.monthly_spending)));
        out.push_str(&format!("  Engineers: {}\n", p.engineers));
        out.push_str(&format!("  Product Price: ₹{}\n", p.product_price));
        out.push_str(&format!("  Marketing Spend: {}\n", rupees(p.marketing_spend)));
        out.push_str(&format!("  Current Cash: {}\n\n", rupees(p.current_cash)));

        out.push_str("Forecast Results:\n");
        out.push_str(&format!("  Runway: {}\n", runway));
        out.push_str(&format!("  Monthly Burn Rate: {}\n", rupees(r.burn_rate)));
        out.push_str(&format!("  Profit Margin: {:.2}%\n\n", r.profit_margin));

        out.push_str("Key Insights:\n");
        for insight in &self.insights {
            out.push_str(&format!("  • {}\n", insight));
        }

        out.push_str(&format!(
            "\nReport {} | scenario {}\n",
            self.id,
            &self.fingerprint[..12.min(self.fingerprint.len())]
        ));
        out
    }
}

/// Report insights, most urgent first
pub fn key_insights(input: &ScenarioInput, metrics: &FinancialMetrics) -> Vec<String> {
    let mut insights = Vec::new();

    let runway_note = if metrics.runway < 3.0 {
        "Critical: Less than 3 months runway"
    } else if metrics.runway < 6.0 {
        "Warning: Monitor cash flow closely"
    } else if metrics.has_infinite_runway() {
        "Excellent: Profitable and self-sustaining"
    } else {
        "Healthy: Good runway position"
    };
    insights.push(runway_note.to_string());

    if metrics.profit_margin < 0.0 {
        insights.push("Focus: Improve profitability immediately".to_string());
    } else if metrics.profit_margin > 20.0 {
        insights.push("Opportunity: Consider scaling operations".to_string());
    }

    if input.engineers > 5 {
        insights.push("Consider: Hiring efficiency vs growth".to_string());
    }

    insights
}

/// Short plain-text summary suitable for sharing
pub fn share_text(input: &ScenarioInput, metrics: &FinancialMetrics) -> String {
    let runway = match metrics.runway_months() {
        Some(months) => format!("{} months", months),
        None => "Profitable!".to_string(),
    };

    format!(
        "CFO Helper Scenario:
💰 Current Cash: {cash}
👥 Engineers: {engineers}
💵 Monthly Spending: {spending}
📈 Product Price: ₹{price}
🎯 Marketing: {marketing}

📊 Results:
⏱️ Runway: {runway}
💸 Burn Rate: {burn}/month
📈 Profit Margin: {margin}%",
        cash = rupees(input.current_cash),
        engineers = input.engineers,
        spending = rupees(input.monthly_spending),
        price = input.product_price,
        marketing = rupees(input.marketing_spend),
        runway = runway,
        burn = rupees(metrics.burn_rate),
        margin = one_decimal(metrics.profit_margin),
    )
}

/// SHA256 of the canonical JSON form of a scenario.
/// Streams serialization straight into the hasher.
pub fn scenario_fingerprint(input: &ScenarioInput) -> String {
    let mut hasher = Sha256::new();

    if serde_json::to_writer(&mut HashWriter(&mut hasher), input).is_err() {
        return String::new();
    }

    hex::encode(hasher.finalize())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute_metrics, generate_forecast, FixedRandom};

    fn profitable_input() -> ScenarioInput {
        ScenarioInput {
            monthly_spending: 10_000.0,
            engineers: 8,
            product_price: 500.0,
            marketing_spend: 1_000_000.0,
            current_cash: 250_000.0,
        }
    }

    #[test]
    fn test_default_scenario_insights() {
        let input = ScenarioInput::default();
        let insights = key_insights(&input, &compute_metrics(&input));

        assert_eq!(
            insights,
            vec![
                "Critical: Less than 3 months runway",
                "Focus: Improve profitability immediately",
            ]
        );
    }

    #[test]
    fn test_profitable_scaling_insights() {
        // revenue 5_000_000, expenses 1_650_000
        let input = profitable_input();
        let insights = key_insights(&input, &compute_metrics(&input));

        assert_eq!(
            insights,
            vec![
                "Excellent: Profitable and self-sustaining",
                "Opportunity: Consider scaling operations",
                "Consider: Hiring efficiency vs growth",
            ]
        );
    }

    #[test]
    fn test_warning_and_healthy_runway() {
        let base = ScenarioInput::default();
        let burn = compute_metrics(&base).burn_rate;

        let warn = ScenarioInput { current_cash: burn * 4.0, ..base };
        assert_eq!(key_insights(&warn, &compute_metrics(&warn))[0], "Warning: Monitor cash flow closely");

        let healthy = ScenarioInput { current_cash: burn * 10.0, ..base };
        assert_eq!(key_insights(&healthy, &compute_metrics(&healthy))[0], "Healthy: Good runway position");
    }

    #[test]
    fn test_build_report() {
        let input = ScenarioInput::default();
        let metrics = compute_metrics(&input);
        let forecast = generate_forecast(&input, &metrics, &mut FixedRandom(0.5));

        let report = ScenarioReport::build(&input, &metrics, &forecast);
        assert_eq!(report.parameters, input);
        assert_eq!(report.forecast.months.len(), 6);
        assert_eq!(report.fingerprint, scenario_fingerprint(&input));

        let text = report.to_text();
        assert!(text.contains("Runway: 2 months"));
        assert!(text.contains("Monthly Burn Rate: ₹283,900"));
        assert!(text.contains("Profit Margin: -318.63%"));
        assert!(text.contains("• Critical: Less than 3 months runway"));
    }

    #[test]
    fn test_share_text() {
        let input = ScenarioInput::default();
        let text = share_text(&input, &compute_metrics(&input));

        assert!(text.starts_with("CFO Helper Scenario:\n"));
        assert!(text.contains("💰 Current Cash: ₹600,000"));
        assert!(text.contains("📈 Product Price: ₹450\n"));
        assert!(text.contains("⏱️ Runway: 2 months"));
        assert!(text.ends_with("📈 Profit Margin: -318.6%"));

        let profitable = profitable_input();
        assert!(share_text(&profitable, &compute_metrics(&profitable)).contains("Runway: Profitable!"));
    }

    #[test]
    fn test_fingerprint_identifies_scenarios() {
        let a = ScenarioInput::default();
        let b = ScenarioInput { engineers: 5, ..a };

        assert_eq!(scenario_fingerprint(&a), scenario_fingerprint(&a));
        assert_ne!(scenario_fingerprint(&a), scenario_fingerprint(&b));
        assert_eq!(scenario_fingerprint(&a).len(), 64);
    }
}
