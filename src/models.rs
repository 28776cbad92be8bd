//! Core data models for the scenario engine and advisor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AdvisorError;

//
// ================= Scenario =================
//

/// Snapshot of the five user-controlled scenario inputs.
///
/// Monetary fields are in rupees. Values are expected to be non-negative;
/// use [`ScenarioInput::validate`] at trust boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    pub monthly_spending: f64,
    pub engineers: u32,
    pub product_price: f64,
    pub marketing_spend: f64,
    pub current_cash: f64,
}

impl Default for ScenarioInput {
    fn default() -> Self {
        Self {
            monthly_spending: 35_000.0,
            engineers: 4,
            product_price: 450.0,
            marketing_spend: 18_000.0,
            current_cash: 600_000.0,
        }
    }
}

impl ScenarioInput {
    /// Reject negative or non-finite monetary fields
    pub fn validate(&self) -> crate::Result<()> {
        let fields = [
            ("monthlySpending", self.monthly_spending),
            ("productPrice", self.product_price),
            ("marketingSpend", self.marketing_spend),
            ("currentCash", self.current_cash),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(AdvisorError::InvalidInput(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Apply a partial update; last write wins, absent or zero fields are ignored.
    pub fn apply_overrides(&mut self, overrides: &ScenarioOverrides) {
        if let Some(v) = overrides.monthly_spending.filter(|v| *v > 0.0) {
            self.monthly_spending = v;
        }
        if let Some(v) = overrides.engineers.filter(|v| *v > 0) {
            self.engineers = v;
        }
        if let Some(v) = overrides.product_price.filter(|v| *v > 0.0) {
            self.product_price = v;
        }
        if let Some(v) = overrides.marketing_spend.filter(|v| *v > 0.0) {
            self.marketing_spend = v;
        }
        if let Some(v) = overrides.current_cash.filter(|v| *v > 0.0) {
            self.current_cash = v;
        }
    }
}

/// Partial scenario update pushed by a data source or the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOverrides {
    #[serde(default)]
    pub monthly_spending: Option<f64>,
    #[serde(default)]
    pub engineers: Option<u32>,
    #[serde(default)]
    pub product_price: Option<f64>,
    #[serde(default)]
    pub marketing_spend: Option<f64>,
    #[serde(default)]
    pub current_cash: Option<f64>,
}

impl ScenarioOverrides {
    /// Reject negative or non-finite values in the fields that are present
    pub fn validate(&self) -> crate::Result<()> {
        let fields = [
            ("monthlySpending", self.monthly_spending),
            ("productPrice", self.product_price),
            ("marketingSpend", self.marketing_spend),
            ("currentCash", self.current_cash),
        ];

        for (name, value) in fields {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(AdvisorError::InvalidInput(format!(
                        "{} must be a non-negative number, got {}",
                        name, value
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<ScenarioInput> for ScenarioOverrides {
    fn from(input: ScenarioInput) -> Self {
        Self {
            monthly_spending: Some(input.monthly_spending),
            engineers: Some(input.engineers),
            product_price: Some(input.product_price),
            marketing_spend: Some(input.marketing_spend),
            current_cash: Some(input.current_cash),
        }
    }
}

//
// ================= Metrics =================
//

/// Metrics derived from a [`ScenarioInput`]. Never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub monthly_revenue: f64,
    pub total_monthly_expenses: f64,
    pub monthly_profit: f64,
    /// Months of cash left; `f64::INFINITY` when not losing money.
    /// Serialized as `null` when infinite.
    #[serde(with = "infinite_as_null")]
    pub runway: f64,
    /// Only present when already profitable.
    pub break_even_months: Option<f64>,
    pub profit_margin: f64,
    pub burn_rate: f64,
}

impl FinancialMetrics {
    pub fn is_profitable(&self) -> bool {
        self.monthly_profit > 0.0
    }

    pub fn has_infinite_runway(&self) -> bool {
        self.runway.is_infinite()
    }

    /// Runway rounded to whole months, `None` when infinite
    pub fn runway_months(&self) -> Option<i64> {
        if self.runway.is_finite() {
            Some(self.runway.round() as i64)
        } else {
            None
        }
    }
}

mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

//
// ================= Forecast =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub label: String,
    pub revenue: i64,
    pub expenses: i64,
    pub cash_balance: i64,
}

/// Ordered forecast periods ("Month 1".."Month 6").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub periods: Vec<ForecastPeriod>,
}

/// Columnar view of a forecast for chart consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub months: Vec<String>,
    pub cash_balance: Vec<i64>,
    pub revenue: Vec<i64>,
    pub expenses: Vec<i64>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn final_cash_balance(&self) -> Option<i64> {
        self.periods.last().map(|p| p.cash_balance)
    }

    pub fn chart_data(&self) -> ChartData {
        let n = self.periods.len();
        let mut data = ChartData {
            months: Vec::with_capacity(n),
            cash_balance: Vec::with_capacity(n),
            revenue: Vec::with_capacity(n),
            expenses: Vec::with_capacity(n),
        };

        for period in &self.periods {
            data.months.push(period.label.clone());
            data.cash_balance.push(period.cash_balance);
            data.revenue.push(period.revenue);
            data.expenses.push(period.expenses);
        }

        data
    }
}

//
// ================= Usage =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum UsageType {
    Scenario,
    ReportExport,
}

impl UsageType {
    /// Fixed charge in rupees per use
    pub fn unit_cost(&self) -> u64 {
        match self {
            UsageType::Scenario => 5,
            UsageType::ReportExport => 10,
        }
    }

    /// Billing feature tag sent with tracked usage
    pub fn feature(&self) -> &'static str {
        match self {
            UsageType::Scenario => "simulation",
            UsageType::ReportExport => "report-export",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub usage_type: UsageType,
    pub amount: u64,
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    pub fn new(usage_type: UsageType) -> Self {
        Self {
            usage_type,
            amount: usage_type.unit_cost(),
            timestamp: Utc::now(),
        }
    }
}

//
// ================= Live Data =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LiveUpdateKind {
    Revenue,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiveUpdate {
    #[serde(rename = "type")]
    pub kind: LiveUpdateKind,
    pub amount: u64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

//
// ================= Advice =================
//

/// Rendered advice with inline emphasis and line-break markup.
///
/// The markup is opaque to this crate; callers render it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(String);

impl RichText {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UsageType::Scenario => "scenario",
            UsageType::ReportExport => "report-export",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for LiveUpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LiveUpdateKind::Revenue => "revenue",
            LiveUpdateKind::Expense => "expense",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_negative_fields() {
        let mut input = ScenarioInput::default();
        assert!(input.validate().is_ok());

        input.marketing_spend = -1.0;
        let err = input.validate().unwrap_err().to_string();
        assert!(err.contains("marketingSpend"));

        input.marketing_spend = f64::NAN;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_overrides_ignore_absent_and_zero_fields() {
        let mut input = ScenarioInput::default();
        input.apply_overrides(&ScenarioOverrides {
            engineers: Some(0),
            current_cash: Some(900_000.0),
            ..Default::default()
        });

        assert_eq!(input.engineers, 4);
        assert_eq!(input.current_cash, 900_000.0);
        assert_eq!(input.monthly_spending, 35_000.0);
    }

    #[test]
    fn test_infinite_runway_serializes_as_null() {
        let metrics = FinancialMetrics {
            monthly_revenue: 100.0,
            total_monthly_expenses: 50.0,
            monthly_profit: 50.0,
            runway: f64::INFINITY,
            break_even_months: Some(2.0),
            profit_margin: 50.0,
            burn_rate: 0.0,
        };

        let json = serde_json::to_value(metrics).unwrap();
        assert!(json["runway"].is_null());
        assert_eq!(json["breakEvenMonths"], 2.0);

        let back: FinancialMetrics = serde_json::from_value(json).unwrap();
        assert!(back.has_infinite_runway());
    }

    #[test]
    fn test_scenario_input_uses_camel_case() {
        let json = serde_json::to_string(&ScenarioInput::default()).unwrap();
        assert!(json.contains("\"monthlySpending\":35000.0"));
        assert!(json.contains("\"currentCash\":600000.0"));
    }
}
