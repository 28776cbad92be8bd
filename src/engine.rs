//! Financial projection engine
//!
//! Pure functions from a [`ScenarioInput`] to [`FinancialMetrics`] and a
//! six-period [`ForecastSeries`]. No validation, no failure modes: callers
//! hand in non-negative input.
//!
//! The only stochastic element is the revenue jitter in the forecast, which
//! is drawn from an injected [`RandomSource`].

use crate::models::{FinancialMetrics, ForecastPeriod, ForecastSeries, ScenarioInput};

/// Monthly cost of one engineer (rupees)
pub const ENGINEER_MONTHLY_SALARY: f64 = 80_000.0;
/// Marketing rupees needed to acquire one user
pub const MARKETING_COST_PER_USER: f64 = 100.0;
/// Price at which demand sits at the neutral multiplier of 1.0
pub const PRICE_SWEET_SPOT: f64 = 500.0;
pub const MIN_PRICE_MULTIPLIER: f64 = 0.5;

pub const FORECAST_PERIODS: usize = 6;
/// Total width of the revenue jitter band (±5%)
pub const REVENUE_JITTER: f64 = 0.1;
pub const EXPENSE_GROWTH_PER_PERIOD: f64 = 0.02;

/// Uniform random numbers in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Always returns the same value. `FixedRandom(0.5)` disables jitter.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// How the forecast carries the cash balance between periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CashAccumulation {
    /// Carry the unrounded balance; round only the reported value.
    #[default]
    Exact,
    /// Carry the rounded balance, so rounding error compounds per period.
    Rounded,
}

pub fn engineer_salary(engineers: u32) -> f64 {
    engineers as f64 * ENGINEER_MONTHLY_SALARY
}

/// Demand multiplier; falls linearly with price, floored at 0.5
pub fn price_multiplier(product_price: f64) -> f64 {
    (2.0 - product_price / PRICE_SWEET_SPOT).max(MIN_PRICE_MULTIPLIER)
}

pub fn base_users(marketing_spend: f64) -> f64 {
    (marketing_spend / MARKETING_COST_PER_USER).floor()
}

/// Derive all metrics for a scenario
pub fn compute_metrics(input: &ScenarioInput) -> FinancialMetrics {
    let total_monthly_expenses =
        input.monthly_spending + engineer_salary(input.engineers) + input.marketing_spend;

    let monthly_revenue = base_users(input.marketing_spend)
        * input.product_price
        * price_multiplier(input.product_price);

    let monthly_profit = monthly_revenue - total_monthly_expenses;

    let runway = if monthly_profit < 0.0 {
        input.current_cash / monthly_profit.abs()
    } else {
        f64::INFINITY
    };

    // Absent unless already profitable; not the mirror image of runway.
    let break_even_months = if monthly_profit > 0.0 {
        Some(input.current_cash / monthly_revenue)
    } else {
        None
    };

    let profit_margin = if monthly_revenue > 0.0 {
        monthly_profit / monthly_revenue * 100.0
    } else {
        0.0
    };

    let burn_rate = if monthly_profit < 0.0 {
        monthly_profit.abs()
    } else {
        0.0
    };

    FinancialMetrics {
        monthly_revenue,
        total_monthly_expenses,
        monthly_profit,
        runway,
        break_even_months,
        profit_margin,
        burn_rate,
    }
}

/// Six-month forecast with exact cash accumulation
pub fn generate_forecast<R: RandomSource + ?Sized>(
    input: &ScenarioInput,
    metrics: &FinancialMetrics,
    random: &mut R,
) -> ForecastSeries {
    generate_forecast_with(input, metrics, random, CashAccumulation::default())
}

pub fn generate_forecast_with<R: RandomSource + ?Sized>(
    input: &ScenarioInput,
    metrics: &FinancialMetrics,
    random: &mut R,
    accumulation: CashAccumulation,
) -> ForecastSeries {
    let mut periods = Vec::with_capacity(FORECAST_PERIODS);
    let mut cash = input.current_cash;

    for i in 0..FORECAST_PERIODS {
        let growth_factor = 1.0 + (random.next_unit() - 0.5) * REVENUE_JITTER;
        let revenue = metrics.monthly_revenue * growth_factor;
        let expenses =
            metrics.total_monthly_expenses * (1.0 + i as f64 * EXPENSE_GROWTH_PER_PERIOD);

        cash += revenue - expenses;
        if accumulation == CashAccumulation::Rounded {
            cash = round_half_up(cash);
        }

        periods.push(ForecastPeriod {
            label: format!("Month {}", i + 1),
            revenue: round_half_up(revenue) as i64,
            expenses: round_half_up(expenses) as i64,
            cash_balance: round_half_up(cash) as i64,
        });
    }

    ForecastSeries { periods }
}

/// Round to nearest integer, ties toward positive infinity
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

//
// ================= Tests =================
//
