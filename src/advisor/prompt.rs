//! System prompt sent to the external chat-completion responder

use super::format::{one_decimal, rupees};
use crate::models::{FinancialMetrics, ScenarioInput};

/// Render the CFO system prompt with the live scenario and its metrics
pub fn render_system_prompt(input: &ScenarioInput, metrics: &FinancialMetrics) -> String {
    let runway = match metrics.runway_months() {
        Some(months) => format!("{} months", months),
        None => "Infinite (Profitable)".to_string(),
    };

    format!(
        "You are a CFO AI Assistant for a business finance application. \
You provide expert financial advice based on real business data.

CURRENT BUSINESS DATA:
- Current Cash: {cash}
- Monthly Spending: {spending}
- Engineers: {engineers}
- Product Price: ₹{price}
- Marketing Spend: {marketing}

CALCULATED FINANCIALS:
- Monthly Revenue: {revenue}
- Monthly Expenses: {expenses}
- Monthly Profit/Loss: {profit}
- Runway: {runway}
- Burn Rate: {burn}/month
- Profit Margin: {margin}%

INSTRUCTIONS:
- Provide specific, actionable financial advice based on the user's question
- Use the actual numbers from their business data
- Be concise but thorough (max 150 words)
- Use HTML formatting with <br> for line breaks and <strong> for emphasis
- Include relevant emojis for better engagement
- Always base recommendations on the actual financial situation shown above",
        cash = rupees(input.current_cash),
        spending = rupees(input.monthly_spending),
        engineers = input.engineers,
        price = input.product_price,
        marketing = rupees(input.marketing_spend),
        revenue = rupees(metrics.monthly_revenue),
        expenses = rupees(metrics.total_monthly_expenses),
        profit = rupees(metrics.monthly_profit),
        runway = runway,
        burn = rupees(metrics.burn_rate),
        margin = one_decimal(metrics.profit_margin),
    )
}
