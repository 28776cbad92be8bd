use cfo_helper::{
    config::Config,
    datasource::{load_initial_scenario, MockScenarioSource},
    llm::OpenAiClient,
    Advisor, Session,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLE_QUESTION: &str = "Should I hire more engineers?";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("CFO Helper starting");

    let advisor = match &config.openai_api_key {
        Some(key) => Advisor::with_responder(
            Arc::new(OpenAiClient::new(
                key.clone(),
                config.openai_api_url.clone(),
                config.openai_model.clone(),
                config.llm_timeout,
            )?),
            config.llm_timeout,
        ),
        None => Advisor::local(),
    };

    let input = load_initial_scenario(&MockScenarioSource::new()).await;
    let mut session = Session::new(input, advisor, Arc::new(cfo_helper::billing::LoggingBillingSink));

    let result = session.run_simulation();
    let m = &result.metrics;

    println!("\n=== SCENARIO ===");
    println!("{}", serde_json::to_string_pretty(&result.scenario)?);

    println!("\n=== METRICS ===");
    println!("Monthly Revenue:  {:.0}", m.monthly_revenue);
    println!("Monthly Expenses: {:.0}", m.total_monthly_expenses);
    println!("Monthly Profit:   {:.0}", m.monthly_profit);
    match m.runway_months() {
        Some(months) => println!("Runway:           {} months", months),
        None => println!("Runway:           ∞ (Profitable!)"),
    }
    println!("Profit Margin:    {:.1}%", m.profit_margin);

    println!("\n=== FORECAST ===");
    for period in &result.forecast.periods {
        println!(
            "  {:<8} revenue {:>9}  expenses {:>9}  cash {:>10}",
            period.label, period.revenue, period.expenses, period.cash_balance
        );
    }

    println!("\n=== ADVISOR ===");
    println!("Q: {}", SAMPLE_QUESTION);
    let reply = session.ask(SAMPLE_QUESTION).await;
    println!("A: {}", reply.text.as_str().replace("<br>", "\n").replace("<strong>", "").replace("</strong>", ""));

    let usage = session.usage();
    println!("\nBilled: ₹{} ({} simulation)", usage.total_cost, usage.ledger.scenario_count);

    Ok(())
}
