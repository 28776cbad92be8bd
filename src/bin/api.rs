use cfo_helper::{
    api::{start_server, ApiState},
    billing::{BillingSink, FlexpriceClient, LoggingBillingSink},
    config::Config,
    datasource::{load_initial_scenario, MockScenarioSource, PathwayClient, ScenarioSource},
    llm::OpenAiClient,
    Advisor, Session,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚀 CFO Helper - API Server");
    info!("📍 Port: {}", config.port);

    let advisor = match &config.openai_api_key {
        Some(key) => {
            let client = OpenAiClient::new(
                key.clone(),
                config.openai_api_url.clone(),
                config.openai_model.clone(),
                config.llm_timeout,
            )?;
            info!("🤖 External advisor enabled ({})", client.model());
            Advisor::with_responder(Arc::new(client), config.llm_timeout)
        }
        None => {
            warn!("⚠️  OPENAI_API_KEY not set, using rule-based advisor only");
            Advisor::local()
        }
    };

    let source: Arc<dyn ScenarioSource> = match &config.pathway_api_url {
        Some(url) => Arc::new(PathwayClient::new(
            url.clone(),
            config.pathway_api_key.clone(),
            config.http_timeout,
        )?),
        None => {
            info!("📡 PATHWAY_API_URL not set, serving mock scenario data");
            Arc::new(MockScenarioSource::new())
        }
    };

    let billing: Arc<dyn BillingSink> = match &config.flexprice_api_url {
        Some(url) => Arc::new(FlexpriceClient::new(
            url.clone(),
            config.billing_user_id.clone(),
            config.http_timeout,
        )?),
        None => {
            info!("💳 FLEXPRICE_API_URL not set, usage is only logged");
            Arc::new(LoggingBillingSink)
        }
    };

    let initial = load_initial_scenario(source.as_ref()).await;
    let external = advisor.has_external_responder();
    let session = Session::new(initial, advisor, billing);

    info!("✅ Session initialized (external advisor: {})", external);
    info!("📡 Starting API server...");

    start_server(ApiState::new(session, source), config.port).await?;

    Ok(())
}
