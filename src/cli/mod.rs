use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::{
    Agent, GooglePlacesClient, Location, OpenAiClient, Persona, RequestContext,
};

/// A travel-planning agent: attraction and restaurant recommendations from
/// an LLM grounded in live places search.
#[derive(Debug, Parser)]
#[command(name = "trip-agent", version, about)]
struct Cli {
    /// The travel request to send to the agent
    prompt: String,

    /// Map-center latitude for all searches
    #[arg(long)]
    lat: f64,

    /// Map-center longitude for all searches
    #[arg(long)]
    lng: f64,

    /// Active persona, as "name=cat1,cat2" (repeatable)
    #[arg(long = "persona", value_name = "NAME=CATEGORIES")]
    personas: Vec<String>,

    /// The chat model to use
    #[arg(short, long, default_value = "gpt-4o-mini")]
    model: String,

    /// Chat API key (or set OPENAI_API_KEY)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Chat API base URL (or set OPENAI_BASE_URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Places API key (or set PLACES_API_KEY)
    #[arg(long, value_name = "KEY")]
    places_api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 120)]
    timeout: u64,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    temperature: f32,
}

fn parse_persona(raw: &str) -> anyhow::Result<Persona> {
    let (name, categories) = raw
        .split_once('=')
        .with_context(|| format!("persona `{raw}` must look like name=cat1,cat2"))?;
    Ok(Persona::new(
        name.trim(),
        categories
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
    ))
}

/// CLI entry point for the trip-agent tool
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let api_key = cli
        .api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .context("chat API key is required: set OPENAI_API_KEY or pass --api-key")?;
    let places_api_key = cli
        .places_api_key
        .or_else(|| std::env::var("PLACES_API_KEY").ok())
        .context("places API key is required: set PLACES_API_KEY or pass --places-api-key")?;

    let mut model = OpenAiClient::new(api_key)
        .with_model(&cli.model)
        .with_timeout(Duration::from_secs(cli.timeout));
    if let Some(base_url) = cli
        .base_url
        .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
    {
        model = model.with_base_url(base_url);
    }

    let places = GooglePlacesClient::new(places_api_key);

    let personas = cli
        .personas
        .iter()
        .map(|raw| parse_persona(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let ctx = RequestContext::new(Location::new(cli.lat, cli.lng)).with_personas(personas);
    let agent = Agent::new(Arc::new(model), Arc::new(places))
        .with_temperature(cli.temperature);

    info!("running agent: {}", cli.prompt);
    let report = agent.run_with_report(&cli.prompt, &ctx).await?;
    info!(
        tool_rounds = report.tool_rounds,
        "agent execution completed"
    );

    println!("{}", serde_json::to_string_pretty(&report.response)?);
    Ok(())
}
