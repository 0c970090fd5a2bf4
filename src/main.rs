//! HR agent service binary.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hr_agent::agent::{AgentOptions, HrAgent};
use hr_agent::cli::Cli;
use hr_agent::config::HrAgentConfig;
use hr_agent::error::HrAgentError;
use hr_agent::provider::{create_provider, http::build_client};
use hr_agent::server::{serve, AppState};
use hr_agent::tools::MockDirectory;
use hr_agent::trace::{LangfuseExporter, Tracer};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hr_agent=debug")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, suggestion = ?e.recovery_suggestion(), "hr-agent failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), HrAgentError> {
    let mut config = HrAgentConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    info!(?config, "configuration loaded");

    let provider = create_provider(&config)?;
    let mut options = AgentOptions::hr(Arc::new(MockDirectory::sample()));
    options.max_tool_iterations = config.agent.max_tool_iterations;
    options.settings.max_tokens = Some(config.anthropic.max_tokens);
    options.settings.temperature = config.anthropic.temperature;

    let mut agent = HrAgent::with_provider(provider, options).with_timeout(config.agent_timeout());

    let mut tracing_worker = None;
    if let Some((public, secret)) = config.langfuse.credentials() {
        let exporter = LangfuseExporter::new(
            build_client(Duration::from_secs(10))?,
            &config.langfuse.host,
            public,
            secret,
        )?;
        info!(endpoint = exporter.endpoint(), "Langfuse tracing enabled");
        let (tracer, worker) = Tracer::spawn(
            Arc::new(exporter),
            config.langfuse.batch_size,
            Duration::from_millis(config.langfuse.flush_interval_ms),
        );
        agent = agent.with_tracer(tracer.clone(), config.pricing.clone());
        tracing_worker = Some((tracer, worker));
    } else {
        info!("Langfuse credentials not set, tracing disabled");
    }

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    serve(listener, AppState::new(agent)).await?;

    if let Some((tracer, worker)) = tracing_worker {
        info!("flushing traces");
        tracer.flush().await;
        drop(tracer);
        let _ = tokio::time::timeout(Duration::from_secs(5), worker).await;
    }
    Ok(())
}
