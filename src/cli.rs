//! Command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::analyzer::ProposalAnalyzer;
use crate::config::{config_path, Config};
use crate::gas::GasEstimator;
use crate::llm::LlmClient;
use crate::registry::AgentEvent;
use crate::server;
use crate::synthesis::{LlmReportGenerator, ReportGenerator};
use crate::types::AnalysisResult;

#[derive(Parser)]
#[command(name = "dao-analyst")]
#[command(about = "Multi-agent DAO governance proposal analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a governance proposal URL
    Analyze {
        /// Proposal URL (Snapshot, Tally, forum thread, ...)
        url: String,
        /// Print the raw JSON report instead of the formatted summary
        #[arg(long)]
        json: bool,
    },
    /// Run the analysis proxy server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Estimate the gas cost of a value transfer
    Estimate {
        /// Recipient address or .eth name
        recipient: String,
        /// Amount in ETH
        #[arg(default_value_t = 0.0)]
        amount: f64,
    },
    /// Show or update configuration
    Config {
        /// Store an API key for the report-synthesis provider
        #[arg(long, value_name = "KEY")]
        set_api_key: Option<String>,
        /// Set the synthesis model
        #[arg(long, value_name = "MODEL")]
        set_model: Option<String>,
    },
}

/// Parse arguments and dispatch.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Command::Analyze { url, json } => analyze(&config, &url, json).await,
        Command::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            server::start(config, &host, port).await
        }
        Command::Estimate { recipient, amount } => estimate(&config, &recipient, amount).await,
        Command::Config {
            set_api_key,
            set_model,
        } => configure(config, set_api_key, set_model),
    }
}

async fn analyze(config: &Config, url: &str, json: bool) -> Result<()> {
    let client = LlmClient::from_config(&config.llm)?;
    let generator: Arc<dyn ReportGenerator> =
        Arc::new(LlmReportGenerator::new(client, config.llm.model.clone()));
    let analyzer = ProposalAnalyzer::new(generator);

    // Stream progress to stderr while the run is in flight, keeping stdout
    // clean for the report itself.
    let events = analyzer.registry().subscribe();
    let progress = tokio::spawn(forward_events(events, print_event));

    let report = analyzer.analyze(url).await?;
    progress.abort();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Feed every broadcast event into `render` until the channel closes.
///
/// A renderer that falls behind the channel lags rather than losing the
/// stream; the skipped events are dropped and rendering resumes.
async fn forward_events(
    mut events: broadcast::Receiver<AgentEvent>,
    mut render: impl FnMut(&AgentEvent),
) {
    loop {
        match events.recv().await {
            Ok(event) => render(&event),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_event(event: &AgentEvent) {
    if let Some(finding) = event.state.findings.last() {
        eprintln!("[{}] {:>3}% {}", event.agent, event.state.progress, finding);
    }
}

fn print_report(report: &AnalysisResult) {
    println!("\n=== Analysis Report ===\n");
    println!("{}\n", report.summary);

    println!("Risks:");
    for risk in &report.risks {
        println!("  [{:?}] {}", risk.level, risk.description);
    }

    println!("\nBenefits:");
    for benefit in &report.benefits {
        println!("  - {benefit}");
    }

    println!("\nFinancial Impact:");
    println!("  Requested:       {}", report.financial_data.requested_amount);
    println!("  Treasury impact: {}", report.financial_data.treasury_impact);
    if let Some(runway) = &report.financial_data.runway_reduction {
        println!("  Runway:          {runway}");
    }
    if let Some(market) = &report.financial_data.market_impact {
        println!("  Market impact:   {market}");
    }

    println!("\nSecurity score: {}/100", report.security_score);
    println!("Sentiment:      {}", report.sentiment);
    println!("\nRecommendation:\n  {}", report.recommendation);
}

async fn estimate(config: &Config, recipient: &str, amount: f64) -> Result<()> {
    let estimator = GasEstimator::new(config.gas.clone());
    let estimate = estimator
        .estimate(recipient, amount)
        .await
        .context("Gas estimation failed")?;

    println!("Recipient:     {}", estimate.recipient);
    println!("Gas units:     {}", estimate.gas_units);
    println!("Gas price:     {:.2} gwei", estimate.gas_price_gwei());
    println!("Network cost:  {:.8} ETH", estimate.total_cost_eth);
    if estimate.total_cost_usd > 0.0 {
        println!("               ${:.2}", estimate.total_cost_usd);
    }
    Ok(())
}

fn configure(
    mut config: Config,
    set_api_key: Option<String>,
    set_model: Option<String>,
) -> Result<()> {
    let changed = set_api_key.is_some() || set_model.is_some();

    if let Some(key) = set_api_key {
        config.llm.api_key = Some(key);
    }
    if let Some(model) = set_model {
        config.llm.model = model;
    }

    if changed {
        config.save()?;
        println!("Configuration saved to {}", config_path()?.display());
    } else {
        println!("Config file: {}", config_path()?.display());
        println!("Model:       {}", config.llm.model);
        println!("Base URL:    {}", config.llm.base_url);
        println!(
            "API key:     {}",
            if config.llm.api_key.is_some() {
                "configured"
            } else {
                "not set (falls back to OPENROUTER_API_KEY)"
            }
        );
        println!("Server:      {}:{}", config.server.host, config.server.port);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AgentId, AgentPhase, AgentState};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event(progress: u8) -> AgentEvent {
        AgentEvent {
            agent: AgentId::Orchestrator,
            state: AgentState {
                status: AgentPhase::Processing,
                progress,
                findings: vec!["working".to_string()],
            },
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn progress_rendering_survives_channel_lag() {
        let (tx, rx) = broadcast::channel(1);

        // Overflow the single-slot channel before the renderer starts, so
        // its first recv observes a lag.
        tx.send(event(10)).unwrap();
        tx.send(event(20)).unwrap();
        tx.send(event(30)).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let renderer = tokio::spawn(forward_events(rx, move |e: &AgentEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(e.state.progress, 30);
        }));

        drop(tx);
        renderer.await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
