//! inbox-shield: email authentication checker
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP API (config.toml in the working directory is picked up)
//! inbox-shield serve
//! inbox-shield --config /etc/inbox-shield.toml serve
//!
//! # One-off checks from the command line
//! inbox-shield check example.com
//! inbox-shield check example.com --preview
//! inbox-shield check example.com --dkim-selector s2024 --report
//! inbox-shield check example.com --text
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use inbox_shield::analysis::{CheckOptions, DomainChecker};
use inbox_shield::api::ApiServer;
use inbox_shield::config::{Config, LoggingConfig};
use inbox_shield::report::{generate_report, render_text_report};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "inbox-shield")]
#[command(about = "Check SPF, DMARC, DKIM, BIMI and MTA-STS for a domain", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Check one domain and print the result
    Check {
        /// Domain to analyze
        domain: String,
        /// Redacted preview instead of the full analysis
        #[arg(long, conflicts_with_all = ["report", "text"])]
        preview: bool,
        /// Extra DKIM selector to probe
        #[arg(long)]
        dkim_selector: Option<String>,
        /// Print the full report as JSON
        #[arg(long)]
        report: bool,
        /// Print the full report as text
        #[arg(long, conflicts_with = "report")]
        text: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None if Path::new("config.toml").exists() => {
            Config::from_file("config.toml").context("Failed to load config.toml")
        }
        None => Ok(Config::default()),
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "inbox_shield={level},tower_http={level}",
            level = config.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for command output
    if config.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    let checker = DomainChecker::from_config(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("Starting inbox-shield v{}", env!("CARGO_PKG_VERSION"));
            info!("  DNS resolver: {}", config.dns.resolver);
            info!("  DKIM selectors: {}", config.dkim.selectors.join(", "));

            let server = ApiServer::new(checker, config.server.listen_addr.clone());
            server.run().await?;
        }
        Commands::Check {
            domain,
            preview,
            dkim_selector,
            report,
            text,
        } => {
            if report || text {
                let full = generate_report(&checker, &domain, dkim_selector).await?;
                if text {
                    println!("{}", render_text_report(&full));
                } else {
                    println!("{}", serde_json::to_string_pretty(&full)?);
                }
            } else {
                let options = if preview {
                    CheckOptions::preview()
                } else {
                    CheckOptions::full(dkim_selector)
                };
                let result = checker.check_domain(&domain, &options).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
    }

    Ok(())
}
