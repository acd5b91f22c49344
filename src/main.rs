//! household-notify - Household finance push notifications
//!
//! Runs the HTTP trigger server, or invokes one handler directly from the
//! command line.

use anyhow::Result;
use clap::Parser;
use household_notify::{
    app::App,
    cli::{Cli, Command},
    config::Config,
    internal_metrics,
    Caller, Contribution, Expense, MonthClosure, TriggerEvent,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            error!("Failed to load configuration: {:#}", err);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_level);

    info!("household-notify starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!(
        "Currency Format: {}/{}",
        config.formatting.locale, config.formatting.currency
    );
    match &config.store.members_path {
        Some(path) => info!("Members Snapshot: {}", path.display()),
        None => info!("Members Snapshot: Not configured"),
    }
    info!("Transport: {}", config.transport.kind);
    info!(
        "Metrics: {}",
        if config.metrics.enabled {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    info!("-------------------------------------------------------");

    match cli.command.clone().unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { .. } => serve(config).await,
        Command::Contribution {
            household,
            id,
            by,
            by_display_name,
            amount,
        } => {
            let app = App::builder(config).build()?;
            let event = TriggerEvent {
                household_id: household,
                event_id: id,
                data: Contribution {
                    by,
                    by_display_name,
                    amount,
                },
            };
            let summary = app.handlers().on_contribution_created(&event).await;
            println!("{}", serde_json::to_string(&summary)?);
            Ok(())
        }
        Command::Expense {
            household,
            id,
            by,
            by_display_name,
            amount,
            category_id,
            category_name,
        } => {
            let app = App::builder(config).build()?;
            let event = TriggerEvent {
                household_id: household,
                event_id: id,
                data: Expense {
                    by,
                    by_display_name,
                    amount,
                    category_id,
                    category_name,
                },
            };
            let summary = app.handlers().on_expense_created(&event).await;
            println!("{}", serde_json::to_string(&summary)?);
            Ok(())
        }
        Command::CloseMonth {
            household,
            month,
            carry_over,
            caller_uid,
        } => {
            let app = App::builder(config).build()?;
            let caller = caller_uid.map(Caller::authenticated).unwrap_or_default();
            let request = MonthClosure {
                household_id: household,
                month,
                carry_over,
            };
            match app
                .handlers()
                .request_month_closure_notification(&caller, &request)
                .await
            {
                Ok(response) => {
                    println!("{}", serde_json::to_string(&response)?);
                    Ok(())
                }
                Err(e) => {
                    error!(code = e.code(), "Month closure notification failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn serve(config: Config) -> Result<()> {
    let mut builder = App::builder(config.clone());
    if config.metrics.enabled {
        builder = builder.prometheus(internal_metrics::install_prometheus()?);
        info!("Prometheus metrics enabled at /metrics");
    }
    let app = builder.build()?;

    let listener = TcpListener::bind(config.server.listen_addr).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server_task = tokio::spawn(app.serve(listener, shutdown_rx));

    info!("household-notify initialized successfully. Waiting for triggers...");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Shutting down gracefully...");
    shutdown_tx.send(true).ok();

    match server_task.await {
        Ok(result) => result?,
        Err(e) => error!("Server task panicked: {:?}", e),
    }

    info!("All tasks shut down. Exiting.");
    Ok(())
}
