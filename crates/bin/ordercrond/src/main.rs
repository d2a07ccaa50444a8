//! # ordercrond: ordercron daemon
//!
//! Composition root that wires all adapters together and runs the service.
//!
//! ## Responsibilities
//! - Load configuration (`ordercron.toml` plus environment overrides)
//! - Initialise logging
//! - Open the `SQLite` database and run migrations
//! - Start the scheduler loop and, with the demo order book enabled, the
//!   executor consuming its run signals
//! - Build the axum router and serve it
//! - On Ctrl-C: stop accepting requests, stop the background tasks, close
//!   the database
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use ordercron_adapter_demo_orders::DemoOrderBook;
use ordercron_adapter_http_axum::router;
use ordercron_adapter_http_axum::state::AppState;
use ordercron_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqliteAutomationStore};
use ordercron_app::executor::Executor;
use ordercron_app::gate::StoreGate;
use ordercron_app::run_bus::InProcessRunBus;
use ordercron_app::scheduler::Scheduler;
use ordercron_app::services::automation_service::AutomationService;
use ordercron_app::services::query_service::QueryService;
use ordercron_domain::time;

const RUN_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();
    let zone = config.zone()?;

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let store = Arc::new(SqliteAutomationStore::new(db.pool().clone()));

    let gate = StoreGate::new();
    let run_bus = InProcessRunBus::new(RUN_BUS_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Background tasks
    let mut tasks = vec![
        Scheduler::new(
            Arc::clone(&store),
            run_bus.clone(),
            gate.clone(),
            config.scheduler_config(),
        )
        .start(shutdown_rx.clone()),
    ];
    if config.demo.enabled {
        let book = Arc::new(DemoOrderBook::seeded(time::now()));
        tracing::info!(orders = book.len(), "demo order book seeded");
        tasks.push(
            Executor::new(Arc::clone(&store), Arc::clone(&book), book, gate.clone(), zone)
                .start(run_bus.subscribe(), shutdown_rx),
        );
    } else {
        tracing::info!("demo order book disabled, run signals are only streamed");
    }

    // HTTP
    let state = AppState::new(
        Arc::new(AutomationService::new(store, gate)),
        QueryService::new(zone),
        run_bus,
    );
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "ordercrond listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    for task in tasks {
        task.await?;
    }
    db.close().await;
    tracing::info!("ordercrond stopped");
    Ok(())
}

/// Resolve on Ctrl-C and tell the background tasks to stop.
async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
    shutdown.send_replace(true);
}
