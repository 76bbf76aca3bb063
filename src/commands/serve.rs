//! Long-running mode: inbound chat endpoint plus scheduled announcements

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use super::{build_announcer, build_sender, connect_store, cycle_store};
use crate::chat::{router, CommandMatcher, ServerState};
use crate::config::Config;
use crate::error::{AnnouncerError, Result};
use crate::scheduler::Scheduler;

/// Run the bot until interrupted
///
/// The scheduler is started only when a channel and a reachable watermark
/// store are both configured; the HTTP endpoint always runs.
///
/// # Errors
///
/// Returns error if a component cannot be built or the listen address
/// cannot be bound
pub async fn run_serve(config: Config, dry_run: bool) -> Result<()> {
    let announcer = Arc::new(build_announcer(&config)?);
    let sender = build_sender(&config, dry_run)?;
    let store = match connect_store(&config).await {
        Some(store) => Some(cycle_store(store, dry_run).await),
        None => None,
    };
    let period = config.interval()?;

    let scheduler = Scheduler::build(
        announcer.clone(),
        sender.clone(),
        config.announcer.channel.clone(),
        store,
        period,
    )
    .await;
    let scheduler_enabled = scheduler.is_some();
    let scheduler_task = scheduler.map(|s| tokio::spawn(s.run()));

    if config.slack.signing_secret.is_none() {
        info!("No signing secret configured, inbound requests are not verified");
    }

    let state = Arc::new(ServerState {
        announcer,
        sender,
        matcher: CommandMatcher::new()?,
        signing_secret: config.slack.signing_secret.clone(),
        scheduler_enabled,
    });

    let listener = TcpListener::bind(&config.slack.listen_addr)
        .await
        .map_err(|e| {
            AnnouncerError::Config(format!(
                "Failed to bind {}: {}",
                config.slack.listen_addr, e
            ))
        })?;

    info!(
        addr = %config.slack.listen_addr,
        group = %config.announcer.group,
        scheduler = scheduler_enabled,
        "Listening for Slack events"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = scheduler_task {
        task.abort();
    }

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
