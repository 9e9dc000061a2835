use anyhow::Result;
use argus::feed::FeedClient;
use argus::projector::{MonitorStats, format_charging_rate};
use argus::reconciler::{ChangeNotification, Reconciler};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = argus::Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    argus::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Argus charging session monitor starting up");

    let reconciler = Reconciler::new_shared();
    let mut changes = {
        let rec = reconciler.read().unwrap_or_else(|p| p.into_inner());
        rec.subscribe()
    };

    let mut client = FeedClient::new(config.feed.clone(), reconciler.clone());

    // Log connection state transitions (the status badge)
    let mut status_rx = client.watch_status();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let state = *status_rx.borrow();
            info!("charging feed status: {}", state);
        }
    });

    client
        .connect()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to charging feed: {}", e))?;

    loop {
        tokio::select! {
            change = changes.recv() => {
                match change {
                    Ok(notification) => report(&notification, &reconciler),
                    Err(RecvError::Lagged(missed)) => {
                        warn!("monitor lagged behind the feed, missed {} changes", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    client.disconnect().await;
    Ok(())
}

/// Log one change plus the refreshed monitoring header line
fn report(notification: &ChangeNotification, reconciler: &argus::SharedReconciler) {
    match notification {
        ChangeNotification::Started(session) => {
            let e = &session.event;
            info!(
                "{} {} started charging at {} pump {} ({})",
                e.vehicle.make,
                e.vehicle.model,
                e.station.name,
                e.pump,
                format_charging_rate(e.charging_rate)
            );
        }
        ChangeNotification::Updated(session) => {
            let e = &session.event;
            info!(
                "{} now charging at {}",
                e.vehicle.plate_number,
                format_charging_rate(e.charging_rate)
            );
        }
        ChangeNotification::Completed(session) => {
            let e = &session.event;
            info!(
                "{} {} is fully charged! plate={} station={}",
                e.vehicle.make, e.vehicle.model, e.vehicle.plate_number, e.station.name
            );
        }
    }

    let rec = reconciler.read().unwrap_or_else(|p| p.into_inner());
    let stats = MonitorStats::from_events(&rec.snapshot());
    info!(
        "active sessions: {}, total power: {}",
        stats.active_sessions,
        format_charging_rate(stats.total_power_watts)
    );
}
