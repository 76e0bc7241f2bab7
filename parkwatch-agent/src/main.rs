use std::sync::Arc;

use anyhow::Context;
use parkwatch_core::{BookingClassifier, SystemClock};
use parkwatch_lifecycle::DashboardLoader;
use parkwatch_monitor::{ActivationPolicy, MonitorScheduler, MonitorSettings};
use parkwatch_store::{Config, RestGateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.agent.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let gateway = Arc::new(
        RestGateway::new(&config.backend).context("Failed to build backend gateway")?,
    );
    let monitor = Arc::new(MonitorScheduler::new(
        gateway.clone(),
        Arc::new(SystemClock),
        MonitorSettings {
            period: config.monitor.period(),
            capabilities: config.monitor.capabilities(),
        },
    ));

    match std::env::args().nth(1).as_deref() {
        Some("check") => {
            let report = monitor.manual_check().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some("dashboard") => {
            let loader = DashboardLoader::new(
                gateway,
                BookingClassifier::new(config.pricing.estimator()),
                Arc::new(SystemClock),
            );
            let snapshot = loader.load().await.context("Failed to load dashboard")?;
            tracing::info!(
                "{}: balance {:.2}, {} ongoing ({} overstaying), {} upcoming, {} alert(s)",
                snapshot.profile.username,
                snapshot.profile.credit_balance,
                snapshot.ongoing.len(),
                snapshot.overstaying().count(),
                snapshot.upcoming.len(),
                snapshot.alerts.len()
            );
        }
        Some(other) if other != "monitor" => {
            anyhow::bail!("Unknown command '{}', expected monitor, check or dashboard", other);
        }
        _ => {
            let policy = ActivationPolicy::new(config.monitor.active_paths.clone());
            let page = config.agent.page_path.as_str();
            let Some(guard) = policy.attach(&monitor, page) else {
                tracing::warn!("Page {} does not run the booking monitor, exiting", page);
                return Ok(());
            };
            tracing::info!("Monitoring bookings for {}", page);

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown requested");

            guard.detach().await;
        }
    }

    Ok(())
}
