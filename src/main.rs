use std::env;

use aeromanual_admin::config::Config;
use aeromanual_admin::models::session::LoginCredentials;
use aeromanual_admin::worker::start_refresh_timer;
use aeromanual_admin::AppState;
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing();

    let state = AppState::from_config(&config).context("failed to build HTTP client")?;
    info!(api_url = %config.api_url, session_file = %config.session_file.display(), "admin client ready");

    if !state.client.is_authenticated()? {
        match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => {
                let user = state
                    .client
                    .login(&LoginCredentials::new(email, password))
                    .await
                    .context("login failed")?;
                info!(user = %user.display_name(), role = %user.role, "signed in");
            }
            _ => warn!("no stored session; set ADMIN_EMAIL and ADMIN_PASSWORD to sign in"),
        }
    }

    let timer = start_refresh_timer(
        state.client.clone(),
        config.refresh_interval,
        config.refresh_threshold,
    );

    if state.client.is_authenticated()? {
        match state.dashboard.summary().await {
            Ok(summary) => info!(
                airlines = summary.airlines,
                active_airlines = summary.active_airlines,
                users = summary.users,
                active_users = summary.active_users,
                chapters = summary.chapters,
                active_chapters = summary.active_chapters,
                "dashboard summary"
            ),
            Err(err) => warn!(error = %err, "failed to load dashboard summary"),
        }
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    timer.stop();
    info!("shutting down");
    Ok(())
}
