//! Headless demo client.
//!
//! Connects to the configured backend, prints every state change, and
//! tears the session down on Ctrl-C. Stands in for a real presentation
//! layer; nothing here is rendered beyond stdout.

use tracing::info;
use tracing_subscriber::EnvFilter;

use tableside_api::ApiConfig;
use tableside_client::{ListState, Session};
use tableside_shared::constants::APP_NAME;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,tableside_client=debug,tableside_api=debug")
        }))
        .init();

    info!("Starting {} demo client v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::from_env();
    info!(?config, "Loaded configuration");

    let session = Session::start(config).await?;
    let mut state_rx = session.subscribe();
    print_state(&session.snapshot());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                break;
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                print_state(&state);
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

fn print_state(state: &ListState) {
    if state.error {
        println!("! sync error (list may be stale)");
    }
    println!("{} restaurant(s):", state.restaurants.len());
    for r in &state.restaurants {
        println!("  - {} ({}): {}", r.name, r.city, r.description);
    }
}
