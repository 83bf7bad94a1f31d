//! pushwire client
//!
//! Connects to the connector push endpoint with a YAML config and logs every
//! event until Ctrl-C.
//! - Usage: pushwire-client [config.yaml]   (default: pushwire.yaml)
//! - Log level via RUST_LOG, e.g. RUST_LOG=pushwire_client=debug

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use pushwire_client::{config, Client, EventStreams};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // wss needs a process-wide crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let path = std::env::args().nth(1).unwrap_or_else(|| "pushwire.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");

    let (client, streams) = Client::new(&cfg).expect("client setup failed");
    let consumers = spawn_consumers(streams);

    let cancel = CancellationToken::new();
    if let Err(e) = client.connect(cancel.clone()).await {
        tracing::error!(code = e.code().as_str(), error = %e, "connect failed");
        return;
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }

    tracing::info!("shutting down");
    cancel.cancel();
    if let Err(e) = client.close().await {
        tracing::warn!(error = %e, "close handshake failed");
    }
    drop(client);
    let _ = consumers.await;
}

fn spawn_consumers(streams: EventStreams) -> tokio::task::JoinHandle<()> {
    let EventStreams {
        mut commands,
        mut reservations,
        mut spaces,
        mut price_updates,
        mut errors,
    } = streams;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(ev) = commands.recv() => {
                    tracing::info!(id = %ev.id, state = ?ev.state, "device command");
                }
                Some(ev) = reservations.recv() => {
                    tracing::info!(
                        id = %ev.id,
                        state = ?ev.state,
                        start = %ev.start_utc,
                        end = %ev.end_utc,
                        space = ?ev.assigned_space_id,
                        "reservation"
                    );
                }
                Some(ev) = spaces.recv() => {
                    tracing::info!(id = %ev.id, state = ?ev.state, "space");
                }
                Some(ev) = price_updates.recv() => {
                    tracing::info!(
                        id = %ev.id,
                        start = %ev.start_utc,
                        end = %ev.end_utc,
                        rate = ?ev.rate_id,
                        category = ?ev.space_category_id,
                        "price update"
                    );
                }
                Some(e) = errors.recv() => {
                    tracing::error!(code = e.code().as_str(), error = %e, "stream stopped");
                }
                else => break,
            }
        }
    })
}
