//! Deepscope HTTP server entrypoint.
//!
//! `deepscope` serves the gateway; `deepscope check <claim>...` verifies the
//! given claims once and prints the batch result as JSON.

use std::net::SocketAddr;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use deepscope::config::Config;
use deepscope::gateway::{HandlerState, create_router_with_state};
use deepscope::model::Claim;
use deepscope::verify::Verifier;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let verifier = Verifier::from_config(&config)?;
    tracing::info!(
        adapters = ?verifier.adapter_names(),
        timeout = ?config.adapter_timeout,
        short_circuit = ?config.short_circuit_threshold,
        "Verifier ready"
    );

    if args.first().map(String::as_str) == Some("check") {
        return run_check(verifier, &args[1..]).await;
    }

    let addr: SocketAddr = config.socket_addr().parse()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Deepscope starting"
    );

    let app = create_router_with_state(HandlerState::new(verifier));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Deepscope shutdown complete");
    Ok(())
}

async fn run_check(verifier: Verifier, texts: &[String]) -> anyhow::Result<()> {
    let claims: Vec<Claim> = texts
        .iter()
        .filter(|text| !text.trim().is_empty())
        .map(|text| Claim::new(text.trim()))
        .collect();
    if claims.is_empty() {
        anyhow::bail!("usage: deepscope check <claim> [<claim>...]");
    }

    let batch = tokio::select! {
        batch = verifier.verify_batch(claims) => batch,
        _ = signal::ctrl_c() => anyhow::bail!("interrupted"),
    };

    println!("{}", serde_json::to_string_pretty(&batch)?);
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var("DEEPSCOPE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
