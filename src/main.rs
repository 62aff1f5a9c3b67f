use tracing_subscriber::EnvFilter;

use wicket::config::Config;
use wicket::router::Router;
use wicket::server;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let router = Router::with_defaults(cfg.static_dir.clone());

    tokio::select! {
        res = server::listener::run(&cfg, &router) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
