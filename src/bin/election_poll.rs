use election_watch::{FeedClient, Poller, PollerConfig};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = PollerConfig::from_env()?;
    let poller = Poller::new(FeedClient::new(reqwest::Client::new()), config);

    match poller.prepare().await {
        Ok(Some(outcome)) => info!(?outcome, "history prepared"),
        Ok(None) => {}
        Err(err) => error!("could not prepare history: {err}"),
    }

    tokio::select! {
        _ = poller.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!(
                history = %poller.config().history_path.display(),
                "interrupted, stopping poller"
            );
        }
    }

    Ok(())
}
