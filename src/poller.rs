use crate::config::PollerConfig;
use crate::errors::StoreError;
use crate::feed::FeedClient;
use crate::history::{self, AppendOutcome, InitOutcome, SeedFeeds};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

/// Runs `action` every `period`, starting immediately, until the returned
/// future is dropped. A slow action delays the next tick instead of
/// triggering a burst of catch-up runs.
pub async fn run_every<F, Fut>(period: Duration, mut action: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        action().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Appended,
    Skipped,
    FetchFailed,
    StoreFailed,
}

impl From<AppendOutcome> for PollOutcome {
    fn from(outcome: AppendOutcome) -> Self {
        match outcome {
            AppendOutcome::Appended => PollOutcome::Appended,
            AppendOutcome::Stale => PollOutcome::Skipped,
            AppendOutcome::FetchFailed => PollOutcome::FetchFailed,
        }
    }
}

pub struct Poller {
    client: FeedClient,
    config: PollerConfig,
}

impl Poller {
    pub fn new(client: FeedClient, config: PollerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Seeds the history file when a baseline feed is configured. An
    /// existing file only gets the baseline year added if it lacks it.
    pub async fn prepare(&self) -> Result<Option<InitOutcome>, StoreError> {
        let Some(baseline_url) = self.config.baseline_url.as_deref() else {
            return Ok(None);
        };

        let seed = SeedFeeds {
            year: &self.config.year,
            url: &self.config.feed_url,
            baseline_year: &self.config.baseline_year,
            baseline_url,
        };
        let outcome = history::initialise_history(&self.config.history_path, &self.client, &seed).await?;
        if outcome == InitOutcome::AlreadyInitialised {
            let added = history::add_baseline(
                &self.config.history_path,
                &self.client,
                &self.config.baseline_year,
                baseline_url,
            )
            .await?;
            return Ok(Some(added));
        }
        Ok(Some(outcome))
    }

    pub async fn poll_once(&self) -> PollOutcome {
        let fetched = self.client.fetch(&self.config.feed_url).await;
        match history::add_snapshot(
            &self.config.history_path,
            &self.config.year,
            fetched,
            self.config.check_state,
        )
        .await
        {
            Ok(outcome) => outcome.into(),
            Err(err) => {
                error!("failed to update history: {err}");
                PollOutcome::StoreFailed
            }
        }
    }

    pub async fn run(&self) {
        info!(
            url = %self.config.feed_url,
            year = %self.config.year,
            every = ?self.config.poll_interval,
            check_state = self.config.check_state,
            "polling feed"
        );
        run_every(self.config.poll_interval, move || async move {
            self.poll_once().await;
        })
        .await;
    }
}
