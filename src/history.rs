use crate::errors::{FeedError, StoreError};
use crate::feed::FeedClient;
use crate::models::{History, Snapshot};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// Counted percentage did not improve on what is stored; file untouched.
    Stale,
    FetchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    BaselineAdded,
    AlreadyInitialised,
}

pub struct SeedFeeds<'a> {
    pub year: &'a str,
    pub url: &'a str,
    pub baseline_year: &'a str,
    pub baseline_url: &'a str,
}

/// A missing file is an empty history.
pub async fn load_history(path: &Path) -> Result<History, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(History::default()),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Rewrites the whole file through a sibling temp file and a rename, so a
/// reader sees either the old or the new content.
pub async fn persist_history(path: &Path, history: &History) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(history).map_err(StoreError::Encode)?;
    let write_err = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = temp_path_for(path);
    if let Err(err) = fs::write(&tmp_path, &payload).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(write_err(err));
    }
    if let Err(err) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(write_err(err));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history.json".to_string());
    path.with_file_name(format!(".{file_name}.tmp.{}", std::process::id()))
}

/// Decides whether `snapshot` joins `year`. With `check_state` the stored
/// sequence stays strictly increasing in `perc_counted_votes`.
pub fn append_snapshot(
    history: &mut History,
    year: &str,
    snapshot: Snapshot,
    check_state: bool,
) -> AppendOutcome {
    if check_state {
        if let Some(max) = history.max_counted(year) {
            if snapshot.perc_counted_votes <= max {
                return AppendOutcome::Stale;
            }
        }
    }
    history
        .years
        .entry(year.to_string())
        .or_default()
        .push(snapshot);
    AppendOutcome::Appended
}

pub async fn add_snapshot(
    path: &Path,
    year: &str,
    fetched: Result<Snapshot, FeedError>,
    check_state: bool,
) -> Result<AppendOutcome, StoreError> {
    let snapshot = match fetched {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(year, "fetch failed, nothing stored this cycle: {err}");
            return Ok(AppendOutcome::FetchFailed);
        }
    };

    let mut history = load_history(path).await?;
    if history.snapshots(year).is_empty() {
        info!(year, "no snapshots stored for this year yet");
    }

    let counted = snapshot.perc_counted_votes;
    let outcome = append_snapshot(&mut history, year, snapshot, check_state);
    match outcome {
        AppendOutcome::Appended => {
            persist_history(path, &history).await?;
            info!(
                year,
                counted,
                stored = history.snapshots(year).len(),
                "appended snapshot"
            );
        }
        AppendOutcome::Stale => {
            info!(year, counted, "count has not progressed, not updating history");
        }
        AppendOutcome::FetchFailed => {}
    }
    Ok(outcome)
}

/// Seeds a fresh history with the baseline and the first snapshot of the
/// target year. Does nothing when the file already exists.
pub async fn initialise_history(
    path: &Path,
    client: &FeedClient,
    seed: &SeedFeeds<'_>,
) -> Result<InitOutcome, StoreError> {
    let exists = fs::try_exists(path)
        .await
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if exists {
        info!(path = %path.display(), "history already initialised");
        return Ok(InitOutcome::AlreadyInitialised);
    }

    let baseline = fetch_for(client, seed.baseline_year, seed.baseline_url).await?;
    let current = fetch_for(client, seed.year, seed.url).await?;

    let mut history = History::default();
    history
        .years
        .insert(seed.baseline_year.to_string(), vec![baseline]);
    history.years.insert(seed.year.to_string(), vec![current]);
    persist_history(path, &history).await?;

    info!(
        path = %path.display(),
        baseline_year = seed.baseline_year,
        year = seed.year,
        "initialised history"
    );
    Ok(InitOutcome::Created)
}

/// Inserts the baseline year into an existing history that lacks it.
pub async fn add_baseline(
    path: &Path,
    client: &FeedClient,
    baseline_year: &str,
    baseline_url: &str,
) -> Result<InitOutcome, StoreError> {
    let mut history = load_history(path).await?;
    if history.contains_year(baseline_year) {
        return Ok(InitOutcome::AlreadyInitialised);
    }

    let baseline = fetch_for(client, baseline_year, baseline_url).await?;
    history
        .years
        .insert(baseline_year.to_string(), vec![baseline]);
    persist_history(path, &history).await?;

    info!(baseline_year, "added baseline to history");
    Ok(InitOutcome::BaselineAdded)
}

async fn fetch_for(client: &FeedClient, year: &str, url: &str) -> Result<Snapshot, StoreError> {
    client.fetch(url).await.map_err(|source| StoreError::Fetch {
        year: year.to_string(),
        source,
    })
}
