use crate::errors::AppError;
use crate::history::load_history;
use crate::models::{DashboardResponse, History, Snapshot};
use crate::state::AppState;
use crate::ui::render_index;
use crate::views::{bloc_rows, party_rows, status_line};
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let config = &state.config;
    Html(render_index(&config.title, config.refresh_interval.as_millis()))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let (history, stale) = read_or_stale(&state).await;
    let config = &state.config;

    let parties = party_rows(&history, &config.year, &config.baseline_year);
    let blocs = bloc_rows(&parties, &config.blocs);

    Json(DashboardResponse {
        title: config.title.clone(),
        status: status_line(&history, &config.year),
        stale,
        parties,
        blocs,
    })
}

pub async fn get_history(State(state): State<AppState>) -> Result<Json<History>, AppError> {
    let history = load_history(&state.config.history_path).await?;
    Ok(Json(history))
}

pub async fn get_year(
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> Result<Json<Vec<Snapshot>>, AppError> {
    let mut history = load_history(&state.config.history_path).await?;
    history
        .years
        .remove(&year)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no snapshots for year {year}")))
}

/// Re-reads the history file. When it cannot be read the last good copy is
/// returned and flagged as stale.
async fn read_or_stale(state: &AppState) -> (History, bool) {
    let mut last_good = state.last_good.lock().await;
    match load_history(&state.config.history_path).await {
        Ok(history) => {
            *last_good = Some(history.clone());
            (history, false)
        }
        Err(err) => {
            warn!("serving previous history: {err}");
            (last_good.clone().unwrap_or_default(), true)
        }
    }
}
