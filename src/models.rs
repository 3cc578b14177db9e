use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RETRIEVAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PartyResult {
    pub ballots: f64,
    pub perc_ballots: f64,
    pub seats: f64,
}

/// One retrieval of the results feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub retrieval_time: String,
    pub total_seats: f64,
    pub perc_counted_votes: f64,
    pub turnout: f64,
    pub perc_null_ballots: f64,
    pub perc_blank_ballots: f64,
    pub results: BTreeMap<String, PartyResult>,
}

impl Snapshot {
    pub fn seats_of(&self, party: &str) -> f64 {
        self.results.get(party).map(|r| r.seats).unwrap_or(0.0)
    }
}

/// Election year -> snapshots in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct History {
    pub years: BTreeMap<String, Vec<Snapshot>>,
}

impl History {
    pub fn snapshots(&self, year: &str) -> &[Snapshot] {
        self.years.get(year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_year(&self, year: &str) -> bool {
        self.years.contains_key(year)
    }

    pub fn max_counted(&self, year: &str) -> Option<f64> {
        self.snapshots(year)
            .iter()
            .map(|s| s.perc_counted_votes)
            .fold(None, |acc, value| match acc {
                Some(max) if max >= value => Some(max),
                _ => Some(value),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyRow {
    /// Position of the source snapshot within its year.
    pub snapshot: usize,
    pub time: String,
    pub perc_counted_votes: f64,
    pub party: String,
    pub seats: f64,
    pub seat_share: f64,
    pub baseline: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlocRow {
    pub snapshot: usize,
    pub time: String,
    pub perc_counted_votes: f64,
    pub bloc: String,
    pub seats: f64,
    pub seat_share: f64,
    pub baseline: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Status {
    pub year: String,
    pub snapshots: usize,
    pub last_retrieval: Option<String>,
    pub perc_counted_votes: Option<f64>,
    pub turnout: Option<f64>,
    pub seats_assigned: Option<f64>,
    pub total_seats: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub title: String,
    pub status: Status,
    pub stale: bool,
    pub parties: Vec<PartyRow>,
    pub blocs: Vec<BlocRow>,
}
