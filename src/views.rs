//! Tabular views over a stored history, consumed by the dashboard.
//!
//! Everything here is read-only: the history is borrowed and never changed.

use crate::models::{BlocRow, History, PartyRow, Status};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const RIGHT: &str = "Right";
pub const CENTER: &str = "Center";
pub const CENTER_RIGHT: &str = "Center-Right";

/// Party name -> bloc name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlocMapping(pub BTreeMap<String, String>);

impl Default for BlocMapping {
    fn default() -> Self {
        let pairs = [
            ("PSOE", "Left"),
            ("PP", RIGHT),
            ("Cs", CENTER),
            ("MÁS MADRID", "Left"),
            ("VOX", RIGHT),
            ("PODEMOS-IU", "Left"),
        ];
        Self(
            pairs
                .into_iter()
                .map(|(party, bloc)| (party.to_string(), bloc.to_string()))
                .collect(),
        )
    }
}

impl BlocMapping {
    pub fn bloc_of(&self, party: &str) -> Option<&str> {
        self.0.get(party).map(String::as_str)
    }
}

/// Long-form seat table for `year`, one row per (snapshot, party).
///
/// Only parties holding at least one seat somewhere in `year` or in the
/// baseline are listed. A party missing from a snapshot counts as zero seats.
pub fn party_rows(history: &History, year: &str, baseline_year: &str) -> Vec<PartyRow> {
    let snapshots = history.snapshots(year);
    let baseline = history.snapshots(baseline_year).first();

    let mut parties = BTreeSet::new();
    for snapshot in snapshots.iter().chain(baseline) {
        for (party, result) in &snapshot.results {
            if result.seats > 0.0 {
                parties.insert(party.as_str());
            }
        }
    }

    let mut rows = Vec::with_capacity(snapshots.len() * parties.len());
    for (index, snapshot) in snapshots.iter().enumerate() {
        for party in &parties {
            let seats = snapshot.seats_of(party);
            let baseline_seats = baseline.map(|b| b.seats_of(party)).unwrap_or(0.0);
            rows.push(PartyRow {
                snapshot: index,
                time: snapshot.retrieval_time.clone(),
                perc_counted_votes: snapshot.perc_counted_votes,
                party: party.to_string(),
                seats,
                seat_share: share(seats, snapshot.total_seats),
                baseline: baseline_seats,
                delta: seats - baseline_seats,
            });
        }
    }
    rows
}

#[derive(Default)]
struct BlocTotals {
    seats: f64,
    seat_share: f64,
    baseline: f64,
}

impl BlocTotals {
    fn add(&mut self, seats: f64, seat_share: f64, baseline: f64) {
        self.seats += seats;
        self.seat_share += seat_share;
        self.baseline += baseline;
    }
}

struct SnapshotGroup<'a> {
    snapshot: usize,
    time: &'a str,
    counted: f64,
    totals: BTreeMap<&'a str, BlocTotals>,
}

/// Sums party rows per bloc for every snapshot and adds the derived
/// Center-Right bloc. Parties without a bloc are left out.
///
/// Groups follow the snapshot index, so two snapshots retrieved within the
/// same second stay separate.
pub fn bloc_rows<'a>(rows: &'a [PartyRow], mapping: &'a BlocMapping) -> Vec<BlocRow> {
    let mut groups: Vec<SnapshotGroup<'a>> = Vec::new();
    for row in rows {
        let starts_group = groups.last().is_none_or(|g| g.snapshot != row.snapshot);
        if starts_group {
            groups.push(SnapshotGroup {
                snapshot: row.snapshot,
                time: row.time.as_str(),
                counted: row.perc_counted_votes,
                totals: BTreeMap::new(),
            });
        }
        let Some(bloc) = mapping.bloc_of(&row.party) else {
            continue;
        };
        if let Some(SnapshotGroup { totals, .. }) = groups.last_mut() {
            totals
                .entry(bloc)
                .or_default()
                .add(row.seats, row.seat_share, row.baseline);
        }
    }

    let mut out = Vec::new();
    for SnapshotGroup {
        snapshot,
        time,
        counted,
        mut totals,
    } in groups
    {
        let mut center_right = BlocTotals::default();
        for name in [RIGHT, CENTER] {
            if let Some(t) = totals.get(name) {
                center_right.add(t.seats, t.seat_share, t.baseline);
            }
        }
        totals.insert(CENTER_RIGHT, center_right);

        for (bloc, t) in totals {
            out.push(BlocRow {
                snapshot,
                time: time.to_string(),
                perc_counted_votes: counted,
                bloc: bloc.to_string(),
                seats: t.seats,
                seat_share: t.seat_share,
                baseline: t.baseline,
            });
        }
    }
    out
}

pub fn status_line(history: &History, year: &str) -> Status {
    let snapshots = history.snapshots(year);
    let latest = snapshots.last();
    Status {
        year: year.to_string(),
        snapshots: snapshots.len(),
        last_retrieval: latest.map(|s| s.retrieval_time.clone()),
        perc_counted_votes: latest.map(|s| s.perc_counted_votes),
        turnout: latest.map(|s| s.turnout),
        seats_assigned: latest.map(|s| s.results.values().map(|r| r.seats).sum()),
        total_seats: latest.map(|s| s.total_seats),
    }
}

fn share(seats: f64, total: f64) -> f64 {
    if total > 0.0 { seats / total * 100.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::snapshot;

    fn history_with(baseline: &[(&str, f64)], current: Vec<crate::models::Snapshot>) -> History {
        let mut history = History::default();
        history
            .years
            .insert("2019".into(), vec![snapshot("2019-05-26 22:00:00", 100.0, baseline)]);
        history.years.insert("2021".into(), current);
        history
    }

    #[test]
    fn party_absent_from_current_results_reports_zero() {
        let history = history_with(
            &[("VOX", 12.0), ("PP", 30.0)],
            vec![snapshot("t1", 50.0, &[("PP", 64.0)])],
        );

        let rows = party_rows(&history, "2021", "2019");
        let vox = rows.iter().find(|r| r.party == "VOX").expect("VOX row");
        assert_eq!(vox.seats, 0.0);
        assert_eq!(vox.baseline, 12.0);
        assert_eq!(vox.delta, -12.0);

        let pp = rows.iter().find(|r| r.party == "PP").expect("PP row");
        assert_eq!(pp.seats, 64.0);
        assert_eq!(pp.baseline, 30.0);
    }

    #[test]
    fn parties_without_seats_are_dropped() {
        let history = history_with(
            &[("PP", 30.0), ("PACMA", 0.0)],
            vec![
                snapshot("t1", 10.0, &[("PP", 60.0), ("PACMA", 0.0), ("MÁS MADRID", 0.0)]),
                snapshot("t2", 20.0, &[("PP", 61.0), ("PACMA", 0.0), ("MÁS MADRID", 24.0)]),
            ],
        );

        let rows = party_rows(&history, "2021", "2019");
        let parties: BTreeSet<_> = rows.iter().map(|r| r.party.as_str()).collect();
        assert_eq!(parties, BTreeSet::from(["MÁS MADRID", "PP"]));
        assert_eq!(rows.len(), 4);

        let early = rows
            .iter()
            .find(|r| r.time == "t1" && r.party == "MÁS MADRID")
            .unwrap();
        assert_eq!(early.seats, 0.0);
        assert_eq!(early.baseline, 0.0);
    }

    #[test]
    fn rows_follow_snapshot_order() {
        let history = history_with(
            &[],
            vec![
                snapshot("t2", 20.0, &[("PP", 1.0)]),
                snapshot("t1", 30.0, &[("PP", 2.0)]),
            ],
        );
        let times: Vec<_> = party_rows(&history, "2021", "2019")
            .into_iter()
            .map(|r| r.time)
            .collect();
        assert_eq!(times, vec!["t2", "t1"]);
    }

    #[test]
    fn seat_share_is_percentage_of_total() {
        let history = history_with(&[], vec![snapshot("t1", 10.0, &[("PP", 68.0)])]);
        let rows = party_rows(&history, "2021", "2019");
        assert_eq!(rows[0].seat_share, 50.0);
    }

    #[test]
    fn missing_baseline_year_counts_as_zero() {
        let mut history = History::default();
        history
            .years
            .insert("2021".into(), vec![snapshot("t1", 10.0, &[("PP", 5.0)])]);
        let rows = party_rows(&history, "2021", "2019");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].baseline, 0.0);
    }

    #[test]
    fn center_right_is_sum_of_right_and_center() {
        let history = history_with(
            &[("PP", 30.0), ("VOX", 12.0), ("Cs", 26.0)],
            vec![snapshot(
                "t1",
                60.0,
                &[("PP", 15.0), ("VOX", 5.0), ("Cs", 5.0), ("PSOE", 20.0)],
            )],
        );

        let blocs = bloc_rows(&party_rows(&history, "2021", "2019"), &BlocMapping::default());
        let seats = |name: &str| blocs.iter().find(|b| b.bloc == name).map(|b| b.seats);
        assert_eq!(seats(RIGHT), Some(20.0));
        assert_eq!(seats(CENTER), Some(5.0));
        assert_eq!(seats(CENTER_RIGHT), Some(25.0));
        assert_eq!(seats("Left"), Some(20.0));

        let center_right = blocs.iter().find(|b| b.bloc == CENTER_RIGHT).unwrap();
        assert_eq!(center_right.baseline, 68.0);
    }

    #[test]
    fn center_right_exists_at_every_timestamp() {
        let history = history_with(
            &[],
            vec![
                snapshot("t1", 10.0, &[("PSOE", 3.0)]),
                snapshot("t2", 20.0, &[("PSOE", 4.0), ("PP", 1.0)]),
            ],
        );
        let blocs = bloc_rows(&party_rows(&history, "2021", "2019"), &BlocMapping::default());
        let center_right: Vec<_> = blocs
            .iter()
            .filter(|b| b.bloc == CENTER_RIGHT)
            .map(|b| (b.time.as_str(), b.seats))
            .collect();
        assert_eq!(center_right, vec![("t1", 0.0), ("t2", 1.0)]);
    }

    #[test]
    fn snapshots_sharing_a_timestamp_are_not_merged() {
        let history = history_with(
            &[],
            vec![
                snapshot("2021-05-04 20:00:00", 10.0, &[("PP", 20.0), ("Cs", 5.0)]),
                snapshot("2021-05-04 20:00:00", 10.0, &[("PP", 20.0), ("Cs", 5.0)]),
            ],
        );
        let blocs = bloc_rows(&party_rows(&history, "2021", "2019"), &BlocMapping::default());

        for name in [RIGHT, CENTER, CENTER_RIGHT] {
            let per_snapshot: Vec<_> = blocs
                .iter()
                .filter(|b| b.bloc == name)
                .map(|b| (b.snapshot, b.seats))
                .collect();
            let expected = match name {
                RIGHT => 20.0,
                CENTER => 5.0,
                _ => 25.0,
            };
            assert_eq!(per_snapshot, vec![(0, expected), (1, expected)], "{name}");
        }
    }

    #[test]
    fn unmapped_parties_are_left_out_of_blocs() {
        let history = history_with(&[], vec![snapshot("t1", 10.0, &[("PSOE", 3.0), ("OTHER", 9.0)])]);
        let blocs = bloc_rows(&party_rows(&history, "2021", "2019"), &BlocMapping::default());
        let names: Vec<_> = blocs.iter().map(|b| b.bloc.as_str()).collect();
        assert_eq!(names, vec![CENTER_RIGHT, "Left"]);
    }

    #[test]
    fn status_reports_latest_snapshot() {
        let history = history_with(
            &[],
            vec![
                snapshot("t1", 10.0, &[("PP", 3.0)]),
                snapshot("t2", 45.5, &[("PP", 60.0), ("PSOE", 20.0)]),
            ],
        );
        let status = status_line(&history, "2021");
        assert_eq!(status.snapshots, 2);
        assert_eq!(status.last_retrieval.as_deref(), Some("t2"));
        assert_eq!(status.perc_counted_votes, Some(45.5));
        assert_eq!(status.seats_assigned, Some(80.0));
        assert_eq!(status.total_seats, Some(136.0));

        let empty = status_line(&History::default(), "2021");
        assert_eq!(empty.snapshots, 0);
        assert!(empty.last_retrieval.is_none());
    }
}
