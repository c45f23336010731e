// Fantasy roster entries and resolution to scored records.

use std::collections::HashSet;

use hoopval_core::ZScoredRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One player on a fantasy roster, as exported from the league host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(alias = "yahooPlayerId", alias = "player_key")]
    pub yahoo_player_id: String,
    #[serde(default, alias = "nbaPlayerId")]
    pub nba_player_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "selectedPosition")]
    pub selected_position: Option<String>,
}

impl RosterEntry {
    /// Injured or parked in an IL slot. The caller decides whether to drop
    /// these players; nothing here forces them out.
    pub fn is_excludable(&self) -> bool {
        let injured = self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("INJ"));
        let on_il = self
            .selected_position
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case("IL") || p.eq_ignore_ascii_case("IL+"));
        injured || on_il
    }
}

/// Yahoo ids of every excludable entry.
pub fn excludable_ids(roster: &[RosterEntry]) -> HashSet<String> {
    roster
        .iter()
        .filter(|e| e.is_excludable())
        .map(|e| e.yahoo_player_id.clone())
        .collect()
}

/// Resolve roster entries to scored records, in roster order.
///
/// Matches on NBA id first, then on case-insensitive name. Entries whose
/// Yahoo id is in `excluded` are skipped, as are entries with no match.
pub fn active_records(
    roster: &[RosterEntry],
    records: &[ZScoredRecord],
    excluded: &HashSet<String>,
) -> Vec<ZScoredRecord> {
    let mut active = Vec::new();
    for entry in roster {
        if excluded.contains(&entry.yahoo_player_id) {
            continue;
        }
        let by_id = entry
            .nba_player_id
            .as_deref()
            .and_then(|id| records.iter().find(|r| r.record.player_id == id));
        let found = by_id.or_else(|| {
            records
                .iter()
                .find(|r| r.record.player_name.eq_ignore_ascii_case(entry.name.trim()))
        });
        match found {
            Some(r) => active.push(r.clone()),
            None => warn!("roster player '{}' has no stat record; skipping", entry.name),
        }
    }
    active
}
