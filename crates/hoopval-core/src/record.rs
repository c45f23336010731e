// Canonical stat records and cohorts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::StatKey;

// ---------------------------------------------------------------------------
// Stat record
// ---------------------------------------------------------------------------

/// What time span a record covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordScope {
    /// Per-game averages over a season, e.g. `"2023-24"`.
    Season(String),
    /// A single game.
    Game(NaiveDate),
    /// A team-level or otherwise derived total.
    Aggregate,
}

/// One entity's stat line in canonical shape.
///
/// A key that is absent is "null", which is distinct from zero: a player with
/// no free-throw attempts has no free-throw percentage at all. Counting stats
/// are always read through [`StatRecord::value_or_zero`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub scope: RecordScope,
    pub games_played: Option<u32>,
    values: BTreeMap<StatKey, f64>,
}

impl StatRecord {
    pub fn new(
        player_id: impl Into<String>,
        player_name: impl Into<String>,
        team: impl Into<String>,
        scope: RecordScope,
    ) -> Self {
        StatRecord {
            player_id: player_id.into(),
            player_name: player_name.into(),
            team: team.into(),
            scope,
            games_played: None,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter. Non-finite values are dropped, leaving the key null.
    pub fn with(mut self, key: StatKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_games_played(mut self, games: u32) -> Self {
        self.games_played = Some(games);
        self
    }

    pub(crate) fn set(&mut self, key: StatKey, value: f64) {
        if value.is_finite() {
            self.values.insert(key, value);
        } else {
            self.values.remove(&key);
        }
    }

    pub fn get(&self, key: StatKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    pub fn value_or_zero(&self, key: StatKey) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn has(&self, key: StatKey) -> bool {
        self.values.contains_key(&key)
    }

    /// All present values in key order.
    pub fn values(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn season(&self) -> Option<&str> {
        match &self.scope {
            RecordScope::Season(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn game_date(&self) -> Option<NaiveDate> {
        match self.scope {
            RecordScope::Game(d) => Some(d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Cohort
// ---------------------------------------------------------------------------

/// The ordered population z-scores are computed against.
///
/// Means and deviations are never cached here; they are derived fresh by
/// [`crate::zscore::CohortStats::from_cohort`] each time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cohort {
    records: Vec<StatRecord>,
}

impl Cohort {
    pub fn new(records: Vec<StatRecord>) -> Self {
        Cohort { records }
    }

    pub fn records(&self) -> &[StatRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<StatRecord> {
        self.records
    }
}

impl FromIterator<StatRecord> for Cohort {
    fn from_iter<I: IntoIterator<Item = StatRecord>>(iter: I) -> Self {
        Cohort::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Cohort {
    type Item = &'a StatRecord;
    type IntoIter = std::slice::Iter<'a, StatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
