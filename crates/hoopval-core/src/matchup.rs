// Head-to-head category comparison between two entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::{CategorySet, StatKey};
use crate::record::StatRecord;

// ---------------------------------------------------------------------------
// Category values
// ---------------------------------------------------------------------------

/// Per-category values for one side of a matchup.
///
/// Values come in two conventions, and each has its own comparator:
///
/// - Raw stats (`From<&StatRecord>`, `TeamAggregate::values`) keep the stat's
///   own direction, so fewer turnovers is better. Compare them with
///   [`compare`].
/// - Sign-corrected scores (`TeamAggregate::z_values`, playoff strength) are
///   built from `signed_z`, so larger is better in every category. Compare
///   them with [`compare_scores`].
///
/// An absent key is null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryValues(BTreeMap<StatKey, f64>);

impl CategoryValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// NaN is stored as null.
    pub fn insert(&mut self, key: StatKey, value: f64) {
        if value.is_nan() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, key: StatKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl From<&StatRecord> for CategoryValues {
    fn from(record: &StatRecord) -> Self {
        record.values().collect()
    }
}

impl FromIterator<(StatKey, f64)> for CategoryValues {
    fn from_iter<I: IntoIterator<Item = (StatKey, f64)>>(iter: I) -> Self {
        let mut values = CategoryValues::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        values
    }
}

// ---------------------------------------------------------------------------
// Single comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    SideA,
    SideB,
    Tie,
    /// Exactly one side is null; counts toward nothing.
    Skipped,
}

impl Outcome {
    fn flipped(self) -> Self {
        match self {
            Outcome::SideA => Outcome::SideB,
            Outcome::SideB => Outcome::SideA,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOutcome {
    pub key: StatKey,
    pub value_a: Option<f64>,
    pub value_b: Option<f64>,
    pub outcome: Outcome,
}

/// Category-by-category result, counted from side A's perspective.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupResult {
    pub categories: Vec<CategoryOutcome>,
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
}

impl MatchupResult {
    /// The same result seen from side B.
    pub fn flipped(&self) -> MatchupResult {
        MatchupResult {
            categories: self
                .categories
                .iter()
                .map(|c| CategoryOutcome {
                    key: c.key,
                    value_a: c.value_b,
                    value_b: c.value_a,
                    outcome: c.outcome.flipped(),
                })
                .collect(),
            wins: self.losses,
            losses: self.wins,
            ties: self.ties,
        }
    }

    pub fn outcome(&self, key: StatKey) -> Option<Outcome> {
        self.categories.iter().find(|c| c.key == key).map(|c| c.outcome)
    }

    /// Overall winner on category count.
    pub fn winner(&self) -> Outcome {
        match self.wins.cmp(&self.losses) {
            std::cmp::Ordering::Greater => Outcome::SideA,
            std::cmp::Ordering::Less => Outcome::SideB,
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }
}

fn compare_values(a: Option<f64>, b: Option<f64>, higher_is_better: bool) -> Outcome {
    match (a, b) {
        (None, None) => Outcome::Tie,
        (Some(_), None) | (None, Some(_)) => Outcome::Skipped,
        (Some(a), Some(b)) => {
            if a == b {
                Outcome::Tie
            } else if (a > b) == higher_is_better {
                Outcome::SideA
            } else {
                Outcome::SideB
            }
        }
    }
}

/// Compare two entities over a category set.
///
/// Strictly greater wins, or strictly smaller for lower-is-better categories.
/// Equal values tie, as do two nulls. A category where only one side has a
/// value is skipped.
pub fn compare(a: &CategoryValues, b: &CategoryValues, categories: &CategorySet) -> MatchupResult {
    let mut result = MatchupResult::default();
    for category in categories {
        let value_a = a.get(category.key);
        let value_b = b.get(category.key);
        let outcome = compare_values(value_a, value_b, category.higher_is_better);
        match outcome {
            Outcome::SideA => result.wins += 1,
            Outcome::SideB => result.losses += 1,
            Outcome::Tie => result.ties += 1,
            Outcome::Skipped => {}
        }
        result.categories.push(CategoryOutcome {
            key: category.key,
            value_a,
            value_b,
            outcome,
        });
    }
    result
}

/// Compare two sets of sign-corrected scores, where larger is better in every
/// category. Turnovers were already negated when the scores were built, so
/// they are not flipped again here.
pub fn compare_scores(
    a: &CategoryValues,
    b: &CategoryValues,
    categories: &CategorySet,
) -> MatchupResult {
    compare(a, b, &categories.oriented())
}

// ---------------------------------------------------------------------------
// All-pairs matrix
// ---------------------------------------------------------------------------

/// Season-long record of one team against every other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupTotals {
    pub team: String,
    /// Category counts summed over every opponent.
    pub category_wins: usize,
    pub category_losses: usize,
    pub category_ties: usize,
    /// Matchups won, lost and tied on category count.
    pub matchup_wins: usize,
    pub matchup_losses: usize,
    pub matchup_ties: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupMatrix {
    pub teams: Vec<String>,
    /// `cells[i][j]` is team `i` against team `j`; the diagonal is `None`.
    pub cells: Vec<Vec<Option<MatchupResult>>>,
    pub totals: Vec<MatchupTotals>,
}

impl MatchupMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<&MatchupResult> {
        self.cells.get(row)?.get(col)?.as_ref()
    }
}

/// Compare every ordered pair of entries. Each unordered pair is computed once
/// and mirrored, so `cells[j][i]` is always `cells[i][j].flipped()`.
///
/// Entries are compared like [`compare`]; pass `categories.oriented()` when
/// they hold sign-corrected scores.
pub fn matchup_matrix(entries: &[(String, CategoryValues)], categories: &CategorySet) -> MatchupMatrix {
    let n = entries.len();
    let mut cells: Vec<Vec<Option<MatchupResult>>> = vec![vec![None; n]; n];
    let mut totals: Vec<MatchupTotals> = entries
        .iter()
        .map(|(team, _)| MatchupTotals {
            team: team.clone(),
            ..MatchupTotals::default()
        })
        .collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let result = compare(&entries[i].1, &entries[j].1, categories);
            let mirrored = result.flipped();
            tally(&mut totals[i], &result);
            tally(&mut totals[j], &mirrored);
            cells[i][j] = Some(result);
            cells[j][i] = Some(mirrored);
        }
    }

    MatchupMatrix {
        teams: entries.iter().map(|(team, _)| team.clone()).collect(),
        cells,
        totals,
    }
}

fn tally(totals: &mut MatchupTotals, result: &MatchupResult) {
    totals.category_wins += result.wins;
    totals.category_losses += result.losses;
    totals.category_ties += result.ties;
    match result.winner() {
        Outcome::SideA => totals.matchup_wins += 1,
        Outcome::SideB => totals.matchup_losses += 1,
        _ => totals.matchup_ties += 1,
    }
}
