// Statistical category descriptors, category sets and punt selections.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("unknown stat category `{0}`")]
    UnknownKey(String),

    #[error("unknown category context `{0}` (expected \"season\" or \"game\")")]
    UnknownContext(String),
}

// ---------------------------------------------------------------------------
// Stat keys
// ---------------------------------------------------------------------------

/// Every statistic the core knows how to value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    ThreePointers,
    FieldGoalPercentage,
    FreeThrowPercentage,
    Turnovers,
    FieldGoalsMade,
    FieldGoalsAttempted,
    FreeThrowsMade,
    FreeThrowsAttempted,
}

impl StatKey {
    pub const ALL: [StatKey; 13] = [
        StatKey::Points,
        StatKey::Rebounds,
        StatKey::Assists,
        StatKey::Steals,
        StatKey::Blocks,
        StatKey::ThreePointers,
        StatKey::FieldGoalPercentage,
        StatKey::FreeThrowPercentage,
        StatKey::Turnovers,
        StatKey::FieldGoalsMade,
        StatKey::FieldGoalsAttempted,
        StatKey::FreeThrowsMade,
        StatKey::FreeThrowsAttempted,
    ];

    /// Canonical snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKey::Points => "points",
            StatKey::Rebounds => "rebounds",
            StatKey::Assists => "assists",
            StatKey::Steals => "steals",
            StatKey::Blocks => "blocks",
            StatKey::ThreePointers => "three_pointers",
            StatKey::FieldGoalPercentage => "field_goal_percentage",
            StatKey::FreeThrowPercentage => "free_throw_percentage",
            StatKey::Turnovers => "turnovers",
            StatKey::FieldGoalsMade => "field_goals_made",
            StatKey::FieldGoalsAttempted => "field_goals_attempted",
            StatKey::FreeThrowsMade => "free_throws_made",
            StatKey::FreeThrowsAttempted => "free_throws_attempted",
        }
    }

    /// Parse a key or one of its common box-score abbreviations.
    ///
    /// Matching is case-insensitive. Umbrella names such as `field_goals`
    /// are not keys; see [`PuntToken`].
    pub fn from_str_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "points" | "pts" => Some(StatKey::Points),
            "rebounds" | "reb" | "trb" | "total_rebounds" => Some(StatKey::Rebounds),
            "assists" | "ast" => Some(StatKey::Assists),
            "steals" | "stl" => Some(StatKey::Steals),
            "blocks" | "blk" => Some(StatKey::Blocks),
            "three_pointers" | "three_pointers_made" | "threes" | "fg3m" | "3pm" | "3ptm" => {
                Some(StatKey::ThreePointers)
            }
            "field_goal_percentage" | "fg_pct" | "fg%" | "fgp" => {
                Some(StatKey::FieldGoalPercentage)
            }
            "free_throw_percentage" | "ft_pct" | "ft%" | "ftp" => {
                Some(StatKey::FreeThrowPercentage)
            }
            "turnovers" | "tov" | "to" => Some(StatKey::Turnovers),
            "field_goals_made" | "fgm" => Some(StatKey::FieldGoalsMade),
            "field_goals_attempted" | "fga" => Some(StatKey::FieldGoalsAttempted),
            "free_throws_made" | "ftm" => Some(StatKey::FreeThrowsMade),
            "free_throws_attempted" | "fta" => Some(StatKey::FreeThrowsAttempted),
            _ => None,
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKey {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatKey::from_str_key(s).ok_or_else(|| CategoryError::UnknownKey(s.trim().to_string()))
    }
}

// ---------------------------------------------------------------------------
// Category descriptors
// ---------------------------------------------------------------------------

/// The made/attempted pair behind a shooting percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    pub made: StatKey,
    pub attempted: StatKey,
}

/// Static descriptor for one statistical category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatCategory {
    pub key: StatKey,
    pub display_label: &'static str,
    pub higher_is_better: bool,
    pub is_percentage: bool,
    /// Attempt volume used to weight a percentage category, if any.
    pub volume: Option<Volume>,
}

impl StatCategory {
    /// Descriptor for a key.
    pub fn of(key: StatKey) -> Self {
        let (display_label, volume) = match key {
            StatKey::Points => ("PTS", None),
            StatKey::Rebounds => ("REB", None),
            StatKey::Assists => ("AST", None),
            StatKey::Steals => ("STL", None),
            StatKey::Blocks => ("BLK", None),
            StatKey::ThreePointers => ("3PM", None),
            StatKey::FieldGoalPercentage => (
                "FG%",
                Some(Volume {
                    made: StatKey::FieldGoalsMade,
                    attempted: StatKey::FieldGoalsAttempted,
                }),
            ),
            StatKey::FreeThrowPercentage => (
                "FT%",
                Some(Volume {
                    made: StatKey::FreeThrowsMade,
                    attempted: StatKey::FreeThrowsAttempted,
                }),
            ),
            StatKey::Turnovers => ("TO", None),
            StatKey::FieldGoalsMade => ("FGM", None),
            StatKey::FieldGoalsAttempted => ("FGA", None),
            StatKey::FreeThrowsMade => ("FTM", None),
            StatKey::FreeThrowsAttempted => ("FTA", None),
        };
        StatCategory {
            key,
            display_label,
            higher_is_better: key != StatKey::Turnovers,
            is_percentage: volume.is_some(),
            volume,
        }
    }

    /// Orient a z-score so that a larger result is always better.
    pub fn signed(&self, z: f64) -> f64 {
        if self.higher_is_better {
            z
        } else {
            -z
        }
    }
}

// ---------------------------------------------------------------------------
// Category sets
// ---------------------------------------------------------------------------

/// Which category set a computation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryContext {
    Season,
    Game,
}

impl FromStr for CategoryContext {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "season" => Ok(CategoryContext::Season),
            "game" | "games" | "game_log" => Ok(CategoryContext::Game),
            other => Err(CategoryError::UnknownContext(other.to_string())),
        }
    }
}

const SEASON_KEYS: [StatKey; 9] = [
    StatKey::Points,
    StatKey::Rebounds,
    StatKey::Assists,
    StatKey::Steals,
    StatKey::Blocks,
    StatKey::ThreePointers,
    StatKey::FieldGoalPercentage,
    StatKey::FreeThrowPercentage,
    StatKey::Turnovers,
];

const GAME_LOG_KEYS: [StatKey; 11] = [
    StatKey::Points,
    StatKey::Rebounds,
    StatKey::Assists,
    StatKey::Steals,
    StatKey::Blocks,
    StatKey::ThreePointers,
    StatKey::FieldGoalsMade,
    StatKey::FieldGoalsAttempted,
    StatKey::FreeThrowsMade,
    StatKey::FreeThrowsAttempted,
    StatKey::Turnovers,
];

/// An ordered, duplicate-free list of categories. Order drives summation
/// order, so results are reproducible for a given set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<StatCategory>,
}

impl CategorySet {
    /// The nine head-to-head categories used for season play.
    pub fn season() -> Self {
        Self::from_keys(SEASON_KEYS)
    }

    /// The eleven fantasy-scoring inputs used for game logs.
    pub fn game_log() -> Self {
        Self::from_keys(GAME_LOG_KEYS)
    }

    pub fn for_context(context: CategoryContext) -> Self {
        match context {
            CategoryContext::Season => Self::season(),
            CategoryContext::Game => Self::game_log(),
        }
    }

    /// Build a set from keys, keeping the first occurrence of each.
    pub fn from_keys(keys: impl IntoIterator<Item = StatKey>) -> Self {
        let mut categories: Vec<StatCategory> = Vec::new();
        for key in keys {
            if !categories.iter().any(|c| c.key == key) {
                categories.push(StatCategory::of(key));
            }
        }
        CategorySet { categories }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatCategory> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, key: StatKey) -> bool {
        self.categories.iter().any(|c| c.key == key)
    }

    pub fn get(&self, key: StatKey) -> Option<&StatCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn keys(&self) -> Vec<StatKey> {
        self.categories.iter().map(|c| c.key).collect()
    }

    /// The same categories with every one marked higher-is-better, for
    /// values that are already sign-corrected z-scores.
    pub fn oriented(&self) -> CategorySet {
        CategorySet {
            categories: self
                .categories
                .iter()
                .map(|c| StatCategory {
                    higher_is_better: true,
                    ..*c
                })
                .collect(),
        }
    }

    /// The categories left after removing a punt selection, in set order.
    pub fn without(&self, punt: &PuntSelection) -> CategorySet {
        CategorySet {
            categories: self
                .categories
                .iter()
                .filter(|c| !punt.contains(c.key))
                .copied()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CategorySet {
    type Item = &'a StatCategory;
    type IntoIter = std::slice::Iter<'a, StatCategory>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

// ---------------------------------------------------------------------------
// Punt tokens
// ---------------------------------------------------------------------------

/// Umbrella names that stand for a made/attempted pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatGroup {
    FieldGoals,
    FreeThrows,
}

impl StatGroup {
    pub fn members(&self) -> [StatKey; 2] {
        match self {
            StatGroup::FieldGoals => [StatKey::FieldGoalsMade, StatKey::FieldGoalsAttempted],
            StatGroup::FreeThrows => [StatKey::FreeThrowsMade, StatKey::FreeThrowsAttempted],
        }
    }
}

/// One entry of a user's punt or exclusion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PuntToken {
    Key(StatKey),
    Group(StatGroup),
}

impl PuntToken {
    /// The concrete keys this token removes.
    pub fn expand(&self) -> Vec<StatKey> {
        match self {
            PuntToken::Key(key) => vec![*key],
            PuntToken::Group(group) => group.members().to_vec(),
        }
    }
}

impl From<StatKey> for PuntToken {
    fn from(key: StatKey) -> Self {
        PuntToken::Key(key)
    }
}

impl FromStr for PuntToken {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "field_goals" | "fg" => Ok(PuntToken::Group(StatGroup::FieldGoals)),
            "free_throws" | "ft" => Ok(PuntToken::Group(StatGroup::FreeThrows)),
            _ => s.parse::<StatKey>().map(PuntToken::Key),
        }
    }
}

// ---------------------------------------------------------------------------
// Punt selection
// ---------------------------------------------------------------------------

/// A set of excluded keys with umbrella groups already expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuntSelection {
    keys: BTreeSet<StatKey>,
}

impl PuntSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of punt tokens, e.g. `["turnovers", "free_throws"]`.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, CategoryError> {
        let mut selection = PuntSelection::new();
        for token in tokens {
            selection.insert(token.as_ref().parse::<PuntToken>()?);
        }
        Ok(selection)
    }

    pub fn insert(&mut self, token: impl Into<PuntToken>) {
        self.keys.extend(token.into().expand());
    }

    pub fn contains(&self, key: StatKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = StatKey> + '_ {
        self.keys.iter().copied()
    }
}

impl<T: Into<PuntToken>> FromIterator<T> for PuntSelection {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut selection = PuntSelection::new();
        for token in iter {
            selection.insert(token);
        }
        selection
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
