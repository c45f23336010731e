// Raw row normalization.
//
// Turns season-average rows, per-game rows and Yahoo stat payloads into a
// canonical StatRecord. This is the only module that knows source field names.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

use crate::category::StatKey;
use crate::record::{RecordScope, StatRecord};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which kind of source row is being normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    SeasonAverage,
    Game,
    Yahoo,
}

/// A single stat value as it appears on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum RawStatValue {
    Scalar(f64),
    /// A literal `"num/den"` string.
    Fraction { num: f64, den: f64 },
    /// A value wrapped as `{"value": ...}` or `{"stat": {"value": ...}}`.
    Nested(Box<RawStatValue>),
    Missing,
}

impl RawStatValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(v) if v.is_finite() => RawStatValue::Scalar(v),
                _ => RawStatValue::Missing,
            },
            Value::String(s) => Self::parse_str(s),
            Value::Object(map) => match map.get("stat").or_else(|| map.get("value")) {
                Some(inner) => RawStatValue::Nested(Box::new(Self::from_json(inner))),
                None => RawStatValue::Missing,
            },
            Value::Null | Value::Bool(_) | Value::Array(_) => RawStatValue::Missing,
        }
    }

    pub fn parse_str(s: &str) -> Self {
        let s = s.trim();
        if let Some((num, den)) = s.split_once('/') {
            return match (parse_number(num), parse_number(den)) {
                (Some(num), Some(den)) => RawStatValue::Fraction { num, den },
                _ => RawStatValue::Missing,
            };
        }
        match parse_number(s) {
            Some(v) => RawStatValue::Scalar(v),
            None => RawStatValue::Missing,
        }
    }

    /// The scalar this value stands for. A fraction with a zero denominator
    /// resolves to `None`, not zero.
    pub fn resolve(&self) -> Option<f64> {
        match self {
            RawStatValue::Scalar(v) => Some(*v),
            RawStatValue::Fraction { num, den } => {
                if *den > 0.0 {
                    Some(num / den)
                } else {
                    None
                }
            }
            RawStatValue::Nested(inner) => inner.resolve(),
            RawStatValue::Missing => None,
        }
    }

    /// Numerator and denominator, if this is (or wraps) a fraction.
    pub fn fraction_parts(&self) -> Option<(f64, f64)> {
        match self {
            RawStatValue::Fraction { num, den } => Some((*num, *den)),
            RawStatValue::Nested(inner) => inner.fraction_parts(),
            _ => None,
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let parsed = if s.starts_with('.') {
        format!("0{s}").parse::<f64>()
    } else {
        s.parse::<f64>()
    };
    parsed.ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Field tables
// ---------------------------------------------------------------------------

const ID_FIELDS: &[&str] = &["player_id", "playerId", "nba_player_id", "id"];
const NAME_FIELDS: &[&str] = &["player_name", "playerName", "full_name", "name"];
const TEAM_FIELDS: &[&str] = &[
    "team",
    "team_abbreviation",
    "teamAbbreviation",
    "team_abbr",
    "editorial_team_abbr",
];
const SEASON_FIELDS: &[&str] = &["season", "season_id"];
const DATE_FIELDS: &[&str] = &["game_date", "gameDate", "date"];
const GAMES_FIELDS: &[&str] = &["games_played", "gp", "games"];

/// Column names accepted for each key in season and game rows.
fn row_fields(key: StatKey) -> &'static [&'static str] {
    match key {
        StatKey::Points => &["points", "pts"],
        StatKey::Rebounds => &["rebounds", "total_rebounds", "reb"],
        StatKey::Assists => &["assists", "ast"],
        StatKey::Steals => &["steals", "stl"],
        StatKey::Blocks => &["blocks", "blk"],
        StatKey::ThreePointers => &["three_pointers", "three_pointers_made", "fg3m", "threes"],
        StatKey::FieldGoalPercentage => &["field_goal_percentage", "fg_pct", "fg_percentage"],
        StatKey::FreeThrowPercentage => &["free_throw_percentage", "ft_pct", "ft_percentage"],
        StatKey::Turnovers => &["turnovers", "tov", "to"],
        StatKey::FieldGoalsMade => &["field_goals_made", "fgm"],
        StatKey::FieldGoalsAttempted => &["field_goals_attempted", "fga"],
        StatKey::FreeThrowsMade => &["free_throws_made", "ftm"],
        StatKey::FreeThrowsAttempted => &["free_throws_attempted", "fta"],
    }
}

/// Keys that are plain counting stats and default to zero when absent.
const COUNTING_KEYS: [StatKey; 7] = [
    StatKey::Points,
    StatKey::Rebounds,
    StatKey::Assists,
    StatKey::Steals,
    StatKey::Blocks,
    StatKey::ThreePointers,
    StatKey::Turnovers,
];

/// Made/attempted keys. Stored only when the source carries them, so that
/// "no volume data" stays distinguishable from "zero attempts".
const VOLUME_KEYS: [StatKey; 4] = [
    StatKey::FieldGoalsMade,
    StatKey::FieldGoalsAttempted,
    StatKey::FreeThrowsMade,
    StatKey::FreeThrowsAttempted,
];

/// Yahoo NBA stat ids.
enum YahooStat {
    GamesPlayed,
    Key(StatKey),
    /// Composite `"made/attempted"` value.
    Shooting { made: StatKey, attempted: StatKey },
}

fn yahoo_stat(stat_id: &str) -> Option<YahooStat> {
    let stat = match stat_id.trim() {
        "0" => YahooStat::GamesPlayed,
        "3" => YahooStat::Key(StatKey::FieldGoalsAttempted),
        "4" => YahooStat::Key(StatKey::FieldGoalsMade),
        "5" => YahooStat::Key(StatKey::FieldGoalPercentage),
        "6" => YahooStat::Key(StatKey::FreeThrowsAttempted),
        "7" => YahooStat::Key(StatKey::FreeThrowsMade),
        "8" => YahooStat::Key(StatKey::FreeThrowPercentage),
        "10" => YahooStat::Key(StatKey::ThreePointers),
        "12" => YahooStat::Key(StatKey::Points),
        "15" => YahooStat::Key(StatKey::Rebounds),
        "16" => YahooStat::Key(StatKey::Assists),
        "17" => YahooStat::Key(StatKey::Steals),
        "18" => YahooStat::Key(StatKey::Blocks),
        "19" => YahooStat::Key(StatKey::Turnovers),
        "9004003" => YahooStat::Shooting {
            made: StatKey::FieldGoalsMade,
            attempted: StatKey::FieldGoalsAttempted,
        },
        "9007006" => YahooStat::Shooting {
            made: StatKey::FreeThrowsMade,
            attempted: StatKey::FreeThrowsAttempted,
        },
        _ => return None,
    };
    Some(stat)
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize one raw row into a [`StatRecord`].
///
/// Never fails: unparseable or missing counting stats become 0, and
/// percentages become `None` only when the attempt count is known to be zero.
pub fn normalize(raw: &Value, shape: SourceShape) -> StatRecord {
    let empty = Map::new();
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            warn!("normalizing non-object {:?} row as empty", shape);
            &empty
        }
    };
    match shape {
        SourceShape::SeasonAverage | SourceShape::Game => normalize_row(obj, shape),
        SourceShape::Yahoo => normalize_yahoo(obj),
    }
}

/// Raw values gathered per key before percentages are resolved.
#[derive(Default)]
struct Collected {
    values: Vec<(StatKey, RawStatValue)>,
}

impl Collected {
    fn get(&self, key: StatKey) -> Option<&RawStatValue> {
        self.values.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    fn push(&mut self, key: StatKey, value: RawStatValue) {
        self.values.push((key, value));
    }
}

fn normalize_row(obj: &Map<String, Value>, shape: SourceShape) -> StatRecord {
    let scope = match shape {
        SourceShape::Game => match first_text(obj, DATE_FIELDS).and_then(|s| parse_date(&s)) {
            Some(date) => RecordScope::Game(date),
            None => {
                warn!("game row without a parseable date; treating as aggregate");
                RecordScope::Aggregate
            }
        },
        _ => match first_text(obj, SEASON_FIELDS) {
            Some(season) => RecordScope::Season(season),
            None => RecordScope::Aggregate,
        },
    };

    let mut collected = Collected::default();
    for key in StatKey::ALL {
        if let Some(value) = first_field(obj, row_fields(key)) {
            collected.push(key, RawStatValue::from_json(value));
        }
    }

    let games = first_field(obj, GAMES_FIELDS)
        .and_then(|v| RawStatValue::from_json(v).resolve());
    build_record(obj, scope, games, &collected)
}

fn normalize_yahoo(obj: &Map<String, Value>) -> StatRecord {
    let mut collected = Collected::default();
    let mut games = None;

    let stats = obj
        .get("player_stats")
        .and_then(|ps| ps.get("stats"))
        .or_else(|| obj.get("stats"));

    let mut entries: Vec<(String, RawStatValue)> = Vec::new();
    match stats {
        Some(Value::Array(items)) => {
            for item in items {
                let inner = item.get("stat").unwrap_or(item);
                let Some(id) = inner.get("stat_id").and_then(json_text) else {
                    continue;
                };
                entries.push((id, RawStatValue::from_json(item)));
            }
        }
        Some(Value::Object(map)) => {
            for (id, value) in map {
                entries.push((id.clone(), RawStatValue::from_json(value)));
            }
        }
        _ => warn!("yahoo payload has no stats container"),
    }

    for (id, value) in entries {
        match yahoo_stat(&id) {
            Some(YahooStat::GamesPlayed) => games = value.resolve(),
            Some(YahooStat::Key(key)) => collected.push(key, value),
            Some(YahooStat::Shooting { made, attempted }) => {
                if let Some((num, den)) = value.fraction_parts() {
                    collected.push(made, RawStatValue::Scalar(num));
                    collected.push(attempted, RawStatValue::Scalar(den));
                }
            }
            None => {}
        }
    }

    build_record(obj, RecordScope::Aggregate, games, &collected)
}

fn build_record(
    obj: &Map<String, Value>,
    scope: RecordScope,
    games: Option<f64>,
    collected: &Collected,
) -> StatRecord {
    let player_id = first_text(obj, ID_FIELDS)
        .or_else(|| obj.get("player_key").and_then(json_text))
        .unwrap_or_default();
    let player_name = player_name(obj).unwrap_or_default();
    let team = first_text(obj, TEAM_FIELDS).unwrap_or_default();

    let mut record = StatRecord::new(player_id, player_name, team, scope);
    if let Some(g) = games.filter(|g| *g >= 0.0) {
        record.games_played = Some(g.round() as u32);
    }

    let name = record.player_name.clone();
    for key in COUNTING_KEYS {
        record.set(key, counting_value(&name, key, collected.get(key)));
    }
    for key in VOLUME_KEYS {
        if let Some(raw) = collected.get(key) {
            record.set(key, counting_value(&name, key, Some(raw)));
        }
    }

    let shooting = [
        (StatKey::FieldGoalPercentage, StatKey::FieldGoalsMade, StatKey::FieldGoalsAttempted),
        (StatKey::FreeThrowPercentage, StatKey::FreeThrowsMade, StatKey::FreeThrowsAttempted),
    ];
    for (pct_key, made, attempted) in shooting {
        let pct = resolve_percentage(collected.get(pct_key), record.get(made), record.get(attempted));
        if let Some(v) = pct {
            record.set(pct_key, v);
        }
    }

    record
}

fn counting_value(player: &str, key: StatKey, raw: Option<&RawStatValue>) -> f64 {
    match raw {
        None => 0.0,
        Some(raw) => match raw.resolve() {
            Some(v) => v,
            None => {
                warn!("coercing unparseable {} for '{}' to 0", key, player);
                0.0
            }
        },
    }
}

/// Resolve a shooting percentage to a fraction in [0, 1].
///
/// Known zero attempts, or a `"x/0"` fraction, give `None`. Otherwise an
/// explicit value wins, then made/attempted, then 0.
fn resolve_percentage(raw: Option<&RawStatValue>, made: Option<f64>, attempted: Option<f64>) -> Option<f64> {
    if matches!(attempted, Some(a) if a <= 0.0) {
        return None;
    }
    if let Some(raw) = raw {
        if raw.fraction_parts().is_some() {
            return raw.resolve().map(clamp_fraction);
        }
        if let Some(v) = raw.resolve() {
            return Some(scale_percentage(v));
        }
    }
    match (made, attempted) {
        (Some(m), Some(a)) => Some(clamp_fraction(m / a)),
        _ => Some(0.0),
    }
}

/// Values above 1 are taken as percentage points (47.5 -> 0.475).
fn scale_percentage(v: f64) -> f64 {
    if v > 1.0 {
        clamp_fraction(v / 100.0)
    } else {
        clamp_fraction(v)
    }
}

fn clamp_fraction(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn first_field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

fn first_text(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    first_field(obj, names).and_then(json_text)
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Names arrive either flat or as Yahoo's `{"full": ...}` object.
fn player_name(obj: &Map<String, Value>) -> Option<String> {
    let value = first_field(obj, NAME_FIELDS)?;
    match value {
        Value::Object(parts) => parts.get("full").and_then(json_text),
        other => json_text(other),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
