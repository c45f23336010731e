// Raw data loading: stat rows (JSON array or CSV), roster JSON, schedule JSON.
//
// Rows are handed to the core Normalizer as JSON objects. CSV rows become
// objects with string values, which the Normalizer parses like any other
// string-typed source.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use hoopval_core::{normalize, SourceShape, StatRecord};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::DataPaths;
use crate::playoff::Schedule;
use crate::roster::RosterEntry;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Everything the pipeline consumes, fully materialized.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub season_records: Vec<StatRecord>,
    pub game_records: Vec<StatRecord>,
    pub roster: Vec<RosterEntry>,
    pub schedule: Option<Schedule>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn rows_from_csv_reader<R: Read>(rdr: R) -> Result<Vec<Value>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<HashMap<String, String>>() {
        match result {
            Ok(raw) => {
                let obj: Map<String, Value> = raw
                    .into_iter()
                    .filter(|(_, v)| !v.trim().is_empty())
                    .map(|(k, v)| (k.trim().to_string(), Value::String(v.trim().to_string())))
                    .collect();
                rows.push(Value::Object(obj));
            }
            Err(e) => {
                warn!("skipping malformed CSV row: {}", e);
            }
        }
    }
    Ok(rows)
}

fn rows_from_json_reader<R: Read>(rdr: R) -> Result<Vec<Value>, serde_json::Error> {
    let value: Value = serde_json::from_reader(rdr)?;
    let items = match value {
        Value::Array(items) => items,
        // A single object, or an envelope such as {"data": [...]}.
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => vec![Value::Object(obj)],
        },
        other => {
            warn!("expected a JSON array of rows, found {}", json_kind(&other));
            Vec::new()
        }
    };

    Ok(items
        .into_iter()
        .filter(|item| {
            let keep = item.is_object();
            if !keep {
                warn!("skipping non-object JSON row: {}", json_kind(item));
            }
            keep
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize rows, dropping those that carry neither an id nor a name.
fn normalize_rows(rows: &[Value], shape: SourceShape) -> Vec<StatRecord> {
    rows.iter()
        .map(|row| normalize(row, shape))
        .filter(|record| {
            let keep = !record.player_id.is_empty() || !record.player_name.is_empty();
            if !keep {
                warn!("skipping {:?} row with no player id or name", shape);
            }
            keep
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Read raw rows from a `.csv` file or, for any other extension, a JSON file.
pub fn load_rows(path: &Path) -> Result<Vec<Value>, LoadError> {
    let file = open(path)?;
    if is_csv(path) {
        rows_from_csv_reader(file).map_err(|e| LoadError::Csv {
            path: path.display().to_string(),
            source: e,
        })
    } else {
        rows_from_json_reader(file).map_err(|e| LoadError::Json {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// Load and normalize stat rows of the given shape.
pub fn load_records(path: &Path, shape: SourceShape) -> Result<Vec<StatRecord>, LoadError> {
    let rows = load_rows(path)?;
    let records = normalize_rows(&rows, shape);
    debug!(
        "normalized {} of {} rows from {}",
        records.len(),
        rows.len(),
        path.display()
    );
    Ok(records)
}

/// Load a roster exported as a JSON array of entries.
pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, LoadError> {
    serde_json::from_reader(open(path)?).map_err(|e| LoadError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a `date -> [team]` schedule.
pub fn load_schedule(path: &Path) -> Result<Schedule, LoadError> {
    serde_json::from_reader(open(path)?).map_err(|e| LoadError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load every configured input. Only the season rows are required.
pub fn load_inputs(paths: &DataPaths) -> Result<Inputs, LoadError> {
    let season_records = load_records(Path::new(&paths.season_rows), SourceShape::SeasonAverage)?;
    if season_records.is_empty() {
        return Err(LoadError::Validation(format!(
            "{} produced zero valid season rows",
            paths.season_rows
        )));
    }

    let game_records = match &paths.game_rows {
        Some(p) => load_records(Path::new(p), SourceShape::Game)?,
        None => Vec::new(),
    };
    let roster = match &paths.roster {
        Some(p) => load_roster(Path::new(p))?,
        None => Vec::new(),
    };
    let schedule = paths
        .schedule
        .as_deref()
        .map(|p| load_schedule(Path::new(p)))
        .transpose()?;

    Ok(Inputs {
        season_records,
        game_records,
        roster,
        schedule,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hoopval_core::{RecordScope, StatKey};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn csv_rows_become_string_objects() {
        let csv_data = "\
player_id,player_name,team,season,games_played,points,fg_pct,fgm,fga
2544,LeBron James,LAL,2023-24,71,25.7,.540,9.6,17.9
203999,Nikola Jokic,DEN,2023-24,79,26.4,,10.4,17.9";

        let rows = rows_from_csv_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["points"], Value::String("25.7".into()));
        // Empty cells are left out so they read as absent.
        assert!(rows[1].get("fg_pct").is_none());

        let records = normalize_rows(&rows, SourceShape::SeasonAverage);
        assert_eq!(records[0].player_name, "LeBron James");
        assert_eq!(records[0].scope, RecordScope::Season("2023-24".into()));
        assert_eq!(records[0].games_played, Some(71));
        assert!(approx_eq(records[0].get(StatKey::FieldGoalPercentage).unwrap(), 0.540, 1e-12));
        // Derived from made / attempted when the percentage cell is blank.
        assert!(approx_eq(
            records[1].get(StatKey::FieldGoalPercentage).unwrap(),
            10.4 / 17.9,
            1e-12
        ));
    }

    #[test]
    fn json_array_rows() {
        let json = r#"[
            {"player_id": 1, "player_name": "A", "season": "2023-24", "points": 10},
            "garbage",
            {"player_id": 2, "player_name": "B", "season": "2023-24", "points": 20}
        ]"#;
        let rows = rows_from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn json_data_envelope_is_unwrapped() {
        let json = r#"{"data": [{"player_name": "A"}, {"player_name": "B"}]}"#;
        assert_eq!(rows_from_json_reader(json.as_bytes()).unwrap().len(), 2);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(rows_from_json_reader("[{".as_bytes()).is_err());
    }

    #[test]
    fn rows_without_identity_are_dropped() {
        let rows = vec![
            serde_json::json!({"points": 10}),
            serde_json::json!({"player_name": "Kept", "points": 12}),
        ];
        let records = normalize_rows(&rows, SourceShape::SeasonAverage);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_name, "Kept");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_rows(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn csv_extension_detection() {
        assert!(is_csv(Path::new("rows.CSV")));
        assert!(!is_csv(Path::new("rows.json")));
        assert!(!is_csv(Path::new("rows")));
    }
}
