use super::document::{RawRecord, RawValue};
use indexmap::IndexMap;

pub const DAY_HOUR_FIELD: &str = "Day_Hour";
pub const WEATHER_SCORE_FIELD: &str = "Weather_Score";
const WEATHER_SEVERITY_FIELD: &str = "Weather Severity";
const DEFAULT_DAY_HOUR: f64 = 18.0;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

/// One page after feature normalization: composites decoded, derived fields
/// present, plain strings left for the categorical encoder.
pub type NormalizedRow = IndexMap<String, CellValue>;

/// Normalizes a raw page into numeric/categorical cells. Malformed numeric
/// composites degrade to `0`; nothing here fails a row.
pub fn normalize_record(record: &RawRecord) -> NormalizedRow {
    let mut row = NormalizedRow::with_capacity(record.len() + 2);

    for (field, value) in record {
        let cell = match value {
            RawValue::Number(number) => CellValue::Number(*number),
            RawValue::Text(text) if text.contains(':') => {
                CellValue::Number(decode_composite(text))
            }
            RawValue::Text(text) => CellValue::Text(text.clone()),
        };
        row.insert(field.clone(), cell);
    }

    if !row.contains_key(DAY_HOUR_FIELD) {
        row.insert(
            DAY_HOUR_FIELD.to_string(),
            CellValue::Number(DEFAULT_DAY_HOUR),
        );
    }

    let weather = record
        .get(WEATHER_SEVERITY_FIELD)
        .and_then(RawValue::as_text)
        .unwrap_or("");
    row.insert(
        WEATHER_SCORE_FIELD.to_string(),
        CellValue::Number(weather_score(weather)),
    );

    row
}

/// Decodes a `"label: number"` composite: the segment between the first and
/// second colon, trimmed and parsed as a float. Anything unparsable is `0`.
fn decode_composite(text: &str) -> f64 {
    text.split(':')
        .nth(1)
        .map(str::trim)
        .and_then(|segment| segment.parse::<f64>().ok())
        .unwrap_or(0.0)
}

// "Mild" wins over "Severe" when both substrings appear.
fn weather_score(weather: &str) -> f64 {
    if weather.contains("Mild") {
        0.5
    } else if weather.contains("Severe") {
        1.0
    } else {
        0.7
    }
}
