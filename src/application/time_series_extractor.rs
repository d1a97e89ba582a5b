// Time-series extractor - Parses the time branch into parallel series on one axis
use crate::application::extract_options::ExtractOptions;
use crate::domain::time_series::{
    DateTimeValue, RawTime, TimeKind, TimeSeries, TimeSeriesGroup,
};
use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Extract the time-series group from `options.time_key`.
///
/// Returns `None` when the branch is absent, empty or carries no usable series.
pub fn extract_time_series(
    document: &Value,
    options: &ExtractOptions,
) -> Option<TimeSeriesGroup> {
    let entry = document
        .get(&options.time_key)?
        .as_array()?
        .first()?
        .as_object()?;

    let time_class = entry.get("timeClass").and_then(Value::as_str).unwrap_or("");
    let time_kind = TimeKind::from_class(time_class);
    let raw_times: Vec<RawTime> = array(entry, "time").iter().map(raw_time).collect();
    let timestamps: Vec<DateTimeValue> = raw_times
        .iter()
        .map(|raw| parse_time(raw, &time_kind))
        .collect();

    let names = array(entry, "data");
    let units = array(entry, "units");
    let value_kinds = array(entry, "valuesClass");
    let values = array(entry, "values");

    let mut series = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let name = text(Some(name));
        let column: Vec<f64> = values
            .get(index)
            .and_then(Value::as_array)
            .map(|column| column.iter().map(number).collect())
            .unwrap_or_default();

        if column.len() != raw_times.len() {
            tracing::warn!(
                "Series {} has {} values for {} timestamps, dropping it",
                name,
                column.len(),
                raw_times.len()
            );
            continue;
        }

        series.push(TimeSeries::new(
            name,
            text(units.get(index)),
            column,
            text(value_kinds.get(index)),
        ));
    }

    if series.is_empty() {
        return None;
    }

    Some(TimeSeriesGroup {
        id: entry.get("id").and_then(Value::as_i64).unwrap_or(0),
        time_kind,
        timestamps,
        raw_times,
        series,
    })
}

/// Parse one raw axis entry according to the declared time kind.
pub fn parse_time(raw: &RawTime, kind: &TimeKind) -> DateTimeValue {
    match (kind, raw) {
        (TimeKind::DateTime(_), RawTime::Number(millis)) => {
            DateTime::from_timestamp_millis(*millis as i64)
                .map(|utc| DateTimeValue::Instant(utc.fixed_offset()))
                .unwrap_or(DateTimeValue::Ticks(*millis))
        }
        (TimeKind::DateTime(_), RawTime::Text(text)) => parse_date_time(text),
        (TimeKind::TimeOfDay(_), RawTime::Text(text)) => TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
            .map(DateTimeValue::TimeOfDay)
            .unwrap_or_else(|| DateTimeValue::Raw(text.clone())),
        (_, RawTime::Number(ticks)) => DateTimeValue::Ticks(*ticks),
        (TimeKind::Numeric(_), RawTime::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(DateTimeValue::Ticks)
            .unwrap_or_else(|_| DateTimeValue::Raw(text.clone())),
    }
}

fn parse_date_time(text: &str) -> DateTimeValue {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return DateTimeValue::Instant(instant);
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(DateTimeValue::DateTime)
        .unwrap_or_else(|| DateTimeValue::Raw(text.to_string()))
}

fn array<'a>(entry: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    entry
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn raw_time(value: &Value) -> RawTime {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(RawTime::Number)
            .unwrap_or_else(|| RawTime::Text(n.to_string())),
        Value::String(s) => RawTime::Text(s.clone()),
        other => RawTime::Text(other.to_string()),
    }
}

fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn extract(document: &Value) -> Option<TimeSeriesGroup> {
        extract_time_series(document, &ExtractOptions::default())
    }

    #[test]
    fn test_date_time_series() {
        let group = extract(&json!({
            "time": [{
                "id": 7,
                "timeClass": "offsetDateTime",
                "data": ["Temperature", "Humidity"],
                "units": ["°C", "%"],
                "valuesClass": ["Double", "Integer"],
                "time": ["2024-03-01T10:00:00Z", "2024-03-01 11:00:00", 1709294400000_i64],
                "values": [[10.5, 11.0, "11.5"], [40, 42, null]]
            }]
        }))
        .unwrap();

        assert_eq!(group.id, 7);
        assert_eq!(group.time_kind, TimeKind::DateTime("offsetDateTime".to_string()));
        assert_eq!(group.raw_times.len(), 3);
        assert_eq!(group.timestamps.len(), 3);
        assert!(group.series.iter().all(|s| s.values.len() == group.raw_times.len()));

        match &group.timestamps[0] {
            DateTimeValue::Instant(t) => assert_eq!(t.hour(), 10),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            &group.timestamps[1],
            DateTimeValue::DateTime(t) if t.day() == 1 && t.hour() == 11
        ));
        assert!(matches!(&group.timestamps[2], DateTimeValue::Instant(t) if t.month() == 3));

        let temperature = &group.series[0];
        assert_eq!(temperature.unit, "°C");
        assert_eq!(temperature.value_kind, "Double");
        assert_eq!(temperature.values, vec![10.5, 11.0, 11.5]);
        assert!(group.series[1].values[2].is_nan());
    }

    #[test]
    fn test_time_of_day_and_numeric_kinds() {
        let time_of_day = extract(&json!({
            "time": [{
                "timeClass": "time",
                "data": ["Flow"],
                "time": ["08:15:00", "25:99"],
                "values": [[1, 2]]
            }]
        }))
        .unwrap();
        assert_eq!(time_of_day.time_kind.label(), "time");
        assert!(matches!(
            time_of_day.timestamps[0],
            DateTimeValue::TimeOfDay(t) if t.minute() == 15
        ));
        assert_eq!(time_of_day.timestamps[1], DateTimeValue::Raw("25:99".to_string()));
        assert_eq!(time_of_day.series[0].unit, "");

        let numeric = extract(&json!({
            "time": [{
                "timeClass": "Integer",
                "data": ["Load"],
                "units": ["kW"],
                "time": [1, 2, "3"],
                "values": [[5, 6, 7]]
            }]
        }))
        .unwrap();
        assert_eq!(numeric.time_kind, TimeKind::Numeric("Integer".to_string()));
        assert_eq!(
            numeric.timestamps,
            vec![DateTimeValue::Ticks(1.0), DateTimeValue::Ticks(2.0), DateTimeValue::Ticks(3.0)]
        );
    }

    #[test]
    fn test_mismatched_series_is_dropped() {
        let group = extract(&json!({
            "time": [{
                "timeClass": "Integer",
                "data": ["short", "ok"],
                "time": [1, 2],
                "values": [[1], [1, 2]]
            }]
        }))
        .unwrap();
        let names: Vec<&str> = group.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ok"]);
    }

    #[test]
    fn test_absent_or_empty_branch() {
        assert!(extract(&json!({ "meta": {} })).is_none());
        assert!(extract(&json!({ "time": [] })).is_none());
        let no_series = json!({ "time": [{ "timeClass": "Instant", "time": [], "data": [] }] });
        assert!(extract(&no_series).is_none());
    }

    #[test]
    fn test_only_first_entry_is_used() {
        let group = extract(&json!({
            "time": [
                { "id": 1, "timeClass": "Integer", "data": ["a"], "time": [0], "values": [[1]] },
                { "id": 2, "timeClass": "Integer", "data": ["b"], "time": [0], "values": [[2]] }
            ]
        }))
        .unwrap();
        assert_eq!(group.id, 1);
        assert_eq!(group.series[0].name, "a");
    }
}
