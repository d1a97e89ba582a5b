// Time-series domain models
use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime};

/// Declared class of the raw time axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeKind {
    /// Absolute instants, parsed with the date-time formats.
    DateTime(String),
    /// Time of day only, parsed with the time formats.
    TimeOfDay(String),
    /// Anything else; raw values are kept as numeric ticks.
    Numeric(String),
}

impl TimeKind {
    pub fn from_class(class: &str) -> Self {
        match class.to_ascii_lowercase().as_str() {
            "datetime" | "offsetdatetime" | "localdatetime" | "instant" => {
                TimeKind::DateTime(class.to_string())
            }
            "time" | "offsettime" | "localtime" => TimeKind::TimeOfDay(class.to_string()),
            _ => TimeKind::Numeric(class.to_string()),
        }
    }

    /// The class as declared in the document.
    pub fn label(&self) -> &str {
        match self {
            TimeKind::DateTime(class) | TimeKind::TimeOfDay(class) | TimeKind::Numeric(class) => {
                class
            }
        }
    }
}

/// A raw time axis entry as found in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTime {
    Number(f64),
    Text(String),
}

/// A parsed time axis entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DateTimeValue {
    Instant(DateTime<FixedOffset>),
    DateTime(NaiveDateTime),
    TimeOfDay(NaiveTime),
    Ticks(f64),
    /// Text that matched none of the formats for its kind.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub name: String,
    pub unit: String,
    pub values: Vec<f64>,
    pub value_kind: String,
}

impl TimeSeries {
    pub fn new(name: String, unit: String, values: Vec<f64>, value_kind: String) -> Self {
        Self {
            name,
            unit,
            values,
            value_kind,
        }
    }
}

/// Parallel series sharing one time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesGroup {
    pub id: i64,
    pub time_kind: TimeKind,
    pub timestamps: Vec<DateTimeValue>,
    pub raw_times: Vec<RawTime>,
    pub series: Vec<TimeSeries>,
}
