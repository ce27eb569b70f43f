use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MILLIS_PER_MINUTE: u64 = 60_000;

/// Values below this are assumed to already be minutes rather than milliseconds.
const LEGACY_MINUTES_THRESHOLD: f64 = 1000.0;

const FIELD_ID: &str = "id";
const FIELD_NAME: &str = "name";
const FIELD_ENABLED: &str = "enabled";
const FIELD_COLD_POLL_RATE: &str = "coldPollRate";
const FIELD_METRIC_STREAMS_SYNC_STATE: &str = "metricStreamsSyncState";

pub fn minutes_to_millis(minutes: u32) -> u64 {
    u64::from(minutes) * MILLIS_PER_MINUTE
}

/// Renders a poll rate as minutes. Values of 1000 or more are treated as
/// milliseconds, smaller ones as minutes already.
pub fn format_minutes(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let minutes = if value >= LEGACY_MINUTES_THRESHOLD {
        value / MILLIS_PER_MINUTE as f64
    } else {
        value
    };

    if minutes.fract() == 0.0 {
        format!("{}", minutes as i64)
    } else {
        format!("{}", (minutes * 100.0).round() / 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColdPollRate {
    #[default]
    Absent,
    Null,
    Set(Value),
}

impl ColdPollRate {
    fn from_field(value: Option<&Value>) -> Self {
        match value {
            None => ColdPollRate::Absent,
            Some(Value::Null) => ColdPollRate::Null,
            Some(v) => ColdPollRate::Set(v.clone()),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, ColdPollRate::Set(_))
    }

    /// Numeric value of the field; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColdPollRate::Set(Value::Number(n)) => n.as_f64(),
            ColdPollRate::Set(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn display_minutes(&self, missing_label: &str) -> String {
        if !self.is_set() {
            return missing_label.to_string();
        }

        self.as_f64().map(format_minutes).unwrap_or_default()
    }
}

/// An integration as returned by the API.
///
/// The typed accessors cover the fields the tool reasons about; the full JSON
/// object is kept so it can be sent back unchanged apart from `coldPollRate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Integration {
    id: Option<String>,
    name: Option<String>,
    enabled: bool,
    cold_poll_rate: ColdPollRate,
    metric_streams_sync_state: Option<String>,
    raw: Map<String, Value>,
}

impl Integration {
    /// Parses one entry of a listing. Entries that are not JSON objects yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn cold_poll_rate(&self) -> &ColdPollRate {
        &self.cold_poll_rate
    }

    pub fn metric_streams_sync_state(&self) -> Option<&str> {
        self.metric_streams_sync_state.as_deref()
    }

    pub fn is_metric_streaming(&self) -> bool {
        self.metric_streams_sync_state() == Some("ENABLED")
    }

    /// Copy of this record with `coldPollRate` overwritten; every other field is kept.
    pub fn with_cold_poll_rate_millis(&self, millis: u64) -> Self {
        let mut raw = self.raw.clone();
        raw.insert(FIELD_COLD_POLL_RATE.to_string(), Value::from(millis));
        Self::from(raw)
    }
}

impl From<Map<String, Value>> for Integration {
    fn from(raw: Map<String, Value>) -> Self {
        let string_field = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            id: string_field(FIELD_ID).filter(|id| !id.is_empty()),
            name: string_field(FIELD_NAME),
            enabled: raw.get(FIELD_ENABLED).and_then(Value::as_bool) == Some(true),
            cold_poll_rate: ColdPollRate::from_field(raw.get(FIELD_COLD_POLL_RATE)),
            metric_streams_sync_state: string_field(FIELD_METRIC_STREAMS_SYNC_STATE),
            raw,
        }
    }
}

impl From<Integration> for Map<String, Value> {
    fn from(integration: Integration) -> Self {
        integration.raw
    }
}

/// Outcome of one update call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub id: String,
    pub name: Option<String>,
    pub success: bool,
    pub target_minutes: u32,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub filtered_disabled: usize,
    pub filtered_cold_poll_set: usize,
    pub filtered_streaming: usize,
    pub candidates: usize,
    pub updated: usize,
    pub failed: usize,
    pub confirmed: bool,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.candidates > 0 && self.updated == self.candidates
    }
}
