use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNCATEGORIZED: &str = "Uncategorized";

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One timer run, completed or abandoned.
///
/// Stored records may come from older clients, so every field except `id`
/// tolerates being absent, `null`, or of an unexpected shape. Use the
/// accessors rather than the raw fields when aggregating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub id: String,
    /// Seconds of focus time.
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub distractions: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl Session {
    /// Builds the record for a run that just ended, stamping a fresh id.
    pub fn finished(
        duration_secs: u64,
        category: impl Into<String>,
        distractions: u64,
        ended_at: DateTime<Utc>,
        completed: bool,
    ) -> Self {
        Self {
            id: generate_session_id(ended_at),
            duration: Some(duration_secs),
            category: Some(category.into()),
            distractions: Some(distractions),
            timestamp: Some(ended_at),
            completed,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration.unwrap_or(0)
    }

    pub fn distraction_count(&self) -> u64 {
        self.distractions.unwrap_or(0)
    }

    /// Category label, falling back to [`UNCATEGORIZED`] for missing or empty values.
    pub fn category_name(&self) -> &str {
        match self.category.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => UNCATEGORIZED,
        }
    }
}

/// `session_<epoch-ms>_<9 base36 chars>`
pub fn generate_session_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("session_{}_{}", now.timestamp_millis(), suffix)
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|raw| raw.is_finite() && *raw >= 0.0)
                .map(|raw| raw.floor() as u64)
        }),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    })
}
