use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{GuardError, Result};

/// Budget alert record (decoded notification body).
///
/// Amounts arrive either as JSON numbers or as numeric strings. Missing
/// amounts default to `0`, which makes a missing budget an invalid budget
/// rather than a silent pass.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    #[serde(default, deserialize_with = "amount")]
    pub cost_amount: f64,
    #[serde(default, deserialize_with = "amount")]
    pub budget_amount: f64,
    #[serde(default)]
    pub budget_display_name: Option<String>,

    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub alert_threshold_exceeded: Option<f64>,
    #[serde(default, deserialize_with = "optional_amount")]
    pub forecast_threshold_exceeded: Option<f64>,
    #[serde(default)]
    pub cost_interval_start: Option<String>,
}

impl AlertRecord {
    /// Convert a decoded JSON object into a typed record.
    pub fn from_payload(payload: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(payload))
            .map_err(|e| GuardError::MalformedPayload(format!("invalid alert record: {e}")))
    }

    /// Display name for logs (empty when absent).
    pub fn display_name(&self) -> &str {
        self.budget_display_name.as_deref().unwrap_or("")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn into_f64(self) -> std::result::Result<f64, String> {
        let v = match self {
            RawAmount::Number(n) => n,
            RawAmount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("not a number: {s:?}"))?,
        };
        if !v.is_finite() {
            return Err(format!("amount must be finite, got {v}"));
        }
        Ok(v)
    }
}

fn amount<'de, D>(de: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    RawAmount::deserialize(de)?
        .into_f64()
        .map_err(serde::de::Error::custom)
}

fn optional_amount<'de, D>(de: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawAmount>::deserialize(de)? {
        Some(raw) => raw.into_f64().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
