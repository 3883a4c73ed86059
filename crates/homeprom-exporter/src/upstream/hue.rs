//! Hue bridge sensor client.
//!
//! `GET http://{bridge}/api/{key}/sensors` answers with an object of sensor id
//! to record. Records are heterogeneous (switches, presence, light level...);
//! only `ZLLTemperature` records carrying a temperature are kept.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use homeprom_core::error::{HomepromError, Result};
use homeprom_core::{Reading, Unit};

use super::{get_body, Upstream};

pub const TEMPERATURE_TYPE: &str = "ZLLTemperature";

const SOURCE: &str = "hue";

pub struct HueClient {
    http: reqwest::Client,
    url: String,
}

impl HueClient {
    pub fn new(http: reqwest::Client, bridge: &str, api_key: &str) -> Self {
        let bridge = bridge.trim_end_matches('/');
        let base = if bridge.starts_with("http://") || bridge.starts_with("https://") {
            bridge.to_string()
        } else {
            format!("http://{bridge}")
        };
        Self {
            http,
            url: format!("{base}/api/{api_key}/sensors"),
        }
    }
}

#[async_trait]
impl Upstream for HueClient {
    type Reading = Vec<Reading>;

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self) -> Result<Vec<Reading>> {
        let body = get_body(SOURCE, self.http.get(&self.url)).await?;
        decode_sensors(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SensorRecord {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    state: SensorState,
}

#[derive(Debug, Default, Deserialize)]
struct SensorState {
    #[serde(default)]
    temperature: Option<i64>,
    #[serde(default)]
    lastupdated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BridgeError {
    #[serde(default)]
    description: String,
}

/// Decode a `/sensors` body into temperature readings sorted by sensor id.
///
/// The bridge reports failures (e.g. an unknown API key) as a 200 with a JSON
/// array of `{"error": {...}}` objects; those surface as decode errors.
pub fn decode_sensors(body: &[u8]) -> Result<Vec<Reading>> {
    let value: Value = serde_json::from_slice(body).map_err(|e| HomepromError::decode(SOURCE, e.to_string()))?;

    let records: HashMap<String, Value> = match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => {
            let msg = items
                .iter()
                .filter_map(|i| i.get("error"))
                .filter_map(|e| serde_json::from_value::<BridgeError>(e.clone()).ok())
                .map(|e| e.description)
                .next()
                .unwrap_or_else(|| "unexpected array response".to_string());
            return Err(HomepromError::decode(SOURCE, format!("bridge error: {msg}")));
        }
        _ => return Err(HomepromError::decode(SOURCE, "expected an object of sensors")),
    };

    let mut readings = Vec::new();
    for (id, raw) in records {
        let is_temperature = raw.get("type").and_then(Value::as_str) == Some(TEMPERATURE_TYPE);
        let rec: SensorRecord = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) if is_temperature => {
                tracing::warn!(sensor_id = %id, error = %e, "dropping undecodable temperature sensor");
                continue;
            }
            Err(e) => {
                tracing::debug!(sensor_id = %id, error = %e, "skipping undecodable sensor record");
                continue;
            }
        };
        if rec.kind != TEMPERATURE_TYPE {
            continue;
        }
        let Some(temp) = rec.state.temperature else {
            tracing::debug!(sensor_id = %id, name = %rec.name, "temperature sensor without a reading");
            continue;
        };
        readings.push(
            Reading::new(id, rec.name, temp as f64, Unit::Centi)
                .with_kind(rec.kind)
                .with_observed_at(rec.state.lastupdated),
        );
    }
    readings.sort_by(|a, b| cmp_sensor_ids(&a.id, &b.id));
    Ok(readings)
}

/// Bridge ids are decimal strings; order them numerically, non-numeric ids last.
fn cmp_sensor_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
