// meteoblue_relay - HTTP relay for daily temperatures from the Meteoblue API
//
// Copyright 2024 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::query::TemperatureQuery;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const UNIT_CELSIUS: &str = "Celsius";

/// Subset of a Meteoblue `basic-day` response used by the relay.
///
/// Every field is optional: Meteoblue omits series that weren't requested or aren't
/// available for a location. Series are kept as raw JSON so numbers are relayed exactly
/// as Meteoblue formats them, and a series that isn't an array only affects itself.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Forecast {
    pub data_day: Option<DataDay>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct DataDay {
    pub time: Option<Value>,
    pub temperature: Option<Value>,
    pub temperature_min: Option<Value>,
    pub temperature_max: Option<Value>,
}

impl Forecast {
    /// Interpret an arbitrary JSON payload as a forecast, returning an empty forecast
    /// if the payload doesn't have the expected structure.
    pub fn from_payload(payload: &Value) -> Self {
        Self::deserialize(payload).unwrap_or_default()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DailyTemperature {
    pub date: Value,
    pub temperature: Value,
    pub temperature_min: Value,
    pub temperature_max: Value,
}

/// Response body of a successful temperature request.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TemperatureReport {
    pub message: String,
    pub location: Location,
    pub unit: &'static str,
    pub data: Vec<DailyTemperature>,
}

impl TemperatureReport {
    /// Build a report for the first `query.days` days of `forecast`.
    ///
    /// Returns `None` if the forecast has no daily time series array. Other series that
    /// are missing, not arrays, or shorter than the time series are reported as `null`
    /// for each day.
    pub fn build(query: &TemperatureQuery, forecast: &Forecast) -> Option<Self> {
        let day = forecast.data_day.as_ref()?;
        let time = day.time.as_ref()?.as_array()?;

        let data = time
            .iter()
            .take(query.days.limit(time.len()))
            .enumerate()
            .map(|(i, date)| DailyTemperature {
                date: date.clone(),
                temperature: value_at(&day.temperature, i),
                temperature_min: value_at(&day.temperature_min, i),
                temperature_max: value_at(&day.temperature_max, i),
            })
            .collect();

        Some(TemperatureReport {
            message: format!(
                "Temperatura para {} dia(s) em latitude {}, longitude {}",
                query.days, query.latitude, query.longitude
            ),
            location: query.location(),
            unit: UNIT_CELSIUS,
            data,
        })
    }
}

fn value_at(series: &Option<Value>, i: usize) -> Value {
    series
        .as_ref()
        .and_then(Value::as_array)
        .and_then(|values| values.get(i))
        .cloned()
        .unwrap_or(Value::Null)
}
