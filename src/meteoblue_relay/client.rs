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

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Request, StatusCode};
use serde_json::Value;
use std::error;
use std::fmt;

/// Ways a Meteoblue request can fail, in the order they are checked.
#[derive(Debug)]
pub enum ClientError {
    /// Meteoblue answered with a non-success status and this body.
    Upstream(StatusCode, Value),
    /// The request was sent but no complete response arrived (connection error, timeout).
    Unreachable(reqwest::Error),
    /// The request couldn't be built, e.g. because the base URL is invalid.
    Setup(reqwest::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream(status, body) => write!(f, "unexpected status {}: {}", status, body),
            Self::Unreachable(e) => write!(f, "no response received: {}", e),
            Self::Setup(e) => write!(f, "unable to build request: {}", e),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Unreachable(e) | Self::Setup(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeteoblueClient {
    client: Client,
    base_url: String,
}

impl MeteoblueClient {
    const USER_AGENT: &'static str = concat!("meteoblue_relay/", env!("CARGO_PKG_VERSION"));
    const JSON_RESPONSE: &'static str = "application/json";
    const VARIABLES: &'static str = "temperature_max,temperature_min,temperature";
    const UNIT: &'static str = "metric";
    const FORMAT: &'static str = "json";

    /// Create a client for the `basic-day` package at `base_url`.
    ///
    /// The URL is not validated here. An invalid URL results in `ClientError::Setup`
    /// for each request made.
    pub fn new<S: Into<String>>(client: Client, base_url: S) -> Self {
        MeteoblueClient {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch the daily forecast for a location, returning the raw JSON payload.
    ///
    /// Coordinates are sent exactly as given. Bodies that aren't valid JSON are returned
    /// as a JSON string.
    pub async fn basic_day(&self, latitude: &str, longitude: &str, api_key: &str) -> Result<Value, ClientError> {
        let req = self.basic_day_request(latitude, longitude, api_key)?;
        tracing::debug!(
            message = "making basic-day forecast request",
            url = %self.base_url,
            latitude = %latitude,
            longitude = %longitude,
        );

        let res = self.client.execute(req).await.map_err(|e| {
            if e.is_builder() {
                ClientError::Setup(e)
            } else {
                ClientError::Unreachable(e)
            }
        })?;

        let status = res.status();
        let body = res.bytes().await.map_err(ClientError::Unreachable)?;
        let payload = parse_body(&body);

        if status.is_success() {
            Ok(payload)
        } else {
            Err(ClientError::Upstream(status, payload))
        }
    }

    fn basic_day_request(&self, latitude: &str, longitude: &str, api_key: &str) -> Result<Request, ClientError> {
        self.client
            .get(&self.base_url)
            .header(USER_AGENT, Self::USER_AGENT)
            .header(ACCEPT, Self::JSON_RESPONSE)
            .query(&[
                ("lat", latitude),
                ("lon", longitude),
                ("variables", Self::VARIABLES),
                ("apikey", api_key),
                ("unit", Self::UNIT),
                ("format", Self::FORMAT),
            ])
            .build()
            .map_err(ClientError::Setup)
    }
}

fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
