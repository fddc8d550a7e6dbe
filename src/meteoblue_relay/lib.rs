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

//! HTTP relay for daily temperatures from the Meteoblue API
//!
//! ## Features
//!
//! `meteoblue_relay` exposes a single JSON endpoint that fetches the [Meteoblue] `basic-day`
//! forecast for a location and reduces it to daily temperatures. Callers never see the
//! Meteoblue API key, which is only known to the relay.
//!
//! * `GET /api/temperatura?latitude=$LAT&longitude=$LON&days=$DAYS` - Daily temperature,
//!   minimum and maximum for the first `$DAYS` days of the forecast (one day if omitted).
//! * `GET /metrics` - Prometheus metrics about the relay itself.
//!
//! [Meteoblue]: https://docs.meteoblue.com/en/weather-apis/packages-api/introduction
//!
//! ## Build
//!
//! `meteoblue_relay` is a Rust program and must be built from source using a
//! [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! ### Run
//!
//! The Meteoblue API key is read from the `API_KEY` environment variable (or `--api-key`)
//! and the port to listen on from `PORT` (or `--port`, default `3000`). The relay starts
//! without an API key but every temperature request will fail with a `500` status until
//! one is provided.
//!
//! ```text
//! API_KEY=your-key ./meteoblue_relay
//! ```
//!
//! ### Request
//!
//! ```text
//! curl -sS 'http://localhost:3000/api/temperatura?latitude=-23.55&longitude=-46.63&days=3' | jq
//! ```
//!
//! ```json
//! {
//!   "message": "Temperatura para 3 dia(s) em latitude -23.55, longitude -46.63",
//!   "location": { "latitude": -23.55, "longitude": -46.63 },
//!   "unit": "Celsius",
//!   "data": [
//!     { "date": "2024-01-01", "temperature": 20.4, "temperature_min": 16.1, "temperature_max": 26.0 },
//!     { "date": "2024-01-02", "temperature": 21.0, "temperature_min": 17.3, "temperature_max": 27.2 },
//!     { "date": "2024-01-03", "temperature": 19.8, "temperature_min": 16.9, "temperature_max": 24.5 }
//!   ]
//! }
//! ```
//!
//! Errors are returned as `{"error": "..."}`. If Meteoblue itself responds with an error,
//! its status code is kept and its response body is included as `details`.
//!

pub mod client;
pub mod config;
pub mod forecast;
pub mod http;
pub mod metrics;
pub mod query;
