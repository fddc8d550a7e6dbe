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

use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue, LabelValueEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::fmt;
use std::time::Duration;

/// How a single relay request ended.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Outcome {
    Success,
    MissingParameter,
    ServerMisconfigured,
    UpstreamDataShapeInvalid,
    UpstreamHttpError,
    UpstreamUnreachable,
    RequestSetupFailure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::MissingParameter => "missing_parameter",
            Self::ServerMisconfigured => "server_misconfigured",
            Self::UpstreamDataShapeInvalid => "upstream_data_shape_invalid",
            Self::UpstreamHttpError => "upstream_http_error",
            Self::UpstreamUnreachable => "upstream_unreachable",
            Self::RequestSetupFailure => "request_setup_failure",
        }
    }
}

impl EncodeLabelValue for Outcome {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), fmt::Error> {
        EncodeLabelValue::encode(&self.as_str(), encoder)
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct OutcomeLabels {
    outcome: Outcome,
}

/// Holder for metrics about relay requests and calls made to Meteoblue.
///
/// All metrics are created and registered upon call to `RelayMetrics::new()`. Use a
/// registry created with a prefix (e.g. `Registry::with_prefix("meteoblue_relay")`) to
/// namespace them.
#[derive(Debug)]
pub struct RelayMetrics {
    responses: Family<OutcomeLabels, Counter>,
    upstream_duration: Histogram,
}

impl RelayMetrics {
    pub fn new(reg: &mut Registry) -> Self {
        let responses = Family::<OutcomeLabels, Counter>::default();
        let upstream_duration = Histogram::new(exponential_buckets(0.05, 2.0, 10));

        reg.register("responses", "Relay responses sent, by outcome", responses.clone());
        reg.register(
            "upstream_duration_seconds",
            "Time spent waiting for the Meteoblue API in seconds",
            upstream_duration.clone(),
        );

        Self {
            responses,
            upstream_duration,
        }
    }

    /// Count a response sent by the relay.
    pub fn response(&self, outcome: Outcome) {
        self.responses.get_or_create(&OutcomeLabels { outcome }).inc();
    }

    /// Record the time taken by a single call to Meteoblue, successful or not.
    pub fn upstream_duration(&self, elapsed: Duration) {
        self.upstream_duration.observe(elapsed.as_secs_f64());
    }
}
