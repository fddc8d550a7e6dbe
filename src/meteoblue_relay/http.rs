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

use crate::client::{ClientError, MeteoblueClient};
use crate::config::RelayConfig;
use crate::forecast::{Forecast, TemperatureReport};
use crate::metrics::{Outcome, RelayMetrics};
use crate::query::TemperatureParams;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use prometheus_client::registry::Registry;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

pub const TEXT_FORMAT: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

const METRICS_PREFIX: &str = "meteoblue_relay";

/// Reasons a temperature request fails, each with its own status and message.
#[derive(Debug)]
pub enum RelayError {
    MissingParameter,
    ServerMisconfigured,
    UpstreamDataShapeInvalid,
    UpstreamHttpError(StatusCode, Value),
    UpstreamUnreachable,
    RequestSetupFailure,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter => StatusCode::BAD_REQUEST,
            Self::UpstreamHttpError(status, _) => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Self::UpstreamHttpError(_, details) => json!({
                "error": "Erro ao obter dados da Meteoblue",
                "details": details,
            }),
            _ => json!({ "error": self.message() }),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::MissingParameter => Outcome::MissingParameter,
            Self::ServerMisconfigured => Outcome::ServerMisconfigured,
            Self::UpstreamDataShapeInvalid => Outcome::UpstreamDataShapeInvalid,
            Self::UpstreamHttpError(_, _) => Outcome::UpstreamHttpError,
            Self::UpstreamUnreachable => Outcome::UpstreamUnreachable,
            Self::RequestSetupFailure => Outcome::RequestSetupFailure,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::MissingParameter => "Latitude e longitude são obrigatórias.",
            Self::ServerMisconfigured => "Chave da API não configurada no servidor.",
            Self::UpstreamDataShapeInvalid => "Dados da Meteoblue indisponíveis ou em formato inesperado.",
            Self::UpstreamHttpError(_, _) => "Erro ao obter dados da Meteoblue",
            Self::UpstreamUnreachable => {
                "Nenhuma resposta recebida da API da Meteoblue. Verifique sua conexão ou cheque a disponibilidade da API."
            }
            Self::RequestSetupFailure => "Erro interno ao configurar a requisição para a API da Meteoblue.",
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for RelayError {}

impl From<ClientError> for RelayError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Upstream(status, body) => Self::UpstreamHttpError(status, body),
            ClientError::Unreachable(_) => Self::UpstreamUnreachable,
            ClientError::Setup(_) => Self::RequestSetupFailure,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// State shared by all requests: read-only configuration, the Meteoblue client, and metrics.
#[derive(Debug)]
pub struct RequestState {
    config: RelayConfig,
    client: MeteoblueClient,
    metrics: RelayMetrics,
    registry: Registry,
}

impl RequestState {
    /// Create state for `config`, sending Meteoblue requests with `http`.
    ///
    /// Any timeout for Meteoblue requests must be set on `http`.
    pub fn new(config: RelayConfig, http: reqwest::Client) -> Self {
        let mut registry = Registry::with_prefix(METRICS_PREFIX);
        let metrics = RelayMetrics::new(&mut registry);
        let client = MeteoblueClient::new(http, config.api_url());

        RequestState {
            config,
            client,
            metrics,
            registry,
        }
    }
}

/// Build the relay router with request tracing.
pub fn router(state: Arc<RequestState>) -> Router {
    Router::new()
        .route("/api/temperatura", get(temperature_handler))
        .route("/metrics", get(text_metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn temperature_handler(
    State(state): State<Arc<RequestState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let result = relay(&state, TemperatureParams::from_pairs(pairs)).await;
    match result {
        Ok(report) => {
            state.metrics.response(Outcome::Success);
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => {
            state.metrics.response(e.outcome());
            e.into_response()
        }
    }
}

async fn relay(state: &RequestState, params: TemperatureParams) -> Result<TemperatureReport, RelayError> {
    let query = params.validate().ok_or(RelayError::MissingParameter)?;

    let api_key = state.config.api_key().ok_or_else(|| {
        tracing::error!(message = "Meteoblue API key is not configured");
        RelayError::ServerMisconfigured
    })?;

    let start = Instant::now();
    let res = state.client.basic_day(&query.latitude, &query.longitude, api_key).await;
    state.metrics.upstream_duration(start.elapsed());

    let payload = res.map_err(|e| {
        tracing::error!(message = "failed to fetch forecast", error = %e);
        RelayError::from(e)
    })?;

    let forecast = Forecast::from_payload(&payload);
    TemperatureReport::build(&query, &forecast).ok_or_else(|| {
        tracing::error!(message = "unexpected forecast payload", payload = %payload);
        RelayError::UpstreamDataShapeInvalid
    })
}

pub async fn text_metrics_handler(State(state): State<Arc<RequestState>>) -> impl IntoResponse {
    let mut buf = String::new();
    let mut headers = HeaderMap::new();

    match prometheus_client::encoding::text::encode(&mut buf, &state.registry) {
        Ok(_) => {
            tracing::debug!(message = "encoded prometheus metrics to text format", bytes = buf.len());
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_FORMAT));
            (StatusCode::OK, headers, buf.into_bytes())
        }
        Err(e) => {
            tracing::error!(message = "error encoding metrics to text format", error = %e);
            (StatusCode::INTERNAL_SERVER_ERROR, headers, Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_response() {
        let err = RelayError::MissingParameter;
        assert_eq!(StatusCode::BAD_REQUEST, err.status());
        assert_eq!(json!({"error": "Latitude e longitude são obrigatórias."}), err.body());
    }

    #[test]
    fn server_errors_use_500() {
        for err in [
            RelayError::ServerMisconfigured,
            RelayError::UpstreamDataShapeInvalid,
            RelayError::UpstreamUnreachable,
            RelayError::RequestSetupFailure,
        ] {
            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, err.status());
            assert_eq!(json!({"error": err.to_string()}), err.body());
        }
    }

    #[test]
    fn upstream_error_keeps_status_and_details() {
        let err = RelayError::from(ClientError::Upstream(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            json!({"msg": "rate limited"}),
        ));

        assert_eq!(StatusCode::SERVICE_UNAVAILABLE, err.status());
        assert_eq!(Outcome::UpstreamHttpError, err.outcome());
        assert_eq!(
            json!({"error": "Erro ao obter dados da Meteoblue", "details": {"msg": "rate limited"}}),
            err.body()
        );
    }

    #[test]
    fn misconfigured_message() {
        assert_eq!(
            json!({"error": "Chave da API não configurada no servidor."}),
            RelayError::ServerMisconfigured.body()
        );
    }
}
