// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Registry contract reachability ("ok", "unavailable" or "unreachable").
    pub ledger: String,
    /// "connected" when an account can sign, otherwise "read-only".
    pub account: String,
    /// Confidential subsystem state ("ready" or "not_initialized").
    pub confidential: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

async fn check_ledger(state: &AppState) -> String {
    match state.client.gateway.probe_availability().await {
        Ok(true) => "ok",
        Ok(false) => "unavailable",
        Err(e) => {
            tracing::warn!(error = %e, "Ledger health check failed");
            "unreachable"
        }
    }
    .to_string()
}

/// Health check endpoint handler.
///
/// Returns 200 when the registry contract answers, 503 otherwise. A missing
/// account or an uninitialized confidential subsystem is reported but does
/// not degrade the service.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let ledger = check_ledger(&state).await;
    let all_ok = ledger == "ok";

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            ledger,
            account: if state.client.is_connected() {
                "connected"
            } else {
                "read-only"
            }
            .to_string(),
            confidential: if state.client.is_initialized() {
                "ready"
            } else {
                "not_initialized"
            }
            .to_string(),
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
