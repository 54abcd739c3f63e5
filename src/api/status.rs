// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{models::AvailabilityResponse, state::AppState, status::TxStatus};

/// Current transaction status. Hidden once auto-cleared.
#[utoipa::path(
    get,
    path = "/v1/status",
    tag = "Status",
    responses((status = 200, body = TxStatus))
)]
pub async fn get_status(State(state): State<AppState>) -> Json<TxStatus> {
    Json(state.client.current_status())
}

#[utoipa::path(
    post,
    path = "/v1/availability",
    tag = "Status",
    responses((status = 200, body = AvailabilityResponse))
)]
pub async fn check_availability(State(state): State<AppState>) -> Json<AvailabilityResponse> {
    Json(AvailabilityResponse {
        available: state.client.check_availability().await,
    })
}
