// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AvailabilityResponse, CreateRecordResponse, NewRecordRequest, RecordListResponse,
        RecordPage, RecordStats, RefreshResponse, RepoRecord, RevealResponse,
    },
    state::AppState,
    status::{TxPhase, TxStatus},
};

pub mod health;
pub mod records;
pub mod status;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        .route("/records/refresh", post(records::refresh_records))
        .route("/records/{record_id}", get(records::get_record))
        .route("/records/{record_id}/reveal", post(records::reveal_record))
        .route("/status", get(status::get_status))
        .route("/availability", post(status::check_availability))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        records::list_records,
        records::refresh_records,
        records::get_record,
        records::create_record,
        records::reveal_record,
        status::get_status,
        status::check_availability
    ),
    components(
        schemas(
            RepoRecord,
            RecordPage,
            RecordStats,
            RecordListResponse,
            NewRecordRequest,
            CreateRecordResponse,
            RevealResponse,
            RefreshResponse,
            AvailabilityResponse,
            TxStatus,
            TxPhase,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Records", description = "Repository records with confidential size"),
        (name = "Status", description = "Transaction status and contract availability")
    )
)]
struct ApiDoc;
