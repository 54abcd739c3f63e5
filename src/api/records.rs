// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::ApiError,
    models::{
        CreateRecordResponse, NewRecordRequest, RecordListResponse, RefreshResponse,
        RepoRecord, RevealResponse,
    },
    query::{compute_stats, filter_records, paginate, sort_newest_first, DEFAULT_PAGE_SIZE},
    state::AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecordQuery {
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// List records from the local snapshot. Does not contact the ledger.
#[utoipa::path(
    get,
    path = "/v1/records",
    params(RecordQuery),
    tag = "Records",
    responses((status = 200, body = RecordListResponse))
)]
pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<RecordQuery>,
) -> Json<RecordListResponse> {
    let snapshot = state.client.records();
    let stats = compute_stats(&snapshot);

    let mut matching = filter_records(&snapshot, params.search.as_deref().unwrap_or(""));
    sort_newest_first(&mut matching);
    let page = paginate(
        matching,
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    Json(RecordListResponse {
        page,
        stats,
        refreshing: state.client.synchronizer().is_refreshing(),
    })
}

#[utoipa::path(
    post,
    path = "/v1/records/refresh",
    tag = "Records",
    responses(
        (status = 200, body = RefreshResponse),
        (status = 502, description = "Ledger unreachable")
    )
)]
pub async fn refresh_records(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let snapshot = state.client.refresh().await?;
    Ok(Json(RefreshResponse {
        total_records: snapshot.len(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/records/{record_id}",
    params(
        ("record_id" = String, Path, description = "Record identifier")
    ),
    tag = "Records",
    responses(
        (status = 200, body = RepoRecord),
        (status = 404, description = "Not in the local record set")
    )
)]
pub async fn get_record(
    Path(record_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RepoRecord>, ApiError> {
    state
        .client
        .synchronizer()
        .record(&record_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Record {record_id} not found")))
}

/// Encrypt the size and create the record on-chain.
#[utoipa::path(
    post,
    path = "/v1/records",
    request_body = NewRecordRequest,
    tag = "Records",
    responses(
        (status = 201, body = CreateRecordResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "No account connected"),
        (status = 409, description = "Transaction rejected by user"),
        (status = 502, description = "Submission failed")
    )
)]
pub async fn create_record(
    State(state): State<AppState>,
    Json(request): Json<NewRecordRequest>,
) -> Result<(StatusCode, Json<CreateRecordResponse>), ApiError> {
    let record_id = state.client.submit(&request).await?;
    Ok((StatusCode::CREATED, Json(CreateRecordResponse { record_id })))
}

/// Decrypt the confidential size and verify it on-chain.
///
/// `revealed_size` is null when another party verified the record while
/// this request was in flight.
#[utoipa::path(
    post,
    path = "/v1/records/{record_id}/reveal",
    params(
        ("record_id" = String, Path, description = "Record identifier")
    ),
    tag = "Records",
    responses(
        (status = 200, body = RevealResponse),
        (status = 401, description = "No account connected"),
        (status = 404, description = "Unknown record"),
        (status = 502, description = "Decryption failed")
    )
)]
pub async fn reveal_record(
    Path(record_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RevealResponse>, ApiError> {
    let revealed_size = state.client.reveal_size(&record_id).await?;
    Ok(Json(RevealResponse {
        record_id,
        revealed_size,
    }))
}
