// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::workflow::{ClientError, SubmissionError, VerificationError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        match err {
            ClientError::ConnectionRequired => ApiError::unauthorized(message),
            ClientError::InvalidInput(_) => ApiError::bad_request(message),
            ClientError::InitializationFailure(_) => ApiError::service_unavailable(message),
            ClientError::Sync(_) => ApiError::bad_gateway(message),
            ClientError::Submission(SubmissionError::UserRejected) => ApiError::conflict(message),
            ClientError::Submission(SubmissionError::Failed(_)) => ApiError::bad_gateway(message),
            ClientError::Verification(VerificationError::RecordNotFound(_)) => {
                ApiError::not_found(message)
            }
            ClientError::Verification(VerificationError::AlreadyVerified) => {
                ApiError::conflict(message)
            }
            ClientError::Verification(VerificationError::Failed(_)) => {
                ApiError::bad_gateway(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
