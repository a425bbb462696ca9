// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::store::StoreError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
	pub error: String,
	pub code: String,
}

impl ErrorResponse {
	fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			error: error.into(),
		}
	}
}

/// Handler error type that converts to HTTP responses.
#[derive(Debug)]
pub(crate) enum AppError {
	Unauthorized(&'static str),
	BadRequest(String),
	Store(StoreError),
}

impl From<StoreError> for AppError {
	fn from(error: StoreError) -> Self {
		AppError::Store(error)
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let (status, code, message) = match &self {
			AppError::Unauthorized(message) => {
				(StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", message.to_string())
			}
			AppError::BadRequest(message) => {
				(StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone())
			}
			AppError::Store(error) => {
				let status = match error {
					StoreError::UnknownApi {
						..
					}
					| StoreError::UnknownRecord {
						..
					} => StatusCode::NOT_FOUND,
					_ => StatusCode::BAD_REQUEST,
				};
				(status, "STORE", error.to_string())
			}
		};

		tracing::debug!(%status, %message, "request rejected");
		(status, Json(ErrorResponse::new(code, message))).into_response()
	}
}
