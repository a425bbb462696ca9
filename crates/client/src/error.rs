// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

use reqwest::StatusCode;

/// Errors surfaced by the client.
///
/// The client never retries on its own; every variant is reported to the
/// caller exactly once and retry policy stays a caller concern.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The request could not be completed (connection, DNS, timeout).
	/// Local state is unaffected and the call may be retried, but retries
	/// are not idempotent server-side for create operations.
	#[error("transport: {0}")]
	Transport(#[from] reqwest::Error),

	/// The transaction endpoint rejected the whole batch.
	#[error("transaction failed with status {status}: {body}")]
	TransactionFailed {
		status: StatusCode,
		body: String,
	},

	/// A non-transaction endpoint responded with a non-success status.
	#[error("request failed with status {status}: {body}")]
	Api {
		status: StatusCode,
		body: String,
	},

	/// Success status, but the response body does not match the expected
	/// shape. Distinct from [`Error::Api`] so callers can tell protocol
	/// drift apart from business-logic rejection.
	#[error("malformed response: {0}")]
	MalformedResponse(#[source] serde_json::Error),

	/// An operation that requires stored credentials was called on a
	/// client that holds none.
	#[error("not authenticated")]
	NotAuthenticated,
}
