// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! Transaction batching.
//!
//! A [`TransactionBatch`] accumulates an ordered sequence of tagged write
//! operations across any number of record APIs, then submits them to the
//! server in a single request that is applied atomically. Builders hand out
//! by [`TransactionBatch::collection`] only append; nothing is validated,
//! reordered or removed client-side, and the batch performs no I/O until
//! [`TransactionBatch::send`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Client, Error};

const TRANSACTION_API: &str = "/api/transactions/v1";

/// One tagged write operation inside a transaction.
///
/// The wire encoding is an object with a single key naming the variant.
/// `Update` identifies its target with `Id`, `Delete` with `RecordId`; the
/// asymmetry is part of the server's wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
	Create {
		#[serde(rename = "ApiName")]
		api_name: String,
		#[serde(rename = "Record")]
		record: Value,
	},
	Update {
		#[serde(rename = "ApiName")]
		api_name: String,
		#[serde(rename = "Id")]
		id: String,
		#[serde(rename = "Record")]
		record: Value,
	},
	Delete {
		#[serde(rename = "ApiName")]
		api_name: String,
		#[serde(rename = "RecordId")]
		record_id: String,
	},
}

/// Request body for `/api/transactions/v1/execute`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRequest {
	#[serde(rename = "Operations")]
	pub operations: Vec<Operation>,
}

/// Response body for `/api/transactions/v1/execute`.
///
/// `Ids` lists the ids assigned to the request's `Create` operations, in
/// the order those operations appeared. A missing key decodes as empty.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
	#[serde(rename = "Ids", default)]
	pub ids: Vec<String>,
}

/// An ordered accumulator of write operations, submitted as one atomic
/// unit.
///
/// Append order is meaningful: it is preserved verbatim into the wire
/// request and determines the order of returned ids for creates. A batch
/// that is never sent has no observable effect.
///
/// ```no_run
/// # async fn example(client: recordbase_client::Client) -> Result<(), recordbase_client::Error> {
/// let mut batch = client.transaction();
/// batch.collection("movies")
/// 	.create(serde_json::json!({"title": "Stalker"}))
/// 	.collection("reviews")
/// 	.delete("review-17");
/// let ids = batch.send().await?;
/// # Ok(())
/// # }
/// ```
pub struct TransactionBatch {
	client: Client,
	operations: Vec<Operation>,
}

impl TransactionBatch {
	pub(crate) fn new(client: Client) -> Self {
		Self {
			client,
			operations: Vec::new(),
		}
	}

	/// Obtain a builder scoped to one record API.
	///
	/// Builders are stateless views: calling this twice with the same
	/// name yields handles that append into the same underlying sequence.
	pub fn collection(&mut self, name: &str) -> CollectionBatch<'_> {
		CollectionBatch {
			batch: self,
			api_name: name.to_string(),
		}
	}

	/// The operations accumulated so far, in append order.
	pub fn operations(&self) -> &[Operation] {
		&self.operations
	}

	/// Submit the accumulated sequence in one request.
	///
	/// On success, returns the ids assigned to the `Create` operations in
	/// append order. On any failure the local sequence is unchanged and
	/// `send` may be called again, re-submitting the identical batch;
	/// a retried send is not idempotent server-side for creates.
	pub async fn send(&self) -> Result<Vec<String>, Error> {
		let request = TransactionRequest {
			operations: self.operations.clone(),
		};

		tracing::debug!(operations = request.operations.len(), "submitting transaction");

		let response = self
			.client
			.execute(
				self.client
					.http
					.post(self.client.url(&format!("{TRANSACTION_API}/execute")))
					.json(&request),
			)
			.await?;

		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			return Err(Error::TransactionFailed {
				status,
				body,
			});
		}

		let parsed: TransactionResponse =
			serde_json::from_str(&body).map_err(Error::MalformedResponse)?;

		Ok(parsed.ids)
	}

	fn push(&mut self, operation: Operation) {
		self.operations.push(operation);
	}
}

/// Builder producing tagged operations for one record API.
///
/// Holds nothing beyond the owning batch and the API name. Every method
/// appends to the batch and returns it, so chains can hop between
/// collections without re-fetching the batch.
pub struct CollectionBatch<'a> {
	batch: &'a mut TransactionBatch,
	api_name: String,
}

impl CollectionBatch<'_> {
	/// Append a create operation. The record passes through untouched.
	pub fn create(&mut self, record: Value) -> &mut TransactionBatch {
		self.batch.push(Operation::Create {
			api_name: self.api_name.clone(),
			record,
		});
		self.batch
	}

	/// Append an update operation for an existing record id. No existence
	/// check happens client-side.
	pub fn update(&mut self, id: &str, record: Value) -> &mut TransactionBatch {
		self.batch.push(Operation::Update {
			api_name: self.api_name.clone(),
			id: id.to_string(),
			record,
		});
		self.batch
	}

	/// Append a delete operation for an existing record id.
	pub fn delete(&mut self, id: &str) -> &mut TransactionBatch {
		self.batch.push(Operation::Delete {
			api_name: self.api_name.clone(),
			record_id: id.to_string(),
		});
		self.batch
	}
}
