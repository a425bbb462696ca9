// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! CRUD, bulk and listing operations against a single record API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Client, Error, Filter};

pub(crate) const RECORD_API: &str = "/api/records/v1";

/// Handle for one named record API.
///
/// Obtained from [`Client::records`]; cheap to clone and to recreate.
#[derive(Clone)]
pub struct RecordApi {
	pub(crate) client: Client,
	pub(crate) name: String,
}

/// Response body for a single-record create.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
	pub id: String,
}

/// Response body for a bulk create.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBulkResponse {
	pub ids: Vec<String>,
}

/// Response body for a list request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
	/// Cursor for fetching the next page, when the page was not the last.
	#[serde(default)]
	pub cursor: Option<String>,
	/// Total number of matching records; only present when the request
	/// asked for a count.
	#[serde(default)]
	pub total_count: Option<i64>,
	pub records: Vec<Value>,
}

/// Arguments for [`RecordApi::list`].
#[derive(Debug, Default, Clone)]
pub struct ListArguments {
	filters: Vec<Filter>,
	order: Vec<String>,
	limit: Option<usize>,
	offset: Option<usize>,
	cursor: Option<String>,
	count: bool,
	expand: Vec<String>,
}

impl ListArguments {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn filter(mut self, filter: Filter) -> Self {
		self.filters.push(filter);
		self
	}

	/// Add an ordering column, prefixed with `+` (ascending) or `-`
	/// (descending). A bare column name sorts ascending.
	pub fn order(mut self, column: &str) -> Self {
		self.order.push(column.to_string());
		self
	}

	pub fn limit(mut self, limit: usize) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn offset(mut self, offset: usize) -> Self {
		self.offset = Some(offset);
		self
	}

	pub fn cursor(mut self, cursor: &str) -> Self {
		self.cursor = Some(cursor.to_string());
		self
	}

	/// Ask the server to include `total_count` in the response.
	pub fn count(mut self) -> Self {
		self.count = true;
		self
	}

	pub fn expand(mut self, column: &str) -> Self {
		self.expand.push(column.to_string());
		self
	}

	fn to_query_pairs(&self) -> Vec<(String, String)> {
		let mut pairs = Vec::new();

		if let Some(limit) = self.limit {
			pairs.push(("limit".to_string(), limit.to_string()));
		}
		if let Some(offset) = self.offset {
			pairs.push(("offset".to_string(), offset.to_string()));
		}
		if let Some(cursor) = &self.cursor {
			pairs.push(("cursor".to_string(), cursor.clone()));
		}
		if self.count {
			pairs.push(("count".to_string(), "true".to_string()));
		}
		if !self.order.is_empty() {
			pairs.push(("order".to_string(), self.order.join(",")));
		}
		if !self.expand.is_empty() {
			pairs.push(("expand".to_string(), self.expand.join(",")));
		}
		for filter in &self.filters {
			pairs.push(filter.to_query_pair());
		}

		pairs
	}
}

impl RecordApi {
	pub(crate) fn new(client: Client, name: &str) -> Self {
		Self {
			client,
			name: name.to_string(),
		}
	}

	/// The record API name this handle is bound to.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Create one record, returning its assigned id.
	pub async fn create(&self, record: &Value) -> Result<String, Error> {
		let response = self
			.client
			.execute_checked(self.client.http.post(self.url("")).json(record))
			.await?;

		let parsed: CreateResponse = parse_body(response).await?;
		Ok(parsed.id)
	}

	/// Create several records in one atomic request, returning their
	/// assigned ids in input order.
	pub async fn create_bulk(&self, records: &[Value]) -> Result<Vec<String>, Error> {
		let response = self
			.client
			.execute_checked(self.client.http.post(self.url("")).json(records))
			.await?;

		let parsed: CreateBulkResponse = parse_body(response).await?;
		Ok(parsed.ids)
	}

	/// Read one record by id.
	pub async fn read(&self, id: &str) -> Result<Value, Error> {
		self.read_expanded(id, &[]).await
	}

	/// Read one record by id, expanding the given foreign-key columns
	/// into `{"id": .., "data": ..}` objects.
	pub async fn read_expanded(&self, id: &str, expand: &[&str]) -> Result<Value, Error> {
		let mut request = self.client.http.get(self.url(&format!("/{id}")));
		if !expand.is_empty() {
			request = request.query(&[("expand", expand.join(","))]);
		}

		let response = self.client.execute_checked(request).await?;
		parse_body(response).await
	}

	/// Patch one record by id. Absent columns keep their value.
	pub async fn update(&self, id: &str, record: &Value) -> Result<(), Error> {
		self.client
			.execute_checked(self.client.http.patch(self.url(&format!("/{id}"))).json(record))
			.await?;

		Ok(())
	}

	/// Delete one record by id.
	pub async fn delete(&self, id: &str) -> Result<(), Error> {
		self.client.execute_checked(self.client.http.delete(self.url(&format!("/{id}")))).await?;

		Ok(())
	}

	/// List records matching the given filters, order and pagination.
	pub async fn list(&self, args: ListArguments) -> Result<ListResponse, Error> {
		let request = self.client.http.get(self.url("")).query(&args.to_query_pairs());

		let response = self.client.execute_checked(request).await?;
		parse_body(response).await
	}

	fn url(&self, suffix: &str) -> String {
		self.client.url(&format!("{RECORD_API}/{}{}", self.name, suffix))
	}
}

async fn parse_body<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
	let body = response.text().await?;
	serde_json::from_str(&body).map_err(Error::MalformedResponse)
}
