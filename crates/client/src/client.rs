// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::{RequestBuilder, Response, header};

use crate::{Error, RecordApi, Tokens, TransactionBatch};

/// Client for a single RecordBase instance.
///
/// Cloning is cheap and clones share the same token state: a login performed
/// through one clone is visible to all of them.
#[derive(Clone)]
pub struct Client {
	pub(crate) http: reqwest::Client,
	site: String,
	pub(crate) tokens: Arc<RwLock<Option<Tokens>>>,
}

impl Client {
	/// Create a new client for the given site URL, optionally resuming an
	/// earlier session from stored tokens.
	///
	/// # Example
	/// ```no_run
	/// use recordbase_client::Client;
	///
	/// let client = Client::new("http://localhost:4000", None).unwrap();
	/// ```
	pub fn new(site: &str, tokens: Option<Tokens>) -> Result<Self, Error> {
		let http = reqwest::Client::builder().build()?;

		Ok(Self {
			http,
			site: site.trim_end_matches('/').to_string(),
			tokens: Arc::new(RwLock::new(tokens)),
		})
	}

	/// The site URL this client talks to, without a trailing slash.
	pub fn site(&self) -> &str {
		&self.site
	}

	/// Obtain a handle for the record API with the given name.
	pub fn records(&self, name: &str) -> RecordApi {
		RecordApi::new(self.clone(), name)
	}

	/// Start a new, empty transaction batch.
	///
	/// Operations appended through the batch stay local until
	/// [`TransactionBatch::send`] submits them in one request.
	pub fn transaction(&self) -> TransactionBatch {
		TransactionBatch::new(self.clone())
	}

	pub(crate) fn url(&self, path: &str) -> String {
		format!("{}{}", self.site, path)
	}

	/// Send a request with the current authorization attached, surfacing
	/// only transport failures. Status handling is left to the caller.
	pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Response, Error> {
		let request = match self.bearer() {
			Some(value) => request.header(header::AUTHORIZATION, value),
			None => request,
		};

		Ok(request.send().await?)
	}

	/// Send a request and fail with [`Error::Api`] on non-success status.
	pub(crate) async fn execute_checked(&self, request: RequestBuilder) -> Result<Response, Error> {
		let response = self.execute(request).await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			tracing::debug!(%status, "request rejected");
			return Err(Error::Api {
				status,
				body,
			});
		}

		Ok(response)
	}

	fn bearer(&self) -> Option<String> {
		self.tokens.read().as_ref().map(|tokens| format!("Bearer {}", tokens.auth_token))
	}
}
