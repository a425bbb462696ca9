// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

use std::collections::HashMap;

/// Schema of one record API exposed by the test server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
	pub(crate) name: String,
	/// Columns that must be present on create (single, bulk and
	/// transactional).
	pub(crate) required: Vec<String>,
	/// Foreign-key columns eligible for expansion: column name to the
	/// target record API.
	pub(crate) foreign_keys: HashMap<String, String>,
}

impl ApiConfig {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			required: Vec::new(),
			foreign_keys: HashMap::new(),
		}
	}

	pub fn required(mut self, column: &str) -> Self {
		self.required.push(column.to_string());
		self
	}

	pub fn foreign_key(mut self, column: &str, target_api: &str) -> Self {
		self.foreign_keys.insert(column.to_string(), target_api.to_string());
		self
	}
}

/// A login accepted by the test server.
#[derive(Debug, Clone)]
pub struct UserConfig {
	pub(crate) email: String,
	pub(crate) password: String,
}

/// Configuration for [`crate::TestServer::spawn`].
#[derive(Debug, Clone, Default)]
pub struct TestServerConfig {
	pub(crate) users: Vec<UserConfig>,
	pub(crate) apis: Vec<ApiConfig>,
}

impl TestServerConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn user(mut self, email: &str, password: &str) -> Self {
		self.users.push(UserConfig {
			email: email.to_string(),
			password: password.to_string(),
		});
		self
	}

	pub fn api(mut self, api: ApiConfig) -> Self {
		self.apis.push(api);
		self
	}
}
