// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

use recordbase_client::Client;
use recordbase_testing::{ApiConfig, TestServer, TestServerConfig};

pub const ADMIN_EMAIL: &str = "admin@localhost";
pub const ADMIN_PASSWORD: &str = "secret";

/// Server schema shared by the tests: movies and users referenced by
/// reviews through expandable foreign keys.
pub fn config() -> TestServerConfig {
	TestServerConfig::new()
		.user(ADMIN_EMAIL, ADMIN_PASSWORD)
		.api(ApiConfig::new("movies").required("title"))
		.api(ApiConfig::new("users").required("name"))
		.api(ApiConfig::new("reviews")
			.required("body")
			.foreign_key("movie", "movies")
			.foreign_key("author", "users"))
}

/// Spawn a server and a logged-in client against it.
pub async fn connect() -> (TestServer, Client) {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();

	let server = TestServer::spawn(config()).await.expect("failed to spawn test server");
	let client = Client::new(&server.site(), None).expect("failed to build client");
	client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.expect("login failed");

	(server, client)
}

/// Spawn a server and a client that has not logged in.
#[allow(dead_code)]
pub async fn connect_anonymous() -> (TestServer, Client) {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();

	let server = TestServer::spawn(config()).await.expect("failed to spawn test server");
	let client = Client::new(&server.site(), None).expect("failed to build client");

	(server, client)
}
