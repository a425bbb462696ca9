// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

mod common;

use recordbase_client::{Client, Error};

#[tokio::test]
async fn test_login_stores_tokens_and_identity() {
	let (_server, client) = common::connect().await;

	let tokens = client.tokens().expect("tokens stored after login");
	assert!(tokens.valid());
	assert!(tokens.refresh_token.is_some());

	let user = client.user().expect("user decodable from auth token");
	assert_eq!(user.email, common::ADMIN_EMAIL);
	assert!(!user.id.is_empty());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
	let (_server, client) = common::connect_anonymous().await;

	let result = client.login(common::ADMIN_EMAIL, "wrong").await;
	match result {
		Err(Error::Api {
			status, ..
		}) => assert_eq!(status.as_u16(), 401),
		other => panic!("expected Api error, got {other:?}"),
	}
	assert!(client.tokens().is_none());
}

#[tokio::test]
async fn test_requests_without_login_are_rejected() {
	let (_server, client) = common::connect_anonymous().await;

	let result = client.records("movies").read("someid").await;
	match result {
		Err(Error::Api {
			status, ..
		}) => assert_eq!(status.as_u16(), 401),
		other => panic!("expected Api error, got {other:?}"),
	}
}

#[tokio::test]
async fn test_logout_clears_tokens_and_revokes() {
	let (_server, client) = common::connect().await;

	client.logout().await.expect("logout failed");
	assert!(client.tokens().is_none());
	assert!(client.user().is_none());

	let result = client.records("movies").list(Default::default()).await;
	assert!(matches!(result, Err(Error::Api { .. })));
}

#[tokio::test]
async fn test_refresh_replaces_auth_token() {
	let (_server, client) = common::connect().await;

	let before = client.tokens().expect("tokens after login");
	client.refresh().await.expect("refresh failed");
	let after = client.tokens().expect("tokens after refresh");

	assert_ne!(before.auth_token, after.auth_token);
	assert_eq!(before.refresh_token, after.refresh_token);

	// The refreshed token is usable.
	client.records("movies").list(Default::default()).await.expect("list after refresh");
}

#[tokio::test]
async fn test_refresh_without_login_fails() {
	let (_server, client) = common::connect_anonymous().await;

	assert!(matches!(client.refresh().await, Err(Error::NotAuthenticated)));
}

#[tokio::test]
async fn test_clients_share_login_state() {
	let (server, client) = common::connect().await;

	// A clone made before logout observes the cleared session.
	let clone = client.clone();
	client.logout().await.expect("logout failed");
	assert!(clone.tokens().is_none());

	// An independent client with resumed tokens works without login.
	let (_server2, original) = common::connect().await;
	let resumed = Client::new(&server.site(), original.tokens()).expect("client");
	// Tokens from another server are unknown here and get rejected.
	assert!(matches!(
		resumed.records("movies").list(Default::default()).await,
		Err(Error::Api { .. })
	));
}
