// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

mod common;

use recordbase_client::{Error, ListArguments};
use serde_json::json;

#[tokio::test]
async fn test_transaction_round_trip() {
	let (_server, client) = common::connect().await;

	let mut batch = client.transaction();
	batch.collection("movies").create(json!({"title": "transactional"}));

	let ids = batch.send().await.expect("send");
	assert_eq!(ids.len(), 1);

	let record = client.records("movies").read(&ids[0]).await.expect("read");
	assert_eq!(record["title"], json!("transactional"));
}

#[tokio::test]
async fn test_create_ids_follow_append_order() {
	let (_server, client) = common::connect().await;

	let mut batch = client.transaction();
	batch.collection("movies")
		.create(json!({"title": "first"}))
		.collection("users")
		.create(json!({"name": "second"}))
		.collection("movies")
		.create(json!({"title": "third"}));

	let ids = batch.send().await.expect("send");
	assert_eq!(ids.len(), 3);

	let first = client.records("movies").read(&ids[0]).await.expect("read");
	let second = client.records("users").read(&ids[1]).await.expect("read");
	let third = client.records("movies").read(&ids[2]).await.expect("read");
	assert_eq!(first["title"], json!("first"));
	assert_eq!(second["name"], json!("second"));
	assert_eq!(third["title"], json!("third"));
}

#[tokio::test]
async fn test_mixed_operations_apply_atomically() {
	let (_server, client) = common::connect().await;
	let movies = client.records("movies");

	let keep = movies.create(&json!({"title": "keep", "rank": 1})).await.expect("create");
	let drop = movies.create(&json!({"title": "drop"})).await.expect("create");

	let mut batch = client.transaction();
	batch.collection("movies")
		.update(&keep, json!({"rank": 2}))
		.collection("movies")
		.delete(&drop)
		.collection("movies")
		.create(json!({"title": "added"}));

	let ids = batch.send().await.expect("send");
	assert_eq!(ids.len(), 1);

	assert_eq!(movies.read(&keep).await.expect("read")["rank"], json!(2));
	assert!(movies.read(&drop).await.is_err());
	assert_eq!(movies.read(&ids[0]).await.expect("read")["title"], json!("added"));
}

#[tokio::test]
async fn test_rejected_batch_applies_nothing() {
	let (_server, client) = common::connect().await;
	let movies = client.records("movies");

	let mut batch = client.transaction();
	batch.collection("movies")
		.create(json!({"title": "phantom"}))
		.collection("movies")
		.update("no-such-id", json!({"title": "x"}));

	match batch.send().await {
		Err(Error::TransactionFailed {
			status,
			body,
		}) => {
			assert_eq!(status.as_u16(), 404);
			assert!(body.contains("no-such-id"));
		}
		other => panic!("expected TransactionFailed, got {other:?}"),
	}

	// The create in front of the failing update did not land.
	let listed = movies.list(ListArguments::new().count()).await.expect("list");
	assert_eq!(listed.total_count, Some(0));
}

#[tokio::test]
async fn test_failed_send_leaves_batch_intact_for_retry() {
	let (_server, client) = common::connect_anonymous().await;

	// Build the batch before authenticating; the first send is rejected
	// by the server as a whole.
	let mut batch = client.transaction();
	batch.collection("movies")
		.create(json!({"title": "retried 0"}))
		.collection("movies")
		.create(json!({"title": "retried 1"}));

	match batch.send().await {
		Err(Error::TransactionFailed {
			status, ..
		}) => assert_eq!(status.as_u16(), 401),
		other => panic!("expected TransactionFailed, got {other:?}"),
	}
	assert_eq!(batch.operations().len(), 2);

	// A second send after login re-submits the identical, full sequence.
	client.login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD).await.expect("login");
	let ids = batch.send().await.expect("retry send");
	assert_eq!(ids.len(), 2);

	let movies = client.records("movies");
	assert_eq!(movies.read(&ids[0]).await.expect("read")["title"], json!("retried 0"));
	assert_eq!(movies.read(&ids[1]).await.expect("read")["title"], json!("retried 1"));
}

#[tokio::test]
async fn test_empty_batch_returns_no_ids() {
	let (_server, client) = common::connect().await;

	let batch = client.transaction();
	let ids = batch.send().await.expect("send");
	assert!(ids.is_empty());
}

#[tokio::test]
async fn test_unknown_collection_fails_the_whole_batch() {
	let (_server, client) = common::connect().await;

	let mut batch = client.transaction();
	batch.collection("nonexistent").create(json!({"title": "x"}));

	assert!(matches!(batch.send().await, Err(Error::TransactionFailed { .. })));
}
