// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

mod common;

use recordbase_client::{CompareOp, Error, Filter, ListArguments};
use serde_json::json;

#[tokio::test]
async fn test_create_read_update_delete() {
	let (_server, client) = common::connect().await;
	let movies = client.records("movies");

	let id = movies.create(&json!({"title": "Arrival", "rank": 4})).await.expect("create");
	assert!(!id.is_empty());

	let record = movies.read(&id).await.expect("read");
	assert_eq!(record["title"], json!("Arrival"));
	assert_eq!(record["rank"], json!(4));
	assert_eq!(record["id"], json!(id));

	movies.update(&id, &json!({"rank": 5})).await.expect("update");
	let record = movies.read(&id).await.expect("read after update");
	assert_eq!(record["title"], json!("Arrival"));
	assert_eq!(record["rank"], json!(5));

	movies.delete(&id).await.expect("delete");
	match movies.read(&id).await {
		Err(Error::Api {
			status, ..
		}) => assert_eq!(status.as_u16(), 404),
		other => panic!("expected 404, got {other:?}"),
	}
}

#[tokio::test]
async fn test_create_requires_configured_columns() {
	let (_server, client) = common::connect().await;

	let result = client.records("movies").create(&json!({"rank": 1})).await;
	match result {
		Err(Error::Api {
			status,
			body,
		}) => {
			assert_eq!(status.as_u16(), 400);
			assert!(body.contains("title"));
		}
		other => panic!("expected Api error, got {other:?}"),
	}
}

#[tokio::test]
async fn test_create_bulk_returns_ids_in_input_order() {
	let (_server, client) = common::connect().await;
	let movies = client.records("movies");

	let ids = movies
		.create_bulk(&[json!({"title": "bulk 0"}), json!({"title": "bulk 1"})])
		.await
		.expect("bulk create");
	assert_eq!(ids.len(), 2);

	let first = movies.read(&ids[0]).await.expect("read first");
	let second = movies.read(&ids[1]).await.expect("read second");
	assert_eq!(first["title"], json!("bulk 0"));
	assert_eq!(second["title"], json!("bulk 1"));
}

#[tokio::test]
async fn test_list_filters_order_and_count() {
	let (_server, client) = common::connect().await;
	let movies = client.records("movies");

	for (title, rank) in
		[("night train", 3), ("nightfall", 1), ("daybreak", 2), ("midnight", 4)]
	{
		movies.create(&json!({"title": title, "rank": rank})).await.expect("create");
	}

	// Equality filter.
	let exact = movies
		.list(ListArguments::new().filter(Filter::new("title", "daybreak")))
		.await
		.expect("list");
	assert_eq!(exact.records.len(), 1);
	assert_eq!(exact.records[0]["rank"], json!(2));

	// LIKE filter with ordering and count.
	let nights = movies
		.list(ListArguments::new()
			.filter(Filter::with_op("title", CompareOp::Like, "%night%"))
			.order("-rank")
			.count())
		.await
		.expect("list");
	assert_eq!(nights.total_count, Some(3));
	let titles: Vec<_> = nights.records.iter().map(|r| r["title"].clone()).collect();
	assert_eq!(titles, vec![json!("midnight"), json!("night train"), json!("nightfall")]);

	// Range filter.
	let top = movies
		.list(ListArguments::new()
			.filter(Filter::with_op("rank", CompareOp::GreaterThanEqual, 3))
			.order("+rank"))
		.await
		.expect("list");
	let ranks: Vec<_> = top.records.iter().map(|r| r["rank"].clone()).collect();
	assert_eq!(ranks, vec![json!(3), json!(4)]);
}

#[tokio::test]
async fn test_list_pagination() {
	let (_server, client) = common::connect().await;
	let movies = client.records("movies");

	for index in 0..5 {
		movies.create(&json!({"title": format!("movie {index}")})).await.expect("create");
	}

	let first_page = movies
		.list(ListArguments::new().order("+title").limit(2).count())
		.await
		.expect("list");
	assert_eq!(first_page.total_count, Some(5));
	assert_eq!(first_page.records.len(), 2);
	let cursor = first_page.cursor.expect("cursor on a non-final page");

	let second_page = movies
		.list(ListArguments::new().order("+title").limit(2).cursor(&cursor))
		.await
		.expect("list");
	assert_eq!(second_page.records.len(), 2);
	assert_eq!(second_page.records[0]["title"], json!("movie 2"));

	let offset_page = movies
		.list(ListArguments::new().order("+title").offset(4))
		.await
		.expect("list");
	assert_eq!(offset_page.records.len(), 1);
	assert_eq!(offset_page.records[0]["title"], json!("movie 4"));
	assert!(offset_page.cursor.is_none());
}

#[tokio::test]
async fn test_expand_foreign_records() {
	let (_server, client) = common::connect().await;

	let movie_id =
		client.records("movies").create(&json!({"title": "Stalker"})).await.expect("movie");
	let user_id =
		client.records("users").create(&json!({"name": "anna"})).await.expect("user");

	let reviews = client.records("reviews");
	let review_id = reviews
		.create(&json!({"body": "first review", "movie": movie_id, "author": user_id}))
		.await
		.expect("review");

	// Unexpanded read keeps the raw foreign id.
	let plain = reviews.read(&review_id).await.expect("read");
	assert_eq!(plain["movie"], json!(movie_id));

	// Expanded read nests the target record.
	let expanded =
		reviews.read_expanded(&review_id, &["movie", "author"]).await.expect("read");
	assert_eq!(expanded["movie"]["id"], json!(movie_id));
	assert_eq!(expanded["movie"]["data"]["title"], json!("Stalker"));
	assert_eq!(expanded["author"]["data"]["name"], json!("anna"));

	// Expansion also applies to listing.
	let listed = reviews
		.list(ListArguments::new().expand("movie"))
		.await
		.expect("list");
	assert_eq!(listed.records[0]["movie"]["data"]["title"], json!("Stalker"));

	// Columns without a configured foreign key are not expandable.
	assert!(matches!(
		reviews.read_expanded(&review_id, &["body"]).await,
		Err(Error::Api { .. })
	));
}
