// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! Rust client SDK for RecordBase.
//!
//! RecordBase exposes named record collections ("record APIs") over HTTP.
//! This crate is a typed façade over that interface: it authenticates,
//! performs CRUD and bulk operations, lists and filters records, expands
//! foreign-key relations, subscribes to change streams, and batches multiple
//! writes into a single atomic transaction request.
//!
//! ```no_run
//! use recordbase_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), recordbase_client::Error> {
//! 	let client = Client::new("http://localhost:4000", None)?;
//! 	client.login("admin@localhost", "secret").await?;
//!
//! 	let movies = client.records("movies");
//! 	let id = movies.create(&serde_json::json!({"title": "Arrival"})).await?;
//! 	let record = movies.read(&id).await?;
//! 	println!("{record}");
//! 	Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
mod filter;
mod record;
mod subscribe;
mod transaction;

pub use auth::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, Tokens, User};
pub use client::Client;
pub use error::Error;
pub use filter::{CompareOp, Filter};
pub use record::{
	CreateBulkResponse, CreateResponse, ListArguments, ListResponse, RecordApi,
};
pub use subscribe::{RecordEvent, Subscription};
pub use transaction::{
	CollectionBatch, Operation, TransactionBatch, TransactionRequest, TransactionResponse,
};
