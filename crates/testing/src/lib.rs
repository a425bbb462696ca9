// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! In-process RecordBase server emulation.
//!
//! Implements the record, auth, subscription and transaction endpoints of a
//! RecordBase instance against an in-memory store, so client tests can run
//! end-to-end without an external server process. Not a production server:
//! signatures are not verified, the `re` filter operator is rejected, and
//! everything lives in one process.

mod config;
mod error;
mod handlers;
mod server;
mod store;
mod token;

pub use config::{ApiConfig, TestServerConfig, UserConfig};
pub use server::TestServer;
