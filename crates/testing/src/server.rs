// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

use std::{
	collections::{HashMap, HashSet},
	net::SocketAddr,
	sync::Arc,
};

use axum::{
	Router,
	routing::{get, post},
};
use parking_lot::RwLock;
use recordbase_client::RecordEvent;
use tokio::{net::TcpListener, sync::broadcast, task::JoinHandle};

use crate::{
	config::TestServerConfig,
	handlers,
	store::{Change, RecordStore},
};

/// Issued credentials. Tokens are tracked by value; the refresh map keeps
/// the `(sub, email)` pair a refresh token was minted for.
#[derive(Default)]
pub(crate) struct Sessions {
	pub auth: HashSet<String>,
	pub refresh: HashMap<String, (String, String)>,
}

pub(crate) struct ServerState {
	pub config: TestServerConfig,
	pub store: RwLock<RecordStore>,
	pub sessions: RwLock<Sessions>,
	pub channels: RwLock<HashMap<String, broadcast::Sender<(String, RecordEvent)>>>,
}

impl ServerState {
	/// Receiver of `(record id, event)` pairs for one record API.
	pub(crate) fn subscribe_channel(
		&self,
		api: &str,
	) -> broadcast::Receiver<(String, RecordEvent)> {
		let mut channels = self.channels.write();
		channels
			.entry(api.to_string())
			.or_insert_with(|| broadcast::channel(256).0)
			.subscribe()
	}

	/// Publish changes to subscribers. Called after the store lock drops.
	pub(crate) fn publish(&self, changes: Vec<Change>) {
		let channels = self.channels.read();
		for change in changes {
			if let Some(sender) = channels.get(&change.api) {
				let _ = sender.send((change.id, change.event));
			}
		}
	}
}

/// An in-process server bound to an ephemeral local port.
pub struct TestServer {
	addr: SocketAddr,
	server: JoinHandle<()>,
}

impl TestServer {
	/// Bind an ephemeral port and serve the configured instance on it.
	/// The listener is bound before this returns, so the server is
	/// immediately connectable.
	pub async fn spawn(config: TestServerConfig) -> std::io::Result<Self> {
		let state = Arc::new(ServerState {
			store: RwLock::new(RecordStore::new(config.apis.clone())),
			config,
			sessions: RwLock::new(Sessions::default()),
			channels: RwLock::new(HashMap::new()),
		});

		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		tracing::debug!(%addr, "test server listening");

		let app = router(state);
		let server = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, app).await {
				tracing::warn!(%err, "test server stopped");
			}
		});

		Ok(Self {
			addr,
			server,
		})
	}

	pub fn addr(&self) -> SocketAddr {
		self.addr
	}

	/// Site URL clients should connect to.
	pub fn site(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn stop(self) {
		self.server.abort();
	}
}

impl Drop for TestServer {
	fn drop(&mut self) {
		self.server.abort();
	}
}

fn router(state: Arc<ServerState>) -> Router {
	Router::new()
		.route("/api/healthcheck", get(handlers::healthcheck))
		.route("/api/auth/v1/login", post(handlers::login))
		.route("/api/auth/v1/logout", post(handlers::logout))
		.route("/api/auth/v1/refresh", post(handlers::refresh))
		.route(
			"/api/records/v1/{api}",
			get(handlers::list_records).post(handlers::create_records),
		)
		.route(
			"/api/records/v1/{api}/{id}",
			get(handlers::read_record)
				.patch(handlers::update_record)
				.delete(handlers::delete_record),
		)
		.route("/api/records/v1/{api}/subscribe/{target}", get(handlers::subscribe))
		.route("/api/transactions/v1/execute", post(handlers::execute_transaction))
		.with_state(state)
}
