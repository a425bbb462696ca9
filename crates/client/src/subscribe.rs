// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! Change-stream subscriptions.
//!
//! A subscription is a long-lived GET request carrying server-sent events.
//! A background task reads the byte stream, frames events and forwards the
//! decoded payloads over a channel; the [`Subscription`] handle is the
//! receiving end.

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{Error, RecordApi, record::RECORD_API};

/// One change event on a record API.
///
/// Wire encoding is externally tagged: `{"Insert": <record>}` and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordEvent {
	/// A record was created; carries the new record.
	Insert(Value),
	/// A record was updated; carries the record after the update.
	Update(Value),
	/// A record was deleted; carries the record's last value.
	Delete(Value),
	/// The server reported a stream-level error.
	Error(String),
}

/// Receiving end of a change stream.
///
/// Dropping the subscription (or calling [`Subscription::close`]) stops the
/// background reader and closes the underlying request.
pub struct Subscription {
	event_rx: mpsc::Receiver<RecordEvent>,
	reader: JoinHandle<()>,
}

impl Subscription {
	/// Receive the next event, waiting if necessary.
	///
	/// Returns `None` once the stream has ended.
	pub async fn recv(&mut self) -> Option<RecordEvent> {
		self.event_rx.recv().await
	}

	/// Receive an already-buffered event without waiting.
	pub fn try_recv(&mut self) -> Result<RecordEvent, mpsc::error::TryRecvError> {
		self.event_rx.try_recv()
	}

	/// Close the subscription.
	pub fn close(self) {
		self.reader.abort();
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.reader.abort();
	}
}

impl RecordApi {
	/// Subscribe to changes for one record id, or for the whole API with
	/// `"*"`.
	pub async fn subscribe(&self, target: &str) -> Result<Subscription, Error> {
		let url = self.client.url(&format!("{RECORD_API}/{}/subscribe/{}", self.name, target));
		let response = self.client.execute_checked(self.client.http.get(&url)).await?;

		tracing::debug!(api = %self.name, record = target, "subscription opened");

		let (event_tx, event_rx) = mpsc::channel(100);
		let reader = tokio::spawn(async move {
			let mut stream = response.bytes_stream();
			let mut framing = SseFraming::new();

			while let Some(chunk) = stream.next().await {
				let Ok(chunk) = chunk else {
					break;
				};

				for data in framing.push(&chunk) {
					match serde_json::from_str::<RecordEvent>(&data) {
						Ok(event) => {
							if event_tx.send(event).await.is_err() {
								return;
							}
						}
						Err(err) => {
							tracing::warn!(%err, "skipping undecodable event")
						}
					}
				}
			}
		});

		Ok(Subscription {
			event_rx,
			reader,
		})
	}
}

/// Incremental framer for a server-sent-event byte stream.
///
/// Events are delimited by a blank line; only `data:` fields are kept and
/// multi-line data is joined with `\n` per the SSE wire format. Comments and
/// other fields (keep-alives, ids) are dropped.
struct SseFraming {
	buffer: Vec<u8>,
}

impl SseFraming {
	fn new() -> Self {
		Self {
			buffer: Vec::new(),
		}
	}

	/// Feed one chunk, returning the data payloads of every event that
	/// became complete.
	fn push(&mut self, chunk: &[u8]) -> Vec<String> {
		self.buffer.extend_from_slice(chunk);

		let mut events = Vec::new();
		while let Some(end) = find_event_end(&self.buffer) {
			let block: Vec<u8> = self.buffer.drain(..end).collect();
			if let Some(data) = event_data(&block) {
				events.push(data);
			}
		}

		events
	}
}

/// Position just past the first blank line, if a complete event is buffered.
fn find_event_end(buffer: &[u8]) -> Option<usize> {
	buffer.windows(2).position(|window| window == b"\n\n").map(|pos| pos + 2)
}

fn event_data(block: &[u8]) -> Option<String> {
	let text = String::from_utf8_lossy(block);

	let mut data = String::new();
	for line in text.lines() {
		let line = line.trim_end_matches('\r');
		if let Some(rest) = line.strip_prefix("data:") {
			if !data.is_empty() {
				data.push('\n');
			}
			data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
		}
	}

	(!data.is_empty()).then_some(data)
}
