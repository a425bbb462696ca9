// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! Endpoint handlers for the test server.
//!
//! - `/api/healthcheck`
//! - `/api/auth/v1/{login,logout,refresh}`
//! - `/api/records/v1/{api}` CRUD, listing and subscriptions
//! - `/api/transactions/v1/execute`

use std::{convert::Infallible, sync::Arc};

use axum::{
	Json,
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode, header},
	response::{
		IntoResponse, Response,
		sse::{Event, KeepAlive, Sse},
	},
};
use futures_util::{Stream, StreamExt};
use recordbase_client::{
	CreateBulkResponse, CreateResponse, ListResponse, LoginRequest, LoginResponse, RefreshRequest,
	RefreshResponse, TransactionRequest, TransactionResponse,
};
use serde_json::Value;
use tokio_stream::wrappers::BroadcastStream;

use crate::{error::AppError, server::ServerState, store::ListQuery, token::mint_token};

const TOKEN_TTL_SECS: i64 = 3600;

pub(crate) async fn healthcheck() -> &'static str {
	"Ok"
}

pub(crate) async fn login(
	State(state): State<Arc<ServerState>>,
	Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
	let user_index = state
		.config
		.users
		.iter()
		.position(|user| user.email == request.email && user.password == request.password)
		.ok_or(AppError::Unauthorized("unknown user or wrong password"))?;

	let sub = format!("usr_{user_index:04}");
	let auth_token = mint_token(&sub, &request.email, TOKEN_TTL_SECS);
	let refresh_token = mint_token(&sub, &request.email, TOKEN_TTL_SECS * 24);

	{
		let mut sessions = state.sessions.write();
		sessions.auth.insert(auth_token.clone());
		sessions.refresh.insert(refresh_token.clone(), (sub, request.email.clone()));
	}

	Ok(Json(LoginResponse {
		auth_token,
		refresh_token: Some(refresh_token),
		csrf_token: Some("csrf-test".to_string()),
	}))
}

pub(crate) async fn logout(
	State(state): State<Arc<ServerState>>,
	headers: HeaderMap,
) -> StatusCode {
	if let Some(token) = bearer(&headers) {
		state.sessions.write().auth.remove(token);
	}
	StatusCode::OK
}

pub(crate) async fn refresh(
	State(state): State<Arc<ServerState>>,
	Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
	let mut sessions = state.sessions.write();
	let (sub, email) = sessions
		.refresh
		.get(&request.refresh_token)
		.cloned()
		.ok_or(AppError::Unauthorized("unknown refresh token"))?;

	let auth_token = mint_token(&sub, &email, TOKEN_TTL_SECS);
	sessions.auth.insert(auth_token.clone());

	Ok(Json(RefreshResponse {
		auth_token,
		csrf_token: Some("csrf-test".to_string()),
	}))
}

pub(crate) async fn create_records(
	State(state): State<Arc<ServerState>>,
	Path(api): Path<String>,
	headers: HeaderMap,
	Json(body): Json<Value>,
) -> Result<Response, AppError> {
	authorize(&state, &headers)?;

	let (response, changes) = {
		let mut store = state.store.write();
		match &body {
			Value::Array(records) => {
				let (ids, changes) = store.create_bulk(&api, records)?;
				(Json(CreateBulkResponse {
					ids,
				})
				.into_response(), changes)
			}
			record => {
				let (id, change) = store.create(&api, record)?;
				(Json(CreateResponse {
					id,
				})
				.into_response(), vec![change])
			}
		}
	};

	state.publish(changes);
	Ok(response)
}

pub(crate) async fn read_record(
	State(state): State<Arc<ServerState>>,
	Path((api, id)): Path<(String, String)>,
	Query(pairs): Query<Vec<(String, String)>>,
	headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
	authorize(&state, &headers)?;

	let expand = pairs
		.iter()
		.filter(|(key, _)| key == "expand")
		.flat_map(|(_, value)| value.split(','))
		.filter(|column| !column.is_empty())
		.map(String::from)
		.collect::<Vec<_>>();

	let record = state.store.read().read(&api, &id, &expand)?;
	Ok(Json(record))
}

pub(crate) async fn update_record(
	State(state): State<Arc<ServerState>>,
	Path((api, id)): Path<(String, String)>,
	headers: HeaderMap,
	Json(patch): Json<Value>,
) -> Result<StatusCode, AppError> {
	authorize(&state, &headers)?;

	let change = state.store.write().update(&api, &id, &patch)?;
	state.publish(vec![change]);
	Ok(StatusCode::OK)
}

pub(crate) async fn delete_record(
	State(state): State<Arc<ServerState>>,
	Path((api, id)): Path<(String, String)>,
	headers: HeaderMap,
) -> Result<StatusCode, AppError> {
	authorize(&state, &headers)?;

	let change = state.store.write().delete(&api, &id)?;
	state.publish(vec![change]);
	Ok(StatusCode::OK)
}

pub(crate) async fn list_records(
	State(state): State<Arc<ServerState>>,
	Path(api): Path<String>,
	Query(pairs): Query<Vec<(String, String)>>,
	headers: HeaderMap,
) -> Result<Json<ListResponse>, AppError> {
	authorize(&state, &headers)?;

	let query = ListQuery::from_pairs(&pairs).map_err(AppError::BadRequest)?;
	let result = state.store.read().list(&api, &query)?;

	Ok(Json(ListResponse {
		cursor: result.cursor,
		total_count: result.total_count,
		records: result.records,
	}))
}

pub(crate) async fn subscribe(
	State(state): State<Arc<ServerState>>,
	Path((api, target)): Path<(String, String)>,
	headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
	authorize(&state, &headers)?;
	state.store.read().api(&api)?;

	let receiver = state.subscribe_channel(&api);
	let stream = BroadcastStream::new(receiver).filter_map(move |item| {
		let event = match item {
			Ok(change) if target == "*" || change.0 == target => {
				Event::default().json_data(&change.1).ok()
			}
			_ => None,
		};
		std::future::ready(event.map(Ok))
	});

	Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

pub(crate) async fn execute_transaction(
	State(state): State<Arc<ServerState>>,
	headers: HeaderMap,
	Json(request): Json<TransactionRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
	authorize(&state, &headers)?;

	let (ids, changes) = state.store.write().execute(&request.operations)?;
	state.publish(changes);

	Ok(Json(TransactionResponse {
		ids,
	}))
}

fn authorize(state: &ServerState, headers: &HeaderMap) -> Result<(), AppError> {
	let token = bearer(headers).ok_or(AppError::Unauthorized("missing bearer token"))?;

	if !state.sessions.read().auth.contains(token) {
		return Err(AppError::Unauthorized("unknown or revoked token"));
	}
	Ok(())
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "))
}
