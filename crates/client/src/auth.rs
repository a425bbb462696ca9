// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

//! Login, logout, token refresh and local claim inspection.
//!
//! The client stores the token pair returned by the server and attaches the
//! auth token as a bearer credential to every request. Refresh is explicit:
//! nothing here re-authenticates behind the caller's back.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Client, Error};

const AUTH_API: &str = "/api/auth/v1";

/// Token pair issued by the server on login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
	pub auth_token: String,
	pub refresh_token: Option<String>,
	pub csrf_token: Option<String>,
}

impl Tokens {
	/// Whether the auth token's `exp` claim, when present and decodable,
	/// still lies in the future.
	pub fn valid(&self) -> bool {
		match decode_claims(&self.auth_token) {
			Some(claims) => claims.exp.is_none_or(|exp| exp > unix_now()),
			None => false,
		}
	}
}

/// User identity decoded from the auth token claims.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
	pub id: String,
	pub email: String,
}

/// Request body for `/api/auth/v1/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

/// Response body for `/api/auth/v1/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
	pub auth_token: String,
	pub refresh_token: Option<String>,
	pub csrf_token: Option<String>,
}

/// Request body for `/api/auth/v1/refresh`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
	pub refresh_token: String,
}

/// Response body for `/api/auth/v1/refresh`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
	pub auth_token: String,
	pub csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
	sub: String,
	email: String,
	#[serde(default)]
	exp: Option<i64>,
}

impl Client {
	/// Authenticate with email and password, storing the returned tokens.
	pub async fn login(&self, email: &str, password: &str) -> Result<(), Error> {
		let request = LoginRequest {
			email: email.to_string(),
			password: password.to_string(),
		};

		let response = self
			.execute_checked(self.http.post(self.url(&format!("{AUTH_API}/login"))).json(&request))
			.await?;

		let body = response.text().await?;
		let parsed: LoginResponse = serde_json::from_str(&body).map_err(Error::MalformedResponse)?;

		tracing::debug!(email, "logged in");
		*self.tokens.write() = Some(Tokens {
			auth_token: parsed.auth_token,
			refresh_token: parsed.refresh_token,
			csrf_token: parsed.csrf_token,
		});

		Ok(())
	}

	/// End the session server-side and drop the stored tokens.
	///
	/// Tokens are cleared locally even when the server cannot be reached.
	pub async fn logout(&self) -> Result<(), Error> {
		let result = self.execute(self.http.post(self.url(&format!("{AUTH_API}/logout")))).await;
		*self.tokens.write() = None;

		result.map(|_| ())
	}

	/// Exchange the stored refresh token for a fresh auth token.
	pub async fn refresh(&self) -> Result<(), Error> {
		let refresh_token = {
			let tokens = self.tokens.read();
			tokens.as_ref().and_then(|t| t.refresh_token.clone()).ok_or(Error::NotAuthenticated)?
		};

		let request = RefreshRequest {
			refresh_token,
		};

		let response = self
			.execute_checked(self.http.post(self.url(&format!("{AUTH_API}/refresh"))).json(&request))
			.await?;

		let body = response.text().await?;
		let parsed: RefreshResponse = serde_json::from_str(&body).map_err(Error::MalformedResponse)?;

		let mut tokens = self.tokens.write();
		if let Some(tokens) = tokens.as_mut() {
			tokens.auth_token = parsed.auth_token;
			tokens.csrf_token = parsed.csrf_token;
		}

		Ok(())
	}

	/// Snapshot of the currently stored tokens, `None` when logged out.
	pub fn tokens(&self) -> Option<Tokens> {
		self.tokens.read().clone()
	}

	/// The authenticated user, decoded locally from the auth token claims.
	pub fn user(&self) -> Option<User> {
		let tokens = self.tokens.read();
		let claims = decode_claims(&tokens.as_ref()?.auth_token)?;

		Some(User {
			id: claims.sub,
			email: claims.email,
		})
	}
}

/// Decode the claims segment of a JWT without verifying the signature.
/// Verification is the server's job; the client only inspects identity.
fn decode_claims(token: &str) -> Option<Claims> {
	let payload = token.split('.').nth(1)?;
	let bytes = BASE64_URL_SAFE_NO_PAD.decode(payload).ok()?;
	serde_json::from_slice(&bytes).ok()
}

fn unix_now() -> i64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}
