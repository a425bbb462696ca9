// Copyright (c) recordbase.dev 2025
// This file is licensed under the MIT

use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use base64::prelude::*;
use serde_json::json;

/// Mint a JWT-shaped token. The signature segment is a fixed marker: the
/// test server tracks issued tokens by value instead of verifying them.
/// The `jti` counter keeps tokens minted within the same second distinct.
pub(crate) fn mint_token(sub: &str, email: &str, ttl_secs: i64) -> String {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);

	let now = unix_now();
	let claims = json!({
		"sub": sub,
		"email": email,
		"iat": now,
		"exp": now + ttl_secs,
		"jti": COUNTER.fetch_add(1, Ordering::Relaxed),
	});
	let payload = BASE64_URL_SAFE_NO_PAD.encode(claims.to_string());

	let signature = BASE64_URL_SAFE_NO_PAD.encode(b"recordbase-testing");

	format!("{header}.{payload}.{signature}")
}

pub(crate) fn unix_now() -> i64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}
