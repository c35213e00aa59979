//! Mutual-TLS transport shared by the token issuer and the API caller.
//!
//! [`PixHttpClient`] is a thin wrapper around [`ReqwestClient`] so both callers present the
//! same client certificate and inherit the same defaults. No retry, timeout, or pooling policy
//! is layered on top; reqwest's defaults apply.

// std
use std::ops::Deref;
// crates.io
use reqwest::{Response, StatusCode, redirect::Policy};
// self
use crate::{
	_prelude::*,
	auth::ClientIdentity,
	error::{ConfigError, ResponseError},
};

/// Thin wrapper around [`ReqwestClient`] configured with a TLS client identity.
///
/// Token endpoints must answer directly, so the client built by
/// [`from_identity`](Self::from_identity) never follows redirects. Configure any custom
/// [`ReqwestClient`] passed to [`with_client`](Self::with_client) the same way.
#[derive(Clone, Debug)]
pub struct PixHttpClient(pub ReqwestClient);
impl PixHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that presents `identity` on every TLS handshake.
	pub fn from_identity(identity: &ClientIdentity) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.identity(identity.to_reqwest()?)
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for PixHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for PixHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Status and body of a completed 2xx exchange.
#[derive(Clone, Debug)]
pub(crate) struct RawResponse {
	pub(crate) status: StatusCode,
	pub(crate) body: String,
}

/// Reads `response`, turning non-2xx statuses into [`ResponseError`]s that carry the body.
pub(crate) async fn read_response(response: Response) -> Result<RawResponse, ResponseError> {
	let status = response.status();
	let body = response
		.text()
		.await
		.map_err(|e| ResponseError::interrupted(status.as_u16(), e.to_string()))?;

	if status.is_success() {
		Ok(RawResponse { status, body })
	} else {
		Err(ResponseError::rejected(status.as_u16(), &body))
	}
}

/// Decodes a 2xx JSON body; empty bodies decode to [`Value::Null`].
pub(crate) fn decode_json(raw: &RawResponse) -> Result<Value, ResponseError> {
	if raw.body.trim().is_empty() {
		return Ok(Value::Null);
	}

	serde_json::from_str(&raw.body)
		.map_err(|_| ResponseError::malformed(raw.status.as_u16(), &raw.body))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::test_identity, error::ResponseErrorKind};

	fn raw(status: u16, body: &str) -> RawResponse {
		RawResponse {
			status: StatusCode::from_u16(status).expect("Fixture status should be valid."),
			body: body.into(),
		}
	}

	#[test]
	fn builds_client_from_identity() {
		assert!(PixHttpClient::from_identity(&test_identity()).is_ok());
	}

	#[test]
	fn decode_json_handles_empty_and_malformed_bodies() {
		assert_eq!(decode_json(&raw(204, "")).expect("Empty body should decode."), Value::Null);
		assert_eq!(
			decode_json(&raw(200, "{\"txid\":\"abc\"}")).expect("JSON body should decode."),
			serde_json::json!({ "txid": "abc" })
		);

		let err = decode_json(&raw(200, "<html>")).expect_err("HTML must not decode as JSON.");

		assert_eq!(err.kind, ResponseErrorKind::MalformedPayload);
		assert_eq!(err.code, 200);
	}
}
