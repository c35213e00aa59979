//! Token payloads returned by the authorization server and the per-issuer cache slot.

// crates.io
use serde::Deserializer;
// self
use crate::{_prelude::*, auth::Secret};

/// Token payload returned by a successful exchange.
///
/// The raw JSON object is kept verbatim; the well-known OAuth fields are lifted out for
/// convenience. Only `access_token` is required. Other fields with an unexpected shape read as
/// absent: numeric strings and whole floats are accepted for `expires_in`, and a `scope` array
/// is joined with spaces.
#[derive(Clone)]
pub struct TokenData {
	payload: Value,
	access_token: Secret,
	token_type: Option<String>,
	expires_in: Option<u64>,
	scope: Option<String>,
	received_at: OffsetDateTime,
}
impl TokenData {
	/// Decodes a token endpoint payload received at `received_at`.
	pub fn from_payload(
		payload: Value,
		received_at: OffsetDateTime,
	) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let fields: TokenFields = serde_path_to_error::deserialize(&payload)?;

		Ok(Self {
			access_token: Secret::new(fields.access_token),
			token_type: fields.token_type,
			expires_in: fields.expires_in,
			scope: fields.scope,
			payload,
			received_at,
		})
	}

	/// Exact JSON payload returned by the authorization server.
	pub fn payload(&self) -> &Value {
		&self.payload
	}

	/// Consumes the record and returns the raw payload.
	pub fn into_payload(self) -> Value {
		self.payload
	}

	/// Bearer token presented to the API.
	pub fn access_token(&self) -> &Secret {
		&self.access_token
	}

	/// Token type hint (usually `Bearer`).
	pub fn token_type(&self) -> Option<&str> {
		self.token_type.as_deref()
	}

	/// Lifetime in seconds, as reported by the server.
	pub fn expires_in(&self) -> Option<u64> {
		self.expires_in
	}

	/// Granted scope string, if reported.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Instant the payload was received.
	pub fn received_at(&self) -> OffsetDateTime {
		self.received_at
	}

	/// Expiry instant derived from `received_at + expires_in`; `None` when unknown.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let secs = i64::try_from(self.expires_in?).ok()?;

		self.received_at.checked_add(Duration::seconds(secs))
	}

	/// Returns `true` if the token is known to be expired at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token is known to be expired now.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token expires within `window` of `instant`.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime, window: Duration) -> bool {
		self.expires_at().is_some_and(|expires_at| expires_at - instant <= window)
	}
}
impl PartialEq for TokenData {
	fn eq(&self, other: &Self) -> bool {
		self.payload == other.payload && self.received_at == other.received_at
	}
}
impl Debug for TokenData {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenData")
			.field("access_token", &self.access_token)
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("scope", &self.scope)
			.field("received_at", &self.received_at)
			.finish()
	}
}

#[derive(Deserialize)]
struct TokenFields {
	access_token: String,
	#[serde(default, deserialize_with = "lenient_text")]
	token_type: Option<String>,
	#[serde(default, deserialize_with = "lenient_seconds")]
	expires_in: Option<u64>,
	#[serde(default, deserialize_with = "lenient_scope")]
	scope: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::String(text)) => Some(text),
		_ => None,
	})
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::Number(number)) => number.as_u64().or_else(|| {
			number
				.as_f64()
				.filter(|secs| secs.is_finite() && *secs >= 0. && secs.fract() == 0.)
				.map(|secs| secs as u64)
		}),
		Some(Value::String(text)) => text.trim().parse().ok(),
		_ => None,
	})
}

fn lenient_scope<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::String(scope)) => Some(scope),
		Some(Value::Array(items)) => {
			let scopes = items.iter().filter_map(Value::as_str).collect::<Vec<_>>();

			(!scopes.is_empty()).then(|| scopes.join(" "))
		},
		_ => None,
	})
}

/// Single token slot owned by one issuer.
///
/// Every successful exchange overwrites the slot; failures never touch it. Concurrent writers
/// are not coordinated, so the last successful exchange wins.
#[derive(Debug, Default)]
pub struct TokenCache(RwLock<Option<TokenData>>);
impl TokenCache {
	/// Returns the stored token, or `None` before the first successful exchange.
	pub fn get(&self) -> Option<TokenData> {
		self.0.read().clone()
	}

	/// Replaces the stored token.
	pub fn store(&self, token: TokenData) {
		*self.0.write() = Some(token);
	}

	/// Empties the slot, returning the previous token.
	pub fn clear(&self) -> Option<TokenData> {
		self.0.write().take()
	}

	/// Returns `true` if no token has been stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_none()
	}

	/// Returns `true` if a stored token is known to be expired at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.0.read().as_ref().is_some_and(|token| token.is_expired_at(instant))
	}

	/// Returns `true` when the slot is empty or its token expires within `window` of `instant`.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime, window: Duration) -> bool {
		self.0.read().as_ref().is_none_or(|token| token.needs_refresh_at(instant, window))
	}
}
