//! RS256 client assertions for the JWT-bearer token exchange.
//!
//! Each call produces a fresh claim set with its own `jti`, so an assertion is good for exactly
//! one exchange inside its validity window. Signing is CPU-only; nothing here performs I/O.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use uuid::Uuid;
// self
use crate::{_prelude::*, endpoint::ASSERTION_AUDIENCE, error::ConfigError};

/// Default assertion lifetime.
pub const DEFAULT_ASSERTION_TTL: Duration = Duration::HOUR;

/// Claim set carried by a client assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Subject; the OAuth client identifier.
	pub sub: String,
	/// Audience; the authorization server.
	pub aud: String,
	/// Issuer; the OAuth client identifier.
	pub iss: String,
	/// Issued-at, in unix seconds.
	pub iat: i64,
	/// Expiry, in unix seconds.
	pub exp: i64,
	/// Unique assertion identifier.
	pub jti: String,
}

/// Builds and signs client assertions.
#[derive(Clone, Debug)]
pub struct AssertionBuilder {
	client_id: String,
	kid: String,
	audience: String,
	ttl: Duration,
	issued_at: Option<OffsetDateTime>,
}
impl AssertionBuilder {
	/// Starts a builder for `client_id` signing under key identifier `kid`.
	pub fn new(client_id: impl Into<String>, kid: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			kid: kid.into(),
			audience: ASSERTION_AUDIENCE.into(),
			ttl: DEFAULT_ASSERTION_TTL,
			issued_at: None,
		}
	}

	/// Overrides the `aud` claim.
	pub fn audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = audience.into();

		self
	}

	/// Overrides the lifetime (defaults to one hour); must be positive.
	pub fn expires_in(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Pins the issued-at instant instead of reading the clock.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Produces a fresh claim set; every call draws a new `jti`.
	pub fn claims(&self) -> Result<AssertionClaims, ConfigError> {
		require("client_id", &self.client_id)?;

		let iat = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc).unix_timestamp();
		let exp = iat
			.checked_add(self.ttl.whole_seconds())
			.filter(|exp| *exp > iat)
			.ok_or(ConfigError::InvalidLifetime { seconds: self.ttl.whole_seconds() })?;

		Ok(AssertionClaims {
			sub: self.client_id.clone(),
			aud: self.audience.clone(),
			iss: self.client_id.clone(),
			iat,
			exp,
			jti: Uuid::new_v4().to_string(),
		})
	}

	/// Header with `alg = RS256` and the configured `kid`.
	pub fn header(&self) -> Result<Header, ConfigError> {
		require("kid", &self.kid)?;

		let mut header = Header::new(Algorithm::RS256);

		header.typ = None;
		header.kid = Some(self.kid.clone());

		Ok(header)
	}

	/// Signs a fresh assertion with the PEM-encoded RSA private key.
	///
	/// Missing inputs are reported before the key is parsed.
	pub fn sign(&self, private_key_pem: &[u8]) -> Result<String, ConfigError> {
		require("client_id", &self.client_id)?;

		if private_key_pem.iter().all(u8::is_ascii_whitespace) {
			return Err(ConfigError::MissingField { field: "private_key" });
		}

		let header = self.header()?;
		let key = EncodingKey::from_rsa_pem(private_key_pem)
			.map_err(|source| ConfigError::InvalidPrivateKey { source })?;
		let claims = self.claims()?;

		jsonwebtoken::encode(&header, &claims, &key)
			.map_err(|source| ConfigError::Signing { source })
	}
}

/// Signs a one-hour assertion for `client_id` with the default audience.
pub fn sign_assertion(
	client_id: &str,
	private_key_pem: &[u8],
	kid: &str,
) -> Result<String, ConfigError> {
	AssertionBuilder::new(client_id, kid).sign(private_key_pem)
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::MissingField { field }) } else { Ok(()) }
}
