//! Token issuer: exchanges the configured credentials for a bearer token over mutual TLS.
//!
//! [`TokenIssuer::exchange`] dispatches on the [`AuthVariant`] fixed at configuration time;
//! the JWT-bearer and client-secret flows live in their own modules and never fall back to one
//! another. The last successful payload is kept in a [`TokenCache`] owned by the issuer.

mod client_secret;
mod jwt_bearer;

pub use client_secret::CLIENT_SECRET_GRANT_TYPE;
pub use jwt_bearer::{CLIENT_ASSERTION_TYPE, JWT_BEARER_GRANT_TYPE};

// crates.io
use reqwest::header::ACCEPT;
// self
use crate::{
	_prelude::*,
	auth::{AuthVariant, CredentialConfig, TokenCache, TokenData},
	endpoint::PixEndpoints,
	error::ResponseError,
	http::{self, PixHttpClient},
	obs::{self, OperationKind},
};

/// Exchanges credentials for bearer tokens and remembers the latest one.
pub struct TokenIssuer {
	config: CredentialConfig,
	endpoints: PixEndpoints,
	http_client: PixHttpClient,
	cache: TokenCache,
}
impl TokenIssuer {
	/// Creates an issuer against the production endpoints.
	pub fn new(config: CredentialConfig) -> Result<Self> {
		Self::with_endpoints(config, PixEndpoints::default())
	}

	/// Creates an issuer against custom endpoints, presenting the configured TLS identity.
	pub fn with_endpoints(config: CredentialConfig, endpoints: PixEndpoints) -> Result<Self> {
		let http_client = PixHttpClient::from_identity(config.identity())?;

		Ok(Self::with_http_client(config, endpoints, http_client))
	}

	/// Creates an issuer that reuses a caller-provided transport.
	///
	/// The transport is expected to present `config.identity()`; nothing re-checks that.
	pub fn with_http_client(
		config: CredentialConfig,
		endpoints: PixEndpoints,
		http_client: PixHttpClient,
	) -> Self {
		Self { config, endpoints, http_client, cache: TokenCache::default() }
	}

	/// Performs the token exchange selected by the configured [`AuthVariant`].
	///
	/// On success the payload replaces the cached token and is returned. On failure the cache
	/// is left untouched.
	pub async fn exchange(&self) -> Result<TokenData> {
		let kind = OperationKind::from(self.config.variant());

		obs::observe(kind, "exchange", async {
			let token = match self.config.variant() {
				AuthVariant::JwtBearer { client_id, kid } =>
					self.exchange_jwt_bearer(client_id, kid).await?,
				AuthVariant::ClientSecret { client_id, client_secret } =>
					self.exchange_client_secret(client_id, client_secret).await?,
			};

			self.cache.store(token.clone());

			Ok(token)
		})
		.await
	}

	/// Last successfully exchanged token, or `None` before the first success.
	///
	/// Performs no I/O and does not look at expiry.
	pub fn token(&self) -> Option<TokenData> {
		self.cache.get()
	}

	/// Returns `true` if the cached token is known to be expired.
	pub fn is_expired(&self) -> bool {
		self.cache.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when no token is cached or it expires within `window`.
	pub fn needs_refresh(&self, window: Duration) -> bool {
		self.cache.needs_refresh_at(OffsetDateTime::now_utc(), window)
	}

	/// Token slot owned by this issuer.
	pub fn cache(&self) -> &TokenCache {
		&self.cache
	}

	/// Credentials this issuer was built with.
	pub fn config(&self) -> &CredentialConfig {
		&self.config
	}

	/// Endpoints this issuer talks to.
	pub fn endpoints(&self) -> &PixEndpoints {
		&self.endpoints
	}

	/// Transport shared with API callers built from this issuer.
	pub fn http_client(&self) -> &PixHttpClient {
		&self.http_client
	}

	async fn post_token_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<TokenData> {
		let response = self
			.http_client
			.post(url.clone())
			.header(ACCEPT, "application/json")
			.form(form)
			.send()
			.await
			.map_err(ResponseError::from)?;
		let raw = http::read_response(response).await?;
		let payload = http::decode_json(&raw)?;
		let token = TokenData::from_payload(payload, OffsetDateTime::now_utc())
			.map_err(|e| ResponseError::undecodable(raw.status.as_u16(), &raw.body, &e))?;

		Ok(token)
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("variant", &self.config.variant().as_str())
			.field("client_id", &self.config.client_id())
			.field("endpoints", &self.endpoints)
			.field("token_cached", &!self.cache.is_empty())
			.finish()
	}
}
