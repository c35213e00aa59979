//! Fixed Itaú endpoints plus a validated override builder.
//!
//! [`PixEndpoints::default`] carries the production URLs: one token endpoint per
//! authentication variant, the Pix API base URL, and the audience claimed by JWT assertions.
//! The builder exists so integration tests and sandboxes can point the client elsewhere; every
//! URL must still use HTTPS.

// self
use crate::{_prelude::*, error::ConfigError};

/// Token endpoint for the JWT-bearer exchange.
pub const JWT_TOKEN_URL: &str = "https://sts.itau.com.br/as/token.oauth2";
/// Token endpoint for the client-secret exchange.
pub const SECRET_TOKEN_URL: &str = "https://sts.itau.com.br/api/oauth/token";
/// Base URL of the Pix collections API.
pub const API_BASE_URL: &str = "https://secure.api.itau/pix_recebimentos/v2";
/// Audience claimed by JWT-bearer assertions.
pub const ASSERTION_AUDIENCE: &str = "id.itau.com.br/as/token.oauth2";

/// Endpoint set used by the token issuer and the API caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixEndpoints {
	/// Token endpoint for [`AuthVariant::JwtBearer`](crate::auth::AuthVariant::JwtBearer).
	pub jwt_token: Url,
	/// Token endpoint for [`AuthVariant::ClientSecret`](crate::auth::AuthVariant::ClientSecret).
	pub secret_token: Url,
	/// Pix API base URL; routes are appended verbatim.
	pub api_base: Url,
	/// `aud` claim of JWT assertions.
	pub audience: String,
}
impl PixEndpoints {
	/// Creates a builder seeded with the production endpoints.
	pub fn builder() -> PixEndpointsBuilder {
		PixEndpointsBuilder::default()
	}
}
impl Default for PixEndpoints {
	fn default() -> Self {
		Self {
			jwt_token: parse_builtin(JWT_TOKEN_URL),
			secret_token: parse_builtin(SECRET_TOKEN_URL),
			api_base: parse_builtin(API_BASE_URL),
			audience: ASSERTION_AUDIENCE.into(),
		}
	}
}

/// Builder for [`PixEndpoints`] overrides.
#[derive(Debug, Default)]
pub struct PixEndpointsBuilder {
	jwt_token: Option<Url>,
	secret_token: Option<Url>,
	api_base: Option<Url>,
	audience: Option<String>,
}
impl PixEndpointsBuilder {
	/// Overrides the JWT-bearer token endpoint.
	pub fn jwt_token_url(mut self, url: Url) -> Self {
		self.jwt_token = Some(url);

		self
	}

	/// Overrides the client-secret token endpoint.
	pub fn secret_token_url(mut self, url: Url) -> Self {
		self.secret_token = Some(url);

		self
	}

	/// Overrides the API base URL.
	pub fn api_base_url(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Overrides the assertion audience.
	pub fn audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = Some(audience.into());

		self
	}

	/// Consumes the builder and validates the resulting endpoints.
	pub fn build(self) -> Result<PixEndpoints, ConfigError> {
		let defaults = PixEndpoints::default();
		let endpoints = PixEndpoints {
			jwt_token: self.jwt_token.unwrap_or(defaults.jwt_token),
			secret_token: self.secret_token.unwrap_or(defaults.secret_token),
			api_base: self.api_base.unwrap_or(defaults.api_base),
			audience: self.audience.unwrap_or(defaults.audience),
		};

		validate_endpoint("jwt token", &endpoints.jwt_token)?;
		validate_endpoint("secret token", &endpoints.secret_token)?;
		validate_endpoint("api base", &endpoints.api_base)?;

		if endpoints.audience.trim().is_empty() {
			return Err(ConfigError::MissingField { field: "audience" });
		}

		Ok(endpoints)
	}
}

/// Parses an endpoint string into a [`Url`].
pub fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint { source })
}

fn parse_builtin(value: &'static str) -> Url {
	// Compile-time constants above are valid absolute URLs.
	Url::parse(value).unwrap_or_else(|e| unreachable!("built-in endpoint `{value}`: {e}"))
}

pub(crate) fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_production_urls() {
		let endpoints = PixEndpoints::default();

		assert_eq!(endpoints.jwt_token.as_str(), JWT_TOKEN_URL);
		assert_eq!(endpoints.secret_token.as_str(), SECRET_TOKEN_URL);
		assert_eq!(endpoints.api_base.as_str(), API_BASE_URL);
		assert_eq!(endpoints.audience, ASSERTION_AUDIENCE);
		assert_eq!(PixEndpoints::builder().build().expect("Defaults should validate."), endpoints);
	}

	#[test]
	fn overrides_must_use_https() {
		let err = PixEndpoints::builder()
			.jwt_token_url(
				parse_endpoint("http://127.0.0.1:8080/token").expect("Fixture URL should parse."),
			)
			.build()
			.expect_err("Plain HTTP endpoints must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { endpoint: "jwt token", .. }));

		let endpoints = PixEndpoints::builder()
			.api_base_url(
				parse_endpoint("https://sandbox.example.com/pix/v2")
					.expect("Fixture URL should parse."),
			)
			.audience("sandbox-audience")
			.build()
			.expect("HTTPS overrides should validate.");

		assert_eq!(endpoints.api_base.as_str(), "https://sandbox.example.com/pix/v2");
		assert_eq!(endpoints.audience, "sandbox-audience");
		assert_eq!(endpoints.jwt_token.as_str(), JWT_TOKEN_URL);
	}

	#[test]
	fn invalid_strings_and_blank_audience_fail() {
		assert!(matches!(parse_endpoint("not a url"), Err(ConfigError::InvalidEndpoint { .. })));
		assert!(matches!(
			PixEndpoints::builder().audience(" ").build(),
			Err(ConfigError::MissingField { field: "audience" })
		));
	}
}
