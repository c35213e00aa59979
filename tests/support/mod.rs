//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// self
use itau_pix::{
	auth::{ClientIdentity, CredentialConfig},
	endpoint::{PixEndpoints, parse_endpoint},
	http::PixHttpClient,
	issuer::TokenIssuer,
	reqwest::Client,
};

/// PEM certificate shipped with the test fixtures.
pub const TEST_CERTIFICATE_PEM: &str = include_str!("../fixtures/client.crt");
/// PEM private key (RSA, PKCS#8) matching [`TEST_CERTIFICATE_PEM`].
pub const TEST_PRIVATE_KEY_PEM: &str = include_str!("../fixtures/client.key");

/// Loads the fixture client identity.
pub fn test_identity() -> ClientIdentity {
	ClientIdentity::from_pem(TEST_CERTIFICATE_PEM, TEST_PRIVATE_KEY_PEM)
		.expect("Fixture client identity should load.")
}

/// Builds a transport that presents `identity` and trusts the mock server's certificate.
pub fn test_http_client(identity: &ClientIdentity) -> PixHttpClient {
	let client = Client::builder()
		.identity(identity.to_reqwest().expect("Fixture identity should convert."))
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Test HTTP client should build.");

	PixHttpClient::with_client(client)
}

/// Points every endpoint at `base`, mirroring the production path layout.
pub fn test_endpoints(base: &str) -> PixEndpoints {
	let base = base.trim_end_matches('/');

	PixEndpoints::builder()
		.jwt_token_url(
			parse_endpoint(&format!("{base}/as/token.oauth2"))
				.expect("JWT token URL should parse."),
		)
		.secret_token_url(
			parse_endpoint(&format!("{base}/api/oauth/token"))
				.expect("Secret token URL should parse."),
		)
		.api_base_url(
			parse_endpoint(&format!("{base}/pix_recebimentos/v2"))
				.expect("API base URL should parse."),
		)
		.build()
		.expect("Test endpoints should validate.")
}

/// Builds an issuer whose endpoints all live under `base`.
pub fn build_test_issuer(config: CredentialConfig, base: &str) -> TokenIssuer {
	let http_client = test_http_client(config.identity());

	TokenIssuer::with_http_client(config, test_endpoints(base), http_client)
}
