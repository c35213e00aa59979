mod support;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use itau_pix::{
	auth::{AuthVariant, CredentialConfig},
	error::{ConfigError, ErrorDetails, RESPONSE_ERROR_STATUS, ResponseErrorKind},
};
use support::*;

const SECRET_TOKEN_PATH: &str = "/api/oauth/token";
const JWT_TOKEN_PATH: &str = "/as/token.oauth2";

fn secret_config() -> CredentialConfig {
	CredentialConfig::client_secret("c1", "s1", test_identity())
		.expect("Client-secret config should build.")
}

#[tokio::test]
async fn client_secret_exchange_posts_form_credentials() {
	let server = MockServer::start_async().await;
	let issuer = build_test_issuer(secret_config(), &server.url(""));
	let secret = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(SECRET_TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("grant_type=client_credentials")
				.body_includes("client_id=c1")
				.body_includes("client_secret=s1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"t2\",\"token_type\":\"Bearer\",\"scope\":\"cob.read\"}");
		})
		.await;
	let jwt = server
		.mock_async(|when, then| {
			when.method(POST).path(JWT_TOKEN_PATH);
			then.status(200).body("{\"access_token\":\"wrong\"}");
		})
		.await;
	let token = issuer.exchange().await.expect("Client-secret exchange should succeed.");

	assert_eq!(token.access_token().expose(), "t2");
	assert_eq!(token.scope(), Some("cob.read"));
	assert_eq!(token.expires_in(), None);
	assert_eq!(
		issuer.token().map(|cached| cached.payload().clone()),
		Some(json!({ "access_token": "t2", "token_type": "Bearer", "scope": "cob.read" }))
	);
	// Unknown expiry is never reported as expired.
	assert!(!issuer.is_expired());

	secret.assert_calls_async(1).await;
	jwt.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_secret_reports_remote_body() {
	let server = MockServer::start_async().await;
	let issuer = build_test_issuer(secret_config(), &server.url(""));
	let jwt = server
		.mock_async(|when, then| {
			when.method(POST).path(JWT_TOKEN_PATH);
			then.status(200).body("{\"access_token\":\"wrong\"}");
		})
		.await;
	let _secret = server
		.mock_async(|when, then| {
			when.method(POST).path(SECRET_TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"bad secret\"}");
		})
		.await;
	let err = issuer.exchange().await.expect_err("Bad secret should be rejected.");
	let response = err.as_response().expect("Rejection should be a response error.");

	assert_eq!(response.status, RESPONSE_ERROR_STATUS);
	assert_eq!(response.code, 401);
	assert_eq!(response.kind, ResponseErrorKind::RemoteRejection);
	assert_eq!(
		response.details,
		ErrorDetails::Body(json!({ "error": "invalid_client", "error_description": "bad secret" }))
	);
	assert!(issuer.token().is_none());

	// No fallback to the JWT-bearer flow.
	jwt.assert_calls_async(0).await;
}

#[test]
fn variant_selection_is_exclusive() {
	let config = secret_config();

	assert!(matches!(config.variant(), AuthVariant::ClientSecret { .. }));
	assert_eq!(config.variant().as_str(), "client_secret");

	let err = CredentialConfig::builder()
		.client_id("c1")
		.kid("k1")
		.client_secret("s1")
		.identity(test_identity())
		.build()
		.expect_err("Both variants at once must be rejected.");

	assert!(matches!(err, ConfigError::AmbiguousVariant));

	let err = CredentialConfig::builder()
		.client_id("c1")
		.client_secret("   ")
		.identity(test_identity())
		.build()
		.expect_err("Blank secret must be rejected.");

	assert!(matches!(err, ConfigError::MissingField { .. }));
}
