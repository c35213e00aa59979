//! Demonstrates a JWT-bearer token exchange followed by an authenticated Pix API call, both
//! against a local mock server standing in for the Itaú endpoints.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use itau_pix::{
	api::PixClient,
	auth::{ClientIdentity, CredentialConfig},
	endpoint::{PixEndpoints, parse_endpoint},
	http::PixHttpClient,
	issuer::TokenIssuer,
	reqwest::Client,
};

const CERTIFICATE_PEM: &str = include_str!("../tests/fixtures/client.crt");
const PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/client.key");

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/as/token.oauth2");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":300}",
			);
		})
		.await;
	let charge_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/pix_recebimentos/v2/cob/demo-txid")
				.header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"txid\":\"demo-txid\",\"status\":\"ATIVA\"}");
		})
		.await;
	let identity = ClientIdentity::from_pem(CERTIFICATE_PEM, PRIVATE_KEY_PEM)?;
	let config = CredentialConfig::builder()
		.pix_key("demo@example.com")
		.client_id("demo-client")
		.kid("demo-kid")
		.identity(identity.clone())
		.build()?;
	let endpoints = PixEndpoints::builder()
		.jwt_token_url(parse_endpoint(&server.url("/as/token.oauth2"))?)
		.secret_token_url(parse_endpoint(&server.url("/api/oauth/token"))?)
		.api_base_url(parse_endpoint(&server.url("/pix_recebimentos/v2"))?)
		.build()?;
	// The mock server uses a self-signed certificate.
	let http_client = PixHttpClient::with_client(
		Client::builder()
			.identity(identity.to_reqwest()?)
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let issuer = TokenIssuer::with_http_client(config, endpoints, http_client);
	let token = issuer.exchange().await?;

	println!("Exchanged token expires at {:?}.", token.expires_at());

	let client = PixClient::from_issuer(&issuer)?;
	let charge = client.get("/cob/demo-txid").await?;

	println!("Charge: {charge}.");

	token_mock.assert_async().await;
	charge_mock.assert_async().await;

	Ok(())
}
