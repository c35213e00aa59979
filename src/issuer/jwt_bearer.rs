//! JWT-bearer exchange: a signed client assertion proves possession of the private key.

// self
use crate::{_prelude::*, auth::TokenData, issuer::TokenIssuer, jwt::AssertionBuilder};

/// `grant_type` sent by the JWT-bearer exchange.
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:client_credentials";
/// `client_assertion_type` sent by both exchanges.
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

impl TokenIssuer {
	pub(super) async fn exchange_jwt_bearer(
		&self,
		client_id: &str,
		kid: &str,
	) -> Result<TokenData> {
		let assertion = AssertionBuilder::new(client_id, kid)
			.audience(self.endpoints().audience.as_str())
			.sign(self.config().identity().private_key_pem())?;
		let form = [
			("grant_type", JWT_BEARER_GRANT_TYPE),
			("client_assertion_type", CLIENT_ASSERTION_TYPE),
			("client_assertion", assertion.as_str()),
		];

		self.post_token_form(&self.endpoints().jwt_token, &form).await
	}
}
