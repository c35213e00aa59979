//! Client-secret exchange: `client_id` + `client_secret` travel as form fields.

// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenData},
	issuer::{CLIENT_ASSERTION_TYPE, TokenIssuer},
};

/// `grant_type` sent by the client-secret exchange.
pub const CLIENT_SECRET_GRANT_TYPE: &str = "client_credentials";

impl TokenIssuer {
	pub(super) async fn exchange_client_secret(
		&self,
		client_id: &str,
		client_secret: &Secret,
	) -> Result<TokenData> {
		// The endpoint expects the assertion type even though no assertion is sent.
		let form = [
			("grant_type", CLIENT_SECRET_GRANT_TYPE),
			("client_assertion_type", CLIENT_ASSERTION_TYPE),
			("client_id", client_id),
			("client_secret", client_secret.expose()),
		];

		self.post_token_form(&self.endpoints().secret_token, &form).await
	}
}
