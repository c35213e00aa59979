//! Immutable credential configuration and the authentication variant it selects.

// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, Secret},
	error::ConfigError,
};

/// Token-endpoint authentication variant, fixed when a [`CredentialConfig`] is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthVariant {
	/// Client authenticates with an RS256-signed JWT assertion.
	JwtBearer {
		/// OAuth client identifier; becomes the assertion's `sub` and `iss`.
		client_id: String,
		/// Key identifier embedded in the assertion header.
		kid: String,
	},
	/// Client authenticates with `client_id` + `client_secret` form fields.
	ClientSecret {
		/// OAuth client identifier.
		client_id: String,
		/// OAuth client secret.
		client_secret: Secret,
	},
}
impl AuthVariant {
	/// OAuth client identifier shared by both variants.
	pub fn client_id(&self) -> &str {
		match self {
			Self::JwtBearer { client_id, .. } | Self::ClientSecret { client_id, .. } => client_id,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Self::JwtBearer { .. } => "jwt_bearer",
			Self::ClientSecret { .. } => "client_secret",
		}
	}
}

/// Credentials supplied once by the embedding application; immutable afterwards.
#[derive(Clone, Debug)]
pub struct CredentialConfig {
	pix_key: Option<String>,
	variant: AuthVariant,
	identity: ClientIdentity,
}
impl CredentialConfig {
	/// Returns a builder that selects the variant from the populated fields.
	pub fn builder() -> CredentialConfigBuilder {
		CredentialConfigBuilder::default()
	}

	/// Builds a JWT-bearer configuration.
	pub fn jwt_bearer(
		client_id: impl Into<String>,
		kid: impl Into<String>,
		identity: ClientIdentity,
	) -> Result<Self, ConfigError> {
		Self::builder().client_id(client_id).kid(kid).identity(identity).build()
	}

	/// Builds a client-secret configuration.
	pub fn client_secret(
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
		identity: ClientIdentity,
	) -> Result<Self, ConfigError> {
		Self::builder().client_id(client_id).client_secret(client_secret).identity(identity).build()
	}

	/// Pix key identifying the receiving account, when configured.
	pub fn pix_key(&self) -> Option<&str> {
		self.pix_key.as_deref()
	}

	/// Selected authentication variant.
	pub fn variant(&self) -> &AuthVariant {
		&self.variant
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		self.variant.client_id()
	}

	/// TLS client identity used for every call.
	pub fn identity(&self) -> &ClientIdentity {
		&self.identity
	}
}

/// Builder for [`CredentialConfig`].
///
/// Supplying a `kid` selects [`AuthVariant::JwtBearer`]; supplying a `client_secret` selects
/// [`AuthVariant::ClientSecret`]. Supplying both is rejected rather than guessed.
#[derive(Default)]
pub struct CredentialConfigBuilder {
	pix_key: Option<String>,
	client_id: Option<String>,
	client_secret: Option<Secret>,
	kid: Option<String>,
	identity: Option<ClientIdentity>,
	certificate_pem: Option<Vec<u8>>,
	private_key_pem: Option<Vec<u8>>,
}
impl CredentialConfigBuilder {
	/// Sets the Pix key.
	pub fn pix_key(mut self, pix_key: impl Into<String>) -> Self {
		self.pix_key = Some(pix_key.into());

		self
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, client_secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Sets the JWT key identifier.
	pub fn kid(mut self, kid: impl Into<String>) -> Self {
		self.kid = Some(kid.into());

		self
	}

	/// Uses an already validated TLS identity.
	pub fn identity(mut self, identity: ClientIdentity) -> Self {
		self.identity = Some(identity);

		self
	}

	/// Sets the PEM certificate; ignored when [`identity`](Self::identity) is supplied.
	pub fn certificate_pem(mut self, pem: impl AsRef<[u8]>) -> Self {
		self.certificate_pem = Some(pem.as_ref().to_vec());

		self
	}

	/// Sets the PEM private key; ignored when [`identity`](Self::identity) is supplied.
	pub fn private_key_pem(mut self, pem: impl AsRef<[u8]>) -> Self {
		self.private_key_pem = Some(pem.as_ref().to_vec());

		self
	}

	/// Validates the fields and fixes the authentication variant.
	pub fn build(self) -> Result<CredentialConfig, ConfigError> {
		let client_id =
			non_blank(self.client_id).ok_or(ConfigError::MissingField { field: "client_id" })?;
		let kid = non_blank(self.kid);
		let client_secret = self.client_secret.filter(|secret| !secret.is_blank());
		let variant = match (kid, client_secret) {
			(Some(_), Some(_)) => return Err(ConfigError::AmbiguousVariant),
			(Some(kid), None) => AuthVariant::JwtBearer { client_id, kid },
			(None, Some(client_secret)) => AuthVariant::ClientSecret { client_id, client_secret },
			(None, None) =>
				return Err(ConfigError::MissingField { field: "kid or client_secret" }),
		};
		let identity = match self.identity {
			Some(identity) => identity,
			None => ClientIdentity::from_pem(
				self.certificate_pem.ok_or(ConfigError::MissingField { field: "certificate" })?,
				self.private_key_pem.ok_or(ConfigError::MissingField { field: "private_key" })?,
			)?,
		};

		if matches!(variant, AuthVariant::JwtBearer { .. }) {
			identity.signing_key()?;
		}

		let pix_key = match self.pix_key {
			Some(key) if key.trim().is_empty() =>
				return Err(ConfigError::MissingField { field: "pix_key" }),
			other => other,
		};

		Ok(CredentialConfig { pix_key, variant, identity })
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.trim().is_empty())
}
