//! TLS client identity (certificate + private key) presented on every outbound connection.

// std
use std::{fs, path::Path};
// crates.io
use jsonwebtoken::EncodingKey;
use reqwest::Identity;
// self
use crate::{_prelude::*, error::ConfigError};

/// Certificate and private key pair used for mutual TLS, fixed for the lifetime of a client.
///
/// The same private key signs JWT-bearer assertions, so it doubles as the RSA signing key.
#[derive(Clone)]
pub struct ClientIdentity {
	certificate_pem: Vec<u8>,
	private_key_pem: Vec<u8>,
}
impl ClientIdentity {
	/// Validates and stores a PEM certificate chain plus its PEM private key.
	pub fn from_pem(
		certificate_pem: impl AsRef<[u8]>,
		private_key_pem: impl AsRef<[u8]>,
	) -> Result<Self, ConfigError> {
		let certificate_pem = certificate_pem.as_ref();
		let private_key_pem = private_key_pem.as_ref();

		if is_blank(certificate_pem) {
			return Err(ConfigError::MissingField { field: "certificate" });
		}
		if is_blank(private_key_pem) {
			return Err(ConfigError::MissingField { field: "private_key" });
		}

		let identity = Self {
			certificate_pem: certificate_pem.to_vec(),
			private_key_pem: private_key_pem.to_vec(),
		};

		identity.to_reqwest()?;

		Ok(identity)
	}

	/// Reads the certificate and private key from PEM files.
	pub fn from_pem_files(
		certificate_path: impl AsRef<Path>,
		private_key_path: impl AsRef<Path>,
	) -> Result<Self, ConfigError> {
		let certificate_pem = fs::read(certificate_path)?;
		let private_key_pem = fs::read(private_key_path)?;

		Self::from_pem(certificate_pem, private_key_pem)
	}

	/// PEM-encoded certificate chain.
	pub fn certificate_pem(&self) -> &[u8] {
		&self.certificate_pem
	}

	/// PEM-encoded private key. Callers must avoid logging these bytes.
	pub fn private_key_pem(&self) -> &[u8] {
		&self.private_key_pem
	}

	/// Converts the pair into a reqwest TLS identity.
	pub fn to_reqwest(&self) -> Result<Identity, ConfigError> {
		let mut bundle =
			Vec::with_capacity(self.private_key_pem.len() + self.certificate_pem.len() + 1);

		bundle.extend_from_slice(&self.private_key_pem);
		bundle.push(b'\n');
		bundle.extend_from_slice(&self.certificate_pem);

		Identity::from_pem(&bundle).map_err(|source| ConfigError::InvalidIdentity { source })
	}

	/// Parses the private key as an RS256 signing key.
	pub fn signing_key(&self) -> Result<EncodingKey, ConfigError> {
		EncodingKey::from_rsa_pem(&self.private_key_pem)
			.map_err(|source| ConfigError::InvalidPrivateKey { source })
	}
}
impl Debug for ClientIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientIdentity")
			.field("certificate_pem_len", &self.certificate_pem.len())
			.field("private_key_pem", &"<redacted>")
			.finish()
	}
}

fn is_blank(bytes: &[u8]) -> bool {
	bytes.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{TEST_CERTIFICATE_PEM, TEST_PRIVATE_KEY_PEM};

	#[test]
	fn fixture_pair_loads_and_signs() {
		let identity = ClientIdentity::from_pem(TEST_CERTIFICATE_PEM, TEST_PRIVATE_KEY_PEM)
			.expect("Fixture identity should load.");

		assert!(identity.signing_key().is_ok());
		assert!(!format!("{identity:?}").contains("PRIVATE KEY"));
	}

	#[test]
	fn blank_material_is_rejected_before_parsing() {
		let err = ClientIdentity::from_pem("", TEST_PRIVATE_KEY_PEM)
			.expect_err("Empty certificate must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "certificate" }));

		let err = ClientIdentity::from_pem(TEST_CERTIFICATE_PEM, " \n")
			.expect_err("Blank private key must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "private_key" }));
	}

	#[test]
	fn garbage_pem_is_rejected() {
		let err = ClientIdentity::from_pem("not a certificate", "not a key")
			.expect_err("Garbage PEM must not form an identity.");

		assert!(matches!(err, ConfigError::InvalidIdentity { .. }));
	}

	#[test]
	fn missing_files_surface_io_errors() {
		let err =
			ClientIdentity::from_pem_files("/nonexistent/client.crt", "/nonexistent/client.key")
				.expect_err("Missing files must fail.");

		assert!(matches!(err, ConfigError::Io(_)));
	}
}
