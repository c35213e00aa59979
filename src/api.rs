//! Authenticated Pix API caller.
//!
//! [`PixClient`] appends a route to the API base URL, attaches the JSON headers and the bearer
//! token, and sends one request over the mutual-TLS transport. Any 2xx body is returned as
//! JSON; everything else becomes a [`ResponseError`]. There are no retries, no pagination, and
//! no streaming.

// crates.io
use reqwest::{
	Method,
	header::{ACCEPT, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ClientIdentity, Secret},
	endpoint::{self, PixEndpoints},
	error::{ConfigError, ResponseError},
	http::{self, PixHttpClient, RawResponse},
	issuer::TokenIssuer,
	obs::{self, OperationKind},
};

/// HTTP verbs accepted by the Pix API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl ApiMethod {
	/// Returns the method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Put => "PUT",
			Self::Patch => "PATCH",
			Self::Delete => "DELETE",
		}
	}

	/// Returns `true` for verbs that carry a request body.
	pub const fn accepts_body(self) -> bool {
		matches!(self, Self::Post | Self::Put | Self::Patch)
	}
}
impl From<ApiMethod> for Method {
	fn from(method: ApiMethod) -> Self {
		match method {
			ApiMethod::Get => Method::GET,
			ApiMethod::Post => Method::POST,
			ApiMethod::Put => Method::PUT,
			ApiMethod::Patch => Method::PATCH,
			ApiMethod::Delete => Method::DELETE,
		}
	}
}
impl Display for ApiMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Authenticated caller for the Pix collections API.
#[derive(Clone)]
pub struct PixClient {
	pix_key: Option<String>,
	base_url: Url,
	token: Secret,
	http_client: PixHttpClient,
}
impl PixClient {
	/// Returns a builder for a client with a caller-supplied bearer token.
	pub fn builder() -> PixClientBuilder {
		PixClientBuilder::default()
	}

	/// Builds a client from the issuer's credentials, endpoints, transport, and current token.
	///
	/// Fails with [`ConfigError::MissingToken`] until the issuer has completed an exchange.
	pub fn from_issuer(issuer: &TokenIssuer) -> Result<Self> {
		let token = issuer.token().ok_or(ConfigError::MissingToken)?;

		Ok(Self {
			pix_key: issuer.config().pix_key().map(ToOwned::to_owned),
			base_url: issuer.endpoints().api_base.clone(),
			token: token.access_token().clone(),
			http_client: issuer.http_client().clone(),
		})
	}

	/// Pix key this client acts for, when configured.
	pub fn pix_key(&self) -> Option<&str> {
		self.pix_key.as_deref()
	}

	/// Base URL routes are appended to.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Sends `GET route`.
	pub async fn get(&self, route: &str) -> Result<Value> {
		self.request(ApiMethod::Get, route, None).await
	}

	/// Sends `POST route` with a JSON body.
	pub async fn post<B>(&self, route: &str, body: &B) -> Result<Value>
	where
		B: ?Sized + Serialize,
	{
		self.request(ApiMethod::Post, route, Some(to_json(body)?)).await
	}

	/// Sends `PUT route` with a JSON body.
	pub async fn put<B>(&self, route: &str, body: &B) -> Result<Value>
	where
		B: ?Sized + Serialize,
	{
		self.request(ApiMethod::Put, route, Some(to_json(body)?)).await
	}

	/// Sends `PATCH route` with a JSON body.
	pub async fn patch<B>(&self, route: &str, body: &B) -> Result<Value>
	where
		B: ?Sized + Serialize,
	{
		self.request(ApiMethod::Patch, route, Some(to_json(body)?)).await
	}

	/// Sends `DELETE route`.
	pub async fn delete(&self, route: &str) -> Result<Value> {
		self.request(ApiMethod::Delete, route, None).await
	}

	/// Sends one request and returns the 2xx JSON body (`Null` when empty).
	pub async fn request(
		&self,
		method: ApiMethod,
		route: &str,
		body: Option<Value>,
	) -> Result<Value> {
		let raw = self.send(method, route, body).await?;

		Ok(http::decode_json(&raw)?)
	}

	/// Sends one request and decodes the 2xx JSON body into `T`.
	pub async fn request_as<T>(
		&self,
		method: ApiMethod,
		route: &str,
		body: Option<Value>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let raw = self.send(method, route, body).await?;
		let text = if raw.body.trim().is_empty() { "null" } else { raw.body.as_str() };
		let mut de = serde_json::Deserializer::from_str(text);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|e| ResponseError::undecodable(raw.status.as_u16(), &raw.body, &e).into())
	}

	/// Resolves `route` against the base URL.
	pub fn url_for(&self, route: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if route.starts_with('/') {
			format!("{base}{route}")
		} else {
			format!("{base}/{route}")
		};

		Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidRoute { route: route.into(), source })
	}

	async fn send(
		&self,
		method: ApiMethod,
		route: &str,
		body: Option<Value>,
	) -> Result<RawResponse> {
		obs::observe(OperationKind::ApiCall, method.as_str(), async {
			if body.is_some() && !method.accepts_body() {
				return Err(ConfigError::UnsupportedBody { method: method.as_str() }.into());
			}

			let url = self.url_for(route)?;
			let mut request = self
				.http_client
				.request(method.into(), url)
				.header(ACCEPT, "application/json")
				.header(CONTENT_TYPE, "application/json")
				.bearer_auth(self.token.expose());

			if let Some(body) = &body {
				request = request.json(body);
			}

			let response = request.send().await.map_err(ResponseError::from)?;

			Ok(http::read_response(response).await?)
		})
		.await
	}
}
impl Debug for PixClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PixClient")
			.field("pix_key", &self.pix_key)
			.field("base_url", &self.base_url.as_str())
			.field("token", &self.token)
			.finish()
	}
}

/// Builder for [`PixClient`].
#[derive(Default)]
pub struct PixClientBuilder {
	pix_key: Option<String>,
	token: Option<Secret>,
	identity: Option<ClientIdentity>,
	certificate_pem: Option<Vec<u8>>,
	private_key_pem: Option<Vec<u8>>,
	base_url: Option<Url>,
	http_client: Option<PixHttpClient>,
}
impl PixClientBuilder {
	/// Sets the Pix key; required alongside a caller-supplied token.
	pub fn pix_key(mut self, pix_key: impl Into<String>) -> Self {
		self.pix_key = Some(pix_key.into());

		self
	}

	/// Sets the bearer token presented on every call.
	pub fn bearer_token(mut self, token: impl Into<Secret>) -> Self {
		self.token = Some(token.into());

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

	/// Overrides the API base URL (defaults to production).
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Reuses a caller-provided transport instead of building one from the identity.
	pub fn http_client(mut self, http_client: PixHttpClient) -> Self {
		self.http_client = Some(http_client);

		self
	}

	/// Validates the fields and builds the client.
	pub fn build(self) -> Result<PixClient, ConfigError> {
		let token = self
			.token
			.filter(|token| !token.is_blank())
			.ok_or(ConfigError::MissingField { field: "token" })?;
		let identity = match self.identity {
			Some(identity) => identity,
			None => ClientIdentity::from_pem(
				self.certificate_pem.ok_or(ConfigError::MissingField { field: "certificate" })?,
				self.private_key_pem.ok_or(ConfigError::MissingField { field: "private_key" })?,
			)?,
		};
		let pix_key = self
			.pix_key
			.filter(|key| !key.trim().is_empty())
			.ok_or(ConfigError::MissingField { field: "pix_key" })?;
		let base_url = self.base_url.unwrap_or_else(|| PixEndpoints::default().api_base);

		endpoint::validate_endpoint("api base", &base_url)?;

		let http_client = match self.http_client {
			Some(http_client) => http_client,
			None => PixHttpClient::from_identity(&identity)?,
		};

		Ok(PixClient { pix_key: Some(pix_key), base_url, token, http_client })
	}
}

fn to_json<B>(body: &B) -> Result<Value, ConfigError>
where
	B: ?Sized + Serialize,
{
	Ok(serde_json::to_value(body)?)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{TEST_CERTIFICATE_PEM, TEST_PRIVATE_KEY_PEM, test_identity},
		endpoint::API_BASE_URL,
		error::Error,
	};

	fn client() -> PixClient {
		PixClient::builder()
			.pix_key("pix@example.com")
			.bearer_token("t1")
			.identity(test_identity())
			.build()
			.expect("Client fixture should build.")
	}

	#[test]
	fn routes_are_appended_to_the_base_path() {
		let client = client();

		assert_eq!(
			client.url_for("/cob/abc").expect("Route should resolve.").as_str(),
			format!("{API_BASE_URL}/cob/abc")
		);
		assert_eq!(
			client.url_for("cobv?inicio=2025-01-01").expect("Route should resolve.").as_str(),
			format!("{API_BASE_URL}/cobv?inicio=2025-01-01")
		);
	}

	#[test]
	fn only_write_verbs_accept_bodies() {
		assert!(ApiMethod::Post.accepts_body());
		assert!(ApiMethod::Put.accepts_body());
		assert!(ApiMethod::Patch.accepts_body());
		assert!(!ApiMethod::Get.accepts_body());
		assert!(!ApiMethod::Delete.accepts_body());
		assert_eq!(Method::from(ApiMethod::Patch), Method::PATCH);
	}

	#[test]
	fn builder_requires_token_identity_and_pix_key() {
		let err = PixClient::builder()
			.identity(test_identity())
			.build()
			.expect_err("Missing token must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "token" }));

		let err = PixClient::builder()
			.bearer_token("  ")
			.identity(test_identity())
			.build()
			.expect_err("Blank token must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "token" }));

		let err = PixClient::builder()
			.bearer_token("t1")
			.private_key_pem(TEST_PRIVATE_KEY_PEM)
			.build()
			.expect_err("Missing certificate must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "certificate" }));

		let err = PixClient::builder()
			.bearer_token("t1")
			.identity(test_identity())
			.build()
			.expect_err("Missing Pix key must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "pix_key" }));

		let err = PixClient::builder()
			.pix_key(" ")
			.bearer_token("t1")
			.identity(test_identity())
			.build()
			.expect_err("Blank Pix key must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "pix_key" }));

		let client = PixClient::builder()
			.pix_key("pix@example.com")
			.bearer_token("t1")
			.certificate_pem(TEST_CERTIFICATE_PEM)
			.private_key_pem(TEST_PRIVATE_KEY_PEM)
			.build()
			.expect("PEM pair should be accepted.");

		assert_eq!(client.pix_key(), Some("pix@example.com"));
		assert_eq!(client.base_url().as_str(), API_BASE_URL);
	}

	#[test]
	fn builder_rejects_plain_http_base() {
		let err = PixClient::builder()
			.pix_key("pix@example.com")
			.bearer_token("t1")
			.identity(test_identity())
			.base_url(Url::parse("http://127.0.0.1/pix").expect("Fixture URL should parse."))
			.build()
			.expect_err("Plain HTTP base URL must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { .. }));
	}

	#[test]
	fn debug_output_redacts_the_token() {
		let rendered = format!("{:?}", client());

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("\"t1\""));
	}

	#[tokio::test]
	async fn body_on_get_is_rejected_without_io() {
		let err = client()
			.request(ApiMethod::Get, "/cob", Some(serde_json::json!({ "a": 1 })))
			.await
			.expect_err("GET with a body must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::UnsupportedBody { method: "GET" })));
	}
}
