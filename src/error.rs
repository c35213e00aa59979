//! Client-level error types shared by the token issuer, the API caller, and configuration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// HTTP status reported by every [`ResponseError`], regardless of the underlying cause.
pub const RESPONSE_ERROR_STATUS: u16 = 401;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected before any network call.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Remote call failed (transport failure, rejection, or unusable payload).
	#[error(transparent)]
	Response(#[from] ResponseError),
}
impl Error {
	/// Returns the wrapped [`ResponseError`], if any.
	pub fn as_response(&self) -> Option<&ResponseError> {
		match self {
			Self::Response(e) => Some(e),
			Self::Config(_) => None,
		}
	}

	/// Returns the wrapped [`ConfigError`], if any.
	pub fn as_config(&self) -> Option<&ConfigError> {
		match self {
			Self::Config(e) => Some(e),
			Self::Response(_) => None,
		}
	}
}

/// Configuration and validation failures raised synchronously, never retried.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required credential or request field is missing or empty.
	#[error("Required field `{field}` is missing or empty.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// Both a JWT key identifier and a client secret were supplied.
	#[error("Credentials must select exactly one of `kid` (JWT bearer) or `client_secret`.")]
	AmbiguousVariant,
	/// Private key cannot be used as an RS256 signing key.
	#[error("Private key is not a usable RSA PEM key.")]
	InvalidPrivateKey {
		/// Underlying key parsing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Certificate and private key cannot be loaded as a TLS client identity.
	#[error("Certificate and private key do not form a valid TLS client identity.")]
	InvalidIdentity {
		/// Underlying identity parsing failure.
		#[source]
		source: ReqwestError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Route cannot be appended to the API base URL.
	#[error("Route `{route}` does not form a valid URL.")]
	InvalidRoute {
		/// Route supplied by the caller.
		route: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// No bearer token has been obtained yet.
	#[error("No bearer token is available; run a token exchange first.")]
	MissingToken,
	/// A request body was supplied for a verb that does not carry one.
	#[error("The {method} method does not accept a request body.")]
	UnsupportedBody {
		/// HTTP method label.
		method: &'static str,
	},
	/// Assertion lifetime is not positive or pushes the expiry past the representable range.
	#[error("Assertion lifetime of {seconds} seconds is not usable.")]
	InvalidLifetime {
		/// Requested lifetime, in whole seconds.
		seconds: i64,
	},
	/// JWT assertion signing failed.
	#[error("JWT assertion could not be signed.")]
	Signing {
		/// Underlying signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Reading credential material from disk failed.
	#[error("Failed to read credential material.")]
	Io(#[from] std::io::Error),
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	SerializeBody(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Classifies the cause behind a [`ResponseError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseErrorKind {
	/// TLS handshake failure, refused connection, timeout, or another transport fault.
	Transport,
	/// Remote server answered with a non-2xx status.
	RemoteRejection,
	/// Remote server answered 2xx with a body that could not be decoded.
	MalformedPayload,
}
impl ResponseErrorKind {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Transport => "transport",
			Self::RemoteRejection => "remote_rejection",
			Self::MalformedPayload => "malformed_payload",
		}
	}
}
impl Display for ResponseErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Details attached to a [`ResponseError`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
	/// Remote JSON body, verbatim.
	Body(Value),
	/// Raw text: a non-JSON remote body or the transport error message.
	Text(String),
}
impl ErrorDetails {
	/// Interprets a raw remote body, preferring JSON when it parses.
	pub fn from_body(body: &str) -> Self {
		match serde_json::from_str::<Value>(body) {
			Ok(value) => Self::Body(value),
			Err(_) => Self::Text(body.to_owned()),
		}
	}

	/// Returns the JSON body, if the details carry one.
	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Self::Body(value) => Some(value),
			Self::Text(_) => None,
		}
	}

	/// Returns the raw text, if the details carry text.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Body(_) => None,
			Self::Text(text) => Some(text),
		}
	}
}
impl Display for ErrorDetails {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Body(value) => write!(f, "{value}"),
			Self::Text(text) => f.write_str(text),
		}
	}
}

/// Failure from a remote HTTP call, reported with a fixed status of 401.
///
/// `status` is always [`RESPONSE_ERROR_STATUS`] so callers that only inspect it see the same
/// shape for every failure. `code` carries the remote HTTP status when a response arrived and
/// falls back to 401 for transport failures; `kind` tells the causes apart.
#[derive(Clone, Debug, ThisError)]
#[error("Remote call failed ({kind}, code {code}){}: {details}", at_path(.path))]
pub struct ResponseError {
	/// Remote HTTP status, or 401 when no response was received.
	pub code: u16,
	/// Always [`RESPONSE_ERROR_STATUS`].
	pub status: u16,
	/// Cause classification.
	pub kind: ResponseErrorKind,
	/// Remote body or transport message.
	pub details: ErrorDetails,
	/// JSON path that failed to decode, for [`ResponseErrorKind::MalformedPayload`].
	pub path: Option<String>,
}
impl ResponseError {
	/// Builds an error for a transport-level failure.
	pub fn transport(message: impl Into<String>) -> Self {
		Self {
			code: RESPONSE_ERROR_STATUS,
			status: RESPONSE_ERROR_STATUS,
			kind: ResponseErrorKind::Transport,
			details: ErrorDetails::Text(message.into()),
			path: None,
		}
	}

	/// Builds a transport error for a response whose status `code` arrived but whose body could
	/// not be read.
	pub fn interrupted(code: u16, message: impl Into<String>) -> Self {
		Self { code, ..Self::transport(message) }
	}

	/// Builds an error for a non-2xx response carrying `body`.
	pub fn rejected(code: u16, body: &str) -> Self {
		Self {
			code,
			status: RESPONSE_ERROR_STATUS,
			kind: ResponseErrorKind::RemoteRejection,
			details: ErrorDetails::from_body(body),
			path: None,
		}
	}

	/// Builds an error for a 2xx response whose body could not be decoded.
	pub fn malformed(code: u16, body: &str) -> Self {
		Self {
			code,
			status: RESPONSE_ERROR_STATUS,
			kind: ResponseErrorKind::MalformedPayload,
			details: ErrorDetails::from_body(body),
			path: None,
		}
	}

	/// Builds a [`ResponseErrorKind::MalformedPayload`] error that names the failing JSON path.
	pub fn undecodable(
		code: u16,
		body: &str,
		e: &serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		Self { path: Some(e.path().to_string()), ..Self::malformed(code, body) }
	}
}
impl From<ReqwestError> for ResponseError {
	fn from(e: ReqwestError) -> Self {
		Self::transport(e.to_string())
	}
}

fn at_path(path: &Option<String>) -> String {
	path.as_ref().map(|path| format!(" at `{path}`")).unwrap_or_default()
}
