//! Provider-level error types shared across configuration, OAuth exchanges, and handlers.

// self
use crate::_prelude::*;

/// Provider-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure at the token endpoint.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// User profile could not be fetched after a successful token exchange.
	#[error(transparent)]
	ProfileFetch(#[from] ProfileFetchError),
	/// Account-linking collaborator failure.
	#[error(transparent)]
	Account(#[from] crate::account::AccountError),
	/// Session store failure.
	#[error(transparent)]
	Session(#[from] crate::session::SessionError),
	/// Identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),

	/// Provider rejected the grant (denied consent, bad or reused code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or handler-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured endpoint is not a valid absolute URL.
	#[error("The {name} setting is not a valid URL: {value}.")]
	InvalidUrl {
		/// Setting that failed to parse.
		name: &'static str,
		/// Raw configured value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Unexpected answers from the token endpoint.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an error code outside the grant/client rejections.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or transport-supplied message summarizing the failure.
		message: String,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failure to retrieve the user profile with an issued access token.
#[derive(Debug, ThisError)]
pub enum ProfileFetchError {
	/// The request never produced a response.
	#[error("Profile request to {url} failed.")]
	Request {
		/// Profile endpoint that was called.
		url: String,
		/// Underlying transport failure.
		#[source]
		source: ReqwestError,
	},
	/// The profile endpoint answered with a non-success status.
	#[error("Profile endpoint {url} returned HTTP {status}.")]
	Status {
		/// Profile endpoint that was called.
		url: String,
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// The profile body was not valid JSON.
	#[error("Profile endpoint {url} returned a body that is not JSON.")]
	Decode {
		/// Profile endpoint that was called.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
}
