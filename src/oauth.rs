//! Authorization-code exchange on top of the `oauth2` crate.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::ProviderConfig,
	error::{ConfigError, TransientError, TransportError},
	http::ProviderHttpClient,
};

type TokenOnlyClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Token-endpoint client for the configured provider.
pub struct CodeExchange {
	oauth_client: TokenOnlyClient,
	http_client: ProviderHttpClient,
}
impl CodeExchange {
	/// Builds the exchange client from the provider configuration.
	///
	/// Client credentials travel in the request body, the way most custom providers expect.
	pub fn from_config(config: &ProviderConfig, http_client: ProviderHttpClient) -> Self {
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_token_uri(TokenUrl::from_url(config.token_url.clone()))
			.set_redirect_uri(RedirectUrl::from_url(config.callback_url.clone()))
			.set_auth_type(AuthType::RequestBody);

		Self { oauth_client, http_client }
	}

	/// Exchanges an authorization code for an access token.
	pub async fn exchange_code(&self, code: &str) -> Result<Secret> {
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&self.http_client)
			.await
			.map_err(map_request_error)?;

		Ok(Secret::new(response.access_token().secret().to_owned()))
	}
}
impl Debug for CodeExchange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CodeExchange").finish_non_exhaustive()
	}
}

fn map_request_error(err: BasicRequestTokenError<HttpClientError<ReqwestError>>) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) =>
			TransientError::TokenResponseParse { source }.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint { message }.into(),
	}
}

/// `invalid_grant`/`access_denied` are the user's problem; `invalid_client` and
/// `unauthorized_client` mean the gateway's credentials are wrong.
fn map_server_response_error(response: BasicErrorResponse) -> Error {
	let code = response.error().as_ref().to_ascii_lowercase();
	let reason = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code.clone(),
	};

	match code.as_str() {
		"invalid_grant" | "access_denied" => Error::InvalidGrant { reason },
		"invalid_client" | "unauthorized_client" => Error::InvalidClient { reason },
		_ => TransientError::TokenEndpoint { message: reason }.into(),
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) if inner.is_builder() => ConfigError::from(*inner).into(),
		HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			TransientError::TokenEndpoint { message: format!("HTTP client error: {message}") }
				.into(),
		_ => TransientError::TokenEndpoint { message: "HTTP client error".into() }.into(),
	}
}
