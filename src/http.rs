//! Transport shared by token exchanges and profile requests.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::ConfigError};

/// Future handed to the `oauth2` crate by [`ProviderHttpClient`].
pub type ExchangeFuture<'c> = Pin<
	Box<
		dyn Future<Output = Result<HttpResponse, HttpClientError<ReqwestError>>>
			+ 'c
			+ Send
			+ Sync,
	>,
>;

/// Shared HTTP client used for every provider call.
///
/// Token endpoints must answer directly, so the default client never follows redirects.
/// Supply a custom client through [`ProviderHttpClient::with_client`] with the same policy.
#[derive(Clone, Debug)]
pub struct ProviderHttpClient(ReqwestClient);
impl ProviderHttpClient {
	/// Builds the default client.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Returns the underlying reqwest client.
	pub fn client(&self) -> &ReqwestClient {
		&self.0
	}
}
impl<'c> AsyncHttpClient<'c> for ProviderHttpClient {
	type Error = HttpClientError<ReqwestError>;
	type Future = ExchangeFuture<'c>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			let request: reqwest::Request = request.try_into().map_err(Box::new)?;
			let response = self.0.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(Box::new)?;
			let mut exchanged = HttpResponse::new(body.to_vec());

			*exchanged.status_mut() = status;
			*exchanged.headers_mut() = headers;

			Ok(exchanged)
		})
	}
}
