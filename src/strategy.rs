//! OAuth2 strategy adapter for the custom provider.
//!
//! [`CustomStrategy`] owns the transport-level pieces of the authorization-code flow: it
//! builds the authorize URL, exchanges the returned code for an access token, and fetches the
//! profile exactly once with that token. The raw profile is handed back untouched.
//! Interpreting it is the job of an [`IdentityExtractor`], so the exchange stays decoupled from
//! the provider's profile schema.

// self
use crate::{
	_prelude::*,
	config::{ProfileFields, ProviderConfig},
	http::ProviderHttpClient,
	oauth::CodeExchange,
	profile::{self, Profile},
};

/// Identity fields the gateway needs from a profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Email address; logins without one are ignored.
	pub email: Option<String>,
	/// Display name.
	pub name: Option<String>,
}

/// Turns a raw provider profile into an [`Identity`].
pub trait IdentityExtractor: Send + Sync {
	/// Extracts the identity; missing fields stay `None`.
	fn extract_identity(&self, profile: &Profile) -> Identity;
}

/// Default extractor reading the configured email and name keys.
///
/// String, number, and boolean values are forwarded as text; `null`, arrays, and objects
/// count as absent. An empty email counts as absent too.
#[derive(Clone, Debug, Default)]
pub struct FieldMapping(pub ProfileFields);
impl IdentityExtractor for FieldMapping {
	fn extract_identity(&self, profile: &Profile) -> Identity {
		Identity {
			email: profile.get_scalar(&self.0.email_key).filter(|email| !email.is_empty()),
			name: profile.get_scalar(&self.0.name_key),
		}
	}
}

/// Authorization-code strategy bound to one provider configuration.
pub struct CustomStrategy {
	config: ProviderConfig,
	http_client: ProviderHttpClient,
	exchange: CodeExchange,
	extractor: Arc<dyn IdentityExtractor>,
}
impl CustomStrategy {
	/// Creates the strategy with the default [`FieldMapping`] extractor.
	pub fn new(config: ProviderConfig, http_client: ProviderHttpClient) -> Self {
		let extractor = Arc::new(FieldMapping(config.fields.clone()));
		let exchange = CodeExchange::from_config(&config, http_client.clone());

		Self { config, http_client, exchange, extractor }
	}

	/// Replaces the identity extractor.
	pub fn with_extractor(mut self, extractor: Arc<dyn IdentityExtractor>) -> Self {
		self.extractor = extractor;

		self
	}

	/// Provider configuration backing this strategy.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Builds the provider authorization URL carrying `state` verbatim.
	pub fn authorize_url(&self, state: &str) -> Url {
		let mut url = self.config.authorization_url.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("redirect_uri", self.config.callback_url.as_str());

		if !self.config.scope.is_empty() {
			pairs.append_pair("scope", &self.config.scope);
		}

		pairs.append_pair("state", state);
		pairs.append_pair("client_id", &self.config.client_id);

		drop(pairs);

		url
	}

	/// Exchanges `code` for an access token and fetches the profile with it.
	///
	/// Token-exchange and profile-fetch failures are both returned so the caller can take
	/// its failure path.
	pub async fn authenticate(&self, code: &str) -> Result<Profile> {
		let access_token = self.exchange.exchange_code(code).await?;
		let profile =
			profile::fetch_profile(&self.http_client, &self.config.user_info_url, &access_token)
				.await?;

		Ok(profile)
	}

	/// Extracts the identity from a fetched profile.
	pub fn extract_identity(&self, profile: &Profile) -> Identity {
		self.extractor.extract_identity(profile)
	}
}
impl Debug for CustomStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CustomStrategy")
			.field("config", &self.config)
			.field("exchange", &self.exchange)
			.finish_non_exhaustive()
	}
}
