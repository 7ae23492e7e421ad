//! Provider registration on the gateway router.

// crates.io
use axum::Router;
// self
use crate::{
	_prelude::*,
	account::AccountService,
	auth::ProviderId,
	config::{GatewaySettings, ProviderEnv},
	http::ProviderHttpClient,
	obs::log_event,
	routes::CustomProvider,
	session::SessionStore,
	strategy::{CustomStrategy, IdentityExtractor},
};

/// Identifier under which the custom provider registers.
pub const CUSTOM_PROVIDER_ID: &str = "custom";

/// Gateway router that providers register their routes on.
pub struct AuthRouter {
	router: Router,
	settings: GatewaySettings,
	accounts: Arc<dyn AccountService>,
	sessions: Arc<dyn SessionStore>,
	http_client: Option<ProviderHttpClient>,
	extractor: Option<Arc<dyn IdentityExtractor>>,
	providers: Vec<ProviderId>,
}
impl AuthRouter {
	/// Creates an empty router bound to the gateway settings and collaborators.
	pub fn new(
		settings: GatewaySettings,
		accounts: Arc<dyn AccountService>,
		sessions: Arc<dyn SessionStore>,
	) -> Self {
		Self {
			router: Router::new(),
			settings,
			accounts,
			sessions,
			http_client: None,
			extractor: None,
			providers: Vec::new(),
		}
	}

	/// Reuses `http_client` for provider calls instead of building a fresh one.
	pub fn with_http_client(mut self, http_client: ProviderHttpClient) -> Self {
		self.http_client = Some(http_client);

		self
	}

	/// Replaces the configured field mapping with a custom identity extractor.
	pub fn with_identity_extractor(mut self, extractor: Arc<dyn IdentityExtractor>) -> Self {
		self.extractor = Some(extractor);

		self
	}

	/// Registers the custom provider when its configuration is complete.
	///
	/// Returns `Ok(None)` and installs no routes when a required variable is missing. On success
	/// `GET /auth/custom` and `GET /auth/custom/callback` are mounted and the provider id is
	/// returned.
	pub fn register_custom(&mut self, env: &ProviderEnv) -> Result<Option<ProviderId>> {
		let Some(config) = env.resolve(&self.settings.accounts_url)? else {
			return Ok(None);
		};
		let provider_id = ProviderId::new(CUSTOM_PROVIDER_ID)?;
		let http_client = match &self.http_client {
			Some(http_client) => http_client.clone(),
			None => ProviderHttpClient::new()?,
		};
		let mut strategy = CustomStrategy::new(config, http_client);

		if let Some(extractor) = &self.extractor {
			strategy = strategy.with_extractor(extractor.clone());
		}

		let provider = Arc::new(CustomProvider::new(
			strategy,
			self.settings.clone(),
			self.accounts.clone(),
			self.sessions.clone(),
		));
		let router = std::mem::take(&mut self.router);

		self.router = router.merge(provider.into_router());
		self.providers.push(provider_id.clone());

		log_event!(info, provider = CUSTOM_PROVIDER_ID, "provider registered");

		Ok(Some(provider_id))
	}

	/// Identifiers of the providers registered so far.
	pub fn providers(&self) -> &[ProviderId] {
		&self.providers
	}

	/// Consumes the registry and returns the assembled router.
	pub fn into_router(self) -> Router {
		self.router
	}
}
impl Debug for AuthRouter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthRouter")
			.field("settings", &self.settings)
			.field("providers", &self.providers)
			.finish_non_exhaustive()
	}
}
