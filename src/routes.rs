//! HTTP handlers for the custom provider.
//!
//! `GET /auth/custom` packs the invite id and the host's branding key into the OAuth `state`
//! and redirects to the provider. `GET /auth/custom/callback` runs in two stages:
//!
//! 1. Decode the state, pick the branding-aware failure page, exchange the code, and fetch the
//!    profile. Any provider-side failure redirects to `<front>/login`.
//! 2. Extract the identity and hand it to the account service, store the login result in the
//!    session, and redirect to `<front>/login/auth`. A profile without an email is ignored, and
//!    failures here are logged and swallowed. In both cases the request falls through
//!    unhandled (`404 Not Found`) without a redirect.

// crates.io
use axum::{
	Router,
	extract::{Query, State, rejection::QueryRejection},
	http::{
		HeaderMap, StatusCode,
		header::{LOCATION, SET_COOKIE},
	},
	response::{IntoResponse, Response},
	routing::get,
};
// self
use crate::{
	_prelude::*,
	account::{AccountService, ProviderLogin},
	branding,
	config::{CALLBACK_PATH, GatewaySettings, START_PATH, concat_link},
	obs::{self, FlowSpan, LoginOutcome, LoginStage, log_event},
	profile::Profile,
	session::{self, SessionRecord, SessionStore},
	state::{self, AuthState},
	strategy::CustomStrategy,
};

/// Query accepted by the start route.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuery {
	/// Invite being accepted through this login.
	pub invite_id: Option<String>,
}

/// Query the provider sends back to the callback route.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CallbackQuery {
	/// Authorization code.
	pub code: Option<String>,
	/// Opaque state produced by the start route.
	pub state: Option<String>,
	/// OAuth error code when the provider refused the request.
	pub error: Option<String>,
	/// Human-readable companion of `error`.
	pub error_description: Option<String>,
}

/// Everything the handlers share for one registered provider.
pub struct CustomProvider {
	strategy: CustomStrategy,
	gateway: GatewaySettings,
	accounts: Arc<dyn AccountService>,
	sessions: Arc<dyn SessionStore>,
}
impl CustomProvider {
	/// Bundles the strategy with the gateway settings and collaborators.
	pub fn new(
		strategy: CustomStrategy,
		gateway: GatewaySettings,
		accounts: Arc<dyn AccountService>,
		sessions: Arc<dyn SessionStore>,
	) -> Self {
		Self { strategy, gateway, accounts, sessions }
	}

	/// Strategy used for the OAuth exchange.
	pub fn strategy(&self) -> &CustomStrategy {
		&self.strategy
	}

	/// Builds the axum router serving both routes.
	pub fn into_router(self: Arc<Self>) -> Router {
		Router::new()
			.route(START_PATH, get(start_handler))
			.route(CALLBACK_PATH, get(callback_handler))
			.with_state(self)
	}

	fn front_url(&self, branding_key: Option<&str>) -> &str {
		self.gateway.brandings.front_or(branding_key, &self.gateway.front_url)
	}

	fn start(&self, headers: &HeaderMap, query: StartQuery) -> Response {
		log_event!(info, provider = "custom", "try auth via");

		let branding = branding::request_host(headers)
			.and_then(|host| self.gateway.brandings.for_host(host))
			.and_then(|branding| branding.key.clone());
		let auth_state = AuthState { invite_id: query.invite_id, branding };
		let url = self.strategy.authorize_url(&state::encode(&auth_state));

		obs::record_login_outcome(LoginStage::Start, LoginOutcome::Success);

		found(url.as_str())
	}

	async fn callback(&self, headers: &HeaderMap, query: CallbackQuery) -> Response {
		let auth_state = state::decode(query.state.as_deref());

		log_event!(info, state = ?auth_state, "Auth state");

		let front = self.front_url(auth_state.branding.as_deref());

		log_event!(info, front, "With branding");

		let failure_redirect = concat_link(front, "/login");

		log_event!(info, failure_redirect = %failure_redirect, "With failure redirect");
		obs::record_login_outcome(LoginStage::Exchange, LoginOutcome::Attempt);

		let profile = match self.authenticate(&query).await {
			Ok(profile) => profile,
			Err(err) => {
				if matches!(err, Error::InvalidClient { .. } | Error::Config(_)) {
					log_event!(
						error,
						error = %err,
						provider = "custom",
						"Provider rejected the gateway"
					);
				} else {
					log_event!(warn, error = %err, provider = "custom", "Provider auth failed");
				}

				obs::record_login_outcome(LoginStage::Exchange, LoginOutcome::Failure);

				return found(&failure_redirect);
			},
		};

		obs::record_login_outcome(LoginStage::Exchange, LoginOutcome::Success);

		let span = FlowSpan::new(LoginStage::Link);

		span.instrument(self.complete(headers, &query, profile)).await
	}

	async fn authenticate(&self, query: &CallbackQuery) -> Result<Profile> {
		if let Some(error) = &query.error {
			let reason = match &query.error_description {
				Some(description) => format!("{error}: {description}"),
				None => error.clone(),
			};

			return Err(Error::InvalidGrant { reason });
		}

		let code = query
			.code
			.as_deref()
			.ok_or_else(|| Error::InvalidGrant { reason: "missing authorization code".into() })?;

		self.strategy.authenticate(code).await
	}

	async fn complete(
		&self,
		headers: &HeaderMap,
		query: &CallbackQuery,
		profile: Profile,
	) -> Response {
		log_event!(info, provider = "custom", user = ?profile.raw(), "Provider auth success");

		let identity = self.strategy.extract_identity(&profile);

		log_event!(info, email = ?identity.email, provider = "custom", "Provider auth handler");

		let Some(email) = identity.email else {
			obs::record_login_outcome(LoginStage::Link, LoginOutcome::Skipped);

			return fall_through();
		};

		obs::record_login_outcome(LoginStage::Link, LoginOutcome::Attempt);

		match self.link(headers, query, email, identity.name).await {
			Ok(response) => {
				obs::record_login_outcome(LoginStage::Link, LoginOutcome::Success);

				response
			},
			Err(err) => {
				log_event!(
					error,
					error = %err,
					provider = "custom",
					user = ?profile.raw(),
					"failed to auth"
				);
				obs::record_login_outcome(LoginStage::Link, LoginOutcome::Failure);

				fall_through()
			},
		}
	}

	async fn link(
		&self,
		headers: &HeaderMap,
		query: &CallbackQuery,
		email: String,
		name: Option<String>,
	) -> Result<Response> {
		let auth_state = state::decode(query.state.as_deref());
		let front = self.front_url(auth_state.branding.as_deref());
		let login = ProviderLogin::new(&self.gateway.product_id, email, name);

		#[cfg(feature = "tracing")]
		let email = login.email.clone();

		let login_info = match auth_state.invite() {
			Some(invite_id) => self.accounts.join_with_provider(login, invite_id).await?,
			None => self.accounts.login_with_provider(login).await?,
		};
		let (session_id, minted) = match session::session_id_from_headers(headers) {
			Some(id) => (id, false),
			None => (session::generate_session_id()?, true),
		};

		self.sessions.save(&session_id, SessionRecord::new(login_info)).await?;

		log_event!(info, email = %email, provider = "custom", "Success auth, redirect");

		let mut response = found(&concat_link(front, "/login/auth"));
		let secure = self.strategy.config().callback_url.scheme() == "https";

		if minted && let Some(cookie) = session::session_cookie(&session_id, secure) {
			response.headers_mut().append(SET_COOKIE, cookie);
		}

		Ok(response)
	}
}
impl Debug for CustomProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CustomProvider")
			.field("strategy", &self.strategy)
			.field("gateway", &self.gateway)
			.finish_non_exhaustive()
	}
}

/// Starts the authorization redirect.
pub async fn start_handler(
	State(provider): State<Arc<CustomProvider>>,
	headers: HeaderMap,
	query: Result<Query<StartQuery>, QueryRejection>,
) -> Response {
	let span = FlowSpan::new(LoginStage::Start);
	let query = query_or_default(query);

	span.instrument(async move { provider.start(&headers, query) }).await
}

/// Handles the provider redirect.
pub async fn callback_handler(
	State(provider): State<Arc<CustomProvider>>,
	headers: HeaderMap,
	query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Response {
	let span = FlowSpan::new(LoginStage::Exchange);
	let query = query_or_default(query);

	span.instrument(async move { provider.callback(&headers, query).await }).await
}

/// Unparsable queries (repeated keys, bad encoding) are treated as empty.
fn query_or_default<T>(query: Result<Query<T>, QueryRejection>) -> T
where
	T: Default,
{
	match query {
		Ok(Query(query)) => query,
		Err(rejection) => {
			log_event!(warn, error = %rejection, provider = "custom", "Ignoring malformed query");

			T::default()
		},
	}
}

fn found(location: &str) -> Response {
	(StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

fn fall_through() -> Response {
	StatusCode::NOT_FOUND.into_response()
}
