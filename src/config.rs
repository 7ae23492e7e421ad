//! Provider configuration loaded once at startup.
//!
//! [`ProviderEnv`] mirrors the raw `OAUTH2_*` environment variables and is read exactly once
//! (via [`ProviderEnv::from_env`]) before registration. [`ProviderEnv::resolve`] turns it into
//! an immutable [`ProviderConfig`], or reports that the provider is unavailable when any
//! required variable is missing. [`GatewaySettings`] carries the host-side values the
//! handlers need (accounts URL, default front URL, product id, brandings).

// self
use crate::{_prelude::*, auth::Secret, branding::BrandingMap, error::ConfigError};

/// Route that starts the authorization redirect.
pub const START_PATH: &str = "/auth/custom";
/// Route the provider redirects back to.
pub const CALLBACK_PATH: &str = "/auth/custom/callback";

const DEFAULT_EMAIL_KEY: &str = "email";
const DEFAULT_NAME_KEY: &str = "name";

/// Raw provider settings as found in the process environment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEnv {
	/// `OAUTH2_AUTHORIZATION_URL`.
	pub authorization_url: Option<String>,
	/// `OAUTH2_TOKEN_URL`.
	pub token_url: Option<String>,
	/// `OAUTH2_CLIENT_ID`.
	pub client_id: Option<String>,
	/// `OAUTH2_CLIENT_SECRET`.
	pub client_secret: Option<String>,
	/// `OAUTH2_SCOPE`, empty when unset.
	pub scope: String,
	/// `OAUTH2_USER_INFO_URL`.
	pub user_info_url: Option<String>,
	/// `OAUTH2_EMAIL_KEY`, `email` when unset.
	pub email_key: String,
	/// `OAUTH2_NAME_KEY`, `name` when unset.
	pub name_key: String,
}
impl ProviderEnv {
	/// Reads the `OAUTH2_*` variables from the process environment.
	pub fn from_env() -> Self {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds the settings from an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		Self {
			authorization_url: lookup("OAUTH2_AUTHORIZATION_URL"),
			token_url: lookup("OAUTH2_TOKEN_URL"),
			client_id: lookup("OAUTH2_CLIENT_ID"),
			client_secret: lookup("OAUTH2_CLIENT_SECRET"),
			scope: lookup("OAUTH2_SCOPE").unwrap_or_default(),
			user_info_url: lookup("OAUTH2_USER_INFO_URL"),
			email_key: lookup("OAUTH2_EMAIL_KEY").unwrap_or_else(|| DEFAULT_EMAIL_KEY.into()),
			name_key: lookup("OAUTH2_NAME_KEY").unwrap_or_else(|| DEFAULT_NAME_KEY.into()),
		}
	}

	/// Resolves the settings against the accounts service URL.
	///
	/// Returns `Ok(None)` when any of the authorization URL, token URL, client id, client
	/// secret, or user-info URL is missing. Present but unparsable URLs are an error.
	pub fn resolve(&self, accounts_url: &str) -> Result<Option<ProviderConfig>, ConfigError> {
		let (
			Some(authorization_url),
			Some(token_url),
			Some(client_id),
			Some(client_secret),
			Some(user_info_url),
		) = (
			self.authorization_url.as_deref(),
			self.token_url.as_deref(),
			self.client_id.as_deref(),
			self.client_secret.as_deref(),
			self.user_info_url.as_deref(),
		)
		else {
			return Ok(None);
		};
		let callback_url = concat_link(accounts_url, CALLBACK_PATH);

		Ok(Some(ProviderConfig {
			authorization_url: parse_url("OAUTH2_AUTHORIZATION_URL", authorization_url)?,
			token_url: parse_url("OAUTH2_TOKEN_URL", token_url)?,
			client_id: client_id.to_owned(),
			client_secret: Secret::new(client_secret),
			scope: self.scope.clone(),
			user_info_url: parse_url("OAUTH2_USER_INFO_URL", user_info_url)?,
			callback_url: parse_url("callback", &callback_url)?,
			fields: ProfileFields {
				email_key: self.email_key.clone(),
				name_key: self.name_key.clone(),
			},
		}))
	}
}

/// Profile keys holding the email address and display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
	/// Key of the email address.
	pub email_key: String,
	/// Key of the display name.
	pub name_key: String,
}
impl Default for ProfileFields {
	fn default() -> Self {
		Self { email_key: DEFAULT_EMAIL_KEY.into(), name_key: DEFAULT_NAME_KEY.into() }
	}
}

/// Immutable, fully specified provider configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
	/// Provider authorization endpoint.
	pub authorization_url: Url,
	/// Provider token endpoint.
	pub token_url: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Scope string forwarded verbatim; omitted from requests when empty.
	pub scope: String,
	/// Endpoint returning the user profile for a bearer token.
	pub user_info_url: Url,
	/// Absolute URL of the callback route.
	pub callback_url: Url,
	/// Profile field mapping.
	pub fields: ProfileFields,
}

/// Host-side settings shared by every registered provider.
#[derive(Clone, Debug)]
pub struct GatewaySettings {
	/// Public base URL of the accounts service hosting the routes.
	pub accounts_url: String,
	/// Front-end URL used when no branding applies.
	pub front_url: String,
	/// Product identifier forwarded to the account service.
	pub product_id: String,
	/// Branding table keyed by request host.
	pub brandings: BrandingMap,
}
impl GatewaySettings {
	/// Creates settings without any branding.
	pub fn new(
		accounts_url: impl Into<String>,
		front_url: impl Into<String>,
		product_id: impl Into<String>,
	) -> Self {
		Self {
			accounts_url: accounts_url.into(),
			front_url: front_url.into(),
			product_id: product_id.into(),
			brandings: BrandingMap::default(),
		}
	}

	/// Replaces the branding table.
	pub fn with_brandings(mut self, brandings: BrandingMap) -> Self {
		self.brandings = brandings;

		self
	}
}

/// Joins a base URL and a path with exactly one `/` between them.
pub fn concat_link(base: &str, path: &str) -> String {
	match (base.ends_with('/'), path.starts_with('/')) {
		(true, true) => format!("{base}{}", &path[1..]),
		(false, false) if !path.is_empty() => format!("{base}/{path}"),
		_ => format!("{base}{path}"),
	}
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
		name,
		value: value.to_owned(),
		source,
	})
}
