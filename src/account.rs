//! Contract of the external account-linking service.
//!
//! The gateway does not own accounts. After a successful provider login it forwards the
//! identity to an [`AccountService`], which either accepts a workspace invite
//! ([`AccountService::join_with_provider`]) or signs the user in
//! ([`AccountService::login_with_provider`]), and returns an opaque [`LoginInfo`].

// self
use crate::_prelude::*;

/// Future returned by [`AccountService`] methods.
pub type AccountFuture<'a, T> = Pin<Box<dyn Future<Output = AccountResult<T>> + 'a + Send>>;

/// Result alias for account-service calls.
pub type AccountResult<T> = std::result::Result<T, AccountError>;

/// Login request forwarded to the account service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLogin {
	/// Product the login belongs to.
	pub product_id: String,
	/// Provider kind; the custom provider always sends `None`.
	pub provider_kind: Option<String>,
	/// Email address from the provider profile.
	pub email: String,
	/// Display name from the provider profile.
	pub display_name: Option<String>,
	/// Placeholder credential; always the empty string for provider logins.
	pub placeholder: String,
}
impl ProviderLogin {
	/// Builds a provider login with the empty-string placeholder.
	pub fn new(
		product_id: impl Into<String>,
		email: impl Into<String>,
		display_name: Option<String>,
	) -> Self {
		Self {
			product_id: product_id.into(),
			provider_kind: None,
			email: email.into(),
			display_name,
			placeholder: String::new(),
		}
	}
}

/// Opaque login result kept in the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginInfo(serde_json::Value);
impl LoginInfo {
	/// Wraps the service's response.
	pub fn new(value: serde_json::Value) -> Self {
		Self(value)
	}

	/// Returns the raw value.
	pub fn as_value(&self) -> &serde_json::Value {
		&self.0
	}
}

/// Account-service failure.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AccountError {
	/// The service refused the request.
	#[error("Account service rejected the request: {message}.")]
	Rejected {
		/// Service-supplied message.
		message: String,
	},
	/// The service could not be reached.
	#[error("Account service is unavailable: {message}.")]
	Unavailable {
		/// Transport-level description.
		message: String,
	},
}

/// External account-linking collaborator.
///
/// Implementations own their datastore and must tolerate repeated calls with the same
/// email/invite pair; the gateway does not deduplicate.
pub trait AccountService
where
	Self: Send + Sync,
{
	/// Accepts `invite_id` on behalf of the provider identity.
	fn join_with_provider<'a>(
		&'a self,
		login: ProviderLogin,
		invite_id: &'a str,
	) -> AccountFuture<'a, LoginInfo>;

	/// Signs the provider identity in.
	fn login_with_provider(&self, login: ProviderLogin) -> AccountFuture<'_, LoginInfo>;
}
