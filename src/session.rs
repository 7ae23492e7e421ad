//! Session contracts, the session cookie, and the built-in in-memory store.
//!
//! After a successful provider login the callback stores the account service's
//! [`LoginInfo`] (the session's `loginInfo`) under the browser's [`SessionId`]. The id
//! travels in the [`SESSION_COOKIE`] cookie; requests without one get a freshly minted id.

pub mod memory;

pub use memory::MemorySessionStore;

// crates.io
use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	account::LoginInfo,
	auth::{IdentifierError, SessionId},
};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "custom_oauth2.sid";

const SESSION_ID_LEN: usize = 32;

/// Future returned by [`SessionStore`] methods.
pub type SessionFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, SessionError>> + 'a + Send>>;

/// Storage backend contract for gateway sessions.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the record for `id`.
	fn save<'a>(&'a self, id: &'a SessionId, record: SessionRecord) -> SessionFuture<'a, ()>;

	/// Fetches the record for `id`, if present.
	fn load<'a>(&'a self, id: &'a SessionId) -> SessionFuture<'a, Option<SessionRecord>>;
}

/// Session contents written by the callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
	/// Login result returned by the account service.
	pub login_info: LoginInfo,
	/// Instant the login info was stored.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl SessionRecord {
	/// Creates a record stamped with the current time.
	pub fn new(login_info: LoginInfo) -> Self {
		Self { login_info, updated_at: OffsetDateTime::now_utc() }
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SessionError {
	/// Serialization failures surfaced by the backend.
	#[error("Session serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Session backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Reads the session id from the request cookies.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<SessionId> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(name, _)| *name == SESSION_COOKIE)
		.and_then(|(_, value)| SessionId::new(value.trim()).ok())
}

/// Mints a random alphanumeric session id.
pub fn generate_session_id() -> Result<SessionId, IdentifierError> {
	let raw: String =
		rand::rng().sample_iter(Alphanumeric).take(SESSION_ID_LEN).map(char::from).collect();

	SessionId::new(raw)
}

/// `Set-Cookie` value binding the browser to `id`; `secure` adds the `Secure` attribute.
pub fn session_cookie(id: &SessionId, secure: bool) -> Option<HeaderValue> {
	let mut cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");

	if secure {
		cookie.push_str("; Secure");
	}

	HeaderValue::from_str(&cookie).ok()
}
