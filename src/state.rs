//! Auth state carried through the provider redirect.
//!
//! The start route serializes [`AuthState`] to JSON and percent-encodes it into the OAuth
//! `state` parameter; the provider echoes it back to the callback untouched. Decoding fails
//! open: an absent or corrupted value degrades to [`AuthState::default`] so losing the
//! invite/branding context never blocks a login.

// self
use crate::_prelude::*;

/// Context preserved across the authorization redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
	/// Workspace invite being accepted, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub invite_id: Option<String>,
	/// Branding key resolved from the requesting host.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub branding: Option<String>,
}
impl AuthState {
	/// Returns the invite id when it is present and non-empty.
	pub fn invite(&self) -> Option<&str> {
		self.invite_id.as_deref().filter(|invite| !invite.is_empty())
	}
}

/// Percent-encodes the JSON form of `state`.
pub fn encode(state: &AuthState) -> String {
	// Serializing two optional strings cannot fail.
	let json = serde_json::to_string(state).unwrap_or_else(|_| "{}".into());

	urlencoding::encode(&json).into_owned()
}

/// Decodes a value produced by [`encode`], returning the default state on any failure.
pub fn decode(raw: Option<&str>) -> AuthState {
	let Some(raw) = raw else {
		return AuthState::default();
	};
	let Ok(json) = urlencoding::decode(raw) else {
		return AuthState::default();
	};

	serde_json::from_str(&json).unwrap_or_default()
}
