//! User profile retrieval.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::Secret, error::ProfileFetchError, http::ProviderHttpClient};

/// Untyped profile payload returned by the provider's user-info endpoint.
///
/// No schema is enforced: fields are looked up by name and any of them may be missing.
/// Payloads that are not JSON objects behave as an empty profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(Value);
impl Profile {
	/// Wraps a raw JSON payload.
	pub fn new(raw: Value) -> Self {
		Self(raw)
	}

	/// Returns the field stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields()?.get(key)
	}

	/// Returns the field stored under `key` when it is a JSON string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// Returns the field stored under `key` rendered as text when it is a string, number, or
	/// boolean.
	pub fn get_scalar(&self, key: &str) -> Option<String> {
		match self.get(key)? {
			Value::String(value) => Some(value.clone()),
			Value::Number(value) => Some(value.to_string()),
			Value::Bool(value) => Some(value.to_string()),
			_ => None,
		}
	}

	/// Returns the payload as a key-value map, if it is an object.
	pub fn fields(&self) -> Option<&Map<String, Value>> {
		self.0.as_object()
	}

	/// Returns the raw payload.
	pub fn raw(&self) -> &Value {
		&self.0
	}
}

/// Performs one `GET profile_url` with `Authorization: Bearer <access_token>`.
pub async fn fetch_profile(
	http_client: &ProviderHttpClient,
	profile_url: &Url,
	access_token: &Secret,
) -> Result<Profile, ProfileFetchError> {
	let url = profile_url.to_string();
	let response = http_client
		.client()
		.get(profile_url.clone())
		.bearer_auth(access_token.expose())
		.header(reqwest::header::ACCEPT, "application/json")
		.send()
		.await
		.map_err(|source| ProfileFetchError::Request { url: url.clone(), source })?;
	let status = response.status();

	if !status.is_success() {
		return Err(ProfileFetchError::Status { url, status: status.as_u16() });
	}

	let body = response
		.bytes()
		.await
		.map_err(|source| ProfileFetchError::Request { url: url.clone(), source })?;
	let raw = serde_json::from_slice(&body)
		.map_err(|source| ProfileFetchError::Decode { url, source })?;

	Ok(Profile::new(raw))
}
