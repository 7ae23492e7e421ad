//! Per-host branding lookups.
//!
//! The gateway serves several white-labelled front ends. The start route resolves the
//! branding for the requesting host and carries its key through the auth state; the
//! callback finds the branding again by that key to pick the front-end URL it redirects to.

// crates.io
use axum::http::HeaderMap;
// self
use crate::_prelude::*;

/// Branding entry registered for one host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
	/// Key that identifies the branding across the redirect round trip.
	pub key: Option<String>,
	/// Front-end base URL for this branding.
	pub front: Option<String>,
}
impl Branding {
	/// Creates a branding identified by `key`.
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: Some(key.into()), front: None }
	}

	/// Sets the front-end base URL.
	pub fn with_front(mut self, front: impl Into<String>) -> Self {
		self.front = Some(front.into());

		self
	}
}

/// Branding table keyed by request host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandingMap(HashMap<String, Branding>);
impl BrandingMap {
	/// Registers (or replaces) the branding for `host`.
	pub fn insert(&mut self, host: impl Into<String>, branding: Branding) {
		self.0.insert(host.into(), branding);
	}

	/// Returns the branding registered for `host`.
	pub fn for_host(&self, host: &str) -> Option<&Branding> {
		self.0.get(host)
	}

	/// Finds the branding whose key equals `key`.
	pub fn by_key(&self, key: Option<&str>) -> Option<&Branding> {
		let key = key?;

		self.0.values().find(|branding| branding.key.as_deref() == Some(key))
	}

	/// Front-end URL for the branding identified by `key`, falling back to `default_front`.
	pub fn front_or<'a>(&'a self, key: Option<&str>, default_front: &'a str) -> &'a str {
		self.by_key(key).and_then(|branding| branding.front.as_deref()).unwrap_or(default_front)
	}
}

/// Extracts the request host, preferring the first `X-Forwarded-Host` entry.
pub fn request_host(headers: &HeaderMap) -> Option<&str> {
	if let Some(forwarded) = headers.get("x-forwarded-host").and_then(|h| h.to_str().ok())
		&& let Some(first) = forwarded.split(',').next().map(str::trim).filter(|h| !h.is_empty())
	{
		return Some(first);
	}

	headers.get(axum::http::header::HOST).and_then(|h| h.to_str().ok())
}
