//! Custom OAuth 2.0 identity provider for authentication gateways: env-driven registration,
//! opaque state round-trips, profile fetching, and account linking served over axum.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod account;
pub mod auth;
pub mod branding;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod profile;
pub mod register;
pub mod routes;
pub mod session;
pub mod state;
pub mod strategy;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use parking_lot::Mutex;
	// self
	use crate::{
		account::{AccountFuture, AccountService, LoginInfo, ProviderLogin},
		branding::{Branding, BrandingMap},
		config::{GatewaySettings, ProviderEnv},
		register::AuthRouter,
		session::{MemorySessionStore, SessionStore},
	};

	/// Default front-end URL used by test gateways.
	pub const TEST_FRONT_URL: &str = "https://front.example.com";
	/// Accounts service base URL used by test gateways.
	pub const TEST_ACCOUNTS_URL: &str = "https://accounts.example.com";
	/// Product identifier forwarded to the account service by test gateways.
	pub const TEST_PRODUCT_ID: &str = "product-it";

	/// Call observed by [`RecordingAccountService`].
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub enum AccountCall {
		/// `join_with_provider` invocation.
		Join {
			/// Login request forwarded by the handler.
			login: ProviderLogin,
			/// Invite identifier decoded from the auth state.
			invite_id: String,
		},
		/// `login_with_provider` invocation.
		Login {
			/// Login request forwarded by the handler.
			login: ProviderLogin,
		},
	}

	/// Account service double that records every call and answers with a fixed result.
	#[derive(Debug, Default)]
	pub struct RecordingAccountService {
		calls: Mutex<Vec<AccountCall>>,
		fail: bool,
	}
	impl RecordingAccountService {
		/// Builds a service that rejects every call after recording it.
		pub fn failing() -> Self {
			Self { calls: Default::default(), fail: true }
		}

		/// Returns a snapshot of the recorded calls.
		pub fn calls(&self) -> Vec<AccountCall> {
			self.calls.lock().clone()
		}

		fn answer(&self, call: AccountCall) -> crate::account::AccountResult<LoginInfo> {
			let email = match &call {
				AccountCall::Join { login, .. } | AccountCall::Login { login } =>
					login.email.clone(),
			};

			self.calls.lock().push(call);

			if self.fail {
				Err(crate::account::AccountError::Rejected {
					message: "Account service is unavailable.".into(),
				})
			} else {
				Ok(LoginInfo::new(serde_json::json!({ "email": email, "token": "login-token" })))
			}
		}
	}
	impl AccountService for RecordingAccountService {
		fn join_with_provider<'a>(
			&'a self,
			login: ProviderLogin,
			invite_id: &'a str,
		) -> AccountFuture<'a, LoginInfo> {
			let call = AccountCall::Join { login, invite_id: invite_id.to_owned() };

			Box::pin(async move { self.answer(call) })
		}

		fn login_with_provider(&self, login: ProviderLogin) -> AccountFuture<'_, LoginInfo> {
			let call = AccountCall::Login { login };

			Box::pin(async move { self.answer(call) })
		}
	}

	/// Builds a complete provider environment pointing at the provided endpoints.
	pub fn test_provider_env(authorization: &str, token: &str, user_info: &str) -> ProviderEnv {
		ProviderEnv {
			authorization_url: Some(authorization.into()),
			token_url: Some(token.into()),
			client_id: Some("client-it".into()),
			client_secret: Some("secret-it".into()),
			scope: "openid email".into(),
			user_info_url: Some(user_info.into()),
			email_key: "email".into(),
			name_key: "name".into(),
		}
	}

	/// Gateway settings with one branded host (`branded.example.com` → key `acme`).
	pub fn test_gateway_settings() -> GatewaySettings {
		let mut brandings = BrandingMap::default();

		brandings.insert(
			"branded.example.com",
			Branding::new("acme").with_front("https://acme.example.com"),
		);

		GatewaySettings::new(TEST_ACCOUNTS_URL, TEST_FRONT_URL, TEST_PRODUCT_ID)
			.with_brandings(brandings)
	}

	/// Registers the custom provider against in-memory collaborators and returns the router
	/// plus handles to inspect them.
	pub fn build_test_router(
		env: &ProviderEnv,
		accounts: Arc<RecordingAccountService>,
	) -> (axum::Router, Arc<MemorySessionStore>) {
		let sessions_backend = Arc::new(MemorySessionStore::default());
		let sessions: Arc<dyn SessionStore> = sessions_backend.clone();
		let accounts: Arc<dyn AccountService> = accounts;
		let mut router = AuthRouter::new(test_gateway_settings(), accounts, sessions);
		let registered =
			router.register_custom(env).expect("Custom provider registration should not fail.");

		assert!(registered.is_some(), "Test environment should register the custom provider.");

		(router.into_router(), sessions_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use axum;
pub use reqwest;
pub use url;
#[cfg(test)]
use {
	color_eyre as _, httpmock as _, tokio as _, tower as _, tracing_subscriber as _,
};
