//! Serves the custom provider routes against an in-memory account service.
//!
//! Configure the provider through the `OAUTH2_*` variables, then open
//! `http://127.0.0.1:3000/auth/custom?inviteId=demo` in a browser.

// std
use std::sync::Arc;
// crates.io
use color_eyre::{Result, eyre::eyre};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
// self
use oauth2_custom_provider::{
	account::{AccountFuture, AccountService, LoginInfo, ProviderLogin},
	config::{GatewaySettings, ProviderEnv},
	register::AuthRouter,
	session::{MemorySessionStore, SessionStore},
};

const LISTEN_ADDR: &str = "127.0.0.1:3000";

struct EchoAccounts;
impl EchoAccounts {
	fn login_info(login: &ProviderLogin, invite_id: Option<&str>) -> LoginInfo {
		LoginInfo::new(serde_json::json!({
			"email": login.email,
			"displayName": login.display_name,
			"inviteId": invite_id,
		}))
	}
}
impl AccountService for EchoAccounts {
	fn join_with_provider<'a>(
		&'a self,
		login: ProviderLogin,
		invite_id: &'a str,
	) -> AccountFuture<'a, LoginInfo> {
		Box::pin(async move { Ok(Self::login_info(&login, Some(invite_id))) })
	}

	fn login_with_provider(&self, login: ProviderLogin) -> AccountFuture<'_, LoginInfo> {
		Box::pin(async move { Ok(Self::login_info(&login, None)) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let settings =
		GatewaySettings::new(format!("http://{LISTEN_ADDR}"), "http://localhost:8080", "demo");
	let accounts: Arc<dyn AccountService> = Arc::new(EchoAccounts);
	let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::default());
	let mut router = AuthRouter::new(settings, accounts, sessions);

	router
		.register_custom(&ProviderEnv::from_env())?
		.ok_or_else(|| eyre!("Set every required OAUTH2_* variable to enable the provider."))?;

	let listener = TcpListener::bind(LISTEN_ADDR).await?;

	tracing::info!("listening on http://{LISTEN_ADDR}");

	axum::serve(listener, router.into_router()).await?;

	Ok(())
}
