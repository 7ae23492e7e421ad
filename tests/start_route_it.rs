#![cfg(feature = "test")]

// crates.io
use axum::{
	body::Body,
	http::{Request, StatusCode, header},
};
use tower::ServiceExt;
// self
use oauth2_custom_provider::{
	_preludet::*,
	config::ProviderEnv,
	state::{self, AuthState},
};

fn provider_env() -> ProviderEnv {
	test_provider_env(
		"https://idp.example.com/authorize",
		"https://idp.example.com/token",
		"https://idp.example.com/userinfo",
	)
}

async fn start(uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Url) {
	let (router, _sessions) =
		build_test_router(&provider_env(), Arc::new(RecordingAccountService::default()));
	let mut request = Request::builder().method("GET").uri(uri);

	for (name, value) in headers {
		request = request.header(*name, *value);
	}

	let response = router
		.oneshot(request.body(Body::empty()).expect("Start request should build."))
		.await
		.expect("Router should answer the start route.");
	let location = response
		.headers()
		.get(header::LOCATION)
		.and_then(|value| value.to_str().ok())
		.expect("Start route should redirect.");

	(response.status(), Url::parse(location).expect("Redirect target should be absolute."))
}

fn query(url: &Url) -> HashMap<String, String> {
	url.query_pairs().into_owned().collect()
}

#[tokio::test]
async fn start_redirects_to_provider_with_invite_state() {
	let (status, url) = start("/auth/custom?inviteId=inv1", &[]).await;
	let pairs = query(&url);

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(url.host_str(), Some("idp.example.com"));
	assert_eq!(url.path(), "/authorize");
	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&"client-it".into()));
	assert_eq!(pairs.get("scope"), Some(&"openid email".into()));
	assert_eq!(
		pairs.get("redirect_uri"),
		Some(&format!("{TEST_ACCOUNTS_URL}/auth/custom/callback"))
	);
	assert_eq!(pairs.get("state"), Some(&"%7B%22inviteId%22%3A%22inv1%22%7D".into()));
}

#[tokio::test]
async fn branded_host_adds_branding_key() {
	let (_, url) =
		start("/auth/custom", &[("x-forwarded-host", "branded.example.com"), ("host", "x")]).await;
	let raw_state = query(&url).remove("state");

	assert_eq!(
		state::decode(raw_state.as_deref()),
		AuthState { invite_id: None, branding: Some("acme".into()) }
	);
}

#[tokio::test]
async fn unknown_host_sends_empty_state() {
	let (_, url) = start("/auth/custom", &[("host", "unknown.example.com")]).await;

	assert_eq!(query(&url).get("state"), Some(&"%7B%7D".into()));
}

#[tokio::test]
async fn repeated_invite_keys_still_redirect() {
	let (status, url) = start("/auth/custom?inviteId=a&inviteId=b", &[]).await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(query(&url).get("state"), Some(&"%7B%7D".into()));
}
