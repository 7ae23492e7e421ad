#![cfg(feature = "test")]

// crates.io
use axum::{
	Router,
	body::Body,
	http::{HeaderMap, Request, StatusCode, header},
};
use httpmock::prelude::*;
use tower::ServiceExt;
// self
use oauth2_custom_provider::{
	_preludet::*,
	config::ProviderEnv,
	session::{MemorySessionStore, SESSION_COOKIE},
	state::{self, AuthState},
};

const TOKEN_BODY: &str = "{\"access_token\":\"access-it\",\"token_type\":\"bearer\"}";

fn provider_env(server: &MockServer) -> ProviderEnv {
	test_provider_env(&server.url("/authorize"), &server.url("/token"), &server.url("/userinfo"))
}

fn callback_uri(code: &str, auth_state: &AuthState) -> String {
	let raw = state::encode(auth_state);

	format!("/auth/custom/callback?code={code}&state={}", urlencoding::encode(&raw))
}

async fn call(router: Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, HeaderMap) {
	let mut request = Request::builder().method("GET").uri(uri);

	for (name, value) in headers {
		request = request.header(*name, *value);
	}

	let response = router
		.oneshot(request.body(Body::empty()).expect("Callback request should build."))
		.await
		.expect("Router should answer the callback.");

	(response.status(), response.headers().clone())
}

fn location(headers: &HeaderMap) -> Option<&str> {
	headers.get(header::LOCATION).and_then(|value| value.to_str().ok())
}

async fn mock_token_ok(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("code=code-it")
				.body_includes("client_id=client-it")
				.body_includes("client_secret=secret-it");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await
}

async fn mock_profile<'a>(server: &'a MockServer, body: &str) -> httpmock::Mock<'a> {
	let body = body.to_owned();

	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo").header("authorization", "Bearer access-it");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

fn single_session(sessions: &MemorySessionStore) -> SessionRecordView {
	let snapshot = sessions.snapshot();

	assert_eq!(snapshot.len(), 1, "Exactly one session should be stored.");

	let (id, record) = snapshot.into_iter().next().expect("Snapshot should hold one session.");

	SessionRecordView { id: id.to_string(), login_info: record.login_info.as_value().clone() }
}

struct SessionRecordView {
	id: String,
	login_info: serde_json::Value,
}

#[tokio::test]
async fn invite_in_state_joins_and_redirects_to_login_auth() {
	let server = MockServer::start_async().await;
	let token = mock_token_ok(&server).await;
	let profile = mock_profile(&server, "{\"email\":\"a@b.com\",\"name\":\"A\"}").await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let auth_state = AuthState { invite_id: Some("inv1".into()), branding: None };
	let (status, headers) = call(router, &callback_uri("code-it", &auth_state), &[]).await;

	token.assert_async().await;
	profile.assert_async().await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(location(&headers), Some("https://front.example.com/login/auth"));
	assert_eq!(
		accounts.calls(),
		vec![AccountCall::Join {
			login: oauth2_custom_provider::account::ProviderLogin::new(
				TEST_PRODUCT_ID,
				"a@b.com",
				Some("A".into()),
			),
			invite_id: "inv1".into(),
		}]
	);

	let session = single_session(&sessions);
	let cookie = headers
		.get(header::SET_COOKIE)
		.and_then(|value| value.to_str().ok())
		.expect("A minted session should set the session cookie.");

	assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={}", session.id)));
	assert!(cookie.ends_with("; Secure"), "Https accounts URL should mark the cookie Secure.");
	assert_eq!(session.login_info["email"], "a@b.com");
}

#[tokio::test]
async fn missing_invite_logs_in_and_reuses_existing_session() {
	let server = MockServer::start_async().await;
	let _token = mock_token_ok(&server).await;
	let _profile = mock_profile(&server, "{\"email\":\"a@b.com\"}").await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let cookie = format!("{SESSION_COOKIE}=existingsession");
	let (status, headers) =
		call(router, &callback_uri("code-it", &AuthState::default()), &[("cookie", &cookie)])
			.await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(location(&headers), Some("https://front.example.com/login/auth"));
	assert!(headers.get(header::SET_COOKIE).is_none());
	assert_eq!(
		accounts.calls(),
		vec![AccountCall::Login {
			login: oauth2_custom_provider::account::ProviderLogin::new(
				TEST_PRODUCT_ID,
				"a@b.com",
				None,
			),
		}]
	);
	assert_eq!(single_session(&sessions).id, "existingsession");
}

#[tokio::test]
async fn empty_invite_is_treated_as_login() {
	let server = MockServer::start_async().await;
	let _token = mock_token_ok(&server).await;
	let _profile = mock_profile(&server, "{\"email\":\"a@b.com\",\"name\":\"A\"}").await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, _sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let auth_state = AuthState { invite_id: Some(String::new()), branding: None };
	let (status, _) = call(router, &callback_uri("code-it", &auth_state), &[]).await;

	assert_eq!(status, StatusCode::FOUND);
	assert!(matches!(accounts.calls().as_slice(), [AccountCall::Login { .. }]));
}

#[tokio::test]
async fn branded_state_redirects_to_branded_front() {
	let server = MockServer::start_async().await;
	let _token = mock_token_ok(&server).await;
	let _profile = mock_profile(&server, "{\"email\":\"a@b.com\"}").await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, _sessions) = build_test_router(&provider_env(&server), accounts);
	let auth_state = AuthState { invite_id: None, branding: Some("acme".into()) };
	let (status, headers) = call(router, &callback_uri("code-it", &auth_state), &[]).await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(location(&headers), Some("https://acme.example.com/login/auth"));
}

#[tokio::test]
async fn corrupted_state_falls_back_to_default_front_and_login() {
	let server = MockServer::start_async().await;
	let _token = mock_token_ok(&server).await;
	let _profile = mock_profile(&server, "{\"email\":\"a@b.com\"}").await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, _sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let (status, headers) =
		call(router, "/auth/custom/callback?code=code-it&state=garbage", &[]).await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(location(&headers), Some("https://front.example.com/login/auth"));
	assert!(matches!(accounts.calls().as_slice(), [AccountCall::Login { .. }]));
}

#[tokio::test]
async fn profile_without_email_is_ignored() {
	let server = MockServer::start_async().await;
	let _token = mock_token_ok(&server).await;
	let _profile = mock_profile(&server, "{\"name\":\"A\"}").await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let auth_state = AuthState { invite_id: Some("inv1".into()), branding: None };
	let (status, headers) = call(router, &callback_uri("code-it", &auth_state), &[]).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert!(location(&headers).is_none());
	assert!(accounts.calls().is_empty());
	assert!(sessions.is_empty());
}

#[tokio::test]
async fn account_failure_is_swallowed_without_redirect() {
	let server = MockServer::start_async().await;
	let _token = mock_token_ok(&server).await;
	let _profile = mock_profile(&server, "{\"email\":\"a@b.com\"}").await;
	let accounts = Arc::new(RecordingAccountService::failing());
	let (router, sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let (status, headers) =
		call(router, &callback_uri("code-it", &AuthState::default()), &[]).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert!(location(&headers).is_none());
	assert_eq!(accounts.calls().len(), 1);
	assert!(sessions.is_empty());
}

#[tokio::test]
async fn token_rejection_redirects_to_branded_failure_page() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"code reused\"}");
		})
		.await;
	let profile = mock_profile(&server, "{\"email\":\"a@b.com\"}").await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, _sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let auth_state = AuthState { invite_id: Some("inv1".into()), branding: Some("acme".into()) };
	let (status, headers) = call(router, &callback_uri("code-it", &auth_state), &[]).await;

	token.assert_async().await;
	profile.assert_calls_async(0).await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(location(&headers), Some("https://acme.example.com/login"));
	assert!(accounts.calls().is_empty());
}

#[tokio::test]
async fn profile_failure_redirects_to_failure_page() {
	let server = MockServer::start_async().await;
	let _token = mock_token_ok(&server).await;
	let _profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(401);
		})
		.await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, _sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let (status, headers) =
		call(router, &callback_uri("code-it", &AuthState::default()), &[]).await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(location(&headers), Some("https://front.example.com/login"));
	assert!(accounts.calls().is_empty());
}

#[tokio::test]
async fn provider_error_redirects_without_calling_the_provider() {
	let server = MockServer::start_async().await;
	let token = mock_token_ok(&server).await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, _sessions) = build_test_router(&provider_env(&server), accounts.clone());

	for uri in [
		"/auth/custom/callback?error=access_denied&error_description=denied",
		"/auth/custom/callback",
	] {
		let (status, headers) = call(router.clone(), uri, &[]).await;

		assert_eq!(status, StatusCode::FOUND);
		assert_eq!(location(&headers), Some("https://front.example.com/login"));
	}

	token.assert_calls_async(0).await;

	assert!(accounts.calls().is_empty());
}

#[tokio::test]
async fn repeated_query_keys_follow_the_failure_redirect() {
	let server = MockServer::start_async().await;
	let token = mock_token_ok(&server).await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, _sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let (status, headers) =
		call(router, "/auth/custom/callback?code=code-it&state=a&state=b", &[]).await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(location(&headers), Some("https://front.example.com/login"));

	token.assert_calls_async(0).await;

	assert!(accounts.calls().is_empty());
}

#[tokio::test]
async fn numeric_name_is_forwarded_as_text() {
	let server = MockServer::start_async().await;
	let _token = mock_token_ok(&server).await;
	let _profile = mock_profile(&server, "{\"email\":\"a@b.com\",\"name\":42}").await;
	let accounts = Arc::new(RecordingAccountService::default());
	let (router, _sessions) = build_test_router(&provider_env(&server), accounts.clone());
	let (status, _) = call(router, &callback_uri("code-it", &AuthState::default()), &[]).await;

	assert_eq!(status, StatusCode::FOUND);
	assert_eq!(
		accounts.calls(),
		vec![AccountCall::Login {
			login: oauth2_custom_provider::account::ProviderLogin::new(
				TEST_PRODUCT_ID,
				"a@b.com",
				Some("42".into()),
			),
		}]
	);
}
