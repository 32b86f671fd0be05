//! Recording collaborators and request helpers shared by the endpoint integration tests.

#![allow(dead_code)]

// std
use std::{future, io::Error as IoError, sync::Arc, time::Duration};
// crates.io
use axum::{
	Router,
	body::{self, Body},
	http::{
		Method, Request, Response, StatusCode,
		header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
	},
};
use parking_lot::Mutex;
use tower::ServiceExt;
use url::Url;
// self
use oauth2_authority::{
	Authority, AuthorityConfig,
	auth::{ClientCredentials, ScopeDescription, ScopeSet, ServerKey, SessionId},
	error::ServiceError,
	oauth::{
		AccessTokenResponse, AuthorizationResponse, EXPIRATION_TIME, ErrorCode, ErrorResponse,
		Parameters, SIGNATURE,
	},
	service::{OAuth2Service, ServiceFuture, TokenGenerator, UserAuthenticationService},
	view::{ApprovalPrompt, RenderError, View, ViewRenderer},
};

pub const SERVER_KEY: &[u8] = b"integration-server-key";
pub const LOGIN_URL: &str = "https://login.example.com/login";
pub const SESSION: &str = "session-1";
pub const LOGIN_SESSION: &str = "session-from-login";
pub const COLLABORATOR_TIMEOUT: Duration = Duration::from_millis(100);
/// Code-flow authorization query whose redirect URI already carries a query.
pub const AUTH_QUERY: &str = "response_type=code&client_id=c\
	&redirect_uri=https%3A%2F%2Fcb.example.com%2Fcb%3Fkeep%3D1&scope=a+b&state=s";

/// How a mocked collaborator call answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reply {
	/// Success value.
	#[default]
	Succeed,
	/// Typed rejection: an OAuth error, an invalid session, or a credentials mismatch.
	Reject,
	/// Untyped failure.
	Fail,
	/// Never resolves; the collaborator deadline fires.
	Hang,
}

/// One recorded collaborator call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
	pub operation: &'static str,
	pub args: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CallLog(Mutex<Vec<Call>>);
impl CallLog {
	fn record(&self, operation: &'static str, args: &[&str]) {
		let args = args.iter().map(|arg| arg.to_string()).collect();

		self.0.lock().push(Call { operation, args });
	}

	pub fn all(&self) -> Vec<Call> {
		self.0.lock().clone()
	}

	pub fn to(&self, operation: &str) -> Vec<Vec<String>> {
		self.0
			.lock()
			.iter()
			.filter(|call| call.operation == operation)
			.map(|call| call.args.clone())
			.collect()
	}
}

fn answer<'a, T>(
	reply: Reply,
	rejection: ServiceError,
	value: impl 'a + Send + FnOnce() -> T,
) -> ServiceFuture<'a, T>
where
	T: 'a + Send,
{
	Box::pin(async move {
		match reply {
			Reply::Succeed => Ok(value()),
			Reply::Reject => Err(rejection),
			Reply::Fail => Err(ServiceError::failure(IoError::other("collaborator offline"))),
			Reply::Hang => future::pending().await,
		}
	})
}

fn domain_error(error: ErrorCode, description: &str) -> ServiceError {
	ErrorResponse::new(error).with_description(description).into()
}

#[derive(Debug, Default)]
pub struct MockOAuth2 {
	pub validate: Reply,
	pub grant: Reply,
	pub issue: Reply,
	pub scope_info: Reply,
	pub calls: CallLog,
}
impl OAuth2Service for MockOAuth2 {
	fn validate_request<'a>(
		&'a self,
		client_id: &'a str,
		scope: &'a ScopeSet,
		redirect_uri: &'a str,
	) -> ServiceFuture<'a, ()> {
		self.calls.record("validate_request", &[client_id, &scope.to_string(), redirect_uri]);

		answer(
			self.validate,
			domain_error(ErrorCode::UnauthorizedClient, "Unknown redirect_uri."),
			|| (),
		)
	}

	fn password<'a>(
		&'a self,
		credentials: &'a ClientCredentials,
		username: &'a str,
		password: &'a str,
	) -> ServiceFuture<'a, AccessTokenResponse> {
		self.calls.record(
			"password",
			&[credentials.id.as_ref(), credentials.secret.expose(), username, password],
		);

		answer(self.grant, domain_error(ErrorCode::AccessDenied, "Bad resource owner."), || {
			AccessTokenResponse::bearer("access-1", 3600)
		})
	}

	fn authorization_code<'a>(
		&'a self,
		credentials: &'a ClientCredentials,
		code: &'a str,
		redirect_uri: &'a Url,
	) -> ServiceFuture<'a, AccessTokenResponse> {
		self.calls.record(
			"authorization_code",
			&[credentials.id.as_ref(), credentials.secret.expose(), code, redirect_uri.as_str()],
		);

		answer(self.grant, domain_error(ErrorCode::AccessDenied, "Code already used."), || {
			AccessTokenResponse::bearer("access-2", 3600)
		})
	}

	fn code<'a>(
		&'a self,
		client_id: &'a str,
		redirect_uri: &'a Url,
		scope: &'a ScopeSet,
		state: &'a str,
	) -> ServiceFuture<'a, AuthorizationResponse> {
		self.calls.record("code", &[client_id, redirect_uri.as_str(), &scope.to_string(), state]);

		answer(self.issue, domain_error(ErrorCode::AccessDenied, "Denied."), move || {
			AuthorizationResponse::new("code-1", state)
		})
	}

	fn token<'a>(
		&'a self,
		client_id: &'a str,
		redirect_uri: &'a Url,
		scope: &'a ScopeSet,
		state: &'a str,
	) -> ServiceFuture<'a, AccessTokenResponse> {
		self.calls.record("token", &[client_id, redirect_uri.as_str(), &scope.to_string(), state]);

		answer(self.issue, domain_error(ErrorCode::AccessDenied, "Denied."), || {
			AccessTokenResponse::bearer("implicit-1", 600)
		})
	}

	fn scope_info<'a>(
		&'a self,
		scope: &'a ScopeSet,
		locale: &'a str,
	) -> ServiceFuture<'a, Vec<ScopeDescription>> {
		self.calls.record("scope_info", &[&scope.to_string(), locale]);

		let rejection = domain_error(ErrorCode::InvalidScope, "Unknown scope.");

		answer(self.scope_info, rejection, move || {
			scope
				.iter()
				.map(|name| ScopeDescription::new(name, format!("{locale}:{name}")))
				.collect()
		})
	}
}

#[derive(Debug, Default)]
pub struct MockUsers {
	/// `Reject` reports the session as invalid.
	pub sessions: Reply,
	/// `Reject` reports a credentials mismatch.
	pub login: Reply,
	pub calls: CallLog,
}
impl UserAuthenticationService for MockUsers {
	fn is_session_valid<'a>(&'a self, session: &'a SessionId) -> ServiceFuture<'a, bool> {
		self.calls.record("is_session_valid", &[session.as_ref()]);

		if self.sessions == Reply::Reject {
			return Box::pin(async { Ok(false) });
		}

		answer(self.sessions, ServiceError::CredentialsMismatch, || true)
	}

	fn authenticate_user<'a>(
		&'a self,
		email: &'a str,
		password: &'a str,
	) -> ServiceFuture<'a, SessionId> {
		self.calls.record("authenticate_user", &[email, password]);

		let session =
			SessionId::new(LOGIN_SESSION).expect("Login session fixture should be valid.");

		answer(self.login, ServiceError::CredentialsMismatch, move || session)
	}
}

/// Repeats one byte; keeps nonces deterministic.
#[derive(Debug)]
pub struct FixedTokenGenerator(pub u8);
impl TokenGenerator for FixedTokenGenerator {
	fn generate(&self, len: usize) -> Vec<u8> {
		vec![self.0; len]
	}
}

/// Serializes the view as JSON so tests can inspect the payload.
#[derive(Debug)]
pub struct JsonRenderer;
impl ViewRenderer for JsonRenderer {
	fn render(&self, view: &View) -> Result<String, RenderError> {
		serde_json::to_string(view).map_err(|e| RenderError::new(view.template(), e))
	}
}

pub struct Harness {
	pub oauth2: Arc<MockOAuth2>,
	pub users: Arc<MockUsers>,
	pub router: Router,
}
impl Harness {
	pub fn new(oauth2: MockOAuth2, users: MockUsers) -> Self {
		let oauth2 = Arc::new(oauth2);
		let users = Arc::new(users);
		let router = Authority::new(config(), users.clone(), oauth2.clone())
			.with_token_generator(Arc::new(FixedTokenGenerator(7)))
			.with_renderer(Arc::new(JsonRenderer))
			.router();

		Self { oauth2, users, router }
	}

	pub fn with_oauth2(oauth2: MockOAuth2) -> Self {
		Self::new(oauth2, MockUsers::default())
	}

	pub fn with_users(users: MockUsers) -> Self {
		Self::new(MockOAuth2::default(), users)
	}

	pub async fn send(&self, request: Request<Body>) -> Response<Body> {
		self.router.clone().oneshot(request).await.expect("Router should be infallible.")
	}
}
impl Default for Harness {
	fn default() -> Self {
		Self::new(MockOAuth2::default(), MockUsers::default())
	}
}

pub fn config() -> AuthorityConfig {
	AuthorityConfig::builder()
		.server_key(ServerKey::new(SERVER_KEY))
		.login_url(Url::parse(LOGIN_URL).expect("Login URL fixture should parse."))
		.collaborator_timeout(Some(COLLABORATOR_TIMEOUT))
		.build()
		.expect("Test configuration should be valid.")
}

pub fn session_cookie() -> String {
	format!("sessionid={SESSION}")
}

pub async fn body_string(response: Response<Body>) -> String {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Response body should be readable.");

	String::from_utf8(bytes.to_vec()).expect("Response body should be UTF-8.")
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
	serde_json::from_str(&body_string(response).await).expect("Response body should be JSON.")
}

pub async fn view(response: Response<Body>) -> View {
	serde_json::from_str(&body_string(response).await).expect("Response body should be a view.")
}

pub fn location(response: &Response<Body>) -> Url {
	let value = response.headers()[LOCATION].to_str().expect("Location should be ASCII.");

	Url::parse(value).expect("Location should be an absolute URL.")
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
	response
		.headers()
		.get_all(SET_COOKIE)
		.iter()
		.map(|value| value.to_str().expect("Set-Cookie should be ASCII.").to_owned())
		.collect()
}

/// Value of the `name` cookie set by the response.
pub fn cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
	let prefix = format!("{name}=");

	set_cookies(response).into_iter().find_map(|cookie| {
		let rest = cookie.strip_prefix(&prefix)?;

		Some(rest.split(';').next().unwrap_or_default().to_owned())
	})
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
	request(Method::GET, uri, cookie, Body::empty())
}

pub fn post_form(uri: &str, cookie: Option<&str>, form: String) -> Request<Body> {
	request(Method::POST, uri, cookie, Body::from(form))
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
	let mut builder = Request::builder()
		.method(method)
		.uri(uri)
		.header(CONTENT_TYPE, "application/x-www-form-urlencoded");

	if let Some(cookie) = cookie {
		builder = builder.header(COOKIE, cookie);
	}

	builder.body(body).expect("Request fixture should build.")
}

/// Runs `GET /auth?<query>` with a valid session and returns the approval prompt.
pub async fn approval_prompt(harness: &Harness, query: &str) -> ApprovalPrompt {
	let response =
		harness.send(get(&format!("/auth?{query}"), Some(&session_cookie()))).await;

	assert_eq!(response.status(), StatusCode::OK);

	match view(response).await {
		View::ApprovalPrompt(prompt) => prompt,
		other => panic!("Expected an approval prompt, got {other:?}."),
	}
}

/// Form body posting the prompt's signed state back.
pub fn approval_form(expiration_time: &str, signature: &str) -> String {
	Parameters::new().with(EXPIRATION_TIME, expiration_time).with(SIGNATURE, signature).encode()
}

/// Posts the prompt back to its form action with the session cookie.
pub async fn approve(harness: &Harness, prompt: &ApprovalPrompt) -> Response<Body> {
	let form = approval_form(&prompt.expiration_time.to_string(), &prompt.signature);

	harness.send(post_form(&prompt.action, Some(&session_cookie()), form)).await
}
