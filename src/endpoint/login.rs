//! Login endpoint: CSRF-protected email/password form that opens a session.

// crates.io
use axum::{
	body::Bytes,
	extract::{OriginalUri, State},
	http::{Method, StatusCode, Uri},
	response::{IntoResponse, Response},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	config::{AuthorityConfig, NONCE_COOKIE, SESSION_COOKIE},
	endpoint::{self, Collaborators},
	error::ServiceError,
	http,
	oauth::{CONTINUE, CSRF, EMAIL, ErrorCode, ErrorResponse, PASSWORD, Parameters},
	obs::{self, EndpointKind, EndpointOutcome, EndpointSpan},
	service,
	signing::SignedStateCodec,
	view::{LoginForm, View},
};

const KIND: EndpointKind = EndpointKind::Login;
const CREDENTIALS_MISMATCH: &str = "The email or password you entered is incorrect.";

/// Axum handler for the login endpoint.
pub async fn handle(
	State(endpoint): State<Arc<LoginEndpoint>>,
	method: Method,
	OriginalUri(uri): OriginalUri,
	jar: CookieJar,
	body: Bytes,
) -> Response {
	endpoint.serve(&method, &uri, jar, &body).await
}

/// Renders the login form and exchanges credentials for a session cookie.
#[derive(Clone, Debug)]
pub struct LoginEndpoint {
	codec: SignedStateCodec,
	nonce_len: usize,
	secure_cookies: bool,
	timeout: Option<std::time::Duration>,
	collaborators: Collaborators,
}
impl LoginEndpoint {
	/// Creates the endpoint from configuration and collaborators.
	pub fn new(config: &AuthorityConfig, collaborators: Collaborators) -> Self {
		Self {
			codec: SignedStateCodec::new(config.server_key.clone()),
			nonce_len: config.nonce_len,
			secure_cookies: config.secure_cookies,
			timeout: config.collaborator_timeout,
			collaborators,
		}
	}

	/// Handles one request, recording the outcome.
	pub async fn serve(
		&self,
		method: &Method,
		uri: &Uri,
		jar: CookieJar,
		body: &[u8],
	) -> Response {
		let span = EndpointSpan::new(KIND, "login");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let response = span.instrument(self.respond(method, uri, jar, body)).await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::from_status(response.status()));

		response
	}

	async fn respond(
		&self,
		method: &Method,
		uri: &Uri,
		jar: CookieJar,
		body: &[u8],
	) -> Response {
		let query = Parameters::from_query(uri.query());
		let continue_to = query.value(CONTINUE);

		match *method {
			Method::GET => self.form(jar, uri, continue_to, String::new(), None),
			Method::POST => self.submit(jar, uri, continue_to, body).await,
			_ => endpoint::method_not_allowed("GET, POST"),
		}
	}

	async fn submit(
		&self,
		jar: CookieJar,
		uri: &Uri,
		continue_to: &str,
		body: &[u8],
	) -> Response {
		if continue_to.is_empty() {
			return self.reject(&ErrorResponse::missing_parameter(CONTINUE));
		}

		let Some(nonce) =
			jar.get(NONCE_COOKIE).map(|cookie| cookie.value()).filter(|value| !value.is_empty())
		else {
			return self.reject(&invalid_login_request("The login nonce is missing."));
		};
		let form = Parameters::parse(body);
		let Ok(csrf) = STANDARD.decode(form.value(CSRF)) else {
			return self.reject(&invalid_login_request("The csrf field is not valid base64."));
		};

		if !self.codec.verify_csrf(nonce, &csrf) {
			return self.reject(&invalid_login_request("The csrf token does not match."));
		}

		let email = form.value(EMAIL);

		match service::with_deadline(
			self.timeout,
			self.collaborators.users.authenticate_user(email, form.value(PASSWORD)),
		)
		.await
		{
			Ok(session) => {
				let Ok(redirect) = http::found(continue_to) else {
					return self.reject(&invalid_login_request("The continue target is invalid."));
				};
				let jar = jar
					.add(http::http_only_cookie(
						SESSION_COOKIE,
						session.as_ref().to_owned(),
						self.secure_cookies,
					))
					.remove(Cookie::build(NONCE_COOKIE).path("/"));

				(jar, redirect).into_response()
			},
			Err(ServiceError::CredentialsMismatch) => {
				obs::log_rejection(KIND, &ServiceError::CredentialsMismatch);

				let message = Some(CREDENTIALS_MISMATCH.to_owned());

				self.form(jar, uri, continue_to, email.to_owned(), message)
			},
			Err(e) => {
				obs::log_failure(KIND, "authenticate_user", &e);

				endpoint::error_page(
					KIND,
					self.collaborators.renderer.as_ref(),
					StatusCode::SERVICE_UNAVAILABLE,
					&endpoint::unavailable(),
				)
			},
		}
	}

	/// Issues a fresh nonce cookie and renders the form bound to it.
	fn form(
		&self,
		jar: CookieJar,
		uri: &Uri,
		continue_to: &str,
		email: String,
		error_message: Option<String>,
	) -> Response {
		let nonce = STANDARD.encode(self.collaborators.tokens.generate(self.nonce_len));
		let csrf = STANDARD.encode(self.codec.csrf_token(&nonce));
		let action =
			format!("{}?{}", uri.path(), Parameters::new().with(CONTINUE, continue_to).encode());
		let view = View::Login(LoginForm { email, error_message, csrf, action });
		let jar = jar.add(http::http_only_cookie(NONCE_COOKIE, nonce, self.secure_cookies));
		let page =
			endpoint::render(KIND, self.collaborators.renderer.as_ref(), StatusCode::OK, view);

		(jar, page).into_response()
	}

	fn reject(&self, error: &ErrorResponse) -> Response {
		obs::log_rejection(KIND, error);

		endpoint::error_page(
			KIND,
			self.collaborators.renderer.as_ref(),
			StatusCode::BAD_REQUEST,
			error,
		)
	}
}

fn invalid_login_request(description: &'static str) -> ErrorResponse {
	ErrorResponse::new(ErrorCode::InvalidRequest).with_description(description)
}
