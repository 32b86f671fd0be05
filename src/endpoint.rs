//! OAuth endpoints and router assembly.
//!
//! Every endpoint is constructed once from the immutable [`AuthorityConfig`] plus shared
//! collaborator handles, then mounted on an [`axum::Router`] by [`Authority::router`]. Methods
//! are checked inside the handlers so a wrong method always wins the 405 before any other
//! validation runs.

pub mod approval;
pub mod auth;
pub mod login;
pub mod token;

pub use approval::ApprovalEndpoint;
pub use auth::AuthEndpoint;
pub use login::LoginEndpoint;
pub use token::TokenEndpoint;

// crates.io
use axum::{
	Router,
	http::{HeaderValue, StatusCode, header::ALLOW},
	middleware::from_fn,
	response::{IntoResponse, Response},
	routing::any,
};
use axum_extra::extract::CookieJar;
// self
use crate::{
	_prelude::*,
	auth::SessionId,
	config::{AuthorityConfig, SESSION_COOKIE},
	grant::{self, GrantTypeRegistry},
	http, middleware,
	oauth::{ErrorCode, ErrorResponse},
	obs::{self, EndpointKind},
	response_type::{self, ResponseTypeRegistry},
	service::{OAuth2Service, OsRngTokenGenerator, TokenGenerator, UserAuthenticationService},
	view::{ErrorPage, HtmlRenderer, View, ViewRenderer},
};

/// Collaborator handles shared by the endpoints.
#[derive(Clone)]
pub struct Collaborators {
	/// End-user authentication and sessions.
	pub users: Arc<dyn UserAuthenticationService>,
	/// Client registry, grant issuance, and scope metadata.
	pub oauth2: Arc<dyn OAuth2Service>,
	/// Random source for login nonces.
	pub tokens: Arc<dyn TokenGenerator>,
	/// HTML renderer for browser-facing pages.
	pub renderer: Arc<dyn ViewRenderer>,
}
impl Debug for Collaborators {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Collaborators(..)")
	}
}

/// Fully wired authorization server: configuration, collaborators, and strategy registries.
#[derive(Clone, Debug)]
pub struct Authority {
	config: Arc<AuthorityConfig>,
	collaborators: Collaborators,
	grant_types: GrantTypeRegistry,
	response_types: ResponseTypeRegistry,
}
impl Authority {
	/// Wires the standard grant and response types, the OS random source, and the built-in HTML
	/// renderer around the provided collaborators.
	pub fn new(
		config: AuthorityConfig,
		users: Arc<dyn UserAuthenticationService>,
		oauth2: Arc<dyn OAuth2Service>,
	) -> Self {
		let grant_types = grant::standard_grant_types(oauth2.clone());
		let response_types = response_type::standard_response_types(oauth2.clone());
		let collaborators = Collaborators {
			users,
			oauth2,
			tokens: Arc::new(OsRngTokenGenerator),
			renderer: Arc::new(HtmlRenderer),
		};

		Self { config: Arc::new(config), collaborators, grant_types, response_types }
	}

	/// Replaces the random source used for login nonces.
	pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
		self.collaborators.tokens = tokens;

		self
	}

	/// Replaces the HTML renderer.
	pub fn with_renderer(mut self, renderer: Arc<dyn ViewRenderer>) -> Self {
		self.collaborators.renderer = renderer;

		self
	}

	/// Replaces the grant type registry.
	pub fn with_grant_types(mut self, grant_types: GrantTypeRegistry) -> Self {
		self.grant_types = grant_types;

		self
	}

	/// Replaces the response type registry.
	pub fn with_response_types(mut self, response_types: ResponseTypeRegistry) -> Self {
		self.response_types = response_types;

		self
	}

	/// Configuration shared by every endpoint.
	pub fn config(&self) -> &AuthorityConfig {
		&self.config
	}

	/// Builds the token endpoint.
	pub fn token_endpoint(&self) -> TokenEndpoint {
		TokenEndpoint::new(&self.config, self.grant_types.clone())
	}

	/// Builds the authorization endpoint.
	pub fn auth_endpoint(&self) -> AuthEndpoint {
		AuthEndpoint::new(&self.config, self.collaborators.clone(), self.response_types.clone())
	}

	/// Builds the approval endpoint.
	pub fn approval_endpoint(&self) -> ApprovalEndpoint {
		ApprovalEndpoint::new(&self.config, self.collaborators.clone(), self.response_types.clone())
	}

	/// Builds the login endpoint.
	pub fn login_endpoint(&self) -> LoginEndpoint {
		LoginEndpoint::new(&self.config, self.collaborators.clone())
	}

	/// Mounts all four endpoints with their middleware.
	///
	/// Every response carries the no-cache headers; the token endpoint additionally accepts
	/// form-posted client credentials.
	pub fn router(&self) -> Router {
		let paths = &self.config.paths;
		let token = Router::new()
			.route(&paths.token, any(token::handle))
			.layer(from_fn(middleware::normalize_client_credentials))
			.with_state(Arc::new(self.token_endpoint()));
		let auth = Router::new()
			.route(&paths.auth, any(auth::handle))
			.with_state(Arc::new(self.auth_endpoint()));
		let approval = Router::new()
			.route(&paths.approval, any(approval::handle))
			.with_state(Arc::new(self.approval_endpoint()));
		let login = Router::new()
			.route(&paths.login, any(login::handle))
			.with_state(Arc::new(self.login_endpoint()));

		Router::new()
			.merge(token)
			.merge(auth)
			.merge(approval)
			.merge(login)
			.layer(from_fn(middleware::no_caching))
	}
}

/// Copy of the stored `sessionid` cookie, if it holds a well-formed identifier.
fn session_cookie(jar: &CookieJar) -> Option<SessionId> {
	jar.get(SESSION_COOKIE).and_then(|cookie| SessionId::new(cookie.value()).ok())
}

fn method_not_allowed(allow: &'static str) -> Response {
	(StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, HeaderValue::from_static(allow))]).into_response()
}

fn render(
	kind: EndpointKind,
	renderer: &dyn ViewRenderer,
	status: StatusCode,
	view: View,
) -> Response {
	match renderer.render(&view) {
		Ok(body) => http::html(status, body),
		Err(e) => {
			obs::log_failure(kind, "render", &e);

			http::empty(StatusCode::INTERNAL_SERVER_ERROR)
		},
	}
}

fn error_page(
	kind: EndpointKind,
	renderer: &dyn ViewRenderer,
	status: StatusCode,
	error: &ErrorResponse,
) -> Response {
	let page = ErrorPage {
		status: status.as_u16(),
		error: error.error,
		error_description: error.error_description.clone(),
	};

	render(kind, renderer, status, View::Error(page))
}

fn unavailable() -> ErrorResponse {
	ErrorResponse::new(ErrorCode::TemporarilyUnavailable)
		.with_description("The service you're looking for is temporarily unavailable.")
}
