//! Authorization endpoint: validates the request, resolves the session, and issues a signed
//! approval prompt.

// crates.io
use axum::{
	extract::{OriginalUri, State},
	http::{HeaderMap, Method, StatusCode, Uri},
	response::Response,
};
use axum_extra::extract::CookieJar;
// self
use crate::{
	_prelude::*,
	auth::{ScopeDescription, ScopeSet},
	config::AuthorityConfig,
	endpoint::{self, Collaborators},
	error::ServiceError,
	http,
	oauth::{CLIENT_ID, ErrorCode, ErrorResponse, Parameters, REDIRECT_URI, RESPONSE_TYPE, SCOPE},
	obs::{self, EndpointKind, EndpointOutcome, EndpointSpan},
	response_type::ResponseTypeRegistry,
	service,
	signing::{ApprovalState, SignedStateCodec},
	view::{ApprovalPrompt, View},
};

const KIND: EndpointKind = EndpointKind::Auth;

/// Axum handler for the authorization endpoint.
pub async fn handle(
	State(endpoint): State<Arc<AuthEndpoint>>,
	method: Method,
	OriginalUri(uri): OriginalUri,
	headers: HeaderMap,
	jar: CookieJar,
) -> Response {
	endpoint.serve(&method, &uri, &headers, &jar).await
}

/// Turns an authorization request into a signed approval prompt.
#[derive(Clone, Debug)]
pub struct AuthEndpoint {
	codec: SignedStateCodec,
	login_url: Url,
	auth_path: String,
	approval_path: String,
	approval_ttl: Duration,
	timeout: Option<std::time::Duration>,
	collaborators: Collaborators,
	response_types: ResponseTypeRegistry,
}
impl AuthEndpoint {
	/// Creates the endpoint from configuration, collaborators, and a response type registry.
	pub fn new(
		config: &AuthorityConfig,
		collaborators: Collaborators,
		response_types: ResponseTypeRegistry,
	) -> Self {
		Self {
			codec: SignedStateCodec::new(config.server_key.clone()),
			login_url: config.login_url.clone(),
			auth_path: config.paths.auth.clone(),
			approval_path: config.paths.approval.clone(),
			approval_ttl: config.approval_ttl,
			timeout: config.collaborator_timeout,
			collaborators,
			response_types,
		}
	}

	/// Handles one request, recording the outcome.
	pub async fn serve(
		&self,
		method: &Method,
		uri: &Uri,
		headers: &HeaderMap,
		jar: &CookieJar,
	) -> Response {
		let span = EndpointSpan::new(KIND, "authorize");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let response = span.instrument(self.respond(method, uri, headers, jar)).await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::from_status(response.status()));

		response
	}

	async fn respond(
		&self,
		method: &Method,
		uri: &Uri,
		headers: &HeaderMap,
		jar: &CookieJar,
	) -> Response {
		if *method != Method::GET {
			return endpoint::method_not_allowed("GET");
		}

		let query = Parameters::from_query(uri.query());
		let response_type = query.value(RESPONSE_TYPE);

		if response_type.is_empty() {
			return self.reject(&ErrorResponse::missing_parameter(RESPONSE_TYPE));
		}

		let Some(strategy) = self.response_types.get(response_type) else {
			return self.reject(&ErrorResponse::invalid_response_type(response_type));
		};
		let mut params = strategy.extract_parameters(&query);

		if let Some(name) = params.first_missing(strategy.parameter_names()) {
			return self.reject(&ErrorResponse::missing_parameter(name));
		}

		let scope = ScopeSet::parse(params.value(SCOPE));
		let oauth2 = self.collaborators.oauth2.as_ref();

		match service::with_deadline(
			self.timeout,
			oauth2.validate_request(params.value(CLIENT_ID), &scope, params.value(REDIRECT_URI)),
		)
		.await
		{
			Ok(()) => {},
			Err(ServiceError::OAuth(error)) => return self.reject(&error),
			Err(e) => {
				obs::log_failure(KIND, "validate_request", &e);

				return self.error_page(
					StatusCode::INTERNAL_SERVER_ERROR,
					&ErrorResponse::new(ErrorCode::ServerError),
				);
			},
		}

		let Some(session) = endpoint::session_cookie(jar) else {
			return self.login_redirect(uri);
		};

		match service::with_deadline(
			self.timeout,
			self.collaborators.users.is_session_valid(&session),
		)
		.await
		{
			Ok(true) => {},
			Ok(false) => return self.login_redirect(uri),
			Err(e) => {
				obs::log_failure(KIND, "is_session_valid", &e);

				return self
					.error_page(StatusCode::SERVICE_UNAVAILABLE, &endpoint::unavailable());
			},
		}

		params.insert(RESPONSE_TYPE, response_type);

		let expires_at = OffsetDateTime::now_utc() + self.approval_ttl;
		let state = match ApprovalState::issue(&self.codec, &params, session, expires_at) {
			Ok(state) => state,
			Err(e) => {
				obs::log_failure(KIND, "sign", &e);

				return self.error_page(
					StatusCode::INTERNAL_SERVER_ERROR,
					&ErrorResponse::new(ErrorCode::ServerError),
				);
			},
		};
		let locale = http::request_locale(headers);
		let scopes =
			match service::with_deadline(self.timeout, oauth2.scope_info(&scope, &locale)).await {
				Ok(scopes) => scopes,
				Err(e) => {
					obs::log_failure(KIND, "scope_info", &e);

					ScopeDescription::fallback(&scope)
				},
			};
		let approval_path = http::sibling_path(uri.path(), &self.auth_path, &self.approval_path);
		let prompt = ApprovalPrompt {
			scopes,
			expiration_time: state.expiration_time,
			signature: state.signature_base64(),
			action: format!("{approval_path}?{}", state.encoded_params),
			parameters: state.encoded_params,
		};

		endpoint::render(
			KIND,
			self.collaborators.renderer.as_ref(),
			StatusCode::OK,
			View::ApprovalPrompt(prompt),
		)
	}

	fn reject(&self, error: &ErrorResponse) -> Response {
		obs::log_rejection(KIND, error);

		self.error_page(StatusCode::BAD_REQUEST, error)
	}

	fn error_page(&self, status: StatusCode, error: &ErrorResponse) -> Response {
		endpoint::error_page(KIND, self.collaborators.renderer.as_ref(), status, error)
	}

	fn login_redirect(&self, uri: &Uri) -> Response {
		let location = http::login_location(&self.login_url, &uri.to_string());

		match http::found(location.as_str()) {
			Ok(response) => response,
			Err(e) => {
				obs::log_failure(KIND, "login_redirect", &e);

				http::empty(StatusCode::INTERNAL_SERVER_ERROR)
			},
		}
	}
}
