//! Token endpoint: authenticates the client and dispatches on `grant_type`.

// crates.io
use axum::{
	body::Bytes,
	extract::State,
	http::{HeaderMap, Method, StatusCode, header::AUTHORIZATION},
	response::Response,
};
// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	config::AuthorityConfig,
	endpoint,
	error::ServiceError,
	grant::GrantTypeRegistry,
	http,
	oauth::{ErrorResponse, GRANT_TYPE, Parameters},
	obs::{self, EndpointKind, EndpointOutcome, EndpointSpan},
	service,
};

const KIND: EndpointKind = EndpointKind::Token;

/// Axum handler for the token endpoint.
pub async fn handle(
	State(endpoint): State<Arc<TokenEndpoint>>,
	method: Method,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	endpoint.serve(&method, &headers, &body).await
}

/// Issues access tokens for registered grant types.
#[derive(Clone, Debug)]
pub struct TokenEndpoint {
	grant_types: GrantTypeRegistry,
	timeout: Option<std::time::Duration>,
}
impl TokenEndpoint {
	/// Creates the endpoint from configuration and a grant type registry.
	pub fn new(config: &AuthorityConfig, grant_types: GrantTypeRegistry) -> Self {
		Self { grant_types, timeout: config.collaborator_timeout }
	}

	/// Handles one request, recording the outcome.
	pub async fn serve(&self, method: &Method, headers: &HeaderMap, body: &[u8]) -> Response {
		let span = EndpointSpan::new(KIND, "token");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let response = span.instrument(self.respond(method, headers, body)).await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::from_status(response.status()));

		response
	}

	async fn respond(&self, method: &Method, headers: &HeaderMap, body: &[u8]) -> Response {
		if *method != Method::POST {
			return endpoint::method_not_allowed("POST");
		}

		let credentials = match headers
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.map(ClientCredentials::from_authorization)
		{
			Some(Ok(credentials)) => credentials,
			Some(Err(e)) => {
				obs::log_rejection(KIND, &e);

				return invalid_client();
			},
			None => {
				obs::log_rejection(KIND, &"missing or unreadable Authorization header");

				return invalid_client();
			},
		};
		let form = Parameters::parse(body);
		let grant_type = form.value(GRANT_TYPE);
		let Some(strategy) = self.grant_types.get(grant_type) else {
			let error = ErrorResponse::unsupported_grant_type(grant_type);

			obs::log_rejection(KIND, &error);

			return http::oauth_error(StatusCode::BAD_REQUEST, &error);
		};
		let params = strategy.extract_parameters(&form);

		if let Some(name) = params.first_missing(strategy.parameter_names()) {
			let error = ErrorResponse::missing_parameter(name);

			obs::log_rejection(KIND, &error);

			return http::oauth_error(StatusCode::BAD_REQUEST, &error);
		}

		match service::with_deadline(self.timeout, strategy.execute(&credentials, &params)).await {
			Ok(token) => http::json(StatusCode::OK, &token),
			Err(ServiceError::OAuth(error)) => {
				obs::log_rejection(KIND, &error);

				http::oauth_error(StatusCode::BAD_REQUEST, &error)
			},
			Err(e) => {
				obs::log_failure(KIND, "grant", &e);

				http::empty(StatusCode::SERVICE_UNAVAILABLE)
			},
		}
	}
}

fn invalid_client() -> Response {
	http::oauth_error(StatusCode::UNAUTHORIZED, &ErrorResponse::invalid_client())
}
