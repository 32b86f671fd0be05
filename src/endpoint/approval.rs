//! Approval endpoint: verifies the signed state posted back from the prompt and completes the
//! request through the response type strategy.

// crates.io
use axum::{
	body::Bytes,
	extract::{OriginalUri, State},
	http::{Method, StatusCode, Uri},
	response::Response,
};
use axum_extra::extract::CookieJar;
// self
use crate::{
	_prelude::*,
	config::AuthorityConfig,
	endpoint::{self, Collaborators},
	http,
	oauth::{EXPIRATION_TIME, ErrorCode, ErrorResponse, Parameters, RESPONSE_TYPE, SIGNATURE},
	obs::{self, EndpointKind, EndpointOutcome, EndpointSpan},
	response_type::ResponseTypeRegistry,
	service,
	signing::{ApprovalState, SignedStateCodec},
};

const KIND: EndpointKind = EndpointKind::Approval;

/// Axum handler for the approval endpoint.
pub async fn handle(
	State(endpoint): State<Arc<ApprovalEndpoint>>,
	method: Method,
	OriginalUri(uri): OriginalUri,
	jar: CookieJar,
	body: Bytes,
) -> Response {
	endpoint.serve(&method, &uri, &jar, &body).await
}

/// Redeems a signed approval for the session that requested it.
#[derive(Clone, Debug)]
pub struct ApprovalEndpoint {
	codec: SignedStateCodec,
	timeout: Option<std::time::Duration>,
	collaborators: Collaborators,
	response_types: ResponseTypeRegistry,
}
impl ApprovalEndpoint {
	/// Creates the endpoint from configuration, collaborators, and a response type registry.
	pub fn new(
		config: &AuthorityConfig,
		collaborators: Collaborators,
		response_types: ResponseTypeRegistry,
	) -> Self {
		Self {
			codec: SignedStateCodec::new(config.server_key.clone()),
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
		jar: &CookieJar,
		body: &[u8],
	) -> Response {
		let span = EndpointSpan::new(KIND, "approve");

		obs::record_endpoint_outcome(KIND, EndpointOutcome::Attempt);

		let response = span.instrument(self.respond(method, uri, jar, body)).await;

		obs::record_endpoint_outcome(KIND, EndpointOutcome::from_status(response.status()));

		response
	}

	async fn respond(&self, method: &Method, uri: &Uri, jar: &CookieJar, body: &[u8]) -> Response {
		if *method != Method::POST {
			return endpoint::method_not_allowed("POST");
		}

		let query = Parameters::from_query(uri.query());
		let response_type = query.value(RESPONSE_TYPE);

		if response_type.is_empty() {
			return self
				.reject(StatusCode::BAD_REQUEST, &ErrorResponse::missing_parameter(RESPONSE_TYPE));
		}

		let Some(strategy) = self.response_types.get(response_type) else {
			return self.reject(
				StatusCode::BAD_REQUEST,
				&ErrorResponse::invalid_response_type(response_type),
			);
		};
		let mut params = strategy.extract_parameters(&query);

		params.insert(RESPONSE_TYPE, response_type);

		let Some(session) = endpoint::session_cookie(jar) else {
			return self.reject(StatusCode::UNAUTHORIZED, &session_required());
		};

		match service::with_deadline(
			self.timeout,
			self.collaborators.users.is_session_valid(&session),
		)
		.await
		{
			Ok(true) => {},
			Ok(false) => return self.reject(StatusCode::UNAUTHORIZED, &session_required()),
			Err(e) => {
				obs::log_failure(KIND, "is_session_valid", &e);

				return self.error_page(StatusCode::SERVICE_UNAVAILABLE, &endpoint::unavailable());
			},
		}

		let form = Parameters::parse(body);
		let verified = ApprovalState::from_submission(
			&params,
			session,
			form.value(EXPIRATION_TIME),
			form.value(SIGNATURE),
			OffsetDateTime::now_utc(),
		)
		.and_then(|state| state.verify(&self.codec));

		if let Err(e) = verified {
			obs::log_rejection(KIND, &e);

			return self.error_page(StatusCode::BAD_REQUEST, &invalid_approval());
		}

		match service::with_deadline(self.timeout, strategy.execute(&params)).await {
			Ok(redirect) => match http::found(redirect.as_str()) {
				Ok(response) => response,
				Err(e) => self.reject(
					StatusCode::BAD_REQUEST,
					&ErrorResponse::new(ErrorCode::InvalidRequest).with_description(e.to_string()),
				),
			},
			Err(e) => {
				obs::log_failure(KIND, "execute", &e);

				self.error_page(StatusCode::SERVICE_UNAVAILABLE, &endpoint::unavailable())
			},
		}
	}

	fn reject(&self, status: StatusCode, error: &ErrorResponse) -> Response {
		obs::log_rejection(KIND, error);

		self.error_page(status, error)
	}

	fn error_page(&self, status: StatusCode, error: &ErrorResponse) -> Response {
		endpoint::error_page(KIND, self.collaborators.renderer.as_ref(), status, error)
	}
}

fn session_required() -> ErrorResponse {
	ErrorResponse::new(ErrorCode::AccessDenied)
		.with_description("A valid session is required to approve this request.")
}

fn invalid_approval() -> ErrorResponse {
	ErrorResponse::new(ErrorCode::InvalidRequest)
		.with_description("The approval request is invalid or has expired.")
}
