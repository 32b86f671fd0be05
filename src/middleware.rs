//! Request/response middleware applied around the endpoints.

// crates.io
use axum::{
	body::{Body, to_bytes},
	extract::Request,
	http::{
		HeaderValue, Method, StatusCode,
		header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, PRAGMA},
	},
	middleware::Next,
	response::Response,
};
// self
use crate::{
	auth::ClientCredentials,
	http,
	oauth::{CLIENT_ID, CLIENT_SECRET, ErrorCode, ErrorResponse, Parameters},
};

/// Upper bound on buffered form bodies.
pub const MAX_FORM_BYTES: usize = 64 * 1024;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Sets `Cache-Control: no-store` and `Pragma: no-cache` on every response.
pub async fn no_caching(request: Request, next: Next) -> Response {
	let mut response = next.run(request).await;
	let headers = response.headers_mut();

	headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
	headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

	response
}

/// Synthesizes `Authorization: Basic` from posted `client_id`/`client_secret` when the header
/// is absent, so the token endpoint has a single credential source.
///
/// An existing `Authorization` header always wins. Only `POST` bodies are inspected; other
/// methods pass through untouched so the endpoint can answer 405.
pub async fn normalize_client_credentials(request: Request, next: Next) -> Response {
	if request.method() != Method::POST || request.headers().contains_key(AUTHORIZATION) {
		return next.run(request).await;
	}

	let (mut parts, body) = request.into_parts();
	let Ok(bytes) = to_bytes(body, MAX_FORM_BYTES).await else {
		return http::oauth_error(
			StatusCode::BAD_REQUEST,
			&ErrorResponse::new(ErrorCode::InvalidRequest)
				.with_description("Request body could not be read"),
		);
	};

	if is_form(&parts.headers) {
		let form = Parameters::parse(&bytes);
		let synthesized = ClientCredentials::basic_header_value(
			form.value(CLIENT_ID),
			form.value(CLIENT_SECRET),
		);

		if let Ok(value) = HeaderValue::from_str(&synthesized) {
			parts.headers.insert(AUTHORIZATION, value);
		}
	}

	next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn is_form(headers: &axum::http::HeaderMap) -> bool {
	headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(';').next())
		.is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

#[cfg(test)]
mod tests {
	// crates.io
	use axum::{
		Router,
		body::Bytes,
		http::HeaderMap,
		middleware::from_fn,
		routing::any,
	};
	use tower::ServiceExt;
	// self
	use super::*;

	async fn echo(headers: HeaderMap, body: Bytes) -> String {
		let authorization = headers
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.unwrap_or("<none>")
			.to_owned();

		format!("{authorization}|{}", String::from_utf8_lossy(&body))
	}

	fn router() -> Router {
		Router::new()
			.route("/", any(echo))
			.layer(from_fn(normalize_client_credentials))
			.layer(from_fn(no_caching))
	}

	async fn call(request: Request) -> (Response, String) {
		let response = router().oneshot(request).await.expect("Router should be infallible.");
		let (parts, body) = response.into_parts();
		let bytes = to_bytes(body, usize::MAX).await.expect("Body should be readable.");

		(Response::from_parts(parts, Body::empty()), String::from_utf8_lossy(&bytes).into_owned())
	}

	fn form_post() -> axum::http::request::Builder {
		Request::builder().method(Method::POST).uri("/").header(CONTENT_TYPE, FORM_CONTENT_TYPE)
	}

	#[tokio::test]
	async fn synthesizes_basic_auth_from_form_fields() {
		let body = "grant_type=password&client_id=cid&client_secret=secret";
		let request = form_post().body(Body::from(body)).expect("Request should build.");
		let (response, text) = call(request).await;
		let expected = ClientCredentials::basic_header_value("cid", "secret");

		assert_eq!(text, format!("{expected}|{body}"), "Body must reach the handler intact.");
		assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
		assert_eq!(response.headers()[PRAGMA], "no-cache");
	}

	#[tokio::test]
	async fn existing_header_wins() {
		let body = "client_id=form&client_secret=form";
		let header = ClientCredentials::basic_header_value("header", "secret");
		let request = form_post()
			.header(AUTHORIZATION, &header)
			.body(Body::from(body))
			.expect("Request should build.");
		let (_, text) = call(request).await;

		assert_eq!(text, format!("{header}|{body}"));
	}

	#[tokio::test]
	async fn non_post_and_non_form_requests_pass_through() {
		let get = Request::builder()
			.method(Method::GET)
			.uri("/?client_id=cid&client_secret=secret")
			.body(Body::empty())
			.expect("Request should build.");
		let (response, text) = call(get).await;

		assert_eq!(text, "<none>|");
		assert_eq!(response.headers()[PRAGMA], "no-cache");

		let json = Request::builder()
			.method(Method::POST)
			.uri("/")
			.header(CONTENT_TYPE, "application/json")
			.body(Body::from("{\"client_id\":\"cid\"}"))
			.expect("Request should build.");
		let (_, text) = call(json).await;

		assert_eq!(text, "<none>|{\"client_id\":\"cid\"}");
	}

	#[tokio::test]
	async fn oversized_bodies_are_rejected() {
		let request = Request::builder()
			.method(Method::POST)
			.uri("/")
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.body(Body::from(vec![b'a'; MAX_FORM_BYTES + 1]))
			.expect("Request should build.");
		let (response, text) = call(request).await;

		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert!(text.contains("invalid_request"));
		assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
	}
}
