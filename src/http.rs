//! HTTP response helpers shared by the endpoints.

// crates.io
use axum::{
	body::Body,
	http::{
		HeaderMap, HeaderValue, StatusCode,
		header::{ACCEPT_LANGUAGE, CONTENT_TYPE, LOCATION},
	},
	response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
// self
use crate::{
	_prelude::*,
	oauth::{CONTINUE, ErrorResponse},
};

/// Content type of every JSON payload.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";
/// Content type of every HTML page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
/// Locale used when the client does not send `Accept-Language`.
pub const DEFAULT_LOCALE: &str = "en";

/// Redirect target that cannot be carried in a `Location` header.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Redirect location is not a valid header value.")]
pub struct InvalidLocation;

/// Serializes `payload` as JSON with the canonical content type.
pub fn json<T>(status: StatusCode, payload: &T) -> Response
where
	T: ?Sized + Serialize,
{
	match serde_json::to_vec(payload) {
		Ok(body) => (status, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
		Err(_) => empty(StatusCode::INTERNAL_SERVER_ERROR),
	}
}

/// Serializes an OAuth error as JSON.
pub fn oauth_error(status: StatusCode, error: &ErrorResponse) -> Response {
	json(status, error)
}

/// Bodiless response.
pub fn empty(status: StatusCode) -> Response {
	(status, Body::empty()).into_response()
}

/// HTML page response.
pub fn html(status: StatusCode, body: String) -> Response {
	(status, [(CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response()
}

/// `302 Found` redirect to `location`.
pub fn found(location: &str) -> Result<Response, InvalidLocation> {
	let location = HeaderValue::from_str(location).map_err(|_| InvalidLocation)?;

	Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}

/// Login page URL carrying `continue=<target>`; any existing query on the login URL is
/// replaced.
pub fn login_location(login_url: &Url, continue_to: &str) -> Url {
	let mut location = login_url.clone();

	location.query_pairs_mut().clear().append_pair(CONTINUE, continue_to);

	location
}

/// Resolves `target` next to the route that served `request_path`, keeping any prefix the
/// router was nested under.
pub fn sibling_path(request_path: &str, route: &str, target: &str) -> String {
	let prefix = request_path.strip_suffix(route).unwrap_or_default();

	format!("{prefix}{target}")
}

/// First language tag of `Accept-Language`, or [`DEFAULT_LOCALE`].
pub fn request_locale(headers: &HeaderMap) -> String {
	headers
		.get(ACCEPT_LANGUAGE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(',').next())
		.map(|tag| tag.split(';').next().unwrap_or_default().trim())
		.filter(|tag| !tag.is_empty() && *tag != "*")
		.unwrap_or(DEFAULT_LOCALE)
		.to_owned()
}

/// Root-scoped `HttpOnly` cookie.
pub fn http_only_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
	Cookie::build((name, value))
		.path("/")
		.http_only(true)
		.secure(secure)
		.same_site(SameSite::Lax)
		.build()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::oauth::ErrorCode;

	#[test]
	fn sibling_paths_keep_the_nest_prefix() {
		assert_eq!(sibling_path("/auth", "/auth", "/approval"), "/approval");
		assert_eq!(sibling_path("/oauth/auth", "/auth", "/approval"), "/oauth/approval");
		assert_eq!(sibling_path("/elsewhere", "/auth", "/approval"), "/approval");
	}

	#[test]
	fn json_uses_canonical_content_type() {
		let response =
			oauth_error(StatusCode::BAD_REQUEST, &ErrorResponse::new(ErrorCode::InvalidRequest));

		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert_eq!(
			response.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some(JSON_CONTENT_TYPE)
		);
	}

	#[test]
	fn login_location_replaces_query() {
		let login = Url::parse("https://example.com/login?stale=1").expect("Fixture should parse.");
		let location = login_location(&login, "/auth?response_type=code&state=a b");

		assert_eq!(
			location.as_str(),
			"https://example.com/login?continue=%2Fauth%3Fresponse_type%3Dcode%26state%3Da+b"
		);

		let pairs = location.query_pairs().into_owned().collect::<Vec<(String, String)>>();

		assert_eq!(
			pairs,
			vec![(CONTINUE.to_owned(), "/auth?response_type=code&state=a b".to_owned())]
		);
	}

	#[test]
	fn found_rejects_header_breaking_targets() {
		let response = found("https://cb.example.com/cb?code=1").expect("ASCII target is valid.");

		assert_eq!(response.status(), StatusCode::FOUND);
		assert_eq!(found("https://cb.example.com/\n").map(|_| ()), Err(InvalidLocation));
	}

	#[test]
	fn locale_takes_first_tag() {
		let mut headers = HeaderMap::new();

		assert_eq!(request_locale(&headers), "en");

		headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fr-CH, fr;q=0.9, en;q=0.8"));

		assert_eq!(request_locale(&headers), "fr-CH");

		headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("*"));

		assert_eq!(request_locale(&headers), "en");
	}

	#[test]
	fn cookies_are_http_only_and_root_scoped() {
		let cookie = http_only_cookie("sessionid", "abc".into(), true);

		assert_eq!(cookie.http_only(), Some(true));
		assert_eq!(cookie.secure(), Some(true));
		assert_eq!(cookie.path(), Some("/"));
		assert_eq!(cookie.value(), "abc");
	}
}
