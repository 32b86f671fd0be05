//! Wire payloads emitted by the token, authorization, and approval endpoints.

// crates.io
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// RFC 6749 error codes understood by the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	/// The request is missing a parameter or is otherwise malformed.
	InvalidRequest,
	/// Client authentication failed.
	InvalidClient,
	/// The client is not authorized to use this method.
	UnauthorizedClient,
	/// The resource owner or authority denied the request.
	AccessDenied,
	/// The authority does not support the requested response type.
	UnsupportedResponseType,
	/// The requested scope is invalid, unknown, or malformed.
	InvalidScope,
	/// The authority hit an unexpected condition.
	ServerError,
	/// The authority is temporarily unable to handle the request.
	TemporarilyUnavailable,
	/// The authority does not support the requested grant type.
	UnsupportedGrantType,
}
impl ErrorCode {
	/// Returns the RFC 6749 identifier for the error code.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorCode::InvalidRequest => "invalid_request",
			ErrorCode::InvalidClient => "invalid_client",
			ErrorCode::UnauthorizedClient => "unauthorized_client",
			ErrorCode::AccessDenied => "access_denied",
			ErrorCode::UnsupportedResponseType => "unsupported_response_type",
			ErrorCode::InvalidScope => "invalid_scope",
			ErrorCode::ServerError => "server_error",
			ErrorCode::TemporarilyUnavailable => "temporarily_unavailable",
			ErrorCode::UnsupportedGrantType => "unsupported_grant_type",
		}
	}
}
impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Structured OAuth error, usable both as a wire payload and as a control-flow result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error code.
	pub error: ErrorCode,
	/// Human-readable explanation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_description: Option<String>,
	/// Link to a page describing the error.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_uri: Option<Url>,
}
impl ErrorResponse {
	/// Creates an error carrying only a code.
	pub fn new(error: ErrorCode) -> Self {
		Self { error, error_description: None, error_uri: None }
	}

	/// Attaches a description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Attaches a documentation URI.
	pub fn with_uri(mut self, uri: Url) -> Self {
		self.error_uri = Some(uri);

		self
	}

	/// `invalid_request` naming the missing parameter.
	pub fn missing_parameter(name: &str) -> Self {
		Self::new(ErrorCode::InvalidRequest)
			.with_description(format!("Required parameter is missing: {name}"))
	}

	/// `invalid_request` for an unknown `response_type`.
	pub fn invalid_response_type(value: &str) -> Self {
		Self::new(ErrorCode::InvalidRequest)
			.with_description(format!("Invalid response_type: {value}"))
	}

	/// `unsupported_grant_type` for an unknown or absent `grant_type`.
	pub fn unsupported_grant_type(value: &str) -> Self {
		Self::new(ErrorCode::UnsupportedGrantType)
			.with_description(format!("Unsupported grant type: {value}"))
	}

	/// `invalid_client` for missing or malformed client credentials.
	pub fn invalid_client() -> Self {
		Self::new(ErrorCode::InvalidClient)
			.with_description("Client authentication failed")
	}
}
impl Display for ErrorResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.error_description {
			Some(description) => write!(f, "{}: {description}", self.error),
			None => Display::fmt(&self.error, f),
		}
	}
}

/// Access token type; the authority only issues bearer tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
	/// RFC 6750 bearer token.
	#[default]
	Bearer,
}
impl TokenType {
	/// Returns the wire identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenType::Bearer => "Bearer",
		}
	}
}
impl Display for TokenType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Success payload of the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Token type, always `Bearer`.
	pub token_type: TokenType,
	/// Lifetime in seconds.
	pub expires_in: u64,
}
impl AccessTokenResponse {
	/// Creates a bearer token response.
	pub fn bearer(access_token: impl Into<String>, expires_in: u64) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: TokenType::Bearer,
			expires_in,
		}
	}

	/// Implicit-grant fragment carrying the token and the client's `state`.
	pub fn to_fragment(&self, state: &str) -> String {
		Serializer::new(String::new())
			.append_pair("access_token", self.access_token.expose())
			.append_pair("token_type", self.token_type.as_str())
			.append_pair("expires_in", &self.expires_in.to_string())
			.append_pair("state", state)
			.finish()
	}
}

/// Success payload appended to a code-grant redirect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResponse {
	/// Authorization code.
	pub code: String,
	/// Client state echoed back.
	pub state: String,
}
impl AuthorizationResponse {
	/// Creates a new response.
	pub fn new(code: impl Into<String>, state: impl Into<String>) -> Self {
		Self { code: code.into(), state: state.into() }
	}

	/// Form-encodes the payload as `code=..&state=..`.
	pub fn encode(&self) -> String {
		Serializer::new(String::new())
			.append_pair("code", &self.code)
			.append_pair("state", &self.state)
			.finish()
	}

	/// Appends the payload to the redirect URI's query, joining with `&` when a query already
	/// exists.
	pub fn append_to(&self, redirect_uri: &mut Url) {
		let encoded = self.encode();
		let query = match redirect_uri.query() {
			Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
			_ => encoded,
		};

		redirect_uri.set_query(Some(&query));
	}
}
