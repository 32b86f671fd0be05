//! OAuth client credentials carried by HTTP Basic authentication.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, TokenSecret},
};

const BASIC_SCHEME: &str = "Basic ";

/// Reasons a `Authorization` header fails to yield client credentials.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialsError {
	/// Header does not use the Basic scheme.
	#[error("Authorization header does not use the Basic scheme.")]
	UnsupportedScheme,
	/// Payload is not valid base64 or UTF-8.
	#[error("Basic credentials are not valid base64-encoded UTF-8.")]
	MalformedPayload,
	/// Payload lacks the `id:secret` separator.
	#[error("Basic credentials are missing the ':' separator.")]
	MissingSeparator,
	/// Client identifier is empty.
	#[error("Client identifier is invalid.")]
	InvalidClientId,
	/// Client secret is empty.
	#[error("Client secret cannot be empty.")]
	EmptySecret,
}

/// OAuth client identity, distinct from the end user's identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCredentials {
	/// Client identifier.
	pub id: ClientId,
	/// Client secret.
	pub secret: TokenSecret,
}
impl ClientCredentials {
	/// Creates credentials from already-validated parts.
	pub fn new(id: ClientId, secret: impl Into<String>) -> Self {
		Self { id, secret: TokenSecret::new(secret) }
	}

	/// Parses an `Authorization: Basic base64(id:secret)` header value.
	pub fn from_authorization(value: &str) -> Result<Self, CredentialsError> {
		let scheme = value.get(..BASIC_SCHEME.len()).ok_or(CredentialsError::UnsupportedScheme)?;

		if !scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
			return Err(CredentialsError::UnsupportedScheme);
		}

		let decoded = STANDARD
			.decode(value[BASIC_SCHEME.len()..].trim())
			.map_err(|_| CredentialsError::MalformedPayload)?;
		let decoded = String::from_utf8(decoded).map_err(|_| CredentialsError::MalformedPayload)?;
		let (id, secret) = decoded.split_once(':').ok_or(CredentialsError::MissingSeparator)?;
		let id = ClientId::new(id).map_err(|_| CredentialsError::InvalidClientId)?;

		if secret.is_empty() {
			return Err(CredentialsError::EmptySecret);
		}

		Ok(Self::new(id, secret))
	}

	/// Encodes a raw `id:secret` pair as a Basic header value without validating it.
	pub fn basic_header_value(id: &str, secret: &str) -> String {
		format!("{BASIC_SCHEME}{}", STANDARD.encode(format!("{id}:{secret}")))
	}
}
