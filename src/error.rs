//! Authority-level error types shared across endpoints, strategies, and collaborators.

// self
use crate::{_prelude::*, oauth::ErrorResponse};

/// Authority-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for opaque collaborator failures.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical authority error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Collaborator call failed.
	#[error(transparent)]
	Service(#[from] ServiceError),
}

/// Configuration and validation failures raised while assembling the authority.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// Server signing key is required.
	#[error("Missing server signing key.")]
	MissingServerKey,
	/// Server signing key must contain at least one byte.
	#[error("Server signing key cannot be empty.")]
	EmptyServerKey,
	/// Login URL is required for the authorization endpoint.
	#[error("Missing login URL.")]
	MissingLoginUrl,
	/// Login URL must be absolute so redirects stay well-formed.
	#[error("Login URL must be absolute: {url}.")]
	RelativeLoginUrl {
		/// Offending URL string.
		url: String,
	},
	/// A duration-valued setting must be strictly positive.
	#[error("The {setting} setting must be positive.")]
	NonPositiveDuration {
		/// Name of the offending setting.
		setting: &'static str,
	},
	/// Login nonce length must be non-zero.
	#[error("Login nonce length must be positive.")]
	ZeroNonceLength,
	/// Route paths must start with `/`.
	#[error("Route path for the {endpoint} endpoint must start with '/': {path}.")]
	InvalidRoutePath {
		/// Endpoint whose path failed validation.
		endpoint: &'static str,
		/// Offending path.
		path: String,
	},
}

/// Tagged failure returned by external collaborators.
///
/// Endpoints match on the variant explicitly: [`ServiceError::OAuth`] is passed through to the
/// client, [`ServiceError::CredentialsMismatch`] redisplays the login form, and every other
/// variant is treated as an opaque outage whose details never reach the wire.
#[derive(Debug, ThisError)]
pub enum ServiceError {
	/// Business-rule rejection carrying a wire-ready OAuth error.
	#[error("OAuth error: {0}.")]
	OAuth(ErrorResponse),
	/// End-user credentials did not match.
	#[error("The email or password you entered is incorrect.")]
	CredentialsMismatch,
	/// Unexpected collaborator failure.
	#[error("Collaborator failed.")]
	Failure {
		/// Underlying collaborator error.
		#[source]
		source: BoxError,
	},
	/// Collaborator did not answer within the configured deadline.
	#[error("Collaborator call exceeded its deadline.")]
	DeadlineExceeded,
}
impl ServiceError {
	/// Wraps an arbitrary collaborator error inside [`ServiceError::Failure`].
	pub fn failure(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Failure { source: Box::new(src) }
	}

	/// Returns the OAuth error when the failure is a typed business-rule rejection.
	pub fn as_oauth(&self) -> Option<&ErrorResponse> {
		match self {
			Self::OAuth(response) => Some(response),
			_ => None,
		}
	}
}
impl From<ErrorResponse> for ServiceError {
	fn from(response: ErrorResponse) -> Self {
		Self::OAuth(response)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::io::Error as IoError;
	// self
	use super::*;
	use crate::oauth::ErrorCode;

	#[test]
	fn failure_keeps_source_out_of_display() {
		let err = ServiceError::failure(IoError::other("database password leaked"));

		assert_eq!(err.to_string(), "Collaborator failed.");

		let source =
			StdError::source(&err).expect("Opaque failures should expose the original source.");

		assert!(source.to_string().contains("database password leaked"));
	}

	#[test]
	fn oauth_errors_convert_and_match() {
		let err: ServiceError = ErrorResponse::new(ErrorCode::InvalidScope).into();

		assert_eq!(err.as_oauth().map(|response| response.error), Some(ErrorCode::InvalidScope));
		assert!(ServiceError::CredentialsMismatch.as_oauth().is_none());

		let wrapped: Error = err.into();

		assert!(matches!(wrapped, Error::Service(ServiceError::OAuth(_))));
	}
}
