//! External collaborator contracts consumed by the endpoints.
//!
//! The authority owns no durable state: sessions, clients, grants, and scope metadata live
//! behind these traits. Implementations must be safe for concurrent use; every call returns a
//! boxed `Send` future so the endpoints can bound it with a deadline and drop it when the
//! inbound request is cancelled.

pub mod memory;

pub use memory::MemoryUserDirectory;

// crates.io
use rand::RngCore;
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, ScopeDescription, ScopeSet, SessionId},
	error::ServiceError,
	oauth::{AccessTokenResponse, AuthorizationResponse},
};

/// Future returned by collaborator calls.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + 'a + Send>>;

/// End-user authentication and session validation.
pub trait UserAuthenticationService
where
	Self: Send + Sync,
{
	/// Reports whether the session is still valid.
	fn is_session_valid<'a>(&'a self, session: &'a SessionId) -> ServiceFuture<'a, bool>;

	/// Authenticates an end user and opens a session.
	///
	/// Wrong credentials must surface as [`ServiceError::CredentialsMismatch`].
	fn authenticate_user<'a>(
		&'a self,
		email: &'a str,
		password: &'a str,
	) -> ServiceFuture<'a, SessionId>;
}

/// Client registry, grant issuance, and scope metadata.
pub trait OAuth2Service
where
	Self: Send + Sync,
{
	/// Validates an authorization request before the user is asked for approval.
	///
	/// Business-rule rejections must surface as [`ServiceError::OAuth`].
	fn validate_request<'a>(
		&'a self,
		client_id: &'a str,
		scope: &'a ScopeSet,
		redirect_uri: &'a str,
	) -> ServiceFuture<'a, ()>;

	/// Issues a token for the resource owner password grant.
	fn password<'a>(
		&'a self,
		credentials: &'a ClientCredentials,
		username: &'a str,
		password: &'a str,
	) -> ServiceFuture<'a, AccessTokenResponse>;

	/// Exchanges an authorization code for a token.
	fn authorization_code<'a>(
		&'a self,
		credentials: &'a ClientCredentials,
		code: &'a str,
		redirect_uri: &'a Url,
	) -> ServiceFuture<'a, AccessTokenResponse>;

	/// Issues an authorization code for an approved request.
	fn code<'a>(
		&'a self,
		client_id: &'a str,
		redirect_uri: &'a Url,
		scope: &'a ScopeSet,
		state: &'a str,
	) -> ServiceFuture<'a, AuthorizationResponse>;

	/// Issues an access token for an approved implicit-grant request.
	fn token<'a>(
		&'a self,
		client_id: &'a str,
		redirect_uri: &'a Url,
		scope: &'a ScopeSet,
		state: &'a str,
	) -> ServiceFuture<'a, AccessTokenResponse>;

	/// Returns localized scope descriptions for the approval prompt.
	fn scope_info<'a>(
		&'a self,
		scope: &'a ScopeSet,
		locale: &'a str,
	) -> ServiceFuture<'a, Vec<ScopeDescription>>;
}

/// Source of random bytes for nonces and identifiers.
pub trait TokenGenerator
where
	Self: Send + Sync,
{
	/// Returns `len` random bytes.
	fn generate(&self, len: usize) -> Vec<u8>;
}

/// [`TokenGenerator`] backed by the thread-local CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRngTokenGenerator;
impl TokenGenerator for OsRngTokenGenerator {
	fn generate(&self, len: usize) -> Vec<u8> {
		let mut bytes = vec![0; len];

		rand::rng().fill_bytes(&mut bytes);

		bytes
	}
}

/// Awaits a collaborator call, failing with [`ServiceError::DeadlineExceeded`] once `timeout`
/// elapses. `None` waits indefinitely.
pub async fn with_deadline<T, F>(
	timeout: Option<std::time::Duration>,
	call: F,
) -> Result<T, ServiceError>
where
	F: Future<Output = Result<T, ServiceError>>,
{
	match timeout {
		Some(timeout) =>
			tokio::time::timeout(timeout, call).await.map_err(|_| ServiceError::DeadlineExceeded)?,
		None => call.await,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn generator_returns_requested_length() {
		let generator = OsRngTokenGenerator;
		let first = generator.generate(128);
		let second = generator.generate(128);

		assert_eq!(first.len(), 128);
		assert_ne!(first, second, "Independent draws should differ.");
		assert!(generator.generate(0).is_empty());
	}

	#[tokio::test]
	async fn deadline_turns_slow_calls_into_errors() {
		let slow = async {
			tokio::time::sleep(std::time::Duration::from_millis(200)).await;

			Ok::<_, ServiceError>(())
		};
		let err = with_deadline(Some(std::time::Duration::from_millis(10)), slow)
			.await
			.expect_err("Slow call should exceed the deadline.");

		assert!(matches!(err, ServiceError::DeadlineExceeded));

		let value = with_deadline(None, async { Ok::<_, ServiceError>(7) })
			.await
			.expect("Unbounded call should complete.");

		assert_eq!(value, 7);
	}
}
