//! Thread-safe in-memory [`UserAuthenticationService`] for local development and tests.

// std
use std::collections::HashSet;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::SessionId,
	error::ServiceError,
	service::{OsRngTokenGenerator, ServiceFuture, TokenGenerator, UserAuthenticationService},
};

const SESSION_ID_BYTES: usize = 32;
const SALT_BYTES: usize = 16;

type HmacSha256 = Hmac<Sha256>;
type UserMap = Arc<RwLock<HashMap<String, StoredPassword>>>;
type SessionSet = Arc<RwLock<HashSet<SessionId>>>;

/// In-process user directory keeping salted HMAC-SHA256 password digests and open sessions.
///
/// Intended for demos and tests; production deployments should back
/// [`UserAuthenticationService`] with a real credential store.
#[derive(Clone)]
pub struct MemoryUserDirectory {
	users: UserMap,
	sessions: SessionSet,
	generator: Arc<dyn TokenGenerator>,
}
impl MemoryUserDirectory {
	/// Creates an empty directory drawing session identifiers from `generator`.
	pub fn new(generator: Arc<dyn TokenGenerator>) -> Self {
		Self { users: Default::default(), sessions: Default::default(), generator }
	}

	/// Registers or replaces a user.
	pub fn with_user(self, email: impl Into<String>, password: &str) -> Self {
		let stored = StoredPassword::new(self.generator.generate(SALT_BYTES), password);

		self.users.write().insert(email.into(), stored);

		self
	}

	/// Ends a session; returns true when it existed.
	pub fn revoke_session(&self, session: &SessionId) -> bool {
		self.sessions.write().remove(session)
	}

	/// Number of open sessions.
	pub fn session_count(&self) -> usize {
		self.sessions.read().len()
	}

	fn authenticate_now(&self, email: &str, password: &str) -> Result<SessionId, ServiceError> {
		let matches = self.users.read().get(email).is_some_and(|stored| stored.verify(password));

		if !matches {
			return Err(ServiceError::CredentialsMismatch);
		}

		let raw = URL_SAFE_NO_PAD.encode(self.generator.generate(SESSION_ID_BYTES));
		let session = SessionId::new(raw).map_err(ServiceError::failure)?;

		self.sessions.write().insert(session.clone());

		Ok(session)
	}
}
impl Default for MemoryUserDirectory {
	fn default() -> Self {
		Self::new(Arc::new(OsRngTokenGenerator))
	}
}
impl Debug for MemoryUserDirectory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryUserDirectory")
			.field("users", &self.users.read().len())
			.field("sessions", &self.sessions.read().len())
			.finish()
	}
}
impl UserAuthenticationService for MemoryUserDirectory {
	fn is_session_valid<'a>(&'a self, session: &'a SessionId) -> ServiceFuture<'a, bool> {
		let sessions = self.sessions.clone();

		Box::pin(async move { Ok(sessions.read().contains(session)) })
	}

	fn authenticate_user<'a>(
		&'a self,
		email: &'a str,
		password: &'a str,
	) -> ServiceFuture<'a, SessionId> {
		Box::pin(async move { self.authenticate_now(email, password) })
	}
}

struct StoredPassword {
	salt: Vec<u8>,
	digest: Vec<u8>,
}
impl StoredPassword {
	fn new(salt: Vec<u8>, password: &str) -> Self {
		let digest = salted(&salt, password).finalize().into_bytes().to_vec();

		Self { salt, digest }
	}

	fn verify(&self, password: &str) -> bool {
		salted(&self.salt, password).verify_slice(&self.digest).is_ok()
	}
}

fn salted(salt: &[u8], password: &str) -> HmacSha256 {
	let mut mac = HmacSha256::new_from_slice(salt).expect("HMAC can take key of any size");

	mac.update(password.as_bytes());

	mac
}
