//! Secret wrappers that redact sensitive material from logs.

// self
use crate::_prelude::*;

/// Redacted secret string used for access tokens and client secrets.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the secret is an empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Process-wide HMAC signing key.
///
/// Every approval signature and login CSRF token is derived from this key, so it never
/// appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerKey(Arc<[u8]>);
impl ServerKey {
	/// Wraps raw key bytes.
	pub fn new(bytes: impl AsRef<[u8]>) -> Self {
		Self(Arc::from(bytes.as_ref()))
	}

	/// Returns the raw key bytes.
	pub fn expose(&self) -> &[u8] {
		&self.0
	}

	/// Number of key bytes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when the key holds no bytes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for ServerKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ServerKey").field(&"<redacted>").finish()
	}
}
