//! Immutable authority configuration assembled once at startup.

// self
use crate::{_prelude::*, auth::ServerKey, error::ConfigError};

/// Default lifetime of a signed approval prompt.
pub const DEFAULT_APPROVAL_TTL: Duration = Duration::hours(2);
/// Default login nonce length in bytes.
pub const DEFAULT_NONCE_LEN: usize = 128;
/// Default per-call collaborator deadline.
pub const DEFAULT_COLLABORATOR_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Cookie holding the authenticated session identifier.
pub const SESSION_COOKIE: &str = "sessionid";
/// Cookie holding the login anti-forgery nonce.
pub const NONCE_COOKIE: &str = "nonce";

/// Mount points for the four endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePaths {
	/// Token endpoint path.
	pub token: String,
	/// Authorization endpoint path.
	pub auth: String,
	/// Approval endpoint path.
	pub approval: String,
	/// Login endpoint path.
	pub login: String,
}
impl Default for RoutePaths {
	fn default() -> Self {
		Self {
			token: "/token".into(),
			auth: "/auth".into(),
			approval: "/approval".into(),
			login: "/login".into(),
		}
	}
}

/// Validated configuration shared read-only by every endpoint.
#[derive(Clone, Debug)]
pub struct AuthorityConfig {
	/// HMAC key for approval signatures and login CSRF tokens.
	pub server_key: ServerKey,
	/// Absolute login page URL that unauthenticated users are bounced to.
	pub login_url: Url,
	/// Lifetime of a signed approval prompt.
	pub approval_ttl: Duration,
	/// Login nonce length in bytes.
	pub nonce_len: usize,
	/// Deadline applied to each collaborator call; `None` disables it.
	pub collaborator_timeout: Option<std::time::Duration>,
	/// Marks issued cookies `Secure`.
	pub secure_cookies: bool,
	/// Endpoint mount points.
	pub paths: RoutePaths,
}
impl AuthorityConfig {
	/// Creates a new builder.
	pub fn builder() -> AuthorityConfigBuilder {
		AuthorityConfigBuilder::default()
	}
}

/// Builder for [`AuthorityConfig`] values.
#[derive(Debug)]
pub struct AuthorityConfigBuilder {
	/// HMAC key for approval signatures and login CSRF tokens.
	pub server_key: Option<ServerKey>,
	/// Login page URL.
	pub login_url: Option<Url>,
	/// Lifetime of a signed approval prompt.
	pub approval_ttl: Duration,
	/// Login nonce length in bytes.
	pub nonce_len: usize,
	/// Deadline applied to each collaborator call.
	pub collaborator_timeout: Option<std::time::Duration>,
	/// Marks issued cookies `Secure`.
	pub secure_cookies: bool,
	/// Endpoint mount points.
	pub paths: RoutePaths,
}
impl AuthorityConfigBuilder {
	/// Sets the server signing key.
	pub fn server_key(mut self, key: ServerKey) -> Self {
		self.server_key = Some(key);

		self
	}

	/// Sets the login page URL.
	pub fn login_url(mut self, url: Url) -> Self {
		self.login_url = Some(url);

		self
	}

	/// Overrides the approval prompt lifetime.
	pub fn approval_ttl(mut self, ttl: Duration) -> Self {
		self.approval_ttl = ttl;

		self
	}

	/// Overrides the login nonce length.
	pub fn nonce_len(mut self, len: usize) -> Self {
		self.nonce_len = len;

		self
	}

	/// Overrides the collaborator deadline; `None` waits indefinitely.
	pub fn collaborator_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
		self.collaborator_timeout = timeout;

		self
	}

	/// Toggles the `Secure` cookie attribute.
	pub fn secure_cookies(mut self, secure: bool) -> Self {
		self.secure_cookies = secure;

		self
	}

	/// Overrides the endpoint mount points.
	pub fn paths(mut self, paths: RoutePaths) -> Self {
		self.paths = paths;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<AuthorityConfig, ConfigError> {
		let server_key = self.server_key.ok_or(ConfigError::MissingServerKey)?;
		let login_url = self.login_url.ok_or(ConfigError::MissingLoginUrl)?;
		let config = AuthorityConfig {
			server_key,
			login_url,
			approval_ttl: self.approval_ttl,
			nonce_len: self.nonce_len,
			collaborator_timeout: self.collaborator_timeout,
			secure_cookies: self.secure_cookies,
			paths: self.paths,
		};

		config.validate()?;

		Ok(config)
	}
}
impl Default for AuthorityConfigBuilder {
	fn default() -> Self {
		Self {
			server_key: None,
			login_url: None,
			approval_ttl: DEFAULT_APPROVAL_TTL,
			nonce_len: DEFAULT_NONCE_LEN,
			collaborator_timeout: Some(DEFAULT_COLLABORATOR_TIMEOUT),
			secure_cookies: false,
			paths: RoutePaths::default(),
		}
	}
}

impl AuthorityConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		if self.server_key.is_empty() {
			return Err(ConfigError::EmptyServerKey);
		}
		if self.login_url.cannot_be_a_base() || !self.login_url.has_host() {
			return Err(ConfigError::RelativeLoginUrl { url: self.login_url.to_string() });
		}
		if !self.approval_ttl.is_positive() {
			return Err(ConfigError::NonPositiveDuration { setting: "approval_ttl" });
		}
		if self.nonce_len == 0 {
			return Err(ConfigError::ZeroNonceLength);
		}
		if self.collaborator_timeout.is_some_and(|timeout| timeout.is_zero()) {
			return Err(ConfigError::NonPositiveDuration { setting: "collaborator_timeout" });
		}

		validate_path("token", &self.paths.token)?;
		validate_path("auth", &self.paths.auth)?;
		validate_path("approval", &self.paths.approval)?;
		validate_path("login", &self.paths.login)?;

		Ok(())
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidRoutePath { endpoint, path: path.to_owned() })
	}
}
