// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	grant::GrantTypeStrategy,
	oauth::{AccessTokenResponse, PASSWORD, Parameters, USERNAME},
	service::{OAuth2Service, ServiceFuture},
};

/// Resource owner password credentials grant.
#[derive(Clone)]
pub struct PasswordGrant {
	service: Arc<dyn OAuth2Service>,
}
impl PasswordGrant {
	/// Creates the strategy backed by `service`.
	pub fn new(service: Arc<dyn OAuth2Service>) -> Self {
		Self { service }
	}
}
impl GrantTypeStrategy for PasswordGrant {
	fn parameter_names(&self) -> &'static [&'static str] {
		&[USERNAME, PASSWORD]
	}

	fn execute<'a>(
		&'a self,
		credentials: &'a ClientCredentials,
		params: &'a Parameters,
	) -> ServiceFuture<'a, AccessTokenResponse> {
		self.service.password(credentials, params.value(USERNAME), params.value(PASSWORD))
	}
}
impl Debug for PasswordGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PasswordGrant")
	}
}
