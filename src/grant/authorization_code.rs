// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	grant::GrantTypeStrategy,
	oauth::{AccessTokenResponse, CODE, Parameters, REDIRECT_URI},
	service::{OAuth2Service, ServiceFuture},
};

/// Authorization code grant; exchanges a code issued through the approval flow.
#[derive(Clone)]
pub struct AuthorizationCodeGrant {
	service: Arc<dyn OAuth2Service>,
}
impl AuthorizationCodeGrant {
	/// Creates the strategy backed by `service`.
	pub fn new(service: Arc<dyn OAuth2Service>) -> Self {
		Self { service }
	}
}
impl GrantTypeStrategy for AuthorizationCodeGrant {
	fn parameter_names(&self) -> &'static [&'static str] {
		&[CODE, REDIRECT_URI]
	}

	fn execute<'a>(
		&'a self,
		credentials: &'a ClientCredentials,
		params: &'a Parameters,
	) -> ServiceFuture<'a, AccessTokenResponse> {
		Box::pin(async move {
			let redirect_uri = params.redirect_uri()?;

			self.service.authorization_code(credentials, params.value(CODE), &redirect_uri).await
		})
	}
}
impl Debug for AuthorizationCodeGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AuthorizationCodeGrant")
	}
}
