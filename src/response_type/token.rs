// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	oauth::{CLIENT_ID, Parameters, SCOPE, STATE},
	response_type::{REDIRECT_PARAMETERS, ResponseTypeStrategy},
	service::{OAuth2Service, ServiceFuture},
};

/// `response_type=token`: mints an access token and returns it in the redirect fragment.
///
/// The fragment never reaches the client's server, which is what the implicit grant relies
/// on; an existing fragment on the registered redirect URI is replaced.
#[derive(Clone)]
pub struct TokenResponseType {
	service: Arc<dyn OAuth2Service>,
}
impl TokenResponseType {
	/// Creates the strategy backed by `service`.
	pub fn new(service: Arc<dyn OAuth2Service>) -> Self {
		Self { service }
	}
}
impl ResponseTypeStrategy for TokenResponseType {
	fn parameter_names(&self) -> &'static [&'static str] {
		REDIRECT_PARAMETERS
	}

	fn execute<'a>(&'a self, params: &'a Parameters) -> ServiceFuture<'a, Url> {
		Box::pin(async move {
			let mut redirect_uri = params.redirect_uri()?;
			let scope = ScopeSet::parse(params.value(SCOPE));
			let state = params.value(STATE);
			let token = self
				.service
				.token(params.value(CLIENT_ID), &redirect_uri, &scope, state)
				.await?;

			redirect_uri.set_fragment(Some(&token.to_fragment(state)));

			Ok(redirect_uri)
		})
	}
}
impl Debug for TokenResponseType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenResponseType")
	}
}
