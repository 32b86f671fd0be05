// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	oauth::{CLIENT_ID, Parameters, SCOPE, STATE},
	response_type::{REDIRECT_PARAMETERS, ResponseTypeStrategy},
	service::{OAuth2Service, ServiceFuture},
};

/// `response_type=code`: issues an authorization code and appends it to the redirect query.
#[derive(Clone)]
pub struct CodeResponseType {
	service: Arc<dyn OAuth2Service>,
}
impl CodeResponseType {
	/// Creates the strategy backed by `service`.
	pub fn new(service: Arc<dyn OAuth2Service>) -> Self {
		Self { service }
	}
}
impl ResponseTypeStrategy for CodeResponseType {
	fn parameter_names(&self) -> &'static [&'static str] {
		REDIRECT_PARAMETERS
	}

	fn execute<'a>(&'a self, params: &'a Parameters) -> ServiceFuture<'a, Url> {
		Box::pin(async move {
			let mut redirect_uri = params.redirect_uri()?;
			let scope = ScopeSet::parse(params.value(SCOPE));
			let response = self
				.service
				.code(params.value(CLIENT_ID), &redirect_uri, &scope, params.value(STATE))
				.await?;

			response.append_to(&mut redirect_uri);

			Ok(redirect_uri)
		})
	}
}
impl Debug for CodeResponseType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CodeResponseType")
	}
}
