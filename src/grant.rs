//! Token endpoint grant type strategies.
//!
//! Each strategy names the form fields it needs and turns them into an
//! [`AccessTokenResponse`] through the [`OAuth2Service`] collaborator. Strategies are resolved
//! by the posted `grant_type` through an immutable [`GrantTypeRegistry`].

/// `authorization_code` grant exchanging a previously issued code.
pub mod authorization_code;
/// `password` grant for resource owner credentials.
pub mod password;

pub use authorization_code::AuthorizationCodeGrant;
pub use password::PasswordGrant;

// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	oauth::{AccessTokenResponse, Parameters},
	registry::StrategyRegistry,
	service::{OAuth2Service, ServiceFuture},
};

/// Registry of grant strategies keyed by `grant_type`.
pub type GrantTypeRegistry = StrategyRegistry<dyn GrantTypeStrategy>;

/// Grant types shipped with the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Resource owner password credentials grant.
	Password,
	/// Authorization code grant.
	AuthorizationCode,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::Password => "password",
			GrantType::AuthorizationCode => "authorization_code",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Pluggable token-issuance executor selected by `grant_type`.
pub trait GrantTypeStrategy
where
	Self: Send + Sync,
{
	/// Required form fields, in the order missing ones are reported.
	fn parameter_names(&self) -> &'static [&'static str];

	/// Pulls the required fields from the posted form; absent fields come back empty.
	fn extract_parameters(&self, form: &Parameters) -> Parameters {
		form.select(self.parameter_names())
	}

	/// Issues a token for authenticated client credentials and complete parameters.
	fn execute<'a>(
		&'a self,
		credentials: &'a ClientCredentials,
		params: &'a Parameters,
	) -> ServiceFuture<'a, AccessTokenResponse>;
}

/// Registry holding the password and authorization code grants backed by `service`.
pub fn standard_grant_types(service: Arc<dyn OAuth2Service>) -> GrantTypeRegistry {
	GrantTypeRegistry::builder()
		.register(GrantType::Password.as_str(), Arc::new(PasswordGrant::new(service.clone())))
		.register(
			GrantType::AuthorizationCode.as_str(),
			Arc::new(AuthorizationCodeGrant::new(service)),
		)
		.build()
}
