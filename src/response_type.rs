//! Authorization endpoint response type strategies.
//!
//! A strategy names the query fields it signs into the approval prompt and, once the user
//! approves, produces the redirect URI that completes the flow.

/// `code` response type returning an authorization code in the redirect query.
pub mod code;
/// `token` response type returning an access token in the redirect fragment.
pub mod token;

pub use code::CodeResponseType;
pub use token::TokenResponseType;

// self
use crate::{
	_prelude::*,
	oauth::{CLIENT_ID, Parameters, REDIRECT_URI, SCOPE, STATE},
	registry::StrategyRegistry,
	service::{OAuth2Service, ServiceFuture},
};

/// Registry of response type strategies keyed by `response_type`.
pub type ResponseTypeRegistry = StrategyRegistry<dyn ResponseTypeStrategy>;

/// Parameters shared by the code and token response types.
pub const REDIRECT_PARAMETERS: &[&str] = &[CLIENT_ID, REDIRECT_URI, SCOPE, STATE];

/// Response types shipped with the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
	/// Authorization code delivered in the redirect query.
	Code,
	/// Access token delivered in the redirect fragment.
	Token,
}
impl ResponseType {
	/// Returns the RFC 6749 identifier for the response type.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResponseType::Code => "code",
			ResponseType::Token => "token",
		}
	}
}
impl Display for ResponseType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Pluggable redirect-URI producer selected by `response_type`.
pub trait ResponseTypeStrategy
where
	Self: Send + Sync,
{
	/// Required query fields, in the order missing ones are reported.
	fn parameter_names(&self) -> &'static [&'static str];

	/// Pulls the required fields from the request query; absent fields come back empty.
	fn extract_parameters(&self, query: &Parameters) -> Parameters {
		query.select(self.parameter_names())
	}

	/// Completes an approved request and returns the client redirect.
	fn execute<'a>(&'a self, params: &'a Parameters) -> ServiceFuture<'a, Url>;
}

/// Registry holding the code and token response types backed by `service`.
pub fn standard_response_types(service: Arc<dyn OAuth2Service>) -> ResponseTypeRegistry {
	ResponseTypeRegistry::builder()
		.register(ResponseType::Code.as_str(), Arc::new(CodeResponseType::new(service.clone())))
		.register(ResponseType::Token.as_str(), Arc::new(TokenResponseType::new(service)))
		.build()
}
