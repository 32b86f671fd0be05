mod common;

// std
use std::sync::Arc;
// crates.io
use axum::http::{StatusCode, header::AUTHORIZATION};
// self
use common::{Harness, MockOAuth2};
use oauth2_authority::{
	Authority,
	auth::{ClientCredentials, ClientId},
	grant::{self, GrantTypeRegistry, GrantTypeStrategy, PasswordGrant},
	oauth::{AccessTokenResponse, Parameters},
	response_type::{self, CodeResponseType, ResponseTypeStrategy, TokenResponseType},
	service::{OAuth2Service, ServiceFuture},
};

fn credentials() -> ClientCredentials {
	ClientCredentials::new(ClientId::new("cid").expect("Client fixture should be valid."), "secret")
}

fn redirect_params(redirect_uri: &str) -> Parameters {
	Parameters::new()
		.with("client_id", "c")
		.with("redirect_uri", redirect_uri)
		.with("scope", "b a")
		.with("state", "s t")
}

#[test]
fn standard_registries_expose_the_wire_keys() {
	let service: Arc<dyn OAuth2Service> = Arc::new(MockOAuth2::default());

	assert_eq!(
		grant::standard_grant_types(service.clone()).keys(),
		vec!["authorization_code", "password"]
	);
	assert_eq!(response_type::standard_response_types(service).keys(), vec!["code", "token"]);
}

#[test]
fn grant_extraction_keeps_only_declared_fields() {
	let grant = PasswordGrant::new(Arc::new(MockOAuth2::default()));
	let form = Parameters::parse(b"grant_type=password&username=u&client_secret=s&extra=1");
	let params = grant.extract_parameters(&form);

	assert_eq!(params.encode(), "password=&username=u");
	assert_eq!(params.first_missing(grant.parameter_names()), Some("password"));
}

#[tokio::test]
async fn password_grant_forwards_client_and_owner_credentials() {
	let service = Arc::new(MockOAuth2::default());
	let grant = PasswordGrant::new(service.clone());
	let form = Parameters::parse(b"grant_type=password&username=u&password=p");

	grant
		.execute(&credentials(), &grant.extract_parameters(&form))
		.await
		.expect("Password grant should succeed.");

	assert_eq!(service.calls.to("password"), vec![vec!["cid", "secret", "u", "p"]]);
}

#[tokio::test]
async fn code_strategy_appends_to_an_existing_query() {
	let service = Arc::new(MockOAuth2::default());
	let strategy = CodeResponseType::new(service.clone());
	let redirect = strategy
		.execute(&redirect_params("https://cb.example.com/cb?foo=bar"))
		.await
		.expect("Code strategy should succeed.");

	assert_eq!(redirect.as_str(), "https://cb.example.com/cb?foo=bar&code=code-1&state=s+t");
	assert_eq!(
		service.calls.to("code"),
		vec![vec!["c", "https://cb.example.com/cb?foo=bar", "a b", "s t"]]
	);

	let bare = strategy
		.execute(&redirect_params("https://cb.example.com/cb"))
		.await
		.expect("Code strategy should succeed.");

	assert_eq!(bare.as_str(), "https://cb.example.com/cb?code=code-1&state=s+t");
}

#[tokio::test]
async fn token_strategy_answers_in_the_fragment() {
	let strategy = TokenResponseType::new(Arc::new(MockOAuth2::default()));
	let redirect = strategy
		.execute(&redirect_params("https://cb.example.com/cb?foo=bar"))
		.await
		.expect("Token strategy should succeed.");

	assert_eq!(redirect.query(), Some("foo=bar"));
	assert_eq!(
		redirect.fragment(),
		Some("access_token=implicit-1&token_type=Bearer&expires_in=600&state=s+t")
	);
}

#[tokio::test]
async fn malformed_redirect_uri_is_a_typed_error() {
	let strategy = CodeResponseType::new(Arc::new(MockOAuth2::default()));
	let err = strategy
		.execute(&redirect_params("/relative"))
		.await
		.expect_err("Relative redirect should be rejected.");
	let oauth = err.as_oauth().expect("Error should be an OAuth error.");

	assert_eq!(oauth.error.as_str(), "invalid_request");
}

/// Grant that issues a fixed token to any authenticated client.
struct ClientCredentialsGrant;
impl GrantTypeStrategy for ClientCredentialsGrant {
	fn parameter_names(&self) -> &'static [&'static str] {
		&[]
	}

	fn execute<'a>(
		&'a self,
		credentials: &'a ClientCredentials,
		_: &'a Parameters,
	) -> ServiceFuture<'a, AccessTokenResponse> {
		let token = format!("machine-{}", credentials.id.as_ref());

		Box::pin(async move { Ok(AccessTokenResponse::bearer(token, 60)) })
	}
}

#[tokio::test]
async fn custom_grant_types_can_be_registered() {
	let oauth2 = Arc::new(MockOAuth2::default());
	let registry = GrantTypeRegistry::builder()
		.register("client_credentials", Arc::new(ClientCredentialsGrant))
		.build();
	let router = Authority::new(common::config(), Arc::new(common::MockUsers::default()), oauth2)
		.with_grant_types(registry)
		.router();
	let harness = Harness { router, ..Harness::default() };
	let mut request = common::post_form("/token", None, "grant_type=client_credentials".into());

	request.headers_mut().insert(
		AUTHORIZATION,
		ClientCredentials::basic_header_value("robot", "secret")
			.parse()
			.expect("Header fixture should parse."),
	);

	let response = harness.send(request).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(common::json_body(response).await["access_token"], "machine-robot");

	let response = harness
		.send(common::post_form(
			"/token",
			None,
			"grant_type=password&username=u&password=p&client_id=c&client_secret=s".into(),
		))
		.await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
