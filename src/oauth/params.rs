//! Request parameter names and the canonical parameter set signed by the approval flow.

// crates.io
use url::form_urlencoded::{self, Serializer};
// self
use crate::{
	_prelude::*,
	oauth::{ErrorCode, ErrorResponse},
};

/// Authorization endpoint selector for the response type strategy.
pub const RESPONSE_TYPE: &str = "response_type";
/// Token endpoint selector for the grant type strategy.
pub const GRANT_TYPE: &str = "grant_type";
/// OAuth client identifier.
pub const CLIENT_ID: &str = "client_id";
/// OAuth client secret (form-posted client authentication).
pub const CLIENT_SECRET: &str = "client_secret";
/// Client redirect URI.
pub const REDIRECT_URI: &str = "redirect_uri";
/// Space-delimited scope list.
pub const SCOPE: &str = "scope";
/// Opaque client state echoed back on redirect.
pub const STATE: &str = "state";
/// Authorization code.
pub const CODE: &str = "code";
/// Resource owner username (password grant).
pub const USERNAME: &str = "username";
/// Resource owner password (password grant and login form).
pub const PASSWORD: &str = "password";
/// Post-login redirect target.
pub const CONTINUE: &str = "continue";
/// Login form email field.
pub const EMAIL: &str = "email";
/// Login form anti-forgery token.
pub const CSRF: &str = "csrf";
/// Approval form expiration timestamp (Unix nanoseconds).
pub const EXPIRATION_TIME: &str = "expiration_time";
/// Approval form signature (standard base64).
pub const SIGNATURE: &str = "signature";

/// Ordered set of single-valued request parameters.
///
/// Keys iterate in ascending byte order, which makes [`encode`](Self::encode) canonical: two
/// sets with the same pairs always encode to the same string regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters(BTreeMap<String, String>);
impl Parameters {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a `application/x-www-form-urlencoded` payload; the first value wins for repeated
	/// keys.
	pub fn parse(input: &[u8]) -> Self {
		let mut map = BTreeMap::new();

		for (key, value) in form_urlencoded::parse(input) {
			map.entry(key.into_owned()).or_insert_with(|| value.into_owned());
		}

		Self(map)
	}

	/// Parses an optional URI query string.
	pub fn from_query(query: Option<&str>) -> Self {
		query.map(|query| Self::parse(query.as_bytes())).unwrap_or_default()
	}

	/// Returns the value for `name`, if present.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}

	/// Returns the value for `name`, or an empty string when absent.
	pub fn value(&self, name: &str) -> &str {
		self.get(name).unwrap_or_default()
	}

	/// Parses `redirect_uri` as an absolute URL.
	pub fn redirect_uri(&self) -> Result<Url, ErrorResponse> {
		Url::parse(self.value(REDIRECT_URI)).map_err(|_| {
			ErrorResponse::new(ErrorCode::InvalidRequest).with_description("Malformed redirect_uri")
		})
	}

	/// Inserts or replaces a value, returning the previous one.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(name.into(), value.into())
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, value);

		self
	}

	/// Copies the listed names into a new set; absent names map to empty strings so the
	/// completeness check can report them.
	pub fn select(&self, names: &[&str]) -> Self {
		names.iter().map(|name| (*name, self.value(name))).collect()
	}

	/// Returns the first of `names` whose value is absent or empty.
	pub fn first_missing<'a>(&self, names: &[&'a str]) -> Option<&'a str> {
		names.iter().copied().find(|name| self.value(name).is_empty())
	}

	/// Canonical `application/x-www-form-urlencoded` form, keys sorted ascending.
	pub fn encode(&self) -> String {
		let mut serializer = Serializer::new(String::new());

		for (key, value) in &self.0 {
			serializer.append_pair(key, value);
		}

		serializer.finish()
	}

	/// Iterator over `(name, value)` pairs in canonical order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when the set holds no parameters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for Parameters
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}
