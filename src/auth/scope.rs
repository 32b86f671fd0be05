//! Scope modeling helpers shared by the authorization and approval endpoints.

// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Errors emitted when building scopes from individual entries.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Normalized, order-irrelevant set of OAuth scopes.
///
/// Entries are deduplicated and sorted, so `"b a a"` and `"a b"` compare equal and render as
/// `"a b"`.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet(Arc<[String]>);
impl ScopeSet {
	/// Creates a normalized scope set from individual entries, rejecting empty or padded ones.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut set = BTreeSet::new();

		for scope in scopes {
			let owned: String = scope.into();

			if owned.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if owned.chars().any(char::is_whitespace) {
				return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
			}

			set.insert(owned);
		}

		Ok(Self(set.into_iter().collect()))
	}

	/// Parses a space-delimited scope parameter.
	///
	/// Runs of whitespace are tolerated and never yield empty entries, so parsing cannot fail.
	pub fn parse(raw: &str) -> Self {
		let set = raw.split_whitespace().map(str::to_owned).collect::<BTreeSet<_>>();

		Self(set.into_iter().collect())
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Space-delimited normalized representation.
	pub fn normalized(&self) -> String {
		self.0.join(" ")
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::parse(s))
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.normalized())
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		let set = Self::parse(&raw);

		if set.is_empty() && !raw.is_empty() {
			return Err(DeError::custom(ScopeValidationError::Empty));
		}

		Ok(set)
	}
}

/// Human-readable description of a scope, shown on the approval prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDescription {
	/// Scope identifier.
	pub scope: String,
	/// Localized description.
	pub description: String,
}
impl ScopeDescription {
	/// Creates a new description.
	pub fn new(scope: impl Into<String>, description: impl Into<String>) -> Self {
		Self { scope: scope.into(), description: description.into() }
	}

	/// Falls back to the raw scope names when no descriptions are available.
	pub fn fallback(scopes: &ScopeSet) -> Vec<Self> {
		scopes.iter().map(|scope| Self::new(scope, scope)).collect()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_tolerates_repeated_separators() {
		let scopes = ScopeSet::parse("  s1   s2    s3 ");

		assert_eq!(scopes.len(), 3);
		assert_eq!(scopes.iter().collect::<Vec<_>>(), vec!["s1", "s2", "s3"]);
		assert!(ScopeSet::parse("   ").is_empty());
	}

	#[test]
	fn order_is_irrelevant() {
		let lhs = ScopeSet::parse("profile email email");
		let rhs = ScopeSet::new(["email", "profile"]).expect("Scope entries should be valid.");

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.to_string(), "email profile");
		assert!(lhs.contains("email"));
		assert!(!lhs.contains("openid"));
	}

	#[test]
	fn new_rejects_invalid_entries() {
		assert_eq!(ScopeSet::new([""]), Err(ScopeValidationError::Empty));
		assert!(matches!(
			ScopeSet::new(["contains space"]),
			Err(ScopeValidationError::ContainsWhitespace { .. })
		));
	}

	#[test]
	fn serde_uses_space_delimited_strings() {
		let scopes = ScopeSet::parse("write read");
		let payload = serde_json::to_string(&scopes).expect("Scope set should serialize.");

		assert_eq!(payload, "\"read write\"");

		let round_trip: ScopeSet =
			serde_json::from_str(&payload).expect("Scope set should deserialize.");

		assert_eq!(round_trip, scopes);
		assert!(serde_json::from_str::<ScopeSet>("\"   \"").is_err());
	}

	#[test]
	fn fallback_descriptions_reuse_scope_names() {
		let descriptions = ScopeDescription::fallback(&ScopeSet::parse("b a"));

		assert_eq!(
			descriptions,
			vec![ScopeDescription::new("a", "a"), ScopeDescription::new("b", "b")]
		);
	}
}
