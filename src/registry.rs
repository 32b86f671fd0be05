//! Immutable string-keyed strategy registries built once at startup.

// self
use crate::_prelude::*;

/// Read-only map from a wire identifier (`grant_type`, `response_type`) to a strategy.
pub struct StrategyRegistry<S>
where
	S: ?Sized,
{
	strategies: HashMap<String, Arc<S>>,
}
impl<S> StrategyRegistry<S>
where
	S: ?Sized,
{
	/// Starts an empty builder.
	pub fn builder() -> StrategyRegistryBuilder<S> {
		StrategyRegistryBuilder { strategies: HashMap::new() }
	}

	/// Resolves the strategy registered under `key`.
	pub fn get(&self, key: &str) -> Option<&S> {
		self.strategies.get(key).map(Arc::as_ref)
	}

	/// Returns true when a strategy is registered under `key`.
	pub fn contains(&self, key: &str) -> bool {
		self.strategies.contains_key(key)
	}

	/// Registered keys in ascending order.
	pub fn keys(&self) -> Vec<&str> {
		let mut keys = self.strategies.keys().map(String::as_str).collect::<Vec<_>>();

		keys.sort_unstable();

		keys
	}

	/// Number of registered strategies.
	pub fn len(&self) -> usize {
		self.strategies.len()
	}

	/// Returns true when nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.strategies.is_empty()
	}
}
impl<S> Clone for StrategyRegistry<S>
where
	S: ?Sized,
{
	fn clone(&self) -> Self {
		Self { strategies: self.strategies.clone() }
	}
}
impl<S> Debug for StrategyRegistry<S>
where
	S: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("StrategyRegistry").field(&self.keys()).finish()
	}
}

/// Builder for [`StrategyRegistry`]; the registry cannot change once built.
pub struct StrategyRegistryBuilder<S>
where
	S: ?Sized,
{
	strategies: HashMap<String, Arc<S>>,
}
impl<S> StrategyRegistryBuilder<S>
where
	S: ?Sized,
{
	/// Registers `strategy` under `key`, replacing any previous registration.
	pub fn register(mut self, key: impl Into<String>, strategy: Arc<S>) -> Self {
		self.strategies.insert(key.into(), strategy);

		self
	}

	/// Freezes the registry.
	pub fn build(self) -> StrategyRegistry<S> {
		StrategyRegistry { strategies: self.strategies }
	}
}
