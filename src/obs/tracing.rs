// self
use crate::{_prelude::*, obs::EndpointKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedEndpoint<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedEndpoint<F> = F;

/// A span builder used by authority endpoints.
#[derive(Clone, Debug)]
pub struct EndpointSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl EndpointSpan {
	/// Creates a new span tagged with the provided endpoint kind + stage.
	pub fn new(kind: EndpointKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth2_authority.endpoint", endpoint = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedEndpoint<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a request the endpoint refused; `reason` must not contain secrets.
pub fn log_rejection(kind: EndpointKind, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(endpoint = kind.as_str(), %reason, "request rejected");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, reason);
	}
}

/// Logs a collaborator failure that was masked from the client.
pub fn log_failure(kind: EndpointKind, operation: &'static str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		let source = error.source().map(ToString::to_string);

		tracing::warn!(
			endpoint = kind.as_str(),
			operation,
			error = %error,
			source = source.as_deref(),
			"collaborator call failed"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, operation, error);
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::io::Error as IoError;
	// self
	use super::*;

	#[test]
	fn logging_helpers_accept_any_error() {
		log_rejection(EndpointKind::Token, &"missing grant_type");
		log_failure(EndpointKind::Login, "authenticate_user", &IoError::other("offline"));
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = EndpointSpan::new(EndpointKind::Auth, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
