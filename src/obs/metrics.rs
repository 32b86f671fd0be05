// self
use crate::obs::{EndpointKind, EndpointOutcome};

/// Records an endpoint outcome via the global metrics recorder (when enabled).
pub fn record_endpoint_outcome(kind: EndpointKind, outcome: EndpointOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_authority_endpoint_total",
			"endpoint" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
