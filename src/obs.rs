//! Optional observability helpers for authority endpoints.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `oauth2_authority.endpoint` with
//!   the `endpoint` and `stage` fields, plus debug/warn events for rejected and failed requests.
//! - Enable `metrics` to increment the `oauth2_authority_endpoint_total` counter for every
//!   attempt/success/rejection/failure, labeled by `endpoint` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// crates.io
use axum::http::StatusCode;
// self
use crate::_prelude::*;

/// Endpoints observed by the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
	/// Token endpoint.
	Token,
	/// Authorization endpoint.
	Auth,
	/// Approval endpoint.
	Approval,
	/// Login endpoint.
	Login,
}
impl EndpointKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointKind::Token => "token",
			EndpointKind::Auth => "auth",
			EndpointKind::Approval => "approval",
			EndpointKind::Login => "login",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointOutcome {
	/// Request entered an endpoint.
	Attempt,
	/// Request completed with a 2xx or 3xx response.
	Success,
	/// Request was refused with a 4xx response.
	Rejected,
	/// Request failed with a 5xx response.
	Failure,
}
impl EndpointOutcome {
	/// Classifies a final response status.
	pub fn from_status(status: StatusCode) -> Self {
		if status.is_server_error() {
			EndpointOutcome::Failure
		} else if status.is_client_error() {
			EndpointOutcome::Rejected
		} else {
			EndpointOutcome::Success
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointOutcome::Attempt => "attempt",
			EndpointOutcome::Success => "success",
			EndpointOutcome::Rejected => "rejected",
			EndpointOutcome::Failure => "failure",
		}
	}
}
impl Display for EndpointOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcomes_follow_status_classes() {
		assert_eq!(EndpointOutcome::from_status(StatusCode::OK), EndpointOutcome::Success);
		assert_eq!(EndpointOutcome::from_status(StatusCode::FOUND), EndpointOutcome::Success);
		assert_eq!(
			EndpointOutcome::from_status(StatusCode::UNAUTHORIZED),
			EndpointOutcome::Rejected
		);
		assert_eq!(
			EndpointOutcome::from_status(StatusCode::SERVICE_UNAVAILABLE),
			EndpointOutcome::Failure
		);
	}
}
