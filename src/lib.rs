//! Rust's pluggable OAuth 2.0 authorization server core - strategy-driven token and approval
//! endpoints, HMAC-bound consent state, and axum-ready routing in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod grant;
pub mod http;
pub mod middleware;
pub mod oauth;
pub mod obs;
pub mod registry;
pub mod response_type;
pub mod service;
pub mod signing;
pub mod view;

pub use config::{AuthorityConfig, AuthorityConfigBuilder};
pub use endpoint::Authority;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::Result;
}

pub use axum;
pub use url;
