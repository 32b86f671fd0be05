//! OAuth 2.0 wire vocabulary: parameter names, canonical parameter sets, and response payloads.

pub mod params;
pub mod response;

pub use params::*;
pub use response::*;
