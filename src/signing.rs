//! HMAC state binding for the approval round-trip and login anti-forgery tokens.
//!
//! An approval prompt travels through the browser, so the authority signs the pending request
//! instead of storing it. The signing key is derived per transaction from the server key, the
//! expiration timestamp, and the session identifier:
//!
//! ```text
//! key = HMAC-SHA256(server_key, expiration_time || session_id)
//! mac = HMAC-SHA256(key, encode(params) || expiration_time || session_id)
//! ```
//!
//! `expiration_time` is the decimal form of a Unix timestamp in nanoseconds and `encode` is the
//! canonical form encoding from [`Parameters::encode`]. Verification is constant time.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::{ServerKey, SessionId},
	oauth::Parameters,
};

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes.
pub const MAC_LEN: usize = 32;

/// Reasons a submitted approval state is rejected.
///
/// Endpoints collapse every variant into the same response; the distinction only reaches logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum ApprovalStateError {
	/// `expiration_time` is not a decimal integer.
	#[error("Approval expiration time is malformed.")]
	MalformedExpiration,
	/// `expiration_time` is not in the future.
	#[error("Approval state has expired.")]
	Expired,
	/// `signature` is not valid base64.
	#[error("Approval signature is not valid base64.")]
	MalformedSignature,
	/// Recomputed MAC differs from the submitted signature.
	#[error("Approval signature does not match.")]
	SignatureMismatch,
	/// Timestamp cannot be represented as signed 64-bit nanoseconds.
	#[error("Approval timestamp is out of range.")]
	TimestampOutOfRange,
}

/// Transaction-specific key derived from the server key.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; MAC_LEN]);
impl DerivedKey {
	/// Returns the raw key bytes.
	pub fn expose(&self) -> &[u8; MAC_LEN] {
		&self.0
	}
}
impl Debug for DerivedKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("DerivedKey(<redacted>)")
	}
}

/// Signs and verifies parameter sets and CSRF nonces under the server key.
#[derive(Clone, Debug)]
pub struct SignedStateCodec {
	server_key: ServerKey,
}
impl SignedStateCodec {
	/// Creates a codec bound to the provided server key.
	pub fn new(server_key: ServerKey) -> Self {
		Self { server_key }
	}

	/// Derives the transaction key for an expiration time and session.
	pub fn derive_key(&self, expiration_time: i64, session: &SessionId) -> DerivedKey {
		let mut mac = keyed(self.server_key.expose());

		mac.update(expiration_time.to_string().as_bytes());
		mac.update(session.as_bytes());

		DerivedKey(mac.finalize().into_bytes().into())
	}

	/// Computes the MAC over the canonical parameter encoding, expiration time, and session.
	pub fn compute_mac(
		params: &Parameters,
		expiration_time: i64,
		session: &SessionId,
		key: &DerivedKey,
	) -> [u8; MAC_LEN] {
		bound_mac(key, &params.encode(), expiration_time, session).finalize().into_bytes().into()
	}

	/// Derives the transaction key and signs the parameter set in one step.
	pub fn sign(
		&self,
		params: &Parameters,
		expiration_time: i64,
		session: &SessionId,
	) -> [u8; MAC_LEN] {
		let key = self.derive_key(expiration_time, session);

		Self::compute_mac(params, expiration_time, session, &key)
	}

	/// Verifies a signature over the parameter set in constant time.
	pub fn verify(
		&self,
		params: &Parameters,
		expiration_time: i64,
		session: &SessionId,
		signature: &[u8],
	) -> bool {
		self.verify_encoded(&params.encode(), expiration_time, session, signature)
	}

	fn verify_encoded(
		&self,
		encoded_params: &str,
		expiration_time: i64,
		session: &SessionId,
		signature: &[u8],
	) -> bool {
		let key = self.derive_key(expiration_time, session);

		bound_mac(&key, encoded_params, expiration_time, session).verify_slice(signature).is_ok()
	}

	/// Anti-forgery token for a login nonce: `HMAC-SHA256(server_key, nonce)`.
	pub fn csrf_token(&self, nonce: &str) -> [u8; MAC_LEN] {
		let mut mac = keyed(self.server_key.expose());

		mac.update(nonce.as_bytes());

		mac.finalize().into_bytes().into()
	}

	/// Verifies a login anti-forgery token in constant time.
	pub fn verify_csrf(&self, nonce: &str, token: &[u8]) -> bool {
		let mut mac = keyed(self.server_key.expose());

		mac.update(nonce.as_bytes());

		mac.verify_slice(token).is_ok()
	}
}

/// Signed approval state reconstructed on every request; never persisted.
///
/// The state is a bearer token: it stays valid for every submission until
/// `expiration_time`, and nothing records that it was used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalState {
	/// Absolute expiration as Unix nanoseconds.
	pub expiration_time: i64,
	/// Session the approval is bound to.
	pub session_id: SessionId,
	/// Raw HMAC tag.
	pub signature: Vec<u8>,
	/// Canonical encoding of the signed parameters.
	pub encoded_params: String,
}
impl ApprovalState {
	/// Signs `params` for `session`, expiring at `expires_at`.
	pub fn issue(
		codec: &SignedStateCodec,
		params: &Parameters,
		session: SessionId,
		expires_at: OffsetDateTime,
	) -> Result<Self, ApprovalStateError> {
		let expiration_time = unix_nanos(expires_at)?;
		let signature = codec.sign(params, expiration_time, &session).to_vec();

		let encoded_params = params.encode();

		Ok(Self { expiration_time, session_id: session, signature, encoded_params })
	}

	/// Rebuilds the state from submitted form fields.
	///
	/// Rejects malformed or already expired timestamps and undecodable signatures; the MAC is
	/// checked separately by [`verify`](Self::verify).
	pub fn from_submission(
		params: &Parameters,
		session: SessionId,
		expiration_time: &str,
		signature: &str,
		now: OffsetDateTime,
	) -> Result<Self, ApprovalStateError> {
		let expiration_time = expiration_time
			.parse::<i64>()
			.map_err(|_| ApprovalStateError::MalformedExpiration)?;

		if expiration_time <= unix_nanos(now)? {
			return Err(ApprovalStateError::Expired);
		}

		let signature =
			STANDARD.decode(signature).map_err(|_| ApprovalStateError::MalformedSignature)?;

		let encoded_params = params.encode();

		Ok(Self { expiration_time, session_id: session, signature, encoded_params })
	}

	/// Verifies the signature against a recomputed MAC.
	pub fn verify(&self, codec: &SignedStateCodec) -> Result<(), ApprovalStateError> {
		if codec.verify_encoded(
			&self.encoded_params,
			self.expiration_time,
			&self.session_id,
			&self.signature,
		) {
			Ok(())
		} else {
			Err(ApprovalStateError::SignatureMismatch)
		}
	}

	/// Standard base64 encoding of the signature, as embedded in the approval form.
	pub fn signature_base64(&self) -> String {
		STANDARD.encode(&self.signature)
	}
}

/// Converts an instant into signed 64-bit Unix nanoseconds.
pub fn unix_nanos(instant: OffsetDateTime) -> Result<i64, ApprovalStateError> {
	i64::try_from(instant.unix_timestamp_nanos())
		.map_err(|_| ApprovalStateError::TimestampOutOfRange)
}

fn keyed(key: &[u8]) -> HmacSha256 {
	HmacSha256::new_from_slice(key).expect("HMAC can take key of any size")
}

fn bound_mac(
	key: &DerivedKey,
	encoded_params: &str,
	expiration_time: i64,
	session: &SessionId,
) -> HmacSha256 {
	let mut mac = keyed(&key.0);

	mac.update(encoded_params.as_bytes());
	mac.update(expiration_time.to_string().as_bytes());
	mac.update(session.as_bytes());

	mac
}
