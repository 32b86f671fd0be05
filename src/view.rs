//! Browser-facing views and the rendering collaborator that turns them into HTML.

pub mod html;

pub use html::HtmlRenderer;

// self
use crate::{_prelude::*, auth::ScopeDescription, error::BoxError, oauth::ErrorCode};

/// Consent screen payload binding a pending request to the user's session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPrompt {
	/// Scope descriptions shown to the user.
	pub scopes: Vec<ScopeDescription>,
	/// Absolute expiration as Unix nanoseconds; posted back as `expiration_time`.
	pub expiration_time: i64,
	/// Standard base64 signature; posted back as `signature`.
	pub signature: String,
	/// Canonical encoding of the signed parameters, opaque to the browser.
	pub parameters: String,
	/// Form action: the approval path with `parameters` as its query.
	pub action: String,
}

/// Login form payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
	/// Prefilled email after a failed attempt.
	pub email: String,
	/// Inline error shown above the form.
	pub error_message: Option<String>,
	/// Standard base64 anti-forgery token; posted back as `csrf`.
	pub csrf: String,
	/// Form action: the login path carrying the `continue` target.
	pub action: String,
}

/// Error page payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPage {
	/// HTTP status of the page.
	pub status: u16,
	/// OAuth error code.
	pub error: ErrorCode,
	/// Human-readable explanation.
	pub error_description: Option<String>,
}

/// A template name plus its data payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template", content = "data", rename_all = "snake_case")]
pub enum View {
	/// Consent screen.
	ApprovalPrompt(ApprovalPrompt),
	/// Login form.
	Login(LoginForm),
	/// Error page.
	Error(ErrorPage),
}
impl View {
	/// Stable template name.
	pub const fn template(&self) -> &'static str {
		match self {
			View::ApprovalPrompt(_) => "approval_prompt",
			View::Login(_) => "login",
			View::Error(_) => "error",
		}
	}
}

/// Rendering failure; endpoints answer it with a bare 500.
#[derive(Debug, ThisError)]
#[error("Template {template} failed to render.")]
pub struct RenderError {
	/// Template that failed.
	pub template: &'static str,
	/// Underlying renderer error.
	#[source]
	pub source: BoxError,
}
impl RenderError {
	/// Wraps a renderer-specific failure.
	pub fn new(template: &'static str, src: impl 'static + Send + Sync + StdError) -> Self {
		Self { template, source: Box::new(src) }
	}
}

/// Template-rendering collaborator.
pub trait ViewRenderer
where
	Self: Send + Sync,
{
	/// Renders `view` into an HTML document.
	fn render(&self, view: &View) -> Result<String, RenderError>;
}
