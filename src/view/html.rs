//! Dependency-free HTML renderer used when no custom [`ViewRenderer`] is supplied.

// self
use crate::{
	_prelude::*,
	view::{ApprovalPrompt, ErrorPage, LoginForm, RenderError, View, ViewRenderer},
};

const STYLE: &str = "body{font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",Roboto,sans-serif;\
background:#f5f5f5;margin:0;display:flex;justify-content:center;align-items:center;min-height:100vh}\
.card{background:#fff;border-radius:8px;box-shadow:0 2px 8px rgba(0,0,0,.1);padding:32px;max-width:400px;width:100%}\
h1{font-size:20px;margin:0 0 16px;color:#333}label{display:block;font-size:14px;margin:12px 0 6px}\
input[type=email],input[type=password]{width:100%;padding:10px;border:1px solid #ddd;border-radius:4px;box-sizing:border-box}\
button{width:100%;padding:10px;background:#4a90d9;color:#fff;border:none;border-radius:4px;margin-top:16px;cursor:pointer}\
.error{background:#fee;border:1px solid #c00;color:#c00;padding:10px;border-radius:4px;margin-bottom:16px}";

/// Minimal built-in renderer; every interpolated value is HTML-escaped.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer;
impl ViewRenderer for HtmlRenderer {
	fn render(&self, view: &View) -> Result<String, RenderError> {
		let (title, body) = match view {
			View::ApprovalPrompt(prompt) => ("Authorize access", approval_prompt(prompt)),
			View::Login(form) => ("Sign in", login(form)),
			View::Error(page) => ("Error", error(page)),
		};

		Ok(format!(
			"<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
			<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\n\
			<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
			<div class=\"card\">\n{body}</div>\n</body>\n</html>\n"
		))
	}
}

fn approval_prompt(prompt: &ApprovalPrompt) -> String {
	let scopes = prompt
		.scopes
		.iter()
		.map(|scope| format!("<li>{}</li>\n", escape(&scope.description)))
		.collect::<String>();

	format!(
		"<h1>Authorize access</h1>\n<p>The application is requesting permission to:</p>\n\
		<ul>\n{scopes}</ul>\n\
		<form method=\"POST\" action=\"{action}\">\n\
		<input type=\"hidden\" name=\"expiration_time\" value=\"{expiration_time}\">\n\
		<input type=\"hidden\" name=\"signature\" value=\"{signature}\">\n\
		<button type=\"submit\">Allow</button>\n</form>\n",
		action = escape(&prompt.action),
		expiration_time = prompt.expiration_time,
		signature = escape(&prompt.signature),
	)
}

fn login(form: &LoginForm) -> String {
	let error = form
		.error_message
		.as_deref()
		.map(|message| format!("<div class=\"error\">{}</div>\n", escape(message)))
		.unwrap_or_default();

	format!(
		"<h1>Sign in</h1>\n{error}\
		<form method=\"POST\" action=\"{action}\">\n\
		<input type=\"hidden\" name=\"csrf\" value=\"{csrf}\">\n\
		<label for=\"email\">Email</label>\n\
		<input type=\"email\" id=\"email\" name=\"email\" value=\"{email}\" required autofocus>\n\
		<label for=\"password\">Password</label>\n\
		<input type=\"password\" id=\"password\" name=\"password\" required>\n\
		<button type=\"submit\">Sign in</button>\n</form>\n",
		action = escape(&form.action),
		csrf = escape(&form.csrf),
		email = escape(&form.email),
	)
}

fn error(page: &ErrorPage) -> String {
	let description = page
		.error_description
		.as_deref()
		.map(|description| format!("<p>{}</p>\n", escape(description)))
		.unwrap_or_default();

	format!("<h1>{} {}</h1>\n{description}", page.status, escape(page.error.as_str()))
}

fn escape(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());

	for c in raw.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#x27;"),
			_ => escaped.push(c),
		}
	}

	escaped
}
