//! Provider strategy hooks that classify token endpoint failures.
//!
//! Implementations normalize error mapping without tying the client to any particular HTTP
//! client.

// self
use crate::_prelude::*;

/// Strategy hook that maps token endpoint failures into the crate taxonomy.
///
/// Implementors are required to be `Send + Sync`, and the hook uses crate-owned data types so
/// downstream crates never depend on reqwest-specific structures.
pub trait ProviderStrategy: Send + Sync {
	/// Classifies a failed refresh request.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider rejected the refresh token.
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes exceed what the token covers.
	InsufficientScope,
	/// Failure is temporary.
	Transient,
}

/// Context passed to provider strategies when classifying token errors.
///
/// Only primitive data is kept (status code, error fields, body preview).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied error code (`error` or Fitbit `errorType`).
	pub oauth_error: Option<String>,
	/// Provider-supplied description (`error_description` or Fitbit `message`).
	pub error_description: Option<String>,
	/// Preview of the response body for payloads without structured fields.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a context from an error response, extracting structured fields when present.
	///
	/// Understands Fitbit's `{"errors":[{"errorType":..,"message":..}]}` envelope as well as
	/// the RFC 6749 `{"error":..,"error_description":..}` shape.
	pub fn from_response(status: u16, body: &[u8]) -> Self {
		let mut ctx = Self::new().with_http_status(status);

		match serde_json::from_slice::<ErrorBody>(body) {
			Ok(parsed) => {
				if let Some(first) = parsed.errors.into_iter().next() {
					ctx.oauth_error = first.error_type;
					ctx.error_description = first.message;
				} else {
					ctx.oauth_error = parsed.error;
					ctx.error_description = parsed.error_description;
				}
			},
			Err(_) => {
				let text = String::from_utf8_lossy(body);

				if !text.trim().is_empty() {
					ctx = ctx.with_body_preview(text.trim());
				}
			},
		}

		ctx
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds a body preview for providers that return unstructured payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Best human-readable summary: description, then error code, then body preview.
	pub fn summary(&self) -> Option<&str> {
		self.error_description
			.as_deref()
			.or(self.oauth_error.as_deref())
			.or(self.body_preview.as_deref())
	}
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
	errors: Vec<FitbitErrorEntry>,
	error: Option<String>,
	error_description: Option<String>,
}

#[derive(Deserialize)]
struct FitbitErrorEntry {
	#[serde(rename = "errorType")]
	error_type: Option<String>,
	message: Option<String>,
}

/// Default strategy for the Fitbit token endpoint.
///
/// It prioritizes structured error fields, then body text hints, and finally the HTTP status
/// code.
#[derive(Debug, Default)]
pub struct FitbitStrategy;
impl ProviderStrategy for FitbitStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		if let Some(kind) =
			classify_error_code(ctx.oauth_error.as_deref(), ctx.error_description.as_deref())
		{
			return kind;
		}
		if let Some(kind) = classify_body(ctx.body_preview.as_deref()) {
			return kind;
		}

		classify_status(ctx.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf: String = body.chars().take(ProviderErrorContext::BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}

fn classify_error_code(
	error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	const INVALID_GRANT: &[&str] = &["invalid_grant", "expired_token", "access_denied"];
	const INVALID_CLIENT: &[&str] = &["invalid_client", "unauthorized_client"];
	const INSUFFICIENT_SCOPE: &[&str] =
		&["invalid_scope", "insufficient_scope", "insufficient_permissions"];
	const TRANSIENT: &[&str] = &["temporarily_unavailable", "server_error", "system"];

	let matches = |set: &[&str]| set.iter().any(|code| value.eq_ignore_ascii_case(code));

	if matches(INVALID_GRANT) {
		Some(ProviderErrorKind::InvalidGrant)
	} else if matches(INVALID_CLIENT) {
		Some(ProviderErrorKind::InvalidClient)
	} else if matches(INSUFFICIENT_SCOPE) {
		Some(ProviderErrorKind::InsufficientScope)
	} else if matches(TRANSIENT) {
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ProviderErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") || text.contains("refresh token invalid") =>
			Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn fitbit_envelope_is_extracted() {
		let body = br#"{"errors":[{"errorType":"invalid_grant","message":"Refresh token invalid: abc."}],"success":false}"#;
		let ctx = ProviderErrorContext::from_response(400, body);

		assert_eq!(ctx.oauth_error.as_deref(), Some("invalid_grant"));
		assert_eq!(ctx.summary(), Some("Refresh token invalid: abc."));
		assert_eq!(FitbitStrategy.classify_token_error(&ctx), ProviderErrorKind::InvalidGrant);
	}

	#[test]
	fn rfc6749_body_is_extracted() {
		let ctx =
			ProviderErrorContext::from_response(401, br#"{"error":"invalid_client"}"#);

		assert_eq!(ctx.summary(), Some("invalid_client"));
		assert_eq!(FitbitStrategy.classify_token_error(&ctx), ProviderErrorKind::InvalidClient);
	}

	#[test]
	fn unstructured_bodies_fall_back_to_preview_and_status() {
		let ctx = ProviderErrorContext::from_response(503, b"upstream unavailable");

		assert_eq!(ctx.body_preview.as_deref(), Some("upstream unavailable"));
		assert_eq!(FitbitStrategy.classify_token_error(&ctx), ProviderErrorKind::Transient);

		let ctx = ProviderErrorContext::from_response(403, b"");

		assert_eq!(ctx.body_preview, None);
		assert_eq!(
			FitbitStrategy.classify_token_error(&ctx),
			ProviderErrorKind::InsufficientScope
		);
	}

	#[test]
	fn long_previews_are_truncated() {
		let ctx = ProviderErrorContext::new().with_body_preview("x".repeat(300));
		let preview = ctx.body_preview.expect("Preview should be recorded.");

		assert_eq!(preview.chars().count(), ProviderErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}
