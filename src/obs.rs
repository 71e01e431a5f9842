//! Observability: the logger collaborator contract, sensitive-header redaction, and
//! optional tracing/metrics emitters.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to route [`HttpLogger`] events through [`TracingLogger`] and to emit
//!   structured spans named `http_courier.exchange` around token acquisitions.
//! - Enable `metrics` to increment the `http_courier_requests_total` counter for every
//!   request (labeled by `method` + `outcome`) and `http_courier_token_exchanges_total`
//!   for every token exchange (labeled by `grant` + `outcome`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{
	_prelude::*,
	http::{HeaderBag, Method, TransportRequest},
};

/// Headers stripped from log projections unless callers override the list.
pub const DEFAULT_SENSITIVE_HEADERS: &[&str] = &["Authorization", "X-API-Key"];

/// Severity levels understood by the logger collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	/// Suppresses the event entirely.
	None,
	/// Failure events.
	Error,
	/// Degraded-but-proceeding events.
	Warn,
	/// Operational events.
	Info,
	/// High-volume diagnostics.
	Verbose,
}
impl LogLevel {
	/// Returns a stable label suitable for log or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LogLevel::None => "none",
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Verbose => "verbose",
		}
	}
}
impl Display for LogLevel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Structured context handed to the logger with every event.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LogContext<'a> {
	/// Service name configured on the client.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub service: Option<&'a str>,
	/// Wall-clock duration of the dispatch, in milliseconds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u128>,
	/// HTTP status code, once a response arrived.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<u16>,
	/// Reason phrase, once a response arrived.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status_text: Option<&'a str>,
	/// Redacted request projection.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub request: Option<&'a LoggableRequest>,
	/// Rendered error, on failure events.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Leveled structured logger collaborator.
///
/// Logging is side-effect-only: the client never lets a log call alter a request's
/// outcome. Implementations must not panic. `level` is never [`LogLevel::None`]; events
/// configured at that level are suppressed before reaching the logger.
pub trait HttpLogger: Send + Sync {
	/// Records one event with its structured context.
	fn log(&self, level: LogLevel, message: &str, context: &LogContext<'_>);
}

/// Redacted projection of an outgoing request, safe to hand to loggers.
///
/// The body is never projected; headers whose names case-insensitively match the
/// configured sensitive list are removed rather than masked.
#[derive(Clone, Debug, Serialize)]
pub struct LoggableRequest {
	/// HTTP verb.
	pub method: Method,
	/// Fully composed URL.
	pub url: String,
	/// Headers surviving redaction.
	pub headers: HeaderBag,
}
impl LoggableRequest {
	/// Projects a composed request, stripping sensitive headers.
	pub fn project(request: &TransportRequest, sensitive: &[String]) -> Self {
		Self {
			method: request.method,
			url: request.url.clone(),
			headers: redact_headers(&request.headers, sensitive),
		}
	}
}

/// Returns a copy of `headers` without entries whose names case-insensitively match any
/// name in `sensitive`.
pub fn redact_headers(headers: &HeaderBag, sensitive: &[String]) -> HeaderBag {
	headers
		.iter()
		.filter(|(name, _)| !sensitive.iter().any(|entry| entry.eq_ignore_ascii_case(name)))
		.collect()
}

/// Token grants observed by the auth factories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantKind {
	/// Client credentials grant.
	ClientCredentials,
	/// On-behalf-of (JWT bearer assertion) grant.
	OnBehalfOf,
}
impl GrantKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantKind::ClientCredentials => "client_credentials",
			GrantKind::OnBehalfOf => "on_behalf_of",
		}
	}
}
impl Display for GrantKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request or exchange attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry into the pipeline.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::headers::names;

	fn sensitive() -> Vec<String> {
		DEFAULT_SENSITIVE_HEADERS.iter().map(|name| (*name).to_owned()).collect()
	}

	#[test]
	fn redaction_removes_sensitive_headers_case_insensitively() {
		let headers = HeaderBag::new()
			.with("authorization", "Bearer x")
			.with("X-API-Key", "y")
			.with("X-Other", "z");
		let redacted = redact_headers(&headers, &sensitive());

		assert!(!redacted.contains(names::AUTHORIZATION));
		assert!(!redacted.contains("x-api-key"));
		assert_eq!(redacted.get("X-Other"), Some("z"));
		assert_eq!(redacted.len(), 1);
	}

	#[test]
	fn projection_drops_the_body() {
		let request = TransportRequest {
			method: Method::Post,
			url: "https://api.example.com/things".into(),
			headers: HeaderBag::new().with(names::AUTHORIZATION, "Bearer x").with("Accept", "*/*"),
			body: Some(r#"{"secret":"value"}"#.into()),
		};
		let projection = LoggableRequest::project(&request, &sensitive());
		let json =
			serde_json::to_string(&projection).expect("Loggable projection should serialize.");

		assert!(!json.contains("secret"));
		assert!(!json.contains("Bearer"));
		assert!(json.contains(r#""method":"POST""#));
		assert!(json.contains(r#""Accept":"*/*""#));
	}
}
