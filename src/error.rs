//! Client-level error types shared across auth factories, transports, and the request
//! pipeline.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint exchange failure.
	#[error(transparent)]
	TokenExchange(#[from] TokenExchangeError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Non-success response classification.
	#[error(transparent)]
	Response(#[from] ResponseError),

	/// Settled failure of a cached token acquisition, handed to every caller of the flight
	/// that produced it.
	#[error("{0}")]
	Acquisition(Arc<Error>),
	/// Success response whose body did not match the caller's declared type.
	#[error("Response body did not match the expected shape.")]
	Decode {
		/// Structured deserialization failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response being decoded.
		status: u16,
	},
}

/// Configuration and request-construction failures raised locally, before dispatch.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Request path cannot be resolved against the configured base URL.
	#[error("Request path cannot be resolved against the base URL.")]
	UrlJoin {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body cannot be serialized as JSON.
	#[error("Request body cannot be serialized as JSON.")]
	BodySerialize {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// On-behalf-of header resolution was invoked without an assertion context.
	#[error("On-behalf-of resolution requires an assertion in the request context.")]
	MissingAssertion,
}

/// Failures reported by a token endpoint exchange.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Token endpoint returned a non-success status.
	#[error("Token endpoint returned HTTP {status} {status_text}.")]
	Endpoint {
		/// HTTP status code.
		status: u16,
		/// Reason phrase reported by the transport.
		status_text: String,
		/// Best-effort captured response body.
		body: ErrorBody,
	},
	/// Token endpoint returned a success status without a usable access token.
	#[error("Token endpoint returned no access token.")]
	MissingAccessToken {
		/// HTTP status code of the offending response.
		status: u16,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the offending response.
		status: u16,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while dispatching the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while dispatching the request.")]
	Io(#[from] std::io::Error),
	/// Request URL could not be parsed by the transport.
	#[error("Request URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Error raised when a response is classified as a failure (non-2xx status).
#[derive(Debug, ThisError)]
#[error("HTTP error: {status} {status_text}.")]
pub struct ResponseError {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase reported by the transport.
	pub status_text: String,
	/// Best-effort captured response body.
	pub body: ErrorBody,
}

/// Best-effort captured response body attached to classification errors.
///
/// Extraction attempts a JSON parse first and falls back to raw text; both failures are
/// tolerated and leave the fields unset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ErrorBody {
	/// Parsed JSON body, when the payload was valid JSON.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub json: Option<serde_json::Value>,
	/// Raw text body, when the payload was valid UTF-8 but not JSON.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
}
impl ErrorBody {
	/// Returns `true` when neither representation could be captured.
	pub fn is_empty(&self) -> bool {
		self.json.is_none() && self.text.is_none()
	}

	pub(crate) fn extract(bytes: &[u8]) -> Self {
		if bytes.is_empty() {
			return Self::default();
		}
		if let Ok(json) = serde_json::from_slice(bytes) {
			return Self { json: Some(json), text: None };
		}

		Self { json: None, text: String::from_utf8(bytes.to_vec()).ok() }
	}
}
