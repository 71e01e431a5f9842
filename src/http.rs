//! Transport primitives for dispatching composed requests.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. The client composes a
//! [`TransportRequest`], hands it to the transport, and receives a buffered
//! [`TransportResponse`] whose body can be read exactly once, as JSON or as text.
//! Timeouts and cancellation are the transport's responsibility; they surface as
//! [`TransportError`](crate::error::TransportError) values like any other dispatch failure.

pub mod headers;

pub use headers::*;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::dispatch`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// HTTP verbs issued by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// GET request.
	Get,
	/// POST request.
	Post,
	/// PUT request.
	Put,
	/// PATCH request.
	Patch,
	/// DELETE request.
	Delete,
}
impl Method {
	/// Returns the canonical verb token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl Serialize for Method {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// A fully composed outgoing request handed to the transport.
#[derive(Clone, Debug)]
pub struct TransportRequest {
	/// HTTP verb.
	pub method: Method,
	/// Fully composed URL, including any query string.
	pub url: String,
	/// Merged headers in final precedence order.
	pub headers: HeaderBag,
	/// Encoded body, when the request carries one.
	pub body: Option<String>,
}

/// Buffered response surfaced by a transport.
#[derive(Clone, Debug)]
pub struct TransportResponse {
	status: u16,
	status_text: String,
	body: Vec<u8>,
}
impl TransportResponse {
	/// Creates a response from the transport's status line and buffered body.
	pub fn new(status: u16, status_text: impl Into<String>, body: Vec<u8>) -> Self {
		Self { status, status_text: status_text.into(), body }
	}

	/// HTTP status code.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Reason phrase reported by the transport; empty when unknown.
	pub fn status_text(&self) -> &str {
		&self.status_text
	}

	/// Returns `true` for 2xx statuses.
	pub fn ok(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Reads the body as JSON, consuming the response.
	pub fn json<T>(self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
	}

	/// Reads the body as UTF-8 text, consuming the response.
	pub fn text(self) -> Result<String, std::string::FromUtf8Error> {
		String::from_utf8(self.body)
	}

	pub(crate) fn body_bytes(&self) -> &[u8] {
		&self.body
	}
}

/// Abstraction over HTTP transports capable of executing composed requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can back the
/// client and its auth factories without additional wrappers. The returned future buffers
/// the full response body before resolving.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Dispatches a composed request and buffers the response.
	fn dispatch(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Configure timeouts, proxies, and TLS on the wrapped client; the crate adds nothing on
/// top of what the caller provisions.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn dispatch(&self, request: TransportRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let url =
				Url::parse(&request.url).map_err(|source| TransportError::InvalidUrl { source })?;
			let mut builder = client.request(request.method.into(), url);

			for (name, value) in request.headers.iter() {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let status_text = status.canonical_reason().unwrap_or_default().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?;

			Ok(TransportResponse::new(status.as_u16(), status_text, body.to_vec()))
		})
	}
}
