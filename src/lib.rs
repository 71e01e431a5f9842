//! Rust's turnkey authenticated HTTP client—pluggable auth factories, correlation-aware
//! request composition, and redaction-first observability in one crate built for services.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod ext;
pub mod http;
pub mod obs;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience helpers for exercising the client in tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::obs::{HttpLogger, LogContext, LogLevel};

	/// One event captured by [`RecordingLogger`].
	#[derive(Clone, Debug)]
	pub struct RecordedEvent {
		/// Level the event was emitted at.
		pub level: LogLevel,
		/// Event message.
		pub message: String,
		/// Structured context serialized to a JSON value.
		pub context: serde_json::Value,
	}

	/// Logger that captures every event so tests can assert on redaction and call counts.
	#[derive(Debug, Default)]
	pub struct RecordingLogger(Mutex<Vec<RecordedEvent>>);
	impl RecordingLogger {
		/// Creates an empty recording logger.
		pub fn new() -> Self {
			Self::default()
		}

		/// Returns a snapshot of every captured event.
		pub fn events(&self) -> Vec<RecordedEvent> {
			self.0.lock().clone()
		}

		/// Returns the captured events emitted at `level`.
		pub fn events_at(&self, level: LogLevel) -> Vec<RecordedEvent> {
			self.0.lock().iter().filter(|event| event.level == level).cloned().collect()
		}
	}
	impl HttpLogger for RecordingLogger {
		fn log(&self, level: LogLevel, message: &str, context: &LogContext<'_>) {
			let context = serde_json::to_value(context).unwrap_or_default();

			self.0.lock().push(RecordedEvent { level, message: message.to_owned(), context });
		}
	}

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_transport() -> crate::http::ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		crate::http::ReqwestTransport::with_client(client)
	}

	#[cfg(test)] pub use scripted::*;
	#[cfg(test)]
	mod scripted {
		// std
		use std::collections::VecDeque;
		// self
		use super::*;
		use crate::{
			error::TransportError,
			http::{HttpTransport, TransportFuture, TransportRequest, TransportResponse},
		};

		/// One canned response served by [`ScriptedTransport`].
		#[derive(Clone, Debug)]
		pub struct ScriptedResponse {
			/// HTTP status code to report.
			pub status: u16,
			/// Reason phrase to report.
			pub status_text: String,
			/// Response body bytes.
			pub body: String,
			/// Optional artificial latency before the response settles.
			pub delay: Option<std::time::Duration>,
		}
		impl ScriptedResponse {
			/// Creates a response with the provided status and body.
			pub fn new(status: u16, body: impl Into<String>) -> Self {
				Self { status, status_text: String::new(), body: body.into(), delay: None }
			}

			/// Overrides the reason phrase.
			pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
				self.status_text = status_text.into();

				self
			}

			/// Adds artificial latency so concurrent callers actually overlap.
			pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
				self.delay = Some(delay);

				self
			}
		}

		/// Programmable in-memory transport that records every dispatched request.
		#[derive(Debug, Default)]
		pub struct ScriptedTransport {
			responses: Mutex<VecDeque<ScriptedResponse>>,
			requests: Mutex<Vec<TransportRequest>>,
		}
		impl ScriptedTransport {
			/// Creates a transport serving the provided responses in order.
			pub fn new(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
				Self {
					responses: Mutex::new(responses.into_iter().collect()),
					requests: Mutex::new(Vec::new()),
				}
			}

			/// Creates a transport serving a single response.
			pub fn single(response: ScriptedResponse) -> Self {
				Self::new([response])
			}

			/// Number of dispatches the transport has observed.
			pub fn calls(&self) -> usize {
				self.requests.lock().len()
			}

			/// Snapshot of every dispatched request, in order.
			pub fn requests(&self) -> Vec<TransportRequest> {
				self.requests.lock().clone()
			}
		}
		impl HttpTransport for ScriptedTransport {
			fn dispatch(&self, request: TransportRequest) -> TransportFuture<'_> {
				self.requests.lock().push(request);

				let next = self.responses.lock().pop_front();

				Box::pin(async move {
					let Some(response) = next else {
						return Err(TransportError::Io(std::io::Error::other(
							"Scripted transport ran out of responses.",
						)));
					};

					if let Some(delay) = response.delay {
						tokio::time::sleep(delay).await;
					}

					Ok(TransportResponse::new(
						response.status,
						response.status_text,
						response.body.into_bytes(),
					))
				})
			}
		}
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
