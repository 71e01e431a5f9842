// self
use crate::{_prelude::*, obs::GrantKind};
#[cfg(feature = "tracing")]
use crate::obs::{HttpLogger, LogContext, LogLevel};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedExchange<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedExchange<F> = F;

/// A span builder wrapped around token acquisitions.
#[derive(Clone, Debug)]
pub struct ExchangeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ExchangeSpan {
	/// Creates a new span tagged with the provided grant kind + stage.
	pub fn new(grant: GrantKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("http_courier.exchange", grant = grant.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (grant, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedExchange<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logger that forwards events onto the `tracing` ecosystem.
///
/// The structured context is serialized to a compact JSON field so any subscriber layout
/// (pretty, JSON, OTLP) carries the same information.
#[cfg(feature = "tracing")]
#[derive(Clone, Debug, Default)]
pub struct TracingLogger;
#[cfg(feature = "tracing")]
impl HttpLogger for TracingLogger {
	fn log(&self, level: LogLevel, message: &str, context: &LogContext<'_>) {
		let context = serde_json::to_string(context).unwrap_or_default();

		match level {
			LogLevel::None => {},
			LogLevel::Error =>
				tracing::error!(target: "http_courier", context = %context, "{message}"),
			LogLevel::Warn =>
				tracing::warn!(target: "http_courier", context = %context, "{message}"),
			LogLevel::Info =>
				tracing::info!(target: "http_courier", context = %context, "{message}"),
			LogLevel::Verbose =>
				tracing::debug!(target: "http_courier", context = %context, "{message}"),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_is_transparent() {
		let span = ExchangeSpan::new(GrantKind::ClientCredentials, "instrument_is_transparent");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
