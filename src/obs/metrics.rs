// self
use crate::{
	http::Method,
	obs::{GrantKind, Outcome},
};

/// Records a request pipeline outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(method: Method, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"http_courier_requests_total",
			"method" => method.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (method, outcome);
	}
}

/// Records a token-exchange outcome via the global metrics recorder (when enabled).
pub fn record_exchange_outcome(grant: GrantKind, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"http_courier_token_exchanges_total",
			"grant" => grant.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_request_outcome(Method::Get, Outcome::Attempt);
		record_exchange_outcome(GrantKind::ClientCredentials, Outcome::Failure);
	}
}
