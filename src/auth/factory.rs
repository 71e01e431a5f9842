//! Auth header factories: cached client-credentials, per-call on-behalf-of, static basic.
//!
//! Every factory implements the [`AuthFactory`] capability the client depends on. The
//! client-credentials variant owns the crate's only mutable shared state, a cached token
//! slot guarded by a singleflight discipline: concurrent callers never start a second
//! exchange while one is in flight, and callers that queued behind a flight observe that
//! exact flight's settled outcome.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{
		exchange::{ClientCredentialsConfig, client_credentials_exchange, on_behalf_of_exchange},
		token::{AccessToken, TokenSecret},
	},
	error::ConfigError,
	http::{HeaderBag, HttpTransport, headers::names},
	obs::{self, ExchangeSpan, GrantKind, Outcome},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Boxed future returned by [`AuthFactory::resolve_headers`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<HeaderBag>> + 'a + Send>>;

/// Capability that resolves per-request auth headers from an opaque request context.
///
/// The client forwards its configured context unchanged and treats resolution failures as
/// non-fatal: the request proceeds without auth headers and the upstream 401/403 surfaces
/// through normal response classification.
pub trait AuthFactory<Ctx>: Send + Sync {
	/// Produces the headers to attach to one outgoing request.
	fn resolve_headers<'a>(&'a self, context: Option<&'a Ctx>) -> AuthFuture<'a>;
}

/// Request context consumed by [`OnBehalfOfAuthFactory`].
#[derive(Clone, Debug)]
pub struct AssertionContext {
	/// Caller-scoped assertion (typically the inbound JWT) exchanged on the user's behalf.
	pub assertion: TokenSecret,
}
impl AssertionContext {
	/// Wraps a caller-supplied assertion token.
	pub fn new(assertion: impl Into<String>) -> Self {
		Self { assertion: TokenSecret::new(assertion) }
	}
}

/// Renders a `Basic` scheme header value from raw credentials.
pub fn basic_auth_header(username: &str, password: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Static factory that precomputes a basic-auth header once. Pure, no I/O.
#[derive(Clone)]
pub struct BasicAuthFactory {
	headers: HeaderBag,
}
impl BasicAuthFactory {
	/// Precomputes the header for the provided credentials.
	pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
		let headers = HeaderBag::new()
			.with(names::AUTHORIZATION, basic_auth_header(username.as_ref(), password.as_ref()));

		Self { headers }
	}
}
impl Debug for BasicAuthFactory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BasicAuthFactory").field(&"<redacted>").finish()
	}
}
impl<Ctx> AuthFactory<Ctx> for BasicAuthFactory {
	fn resolve_headers<'a>(&'a self, _: Option<&'a Ctx>) -> AuthFuture<'a> {
		let headers = self.headers.clone();

		Box::pin(async move { Ok(headers) })
	}
}

/// Per-call factory performing a fresh on-behalf-of exchange for every resolution.
///
/// Assertions are short-lived and caller-specific, so no caching happens here; each call
/// merges the context's assertion with the fixed credentials and hits the token endpoint.
pub struct OnBehalfOfAuthFactory {
	config: ClientCredentialsConfig,
	transport: Arc<dyn HttpTransport>,
}
impl OnBehalfOfAuthFactory {
	/// Creates a factory over the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(config: ClientCredentialsConfig) -> Self {
		Self::with_transport(config, Arc::new(ReqwestTransport::default()))
	}

	/// Creates a factory over a caller-provided transport.
	pub fn with_transport(
		config: ClientCredentialsConfig,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		Self { config, transport }
	}
}
impl Debug for OnBehalfOfAuthFactory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OnBehalfOfAuthFactory").field("config", &self.config).finish()
	}
}
impl AuthFactory<AssertionContext> for OnBehalfOfAuthFactory {
	fn resolve_headers<'a>(&'a self, context: Option<&'a AssertionContext>) -> AuthFuture<'a> {
		Box::pin(async move {
			let context = context.ok_or(ConfigError::MissingAssertion)?;
			let span = ExchangeSpan::new(GrantKind::OnBehalfOf, "resolve_headers");

			obs::record_exchange_outcome(GrantKind::OnBehalfOf, Outcome::Attempt);

			let result = span
				.instrument(on_behalf_of_exchange(
					self.transport.as_ref(),
					&self.config,
					&context.assertion,
				))
				.await;

			match &result {
				Ok(_) => obs::record_exchange_outcome(GrantKind::OnBehalfOf, Outcome::Success),
				Err(_) => obs::record_exchange_outcome(GrantKind::OnBehalfOf, Outcome::Failure),
			}

			let token = result?;

			Ok(HeaderBag::new().with(names::AUTHORIZATION, token.bearer()))
		})
	}
}

#[derive(Default)]
struct SlotState {
	/// Bumped once per settled acquisition; callers compare it to detect flights they
	/// queued behind.
	generation: u64,
	outcome: Option<Result<AccessToken, Arc<Error>>>,
}

/// Cached client-credentials factory enforcing the singleflight acquisition discipline.
///
/// The slot holds at most one settled acquisition outcome. Resolution fast-paths a cached
/// fresh token; otherwise callers serialize on the acquisition gate, so at most one
/// exchange is in flight per factory instance. A caller whose acquisition yields an
/// already-expired token (zero-lifetime grants, clock skew) performs exactly one more
/// exchange before returning headers.
pub struct ClientCredentialsAuthFactory {
	config: ClientCredentialsConfig,
	transport: Arc<dyn HttpTransport>,
	gate: AsyncMutex<()>,
	state: Mutex<SlotState>,
}
impl ClientCredentialsAuthFactory {
	/// Creates a factory over the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(config: ClientCredentialsConfig) -> Self {
		Self::with_transport(config, Arc::new(ReqwestTransport::default()))
	}

	/// Creates a factory over a caller-provided transport.
	pub fn with_transport(
		config: ClientCredentialsConfig,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		Self { config, transport, gate: AsyncMutex::new(()), state: Mutex::new(SlotState::default()) }
	}

	fn cached_fresh(&self) -> Option<AccessToken> {
		match &self.state.lock().outcome {
			Some(Ok(token)) if !token.is_expired() => Some(token.clone()),
			_ => None,
		}
	}

	async fn current_token(&self) -> Result<AccessToken> {
		if let Some(token) = self.cached_fresh() {
			return Ok(token);
		}

		let seen = self.state.lock().generation;
		let _gate = self.gate.lock().await;

		{
			let state = self.state.lock();

			if state.generation != seen {
				// An acquisition settled while this caller queued; its outcome is ours.
				match &state.outcome {
					Some(Ok(token)) if !token.is_expired() => return Ok(token.clone()),
					Some(Err(error)) => return Err(Error::Acquisition(error.clone())),
					// Settled token already expired again; fall through and acquire.
					_ => {},
				}
			}
		}

		self.acquire().await
	}

	/// Performs the exchange while the gate is held and publishes the settled outcome.
	async fn acquire(&self) -> Result<AccessToken> {
		let mut outcome = self.exchange().await;

		if let Ok(token) = &outcome
			&& token.is_expired()
		{
			// Token endpoints can hand back zero-lifetime tokens; retry once before
			// surfacing whatever comes back.
			outcome = self.exchange().await;
		}

		match outcome {
			Ok(token) => {
				let mut state = self.state.lock();

				state.generation = state.generation.wrapping_add(1);
				state.outcome = Some(Ok(token.clone()));

				Ok(token)
			},
			Err(error) => {
				let error = Arc::new(error);
				let mut state = self.state.lock();

				state.generation = state.generation.wrapping_add(1);
				state.outcome = Some(Err(error.clone()));

				Err(Error::Acquisition(error))
			},
		}
	}

	async fn exchange(&self) -> Result<AccessToken> {
		let span = ExchangeSpan::new(GrantKind::ClientCredentials, "acquire");

		obs::record_exchange_outcome(GrantKind::ClientCredentials, Outcome::Attempt);

		let result = span
			.instrument(client_credentials_exchange(self.transport.as_ref(), &self.config))
			.await;

		match &result {
			Ok(_) => obs::record_exchange_outcome(GrantKind::ClientCredentials, Outcome::Success),
			Err(_) => obs::record_exchange_outcome(GrantKind::ClientCredentials, Outcome::Failure),
		}

		result
	}
}
impl Debug for ClientCredentialsAuthFactory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsAuthFactory").field("config", &self.config).finish()
	}
}
impl<Ctx> AuthFactory<Ctx> for ClientCredentialsAuthFactory {
	fn resolve_headers<'a>(&'a self, _: Option<&'a Ctx>) -> AuthFuture<'a> {
		Box::pin(async move {
			let token = self.current_token().await?;

			Ok(HeaderBag::new().with(names::AUTHORIZATION, token.bearer()))
		})
	}
}
