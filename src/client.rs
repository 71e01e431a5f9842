//! The authenticated HTTP client: compose, dispatch, classify, log, return.

pub mod request;

pub use request::*;

// std
use std::time::Instant;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AuthFactory,
	error::{ErrorBody, ResponseError},
	http::{HeaderBag, HttpTransport, Method, TransportResponse},
	obs::{self, HttpLogger, LogContext, LogLevel, LoggableRequest, Outcome},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Configuration consumed by [`HttpClient`].
///
/// The request context is opaque to the client; it is only ever forwarded unchanged to the
/// configured auth factory.
pub struct HttpClientOptions<Ctx = ()> {
	base_url: Option<Url>,
	service: Option<String>,
	logger: Option<Arc<dyn HttpLogger>>,
	auth_factory: Option<Arc<dyn AuthFactory<Ctx>>>,
	request_context: Option<Ctx>,
	correlation_id: Option<String>,
	headers: HeaderBag,
	sensitive_headers: Vec<String>,
	request_log_level: LogLevel,
	success_log_level: LogLevel,
	error_log_level: LogLevel,
}
impl<Ctx> HttpClientOptions<Ctx> {
	/// Creates options with the default log levels and sensitive-header list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the base URL request paths are resolved against.
	pub fn with_base_url(mut self, base_url: Url) -> Self {
		self.base_url = Some(base_url);

		self
	}

	/// Names the upstream service for log context.
	pub fn with_service(mut self, service: impl Into<String>) -> Self {
		self.service = Some(service.into());

		self
	}

	/// Attaches the logger collaborator.
	pub fn with_logger(mut self, logger: Arc<dyn HttpLogger>) -> Self {
		self.logger = Some(logger);

		self
	}

	/// Attaches the auth factory consulted before every request.
	pub fn with_auth_factory(mut self, auth_factory: Arc<dyn AuthFactory<Ctx>>) -> Self {
		self.auth_factory = Some(auth_factory);

		self
	}

	/// Sets the default request context forwarded to the auth factory.
	pub fn with_request_context(mut self, request_context: Ctx) -> Self {
		self.request_context = Some(request_context);

		self
	}

	/// Sets the correlation id stamped onto every request.
	pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
		self.correlation_id = Some(correlation_id.into());

		self
	}

	/// Adds one base header sent with every request.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Replaces the base header set.
	pub fn with_headers(mut self, headers: HeaderBag) -> Self {
		self.headers = headers;

		self
	}

	/// Replaces the sensitive-header list used for log redaction.
	pub fn with_sensitive_headers(mut self, sensitive_headers: Vec<String>) -> Self {
		self.sensitive_headers = sensitive_headers;

		self
	}

	/// Level for pre-dispatch request events (default: suppressed).
	pub fn with_request_log_level(mut self, level: LogLevel) -> Self {
		self.request_log_level = level;

		self
	}

	/// Level for successful response events (default: verbose).
	pub fn with_success_log_level(mut self, level: LogLevel) -> Self {
		self.success_log_level = level;

		self
	}

	/// Level for failure events (default: error).
	pub fn with_error_log_level(mut self, level: LogLevel) -> Self {
		self.error_log_level = level;

		self
	}
}
impl<Ctx> Default for HttpClientOptions<Ctx> {
	fn default() -> Self {
		Self {
			base_url: None,
			service: None,
			logger: None,
			auth_factory: None,
			request_context: None,
			correlation_id: None,
			headers: HeaderBag::new(),
			sensitive_headers: obs::DEFAULT_SENSITIVE_HEADERS
				.iter()
				.map(|name| (*name).to_owned())
				.collect(),
			request_log_level: LogLevel::None,
			success_log_level: LogLevel::Verbose,
			error_log_level: LogLevel::Error,
		}
	}
}
impl<Ctx> Debug for HttpClientOptions<Ctx> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpClientOptions")
			.field("base_url", &self.base_url.as_ref().map(Url::as_str))
			.field("service", &self.service)
			.field("correlation_id", &self.correlation_id)
			.field("auth_factory_set", &self.auth_factory.is_some())
			.finish()
	}
}

/// Authenticated HTTP client layering auth resolution, correlation tracking, and redacted
/// logging over a transport.
///
/// Every verb runs the same pipeline: resolve auth headers, compose the outgoing request,
/// dispatch, classify the response, log, then return the decoded body or the error. Auth
/// resolution failures are logged and demoted to an empty header set; everything else
/// propagates to the caller.
pub struct HttpClient<Ctx = ()> {
	options: HttpClientOptions<Ctx>,
	transport: Arc<dyn HttpTransport>,
}
impl<Ctx> HttpClient<Ctx>
where
	Ctx: Send + Sync,
{
	/// Creates a client over the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(options: HttpClientOptions<Ctx>) -> Self {
		Self::with_transport(options, Arc::new(ReqwestTransport::default()))
	}

	/// Creates a client over a caller-provided transport.
	pub fn with_transport(
		options: HttpClientOptions<Ctx>,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		Self { options, transport }
	}

	/// Read access to the configured options.
	pub fn options(&self) -> &HttpClientOptions<Ctx> {
		&self.options
	}

	/// Issues a GET request and decodes the JSON response body.
	pub async fn get<T>(&self, path: &str, request: GetRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.execute(Method::Get, path, &request.params, None, &request.headers).await
	}

	/// Issues a POST request and decodes the JSON response body.
	pub async fn post<T>(&self, path: &str, request: SendRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(Method::Post, path, request).await
	}

	/// Issues a POST request with a pass-through form body.
	pub async fn post_form<T>(&self, path: &str, form: FormPayload) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(Method::Post, path, SendRequest::form(form)).await
	}

	/// Issues a PUT request and decodes the JSON response body.
	pub async fn put<T>(&self, path: &str, request: SendRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(Method::Put, path, request).await
	}

	/// Issues a PATCH request and decodes the JSON response body.
	pub async fn patch<T>(&self, path: &str, request: SendRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(Method::Patch, path, request).await
	}

	/// Issues a DELETE request and decodes the JSON response body.
	pub async fn delete<T>(&self, path: &str, request: SendRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(Method::Delete, path, request).await
	}

	async fn send<T>(&self, method: Method, path: &str, request: SendRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.execute(method, path, &QueryParams::default(), request.payload.as_ref(), &request.headers)
			.await
	}

	async fn execute<T>(
		&self,
		method: Method,
		path: &str,
		params: &QueryParams,
		payload: Option<&Payload>,
		call_headers: &HeaderBag,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.dispatch(method, path, params, payload, call_headers).await?;
		let status = response.status();

		response.json().map_err(|source| Error::Decode { source, status })
	}

	async fn dispatch(
		&self,
		method: Method,
		path: &str,
		params: &QueryParams,
		payload: Option<&Payload>,
		call_headers: &HeaderBag,
	) -> Result<TransportResponse> {
		let auth_headers = self.resolve_auth_headers().await;
		let request = request::compose(
			&ComposeContext {
				base_url: self.options.base_url.as_ref(),
				base_headers: &self.options.headers,
				correlation_id: self.options.correlation_id.as_deref(),
			},
			method,
			path,
			params,
			payload,
			&auth_headers,
			call_headers,
		)?;
		let projection = LoggableRequest::project(&request, &self.options.sensitive_headers);

		obs::record_request_outcome(method, Outcome::Attempt);
		self.emit(self.options.request_log_level, "HTTP request", &LogContext {
			service: self.options.service.as_deref(),
			request: Some(&projection),
			..Default::default()
		});

		let started = Instant::now();

		match self.transport.dispatch(request).await {
			Ok(response) if response.ok() => {
				obs::record_request_outcome(method, Outcome::Success);
				self.emit(self.options.success_log_level, "HTTP response", &LogContext {
					service: self.options.service.as_deref(),
					duration_ms: Some(started.elapsed().as_millis()),
					status: Some(response.status()),
					status_text: Some(response.status_text()),
					request: Some(&projection),
					error: None,
				});

				Ok(response)
			},
			Ok(response) => {
				obs::record_request_outcome(method, Outcome::Failure);

				let error = classify(response);

				self.emit(self.options.error_log_level, "HTTP request failed", &LogContext {
					service: self.options.service.as_deref(),
					duration_ms: Some(started.elapsed().as_millis()),
					status: Some(error.status),
					status_text: Some(&error.status_text),
					request: Some(&projection),
					error: Some(error.to_string()),
				});

				Err(error.into())
			},
			Err(error) => {
				obs::record_request_outcome(method, Outcome::Failure);
				self.emit(self.options.error_log_level, "HTTP request failed", &LogContext {
					service: self.options.service.as_deref(),
					duration_ms: Some(started.elapsed().as_millis()),
					status: None,
					status_text: None,
					request: Some(&projection),
					error: Some(error.to_string()),
				});

				Err(error.into())
			},
		}
	}

	/// Resolves auth headers, demoting factory failures to an empty set.
	async fn resolve_auth_headers(&self) -> HeaderBag {
		let Some(factory) = &self.options.auth_factory else {
			return HeaderBag::new();
		};

		match factory.resolve_headers(self.options.request_context.as_ref()).await {
			Ok(headers) => headers,
			Err(error) => {
				self.emit(self.options.error_log_level, "Auth factory failed", &LogContext {
					service: self.options.service.as_deref(),
					error: Some(error.to_string()),
					..Default::default()
				});

				HeaderBag::new()
			},
		}
	}

	fn emit(&self, level: LogLevel, message: &str, context: &LogContext<'_>) {
		if level == LogLevel::None {
			return;
		}
		if let Some(logger) = &self.options.logger {
			logger.log(level, message, context);
		}
	}
}
impl<Ctx> Debug for HttpClient<Ctx> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpClient").field("options", &self.options).finish()
	}
}

fn classify(response: TransportResponse) -> ResponseError {
	ResponseError {
		status: response.status(),
		status_text: response.status_text().to_owned(),
		body: ErrorBody::extract(response.body_bytes()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		auth::{BasicAuthFactory, ClientCredentialsAuthFactory, ClientCredentialsConfig},
		http::headers::names,
	};

	#[derive(Debug, Deserialize, PartialEq)]
	struct Widget {
		id: u32,
		name: String,
	}

	fn client_with(
		transport: Arc<ScriptedTransport>,
		options: HttpClientOptions<()>,
	) -> HttpClient<()> {
		HttpClient::with_transport(options, transport)
	}

	#[tokio::test]
	async fn success_returns_decoded_body() {
		let transport = Arc::new(ScriptedTransport::single(ScriptedResponse::new(
			200,
			r#"{"id":7,"name":"gear"}"#,
		)));
		let client = client_with(transport.clone(), HttpClientOptions::new());
		let widget: Widget = client
			.get("/widgets/7", GetRequest::new())
			.await
			.expect("Successful response should decode.");

		assert_eq!(widget, Widget { id: 7, name: "gear".into() });
	}

	#[tokio::test]
	async fn non_success_classifies_and_logs_once() {
		let logger = Arc::new(RecordingLogger::new());
		let transport = Arc::new(ScriptedTransport::single(
			ScriptedResponse::new(404, r#"{"error":"not found"}"#).with_status_text("Not Found"),
		));
		let client = client_with(
			transport.clone(),
			HttpClientOptions::new().with_logger(logger.clone()),
		);
		let err = client
			.get::<Widget>("/widgets/404", GetRequest::new())
			.await
			.expect_err("Non-2xx should fail the call.");

		match err {
			Error::Response(response) => {
				assert_eq!(response.status, 404);
				assert_eq!(response.status_text, "Not Found");
				assert_eq!(response.body.json, Some(serde_json::json!({ "error": "not found" })));
			},
			other => panic!("Unexpected error variant: {other:?}"),
		}

		assert_eq!(logger.events_at(LogLevel::Error).len(), 1);
		assert_eq!(logger.events_at(LogLevel::Verbose).len(), 0);
	}

	#[tokio::test]
	async fn success_logs_at_verbose_with_duration_and_status() {
		let logger = Arc::new(RecordingLogger::new());
		let transport =
			Arc::new(ScriptedTransport::single(ScriptedResponse::new(200, r#"{"ok":true}"#)));
		let client = client_with(
			transport,
			HttpClientOptions::new().with_logger(logger.clone()).with_service("widgets"),
		);
		let _: serde_json::Value = client
			.get("/health", GetRequest::new())
			.await
			.expect("Health check should succeed.");
		let events = logger.events_at(LogLevel::Verbose);

		assert_eq!(events.len(), 1);
		assert_eq!(events[0].message, "HTTP response");
		assert_eq!(events[0].context["service"], "widgets");
		assert_eq!(events[0].context["status"], 200);
		assert!(events[0].context["duration_ms"].is_number());
	}

	#[tokio::test]
	async fn logged_projection_redacts_sensitive_headers() {
		let logger = Arc::new(RecordingLogger::new());
		let transport =
			Arc::new(ScriptedTransport::single(ScriptedResponse::new(200, r#"{"ok":true}"#)));
		let client = client_with(
			transport,
			HttpClientOptions::new()
				.with_logger(logger.clone())
				.with_header("X-API-Key", "key-material")
				.with_header("X-Other", "visible")
				.with_auth_factory(Arc::new(BasicAuthFactory::new("user", "pass"))),
		);
		let _: serde_json::Value = client
			.get("/things", GetRequest::new())
			.await
			.expect("Request should succeed.");
		let events = logger.events_at(LogLevel::Verbose);
		let headers = &events[0].context["request"]["headers"];

		assert_eq!(headers["X-Other"], "visible");
		assert!(headers.get("X-API-Key").is_none());
		assert!(headers.get("Authorization").is_none());
		assert!(headers.get("authorization").is_none());
	}

	#[tokio::test]
	async fn auth_factory_failure_is_non_fatal_and_logged() {
		let logger = Arc::new(RecordingLogger::new());
		// First response feeds the failing token exchange, second serves the API call.
		let transport = Arc::new(ScriptedTransport::new([
			ScriptedResponse::new(500, "idp down"),
			ScriptedResponse::new(200, r#"{"ok":true}"#),
		]));
		let factory = ClientCredentialsAuthFactory::with_transport(
			ClientCredentialsConfig::new(
				Url::parse("https://idp.example.com/token")
					.expect("Token endpoint fixture should parse."),
				"client",
				"secret",
				"scope",
			),
			transport.clone(),
		);
		let client = client_with(
			transport.clone(),
			HttpClientOptions::new()
				.with_logger(logger.clone())
				.with_auth_factory(Arc::new(factory)),
		);
		let _: serde_json::Value = client
			.get("/things", GetRequest::new())
			.await
			.expect("Request should proceed without auth headers.");
		let requests = transport.requests();

		assert_eq!(requests.len(), 2);
		assert!(!requests[1].headers.contains(names::AUTHORIZATION));

		let errors = logger.events_at(LogLevel::Error);

		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].message, "Auth factory failed");
	}

	#[tokio::test]
	async fn transport_errors_are_logged_and_rethrown() {
		let logger = Arc::new(RecordingLogger::new());
		// An empty script makes the transport fail at dispatch.
		let transport = Arc::new(ScriptedTransport::new([]));
		let client =
			client_with(transport, HttpClientOptions::new().with_logger(logger.clone()));
		let err = client
			.get::<serde_json::Value>("/things", GetRequest::new())
			.await
			.expect_err("Dispatch failure should surface.");

		assert!(matches!(err, Error::Transport(_)));
		assert_eq!(logger.events_at(LogLevel::Error).len(), 1);
	}

	#[tokio::test]
	async fn decode_failure_reports_status() {
		let transport =
			Arc::new(ScriptedTransport::single(ScriptedResponse::new(200, r#"{"id":"seven"}"#)));
		let client = client_with(transport, HttpClientOptions::new());
		let err = client
			.get::<Widget>("/widgets/7", GetRequest::new())
			.await
			.expect_err("Mismatched body should fail to decode.");

		assert!(matches!(err, Error::Decode { status: 200, .. }));
	}

	#[tokio::test]
	async fn get_appends_params_and_correlation_headers() {
		let transport =
			Arc::new(ScriptedTransport::single(ScriptedResponse::new(200, r#"{"ok":true}"#)));
		let client = client_with(
			transport.clone(),
			HttpClientOptions::new()
				.with_base_url(
					Url::parse("https://api.example.com/").expect("Base fixture should parse."),
				)
				.with_correlation_id("corr-9"),
		);
		let _: serde_json::Value = client
			.get(
				"search",
				GetRequest::new()
					.with_param("tag", serde_json::json!(["a", "b"]))
					.with_param("q", serde_json::Value::Null)
					.with_param("limit", 5),
			)
			.await
			.expect("Request should succeed.");
		let requests = transport.requests();

		assert_eq!(requests[0].url, "https://api.example.com/search?tag=a&tag=b&limit=5");
		assert_eq!(requests[0].headers.get(names::X_CORRELATION_ID), Some("corr-9"));
		assert!(requests[0].headers.contains(names::X_REQUEST_ID));
	}

	#[tokio::test]
	async fn post_form_passes_body_through() {
		let transport =
			Arc::new(ScriptedTransport::single(ScriptedResponse::new(200, r#"{"ok":true}"#)));
		let client = client_with(transport.clone(), HttpClientOptions::new());
		let _: serde_json::Value = client
			.post_form("/submit", FormPayload::new().with("a", "1").with("b", "two"))
			.await
			.expect("Form post should succeed.");
		let requests = transport.requests();

		assert_eq!(requests[0].method, Method::Post);
		assert_eq!(requests[0].body.as_deref(), Some("a=1&b=two"));
		assert_eq!(
			requests[0].headers.get(names::CONTENT_TYPE),
			Some("application/x-www-form-urlencoded")
		);
	}

	#[tokio::test]
	async fn delete_carries_optional_body() {
		let transport =
			Arc::new(ScriptedTransport::single(ScriptedResponse::new(200, r#"{"ok":true}"#)));
		let client = client_with(transport.clone(), HttpClientOptions::new());
		let _: serde_json::Value = client
			.delete(
				"/widgets/7",
				SendRequest::json(&serde_json::json!({ "reason": "cleanup" }))
					.expect("JSON body should serialize."),
			)
			.await
			.expect("Delete should succeed.");
		let requests = transport.requests();

		assert_eq!(requests[0].method, Method::Delete);
		assert_eq!(requests[0].body.as_deref(), Some(r#"{"reason":"cleanup"}"#));
	}
}
