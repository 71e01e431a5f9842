//! Request composition: URL joining, header overlays, query expansion, body encoding.
//!
//! Header precedence, lowest to highest: generated request id, base headers, resolved auth
//! headers, the correlation id (when configured), explicit per-call headers. Overlays are
//! case-insensitive, so any layer may override a lower one regardless of spelling. The
//! `Content-Type` header is derived from the payload and set last, because the body
//! encoding and its media type must never disagree.

// crates.io
use serde_json::Value;
use url::form_urlencoded;
use uuid::Uuid;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{HeaderBag, Method, TransportRequest, headers::names},
};

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// URL-encoded form payload passed through to the wire without JSON serialization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormPayload(Vec<(String, String)>);
impl FormPayload {
	/// Creates an empty form.
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Builder-style [`append`](Self::append).
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.append(name, value);

		self
	}

	/// Appends a field; repeated names produce repeated entries.
	pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.push((name.into(), value.into()));
	}

	/// Number of fields.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when the form holds no fields.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Renders the `application/x-www-form-urlencoded` body.
	pub fn encode(&self) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		for (name, value) in &self.0 {
			serializer.append_pair(name, value);
		}

		serializer.finish()
	}
}

/// Request body representations understood by the composer.
#[derive(Clone, Debug)]
pub enum Payload {
	/// JSON-serialized body (`application/json`).
	Json(Value),
	/// Pass-through form body (`application/x-www-form-urlencoded`).
	Form(FormPayload),
}
impl Payload {
	/// Serializes any `Serialize` value into a JSON payload.
	pub fn json<T>(value: &T) -> Result<Self, ConfigError>
	where
		T: Serialize + ?Sized,
	{
		serde_json::to_value(value)
			.map(Self::Json)
			.map_err(|source| ConfigError::BodySerialize { source })
	}

	/// Wraps a pre-encoded form payload.
	pub fn form(form: FormPayload) -> Self {
		Self::Form(form)
	}

	pub(crate) fn content_type(&self) -> &'static str {
		match self {
			Payload::Json(_) => JSON_CONTENT_TYPE,
			Payload::Form(_) => FORM_CONTENT_TYPE,
		}
	}

	pub(crate) fn encode(&self) -> Result<String, ConfigError> {
		match self {
			Payload::Json(value) => serde_json::to_string(value)
				.map_err(|source| ConfigError::BodySerialize { source }),
			Payload::Form(form) => Ok(form.encode()),
		}
	}
}

/// Ordered query parameters with JSON-typed values.
///
/// Array values expand into repeated entries in their original order. `null` scalars and
/// `null` array elements are dropped silently rather than serialized as literal text.
#[derive(Clone, Debug, Default)]
pub struct QueryParams(Vec<(String, Value)>);
impl QueryParams {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Builder-style [`append`](Self::append).
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.append(key, value);

		self
	}

	/// Appends a parameter.
	pub fn append(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.0.push((key.into(), value.into()));
	}

	/// Returns `true` when no parameters are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub(crate) fn encode(&self) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		for (key, value) in &self.0 {
			match value {
				Value::Null => {},
				Value::Array(items) =>
					for item in items {
						if !item.is_null() {
							serializer.append_pair(key, &scalar(item));
						}
					},
				other => {
					serializer.append_pair(key, &scalar(other));
				},
			}
		}

		serializer.finish()
	}
}

fn scalar(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

/// Caller-supplied pieces of a GET request.
#[derive(Clone, Debug, Default)]
pub struct GetRequest {
	/// Query parameters appended to the request path.
	pub params: QueryParams,
	/// Explicit per-call headers (highest precedence).
	pub headers: HeaderBag,
}
impl GetRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a query parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.append(key, value);

		self
	}

	/// Adds an explicit per-call header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}
}

/// Caller-supplied pieces of a body-carrying request.
#[derive(Clone, Debug, Default)]
pub struct SendRequest {
	/// Optional body payload.
	pub payload: Option<Payload>,
	/// Explicit per-call headers (highest precedence).
	pub headers: HeaderBag,
}
impl SendRequest {
	/// Creates a body-less request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a request carrying a JSON-serialized body.
	pub fn json<T>(data: &T) -> Result<Self, ConfigError>
	where
		T: Serialize + ?Sized,
	{
		Ok(Self { payload: Some(Payload::json(data)?), headers: HeaderBag::new() })
	}

	/// Creates a request carrying a pass-through form body.
	pub fn form(form: FormPayload) -> Self {
		Self { payload: Some(Payload::form(form)), headers: HeaderBag::new() }
	}

	/// Adds an explicit per-call header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}
}

pub(crate) struct ComposeContext<'a> {
	pub base_url: Option<&'a Url>,
	pub base_headers: &'a HeaderBag,
	pub correlation_id: Option<&'a str>,
}

pub(crate) fn compose(
	context: &ComposeContext<'_>,
	method: Method,
	path: &str,
	params: &QueryParams,
	payload: Option<&Payload>,
	auth_headers: &HeaderBag,
	call_headers: &HeaderBag,
) -> Result<TransportRequest, ConfigError> {
	let url = compose_url(context.base_url, path, params)?;
	let mut headers = HeaderBag::new();

	headers.insert(names::X_REQUEST_ID, Uuid::new_v4().to_string());
	headers.overlay(context.base_headers);
	headers.overlay(auth_headers);

	if let Some(correlation_id) = context.correlation_id {
		headers.insert(names::X_CORRELATION_ID, correlation_id);
	}

	headers.overlay(call_headers);

	let body = match payload {
		Some(payload) => {
			headers.insert(names::CONTENT_TYPE, payload.content_type());

			Some(payload.encode()?)
		},
		None => None,
	};

	Ok(TransportRequest { method, url, headers, body })
}

fn compose_url(
	base_url: Option<&Url>,
	path: &str,
	params: &QueryParams,
) -> Result<String, ConfigError> {
	let mut url = match base_url {
		Some(base) =>
			base.join(path).map_err(|source| ConfigError::UrlJoin { source })?.to_string(),
		None => path.to_owned(),
	};
	let query = params.encode();

	if !query.is_empty() {
		url.push(if url.contains('?') { '&' } else { '?' });
		url.push_str(&query);
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://api.example.com/v1/").expect("Base URL fixture should parse.")
	}

	fn compose_simple(context: &ComposeContext<'_>, path: &str) -> TransportRequest {
		compose(
			context,
			Method::Get,
			path,
			&QueryParams::new(),
			None,
			&HeaderBag::new(),
			&HeaderBag::new(),
		)
		.expect("Composition should succeed.")
	}

	#[test]
	fn url_join_follows_rfc_semantics() {
		let base = base();
		let context =
			ComposeContext { base_url: Some(&base), base_headers: &HeaderBag::new(), correlation_id: None };

		assert_eq!(compose_simple(&context, "users").url, "https://api.example.com/v1/users");
		assert_eq!(compose_simple(&context, "/users").url, "https://api.example.com/users");
		assert_eq!(
			compose_simple(&context, "users/42/posts").url,
			"https://api.example.com/v1/users/42/posts"
		);
	}

	#[test]
	fn missing_base_uses_path_verbatim() {
		let context =
			ComposeContext { base_url: None, base_headers: &HeaderBag::new(), correlation_id: None };

		assert_eq!(
			compose_simple(&context, "https://other.example.com/health").url,
			"https://other.example.com/health"
		);
	}

	#[test]
	fn query_expansion_drops_nulls_and_flattens_arrays() {
		let params = QueryParams::new()
			.with("tag", serde_json::json!(["a", "b"]))
			.with("q", Value::Null)
			.with("limit", 5);

		assert_eq!(params.encode(), "tag=a&tag=b&limit=5");
	}

	#[test]
	fn query_expansion_drops_null_array_elements() {
		let params = QueryParams::new().with("tag", serde_json::json!(["a", null, "c"]));

		assert_eq!(params.encode(), "tag=a&tag=c");
	}

	#[test]
	fn query_appends_to_existing_query_strings() {
		let context =
			ComposeContext { base_url: None, base_headers: &HeaderBag::new(), correlation_id: None };
		let request = compose(
			&context,
			Method::Get,
			"/search?page=2",
			&QueryParams::new().with("limit", 5),
			None,
			&HeaderBag::new(),
			&HeaderBag::new(),
		)
		.expect("Composition should succeed.");

		assert_eq!(request.url, "/search?page=2&limit=5");
	}

	#[test]
	fn header_precedence_layers_in_order() {
		let base = base();
		let base_headers =
			HeaderBag::new().with("Accept", "*/*").with("X-Tenant", "base").with("X-Base", "1");
		let auth_headers =
			HeaderBag::new().with("authorization", "Bearer tok").with("x-tenant", "auth");
		let call_headers =
			HeaderBag::new().with("X-TENANT", "call").with("X-Correlation-ID", "explicit");
		let context = ComposeContext {
			base_url: Some(&base),
			base_headers: &base_headers,
			correlation_id: Some("corr-1"),
		};
		let request = compose(
			&context,
			Method::Post,
			"things",
			&QueryParams::new(),
			None,
			&auth_headers,
			&call_headers,
		)
		.expect("Composition should succeed.");

		assert_eq!(request.headers.get("X-Tenant"), Some("call"));
		assert_eq!(request.headers.get("Authorization"), Some("Bearer tok"));
		assert_eq!(request.headers.get("X-Base"), Some("1"));
		// Explicit per-call headers outrank the configured correlation id.
		assert_eq!(request.headers.get(names::X_CORRELATION_ID), Some("explicit"));
		assert!(request.headers.contains(names::X_REQUEST_ID));
	}

	#[test]
	fn correlation_header_only_present_when_configured() {
		let context =
			ComposeContext { base_url: None, base_headers: &HeaderBag::new(), correlation_id: None };
		let request = compose_simple(&context, "/things");

		assert!(!request.headers.contains(names::X_CORRELATION_ID));
	}

	#[test]
	fn request_ids_are_unique_per_composition() {
		let context =
			ComposeContext { base_url: None, base_headers: &HeaderBag::new(), correlation_id: None };
		let first = compose_simple(&context, "/things");
		let second = compose_simple(&context, "/things");

		assert_ne!(
			first.headers.get(names::X_REQUEST_ID),
			second.headers.get(names::X_REQUEST_ID)
		);
	}

	#[test]
	fn json_payload_sets_content_type_and_serializes() {
		let context =
			ComposeContext { base_url: None, base_headers: &HeaderBag::new(), correlation_id: None };
		let payload = Payload::json(&serde_json::json!({ "a": 1 }))
			.expect("JSON payload should serialize.");
		let request = compose(
			&context,
			Method::Post,
			"/things",
			&QueryParams::new(),
			Some(&payload),
			&HeaderBag::new(),
			&HeaderBag::new(),
		)
		.expect("Composition should succeed.");

		assert_eq!(request.headers.get(names::CONTENT_TYPE), Some("application/json"));
		assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
	}

	#[test]
	fn form_payload_passes_through_unencoded() {
		let context =
			ComposeContext { base_url: None, base_headers: &HeaderBag::new(), correlation_id: None };
		let payload =
			Payload::form(FormPayload::new().with("a", "1").with("b", "two words"));
		let request = compose(
			&context,
			Method::Post,
			"/things",
			&QueryParams::new(),
			Some(&payload),
			&HeaderBag::new(),
			&HeaderBag::new(),
		)
		.expect("Composition should succeed.");

		assert_eq!(
			request.headers.get(names::CONTENT_TYPE),
			Some("application/x-www-form-urlencoded")
		);
		assert_eq!(request.body.as_deref(), Some("a=1&b=two+words"));
	}

	#[test]
	fn body_less_requests_omit_content_type() {
		let context =
			ComposeContext { base_url: None, base_headers: &HeaderBag::new(), correlation_id: None };
		let request = compose_simple(&context, "/things");

		assert!(!request.headers.contains(names::CONTENT_TYPE));
		assert_eq!(request.body, None);
	}
}
