//! Stateless token-endpoint exchanges for the supported grants.
//!
//! Both operations POST a URL-encoded form and expect a JSON response shaped as
//! `{ "access_token": string, "expires_in": seconds }`. A non-success status, a missing or
//! empty `access_token`, or a missing `expires_in` all fail the exchange; see
//! [`TokenExchangeError`].

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::token::{AccessToken, TokenSecret},
	error::{ErrorBody, TokenExchangeError},
	http::{HeaderBag, HttpTransport, Method, TransportRequest, headers::names},
};

/// Form value for the client-credentials grant.
pub const GRANT_CLIENT_CREDENTIALS: &str = "client_credentials";
/// Form value for the on-behalf-of (JWT bearer assertion) grant.
pub const GRANT_JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const REQUESTED_TOKEN_USE: &str = "on_behalf_of";

/// Fixed credentials used when exchanging against a token endpoint.
#[derive(Clone, Debug)]
pub struct ClientCredentialsConfig {
	/// Token endpoint URL.
	pub token_url: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret; never logged.
	pub client_secret: TokenSecret,
	/// Scope string requested with every exchange.
	pub scope: String,
}
impl ClientCredentialsConfig {
	/// Creates a config for the provided endpoint and credentials.
	pub fn new(
		token_url: Url,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		scope: impl Into<String>,
	) -> Self {
		Self {
			token_url,
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			scope: scope.into(),
		}
	}
}

#[derive(Deserialize)]
struct TokenEndpointResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}

/// Exchanges fixed client credentials for an access token.
pub async fn client_credentials_exchange(
	transport: &dyn HttpTransport,
	config: &ClientCredentialsConfig,
) -> Result<AccessToken> {
	let body = {
		let mut form = form_urlencoded::Serializer::new(String::new());

		form.append_pair("client_id", &config.client_id);
		form.append_pair("client_secret", config.client_secret.expose());
		form.append_pair("grant_type", GRANT_CLIENT_CREDENTIALS);
		form.append_pair("scope", &config.scope);

		form.finish()
	};

	request_token(transport, &config.token_url, body).await
}

/// Exchanges a caller-supplied assertion for an on-behalf-of access token.
pub async fn on_behalf_of_exchange(
	transport: &dyn HttpTransport,
	config: &ClientCredentialsConfig,
	assertion: &TokenSecret,
) -> Result<AccessToken> {
	let body = {
		let mut form = form_urlencoded::Serializer::new(String::new());

		form.append_pair("grant_type", GRANT_JWT_BEARER);
		form.append_pair("client_id", &config.client_id);
		form.append_pair("client_secret", config.client_secret.expose());
		form.append_pair("assertion", assertion.expose());
		form.append_pair("scope", &config.scope);
		form.append_pair("requested_token_use", REQUESTED_TOKEN_USE);

		form.finish()
	};

	request_token(transport, &config.token_url, body).await
}

async fn request_token(
	transport: &dyn HttpTransport,
	token_url: &Url,
	form: String,
) -> Result<AccessToken> {
	let request = TransportRequest {
		method: Method::Post,
		url: token_url.to_string(),
		headers: HeaderBag::new().with(names::CONTENT_TYPE, FORM_CONTENT_TYPE),
		body: Some(form),
	};
	let response = transport.dispatch(request).await?;
	let status = response.status();

	if !response.ok() {
		return Err(TokenExchangeError::Endpoint {
			status,
			status_text: response.status_text().to_owned(),
			body: ErrorBody::extract(response.body_bytes()),
		}
		.into());
	}

	let parsed: TokenEndpointResponse =
		response.json().map_err(|source| TokenExchangeError::Parse { source, status })?;
	let token = parsed
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or(TokenExchangeError::MissingAccessToken { status })?;
	let lifetime = parsed.expires_in.ok_or(TokenExchangeError::MissingExpiresIn)?;

	Ok(AccessToken::new(token, Duration::seconds(lifetime)))
}
