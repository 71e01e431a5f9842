//! Access token value objects and expiry bookkeeping.

// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping credential material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Bearer token issued by a token endpoint.
///
/// The expiry instant is computed once at construction (`issued_at + lifetime`) and never
/// mutated; refreshing replaces the whole value. Expiry predicates come in clock-reading
/// and `_at` variants so callers and tests can pin the evaluation instant.
#[derive(Clone)]
pub struct AccessToken {
	secret: TokenSecret,
	issued_at: OffsetDateTime,
	expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates a token issued now with the provided lifetime.
	pub fn new(token: impl Into<String>, lifetime: Duration) -> Self {
		Self::with_issued_at(token, OffsetDateTime::now_utc(), lifetime)
	}

	/// Creates a token with an explicit issuance instant.
	pub fn with_issued_at(
		token: impl Into<String>,
		issued_at: OffsetDateTime,
		lifetime: Duration,
	) -> Self {
		Self { secret: TokenSecret::new(token), issued_at, expires_at: issued_at + lifetime }
	}

	/// The wrapped bearer secret.
	pub fn secret(&self) -> &TokenSecret {
		&self.secret
	}

	/// Instant the token was issued.
	pub fn issued_at(&self) -> OffsetDateTime {
		self.issued_at
	}

	/// Instant the token stops being valid.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Lifetime the token was issued with.
	pub fn lifetime(&self) -> Duration {
		self.expires_at - self.issued_at
	}

	/// Returns `true` once the current instant has reached the expiry instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when `instant` has reached the expiry instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` once the current instant is within `window` of the expiry instant.
	pub fn will_expire_within(&self, window: Duration) -> bool {
		self.will_expire_within_at(window, OffsetDateTime::now_utc())
	}

	/// Returns `true` when `instant` is within `window` of the expiry instant.
	pub fn will_expire_within_at(&self, window: Duration, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at - window
	}

	/// Renders the `Authorization` header value for this token.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.secret.expose())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
