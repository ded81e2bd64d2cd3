//! Token pair plus absolute expiry, replaced wholesale on every refresh.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, error::ConfigError};

/// Lifecycle status of the current access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Access token is still usable.
	Active,
	/// Access token reached its expiry instant.
	Expired,
}

/// Access/refresh token pair held by a [`TokenClient`](crate::client::TokenClient).
///
/// Fitbit rotates refresh tokens on every use, so callers persisting credentials across
/// restarts must store the whole value returned by
/// [`TokenClient::tokens`](crate::client::TokenClient::tokens) after each refresh, not only the
/// access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
	/// Bearer credential attached to API requests.
	pub access_token: TokenSecret,
	/// Single-use credential exchanged for the next token pair.
	pub refresh_token: TokenSecret,
	/// Absolute expiry instant of `access_token`.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
}
impl TokenState {
	/// Creates a state from caller-supplied values.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		expires_at: OffsetDateTime,
	) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
			expires_at,
		}
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant >= self.expires_at { TokenStatus::Expired } else { TokenStatus::Active }
	}

	/// Returns `true` if the access token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Returns `true` if the access token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Rejects states carrying empty token strings.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.access_token.is_empty() {
			return Err(ConfigError::EmptyValue { field: "access_token" });
		}
		if self.refresh_token.is_empty() {
			return Err(ConfigError::EmptyValue { field: "refresh_token" });
		}

		Ok(())
	}

	/// Builds the successor state from a token endpoint response.
	///
	/// The expiry becomes `issued_at + expires_in`. A missing `refresh_token` keeps the current
	/// one so the client never ends up without a refresh credential. Empty token strings are
	/// rejected, like at construction.
	pub fn rotate(
		&self,
		access_token: String,
		refresh_token: Option<String>,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Result<Self, ConfigError> {
		let expires_at =
			issued_at.checked_add(expires_in).ok_or(ConfigError::ExpiresInOutOfRange)?;

		let next = Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: refresh_token
				.map(TokenSecret::new)
				.unwrap_or_else(|| self.refresh_token.clone()),
			expires_at,
		};

		next.validate()?;

		Ok(next)
	}
}
impl Debug for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenState")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
