//! Refresh token rotation guarded against concurrent refreshes.
//!
//! [`TokenClient::refresh`] always calls the token endpoint. Request helpers go through
//! [`TokenClient::fresh_access_token`], which refreshes only when the current token is expired.
//! Both paths hold the client's refresh guard while they read, exchange, and replace the token
//! state, so a refresh token is never presented twice.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, TokenState},
	client::TokenClient,
	http::ApiHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

impl<C, M> TokenClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the current refresh token for a new token pair, regardless of expiry.
	///
	/// On success the whole [`TokenState`] is replaced and returned; persist it, since the
	/// previous refresh token is no longer valid. On failure the error is returned unchanged
	/// and the current state is kept.
	pub async fn refresh(&self) -> Result<TokenState> {
		let _guard = self.refresh_guard.lock().await;

		self.refresh_locked().await
	}

	/// Returns a usable access token, refreshing first if the current one is expired.
	///
	/// Expiry is evaluated once, under the refresh guard.
	pub async fn fresh_access_token(&self) -> Result<TokenSecret> {
		let _guard = self.refresh_guard.lock().await;
		let expired = self.state.read().is_expired();

		if expired {
			let state = self.refresh_locked().await?;

			return Ok(state.access_token);
		}

		Ok(self.state.read().access_token.clone())
	}

	// Callers must hold `refresh_guard`.
	async fn refresh_locked(&self) -> Result<TokenState> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async {
				let current = self.state.read().clone();
				let response = oauth::exchange_refresh_token(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					self.strategy.as_ref(),
					&self.endpoints.token,
					&self.credentials,
					current.refresh_token.expose(),
				)
				.await?;
				let issued_at = OffsetDateTime::now_utc();
				let lifetime = response.lifetime()?;
				let next = current.rotate(
					response.access_token,
					response.refresh_token,
					issued_at,
					lifetime,
				)?;

				*self.state.write() = next.clone();

				Ok::<_, Error>((next, issued_at))
			})
			.await;

		match result {
			Ok((next, issued_at)) => {
				self.refresh_metrics.record_success(issued_at);
				obs::record_call_outcome(KIND, CallOutcome::Success);

				Ok(next)
			},
			Err(err) => {
				self.refresh_metrics.record_failure();
				obs::record_call_outcome(KIND, CallOutcome::Failure);

				Err(err)
			},
		}
	}
}
