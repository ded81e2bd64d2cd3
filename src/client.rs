//! Token-managing client for the Fitbit Web API.

pub mod refresh;
pub mod request;

pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenState},
	error::ConfigError,
	http::ApiHttpClient,
	oauth::TransportErrorMapper,
	provider::{FitbitStrategy, ProviderEndpoints, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenClient = TokenClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Holds one Fitbit token pair and issues bearer-authenticated requests with it.
///
/// The client owns exactly one [`TokenState`]. Refreshes replace it as a whole and run under
/// an async guard, so concurrent callers that all observe an expired token trigger a single
/// `grant_type=refresh_token` call; the rest proceed with the rotated token. Share the client
/// behind an `Arc` rather than cloning it: two independent copies would race on the single-use
/// refresh token.
///
/// The client does not persist anything. Store the output of [`TokenClient::tokens`] after
/// every refresh if the pair must survive a restart.
pub struct TokenClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// API host, token endpoint, and authorize page.
	pub endpoints: ProviderEndpoints,
	/// Strategy classifying token endpoint failures.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Counters for refresh attempts and outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	credentials: ClientCredentials,
	state: RwLock<TokenState>,
	refresh_guard: AsyncMutex<()>,
}
impl<C, M> TokenClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	///
	/// No request is sent. Fails when a token string is empty or an endpoint is invalid.
	pub fn with_http_client(
		credentials: ClientCredentials,
		state: TokenState,
		endpoints: ProviderEndpoints,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		state.validate()?;
		endpoints.validate().map_err(ConfigError::from)?;

		Ok(Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			endpoints,
			strategy: Arc::new(FitbitStrategy),
			refresh_metrics: Default::default(),
			credentials,
			state: RwLock::new(state),
			refresh_guard: AsyncMutex::new(()),
		})
	}

	/// Replaces the token error classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Returns a copy of the current token pair and expiry.
	pub fn tokens(&self) -> TokenState {
		self.state.read().clone()
	}

	/// Returns `true` if the current access token is expired.
	pub fn is_expired(&self) -> bool {
		self.state.read().is_expired()
	}

	/// Returns the client credentials used for refresh requests.
	pub fn credentials(&self) -> &ClientCredentials {
		&self.credentials
	}
}
#[cfg(feature = "reqwest")]
impl TokenClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client for the production Fitbit endpoints.
	///
	/// The client provisions its own reqwest-backed transport. No request is sent; every input
	/// string must be non-empty.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl AsRef<str>,
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		expires_at: OffsetDateTime,
	) -> Result<Self> {
		Self::with_http_client(
			ClientCredentials::new(client_id, client_secret)?,
			TokenState::new(access_token, refresh_token, expires_at),
			ProviderEndpoints::fitbit(),
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for TokenClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenClient")
			.field("endpoints", &self.endpoints)
			.field("credentials", &self.credentials)
			.field("state", &*self.state.read())
			.finish()
	}
}
