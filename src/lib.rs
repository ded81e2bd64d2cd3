//! Fitbit Web API token client: rotating refresh tokens, expiry-aware bearer requests, and
//! transport-aware error mapping on top of the `oauth2` HTTP abstraction.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientCredentials, TokenState},
		client::TokenClient,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::ProviderEndpoints,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = TokenClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Endpoint set pointing both the API host and the token endpoint at a mock server base URL.
	pub fn mock_endpoints(base_url: &str) -> ProviderEndpoints {
		let base = Url::parse(base_url).expect("Mock server base URL should parse.");
		let token = base.join("/oauth2/token").expect("Mock token URL should resolve.");

		ProviderEndpoints::builder()
			.api_base(base)
			.token_endpoint(token)
			.build()
			.expect("Mock endpoints should validate.")
	}

	/// Token pair that stays valid for the next hour.
	pub fn live_state(access_token: &str, refresh_token: &str) -> TokenState {
		TokenState::new(access_token, refresh_token, OffsetDateTime::now_utc() + Duration::hours(1))
	}

	/// Token pair whose access token expired five minutes ago.
	pub fn expired_state(access_token: &str, refresh_token: &str) -> TokenState {
		TokenState::new(
			access_token,
			refresh_token,
			OffsetDateTime::now_utc() - Duration::minutes(5),
		)
	}

	/// Constructs a [`TokenClient`] with the reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(
		base_url: &str,
		client_id: &str,
		client_secret: &str,
		state: TokenState,
	) -> ReqwestTestClient {
		let credentials = ClientCredentials::new(client_id, client_secret)
			.expect("Test credentials should be valid.");

		TokenClient::with_http_client(
			credentials,
			state,
			mock_endpoints(base_url),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Test client should build.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use time;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
