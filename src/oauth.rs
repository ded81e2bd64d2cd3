//! Refresh grant exchange and transport error mapping.
//!
//! The refresh request is assembled by hand instead of through `oauth2::BasicClient`: Fitbit
//! expects `Authorization: Basic base64(client_id:client_secret)` with the raw pair, while the
//! `oauth2` client form-urlencodes both halves first. Requests still travel through the
//! `oauth2` [`AsyncHttpClient`] abstraction so every transport implementing [`ApiHttpClient`]
//! works unchanged.

pub use oauth2;

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::Method};
// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	error::{ConfigError, TransientError, TransportError},
	http::{self, ApiHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::CallKind,
	provider::{ProviderErrorContext, ProviderErrorKind, ProviderStrategy},
};

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		call: CallKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		call: CallKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(call, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(call, meta, message),
			_ => map_generic_transport_error(call, meta, "unrecognized transport failure"),
		}
	}
}

/// Token endpoint payload consumed by the refresh grant.
#[derive(Clone, Deserialize)]
pub struct RefreshTokenResponse {
	/// Newly issued bearer token.
	pub access_token: String,
	/// Rotated refresh token; Fitbit always sends one.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Seconds until `access_token` expires.
	pub expires_in: u64,
}
impl RefreshTokenResponse {
	/// Converts `expires_in` into a strictly positive [`Duration`].
	pub fn lifetime(&self) -> Result<Duration, ConfigError> {
		let secs = i64::try_from(self.expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

		if secs <= 0 {
			return Err(ConfigError::NonPositiveExpiresIn);
		}

		Ok(Duration::seconds(secs))
	}
}
impl Debug for RefreshTokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshTokenResponse")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

/// Builds the `grant_type=refresh_token` request for the token endpoint.
pub(crate) fn build_refresh_request(
	token_url: &Url,
	credentials: &ClientCredentials,
	refresh_token: &str,
) -> Result<HttpRequest> {
	let request = http::build_request(
		Method::POST,
		token_url,
		&credentials.basic_authorization(),
		Some(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)]),
	)?;

	Ok(request)
}

/// Performs the refresh grant and decodes the token endpoint response.
pub(crate) async fn exchange_refresh_token<C, M>(
	http_client: &C,
	mapper: &M,
	strategy: &dyn ProviderStrategy,
	token_url: &Url,
	credentials: &ClientCredentials,
	refresh_token: &str,
) -> Result<RefreshTokenResponse>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let request = build_refresh_request(token_url, credentials, refresh_token)?;
	let (response, meta) = dispatch(http_client, mapper, CallKind::Refresh, request).await?;
	let status = response.status();

	if !status.is_success() {
		return Err(map_token_endpoint_error(
			strategy,
			status.as_u16(),
			response.body(),
			meta.as_ref(),
		));
	}

	decode_json(response.body()).map_err(|source| {
		TransientError::TokenResponseParse { source, status: Some(status.as_u16()) }.into()
	})
}

/// Sends one request through a fresh metadata-bound handle.
pub(crate) async fn dispatch<C, M>(
	http_client: &C,
	mapper: &M,
	call: CallKind,
	request: HttpRequest,
) -> Result<(HttpResponse, Option<ResponseMetadata>)>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let slot = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(slot.clone());

	match handle.call(request).await {
		Ok(response) => Ok((response, slot.take())),
		Err(err) => Err(mapper.map_transport_error(call, slot.take().as_ref(), err)),
	}
}

/// Decodes a JSON body, keeping the path of the failing field.
pub(crate) fn decode_json<T>(body: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: serde::de::DeserializeOwned,
{
	let de = &mut serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(de)
}

fn map_token_endpoint_error(
	strategy: &dyn ProviderStrategy,
	status: u16,
	body: &[u8],
	meta: Option<&ResponseMetadata>,
) -> Error {
	let ctx = ProviderErrorContext::from_response(status, body);
	let message = match ctx.summary() {
		Some(summary) => format!("Token endpoint returned HTTP {status}: {summary}"),
		None => format!("Token endpoint returned HTTP {status}"),
	};

	match strategy.classify_token_error(&ctx) {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		ProviderErrorKind::InsufficientScope => Error::InsufficientScope { reason: message },
		ProviderErrorKind::Transient => TransientError::TokenEndpoint {
			message,
			status: Some(status),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(call: CallKind, meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() && call.is_token_call() {
		return TransientError::TokenEndpoint {
			message: "Request timed out while calling the token endpoint".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::network(target(call), err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	call: CallKind,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	if call.is_token_call() {
		TransientError::TokenEndpoint {
			message: format!("HTTP client error occurred while calling the token endpoint: {message}"),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into()
	} else {
		TransportError::Io(std::io::Error::other(message.to_string())).into()
	}
}

/// Human-readable label for the endpoint a call targets.
#[cfg(feature = "reqwest")]
fn target(call: CallKind) -> &'static str {
	if call.is_token_call() { "the token endpoint" } else { "the API" }
}

#[cfg(feature = "reqwest")]
fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

pub(crate) fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
