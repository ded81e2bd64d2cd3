//! Bearer-authenticated API calls.
//!
//! These helpers are the building blocks for endpoint wrappers defined by composing crates.
//! Each one refreshes an expired token first, then sends exactly one request. Every failure,
//! including a failed refresh, comes back as the `Err` arm; nothing panics and nothing is
//! retried.

// crates.io
use oauth2::{HttpResponse, http::Method};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	client::TokenClient,
	error::{ApiError, ConfigError},
	http::{self, ApiHttpClient},
	oauth::{self, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
	provider::ProviderErrorContext,
};

impl<C, M> TokenClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends a GET to `uri` and decodes the JSON body.
	///
	/// `uri` is resolved against the API base, e.g. `/1/user/-/profile.json`.
	pub async fn get(&self, uri: &str) -> Result<Value> {
		let response = self.send(CallKind::Get, Method::GET, uri, None).await?;

		decode_api_json(&response)
	}

	/// Sends a POST to `uri` with an optional form body and decodes the JSON body.
	pub async fn post(&self, uri: &str, form: Option<&[(&str, &str)]>) -> Result<Value> {
		let response = self.send(CallKind::Post, Method::POST, uri, form).await?;

		decode_api_json(&response)
	}

	/// Sends a DELETE to `uri` with an optional form body and returns the raw response.
	///
	/// Fitbit answers most deletions with `204 No Content`, so the body is left undecoded.
	pub async fn delete(&self, uri: &str, form: Option<&[(&str, &str)]>) -> Result<HttpResponse> {
		self.send(CallKind::Delete, Method::DELETE, uri, form).await
	}

	async fn send(
		&self,
		kind: CallKind,
		method: Method,
		uri: &str,
		form: Option<&[(&str, &str)]>,
	) -> Result<HttpResponse> {
		let span = CallSpan::new(kind, "send");

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let url = self.endpoints.resolve(uri).map_err(|source| {
					ConfigError::InvalidRequestUri { uri: uri.to_owned(), source }
				})?;
				let access_token = self.fresh_access_token().await?;
				let request = http::build_request(
					method,
					&url,
					&format!("Bearer {}", access_token.expose()),
					form,
				)?;
				let (response, meta) = oauth::dispatch(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					kind,
					request,
				)
				.await?;
				let status = response.status();

				span.record_status(status.as_u16());

				if !status.is_success() {
					let ctx = ProviderErrorContext::from_response(status.as_u16(), response.body());
					let message = ctx
						.summary()
						.or(status.canonical_reason())
						.unwrap_or("no details provided")
						.to_owned();

					return Err(ApiError::Status {
						status: status.as_u16(),
						message,
						retry_after: oauth::meta_retry_after(meta.as_ref()),
					}
					.into());
				}

				Ok(response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
		}

		result
	}
}

fn decode_api_json(response: &HttpResponse) -> Result<Value> {
	oauth::decode_json(response.body()).map_err(|source| {
		ApiError::ResponseParse { source, status: response.status().as_u16() }.into()
	})
}
