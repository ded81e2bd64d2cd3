//! OAuth client credentials and their HTTP Basic encoding.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, error::ConfigError};

/// Client id + secret pair registered with the provider.
///
/// The pair is only ever sent to the token endpoint, as an `Authorization: Basic` header.
/// The encoded value is computed once at construction.
#[derive(Clone)]
pub struct ClientCredentials {
	client_id: String,
	basic_token: String,
}
impl ClientCredentials {
	/// Validates and encodes a credential pair.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl AsRef<str>,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let client_secret = client_secret.as_ref();

		if client_id.is_empty() {
			return Err(ConfigError::EmptyValue { field: "client_id" });
		}
		if client_secret.is_empty() {
			return Err(ConfigError::EmptyValue { field: "client_secret" });
		}

		let basic_token = STANDARD.encode(format!("{client_id}:{client_secret}"));

		Ok(Self { client_id, basic_token })
	}

	/// Returns the public client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Returns `base64(client_id:client_secret)` using the padded standard alphabet.
	pub fn basic_token(&self) -> &str {
		&self.basic_token
	}

	/// Returns the complete `Authorization` header value.
	pub fn basic_authorization(&self) -> String {
		format!("Basic {}", self.basic_token)
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("basic_token", &"<redacted>")
			.finish()
	}
}
