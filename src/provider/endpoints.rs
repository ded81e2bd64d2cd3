//! Endpoint set used by the token client and its validating builder.

// self
use crate::_prelude::*;

/// Fitbit Web API host that request URIs are resolved against.
pub const FITBIT_API_BASE: &str = "https://api.fitbit.com";
/// Fitbit token endpoint used for refresh grants.
pub const FITBIT_TOKEN_URL: &str = "https://api.fitbit.com/oauth2/token";
/// Fitbit authorize page used for the (external) authorization-code step.
pub const FITBIT_AUTHORIZE_URL: &str = "https://www.fitbit.com/oauth2/authorize";

/// Errors raised while constructing or validating endpoints.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum EndpointsError {
	/// API base URL is mandatory.
	#[error("Missing API base URL.")]
	MissingApiBase,
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The API base cannot carry relative request paths.
	#[error("The API base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Rejected URL.
		url: String,
	},
}

/// Endpoint set for one provider deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Host that relative request URIs are joined onto.
	pub api_base: Url,
	/// Token endpoint used for refresh grants.
	pub token: Url,
	/// Authorize page; carried for callers running the authorization-code step themselves.
	pub authorization: Option<Url>,
}
impl ProviderEndpoints {
	/// Creates a new builder with no endpoints set.
	pub fn builder() -> ProviderEndpointsBuilder {
		ProviderEndpointsBuilder::default()
	}

	/// Production Fitbit endpoints.
	pub fn fitbit() -> Self {
		Self {
			api_base: Url::parse(FITBIT_API_BASE).expect("API base constant should parse."),
			token: Url::parse(FITBIT_TOKEN_URL).expect("Token URL constant should parse."),
			authorization: Some(
				Url::parse(FITBIT_AUTHORIZE_URL).expect("Authorize URL constant should parse."),
			),
		}
	}

	/// Resolves a request URI against [`api_base`](Self::api_base).
	///
	/// Absolute URIs are returned unchanged; relative ones replace the base path.
	pub fn resolve(&self, uri: &str) -> Result<Url, url::ParseError> {
		self.api_base.join(uri)
	}

	/// Validates invariants for the endpoint set.
	pub fn validate(&self) -> Result<(), EndpointsError> {
		validate_endpoint("api_base", &self.api_base)?;

		if self.api_base.cannot_be_a_base() {
			return Err(EndpointsError::CannotBeABase { url: self.api_base.to_string() });
		}

		validate_endpoint("token", &self.token)?;

		if let Some(authorization) = self.authorization.as_ref() {
			validate_endpoint("authorization", authorization)?;
		}

		Ok(())
	}
}
impl Default for ProviderEndpoints {
	fn default() -> Self {
		Self::fitbit()
	}
}

/// Builder for [`ProviderEndpoints`] values.
#[derive(Debug, Default)]
pub struct ProviderEndpointsBuilder {
	/// Host for API requests.
	pub api_base: Option<Url>,
	/// Token endpoint used for refreshes.
	pub token: Option<Url>,
	/// Optional authorize page.
	pub authorization: Option<Url>,
}
impl ProviderEndpointsBuilder {
	/// Sets the API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token = Some(url);

		self
	}

	/// Sets the authorize page.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting endpoint set.
	pub fn build(self) -> Result<ProviderEndpoints, EndpointsError> {
		let api_base = self.api_base.ok_or(EndpointsError::MissingApiBase)?;
		let token = self.token.ok_or(EndpointsError::MissingTokenEndpoint)?;
		let endpoints = ProviderEndpoints { api_base, token, authorization: self.authorization };

		endpoints.validate()?;

		Ok(endpoints)
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), EndpointsError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(EndpointsError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	}
}
