#![allow(dead_code)]

// crates.io
use httpmock::prelude::*;
// self
use fitbit_token_client::{_preludet::*, auth::TokenState};

pub const CLIENT_ID: &str = "fitbit-client";
pub const CLIENT_SECRET: &str = "fitbit-secret";
/// `base64("fitbit-client:fitbit-secret")`.
pub const BASIC_AUTHORIZATION: &str = "Basic Zml0Yml0LWNsaWVudDpmaXRiaXQtc2VjcmV0";
pub const PROFILE_PATH: &str = "/1/user/-/profile.json";

pub fn build_client(server: &MockServer, state: TokenState) -> ReqwestTestClient {
	build_reqwest_test_client(&server.base_url(), CLIENT_ID, CLIENT_SECRET, state)
}

pub async fn mock_refresh<'a>(
	server: &'a MockServer,
	refresh_token: &str,
	response_body: &str,
) -> httpmock::Mock<'a> {
	let form = format!("grant_type=refresh_token&refresh_token={refresh_token}");

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/token")
				.header("authorization", BASIC_AUTHORIZATION)
				.header("content-type", "application/x-www-form-urlencoded")
				.body(form);
			then.status(200).header("content-type", "application/json").body(response_body);
		})
		.await
}
