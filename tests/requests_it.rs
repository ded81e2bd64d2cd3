#![cfg(all(feature = "reqwest", feature = "test"))]

mod common;

// crates.io
use httpmock::prelude::*;
// self
use common::*;
use fitbit_token_client::{_preludet::*, error::ApiError};

#[tokio::test]
async fn valid_token_skips_refresh() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, live_state("access-live", "refresh-live"));
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(500);
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "Bearer access-live");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"user\":{\"encodedId\":\"ABC123\",\"displayName\":\"Runner\"}}");
		})
		.await;
	let body = client.get(PROFILE_PATH).await.expect("Profile request should succeed.");

	profile.assert_async().await;
	refresh.assert_calls_async(0).await;

	assert_eq!(body["user"]["encodedId"], "ABC123");
	assert_eq!(client.refresh_metrics.attempts(), 0);
}

#[tokio::test]
async fn expired_token_refreshes_once_before_get() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, expired_state("access-stale", "refresh-stale"));
	let refresh = mock_refresh(
		&server,
		"refresh-stale",
		"{\"access_token\":\"access-fresh\",\"refresh_token\":\"refresh-fresh\",\"expires_in\":28800}",
	)
	.await;
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "Bearer access-stale");
			then.status(401);
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "Bearer access-fresh");
			then.status(200).header("content-type", "application/json").body("{\"user\":{}}");
		})
		.await;

	client.get(PROFILE_PATH).await.expect("Profile request should succeed after refresh.");

	refresh.assert_async().await;
	profile.assert_async().await;
	stale.assert_calls_async(0).await;

	assert_eq!(client.tokens().refresh_token.expose(), "refresh-fresh");
	assert!(!client.is_expired());
}

#[tokio::test]
async fn concurrent_expired_calls_share_one_refresh() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, expired_state("access-old", "refresh-old"));
	let refresh = mock_refresh(
		&server,
		"refresh-old",
		"{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\",\"expires_in\":3600}",
	)
	.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "Bearer access-new");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let (first, second) = tokio::join!(client.get(PROFILE_PATH), client.get(PROFILE_PATH));

	first.expect("First request should succeed.");
	second.expect("Second request should succeed.");
	refresh.assert_calls_async(1).await;
	profile.assert_calls_async(2).await;
}

#[tokio::test]
async fn failed_refresh_is_returned_from_get() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, expired_state("access-x", "refresh-revoked"));
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"errors\":[{\"errorType\":\"invalid_grant\",\"message\":\"Refresh token invalid.\"}]}");
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH);
			then.status(200).body("{}");
		})
		.await;
	let err = client.get(PROFILE_PATH).await.expect_err("Refresh failure should be returned.");

	refresh.assert_async().await;
	profile.assert_calls_async(0).await;

	assert!(matches!(err, Error::InvalidGrant { .. }));
}

#[tokio::test]
async fn post_sends_form_and_decodes_json() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, live_state("access-post", "refresh-post"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/1/user/-/body/log/weight.json")
				.header("authorization", "Bearer access-post")
				.header("content-type", "application/x-www-form-urlencoded")
				.body("weight=73.5&date=2025-01-15");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"weightLog\":{\"logId\":1330991999000,\"weight\":73.5}}");
		})
		.await;
	let body = client
		.post("/1/user/-/body/log/weight.json", Some(&[("weight", "73.5"), ("date", "2025-01-15")]))
		.await
		.expect("Weight log should be created.");

	mock.assert_async().await;

	assert_eq!(body["weightLog"]["weight"], 73.5);
}

#[tokio::test]
async fn delete_returns_raw_response() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, live_state("access-del", "refresh-del"));
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/1/user/-/body/log/weight/1330991999000.json")
				.header("authorization", "Bearer access-del");
			then.status(204);
		})
		.await;
	let response = client
		.delete("/1/user/-/body/log/weight/1330991999000.json", None)
		.await
		.expect("Delete should succeed.");

	mock.assert_async().await;

	assert_eq!(response.status().as_u16(), 204);
	assert!(response.body().is_empty());
}

#[tokio::test]
async fn api_error_status_is_returned_as_value() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, live_state("access-scope", "refresh-scope"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/1/user/-/sleep/date/today.json");
			then.status(403).header("content-type", "application/json").body(
				"{\"errors\":[{\"errorType\":\"insufficient_scope\",\"message\":\"This application does not have permission to access sleep data.\"}],\"success\":false}",
			);
		})
		.await;
	let err = client
		.get("/1/user/-/sleep/date/today.json")
		.await
		.expect_err("Missing scope should be returned as an error.");

	mock.assert_async().await;

	match err {
		Error::Api(ApiError::Status { status, message, .. }) => {
			assert_eq!(status, 403);
			assert!(message.contains("permission to access sleep data"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn rate_limited_api_call_reports_retry_after() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, live_state("access-rl", "refresh-rl"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/1/user/-/activities/date/today.json");
			then.status(429).header("retry-after", "1800").body("");
		})
		.await;
	let err = client
		.get("/1/user/-/activities/date/today.json")
		.await
		.expect_err("Throttled request should fail.");

	mock.assert_async().await;

	match err {
		Error::Api(ApiError::Status { status, retry_after, message }) => {
			assert_eq!(status, 429);
			assert_eq!(retry_after, Some(Duration::seconds(1800)));
			assert_eq!(message, "Too Many Requests");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn malformed_api_json_is_returned_as_value() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, live_state("access-json", "refresh-json"));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH);
			then.status(200).body("not json");
		})
		.await;
	let err = client.get(PROFILE_PATH).await.expect_err("Invalid JSON should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Api(ApiError::ResponseParse { status: 200, .. })));
}
