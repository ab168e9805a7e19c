//! Integration tests for resource dispatch over HTTP using wiremock
//!
//! These tests drive bound operations end to end against mocked endpoints,
//! checking the wire request (method, path, query, body, headers) and the
//! mapping of response codes onto errors.

use serde_json::{json, Value};
use stripe_methods::api::oauth;
use stripe_methods::types::{OAuthDeauthorization, SubscriptionSchedule};
use stripe_methods::{
    ApiClient, Call, CallArg, ClientConfig, Error, Host, Params, RemoteErrorKind, RequestOptions,
};
use wiremock::matchers::{
    bearer_token, body_string, body_string_contains, header, header_exists, method, path,
    query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "sk_test_4eC39HqLyjWDarjtT1zdp7dc";

fn client_for(server: &MockServer) -> ApiClient {
    let config = ClientConfig::new(TEST_KEY)
        .with_base_url(Host::Api, server.uri())
        .with_base_url(Host::Connect, server.uri());
    ApiClient::new(config).expect("client should build")
}

fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => panic!("test params must be an object"),
    }
}

/// Test module for dispatching operations over HTTP
mod dispatch_tests {
    use super::*;

    /// Test a custom operation resolves its path and decodes the body
    #[tokio::test]
    async fn test_cancel_schedule_posts_to_resolved_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/subscription_schedules/sub_123/cancel"))
            .and(bearer_token(TEST_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "sub_123",
                "object": "subscription_schedule",
                "status": "canceled",
                "canceled_at": 1573000000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let schedule: SubscriptionSchedule = client
            .method("subscription_schedules", "cancel")
            .unwrap()
            .call_as(Call::new().id("sub_123"))
            .await
            .expect("cancel should succeed");

        assert_eq!(schedule.id, "sub_123");
        assert!(schedule.is_finished());
    }

    /// Test list filters go into the query string
    #[tokio::test]
    async fn test_list_sends_filters_as_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers"))
            .and(query_param("limit", "3"))
            .and(query_param("created[gt]", "1500000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "url": "/v1/customers",
                "has_more": false,
                "data": [{"id": "cus_1", "object": "customer"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .invoke(
                "customers",
                "list",
                Call::new().payload(params(json!({"limit": 3, "created": {"gt": 1500000000}}))),
            )
            .await
            .expect("list should succeed");

        assert_eq!(body["data"][0]["id"], "cus_1");
    }

    /// Test a list with no arguments sends no query string
    #[tokio::test]
    async fn test_list_without_filters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/subscription_schedules/sub_123/revisions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "has_more": false,
                "data": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .method("subscription_schedules", "listRevisions")
            .unwrap()
            .call_args(vec!["sub_123".into()])
            .await
            .expect("listRevisions should succeed");

        assert_eq!(body["data"], json!([]));
    }

    /// Test create data is form encoded with bracket notation
    #[tokio::test]
    async fn test_create_sends_form_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/customers"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(
                "email=jenny%40example.com&metadata[order_id]=6735&expand[0]=default_source",
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "cus_new", "object": "customer"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .invoke(
                "customers",
                "create",
                Call::new().payload(params(json!({
                    "email": "jenny@example.com",
                    "metadata": {"order_id": "6735"},
                    "expand": ["default_source"]
                }))),
            )
            .await
            .expect("create should succeed");

        assert_eq!(body["id"], "cus_new");
    }

    /// Test per-call options become headers and override the key
    #[tokio::test]
    async fn test_options_become_headers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/charges/ch_1/capture"))
            .and(bearer_token("sk_test_other_account_key"))
            .and(header("Idempotency-Key", "capture-ch_1"))
            .and(header("Stripe-Version", "2019-12-03"))
            .and(header("Stripe-Account", "acct_42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "ch_1", "object": "charge", "captured": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let options = RequestOptions::new()
            .with_api_key("sk_test_other_account_key")
            .with_idempotency_key("capture-ch_1")
            .with_api_version("2019-12-03")
            .with_header("Stripe-Account", "acct_42");

        let body = client
            .invoke("charges", "capture", Call::new().id("ch_1").options(options))
            .await
            .expect("capture should succeed");

        assert_eq!(body["captured"], true);
    }

    /// Test positional options objects are recognized by their keys
    #[tokio::test]
    async fn test_positional_options_object() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/customers/cus_1"))
            .and(header("Idempotency-Key", "upd-1"))
            .and(body_string("description=VIP"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "cus_1", "object": "customer"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .method("customers", "update")
            .unwrap()
            .call_args(vec![
                "cus_1".into(),
                json!({"description": "VIP"}).into(),
                json!({"idempotency_key": "upd-1"}).into(),
            ])
            .await
            .expect("update should succeed");

        assert_eq!(body["id"], "cus_1");
    }

    /// Test the configured API version is sent on every request
    #[tokio::test]
    async fn test_configured_api_version_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/issuing/cards/ic_1/details"))
            .and(header("Stripe-Version", "2020-03-02"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "issuing.card_details",
                "number": "4242424242424242"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig::new(TEST_KEY)
            .with_base_url(Host::Api, server.uri())
            .with_api_version("2020-03-02");
        let client = ApiClient::new(config).unwrap();

        let body = client
            .invoke("issuing_cards", "retrieveDetails", Call::new().id("ic_1"))
            .await
            .expect("retrieveDetails should succeed");

        assert_eq!(body["number"], "4242424242424242");
    }

    /// Test writes get a generated idempotency key when retries are enabled
    #[tokio::test]
    async fn test_generated_idempotency_key_with_retries() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .and(header_exists("Idempotency-Key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "re_1", "object": "refund"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let options = RequestOptions::new().with_max_network_retries(2);
        client
            .invoke(
                "refunds",
                "create",
                Call::new()
                    .payload(params(json!({"charge": "ch_1"})))
                    .options(options),
            )
            .await
            .expect("create should succeed");
    }

    /// Test the completion callback sees the same outcome as the caller
    #[tokio::test]
    async fn test_completion_callback_receives_result() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/customers/cus_1/sources/card_9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "card_9",
                "object": "card",
                "deleted": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let (tx, rx) = std::sync::mpsc::channel();
        let body = client
            .method("customers", "deleteSource")
            .unwrap()
            .call_args(vec![
                "cus_1".into(),
                "card_9".into(),
                CallArg::callback(move |result| {
                    tx.send(result.as_ref().map(|v| v["deleted"].clone()).is_ok())
                        .unwrap();
                }),
            ])
            .await
            .expect("deleteSource should succeed");

        assert_eq!(body["deleted"], true);
        assert!(rx.recv().unwrap());
    }

    /// Test calls on one client can run concurrently
    #[tokio::test]
    async fn test_concurrent_calls() {
        let server = MockServer::start().await;

        for id in ["cus_a", "cus_b", "cus_c"] {
            Mock::given(method("GET"))
                .and(path(format!("/v1/customers/{}", id)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"id": id, "object": "customer"})),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        let retrieve = client.method("customers", "retrieve").unwrap();
        let results = futures::future::join_all(
            ["cus_a", "cus_b", "cus_c"]
                .into_iter()
                .map(|id| retrieve.call(Call::new().id(id))),
        )
        .await;

        let ids: Vec<Value> = results
            .into_iter()
            .map(|r| r.expect("retrieve should succeed")["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("cus_a"), json!("cus_b"), json!("cus_c")]);
    }

    /// Test ids are sent as one path segment, whatever they contain
    #[tokio::test]
    async fn test_ids_cannot_escape_their_segment() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers/cus_1/sources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "list"})))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/charges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "list"})))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/customers/cus_1%2Fsources"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({
                    "error": {"type": "invalid_request_error", "message": "No such customer"}
                })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/customers/..%2Fcharges"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({
                    "error": {"type": "invalid_request_error", "message": "No such customer"}
                })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/customers/cus%201%3Fexpand%3Dx"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "cus 1?expand=x", "object": "customer"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let retrieve = client.method("customers", "retrieve").unwrap();

        for id in ["cus_1/sources", "../charges"] {
            let err = retrieve.call(Call::new().id(id)).await.unwrap_err();
            assert!(matches!(
                err,
                Error::RemoteApi(ref remote) if remote.status == 404
            ));
        }

        let body = retrieve
            .call(Call::new().id("cus 1?expand=x"))
            .await
            .expect("encoded id should reach the customer endpoint");
        assert_eq!(body["id"], "cus 1?expand=x");

        let err = retrieve.call(Call::new().id("..")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    /// Test structural errors never reach the network
    #[tokio::test]
    async fn test_invalid_arguments_send_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .method("subscription_schedules", "cancel")
            .unwrap()
            .call(Call::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));

        let err = client
            .method("subscription_schedules", "cancel")
            .unwrap()
            .call_args(vec![
                "sub_123".into(),
                json!({"invoice_now": true}).into(),
                json!({"prorate": false}).into(),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }
}

/// Test module for response code handling
mod error_response_tests {
    use super::*;

    /// Test a card error keeps its payload and classification
    #[tokio::test]
    async fn test_402_card_error() {
        let server = MockServer::start().await;

        let error_body = json!({
            "error": {
                "type": "card_error",
                "code": "card_declined",
                "message": "Your card was declined.",
                "param": "source"
            }
        });

        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .respond_with(
                ResponseTemplate::new(402)
                    .insert_header("request-id", "req_abc")
                    .set_body_json(&error_body),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .invoke(
                "charges",
                "create",
                Call::new().payload(params(json!({"amount": 2000, "currency": "usd"}))),
            )
            .await
            .unwrap_err();

        match err {
            Error::RemoteApi(remote) => {
                assert_eq!(remote.status, 402);
                assert_eq!(remote.kind, RemoteErrorKind::Card);
                assert_eq!(remote.code.as_deref(), Some("card_declined"));
                assert_eq!(remote.param.as_deref(), Some("source"));
                assert_eq!(remote.request_id.as_deref(), Some("req_abc"));
                assert_eq!(remote.payload, error_body);
            }
            other => panic!("expected a remote error, got {:?}", other),
        }
    }

    /// Test 401 indicates authentication failure
    #[tokio::test]
    async fn test_401_authentication() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers/cus_1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"type": "invalid_request_error", "message": "Invalid API Key provided"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .invoke("customers", "retrieve", Call::new().id("cus_1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::RemoteApi(ref remote) if remote.kind == RemoteErrorKind::Authentication
        ));
    }

    /// Test 404 surfaces the remote message
    #[tokio::test]
    async fn test_404_resource_missing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/invoices/in_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "type": "invalid_request_error",
                    "code": "resource_missing",
                    "message": "No such invoice: in_missing"
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .invoke("invoices", "retrieve", Call::new().id("in_missing"))
            .await
            .unwrap_err();

        assert_eq!(
            stripe_methods::error::format_api_error(&err),
            "No such invoice: in_missing"
        );
    }

    /// Test 429 indicates rate limiting
    #[tokio::test]
    async fn test_429_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/charges"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"type": "rate_limit_error", "message": "Too many requests"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.invoke("charges", "list", Call::new()).await.unwrap_err();

        assert!(matches!(
            err,
            Error::RemoteApi(ref remote) if remote.kind == RemoteErrorKind::RateLimit
        ));
    }

    /// Test 500 with a non-JSON body
    #[tokio::test]
    async fn test_500_plain_text_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.invoke("customers", "list", Call::new()).await.unwrap_err();

        match err {
            Error::RemoteApi(remote) => {
                assert_eq!(remote.kind, RemoteErrorKind::Api);
                assert_eq!(remote.payload, Value::Null);
                assert_eq!(remote.message, "HTTP 500");
            }
            other => panic!("expected a remote error, got {:?}", other),
        }
    }

    /// Test an empty success body decodes to null
    #[tokio::test]
    async fn test_empty_response_body() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/customers/cus_1/discount"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .invoke("customers", "deleteDiscount", Call::new().id("cus_1"))
            .await
            .expect("empty body should succeed");

        assert_eq!(body, Value::Null);
    }

    /// Test malformed JSON on success is a decode error
    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/recipients/rp_1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .invoke("recipients", "retrieve", Call::new().id("rp_1"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }

    /// Test an unreachable host is a network error
    #[tokio::test]
    async fn test_connection_refused() {
        let config = ClientConfig::new(TEST_KEY).with_base_url(Host::Api, "http://127.0.0.1:1");
        let client = ApiClient::new(config).unwrap();

        let err = client
            .invoke("customers", "retrieve", Call::new().id("cus_1"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
    }
}

/// Test module for OAuth on the connect host
mod oauth_tests {
    use super::*;

    /// Test token exchange posts to the connect host without the /v1 prefix
    #[tokio::test]
    async fn test_token_exchange() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string("code=ac_123456789&grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "sk_access_token",
                "scope": "read_only",
                "livemode": false,
                "token_type": "bearer",
                "refresh_token": "sk_refresh_token",
                "stripe_user_id": "acct_test",
                "stripe_publishable_key": "pk_test"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = oauth::token(
            &client,
            params(json!({"code": "ac_123456789", "grant_type": "authorization_code"})),
            RequestOptions::new(),
        )
        .await
        .expect("token exchange should succeed");

        assert_eq!(token.stripe_user_id, "acct_test");
        assert_eq!(token.access_token.as_deref(), Some("sk_access_token"));
    }

    /// Test deauthorize fills in the configured client id
    #[tokio::test]
    async fn test_deauthorize_adds_client_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/deauthorize"))
            .and(body_string_contains("stripe_user_id=some_user_id"))
            .and(body_string_contains("client_id=ca_default"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"stripe_user_id": "some_user_id"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig::new(TEST_KEY)
            .with_base_url(Host::Connect, server.uri())
            .with_client_id("ca_default");
        let client = ApiClient::new(config).unwrap();

        let result: OAuthDeauthorization = oauth::deauthorize(
            &client,
            params(json!({"stripe_user_id": "some_user_id"})),
            RequestOptions::new(),
        )
        .await
        .expect("deauthorize should succeed");

        assert_eq!(result.stripe_user_id, "some_user_id");
    }
}
