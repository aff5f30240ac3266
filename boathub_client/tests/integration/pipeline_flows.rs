use std::time::Duration;

use boathub_client::{
    ApiError, BoatHubClient, BoatRequest, BoatType, ClientConfig, HeaderMap, Method, Pageable,
};
use serde_json::{Value, json};

use crate::common::{client_at, client_for, login, spawn_mock_server};

fn orca() -> BoatRequest {
    BoatRequest {
        name: "Orca".to_string(),
        description: Some("Killer whale of a boat".to_string()),
        boat_type: BoatType::Sailboat,
    }
}

#[tokio::test]
async fn test_mutating_request_carries_stored_token() {
    // Given a server that names its CSRF header X-XSRF-TOKEN
    let server = spawn_mock_server().await;
    server.state.set_header_name("X-XSRF-TOKEN");
    server.state.queue_tokens(&["abc"]);
    let (client, _) = client_for(&server);

    // When a boat is created and the list is read
    let created = client.boats().create(&orca()).await.unwrap();
    client.boats().list(&Pageable::default()).await.unwrap();

    // Then the POST carried exactly the stored token under the server's header name
    let stored = client.token_store().get();
    assert_eq!(stored.value.as_deref(), Some("abc"));
    assert_eq!(stored.header_name, "X-XSRF-TOKEN");
    let posts = server.state.requests_to("POST", "/api/v1/boats");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].csrf_token, stored.value);
    assert_eq!(created.name, "Orca");

    // And the GET carried no token at all
    let gets = server.state.requests_to("GET", "/api/v1/boats");
    assert_eq!(gets.len(), 1);
    assert!(gets[0].csrf_token.is_none());
}

#[tokio::test]
async fn test_concurrent_ensure_fetches_once() {
    // Given a slow token endpoint and an empty store
    let server = spawn_mock_server().await;
    server.state.set_token_delay(Duration::from_millis(100));
    let (client, _) = client_for(&server);
    let fetcher = client.token_fetcher();

    // When several callers ask for a token at the same time
    let (a, b, c, d) = tokio::join!(
        fetcher.ensure(),
        fetcher.ensure(),
        fetcher.ensure(),
        fetcher.ensure()
    );

    // Then one fetch served them all
    assert_eq!(server.state.token_fetches(), 1);
    let a = a.unwrap();
    assert_eq!(a.value.as_deref(), Some("token-1"));
    assert_eq!(b.unwrap(), a);
    assert_eq!(c.unwrap(), a);
    assert_eq!(d.unwrap(), a);
}

#[tokio::test]
async fn test_dropped_fetch_is_taken_over_by_one_waiter() {
    // Given a slow token endpoint and an empty store
    let server = spawn_mock_server().await;
    server.state.set_token_delay(Duration::from_millis(200));
    let (client, _) = client_for(&server);
    let fetcher = client.token_fetcher();

    // When the caller that started the fetch gives up while others wait on it
    let (abandoned, a, b, c) = tokio::join!(
        tokio::time::timeout(Duration::from_millis(30), fetcher.ensure()),
        fetcher.ensure(),
        fetcher.ensure(),
        fetcher.ensure()
    );

    // Then exactly one waiter issues the replacement fetch and shares it
    assert!(abandoned.is_err());
    assert_eq!(server.state.requests_to("GET", "/api/csrf-token").len(), 2);
    let a = a.unwrap();
    assert!(a.is_present());
    assert_eq!(b.unwrap(), a);
    assert_eq!(c.unwrap(), a);
    assert_eq!(client.token_store().get(), a);
}

#[tokio::test]
async fn test_concurrent_mutations_share_one_token_fetch() {
    let server = spawn_mock_server().await;
    server.state.set_token_delay(Duration::from_millis(50));
    let (client, _) = client_for(&server);

    let boat = orca();
    let (first, second, third) = tokio::join!(
        client.boats().create(&boat),
        client.boats().create(&boat),
        client.boats().create(&boat)
    );

    assert!(first.is_ok() && second.is_ok() && third.is_ok());
    assert_eq!(server.state.token_fetches(), 1);
    let posts = server.state.requests_to("POST", "/api/v1/boats");
    assert_eq!(posts.len(), 3);
    assert!(
        posts
            .iter()
            .all(|p| p.csrf_token.as_deref() == Some("token-1"))
    );
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_and_request_replayed() {
    // Given a store holding "abc" and a server that has rotated its token
    let server = spawn_mock_server().await;
    server.state.queue_tokens(&["abc", "xyz"]);
    let (client, _) = client_for(&server);
    client.init().await;
    assert_eq!(client.token_store().get().value.as_deref(), Some("abc"));
    server.state.reject_next_mutations(1);

    // When a boat is created
    let created = client.boats().create(&orca()).await.unwrap();

    // Then the created boat comes back from the replayed request
    assert_eq!(created.name, "Orca");
    assert_eq!(created.boat_type, BoatType::Sailboat);

    // And the first attempt carried "abc", the retry "xyz"
    let posts = server.state.requests_to("POST", "/api/v1/boats");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].csrf_token.as_deref(), Some("abc"));
    assert_eq!(posts[1].csrf_token.as_deref(), Some("xyz"));
    assert_eq!(server.state.token_fetches(), 2);
    assert_eq!(client.token_store().get().value.as_deref(), Some("xyz"));
}

#[tokio::test]
async fn test_persistent_token_rejection_is_forbidden_after_one_retry() {
    // Given a server that rejects every token
    let server = spawn_mock_server().await;
    server.state.reject_next_mutations(10);
    let (client, _) = client_for(&server);

    // When a boat is created
    let result = client.boats().create(&orca()).await;

    // Then the call fails as forbidden with the server's message
    match result {
        Err(ApiError::Forbidden(message)) => assert_eq!(message, "Invalid CSRF token"),
        other => panic!("Expected Forbidden, got {other:?}"),
    }

    // And there was one refresh and one retry, never a third attempt
    assert_eq!(server.state.requests_to("POST", "/api/v1/boats").len(), 2);
    assert_eq!(server.state.token_fetches(), 2);
}

#[tokio::test]
async fn test_failed_refresh_after_rejection_is_forbidden() {
    // Given a client holding a token and a server that rejects it
    let server = spawn_mock_server().await;
    let (client, _) = client_for(&server);
    client.init().await;
    server.state.reject_next_mutations(1);

    // And a token endpoint that now fails
    server.state.set_token_status(500);

    // When a boat is created
    let result = client.boats().create(&orca()).await;

    // Then the call is forbidden and the request is not replayed
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
    assert_eq!(server.state.requests_to("POST", "/api/v1/boats").len(), 1);
    assert_eq!(server.state.token_fetches(), 2);
    assert!(!client.token_store().has_token());
}

#[tokio::test]
async fn test_retry_replays_body_and_extra_headers() {
    let server = spawn_mock_server().await;
    server.state.reject_next_mutations(1);
    let (client, _) = client_for(&server);

    let mut headers = HeaderMap::new();
    headers.insert("x-request-source", "integration-test".parse().unwrap());
    let response: Value = client
        .pipeline()
        .request(
            "/api/test/echo",
            Method::POST,
            Some(&json!({ "hello": "world" })),
            Some(headers),
        )
        .await
        .unwrap();

    assert_eq!(response, json!({ "received": { "hello": "world" } }));
    let echoes = server.state.requests_to("POST", "/api/test/echo");
    assert_eq!(echoes.len(), 2);
    for echo in &echoes {
        assert_eq!(
            echo.headers
                .get("x-request-source")
                .and_then(|v| v.to_str().ok()),
            Some("integration-test")
        );
    }
    assert_eq!(echoes[0].csrf_token.as_deref(), Some("token-1"));
    assert_eq!(echoes[1].csrf_token.as_deref(), Some("token-2"));
}

#[tokio::test]
async fn test_plain_forbidden_is_not_retried() {
    let server = spawn_mock_server().await;
    let (client, _) = client_for(&server);

    let result: Result<Value, ApiError> = client
        .pipeline()
        .post("/api/test/forbidden", &json!({}))
        .await;

    assert_eq!(result, Err(ApiError::Forbidden("Access denied".to_string())));
    assert_eq!(server.state.requests_to("POST", "/api/test/forbidden").len(), 1);
    assert_eq!(server.state.token_fetches(), 1);
}

#[tokio::test]
async fn test_unauthorized_signs_out_and_redirects_without_refresh() {
    // Given a signed-in client on the boats page
    let server = spawn_mock_server().await;
    server.state.set_require_auth(true);
    let (client, navigator) = client_for(&server);
    login(&client).await;
    let fetches_before = server.state.token_fetches();

    // When the server session expires and the list is read
    server.state.expire_sessions();
    let result = client.boats().list(&Pageable::default()).await;

    // Then the call fails with AuthRequired and the session is signed out
    assert_eq!(result, Err(ApiError::AuthRequired));
    assert!(!client.session().is_authenticated());
    assert!(client.session().snapshot().user.is_none());

    // And the user is sent to the entry page
    assert_eq!(navigator.redirects(), vec!["/".to_string()]);

    // And nothing was refreshed or retried
    assert_eq!(server.state.token_fetches(), fetches_before);
    assert_eq!(server.state.requests_to("GET", "/api/v1/boats").len(), 1);
}

#[tokio::test]
async fn test_unauthorized_on_entry_page_does_not_redirect() {
    let server = spawn_mock_server().await;
    server.state.set_require_auth(true);
    let (client, navigator) = client_at(&server, "/");

    let result = client.boats().list(&Pageable::default()).await;

    assert_eq!(result, Err(ApiError::AuthRequired));
    assert!(navigator.redirects().is_empty());
}

#[tokio::test]
async fn test_no_content_response_is_empty_success() {
    let server = spawn_mock_server().await;
    let first = server.state.insert_boat("Orca", "YACHT");
    let second = server.state.insert_boat("Narwhal", "OTHER");
    let (client, _) = client_for(&server);

    client.boats().delete(first).await.unwrap();
    let raw: Value = client
        .pipeline()
        .delete(&format!("/api/v1/boats/{second}"))
        .await
        .unwrap();

    assert_eq!(raw, Value::Null);
    assert!(server.state.boat(first).is_none());
    assert!(server.state.boat(second).is_none());
}

#[tokio::test]
async fn test_structured_error_message_is_surfaced() {
    let server = spawn_mock_server().await;
    let (client, _) = client_for(&server);

    let result = client.boats().get(99).await;

    assert_eq!(
        result,
        Err(ApiError::RequestFailed {
            status: 404,
            message: "Boat not found with id: 99".to_string(),
        })
    );
}

#[tokio::test]
async fn test_unstructured_error_uses_status_line() {
    let server = spawn_mock_server().await;
    let (client, _) = client_for(&server);

    let result: Result<Value, ApiError> = client.pipeline().get("/api/test/status/500").await;

    let err = result.unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(
        err,
        ApiError::RequestFailed {
            status: 500,
            message: "HTTP 500: Internal Server Error".to_string(),
        }
    );
}

#[tokio::test]
async fn test_token_endpoint_failure_aborts_mutation() {
    // Given a token endpoint that answers 500
    let server = spawn_mock_server().await;
    server.state.set_token_status(500);
    let (client, _) = client_for(&server);

    // When a boat is created
    let result = client.boats().create(&orca()).await;

    // Then the call fails before anything is posted
    assert!(matches!(result, Err(ApiError::Protocol(_))));
    assert!(server.state.requests_to("POST", "/api/v1/boats").is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    let config = ClientConfig::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2));
    let client = BoatHubClient::new(config).unwrap();

    let err = client
        .boats()
        .list(&Pageable::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.status(), 0);
}
