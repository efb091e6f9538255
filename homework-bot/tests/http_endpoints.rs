//! Status client and Telegram notifier against local HTTP servers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use url::Url;

use homework_bot::client::{StatusClient, StatusSource};
use homework_bot::domain::Cursor;
use homework_bot::error::{DeliveryError, FetchError};
use homework_bot::notifier::{Notifier, TelegramConfig, TelegramNotifier};
use homework_bot::utils::http_client::build_client;

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(timeout: Duration) -> reqwest::Client {
    build_client(timeout).expect("Failed to build client")
}

mod status_api {
    use super::*;

    const TOKEN: &str = "good-token";

    async fn statuses(
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("OAuth {TOKEN}"));
        if !authorized {
            return (StatusCode::UNAUTHORIZED, Json(json!({"code": "not_authenticated"})))
                .into_response();
        }

        let from_date = params.get("from_date").cloned().unwrap_or_default();
        Json(json!({
            "homeworks": [{
                "status": "approved",
                "homework_name": "hw1",
                "date_updated": "2024-01-01T10:00:00Z",
            }],
            "current_date": 1700000100,
            "echo_from_date": from_date,
        }))
        .into_response()
    }

    async fn app() -> SocketAddr {
        let router = Router::new()
            .route("/api/", get(statuses))
            .route("/forbidden/", get(|| async { StatusCode::FORBIDDEN }))
            .route(
                "/broken/",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
            )
            .route("/html/", get(|| async { "<html>maintenance</html>" }))
            .route(
                "/slow/",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Json(json!({}))
                }),
            );
        spawn_server(router).await
    }

    fn status_client(addr: SocketAddr, path: &str, token: &str) -> StatusClient {
        let endpoint = Url::parse(&format!("http://{addr}{path}")).unwrap();
        StatusClient::new(client(Duration::from_secs(5)), endpoint, token)
    }

    #[tokio::test]
    async fn returns_decoded_body_and_sends_cursor() {
        let addr = app().await;
        let client = status_client(addr, "/api/", TOKEN);

        let body = client
            .fetch(&Cursor::from_value(&json!(1699999999)).unwrap())
            .await
            .unwrap();

        assert_eq!(body["current_date"], json!(1700000100));
        assert_eq!(body["echo_from_date"], json!("1699999999"));
        assert_eq!(body["homeworks"][0]["homework_name"], json!("hw1"));
    }

    #[tokio::test]
    async fn wrong_token_is_auth_invalid() {
        let addr = app().await;
        let client = status_client(addr, "/api/", "bad-token");

        let err = client.fetch(&Cursor::epoch()).await.unwrap_err();
        assert_eq!(err, FetchError::AuthInvalid { status: 401 });
    }

    #[tokio::test]
    async fn forbidden_is_auth_invalid() {
        let addr = app().await;
        let client = status_client(addr, "/forbidden/", TOKEN);

        let err = client.fetch(&Cursor::epoch()).await.unwrap_err();
        assert_eq!(err, FetchError::AuthInvalid { status: 403 });
    }

    #[tokio::test]
    async fn server_error_is_service_unavailable() {
        let addr = app().await;
        let client = status_client(addr, "/broken/", TOKEN);

        let err = client.fetch(&Cursor::epoch()).await.unwrap_err();
        assert_eq!(err, FetchError::ServiceUnavailable { code: 500 });
    }

    #[tokio::test]
    async fn unknown_path_is_service_unavailable() {
        let addr = app().await;
        let client = status_client(addr, "/missing/", TOKEN);

        let err = client.fetch(&Cursor::epoch()).await.unwrap_err();
        assert_eq!(err, FetchError::ServiceUnavailable { code: 404 });
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let addr = app().await;
        let client = status_client(addr, "/html/", TOKEN);

        let err = client.fetch(&Cursor::epoch()).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let addr = app().await;
        let endpoint = Url::parse(&format!("http://{addr}/slow/")).unwrap();
        let client = StatusClient::new(client(Duration::from_millis(200)), endpoint, TOKEN);

        let err = client.fetch(&Cursor::epoch()).await.unwrap_err();
        assert!(
            matches!(&err, FetchError::Transport(msg) if msg.starts_with("timed out")),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = status_client(addr, "/api/", TOKEN);
        let err = client.fetch(&Cursor::epoch()).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    }
}

mod telegram {
    use super::*;

    const BOT_TOKEN: &str = "test-token";

    #[derive(Clone, Default)]
    struct Recorder {
        bodies: Arc<Mutex<Vec<Value>>>,
        calls: Arc<AtomicUsize>,
        rate_limited_calls: usize,
        reject: bool,
    }

    async fn send_message(State(state): State<Recorder>, Json(body): Json<Value>) -> Response {
        let call = state.calls.fetch_add(1, Ordering::SeqCst);
        if state.reject {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "description": "Bad Request: chat not found"})),
            )
                .into_response();
        }
        if call < state.rate_limited_calls {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"ok": false, "parameters": {"retry_after": 0}})),
            )
                .into_response();
        }
        state.bodies.lock().unwrap().push(body);
        Json(json!({"ok": true})).into_response()
    }

    async fn notifier(state: Recorder) -> TelegramNotifier {
        let router = Router::new()
            .route(&format!("/bot{BOT_TOKEN}/sendMessage"), post(send_message))
            .with_state(state);
        let addr = spawn_server(router).await;

        TelegramNotifier::new(
            TelegramConfig {
                api_base: format!("http://{addr}"),
                bot_token: BOT_TOKEN.to_string(),
                chat_id: "42".to_string(),
            },
            client(Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn delivers_text_to_chat() {
        let state = Recorder::default();
        let notifier = notifier(state.clone()).await;

        notifier.deliver("status changed for hw1: ok").await.unwrap();

        let bodies = state.bodies.lock().unwrap().clone();
        assert_eq!(
            bodies,
            vec![json!({"chat_id": "42", "text": "status changed for hw1: ok"})]
        );
    }

    #[tokio::test]
    async fn retries_after_rate_limit() {
        let state = Recorder {
            rate_limited_calls: 1,
            ..Default::default()
        };
        let notifier = notifier(state.clone()).await;

        notifier.deliver("hello").await.unwrap();

        assert_eq!(state.calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.bodies.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_repeated_rate_limits() {
        let state = Recorder {
            rate_limited_calls: usize::MAX,
            ..Default::default()
        };
        let notifier = notifier(state.clone()).await;

        let err = notifier.deliver("hello").await.unwrap_err();

        assert_eq!(err, DeliveryError::RateLimited { retries: 3 });
        assert_eq!(state.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejected_message_is_channel_failure() {
        let state = Recorder {
            reject: true,
            ..Default::default()
        };
        let notifier = notifier(state.clone()).await;

        let err = notifier.deliver("hello").await.unwrap_err();

        match err {
            DeliveryError::ChannelFailure(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("chat not found"));
            }
            other => panic!("expected ChannelFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_channel_is_channel_failure_without_token() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = TelegramNotifier::new(
            TelegramConfig {
                api_base: format!("http://{addr}"),
                bot_token: "secret-bot-token".to_string(),
                chat_id: "42".to_string(),
            },
            client(Duration::from_secs(2)),
        );

        let err = notifier.deliver("hello").await.unwrap_err();
        assert!(matches!(&err, DeliveryError::ChannelFailure(_)));
        assert!(!err.to_string().contains("secret-bot-token"));
    }
}
