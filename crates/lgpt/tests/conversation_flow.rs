//! End-to-end exchanges against a local chat completions endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use tempfile::TempDir;

use lgpt::conversation::{ConversationStore, FAILURE_NOTICE, Sender, StoreError, SubmitOutcome};
use lgpt::llm::{OpenAICompatibleProvider, ProviderConfig, Vendor};
use lgpt::settings::{FileSettingsStore, SettingsStore};

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    body: &'static str,
    hits: Arc<AtomicUsize>,
}

async fn completions(State(upstream): State<Upstream>) -> (StatusCode, &'static str) {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    (upstream.status, upstream.body)
}

/// Start a mock endpoint and return its URL plus a request counter.
async fn start_upstream(status: StatusCode, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(Upstream {
            status,
            body,
            hits: hits.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1/chat/completions"), hits)
}

fn provider(vendor: Vendor, url: &str) -> Arc<OpenAICompatibleProvider> {
    Arc::new(
        OpenAICompatibleProvider::new(Duration::from_secs(5))
            .unwrap()
            .with_endpoint(vendor, url),
    )
}

#[tokio::test]
async fn openai_answers_arithmetic_question() {
    let (url, hits) = start_upstream(
        StatusCode::OK,
        r#"{"choices":[{"message":{"role":"assistant","content":"4"}}]}"#,
    )
    .await;
    let store = ConversationStore::new(
        provider(Vendor::OpenAI, &url),
        ProviderConfig::new(Vendor::OpenAI, Some("sk-valid".to_string())),
    );

    let outcome = store.submit("2+2?").await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Replied { ref reply, .. } if reply == "4"));
    let messages = store.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "2+2?");
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert_eq!(messages[1].text, "4");
    assert!(!messages[1].pending);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_key_keeps_placeholder_with_notice() {
    let (url, hits) = start_upstream(StatusCode::UNAUTHORIZED, r#"{"error":"invalid key"}"#).await;
    let store = ConversationStore::new(
        provider(Vendor::Groq, &url),
        ProviderConfig::new(Vendor::Groq, Some("gsk-revoked".to_string())),
    );

    let outcome = store.submit("hello").await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    let messages = store.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].text, FAILURE_NOTICE);
    assert!(!messages[1].pending);
    let error = store.last_error().await.unwrap();
    assert!(error.contains("Unauthorized"), "got {error}");
    assert!(!store.is_busy().await);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn settings_survive_restart_and_gate_sending() {
    let (url, hits) = start_upstream(
        StatusCode::OK,
        r#"{"choices":[{"message":{"content":"pong"}}]}"#,
    )
    .await;
    let tmp = TempDir::new().unwrap();
    let settings_path = tmp.path().join("settings.yaml");

    let first = ConversationStore::from_settings(
        provider(Vendor::Groq, &url),
        Arc::new(FileSettingsStore::new(&settings_path)),
        |_| None,
    )
    .await
    .unwrap();

    let err = first.submit("ping").await.unwrap_err();
    assert!(matches!(err, StoreError::Configuration(_)));
    assert!(first.messages().await.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    first.configure(Vendor::Groq, "gsk-saved").await.unwrap();

    let saved = FileSettingsStore::new(&settings_path).load().await.unwrap();
    assert_eq!(saved.credential(), Some("gsk-saved"));

    let second = ConversationStore::from_settings(
        provider(Vendor::Groq, &url),
        Arc::new(FileSettingsStore::new(&settings_path)),
        |_| None,
    )
    .await
    .unwrap();
    assert_eq!(
        second.config().await,
        ProviderConfig::new(Vendor::Groq, Some("gsk-saved".to_string()))
    );

    second.submit("ping").await.unwrap();
    assert_eq!(second.messages().await[1].text, "pong");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreadable_settings_can_be_overwritten() {
    let (url, _) = start_upstream(StatusCode::OK, r#"{"choices":[]}"#).await;
    let tmp = TempDir::new().unwrap();
    let settings_path = tmp.path().join("settings.yaml");
    std::fs::write(&settings_path, "vendor: anthropic\ncredential: old\n").unwrap();

    let store = ConversationStore::from_settings(
        provider(Vendor::OpenAI, &url),
        Arc::new(FileSettingsStore::new(&settings_path)),
        |_| None,
    )
    .await
    .unwrap();
    assert_eq!(store.config().await, ProviderConfig::default());

    store.configure(Vendor::OpenAI, "sk-fixed").await.unwrap();

    let saved = FileSettingsStore::new(&settings_path).load().await.unwrap();
    assert_eq!(
        saved,
        ProviderConfig::new(Vendor::OpenAI, Some("sk-fixed".to_string()))
    );
}
