mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use futures::StreamExt;
use parley::auth::UserId;
use parley::chat::ChatSession;
use parley::llm::{Message, Role};
use parley::store::{ConversationStore, FileConversationStore};
use serde_json::json;
use tempfile::TempDir;

use common::{ANTHROPIC_PATH, MockServer, OPENAI_PATH, credentials};

async fn both_providers() -> MockServer {
    MockServer::start(vec![
        (
            OPENAI_PATH,
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "from openai"}}]})
                .to_string(),
        ),
        (
            ANTHROPIC_PATH,
            StatusCode::OK,
            json!({"content": [{"type": "text", "text": "from anthropic"}]}).to_string(),
        ),
    ])
    .await
}

fn alice() -> UserId {
    UserId::parse("alice").unwrap()
}

#[tokio::test]
async fn persisted_transcript_reloads_identically() {
    let server = both_providers().await;
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FileConversationStore::new(tmp.path()));

    let mut session = ChatSession::new(server.adapter(credentials()), store, alice(), "chatgpt");
    session.send("Hello").await.unwrap();
    session.send("And again").await.unwrap();
    let id = *session.conversation_id().unwrap();

    // A fresh store over the same directory sees the same transcript.
    let reopened = FileConversationStore::new(tmp.path());
    let record = reopened.load(&alice(), &id).await.unwrap().unwrap();

    assert_eq!(record.messages, session.transcript());
    assert_eq!(
        record
            .messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect::<Vec<_>>(),
        vec![
            (Role::User, "Hello"),
            (Role::Assistant, "from openai"),
            (Role::User, "And again"),
            (Role::Assistant, "from openai"),
        ]
    );
    assert_eq!(record.model, "chatgpt");
}

#[tokio::test]
async fn switching_provider_only_affects_later_turns() {
    let server = both_providers().await;
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FileConversationStore::new(tmp.path()));

    let mut session = ChatSession::new(server.adapter(credentials()), store, alice(), "chatgpt");
    session.send("first").await.unwrap();
    let before = session.transcript().to_vec();

    session.set_model("claude");
    assert_eq!(session.transcript(), before.as_slice());

    let reply = session.send("second").await.unwrap();
    assert_eq!(reply.as_str(), "from anthropic");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, OPENAI_PATH);
    assert_eq!(requests[1].path, ANTHROPIC_PATH);

    // The second provider receives the whole prior transcript unchanged.
    assert_eq!(
        requests[1].body["messages"],
        serde_json::to_value(vec![
            Message::user("first"),
            Message::assistant("from openai"),
            Message::user("second"),
        ])
        .unwrap()
    );

    let record = session
        .store()
        .load(&alice(), session.conversation_id().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.model, "claude");
    assert_eq!(record.messages.len(), 4);
}

#[tokio::test]
async fn history_feed_follows_conversation_writes() {
    let server = both_providers().await;
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FileConversationStore::new(tmp.path()));
    let mut feed = store.subscribe(&alice());

    assert!(feed.next().await.unwrap().unwrap().is_empty());

    let mut session = ChatSession::new(
        server.adapter(credentials()),
        store.clone(),
        alice(),
        "deepseek",
    );
    session.send("Hello").await.unwrap();

    let snapshot = tokio::time::timeout(std::time::Duration::from_secs(5), feed.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].title(), "Hello");
    assert_eq!(snapshot[0].model, "deepseek");
}
