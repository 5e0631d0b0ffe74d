//! Session-level behaviour driven through a scripted gateway.

use std::collections::VecDeque;
use std::sync::Mutex;

use llmchat::{
    ApiMessage, ChatSession, Clock, CompletionGateway, CompletionRequest, Error, Role,
    SessionConfig,
};

/// Replays canned outcomes and records every request it sees.
struct Scripted {
    outcomes: Mutex<VecDeque<llmchat::Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl Scripted {
    fn new(outcomes: impl IntoIterator<Item = llmchat::Result<String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn replying(n: usize) -> Self {
        Self::new((0..n).map(|i| Ok(format!("reply {i}"))))
    }
}

#[async_trait::async_trait]
impl CompletionGateway for Scripted {
    async fn complete(&self, request: &CompletionRequest) -> llmchat::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::unknown("script exhausted")))
    }
}

fn session(gateway: Scripted) -> ChatSession<Scripted> {
    ChatSession::with_clock(gateway, SessionConfig::new("gpt-4", "sk-valid"), Clock::utc())
}

#[tokio::test]
async fn successful_exchanges_alternate_starting_with_user() {
    let mut session = session(Scripted::replying(5));
    for i in 0..5 {
        session.send(&format!("message {i}")).await.unwrap();
    }
    assert_eq!(session.message_count(), 10);
    for (index, message) in session.transcript().iter().enumerate() {
        let expected = if index % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        };
        assert_eq!(message.role, expected);
    }
}

#[tokio::test]
async fn clear_resets_regardless_of_length() {
    let mut session = session(Scripted::replying(4));
    for _ in 0..3 {
        session.send("hi").await.unwrap();
    }
    session.clear();
    assert_eq!(session.message_count(), 0);
    session.clear();
    assert_eq!(session.message_count(), 0);

    // The next exchange starts a fresh history.
    session.send("again").await.unwrap();
    assert_eq!(session.message_count(), 2);
    let requests = session.gateway().requests.lock().unwrap();
    assert_eq!(requests.last().unwrap().messages, vec![ApiMessage::user("again")]);
}

#[tokio::test]
async fn outbound_payload_is_the_whole_history_without_timestamps() {
    let mut session = session(Scripted::replying(2));
    session.send("first").await.unwrap();
    session.send("second").await.unwrap();

    let requests = session.gateway().requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages, vec![ApiMessage::user("first")]);
    assert_eq!(
        requests[1].messages,
        vec![
            ApiMessage::user("first"),
            ApiMessage::assistant("reply 0"),
            ApiMessage::user("second"),
        ]
    );
    for request in requests.iter() {
        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.api_key, "sk-valid");
        let json = serde_json::to_value(&request.messages).unwrap();
        for message in json.as_array().unwrap() {
            assert!(message.get("timestamp").is_none());
        }
    }

    let api: Vec<ApiMessage> = session.transcript().to_api_form().collect();
    assert_eq!(api.len(), session.message_count());
}

#[tokio::test]
async fn gateway_failure_is_recorded_as_assistant_text() {
    let mut session = session(Scripted::new([
        Err(Error::authentication("invalid api key")),
        Ok("recovered".to_string()),
    ]));

    let exchange = session.send("Hello").await.unwrap();
    assert!(exchange.reply.is_error());
    assert_eq!(session.message_count(), 2);
    let last = session.transcript().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.starts_with("Error: "));
    assert_eq!(last.content, "Error: Authentication error: invalid api key");

    // The next exchange is unaffected and still sees the error text as history.
    let exchange = session.send("try again").await.unwrap();
    assert_eq!(exchange.assistant.content, "recovered");
    assert_eq!(session.message_count(), 4);
    let stats = session.stats();
    assert_eq!(stats.exchanges, 2);
    assert_eq!(stats.failed_exchanges, 1);
}

#[tokio::test]
async fn config_gate_blocks_without_touching_state() {
    let gateway = Scripted::replying(1);
    let mut session =
        ChatSession::with_clock(gateway, SessionConfig::new("", "nonempty"), Clock::utc());
    assert!(!session.gate().is_open());
    assert!(session.send("Hello").await.unwrap_err().is_validation());
    assert_eq!(session.message_count(), 0);
    assert!(session.gateway().requests.lock().unwrap().is_empty());

    session.set_model("gpt-4");
    assert!(session.gate().is_open());
    session.send("Hello").await.unwrap();
    assert_eq!(session.message_count(), 2);
}

#[tokio::test]
async fn whitespace_credentials_pass_the_gate() {
    let mut session = ChatSession::with_clock(
        Scripted::replying(1),
        SessionConfig::new(" ", " "),
        Clock::utc(),
    );
    assert!(session.gate().is_open());
    session.send("Hello").await.unwrap();
    assert_eq!(session.message_count(), 2);
}

#[tokio::test]
async fn hello_scenario() {
    let mut session = session(Scripted::new([Ok("Hi there!".to_string())]));
    let exchange = session.send("Hello").await.unwrap();
    assert!(exchange.user.timestamp <= exchange.assistant.timestamp);

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Hi there!");
    for message in messages {
        let parts: Vec<&str> = message.timestamp.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.len() == 2 && p.parse::<u8>().is_ok()));
    }
    // Fixed-width HH:MM:SS orders chronologically as text.
    assert!(messages[1].timestamp >= messages[0].timestamp);
}
