use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    domain::ChatId,
    formatting::{display_timestamp, escape_markdown},
    messaging::port::MessagingPort,
    store::ChatRegistry,
};

use super::{
    command::{Command, UpdateKind},
    types::{Chat, Update},
};

pub const RETRY_MESSAGE: &str = "⚠️ Something went wrong. Please try again in a moment.";

pub const REGISTERED_MESSAGE: &str = "✅ This chat is now registered for MyAgentView notifications.\n\n\
You'll receive new deal alerts here. Send /stop to unsubscribe.";

pub const UNREGISTERED_MESSAGE: &str = "🔕 This chat has been unregistered and will no longer receive notifications.\n\n\
Send /start to subscribe again.";

pub const NOT_REGISTERED_MESSAGE: &str =
    "ℹ️ This chat is not registered. Send /start to receive notifications.";

pub const HELP_MESSAGE: &str = "*MyAgentView Bot*\n\n\
/start - Register this chat for deal notifications\n\
/stop - Stop notifications in this chat\n\
/status - Show registration status\n\
/help - Show this message";

/// What the dispatcher did with an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatched {
    Registered,
    Unregistered,
    HelpSent,
    StatusSent,
    /// A user-initiated backend action failed; the chat was asked to retry.
    BackendFailed,
    Greeted,
    BotRemoved,
    Ignored,
}

/// Turns Telegram updates into chat registration side effects and replies.
///
/// Holds no state of its own; the registry is the only source of truth.
#[derive(Clone)]
pub struct WebhookDispatcher {
    chats: Arc<dyn ChatRegistry>,
    messenger: Arc<dyn MessagingPort>,
}

impl WebhookDispatcher {
    pub fn new(chats: Arc<dyn ChatRegistry>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self { chats, messenger }
    }

    pub async fn dispatch(&self, update: &Update) -> Dispatched {
        match update.classify() {
            UpdateKind::Command { chat, command } => self.handle_command(chat, command).await,
            UpdateKind::BotAdded(chat) => {
                info!(chat_id = chat.id, "bot added to chat");
                self.reply(chat.chat_id(), &greeting(chat)).await;
                Dispatched::Greeted
            }
            UpdateKind::BotRemoved(chat) => {
                info!(chat_id = chat.id, "bot removed from chat");
                if let Err(e) = self.chats.unregister(chat.chat_id()).await {
                    warn!(chat_id = chat.id, error = %e, "failed to unregister removed chat");
                }
                Dispatched::BotRemoved
            }
            UpdateKind::Ignored => Dispatched::Ignored,
        }
    }

    async fn handle_command(&self, chat: &Chat, command: Command) -> Dispatched {
        let chat_id = chat.chat_id();
        match command {
            Command::Start => {
                let title = chat.display_title();
                if let Err(e) = self.chats.register(chat_id, title.as_deref()).await {
                    warn!(chat_id = chat.id, error = %e, "chat registration failed");
                    self.reply(chat_id, RETRY_MESSAGE).await;
                    return Dispatched::BackendFailed;
                }
                info!(chat_id = chat.id, "chat registered");
                self.reply(chat_id, REGISTERED_MESSAGE).await;
                Dispatched::Registered
            }
            Command::Stop => {
                if let Err(e) = self.chats.unregister(chat_id).await {
                    warn!(chat_id = chat.id, error = %e, "chat unregistration failed");
                    self.reply(chat_id, RETRY_MESSAGE).await;
                    return Dispatched::BackendFailed;
                }
                info!(chat_id = chat.id, "chat unregistered");
                self.reply(chat_id, UNREGISTERED_MESSAGE).await;
                Dispatched::Unregistered
            }
            Command::Help => {
                self.reply(chat_id, HELP_MESSAGE).await;
                Dispatched::HelpSent
            }
            Command::Status => {
                let text = match self.chats.get(chat_id).await {
                    Ok(Some(row)) => {
                        let state = if row.is_active {
                            "✅ Active"
                        } else {
                            "⏸ Inactive"
                        };
                        format!(
                            "📊 *Notification status*\n\nStatus: {state}\nRegistered: {}",
                            display_timestamp(&row.registered_at)
                        )
                    }
                    Ok(None) => NOT_REGISTERED_MESSAGE.to_string(),
                    Err(e) => {
                        warn!(chat_id = chat.id, error = %e, "chat status lookup failed");
                        self.reply(chat_id, RETRY_MESSAGE).await;
                        return Dispatched::BackendFailed;
                    }
                };
                self.reply(chat_id, &text).await;
                Dispatched::StatusSent
            }
            Command::Unknown => Dispatched::Ignored,
        }
    }

    /// Send a reply; delivery failures are logged and otherwise ignored.
    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.messenger.send_markdown(chat_id, text).await {
            warn!(chat_id = chat_id.0, error = %e, "failed to send chat reply");
        }
    }
}

fn greeting(chat: &Chat) -> String {
    let name = chat
        .title
        .as_deref()
        .map(|t| format!(", {}", escape_markdown(t)))
        .unwrap_or_default();
    format!(
        "👋 Hello{name}! I'm the MyAgentView bot.\n\n\
Send /start to receive deal notifications in this chat, or /help to see all commands."
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::{MemoryStore, RecordingMessenger};

    fn setup() -> (Arc<MemoryStore>, Arc<RecordingMessenger>, WebhookDispatcher) {
        let store = Arc::new(MemoryStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let dispatcher = WebhookDispatcher::new(store.clone(), messenger.clone());
        (store, messenger, dispatcher)
    }

    fn text(chat_id: i64, text: &str) -> Update {
        serde_json::from_value(json!({
            "update_id": 1,
            "message": {
                "text": text,
                "chat": {"id": chat_id, "type": "group", "title": "Sales_Team"}
            }
        }))
        .unwrap()
    }

    fn membership(chat_id: i64, old: &str, new: &str) -> Update {
        serde_json::from_value(json!({
            "update_id": 2,
            "my_chat_member": {
                "chat": {"id": chat_id, "type": "group", "title": "Sales_Team"},
                "old_chat_member": {"status": old},
                "new_chat_member": {"status": new}
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn start_registers_once_and_confirms() {
        let (store, messenger, d) = setup();

        assert_eq!(d.dispatch(&text(12345, "/start")).await, Dispatched::Registered);
        assert_eq!(d.dispatch(&text(12345, "/start")).await, Dispatched::Registered);

        let chats = store.chats().await;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].chat_id, ChatId(12345));
        assert!(chats[0].is_active);
        assert_eq!(chats[0].chat_title.as_deref(), Some("Sales_Team"));

        let sent = messenger.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, ChatId(12345));
        assert!(sent[0].1.contains("registered"));
    }

    #[tokio::test]
    async fn start_backend_failure_asks_to_retry() {
        let (store, messenger, d) = setup();
        store.set_failing(true);

        assert_eq!(
            d.dispatch(&text(1, "/start")).await,
            Dispatched::BackendFailed
        );
        let sent = messenger.sent().await;
        assert_eq!(sent, vec![(ChatId(1), RETRY_MESSAGE.to_string())]);
    }

    #[tokio::test]
    async fn stop_backend_failure_asks_to_retry() {
        let (store, messenger, d) = setup();
        d.dispatch(&text(4, "/start")).await;
        store.set_failing(true);
        let before = messenger.sent().await.len();

        assert_eq!(d.dispatch(&text(4, "/stop")).await, Dispatched::BackendFailed);
        let sent = messenger.sent().await;
        assert_eq!(sent[before..], [(ChatId(4), RETRY_MESSAGE.to_string())]);

        assert!(store.chats().await[0].is_active);
    }

    #[tokio::test]
    async fn status_backend_failure_asks_to_retry() {
        let (store, messenger, d) = setup();
        store.set_failing(true);

        assert_eq!(
            d.dispatch(&text(6, "/status")).await,
            Dispatched::BackendFailed
        );
        let sent = messenger.sent().await;
        assert_eq!(sent, vec![(ChatId(6), RETRY_MESSAGE.to_string())]);
    }

    #[tokio::test]
    async fn stop_marks_inactive() {
        let (store, messenger, d) = setup();
        d.dispatch(&text(9, "/start")).await;
        assert_eq!(d.dispatch(&text(9, "/stop")).await, Dispatched::Unregistered);

        let chats = store.chats().await;
        assert_eq!(chats.len(), 1);
        assert!(!chats[0].is_active);
        let sent = messenger.sent().await;
        assert_eq!(sent.last().unwrap().1, UNREGISTERED_MESSAGE);
    }

    #[tokio::test]
    async fn status_reports_registration() {
        let (_store, messenger, d) = setup();

        d.dispatch(&text(5, "/status")).await;
        d.dispatch(&text(5, "/start")).await;
        d.dispatch(&text(5, "/status")).await;
        d.dispatch(&text(5, "/stop")).await;
        d.dispatch(&text(5, "/status")).await;

        let sent = messenger.sent().await;
        assert_eq!(sent.len(), 5);
        assert!(sent[0].1.contains("not registered"));
        assert!(sent[2].1.contains("Active"));
        assert!(sent[2].1.contains("UTC"));
        assert!(sent[4].1.contains("Inactive"));
    }

    #[tokio::test]
    async fn help_needs_no_backend() {
        let (store, messenger, d) = setup();
        store.set_failing(true);
        assert_eq!(d.dispatch(&text(3, "/help")).await, Dispatched::HelpSent);
        assert_eq!(messenger.sent().await[0].1, HELP_MESSAGE);
    }

    #[tokio::test]
    async fn unknown_text_is_silent() {
        let (store, messenger, d) = setup();
        assert_eq!(d.dispatch(&text(3, "/startup")).await, Dispatched::Ignored);
        assert_eq!(d.dispatch(&text(3, "good morning")).await, Dispatched::Ignored);
        assert!(messenger.sent().await.is_empty());
        assert!(store.chats().await.is_empty());
    }

    #[tokio::test]
    async fn bot_added_greets_without_registering() {
        let (store, messenger, d) = setup();
        assert_eq!(
            d.dispatch(&membership(77, "kicked", "member")).await,
            Dispatched::Greeted
        );
        assert!(store.chats().await.is_empty());
        let sent = messenger.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("Hello, Sales\\_Team"));
    }

    #[tokio::test]
    async fn bot_removed_unregisters_silently() {
        let (store, messenger, d) = setup();
        d.dispatch(&text(77, "/start")).await;
        let before = messenger.sent().await.len();

        assert_eq!(
            d.dispatch(&membership(77, "member", "left")).await,
            Dispatched::BotRemoved
        );
        assert!(!store.chats().await[0].is_active);
        assert_eq!(messenger.sent().await.len(), before);

        // Failures are swallowed too.
        store.set_failing(true);
        assert_eq!(
            d.dispatch(&membership(77, "administrator", "kicked")).await,
            Dispatched::BotRemoved
        );
        assert_eq!(messenger.sent().await.len(), before);
    }

    #[tokio::test]
    async fn send_failures_do_not_change_outcome() {
        let (store, messenger, d) = setup();
        messenger.set_failing(true);
        assert_eq!(d.dispatch(&text(8, "/start")).await, Dispatched::Registered);
        assert_eq!(store.chats().await.len(), 1);
    }
}
