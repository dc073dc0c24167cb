use std::sync::Arc;

use mav_core::{
    authz::AllowList,
    messaging::port::MessagingPort,
    store::{ChatRegistry, PositionStore},
    webhook::WebhookDispatcher,
};

use crate::middleware::auth::TokenVerifier;

/// Shared, immutable handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub positions: Arc<dyn PositionStore>,
    pub chats: Arc<dyn ChatRegistry>,
    pub messenger: Arc<dyn MessagingPort>,
    pub dispatcher: WebhookDispatcher,
    pub verifier: Arc<TokenVerifier>,
    pub notify_allowed: AllowList,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        positions: Arc<dyn PositionStore>,
        chats: Arc<dyn ChatRegistry>,
        messenger: Arc<dyn MessagingPort>,
        verifier: TokenVerifier,
    ) -> Self {
        let dispatcher = WebhookDispatcher::new(chats.clone(), messenger.clone());
        Self {
            positions,
            chats,
            messenger,
            dispatcher,
            verifier: Arc::new(verifier),
            notify_allowed: AllowList::default(),
            webhook_secret: None,
        }
    }

    pub fn with_notify_allowed(mut self, allowed: AllowList) -> Self {
        self.notify_allowed = allowed;
        self
    }

    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret.map(Arc::from);
        self
    }
}
