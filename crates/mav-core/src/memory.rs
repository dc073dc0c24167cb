//! In-memory implementations of the ports, for tests and local runs without a
//! backend.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, Position, RegisteredChat, UserId},
    errors::Error,
    messaging::port::MessagingPort,
    store::{ChatRegistry, PositionStore},
    Result,
};

#[derive(Default)]
pub struct MemoryStore {
    positions: Mutex<HashMap<UserId, Position>>,
    chats: Mutex<HashMap<ChatId, RegisteredChat>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_position(&self, user_id: impl Into<String>, position: Position) {
        self.positions
            .lock()
            .await
            .insert(UserId(user_id.into()), position);
    }

    /// Make every subsequent call fail as if the backend were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn chats(&self) -> Vec<RegisteredChat> {
        let mut out: Vec<_> = self.chats.lock().await.values().cloned().collect();
        out.sort_by_key(|c| c.chat_id.0);
        out
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Backend("memory store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn position_for(&self, user_id: &UserId) -> Result<Option<Position>> {
        self.check()?;
        Ok(self.positions.lock().await.get(user_id).cloned())
    }
}

#[async_trait]
impl ChatRegistry for MemoryStore {
    async fn register(&self, chat_id: ChatId, title: Option<&str>) -> Result<()> {
        self.check()?;
        let mut chats = self.chats.lock().await;
        let entry = chats.entry(chat_id).or_insert_with(|| RegisteredChat {
            chat_id,
            chat_title: None,
            is_active: true,
            registered_at: Utc::now(),
        });
        entry.chat_title = title.map(str::to_string);
        entry.is_active = true;
        Ok(())
    }

    async fn unregister(&self, chat_id: ChatId) -> Result<()> {
        self.check()?;
        if let Some(chat) = self.chats.lock().await.get_mut(&chat_id) {
            chat.is_active = false;
        }
        Ok(())
    }

    async fn get(&self, chat_id: ChatId) -> Result<Option<RegisteredChat>> {
        self.check()?;
        Ok(self.chats.lock().await.get(&chat_id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<RegisteredChat>> {
        self.check()?;
        Ok(self
            .chats()
            .await
            .into_iter()
            .filter(|c| c.is_active)
            .collect())
    }
}

/// Messenger that records what would have been sent.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChatId, String)>>,
    failing: AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_markdown(&self, chat_id: ChatId, text: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::External("recording messenger set to fail".to_string()));
        }
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }
}
