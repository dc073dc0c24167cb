//! Subset of the Telegram Bot API update payload the dispatcher understands.
//!
//! Unknown fields are ignored so new Bot API additions never break parsing.

use serde::Deserialize;

use crate::domain::ChatId;

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub my_chat_member: Option<ChatMemberUpdated>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl Chat {
    pub fn chat_id(&self) -> ChatId {
        ChatId(self.id)
    }

    /// Group title, else `@username`, else the private chat's first name.
    pub fn display_title(&self) -> Option<String> {
        if let Some(title) = self.title.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(title.to_string());
        }
        if let Some(username) = self.username.as_deref().filter(|s| !s.trim().is_empty()) {
            return Some(format!("@{username}"));
        }
        self.first_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub old_chat_member: ChatMember,
    pub new_chat_member: ChatMember,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatMember {
    pub status: MemberStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
    #[serde(other)]
    Other,
}

impl MemberStatus {
    pub fn is_present(self) -> bool {
        matches!(self, Self::Member | Self::Administrator)
    }

    pub fn is_gone(self) -> bool {
        matches!(self, Self::Left | Self::Kicked)
    }
}
