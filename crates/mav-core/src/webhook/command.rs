use super::types::{Chat, MemberStatus, Update};

/// Text commands the bot reacts to. Everything else is `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Help,
    Status,
    Unknown,
}

impl Command {
    /// Classify message text by its first token.
    ///
    /// Telegram may send `/cmd@botname arg1 ...`; the bot suffix is dropped and
    /// the name compared exactly, so `/startup` is not `/start`.
    pub fn parse(text: &str) -> Self {
        let first = text.split_whitespace().next().unwrap_or("");
        let Some(name) = first.strip_prefix('/') else {
            return Self::Unknown;
        };
        let name = name.split('@').next().unwrap_or("").to_lowercase();

        match name.as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "help" => Self::Help,
            "status" => Self::Status,
            _ => Self::Unknown,
        }
    }
}

/// What an inbound update asks the dispatcher to do.
#[derive(Clone, Debug)]
pub enum UpdateKind<'a> {
    Command { chat: &'a Chat, command: Command },
    BotAdded(&'a Chat),
    BotRemoved(&'a Chat),
    Ignored,
}

impl Update {
    pub fn classify(&self) -> UpdateKind<'_> {
        if let Some(msg) = &self.message {
            return match msg.text.as_deref() {
                Some(text) => UpdateKind::Command {
                    chat: &msg.chat,
                    command: Command::parse(text),
                },
                None => UpdateKind::Ignored,
            };
        }

        if let Some(change) = &self.my_chat_member {
            let old = change.old_chat_member.status;
            let new = change.new_chat_member.status;
            return classify_membership(old, new, &change.chat);
        }

        UpdateKind::Ignored
    }
}

fn classify_membership(old: MemberStatus, new: MemberStatus, chat: &Chat) -> UpdateKind<'_> {
    if old.is_gone() && new.is_present() {
        UpdateKind::BotAdded(chat)
    } else if old.is_present() && new.is_gone() {
        UpdateKind::BotRemoved(chat)
    } else {
        UpdateKind::Ignored
    }
}
