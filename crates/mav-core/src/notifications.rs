//! Deal notifications broadcast to registered chats.

use serde::Deserialize;

use crate::formatting::{escape_markdown, format_currency};

/// A newly posted deal, as submitted by the dashboard.
#[derive(Clone, Debug, Deserialize)]
pub struct DealNotification {
    pub agent_name: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub annual_premium: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
}

impl DealNotification {
    /// Render as Telegram legacy Markdown. User-provided text is escaped.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("🎉 *New deal posted!*\n\n");
        out.push_str(&format!(
            "*Agent:* {}\n",
            escape_markdown(self.agent_name.trim())
        ));

        let field = |label: &str, value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| format!("*{label}:* {}\n", escape_markdown(s)))
                .unwrap_or_default()
        };
        out.push_str(&field("Carrier", &self.carrier));
        out.push_str(&field("Product", &self.product));

        if let Some(premium) = self.annual_premium {
            out.push_str(&format!("*Annual premium:* {}\n", format_currency(premium)));
        }

        if let Some(note) = self.note.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            out.push('\n');
            out.push_str(&escape_markdown(note));
            out.push('\n');
        }

        out.trim_end().to_string()
    }
}

/// Result of sending one notification to every active chat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}
