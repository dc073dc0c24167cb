//! Supabase adapter (PostgREST over HTTP).
//!
//! Implements the `mav-core` store ports against the agency's Supabase
//! project using the service-role key. Table layout is owned by the backend:
//! `user_positions` (with an embedded `positions` relation) and
//! `telegram_chats`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderValue, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use mav_core::{
    domain::{ChatId, Position, RegisteredChat, UserId},
    errors::Error,
    store::{ChatRegistry, PositionStore},
    Result,
};

const USER_POSITIONS: &str = "user_positions";
const TELEGRAM_CHATS: &str = "telegram_chats";

#[derive(Clone, Debug)]
pub struct SupabaseClient {
    base_url: Url,
    service_key: String,
    http: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(base_url: &str, service_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid SUPABASE_URL {base_url:?}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("supabase http client build failed: {e}")))?;
        Ok(Self {
            base_url,
            service_key: service_key.into(),
            http,
        })
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| Error::Config(format!("invalid supabase table url: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| Error::Backend(format!("supabase {what} request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "supabase {what} failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(resp)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(%url, "supabase select");
        let resp = self.send(self.request(Method::GET, url), what).await?;
        resp.json::<T>()
            .await
            .map_err(|e| Error::Backend(format!("supabase {what} json error: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct PositionRow {
    #[serde(default)]
    positions: Option<Position>,
}

fn first_position(rows: Vec<PositionRow>) -> Option<Position> {
    rows.into_iter().find_map(|r| r.positions)
}

fn eq(v: impl std::fmt::Display) -> String {
    format!("eq.{v}")
}

#[async_trait]
impl PositionStore for SupabaseClient {
    async fn position_for(&self, user_id: &UserId) -> Result<Option<Position>> {
        let url = self.table_url(
            USER_POSITIONS,
            &[
                ("user_id", eq(user_id)),
                ("select", "positions(name,level)".to_string()),
                ("limit", "1".to_string()),
            ],
        )?;
        let rows: Vec<PositionRow> = self.fetch(url, "position lookup").await?;
        Ok(first_position(rows))
    }
}

#[async_trait]
impl ChatRegistry for SupabaseClient {
    async fn register(&self, chat_id: ChatId, title: Option<&str>) -> Result<()> {
        let url = self.table_url(TELEGRAM_CHATS, &[("on_conflict", "chat_id".to_string())])?;
        // `registered_at` is left to the column default so re-registration keeps it.
        let body = serde_json::json!({
            "chat_id": chat_id.0,
            "chat_title": title,
            "is_active": true,
        });
        let req = self
            .request(Method::POST, url)
            .header(
                "Prefer",
                HeaderValue::from_static("resolution=merge-duplicates,return=minimal"),
            )
            .json(&body);
        self.send(req, "chat upsert").await?;
        Ok(())
    }

    async fn unregister(&self, chat_id: ChatId) -> Result<()> {
        let url = self.table_url(TELEGRAM_CHATS, &[("chat_id", eq(chat_id.0))])?;
        let req = self
            .request(Method::PATCH, url)
            .header("Prefer", HeaderValue::from_static("return=minimal"))
            .json(&serde_json::json!({ "is_active": false }));
        self.send(req, "chat deactivate").await?;
        Ok(())
    }

    async fn get(&self, chat_id: ChatId) -> Result<Option<RegisteredChat>> {
        let url = self.table_url(
            TELEGRAM_CHATS,
            &[
                ("chat_id", eq(chat_id.0)),
                ("select", "*".to_string()),
                ("limit", "1".to_string()),
            ],
        )?;
        let rows: Vec<RegisteredChat> = self.fetch(url, "chat lookup").await?;
        Ok(rows.into_iter().next())
    }

    async fn list_active(&self) -> Result<Vec<RegisteredChat>> {
        let url = self.table_url(
            TELEGRAM_CHATS,
            &[
                ("is_active", eq(true)),
                ("select", "*".to_string()),
                ("order", "registered_at.asc".to_string()),
            ],
        )?;
        self.fetch(url, "active chats").await
    }
}
