use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use crate::{errors::Error, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_NOTIFY_POSITIONS: &str = "owner,admin,manager";
const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Typed configuration, read from the environment (and `.env` if present).
#[derive(Clone)]
pub struct Config {
    // Backend (Supabase)
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub backend_timeout: Duration,

    // Auth
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,

    // Telegram
    pub telegram_bot_token: String,
    pub telegram_webhook_url: Option<String>,
    pub telegram_webhook_secret: Option<String>,

    // HTTP
    pub bind_addr: SocketAddr,
    pub notify_allowed_positions: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            var(key)
                .and_then(non_empty)
                .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
        };

        let supabase_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let supabase_service_key = required("SUPABASE_SERVICE_ROLE_KEY")?;
        let jwt_secret = required("SUPABASE_JWT_SECRET")?;
        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;

        let jwt_audience = var("JWT_AUDIENCE").and_then(non_empty);
        let telegram_webhook_url = var("TELEGRAM_WEBHOOK_URL").and_then(non_empty);
        let telegram_webhook_secret = var("TELEGRAM_WEBHOOK_SECRET").and_then(non_empty);

        let bind_raw = var("BIND_ADDR")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("invalid BIND_ADDR {bind_raw:?}: {e}")))?;

        let notify_allowed_positions = parse_csv_lower(
            var("NOTIFY_ALLOWED_POSITIONS").or_else(|| Some(DEFAULT_NOTIFY_POSITIONS.to_string())),
        );

        let backend_timeout = match var("BACKEND_TIMEOUT_MS").and_then(non_empty) {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_millis).map_err(|e| {
                Error::Config(format!("invalid BACKEND_TIMEOUT_MS {raw:?}: {e}"))
            })?,
            None => DEFAULT_BACKEND_TIMEOUT,
        };

        Ok(Self {
            supabase_url,
            supabase_service_key,
            backend_timeout,
            jwt_secret,
            jwt_audience,
            telegram_bot_token,
            telegram_webhook_url,
            telegram_webhook_secret,
            bind_addr,
            notify_allowed_positions,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("backend_timeout", &self.backend_timeout)
            .field("jwt_audience", &self.jwt_audience)
            .field("telegram_webhook_url", &self.telegram_webhook_url)
            .field("bind_addr", &self.bind_addr)
            .field("notify_allowed_positions", &self.notify_allowed_positions)
            .finish_non_exhaustive()
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_csv_lower(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
