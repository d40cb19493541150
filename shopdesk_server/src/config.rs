//! Server configuration.
//!
//! Everything is read from `SHOPDESK_*` environment variables (see `cli-help.txt`). A `.env` file is loaded by `main`
//! before the configuration is built. Values that cannot be parsed are logged and replaced with their defaults.
use std::env;

use log::*;
use shopdesk_common::helpers::{parse_boolean_flag, parse_positive};
use shopdesk_engine::{analytics_objects::DEFAULT_RANKING_LIMIT, TransitionPolicy};

const DEFAULT_SHOPDESK_HOST: &str = "127.0.0.1";
const DEFAULT_SHOPDESK_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/shopdesk.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// The maximum number of rows returned by any sales ranking.
    pub ranking_limit: u32,
    /// The page size for list endpoints when the request does not supply a `limit`.
    pub page_size: u32,
    /// When true, `paid → cancelled` is a legal payment transition. It reverses the sale like a refund does.
    pub allow_paid_to_cancelled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SHOPDESK_HOST.to_string(),
            port: DEFAULT_SHOPDESK_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            ranking_limit: DEFAULT_RANKING_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            allow_paid_to_cancelled: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SHOPDESK_HOST").ok().unwrap_or_else(|| DEFAULT_SHOPDESK_HOST.into());
        let port = env::var("SHOPDESK_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SHOPDESK_PORT. {e} Using the default, {DEFAULT_SHOPDESK_PORT}, \
                         instead."
                    );
                    DEFAULT_SHOPDESK_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SHOPDESK_PORT);
        let database_url = env::var("SHOPDESK_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SHOPDESK_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = positive_from_env("SHOPDESK_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let ranking_limit = positive_from_env("SHOPDESK_RANKING_LIMIT", DEFAULT_RANKING_LIMIT);
        let page_size = positive_from_env("SHOPDESK_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        let allow_paid_to_cancelled = parse_boolean_flag(env::var("SHOPDESK_ALLOW_PAID_TO_CANCELLED").ok(), false);
        if allow_paid_to_cancelled {
            info!("🪛️ Paid orders may be cancelled. Cancelling a paid order reverses the sale.");
        }
        Self { host, port, database_url, max_connections, ranking_limit, page_size, allow_paid_to_cancelled }
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        TransitionPolicy::new(self.allow_paid_to_cancelled)
    }
}

fn positive_from_env(name: &str, default: u32) -> u32 {
    match env::var(name) {
        Ok(s) => parse_positive(Some(s.as_str())).unwrap_or_else(|| {
            warn!("🪛️ {s} is not a valid value for {name}. Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}
