use std::{env, net::SocketAddr};

use anyhow::Context;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Where the connection string comes from. Resolved on every invocation.
#[derive(Debug, Clone)]
pub enum DatabaseUrl {
    FromEnv(&'static str),
    Fixed(Option<String>),
}

impl DatabaseUrl {
    pub fn resolve(&self) -> Option<String> {
        let url = match self {
            DatabaseUrl::FromEnv(var) => env::var(var).ok(),
            DatabaseUrl::Fixed(url) => url.clone(),
        };
        url.filter(|u| !u.trim().is_empty())
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        DatabaseUrl::FromEnv(DATABASE_URL_VAR)
    }
}

pub fn bind_addr() -> anyhow::Result<SocketAddr> {
    let raw = env::var(BIND_ADDR_VAR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    raw.parse()
        .with_context(|| format!("{BIND_ADDR_VAR} is not a socket address: {raw}"))
}
