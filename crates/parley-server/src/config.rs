use std::net::SocketAddr;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string (`DATABASE_URL`).
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "parley.db".into());
        let host = lookup("PARLEY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("PARLEY_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PARLEY_PORT is not a port number: {raw}"))?,
            None => 3000,
        };

        Ok(Self {
            database_url,
            host,
            port,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .with_context(|| format!("invalid bind address {addr}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, "parley.db");
        assert_eq!(config.bind_addr().unwrap(), "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite:///tmp/chat.db"),
            ("PARLEY_HOST", "127.0.0.1"),
            ("PARLEY_PORT", "8081"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite:///tmp/chat.db");
        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:8081".parse().unwrap());
    }

    #[test]
    fn test_bad_port() {
        assert!(Config::from_lookup(lookup(&[("PARLEY_PORT", "http")])).is_err());
    }
}
