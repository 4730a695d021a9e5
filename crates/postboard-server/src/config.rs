use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("POSTBOARD_DB_PATH").unwrap_or_else(|| "postboard.db".into());
        let host = lookup("POSTBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("POSTBOARD_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("POSTBOARD_PORT must be a port number")?;

        Ok(Self {
            db_path: db_path.into(),
            host,
            port,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
