use anyhow::Context;
use serde::Deserialize;

use crate::users::password::MAX_COST;

#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub hash: HashConfig,
    pub cors_origins: Vec<String>,
    pub host: String,
    pub port: u16,
}

pub const DEFAULT_HASH_COST: u32 = 12;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let cost = match std::env::var("PASSWORD_HASH_COST") {
            Ok(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("PASSWORD_HASH_COST is not a number: {v}"))?,
            Err(_) => DEFAULT_HASH_COST,
        };
        if !(1..=MAX_COST).contains(&cost) {
            anyhow::bail!("PASSWORD_HASH_COST must be between 1 and {MAX_COST}, got {cost}");
        }

        let cors_origins = std::env::var("CORS_ORIGIN")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3001);

        Ok(Self {
            database_url,
            max_connections,
            hash: HashConfig { cost },
            cors_origins,
            host,
            port,
        })
    }
}
