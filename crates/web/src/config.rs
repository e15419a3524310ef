use anyhow::{Context, Result};

const DEFAULT_PAYOUT_SPLITS_PATH: &str = "payout_splits.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub payout_splits_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            payout_splits_path: std::env::var("PAYOUT_SPLITS_PATH")
                .unwrap_or_else(|_| DEFAULT_PAYOUT_SPLITS_PATH.to_string()),
        })
    }
}
