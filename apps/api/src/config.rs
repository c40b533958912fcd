use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Everything has a sensible default — the service runs without a `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Where freshly written store files (`cv<YYYYMMDDHHMM>.db`) land.
    pub data_dir: PathBuf,
    pub pdflatex_bin: String,
    pub pdftoppm_bin: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            data_dir: PathBuf::from(env_or("DATA_DIR", "./data")),
            pdflatex_bin: env_or("PDFLATEX_BIN", "pdflatex"),
            pdftoppm_bin: env_or("PDFTOPPM_BIN", "pdftoppm"),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
