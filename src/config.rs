use std::{env, net::SocketAddr, path::PathBuf};

use url::Url;

use crate::error::AppError;

/// Sheet.best endpoint the trips are mirrored to when SHEET_URL is unset.
pub const DEFAULT_SHEET_URL: &str =
    "https://sheet.best/api/sheets/6d2f33b1-3c2a-4bc4-9c94-3cdc8ed38df3";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub data_root: PathBuf,
    pub sheet_url: Url,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let data_root = env::var("DATA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let sheet_url = env::var("SHEET_URL").unwrap_or_else(|_| DEFAULT_SHEET_URL.to_string());
        let sheet_url = Url::parse(&sheet_url)
            .map_err(|err| AppError::Config(format!("invalid SHEET_URL: {err}")))?;

        Ok(Self {
            listen_addr,
            data_root,
            sheet_url,
        })
    }
}
