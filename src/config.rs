use std::{env, net::SocketAddr};

use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fare_api_url: String,
    pub listen_addr: SocketAddr,
    pub geocoder_url: String,
    pub cookie_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let fare_api_url = env::var("FARE_API_URL")
            .map_err(|_| AppError::Config("FARE_API_URL must be set".into()))?;
        Url::parse(&fare_api_url)
            .map_err(|err| AppError::Config(format!("invalid FARE_API_URL: {err}")))?;

        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let geocoder_url = env::var("GEOCODER_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-super-secret-taxi-cookie".to_string());

        Ok(Self {
            fare_api_url,
            listen_addr,
            geocoder_url,
            cookie_secret,
        })
    }
}
