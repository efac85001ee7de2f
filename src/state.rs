use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    config::AppConfig,
    services::{fare::FareService, geocoding::GeocodingService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub fare: FareService,
    pub geocoder: GeocodingService,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig, fare: FareService, geocoder: GeocodingService) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        Self {
            config,
            fare,
            geocoder,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}
