use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::{error::AppError, models::coordinate::Coordinate};

const USER_AGENT: &str = "taxi_fare_app";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Caption shown when the reverse lookup fails for any reason.
pub const ADDRESS_PLACEHOLDER: &str = "Address lookup unavailable";

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Reverse geocoding against a Nominatim-style endpoint. Strictly
/// best-effort: callers substitute [`ADDRESS_PLACEHOLDER`] on error.
#[derive(Clone)]
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingService {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub async fn reverse(&self, coordinate: &Coordinate) -> Result<String, AppError> {
        let url = format!("{}/reverse", self.base_url.trim_end_matches('/'));
        let res = self
            .client
            .get(url)
            .query(&[("format", "jsonv2")])
            .query(&[
                ("lat", coordinate.latitude),
                ("lon", coordinate.longitude),
            ])
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(AppError::UpstreamStatus(status.as_u16()));
        }

        let body = res.text().await?;
        let parsed: ReverseResponse = serde_json::from_str(&body)?;
        // Nominatim answers 200 with an error body for un-geocodable points.
        Ok(parsed.display_name.unwrap_or_else(|| "Not found".into()))
    }
}
