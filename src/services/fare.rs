use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::AppError,
    models::ride::{FareEstimate, FareQuery, RideRequestState},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct FareResponse {
    fare: Option<f64>,
}

/// Client for the external fare-estimation endpoint. One GET per submit,
/// no retries.
#[derive(Clone)]
pub struct FareService {
    client: reqwest::Client,
    endpoint: String,
}

impl FareService {
    pub fn new(endpoint: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Validate the ride request against `now`, then fetch an estimate.
    pub async fn submit(
        &self,
        ride: &RideRequestState,
        now: NaiveDateTime,
    ) -> Result<FareEstimate, AppError> {
        ride.validate_for_submit(now)?;
        self.estimate(&ride.fare_query()).await
    }

    pub async fn estimate(&self, query: &FareQuery) -> Result<FareEstimate, AppError> {
        debug!(endpoint = %self.endpoint, ?query, "requesting fare estimate");

        let res = self
            .client
            .get(&self.endpoint)
            .query(query)
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(AppError::UpstreamStatus(status.as_u16()));
        }

        let body = res.text().await?;
        let parsed: FareResponse = serde_json::from_str(&body)?;
        let fare = parsed.fare.ok_or(AppError::MissingFare)?;

        info!(fare, "fare estimate received");
        Ok(FareEstimate { fare })
    }
}
