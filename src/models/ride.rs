use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::coordinate::{Coordinate, TripEnd, DEFAULT_COORDINATE},
};

pub const MIN_PASSENGERS: u8 = 1;
pub const MAX_PASSENGERS: u8 = 8;
pub const DEFAULT_PASSENGERS: u8 = 2;

/// Round up to the next 15-minute boundary; a time already on the grid maps
/// to itself with seconds truncated.
pub fn default_pickup_time(now: NaiveDateTime) -> NaiveTime {
    let offset = (15 - now.minute() % 15) % 15;
    let rounded = now + Duration::minutes(i64::from(offset));
    rounded
        .time()
        .with_second(0)
        .and_then(|time| time.with_nanosecond(0))
        .unwrap_or_else(|| rounded.time())
}

/// Per-session form state, carried in the session cookie across renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequestState {
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub passenger_count: u8,
}

impl RideRequestState {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            pickup: DEFAULT_COORDINATE,
            dropoff: DEFAULT_COORDINATE,
            pickup_date: now.date(),
            pickup_time: default_pickup_time(now),
            passenger_count: DEFAULT_PASSENGERS,
        }
    }

    pub fn pickup_datetime(&self) -> NaiveDateTime {
        self.pickup_date.and_time(self.pickup_time)
    }

    pub fn coordinate(&self, end: TripEnd) -> Coordinate {
        match end {
            TripEnd::Pickup => self.pickup,
            TripEnd::Dropoff => self.dropoff,
        }
    }

    /// One coordinate-picker transition: commit the clicked point if it
    /// passes the geofence, otherwise leave state untouched.
    pub fn apply_click(&mut self, end: TripEnd, clicked: Coordinate) -> Result<(), AppError> {
        if !clicked.is_within_nyc() {
            return Err(AppError::Validation(format!(
                "Selected {end} is outside NYC."
            )));
        }
        match end {
            TripEnd::Pickup => self.pickup = clicked,
            TripEnd::Dropoff => self.dropoff = clicked,
        }
        Ok(())
    }

    pub fn apply_details(&mut self, details: RideDetails) {
        self.pickup_date = details.date;
        self.pickup_time = details.time;
        self.passenger_count = details.passenger_count;
    }

    /// Submit preconditions, checked in order and short-circuiting: future
    /// departure, pickup in the service area, dropoff in the service area.
    pub fn validate_for_submit(&self, now: NaiveDateTime) -> Result<(), AppError> {
        if self.pickup_datetime() < now {
            return Err(AppError::Validation(
                "Please select a valid future time.".into(),
            ));
        }
        if !self.pickup.is_within_nyc() {
            return Err(AppError::Validation("Pickup outside NYC.".into()));
        }
        if !self.dropoff.is_within_nyc() {
            return Err(AppError::Validation("Dropoff outside NYC.".into()));
        }
        Ok(())
    }

    pub fn fare_query(&self) -> FareQuery {
        FareQuery {
            pickup_datetime: self
                .pickup_datetime()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            pickup_longitude: self.pickup.longitude,
            pickup_latitude: self.pickup.latitude,
            dropoff_longitude: self.dropoff.longitude,
            dropoff_latitude: self.dropoff.latitude,
            passenger_count: self.passenger_count,
        }
    }
}

/// Side-panel inputs after parsing and clamping.
#[derive(Debug, Clone, Copy)]
pub struct RideDetails {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub passenger_count: u8,
}

impl RideDetails {
    pub fn parse(date: &str, time: &str, passenger_count: u8) -> Result<Self, AppError> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|err| AppError::Validation(format!("Invalid date: {err}")))?;
        // HTML time inputs send HH:MM, or HH:MM:SS when seconds are shown.
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .map_err(|err| AppError::Validation(format!("Invalid time: {err}")))?;
        Ok(Self {
            date,
            time,
            passenger_count: passenger_count.clamp(MIN_PASSENGERS, MAX_PASSENGERS),
        })
    }
}

/// Wire query for the fare endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FareQuery {
    pub pickup_datetime: String,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    pub passenger_count: u8,
}

/// Ephemeral result of one fare request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareEstimate {
    pub fare: f64,
}

impl FareEstimate {
    pub fn display_message(&self) -> String {
        format!("Estimated Fare: ${:.2}", self.fare)
    }
}
