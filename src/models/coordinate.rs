use std::fmt;

use serde::{Deserialize, Serialize};

/// Service-area bounding box for New York City.
pub const NYC_BOUNDS: Bounds = Bounds {
    min_lon: -74.25,
    max_lon: -73.70,
    min_lat: 40.50,
    max_lat: 40.92,
};

/// Midtown Manhattan, the initial marker position for both trip ends.
pub const DEFAULT_COORDINATE: Coordinate = Coordinate {
    latitude: 40.75,
    longitude: -73.98,
};

#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Strict-inequality containment: points on the boundary are outside.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        self.min_lon < longitude
            && longitude < self.max_lon
            && self.min_lat < latitude
            && latitude < self.max_lat
    }
}

pub fn is_within_nyc(longitude: f64, latitude: f64) -> bool {
    NYC_BOUNDS.contains(longitude, latitude)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_within_nyc(&self) -> bool {
        is_within_nyc(self.longitude, self.latitude)
    }
}

/// Which end of the trip a map click targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripEnd {
    Pickup,
    Dropoff,
}

impl TripEnd {
    pub fn label(&self) -> &'static str {
        match self {
            TripEnd::Pickup => "pickup",
            TripEnd::Dropoff => "dropoff",
        }
    }
}

impl fmt::Display for TripEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
