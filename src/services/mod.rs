pub mod fare;
pub mod geocoding;
