use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Local;
use serde::Deserialize;
use tracing::warn;

use crate::{
    error::AppError,
    models::{
        coordinate::{Coordinate, TripEnd},
        ride::{RideDetails, RideRequestState, MAX_PASSENGERS, MIN_PASSENGERS},
    },
    services::geocoding::ADDRESS_PLACEHOLDER,
    session::{self, RideSession},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/pickup", post(pickup_click))
        .route("/dropoff", post(dropoff_click))
        .route("/estimate", post(estimate))
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    pickup_lat: f64,
    pickup_lon: f64,
    dropoff_lat: f64,
    dropoff_lon: f64,
    pickup_address: String,
    dropoff_address: String,
    date_value: String,
    time_value: String,
    min_date: String,
    passenger_count: u8,
    min_passengers: u8,
    max_passengers: u8,
    show_error: bool,
    error_message: String,
    show_fare: bool,
    fare_message: String,
}

enum Banner {
    None,
    Error(String),
    Fare(String),
}

async fn index(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    RideSession(ride): RideSession,
) -> Result<Response, AppError> {
    let jar = session::store(jar, &ride)?;
    Ok(render(&state, &ride, Banner::None, jar).await)
}

/// Raw map-click form: the clicked point plus the side-panel fields, which
/// the page mirrors into the click form so they survive the re-render.
#[derive(Deserialize)]
struct ClickForm {
    latitude: f64,
    longitude: f64,
    date: String,
    time: String,
    passenger_count: u8,
}

async fn pickup_click(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<ClickForm>,
) -> Result<Response, AppError> {
    map_click(state, jar, TripEnd::Pickup, form).await
}

async fn dropoff_click(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<ClickForm>,
) -> Result<Response, AppError> {
    map_click(state, jar, TripEnd::Dropoff, form).await
}

async fn map_click(
    state: AppState,
    jar: PrivateCookieJar,
    end: TripEnd,
    form: ClickForm,
) -> Result<Response, AppError> {
    let mut ride = session::load(&jar);
    let banner = match apply_click_form(&mut ride, end, &form) {
        Ok(()) => Banner::None,
        Err(err) if err.is_recoverable() => {
            warn!(%end, latitude = form.latitude, longitude = form.longitude, "click rejected: {err}");
            Banner::Error(err.to_string())
        }
        Err(err) => return Err(err),
    };
    let jar = session::store(jar, &ride)?;
    Ok(render(&state, &ride, banner, jar).await)
}

fn apply_click_form(
    ride: &mut RideRequestState,
    end: TripEnd,
    form: &ClickForm,
) -> Result<(), AppError> {
    let details = RideDetails::parse(&form.date, &form.time, form.passenger_count)?;
    ride.apply_details(details);
    ride.apply_click(end, Coordinate::new(form.latitude, form.longitude))
}

#[derive(Deserialize)]
struct EstimateForm {
    date: String,
    time: String,
    passenger_count: u8,
}

async fn estimate(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<EstimateForm>,
) -> Result<Response, AppError> {
    let mut ride = session::load(&jar);
    let banner = match RideDetails::parse(&form.date, &form.time, form.passenger_count) {
        Ok(details) => {
            ride.apply_details(details);
            match state.fare.submit(&ride, Local::now().naive_local()).await {
                Ok(fare) => Banner::Fare(fare.display_message()),
                Err(err) if err.is_recoverable() => {
                    warn!("fare request failed: {err}");
                    Banner::Error(err.to_string())
                }
                Err(err) => return Err(err),
            }
        }
        Err(err) if err.is_recoverable() => Banner::Error(err.to_string()),
        Err(err) => return Err(err),
    };
    let jar = session::store(jar, &ride)?;
    Ok(render(&state, &ride, banner, jar).await)
}

async fn render(
    state: &AppState,
    ride: &RideRequestState,
    banner: Banner,
    jar: PrivateCookieJar,
) -> Response {
    let pickup_address = lookup_address(state, ride, TripEnd::Pickup).await;
    let dropoff_address = lookup_address(state, ride, TripEnd::Dropoff).await;

    let (show_error, error_message, show_fare, fare_message) = match banner {
        Banner::None => (false, String::new(), false, String::new()),
        Banner::Error(message) => (true, message, false, String::new()),
        Banner::Fare(message) => (false, String::new(), true, message),
    };

    let template = IndexTemplate {
        pickup_lat: ride.pickup.latitude,
        pickup_lon: ride.pickup.longitude,
        dropoff_lat: ride.dropoff.latitude,
        dropoff_lon: ride.dropoff.longitude,
        pickup_address,
        dropoff_address,
        date_value: ride.pickup_date.format("%Y-%m-%d").to_string(),
        time_value: ride.pickup_time.format("%H:%M").to_string(),
        min_date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
        passenger_count: ride.passenger_count,
        min_passengers: MIN_PASSENGERS,
        max_passengers: MAX_PASSENGERS,
        show_error,
        error_message,
        show_fare,
        fare_message,
    };

    (jar, AskamaTemplateResponse::into_response(template)).into_response()
}

async fn lookup_address(state: &AppState, ride: &RideRequestState, end: TripEnd) -> String {
    match state.geocoder.reverse(&ride.coordinate(end)).await {
        Ok(address) => address,
        Err(err) => {
            warn!(%end, "address lookup failed: {err}");
            ADDRESS_PLACEHOLDER.to_string()
        }
    }
}
