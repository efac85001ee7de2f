use std::{
    fmt,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use axum::{
    http::{header, StatusCode},
    routing::get,
    Router,
};
use chrono::{NaiveDateTime, NaiveTime};
use cucumber::{given, then, when, World as _};
use taxifare::models::{
    coordinate::{is_within_nyc, Coordinate, TripEnd},
    ride::{default_pickup_time, RideDetails, RideRequestState},
};
use taxifare::services::fare::FareService;
use tokio::net::TcpListener;

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    clock: Option<NaiveDateTime>,
    ride: Option<RideRequestState>,
    fare_stub: Option<FareStub>,
    last_error: Option<String>,
    displayed_result: Option<String>,
    validation_outcome: Option<Result<(), String>>,
}

impl AppWorld {
    fn clock(&self) -> NaiveDateTime {
        self.clock.expect("clock must be set first")
    }

    fn ride(&self) -> &RideRequestState {
        self.ride.as_ref().expect("ride request must exist first")
    }

    fn ride_mut(&mut self) -> &mut RideRequestState {
        self.ride.as_mut().expect("ride request must exist first")
    }

    fn stub(&self) -> &FareStub {
        self.fare_stub
            .as_ref()
            .expect("fare endpoint must be stubbed first")
    }
}

/// In-process fare endpoint whose next response is swapped per scenario.
struct FareStub {
    service: FareService,
    response: Arc<Mutex<(u16, String)>>,
}

impl fmt::Debug for FareStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FareStub").finish()
    }
}

impl FareStub {
    async fn start() -> anyhow::Result<Self> {
        let response = Arc::new(Mutex::new((200u16, "{}".to_string())));
        let shared = Arc::clone(&response);

        let app = Router::new().route(
            "/fare",
            get(move || {
                let shared = Arc::clone(&shared);
                async move {
                    let (status, body) = shared.lock().expect("stub response lock").clone();
                    (
                        StatusCode::from_u16(status).expect("stub status must be valid"),
                        [(header::CONTENT_TYPE, "application/json")],
                        body,
                    )
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind fare stub listener")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        let service = FareService::new(format!("http://{addr}/fare"))?;
        Ok(Self { service, response })
    }

    fn respond_with(&self, status: u16, body: String) {
        *self.response.lock().expect("stub response lock") = (status, body);
    }

    /// A service pointed at a port with nothing listening on it: bind to
    /// reserve an ephemeral port, release it, keep the address.
    async fn unreachable() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("reserve unused port")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let service = FareService::new(format!("http://{addr}/fare"))?;
        Ok(Self {
            service,
            response: Arc::new(Mutex::new((200, "{}".to_string()))),
        })
    }
}

#[given(regex = r#"^the clock reads "([^"]+)"$"#)]
async fn given_clock(world: &mut AppWorld, value: String) {
    let clock = NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S").expect("clock value");
    world.clock = Some(clock);
}

#[given("a fresh ride request")]
async fn given_fresh_ride(world: &mut AppWorld) {
    let now = world.clock();
    world.ride = Some(RideRequestState::new(now));
    world.last_error = None;
    world.displayed_result = None;
}

#[given("a stubbed fare endpoint")]
async fn given_fare_stub(world: &mut AppWorld) {
    world.fare_stub = Some(FareStub::start().await.expect("start fare stub"));
}

#[given("an unreachable fare endpoint")]
async fn given_unreachable_fare(world: &mut AppWorld) {
    world.fare_stub = Some(FareStub::unreachable().await.expect("unreachable stub"));
}

#[given(regex = r#"^the fare endpoint answers (\d+) with body '(.*)'$"#)]
async fn given_fare_response(world: &mut AppWorld, status: u16, body: String) {
    world.stub().respond_with(status, body);
}

#[then(regex = r"^longitude (-?\d+\.?\d*) latitude (-?\d+\.?\d*) is (inside|outside) the service area$")]
async fn then_geofence(_world: &mut AppWorld, longitude: f64, latitude: f64, side: String) {
    let expected = side == "inside";
    assert_eq!(
        is_within_nyc(longitude, latitude),
        expected,
        "({longitude}, {latitude}) should be {side} the service area"
    );
}

#[then(regex = r#"^the suggested pickup time is "([^"]+)"$"#)]
async fn then_suggested_time(world: &mut AppWorld, expected: String) {
    let expected = NaiveTime::parse_from_str(&expected, "%H:%M").expect("expected time");
    assert_eq!(default_pickup_time(world.clock()), expected);
}

#[when(regex = r#"^I schedule the departure for "([^"]+)"$"#)]
async fn when_schedule_departure(world: &mut AppWorld, value: String) {
    let departure =
        NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S").expect("departure value");
    let ride = world.ride_mut();
    ride.pickup_date = departure.date();
    ride.pickup_time = departure.time();
}

#[when("I validate the ride request")]
async fn when_validate(world: &mut AppWorld) {
    let now = world.clock();
    let outcome = world.ride().validate_for_submit(now);
    world.validation_outcome = Some(outcome.map_err(|err| err.to_string()));
}

#[then(regex = r#"^the ride request is rejected with "([^"]+)"$"#)]
async fn then_validation_rejected(world: &mut AppWorld, expected: String) {
    let outcome = world
        .validation_outcome
        .as_ref()
        .expect("validation must run first");
    assert_eq!(outcome.as_ref().err(), Some(&expected));
}

#[then("the ride request passes validation")]
async fn then_validation_passes(world: &mut AppWorld) {
    let outcome = world
        .validation_outcome
        .as_ref()
        .expect("validation must run first");
    assert!(outcome.is_ok(), "unexpected rejection: {outcome:?}");
}

#[when(regex = r"^I click the (pickup|dropoff) map at latitude (-?\d+\.?\d*) longitude (-?\d+\.?\d*)$")]
async fn when_map_click(world: &mut AppWorld, end: String, latitude: f64, longitude: f64) {
    let end = parse_trip_end(&end);
    let outcome = world
        .ride_mut()
        .apply_click(end, Coordinate::new(latitude, longitude));
    world.last_error = outcome.err().map(|err| err.to_string());
}

#[given(regex = r"^the (pickup|dropoff) coordinate is forced to latitude (-?\d+\.?\d*) longitude (-?\d+\.?\d*)$")]
async fn given_forced_coordinate(world: &mut AppWorld, end: String, latitude: f64, longitude: f64) {
    // Bypasses the picker validation to simulate stale session state.
    let coordinate = Coordinate::new(latitude, longitude);
    let ride = world.ride_mut();
    match parse_trip_end(&end) {
        TripEnd::Pickup => ride.pickup = coordinate,
        TripEnd::Dropoff => ride.dropoff = coordinate,
    }
}

#[then(regex = r#"^the click is rejected with "([^"]+)"$"#)]
async fn then_click_rejected(world: &mut AppWorld, expected: String) {
    assert_eq!(world.last_error.as_deref(), Some(expected.as_str()));
}

#[then(regex = r"^the (pickup|dropoff) coordinate is latitude (-?\d+\.?\d*) longitude (-?\d+\.?\d*)$")]
async fn then_coordinate(world: &mut AppWorld, end: String, latitude: f64, longitude: f64) {
    let end = parse_trip_end(&end);
    let actual = world.ride().coordinate(end);
    assert_eq!(actual, Coordinate::new(latitude, longitude));
}

#[when(regex = r"^I request a fare estimate for (\d+) passengers$")]
async fn when_request_estimate(world: &mut AppWorld, passengers: u8) {
    world.ride_mut().passenger_count = passengers;
    let now = world.clock();
    let ride = world.ride().clone();
    let outcome = world.stub().service.submit(&ride, now).await;
    match outcome {
        Ok(estimate) => {
            world.displayed_result = Some(estimate.display_message());
            world.last_error = None;
        }
        Err(err) => {
            world.last_error = Some(err.to_string());
            world.displayed_result = None;
        }
    }
}

#[then(regex = r#"^the displayed result is "([^"]+)"$"#)]
async fn then_displayed_result(world: &mut AppWorld, expected: String) {
    assert_eq!(
        world.displayed_result.as_deref(),
        Some(expected.as_str()),
        "estimate should have succeeded, error: {:?}",
        world.last_error
    );
}

#[then(regex = r#"^the request fails with "([^"]+)"$"#)]
async fn then_request_fails(world: &mut AppWorld, expected: String) {
    assert_eq!(world.last_error.as_deref(), Some(expected.as_str()));
}

#[then(regex = r#"^the request fails with an error starting with "([^"]+)"$"#)]
async fn then_request_fails_with_prefix(world: &mut AppWorld, prefix: String) {
    let error = world
        .last_error
        .as_deref()
        .expect("the fare request should have failed");
    assert!(
        error.starts_with(&prefix),
        "error {error:?} should start with {prefix:?}"
    );
}

#[when(regex = r#"^I set the ride details to date "([^"]+)" time "([^"]+)" and (\d+) passengers$"#)]
async fn when_set_details(world: &mut AppWorld, date: String, time: String, passengers: u8) {
    let details = RideDetails::parse(&date, &time, passengers).expect("ride details");
    world.ride_mut().apply_details(details);
}

#[then(regex = r"^the passenger count is (\d+)$")]
async fn then_passenger_count(world: &mut AppWorld, expected: u8) {
    assert_eq!(world.ride().passenger_count, expected);
}

fn parse_trip_end(value: &str) -> TripEnd {
    match value {
        "pickup" => TripEnd::Pickup,
        "dropoff" => TripEnd::Dropoff,
        other => panic!("unknown trip end {other:?}"),
    }
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
