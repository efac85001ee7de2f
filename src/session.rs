use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use chrono::Local;
use tracing::debug;

use crate::{error::AppError, models::ride::RideRequestState};

pub const RIDE_COOKIE: &str = "taxifare_ride";

/// The ride request state for the current browser session, read from the
/// private cookie or freshly defaulted from the wall clock.
#[derive(Debug, Clone)]
pub struct RideSession(pub RideRequestState);

#[async_trait]
impl<S> FromRequestParts<S> for RideSession
where
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|err| -> AppError { match err {} })?;
        Ok(Self(load(&jar)))
    }
}

pub fn load(jar: &PrivateCookieJar) -> RideRequestState {
    jar.get(RIDE_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_else(|| {
            debug!("no usable ride cookie, starting a fresh session");
            RideRequestState::new(Local::now().naive_local())
        })
}

pub fn store(jar: PrivateCookieJar, ride: &RideRequestState) -> Result<PrivateCookieJar, AppError> {
    let value = serde_json::to_string(ride)?;
    let cookie = Cookie::build((RIDE_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok(jar.add(cookie))
}
