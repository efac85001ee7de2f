use taxifare::config::AppConfig;
use taxifare::error::AppError;
use taxifare::routes::create_router;
use taxifare::services::{fare::FareService, geocoding::GeocodingService};
use taxifare::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;

    let fare = FareService::new(config.fare_api_url.clone())?;
    let geocoder = GeocodingService::new(config.geocoder_url.clone())?;

    let state = AppState::new(config.clone(), fare, geocoder);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,taxifare=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
