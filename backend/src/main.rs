mod config;
mod drive;
mod error;
mod gate;
mod google_drive;
mod models;
mod routes;

use std::{fs, sync::Arc};

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, middleware::Logger, web};
use config::AppConfig;
use drive::DriveStore;
use gate::DRIVE_TOKEN_HEADER;
use google_drive::GoogleDriveClient;
use routes::register;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub struct AppState {
    pub drive: Arc<dyn DriveStore>,
}

fn cors_for(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(["GET", "POST", "PUT", "DELETE"])
            .allowed_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::HeaderName::from_static(DRIVE_TOKEN_HEADER),
            ])
            .supports_credentials(),
        None => Cors::permissive(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::from_env().expect("failed to load config");

    fs::create_dir_all(&config.log_dir).expect("failed to create log directory");
    let file_appender = rolling::never(&config.log_dir, "backend.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let _guard = guard;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("failed to init logging filter");

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    let drive = GoogleDriveClient::new(
        &config.drive_api_base,
        &config.drive_upload_base,
        config.request_timeout,
    )
    .expect("failed to build drive client");

    info!(
        host = %config.host,
        port = config.port,
        drive_api = %config.drive_api_base,
        cors_origin = config.allowed_origin.as_deref().unwrap_or("*"),
        "starting drive relay backend"
    );

    let bind_addr = format!("{}:{}", config.host, config.port);
    let shared_state = web::Data::new(AppState {
        drive: Arc::new(drive),
    });
    let allowed_origin = config.allowed_origin.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors_for(allowed_origin.as_deref()))
            .app_data(shared_state.clone())
            .configure(register)
    })
    .bind(bind_addr)?
    .run()
    .await
}
