#![warn(clippy::dbg_macro)]

use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use error::{AppError, IoErrorContext, Result};
use railyard_store_db::Error as StoreError;
use std::fmt::Display;

use crate::ocr::OcrError;

mod body;
mod config;
mod error;
mod extract;
mod health;
mod ocr;
mod router;
mod routes;
mod state;
mod timetables;
mod trains;
mod upload;
mod version;


const CARGO_NAME: &str = env!("CARGO_PKG_NAME");
const CARGO_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
struct ServerError {
    err: AppError,
}

impl Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.err)
    }
}

impl actix_web::error::ResponseError for ServerError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match &self.err {
            AppError::MalformedRequest { .. }
            | AppError::Multipart(_)
            | AppError::InvalidInput { .. }
            | AppError::NoValidInput => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::UniqueConstraintViolation { .. }) => StatusCode::CONFLICT,
            AppError::Store(StoreError::MissingReference { .. }) => StatusCode::BAD_REQUEST,
            AppError::Recognition(OcrError::Unavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Recognition(OcrError::Failed { .. }) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self.err);
        }
        HttpResponse::build(status).json(serde_json::json!({ "error": self.err.to_string() }))
    }
}

impl From<AppError> for ServerError {
    fn from(err: AppError) -> ServerError {
        ServerError { err }
    }
}

type ServerResult = std::result::Result<HttpResponse, ServerError>;

async fn inner_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load()?;
    let store = state::StoreHandle::new(state::open_store(&config)?);
    let recognizer = web::Data::from(ocr::from_config(&config));

    let c = web::Data::new(config);
    let config_data = c.clone();
    let store_data = web::Data::new(store);

    log::info!("listening on {}", c.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(config_data.clone())
            .app_data(store_data.clone())
            .app_data(recognizer.clone())
            .configure(router::configure)
    })
    .workers(c.workers)
    .bind(c.bind.clone())
    .io_context("Failed to bind server")?
    .run()
    .await
    .io_context("Failed to start server")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    inner_main().await.map_err(std::io::Error::other)
}
