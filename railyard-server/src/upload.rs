use actix_web::{HttpRequest, HttpResponse, http, web};

use crate::ServerResult;
use crate::body::read_limited;
use crate::config::Config;
use crate::error::AppError;
use crate::extract;
use crate::ocr::Recognizer;

/// Accept screenshots as `multipart/form-data` and answer with a timetable
/// preview. Nothing is stored.
pub(crate) async fn post(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<Config>,
    recognizer: web::Data<dyn Recognizer>,
) -> ServerResult {
    let content_type = req
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::MalformedRequest {
            reason: "missing Content-Type header".to_string(),
        })?;
    let boundary = railyard_multipart::boundary(content_type).map_err(AppError::from)?;

    let body = read_limited(payload, config.max_upload_size).await?;
    let parts = railyard_multipart::parse_with_boundary(&boundary, &body);
    log::debug!("upload with {} parts, {} bytes", parts.len(), body.len());

    let recognizer = recognizer.into_inner();
    let extraction = web::block(move || extract::extract(parts, recognizer.as_ref()))
        .await
        .map_err(|e| AppError::Internal {
            reason: e.to_string(),
        })??;

    Ok(HttpResponse::Ok().json(extraction))
}
