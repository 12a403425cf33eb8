use actix_web::web;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;

use crate::error::{AppError, Result};

/// Collect a request body, refusing anything longer than `limit` bytes.
///
/// Reading stops at the first chunk that crosses the limit; the partial body
/// is dropped.
pub(crate) async fn read_limited(mut payload: web::Payload, limit: usize) -> Result<Bytes> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::MalformedRequest {
            reason: format!("failed to read request body: {e}"),
        })?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}
