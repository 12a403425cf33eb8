use actix_web::{HttpResponse, web};

use crate::ServerResult;
use crate::state::StoreHandle;

/// Liveness check. Fails when the store cannot be queried.
pub(crate) async fn get(store: web::Data<StoreHandle>) -> ServerResult {
    let counts = store.run(|s| Ok(s.table_counts()?)).await?;
    log::trace!("health: {counts:?}");
    Ok(HttpResponse::Ok()
        .content_type(mime::TEXT_PLAIN_UTF_8)
        .body("OK\n"))
}
