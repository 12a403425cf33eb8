use actix_web::HttpResponse;
use serde::Serialize;

use crate::{CARGO_NAME, CARGO_VERSION};

#[derive(Serialize)]
struct Version {
    name: &'static str,
    version: &'static str,
}

pub(crate) async fn get() -> HttpResponse {
    HttpResponse::Ok().json(Version {
        name: CARGO_NAME,
        version: CARGO_VERSION,
    })
}
