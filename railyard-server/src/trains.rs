use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::ServerResult;
use crate::error::{AppError, Result};
use crate::state::StoreHandle;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TrainFields {
    name: String,
}

impl TrainFields {
    fn validated(self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid("train name must not be empty"));
        }
        Ok(name.to_string())
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound { kind: "train", id }
}

pub(crate) async fn list(store: web::Data<StoreHandle>) -> ServerResult {
    let trains = store.run(|s| Ok(s.list_trains()?)).await?;
    Ok(HttpResponse::Ok().json(trains))
}

pub(crate) async fn get(store: web::Data<StoreHandle>, path: web::Path<i64>) -> ServerResult {
    let id = path.into_inner();
    let train = store
        .run(move |s| s.get_train(id)?.ok_or(not_found(id)))
        .await?;
    Ok(HttpResponse::Ok().json(train))
}

pub(crate) async fn create(
    store: web::Data<StoreHandle>,
    body: web::Json<TrainFields>,
) -> ServerResult {
    let name = body.into_inner().validated()?;
    let train = store
        .run(move |s| {
            let id = s.create_train(&name)?;
            s.get_train(id)?.ok_or(not_found(id))
        })
        .await?;
    Ok(HttpResponse::Created().json(train))
}

pub(crate) async fn update(
    store: web::Data<StoreHandle>,
    path: web::Path<i64>,
    body: web::Json<TrainFields>,
) -> ServerResult {
    let id = path.into_inner();
    let name = body.into_inner().validated()?;
    let train = store
        .run(move |s| {
            if !s.update_train(id, &name)? {
                return Err(not_found(id));
            }
            s.get_train(id)?.ok_or(not_found(id))
        })
        .await?;
    Ok(HttpResponse::Ok().json(train))
}

pub(crate) async fn delete(store: web::Data<StoreHandle>, path: web::Path<i64>) -> ServerResult {
    let id = path.into_inner();
    store
        .run(move |s| match s.delete_train(id)? {
            true => Ok(()),
            false => Err(not_found(id)),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub(crate) async fn routes(store: web::Data<StoreHandle>, path: web::Path<i64>) -> ServerResult {
    let id = path.into_inner();
    let routes = store
        .run(move |s| {
            s.get_train(id)?.ok_or(not_found(id))?;
            Ok(s.train_routes(id)?)
        })
        .await?;
    Ok(HttpResponse::Ok().json(routes))
}
