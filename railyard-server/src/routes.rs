use actix_web::{HttpResponse, web};
use railyard_store_db::{RouteFields, SnapshotStore};
use serde::Serialize;

use crate::ServerResult;
use crate::error::{AppError, Result};
use crate::state::StoreHandle;

fn validate(fields: &RouteFields) -> Result<()> {
    if fields.name.trim().is_empty() {
        return Err(AppError::invalid("route name must not be empty"));
    }
    if fields.country.trim().is_empty() {
        return Err(AppError::invalid("route country must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_route(store: &SnapshotStore, id: i64) -> Result<()> {
    match store.get_route(id)? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound { kind: "route", id }),
    }
}

#[derive(Debug, Serialize)]
struct Link {
    route_id: i64,
    train_id: i64,
    added: bool,
}

pub(crate) async fn list(store: web::Data<StoreHandle>) -> ServerResult {
    let routes = store.run(|s| Ok(s.list_routes()?)).await?;
    Ok(HttpResponse::Ok().json(routes))
}

pub(crate) async fn get(store: web::Data<StoreHandle>, path: web::Path<i64>) -> ServerResult {
    let id = path.into_inner();
    let route = store
        .run(move |s| s.get_route(id)?.ok_or(AppError::NotFound { kind: "route", id }))
        .await?;
    Ok(HttpResponse::Ok().json(route))
}

pub(crate) async fn create(
    store: web::Data<StoreHandle>,
    body: web::Json<RouteFields>,
) -> ServerResult {
    let fields = body.into_inner();
    validate(&fields)?;
    let route = store
        .run(move |s| {
            let id = s.create_route(&fields)?;
            s.get_route(id)?.ok_or(AppError::NotFound { kind: "route", id })
        })
        .await?;
    Ok(HttpResponse::Created().json(route))
}

pub(crate) async fn update(
    store: web::Data<StoreHandle>,
    path: web::Path<i64>,
    body: web::Json<RouteFields>,
) -> ServerResult {
    let id = path.into_inner();
    let fields = body.into_inner();
    validate(&fields)?;
    let route = store
        .run(move |s| {
            if !s.update_route(id, &fields)? {
                return Err(AppError::NotFound { kind: "route", id });
            }
            s.get_route(id)?.ok_or(AppError::NotFound { kind: "route", id })
        })
        .await?;
    Ok(HttpResponse::Ok().json(route))
}

pub(crate) async fn delete(store: web::Data<StoreHandle>, path: web::Path<i64>) -> ServerResult {
    let id = path.into_inner();
    store
        .run(move |s| match s.delete_route(id)? {
            true => Ok(()),
            false => Err(AppError::NotFound { kind: "route", id }),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub(crate) async fn trains(store: web::Data<StoreHandle>, path: web::Path<i64>) -> ServerResult {
    let id = path.into_inner();
    let trains = store
        .run(move |s| {
            require_route(s, id)?;
            Ok(s.route_trains(id)?)
        })
        .await?;
    Ok(HttpResponse::Ok().json(trains))
}

pub(crate) async fn add_train(
    store: web::Data<StoreHandle>,
    path: web::Path<(i64, i64)>,
) -> ServerResult {
    let (route_id, train_id) = path.into_inner();
    let added = store
        .run(move |s| {
            require_route(s, route_id)?;
            if s.get_train(train_id)?.is_none() {
                return Err(AppError::NotFound {
                    kind: "train",
                    id: train_id,
                });
            }
            Ok(s.add_route_train(route_id, train_id)?)
        })
        .await?;
    let link = Link {
        route_id,
        train_id,
        added,
    };
    Ok(if added {
        HttpResponse::Created().json(link)
    } else {
        HttpResponse::Ok().json(link)
    })
}

pub(crate) async fn remove_train(
    store: web::Data<StoreHandle>,
    path: web::Path<(i64, i64)>,
) -> ServerResult {
    let (route_id, train_id) = path.into_inner();
    store
        .run(move |s| {
            require_route(s, route_id)?;
            match s.remove_route_train(route_id, train_id)? {
                true => Ok(()),
                false => Err(AppError::NotFound {
                    kind: "train link",
                    id: train_id,
                }),
            }
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub(crate) async fn timetables(
    store: web::Data<StoreHandle>,
    path: web::Path<i64>,
) -> ServerResult {
    let id = path.into_inner();
    let timetables = store
        .run(move |s| {
            require_route(s, id)?;
            Ok(s.route_timetables(id)?)
        })
        .await?;
    Ok(HttpResponse::Ok().json(timetables))
}
