use actix_web::{HttpResponse, web};
use railyard_store_db::{
    EntryFields, NewTimetable, Timetable, TimetableEntry, TimetableFields,
};
use serde::{Deserialize, Serialize};

use crate::ServerResult;
use crate::error::{AppError, Result};
use crate::routes::require_route;
use crate::state::StoreHandle;

fn not_found(id: i64) -> AppError {
    AppError::NotFound {
        kind: "timetable",
        id,
    }
}

fn entry_not_found(id: i64) -> AppError {
    AppError::NotFound { kind: "entry", id }
}

fn validate_service_name(service_name: &str) -> Result<()> {
    if service_name.trim().is_empty() {
        return Err(AppError::invalid("service_name must not be empty"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CreateTimetable {
    service_name: String,
    #[serde(default)]
    entries: Vec<EntryFields>,
    #[serde(default)]
    route_id: Option<i64>,
    #[serde(default)]
    train_id: Option<i64>,
    /// Trains to link to `route_id`. The first one becomes the timetable's
    /// train when `train_id` is absent.
    #[serde(default)]
    train_ids: Vec<i64>,
}

impl CreateTimetable {
    /// `train_id` followed by `train_ids`, without repeats.
    fn trains(&self) -> Vec<i64> {
        let mut trains: Vec<i64> = Vec::with_capacity(self.train_ids.len() + 1);
        for id in self.train_id.iter().chain(&self.train_ids) {
            if !trains.contains(id) {
                trains.push(*id);
            }
        }
        trains
    }
}

#[derive(Debug, Serialize)]
struct Created {
    id: i64,
    timetable: Timetable,
    entries: Vec<TimetableEntry>,
    submitted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub(crate) async fn list(store: web::Data<StoreHandle>) -> ServerResult {
    let timetables = store.run(|s| Ok(s.list_timetables()?)).await?;
    Ok(HttpResponse::Ok().json(timetables))
}

pub(crate) async fn get(store: web::Data<StoreHandle>, path: web::Path<i64>) -> ServerResult {
    let id = path.into_inner();
    let detail = store
        .run(move |s| s.timetable_detail(id)?.ok_or(not_found(id)))
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Create a timetable with its entries.
///
/// Every named train must exist before anything is written. When a route is
/// given, each of them is linked to it first. Entries
/// are written one at a time; if one fails the response is still 201 and
/// carries the entries that were stored plus an `error`.
pub(crate) async fn create(
    store: web::Data<StoreHandle>,
    body: web::Json<CreateTimetable>,
) -> ServerResult {
    let request = body.into_inner();
    validate_service_name(&request.service_name)?;
    let trains = request.trains();

    let created = store
        .run(move |s| {
            for train_id in &trains {
                if s.get_train(*train_id)?.is_none() {
                    return Err(AppError::invalid(format!(
                        "train {train_id} does not exist"
                    )));
                }
            }
            if let Some(route_id) = request.route_id {
                require_route(s, route_id)?;
                for train_id in &trains {
                    s.add_route_train(route_id, *train_id)?;
                }
            }
            let new = NewTimetable {
                header: TimetableFields {
                    service_name: request.service_name,
                    route_id: request.route_id,
                    train_id: trains.first().copied(),
                },
                entries: request.entries,
            };
            Ok(s.create_timetable(&new)?)
        })
        .await?;

    Ok(HttpResponse::Created().json(Created {
        id: created.timetable.id,
        timetable: created.timetable,
        entries: created.entries,
        submitted: created.submitted,
        error: created.interrupted.map(|e| e.to_string()),
    }))
}

pub(crate) async fn update(
    store: web::Data<StoreHandle>,
    path: web::Path<i64>,
    body: web::Json<TimetableFields>,
) -> ServerResult {
    let id = path.into_inner();
    let fields = body.into_inner();
    validate_service_name(&fields.service_name)?;
    let detail = store
        .run(move |s| {
            if !s.update_timetable(id, &fields)? {
                return Err(not_found(id));
            }
            s.timetable_detail(id)?.ok_or(not_found(id))
        })
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub(crate) async fn delete(store: web::Data<StoreHandle>, path: web::Path<i64>) -> ServerResult {
    let id = path.into_inner();
    store
        .run(move |s| match s.delete_timetable(id)? {
            true => Ok(()),
            false => Err(not_found(id)),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub(crate) async fn add_entry(
    store: web::Data<StoreHandle>,
    path: web::Path<i64>,
    body: web::Json<EntryFields>,
) -> ServerResult {
    let id = path.into_inner();
    let fields = body.into_inner();
    let entry = store
        .run(move |s| {
            s.get_timetable(id)?.ok_or(not_found(id))?;
            Ok(s.add_entry(id, &fields)?)
        })
        .await?;
    Ok(HttpResponse::Created().json(entry))
}

pub(crate) async fn update_entry(
    store: web::Data<StoreHandle>,
    path: web::Path<i64>,
    body: web::Json<EntryFields>,
) -> ServerResult {
    let id = path.into_inner();
    let fields = body.into_inner();
    let entry = store
        .run(move |s| {
            if !s.update_entry(id, &fields)? {
                return Err(entry_not_found(id));
            }
            s.get_entry(id)?.ok_or(entry_not_found(id))
        })
        .await?;
    Ok(HttpResponse::Ok().json(entry))
}

pub(crate) async fn delete_entry(
    store: web::Data<StoreHandle>,
    path: web::Path<i64>,
) -> ServerResult {
    let id = path.into_inner();
    store
        .run(move |s| match s.delete_entry(id)? {
            true => Ok(()),
            false => Err(entry_not_found(id)),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
