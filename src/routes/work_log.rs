use crate::auth::BearerUser;
use crate::database::postgres_repository::Store;
use crate::database::work_log::WorkLogRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::work_log::{EntryFilter, MessageResponse, WorkLogCreatedResponse, WorkLogListResponse, WorkLogRequest, WorkLogResponse};
use crate::routes::Created;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use tracing::info;
use validator::Validate;

#[allow(clippy::result_large_err)]
fn parse_id(id: &str) -> Result<i64, AppError> {
    id.parse::<i64>().map_err(|_| AppError::BadRequest("Invalid worklog id".to_string()))
}

fn not_found() -> AppError {
    AppError::NotFound("Worklog not found".to_string())
}

/// List the caller's entries, newest first
#[openapi(tag = "Worklogs")]
#[get("/?<date_from>&<date_to>&<search>")]
pub async fn list_worklogs(
    store: &State<Store>,
    user: BearerUser,
    date_from: Option<String>,
    date_to: Option<String>,
    search: Option<String>,
) -> Result<Json<WorkLogListResponse>, AppError> {
    let filter = EntryFilter::from_query(date_from, date_to, search)?;
    let entries = store.list_entries(user.user_id, &filter).await?;

    Ok(Json(WorkLogListResponse {
        data: entries.iter().map(WorkLogResponse::from).collect(),
    }))
}

/// Record a new entry
#[openapi(tag = "Worklogs")]
#[post("/", data = "<payload>")]
pub async fn create_worklog(store: &State<Store>, user: BearerUser, payload: JsonBody<WorkLogRequest>) -> Result<Created<WorkLogCreatedResponse>, AppError> {
    payload.validate()?;

    let entry = store.create_entry(user.user_id, &payload).await?;
    info!(user_id = user.user_id, entry_id = entry.id, "worklog created");

    Ok(Created(WorkLogCreatedResponse {
        message: "Worklog created".to_string(),
        id: entry.id,
    }))
}

/// Replace an entry owned by the caller
#[openapi(tag = "Worklogs")]
#[put("/<id>", data = "<payload>")]
pub async fn update_worklog(store: &State<Store>, user: BearerUser, id: &str, payload: JsonBody<WorkLogRequest>) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(id)?;
    payload.validate()?;

    if !store.update_entry(id, user.user_id, &payload).await? {
        return Err(not_found());
    }
    info!(user_id = user.user_id, entry_id = id, "worklog updated");

    Ok(Json(MessageResponse {
        message: "Worklog updated".to_string(),
    }))
}

/// Delete an entry owned by the caller
#[openapi(tag = "Worklogs")]
#[delete("/<id>")]
pub async fn delete_worklog(store: &State<Store>, user: BearerUser, id: &str) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(id)?;

    if !store.delete_entry(id, user.user_id).await? {
        return Err(not_found());
    }
    info!(user_id = user.user_id, entry_id = id, "worklog deleted");

    Ok(Json(MessageResponse {
        message: "Worklog deleted".to_string(),
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_worklogs, create_worklog, update_worklog, delete_worklog]
}
