use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::{AdminUser, AuthUser},
        policy::{Admin, AnyOf, Owner},
    },
    error::AppError,
    export::{ExportFormat, UNSUPPORTED_FORMAT},
    state::AppState,
    users::{
        dto::{ExportRequest, SearchRequest, UserPayload},
        filter::UserFilter,
        repo_types::User,
        services,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/search", post(search_users))
        .route("/users/export", post(export_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::validation("Invalid userId format"))
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("User with ID {id} not found"))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list(&UserFilter::all()).await?;
    Ok(Json(users))
}

#[instrument(skip(state, _caller))]
pub async fn get_user(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&raw_id)?;
    let user = state.users.get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(user))
}

#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.user_id))]
pub async fn create_user(
    admin: AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let draft = payload.validate()?;

    let user = services::create_user(state.users.as_ref(), draft).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{}", user.id))],
        Json(user),
    ))
}

#[instrument(skip(state, caller, payload), fields(caller_id = %caller.0.user_id))]
pub async fn update_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&raw_id)?;
    let Json(payload) = payload?;
    let draft = payload.validate()?;

    let existing = state.users.get(id).await?.ok_or_else(|| not_found(id))?;
    caller.0.require(&AnyOf(Admin, Owner(id)))?;
    // owners may edit their own record but not their role
    if draft.is_admin != existing.is_admin {
        caller.0.require(&Admin)?;
    }

    let updated = services::update_user(state.users.as_ref(), existing, draft).await?;
    Ok(Json(updated))
}

#[instrument(skip(state, _admin))]
pub async fn delete_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&raw_id)?;
    if !state.users.delete(id).await? {
        return Err(not_found(id));
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, _admin, payload))]
pub async fn search_users(
    _admin: AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<User>>, AppError> {
    let Json(filters) = payload?;
    let filter = UserFilter::build(&filters);
    let users = state.users.list(&filter).await?;
    info!(count = users.len(), "search complete");
    Ok(Json(users))
}

#[instrument(skip(state, _admin, payload))]
pub async fn export_users(
    _admin: AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let format = request
        .format
        .as_deref()
        .and_then(ExportFormat::parse)
        .ok_or_else(|| {
            warn!(format = ?request.format, "unsupported export format");
            AppError::validation(UNSUPPORTED_FORMAT)
        })?;

    let filter = UserFilter::build(&request.filters);
    let users = state.users.list(&filter).await?;
    let export = state.exporter.export(&users, format).await?;

    let today = OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(anyhow::Error::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
            (HeaderName::from_static("current-date"), today),
            // always "1"; the renderer does not report a page count
            (HeaderName::from_static("page-number"), "1".to_string()),
        ],
        export.bytes,
    ))
}
