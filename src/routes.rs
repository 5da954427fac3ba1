use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::filtering::{QueryParams, SchemaRegistry, translate};
use crate::openapi;
use crate::pagination::calculate_content_range;
use crate::resources::{self, Dock, Port};
use crate::response::ApiResponse;
use crate::traits::Resource;
use crate::validation::{BodyMode, BodySchema, validate_id};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub schemas: Arc<SchemaRegistry>,
}

impl AppState {
    /// State for `db` with the query schemas of all served entities.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            schemas: Arc::new(resources::schema_registry()),
        }
    }
}

/// `GET /`: filtered, sorted and paginated list.
pub async fn get_all<T: Resource>(
    State(state): State<AppState>,
    query: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable query string");
        ApiError::bad_request("Invalid query parameters")
    })?;

    let schema = state.schemas.get(T::KIND).ok_or_else(|| {
        ApiError::internal(
            "Query schema unavailable",
            Some(format!("no query schema registered for {}", T::KIND)),
        )
    })?;

    let sanitized = schema
        .validate(&params)
        .map_err(|errors| ApiError::validation_failed("Invalid query parameters", errors))?;
    let criteria = translate(&sanitized, schema.fields());

    let page = T::find_many(&state.db, &criteria).await?;
    let headers = calculate_content_range(criteria.offset, criteria.limit, page.count, T::RESOURCE_NAME_PLURAL);

    Ok(ApiResponse::new(page, format!("{} successfully recovered", T::LABEL_PLURAL)).with(StatusCode::OK, headers))
}

pub async fn get_one<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validate_id(&id)?;
    let item = T::get_one(&state.db, id).await?;
    Ok(ApiResponse::new(item, format!("{} recovered correctly", T::LABEL_SINGULAR)).into_response())
}

pub async fn create_one<T: Resource>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let data: T::CreateModel = read_body(T::body_schema(), body, BodyMode::Full)?;
    let created = T::create(&state.db, data).await?;

    tracing::info!(entity = %T::KIND, "created");
    Ok(ApiResponse::new(created, format!("{} created correctly", T::LABEL_SINGULAR))
        .with(StatusCode::CREATED, HeaderMap::new()))
}

/// `PUT /{id}`: every field required.
pub async fn replace_one<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = validate_id(&id)?;
    let data: T::CreateModel = read_body(T::body_schema(), body, BodyMode::Full)?;
    let rows = T::update(&state.db, id, data.into()).await?;
    updated::<T>(rows)
}

/// `PATCH /{id}`: any non-empty subset of fields.
pub async fn update_one<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = validate_id(&id)?;
    let data: T::UpdateModel = read_body(T::body_schema(), body, BodyMode::Partial)?;
    let rows = T::update(&state.db, id, data.into()).await?;
    updated::<T>(rows)
}

pub async fn delete_one<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id(&id)?;
    if T::delete(&state.db, id).await? == 0 {
        return Err(ApiError::not_found(T::RESOURCE_NAME_SINGULAR, None));
    }

    tracing::info!(entity = %T::KIND, id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn updated<T: Resource>(rows: u64) -> Result<Response, ApiError> {
    if rows == 0 {
        return Err(ApiError::custom(
            StatusCode::NOT_FOUND,
            format!("{} not found or without changes", T::RESOURCE_NAME_SINGULAR),
            None,
        ));
    }
    Ok(ApiResponse::new(rows, format!("{} updated correctly", T::LABEL_SINGULAR)).into_response())
}

/// Validates a JSON body against `schema` and reads the cleaned object into `M`.
fn read_body<M: DeserializeOwned>(
    schema: &BodySchema,
    body: Result<Json<Value>, JsonRejection>,
    mode: BodyMode,
) -> Result<M, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable request body");
        ApiError::bad_request("Invalid request data")
    })?;

    let clean = schema.validate(&body, mode)?;
    serde_json::from_value(Value::Object(clean))
        .map_err(|err| ApiError::internal("Failed to read request data", Some(err.to_string())))
}

async fn health(State(state): State<AppState>) -> Result<Response, ApiError> {
    if let Err(err) = state.db.ping().await {
        return Err(ApiError::custom(
            StatusCode::SERVICE_UNAVAILABLE,
            "Database unavailable",
            Some(err.to_string()),
        ));
    }
    Ok(ApiResponse::new(json!({"status": "up"}), "Service healthy").into_response())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::document())
}

async fn fallback() -> ApiError {
    ApiError::not_found("API Endpoint", None)
}

/// List / get / create / replace / update / delete routes for one entity.
pub fn resource_routes<T: Resource>() -> Router<AppState> {
    Router::new().route("/", get(get_all::<T>).post(create_one::<T>)).route(
        "/{id}",
        get(get_one::<T>)
            .put(replace_one::<T>)
            .patch(update_one::<T>)
            .delete(delete_one::<T>),
    )
}

/// The full API without transport middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/puertos", resource_routes::<Port>())
        .nest("/api/muelles", resource_routes::<Dock>())
        .route("/api/openapi.json", get(openapi_json))
        .route("/health", get(health))
        .fallback(fallback)
        .with_state(state)
}
