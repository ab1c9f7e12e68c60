use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::catalog::{Recommendation, RecommendationCatalog};
use super::domain::{
    ItemCategory, ItemDraft, ItemId, ItemUpdate, ProfileUpdate, UserDraft, UserId, WeightUnit,
};
use super::repository::{ItemRepository, Mailer, RepositoryError, UserRepository};
use super::service::{KitService, KitServiceError};

/// Header carrying the caller's identity. Session handling is expected to sit
/// in front of this service and inject it.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared state for the kit routes.
pub struct KitRouterState<I, U, M> {
    pub service: Arc<KitService<I, U, M>>,
    pub catalog: Arc<RecommendationCatalog>,
}

impl<I, U, M> Clone for KitRouterState<I, U, M> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

/// Router builder exposing the HTTP surface of the bag tracker.
pub fn kit_router<I, U, M>(
    service: Arc<KitService<I, U, M>>,
    catalog: Arc<RecommendationCatalog>,
) -> Router
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    Router::new()
        .route("/api/users", post(register_handler::<I, U, M>))
        .route(
            "/api/users/me",
            get(profile_handler::<I, U, M>).put(update_profile_handler::<I, U, M>),
        )
        .route(
            "/api/users/me/email-verification",
            post(confirm_email_handler::<I, U, M>),
        )
        .route(
            "/api/items",
            get(list_items_handler::<I, U, M>).post(create_item_handler::<I, U, M>),
        )
        .route(
            "/api/items/:item_id",
            get(item_handler::<I, U, M>)
                .put(update_item_handler::<I, U, M>)
                .delete(delete_item_handler::<I, U, M>),
        )
        .route("/api/alerts", get(alerts_handler::<I, U, M>))
        .route("/api/summary", get(summary_handler::<I, U, M>))
        .route(
            "/api/recommendations",
            get(recommendations_handler::<I, U, M>),
        )
        .route(
            "/api/recommendations/essential",
            get(essential_recommendations_handler::<I, U, M>),
        )
        .with_state(KitRouterState { service, catalog })
}

fn identity(headers: &HeaderMap) -> Result<UserId, Response> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match raw {
        Some(id) => Ok(UserId(id.to_string())),
        None => {
            let payload = json!({ "error": "missing or empty x-user-id header" });
            Err((StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response())
        }
    }
}

fn error_response(error: KitServiceError) -> Response {
    let status = match &error {
        KitServiceError::InvalidItem(_) | KitServiceError::InvalidUser(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        KitServiceError::ItemNotFound | KitServiceError::UserNotFound => StatusCode::NOT_FOUND,
        KitServiceError::ForeignItem => StatusCode::FORBIDDEN,
        KitServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        KitServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        KitServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn register_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    axum::Json(draft): axum::Json<UserDraft>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    match state.service.register_user(draft) {
        Ok(profile) => (StatusCode::CREATED, axum::Json(profile)).into_response(),
        Err(KitServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "a user with this e-mail already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn profile_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.profile(&user) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_profile_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<ProfileUpdate>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.update_profile(&user, update) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirm_email_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.confirm_email(&user) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_items_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.items(&user) {
        Ok(items) => (StatusCode::OK, axum::Json(items)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_item_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<ItemDraft>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.create_item(&user, draft) {
        Ok(item) => (StatusCode::CREATED, axum::Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn item_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.item(&user, &ItemId(item_id)) {
        Ok(item) => (StatusCode::OK, axum::Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_item_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
    axum::Json(update): axum::Json<ItemUpdate>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.update_item(&user, &ItemId(item_id), update) {
        Ok(item) => (StatusCode::OK, axum::Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_item_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.delete_item(&user, &ItemId(item_id)) {
        Ok(()) => {
            let payload = json!({ "message": "Item removed" });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlertsQuery {
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn alerts_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
    Query(query): Query<AlertsQuery>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());

    match state.service.expiration_alerts(&user, today) {
        Ok(items) => (StatusCode::OK, axum::Json(items)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryQuery {
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn summary_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    headers: HeaderMap,
    Query(query): Query<SummaryQuery>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let user = match identity(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let unit = match query.unit.as_deref() {
        None => WeightUnit::Kilograms,
        Some(raw) => {
            let coerced = WeightUnit::coerce(raw);
            if coerced.assumed_grams {
                warn!(unit = raw, "unknown weight unit in query, assuming grams");
            }
            coerced.unit
        }
    };
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());

    match state.service.kit_summary(&user, unit, today) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationQuery {
    #[serde(default)]
    category: Option<String>,
}

pub(crate) async fn recommendations_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
    Query(query): Query<RecommendationQuery>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    let entries: Vec<&Recommendation> = match query.category.as_deref() {
        None => state.catalog.entries().iter().collect(),
        Some(raw) => match ItemCategory::from_label(raw) {
            Some(category) => state.catalog.by_category(category),
            // An unknown category names nothing, so it matches nothing.
            None => Vec::new(),
        },
    };

    (StatusCode::OK, axum::Json(entries)).into_response()
}

pub(crate) async fn essential_recommendations_handler<I, U, M>(
    State(state): State<KitRouterState<I, U, M>>,
) -> Response
where
    I: ItemRepository + 'static,
    U: UserRepository + 'static,
    M: Mailer + 'static,
{
    (StatusCode::OK, axum::Json(state.catalog.essentials())).into_response()
}
