//! Inventory routes, mounted once per category

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    middleware,
    response::IntoResponse,
    routing::get,
};
use domain::summarize;
use serde_json::json;
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, ApiResult, internal},
    middleware::require_category,
    models::{
        ItemPage, ListQuery,
        inventory::InventoryRecord,
    },
    report::{self, Report},
};

/// Routes for the category of `R`, guarded by the access policy
pub fn routes<R: InventoryRecord>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/summary", get(summary::<R>))
        .route("/export.pdf", get(export::<R>))
        .route("/:id", get(show::<R>).put(update::<R>).delete(remove::<R>))
        .route_layer(middleware::from_fn(require_category::<R>))
}

/// List records with search and pagination
pub async fn list<R: InventoryRecord>(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ItemPage<R>>> {
    let page = query.page();
    let per_page = state.settings.page_size;

    let (items, total) = state
        .inventory_repository
        .list::<R>(query.search(), page, per_page)
        .await
        .map_err(internal("list inventory records"))?;

    Ok(Json(ItemPage {
        items,
        page,
        per_page,
        total,
    }))
}

/// Get a record by ID
pub async fn show<R: InventoryRecord>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<R>> {
    let item = state
        .inventory_repository
        .get::<R>(id)
        .await
        .map_err(internal("get inventory record"))?
        .ok_or(ApiError::NotFound("Item"))?;

    Ok(Json(item))
}

/// Create a record
pub async fn create<R: InventoryRecord>(
    State(state): State<AppState>,
    Json(form): Json<R::Form>,
) -> ApiResult<impl IntoResponse> {
    let fields = R::into_fields(form).map_err(ApiError::BadRequest)?;

    let item = state
        .inventory_repository
        .insert::<R>(fields)
        .await
        .map_err(internal("create inventory record"))?;

    info!("Created {} record {}", R::CATEGORY, item.id());

    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a record
pub async fn update<R: InventoryRecord>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<R::Form>,
) -> ApiResult<Json<R>> {
    let fields = R::into_fields(form).map_err(ApiError::BadRequest)?;

    let item = state
        .inventory_repository
        .update::<R>(id, fields)
        .await
        .map_err(internal("update inventory record"))?
        .ok_or(ApiError::NotFound("Item"))?;

    info!("Updated {} record {}", R::CATEGORY, id);

    Ok(Json(item))
}

/// Delete a record
pub async fn remove<R: InventoryRecord>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state
        .inventory_repository
        .delete::<R>(id)
        .await
        .map_err(internal("delete inventory record"))?;

    if !deleted {
        return Err(ApiError::NotFound("Item"));
    }

    info!("Deleted {} record {}", R::CATEGORY, id);

    Ok(Json(json!({"message": "Item deleted successfully"})))
}

/// Status counts over the records matching `q`
pub async fn summary<R: InventoryRecord>(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let statuses = state
        .inventory_repository
        .statuses::<R>(query.search())
        .await
        .map_err(internal("load inventory statuses"))?;

    Ok(Json(summarize(statuses)))
}

/// PDF table of the records matching `q`
pub async fn export<R: InventoryRecord>(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let items = state
        .inventory_repository
        .list_all::<R>(query.search())
        .await
        .map_err(internal("load inventory records for export"))?;

    let report = Report {
        title: &state.settings.name,
        category: R::CATEGORY,
        summary: summarize(items.iter().map(|item| item.status())),
        headers: R::EXPORT_HEADERS,
        rows: items.iter().map(|item| item.export_row()).collect(),
    };

    let bytes = report::render(&report).map_err(internal("render inventory report"))?;

    let disposition = format!(
        "attachment; filename=\"{}.pdf\"",
        R::CATEGORY.slug()
    );

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
