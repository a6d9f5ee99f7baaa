//! HTTP surface for the catalog editor.
//!
//! The router exposes the editor's operations as JSON endpoints for a thin
//! local UI. All requests share one [`Editor`] behind a mutex, so mutations are
//! applied one at a time in arrival order.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::domain::aggregates::{Draft, Product, ProductImage, StockLevel};
use crate::intake::{EditForm, EditSession, IncomingImage, ProductForm};
use crate::storage::KeyValueStorage;
use crate::store::{CatalogStats, ProductFilter, EXPORT_FILE_NAME};
use crate::{CatalogError, Editor, RestoredDraft, StorageError, ValidationError};

/// Large enough for an import file carrying several full-size images.
const BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub editor: Arc<Mutex<Editor>>,
}

impl AppState {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { editor: Arc::new(Mutex::new(Editor::open(storage))) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "catalog-editor"})) }))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/api/v1/products/:id/edit", get(edit_form))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/images", get(list_images).post(upload_image).delete(clear_images))
        .route("/api/v1/images/:index", delete(remove_image))
        .route("/api/v1/draft", get(show_draft).put(save_draft).delete(clear_draft))
        .route("/api/v1/draft/restore", post(restore_draft))
        .route("/api/v1/export", get(export_products))
        .route("/api/v1/import", post(import_products))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Responses
// =============================================================================

/// Payload plus the confirmations raised while producing it.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

fn respond<T>(editor: &mut Editor, data: T) -> Json<Envelope<T>> {
    let notices = editor.take_events().iter().map(|e| e.notice()).collect();
    Json(Envelope { data, notices })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_level: StockLevel,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self { stock_level: product.stock_level(), product: product.clone() }
    }
}

pub struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self { ApiError(err) }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self { ApiError(err.into()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CatalogError::Validation(ValidationError::InvalidForm(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            CatalogError::Validation(_) | CatalogError::Format(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Storage(StorageError::QuotaExceeded { .. }) => StatusCode::INSUFFICIENT_STORAGE,
            CatalogError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "message": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(s): State<AppState>, Query(filter): Query<ProductFilter>) -> Json<Vec<ProductView>> {
    let editor = s.editor.lock().await;
    Json(editor.store().list(&filter).into_iter().map(ProductView::from).collect())
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ProductView>> {
    let editor = s.editor.lock().await;
    let product = editor.store().find(&id).ok_or(CatalogError::NotFound(id))?;
    Ok(Json(product.into()))
}

async fn create_product(State(s): State<AppState>, Json(form): Json<ProductForm>) -> ApiResult<(StatusCode, Json<Envelope<Product>>)> {
    let mut editor = s.editor.lock().await;
    let product = editor.submit(form)?.clone();
    Ok((StatusCode::CREATED, respond(&mut editor, product)))
}

async fn edit_form(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<EditForm>> {
    let editor = s.editor.lock().await;
    let (_, form) = EditSession::begin(editor.store(), &id)?;
    Ok(Json(form))
}

async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(form): Json<EditForm>) -> ApiResult<Json<Envelope<Product>>> {
    let mut editor = s.editor.lock().await;
    let product = editor.edit(&id, form)?;
    Ok(respond(&mut editor, product))
}

async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Envelope<String>>> {
    let mut editor = s.editor.lock().await;
    if !editor.store_mut().remove(&id)? {
        return Err(CatalogError::NotFound(id).into());
    }
    Ok(respond(&mut editor, id))
}

async fn stats(State(s): State<AppState>) -> Json<CatalogStats> {
    Json(s.editor.lock().await.store().stats())
}

// =============================================================================
// Images
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UploadParams {
    name: Option<String>,
}

async fn list_images(State(s): State<AppState>) -> Json<Vec<ProductImage>> {
    Json(s.editor.lock().await.images().images().to_vec())
}

/// The body is the raw file; its media type comes from `Content-Type`.
async fn upload_image(State(s): State<AppState>, Query(params): Query<UploadParams>, headers: HeaderMap, body: Bytes) -> ApiResult<(StatusCode, Json<ProductImage>)> {
    let media_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    let file = IncomingImage { name: params.name.unwrap_or_else(|| "image".to_string()), media_type, bytes: body.to_vec() };
    let mut editor = s.editor.lock().await;
    let image = editor.images_mut().accept(file)?.clone();
    Ok((StatusCode::CREATED, Json(image)))
}

async fn remove_image(State(s): State<AppState>, Path(index): Path<usize>) -> Result<Json<ProductImage>, StatusCode> {
    s.editor.lock().await.images_mut().remove(index).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn clear_images(State(s): State<AppState>) -> StatusCode {
    s.editor.lock().await.images_mut().clear();
    StatusCode::NO_CONTENT
}

// =============================================================================
// Drafts
// =============================================================================

async fn show_draft(State(s): State<AppState>) -> Json<Option<Draft>> {
    Json(s.editor.lock().await.draft())
}

async fn restore_draft(State(s): State<AppState>) -> Json<Option<RestoredDraft>> {
    Json(s.editor.lock().await.restore_draft())
}

async fn save_draft(State(s): State<AppState>, Json(form): Json<ProductForm>) -> ApiResult<Json<Envelope<()>>> {
    let mut editor = s.editor.lock().await;
    editor.save_draft(form)?;
    Ok(respond(&mut editor, ()))
}

async fn clear_draft(State(s): State<AppState>) -> ApiResult<Json<Envelope<()>>> {
    let mut editor = s.editor.lock().await;
    editor.clear_form()?;
    Ok(respond(&mut editor, ()))
}

// =============================================================================
// Export / Import
// =============================================================================

async fn export_products(State(s): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = s.editor.lock().await.store().export_json()?;
    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    Ok(([(header::CONTENT_TYPE, "application/json".to_string()), (header::CONTENT_DISPOSITION, disposition)], body))
}

#[derive(Debug, Serialize)]
struct ImportSummary {
    imported: usize,
}

async fn import_products(State(s): State<AppState>, body: String) -> ApiResult<Json<Envelope<ImportSummary>>> {
    let mut editor = s.editor.lock().await;
    let imported = editor.store_mut().import_json(&body)?;
    Ok(respond(&mut editor, ImportSummary { imported }))
}
