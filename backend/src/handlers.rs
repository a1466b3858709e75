use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::issuance;
use crate::models::{Listing, ListingSummary, NewListingRequest};
use crate::{storage, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub price: i64,
    pub location: String,
    pub purpose: String,
    pub identity: String,
    pub description: String,
    pub images: Vec<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub owner_email: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            code: listing.code,
            title: listing.title,
            price: listing.price,
            location: listing.location,
            purpose: listing.purpose,
            identity: listing.identity,
            description: listing.description,
            images: listing.images,
            contact_name: listing.contact_name,
            contact_phone: listing.contact_phone,
            owner_email: listing.owner_email,
            verified: listing.verified,
            created_at: listing.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListingResponse {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub location: String,
    pub purpose: String,
    pub verified: bool,
}

impl From<ListingSummary> for AdminListingResponse {
    fn from(summary: ListingSummary) -> Self {
        Self {
            id: summary.id,
            code: summary.code,
            title: summary.title,
            location: summary.location,
            purpose: summary.purpose,
            verified: summary.verified,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveUserRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: Uuid,
}

/// Runs a store call on the blocking pool; r2d2 and Diesel are synchronous.
async fn run_blocking<T, E, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(Into::into),
        Err(e) => Err(ApiError::Internal(format!("Blocking task failed: {}", e))),
    }
}

pub async fn list_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListingResponse>>, ApiError> {
    let store = state.store.clone();
    let listings = run_blocking(move || store.list_listings()).await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ListingResponse>, ApiError> {
    let store = state.store.clone();
    let listing = run_blocking(move || store.get_listing(listing_id))
        .await?
        .ok_or(ApiError::NotFound("Listing"))?;
    Ok(Json(listing.into()))
}

pub async fn create_listing(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<NewListingRequest>,
) -> Result<(StatusCode, Json<ListingResponse>), ApiError> {
    if request.contact_phone.len() != 10
        || !request.contact_phone.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ApiError::BadRequest(
            "Contact phone must be exactly 10 digits".to_string(),
        ));
    }

    let store = state.store.clone();
    let listing =
        run_blocking(move || issuance::issue_listing(store.as_ref(), &user.email, request)).await?;
    Ok((StatusCode::CREATED, Json(listing.into())))
}

pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?;
        let url = storage::store_image(&state.config.upload_dir, &file_name, &bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store image: {}", e)))?;
        return Ok(Json(json!({ "url": url })));
    }
    Err(ApiError::BadRequest("No file provided".to_string()))
}

pub async fn save_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SaveUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = state.store.clone();
    run_blocking(move || store.save_user(&user.email, request.name.as_deref())).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn admin_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminListingResponse>>, ApiError> {
    let store = state.store.clone();
    let summaries = run_blocking(move || store.admin_listings()).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

pub async fn verify_listing(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = state.store.clone();
    let updated = run_blocking(move || store.mark_verified(request.id)).await?;
    if !updated {
        return Err(ApiError::NotFound("Listing"));
    }
    log::info!("Listing {} marked verified", request.id);
    Ok(Json(json!({ "success": true })))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = state.store.clone();
    let deleted = run_blocking(move || store.delete_listing(request.id)).await?;
    if !deleted {
        return Err(ApiError::NotFound("Listing"));
    }
    log::info!("Listing {} deleted", request.id);
    Ok(Json(json!({ "success": true })))
}
