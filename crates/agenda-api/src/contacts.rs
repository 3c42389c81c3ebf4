use axum::{
    Extension, Json,
    extract::State,
};

use agenda_db::models::ContactFields;
use agenda_types::api::{Claims, ContactRequest, Page, SuccessResponse};
use agenda_types::models::Contact;

use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::pagination::PageParams;
use crate::validate::required;
use crate::{AppState, run_blocking};

fn contact_fields(req: ContactRequest) -> Result<ContactFields, ApiError> {
    Ok(ContactFields {
        name: required(req.name, "name")?,
        identity: req.identity,
        tags: req.tags.map(|t| t.joined()).filter(|t| !t.is_empty()),
        description: req.description,
        avatar_url: req.avatar_url,
    })
}

/// GET /api/contacts: always paginated, 50 per page unless asked otherwise.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<Contact>>, ApiError> {
    let owner = claims.sub;
    let page = params.or_default();

    let (rows, total) = run_blocking(move || {
        let total = state.db.count_contacts(owner)?;
        let rows = state.db.list_contacts(owner, Some(page.window()))?;
        Ok((rows, total))
    })
    .await?;

    let items = rows.into_iter().map(Contact::from).collect();
    Ok(Json(page.into_page(items, total)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Contact>, ApiError> {
    let row = run_blocking(move || state.db.get_contact(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound("Contact"))?;
    Ok(Json(row.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ContactRequest>,
) -> Result<Json<Contact>, ApiError> {
    let fields = contact_fields(req)?;
    let row = run_blocking(move || state.db.insert_contact(claims.sub, &fields)).await?;
    Ok(Json(row.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ContactRequest>,
) -> Result<Json<Contact>, ApiError> {
    let fields = contact_fields(req)?;
    let row = run_blocking(move || state.db.update_contact(claims.sub, id, &fields))
        .await?
        .ok_or(ApiError::NotFound("Contact"))?;
    Ok(Json(row.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !run_blocking(move || state.db.delete_contact(claims.sub, id)).await? {
        return Err(ApiError::NotFound("Contact"));
    }
    Ok(Json(SuccessResponse::ok()))
}
