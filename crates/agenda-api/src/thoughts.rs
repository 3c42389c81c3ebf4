use axum::{
    Extension, Json,
    extract::State,
};

use agenda_db::models::ThoughtFields;
use agenda_types::api::{Claims, Page, SuccessResponse, ThoughtRequest};
use agenda_types::models::Thought;

use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::pagination::PageParams;
use crate::validate::required;
use crate::{AppState, run_blocking};

fn thought_fields(req: ThoughtRequest) -> Result<ThoughtFields, ApiError> {
    Ok(ThoughtFields {
        title: required(req.title, "title")?,
        content: req.content,
        related_contact_id: req.related_contact_id,
    })
}

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<Thought>>, ApiError> {
    let owner = claims.sub;
    let page = params.or_default();

    let (rows, total) = run_blocking(move || {
        let total = state.db.count_thoughts(owner)?;
        let rows = state.db.list_thoughts(owner, Some(page.window()))?;
        Ok((rows, total))
    })
    .await?;

    let items = rows.into_iter().map(Thought::from).collect();
    Ok(Json(page.into_page(items, total)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Thought>, ApiError> {
    let row = run_blocking(move || state.db.get_thought(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound("Thought"))?;
    Ok(Json(row.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ThoughtRequest>,
) -> Result<Json<Thought>, ApiError> {
    let fields = thought_fields(req)?;
    let row = run_blocking(move || state.db.insert_thought(claims.sub, &fields)).await?;
    Ok(Json(row.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ThoughtRequest>,
) -> Result<Json<Thought>, ApiError> {
    let fields = thought_fields(req)?;
    let row = run_blocking(move || state.db.update_thought(claims.sub, id, &fields))
        .await?
        .ok_or(ApiError::NotFound("Thought"))?;
    Ok(Json(row.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !run_blocking(move || state.db.delete_thought(claims.sub, id)).await? {
        return Err(ApiError::NotFound("Thought"));
    }
    Ok(Json(SuccessResponse::ok()))
}
