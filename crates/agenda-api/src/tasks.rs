use axum::{
    Extension, Json,
    extract::State,
};

use agenda_db::Window;
use agenda_db::models::TaskFields;
use agenda_types::api::{Claims, Listing, SuccessResponse, TaskRequest};
use agenda_types::models::{Task, TaskKind};

use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::pagination::{PageParams, UNPAGED_TASK_CAP};
use crate::validate::required;
use crate::{AppState, run_blocking};

fn task_fields(req: TaskRequest) -> Result<TaskFields, ApiError> {
    let title = required(req.title, "title")?;
    let kind = required(req.kind, "type")?
        .parse::<TaskKind>()
        .map_err(|_| ApiError::Validation("type must be 'homework' or 'task'".to_string()))?;

    Ok(TaskFields {
        title,
        kind,
        start_date: req.start_date,
        due_date: req.due_date,
        description: req.description,
    })
}

/// GET /api/tasks. Paginated envelope when both `page` and `limit` are given,
/// otherwise a bare array of at most 500 tasks for older clients.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Listing<Task>>, ApiError> {
    let owner = claims.sub;

    match params.explicit() {
        Some(page) => {
            let (rows, total) = run_blocking(move || {
                let total = state.db.count_tasks(owner)?;
                let rows = state.db.list_tasks(owner, Some(page.window()))?;
                Ok((rows, total))
            })
            .await?;
            let items = rows.into_iter().map(Task::from).collect();
            Ok(Json(Listing::Paged(page.into_page(items, total))))
        }
        None => {
            let rows = run_blocking(move || {
                state.db.list_tasks(owner, Some(Window::new(UNPAGED_TASK_CAP, 0)))
            })
            .await?;
            Ok(Json(Listing::All(rows.into_iter().map(Task::from).collect())))
        }
    }
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Task>, ApiError> {
    let row = run_blocking(move || state.db.get_task(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound("Task"))?;
    Ok(Json(row.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let fields = task_fields(req)?;
    let row = run_blocking(move || state.db.insert_task(claims.sub, &fields)).await?;
    Ok(Json(row.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let fields = task_fields(req)?;
    let row = run_blocking(move || state.db.update_task(claims.sub, id, &fields))
        .await?
        .ok_or(ApiError::NotFound("Task"))?;
    Ok(Json(row.into()))
}

/// PATCH /api/tasks/{id}/toggle
pub async fn toggle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !run_blocking(move || state.db.toggle_task(claims.sub, id)).await? {
        return Err(ApiError::NotFound("Task"));
    }
    Ok(Json(SuccessResponse::ok()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !run_blocking(move || state.db.delete_task(claims.sub, id)).await? {
        return Err(ApiError::NotFound("Task"));
    }
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: Option<&str>, kind: Option<&str>) -> TaskRequest {
        TaskRequest {
            title: title.map(Into::into),
            kind: kind.map(Into::into),
            start_date: None,
            due_date: Some("2026-11-01".into()),
            description: None,
        }
    }

    #[test]
    fn accepts_known_types() {
        let fields = task_fields(request(Some("t"), Some("homework"))).unwrap();
        assert_eq!(fields.kind, TaskKind::Homework);
        assert_eq!(fields.due_date.as_deref(), Some("2026-11-01"));
    }

    #[test]
    fn rejects_missing_title_or_bad_type() {
        assert!(task_fields(request(None, Some("task"))).is_err());
        assert!(task_fields(request(Some("t"), None)).is_err());
        assert!(task_fields(request(Some("t"), Some("chore"))).is_err());
    }
}
