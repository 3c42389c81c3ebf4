use axum::{
    Extension, Json,
    extract::State,
};

use agenda_db::models::CourseFields;
use agenda_types::api::{Claims, CourseRequest, Listing, SuccessResponse};
use agenda_types::models::Course;

use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::pagination::PageParams;
use crate::validate::{clock_time, required, weekday};
use crate::{AppState, run_blocking};

fn course_fields(req: CourseRequest) -> Result<CourseFields, ApiError> {
    Ok(CourseFields {
        name: required(req.name, "name")?,
        day_of_week: weekday(req.day_of_week)?,
        start_time: clock_time(req.start_time, "start_time")?,
        end_time: clock_time(req.end_time, "end_time")?,
        location: req.location,
        teacher: req.teacher,
        color: req.color,
    })
}

/// GET /api/courses. The whole week as a bare array unless `page` and `limit`
/// are both given.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Listing<Course>>, ApiError> {
    let owner = claims.sub;

    match params.explicit() {
        Some(page) => {
            let (rows, total) = run_blocking(move || {
                let total = state.db.count_courses(owner)?;
                let rows = state.db.list_courses(owner, Some(page.window()))?;
                Ok((rows, total))
            })
            .await?;
            let items = rows.into_iter().map(Course::from).collect();
            Ok(Json(Listing::Paged(page.into_page(items, total))))
        }
        None => {
            let rows = run_blocking(move || state.db.list_courses(owner, None)).await?;
            Ok(Json(Listing::All(rows.into_iter().map(Course::from).collect())))
        }
    }
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Course>, ApiError> {
    let row = run_blocking(move || state.db.get_course(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound("Course"))?;
    Ok(Json(row.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CourseRequest>,
) -> Result<Json<Course>, ApiError> {
    let fields = course_fields(req)?;
    let row = run_blocking(move || state.db.insert_course(claims.sub, &fields)).await?;
    Ok(Json(row.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<CourseRequest>,
) -> Result<Json<Course>, ApiError> {
    let fields = course_fields(req)?;
    let row = run_blocking(move || state.db.update_course(claims.sub, id, &fields))
        .await?
        .ok_or(ApiError::NotFound("Course"))?;
    Ok(Json(row.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !run_blocking(move || state.db.delete_course(claims.sub, id)).await? {
        return Err(ApiError::NotFound("Course"));
    }
    Ok(Json(SuccessResponse::ok()))
}
