// src/handlers/results.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::MAX_LIST_LIMIT,
    error::AppError,
    models::exam_result::{
        CreateExamResultRequest, ExamResult, MarksUpdate, ResultListParams, UpdateExamResultRequest,
    },
    state::SharedResults,
    store::ResultQuery,
};

/// Lists results matching every supplied filter, oldest first.
pub async fn list_results(
    State(results): State<SharedResults>,
    Query(params): Query<ResultListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = ResultQuery {
        school_id: params.school_id,
        class_id: params.class_id,
        section_id: params.section_id,
        subject_id: params.subject_id,
        student_id: params.student_id,
        order_by_score_desc: false,
        limit: Some(params.limit.unwrap_or(MAX_LIST_LIMIT).min(MAX_LIST_LIMIT)),
    };

    let found = results.find(&query).await?;

    Ok(Json(found))
}

pub async fn get_result(
    State(results): State<SharedResults>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = results
        .get(&id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    Ok(Json(result))
}

/// Records a graded attempt. Ranks stay empty until the next computation.
/// Staff only.
pub async fn create_result(
    State(results): State<SharedResults>,
    Json(payload): Json<CreateExamResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let record = ExamResult::from_request(payload, Utc::now());

    results.insert(&record).await.map_err(|e| {
        tracing::error!("Failed to create exam result: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Corrects marks on a result and re-derives its percentage.
/// Stored ranks are left as they are until ranks are recomputed.
/// Staff only.
pub async fn update_result(
    State(results): State<SharedResults>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateExamResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let current = results
        .get(&id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    let update = MarksUpdate::merge(&current, &payload, Utc::now())?;

    if !results.update_marks(&id, &update).await? {
        return Err(AppError::NotFound("Result not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Staff only.
pub async fn delete_result(
    State(results): State<SharedResults>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = results.delete(&id).await.map_err(|e| {
        tracing::error!("Failed to delete exam result: {:?}", e);
        AppError::from(e)
    })?;

    if !deleted {
        return Err(AppError::NotFound("Result not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
