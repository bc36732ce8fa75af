// src/handlers/students.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::student::{CreateStudentRequest, StudentListParams},
    state::SharedStudents,
};

/// Lists students, optionally narrowed to a school, class or section.
pub async fn list_students(
    State(students): State<SharedStudents>,
    Query(params): Query<StudentListParams>,
) -> Result<impl IntoResponse, AppError> {
    let list = students.list_students(&params).await?;

    Ok(Json(list))
}

pub async fn get_student(
    State(students): State<SharedStudents>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let student = students
        .get_student(&id)
        .await?
        .ok_or(AppError::NotFound("Student not found".to_string()))?;

    Ok(Json(student))
}

/// Enrols a student into a section.
/// Staff only.
pub async fn create_student(
    State(students): State<SharedStudents>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let student = payload.into_student(Utc::now());

    students.insert_student(&student).await.map_err(|e| {
        tracing::error!("Failed to create student: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(student)))
}

/// Removes a student. Their exam results are kept.
/// Staff only.
pub async fn delete_student(
    State(students): State<SharedStudents>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !students.delete_student(&id).await? {
        return Err(AppError::NotFound("Student not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
