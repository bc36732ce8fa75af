// src/models/exam_result.rs

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::scope::not_blank;

/// Represents the 'exam_results' table in the database.
/// One student's outcome on one subject within one school/class/section.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: String,
    pub school_id: String,
    pub class_id: String,
    pub section_id: String,
    pub subject_id: String,
    pub student_id: String,
    pub score: f64,
    pub max_marks: f64,

    /// `100 * score / max_marks`, stored alongside the raw marks.
    pub percentage: f64,

    /// Written only by the ranking engine. Absent until the first computation.
    pub rank_in_class: Option<i32>,
    pub rank_in_section: Option<i32>,

    pub result_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExamResult {
    /// Builds a fresh, unranked record from a validated create request.
    pub fn from_request(req: CreateExamResultRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            percentage: percentage(req.score, req.max_marks),
            school_id: req.school_id,
            class_id: req.class_id,
            section_id: req.section_id,
            subject_id: req.subject_id,
            student_id: req.student_id,
            score: req.score,
            max_marks: req.max_marks,
            rank_in_class: None,
            rank_in_section: None,
            result_date: req.result_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn percentage(score: f64, max_marks: f64) -> f64 {
    if max_marks > 0.0 {
        100.0 * score / max_marks
    } else {
        0.0
    }
}

fn score_exceeds_max() -> ValidationError {
    ValidationError::new("score_exceeds_max_marks")
        .with_message(Cow::Borrowed("score must not exceed maxMarks"))
}

fn validate_score_within_max(req: &CreateExamResultRequest) -> Result<(), ValidationError> {
    if req.score > req.max_marks {
        return Err(score_exceeds_max());
    }
    Ok(())
}

/// DTO for recording a graded attempt.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_score_within_max))]
pub struct CreateExamResultRequest {
    #[validate(length(max = 64), custom(function = not_blank, message = "schoolId is required"))]
    pub school_id: String,
    #[validate(length(max = 64), custom(function = not_blank, message = "classId is required"))]
    pub class_id: String,
    #[validate(length(max = 64), custom(function = not_blank, message = "sectionId is required"))]
    pub section_id: String,
    #[validate(length(max = 64), custom(function = not_blank, message = "subjectId is required"))]
    pub subject_id: String,
    #[validate(length(max = 64), custom(function = not_blank, message = "studentId is required"))]
    pub student_id: String,
    #[validate(range(min = 0.0, message = "score must not be negative"))]
    pub score: f64,
    #[validate(range(exclusive_min = 0.0, message = "maxMarks must be greater than zero"))]
    pub max_marks: f64,
    pub result_date: Option<DateTime<Utc>>,
}

/// DTO for correcting marks on an existing result. Fields are optional.
/// `score <= maxMarks` can only be checked once merged with the stored record.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamResultRequest {
    #[validate(range(min = 0.0, message = "score must not be negative"))]
    pub score: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "maxMarks must be greater than zero"))]
    pub max_marks: Option<f64>,
    pub result_date: Option<DateTime<Utc>>,
}

/// Partial update applied by `ResultStore::update_marks`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarksUpdate {
    pub score: f64,
    pub max_marks: f64,
    pub percentage: f64,
    pub result_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarksUpdate {
    /// Merges a validated request over the current record and re-derives the percentage.
    pub fn merge(
        current: &ExamResult,
        req: &UpdateExamResultRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let score = req.score.unwrap_or(current.score);
        let max_marks = req.max_marks.unwrap_or(current.max_marks);
        if score > max_marks {
            return Err(score_exceeds_max());
        }

        Ok(Self {
            score,
            max_marks,
            percentage: percentage(score, max_marks),
            result_date: req.result_date.unwrap_or(current.result_date),
            updated_at: now,
        })
    }
}

/// Query string for listing results. Every filter is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultListParams {
    pub school_id: Option<String>,
    pub class_id: Option<String>,
    pub section_id: Option<String>,
    pub subject_id: Option<String>,
    pub student_id: Option<String>,
    pub limit: Option<usize>,
}
