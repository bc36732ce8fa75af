// src/models/student.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::scope::not_blank;

/// Represents the 'students' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub school_id: String,
    pub class_id: String,
    pub section_id: String,
    pub first_name: String,
    pub last_name: String,
    pub roll_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn profile(&self) -> StudentProfile {
        StudentProfile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            roll_number: self.roll_number.clone(),
        }
    }
}

/// Display fields the Student Directory hands to the leaderboard.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub first_name: String,
    pub last_name: String,
    pub roll_number: String,
}

/// DTO for enrolling a student into a section.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    #[validate(length(max = 64), custom(function = not_blank, message = "schoolId is required"))]
    pub school_id: String,
    #[validate(length(max = 64), custom(function = not_blank, message = "classId is required"))]
    pub class_id: String,
    #[validate(length(max = 64), custom(function = not_blank, message = "sectionId is required"))]
    pub section_id: String,
    #[validate(length(min = 1, max = 100, message = "firstName length must be between 1 and 100 characters."))]
    pub first_name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,
    #[validate(length(max = 32), custom(function = not_blank, message = "rollNumber is required"))]
    pub roll_number: String,
}

impl CreateStudentRequest {
    pub fn into_student(self, now: DateTime<Utc>) -> Student {
        Student {
            id: uuid::Uuid::new_v4().to_string(),
            school_id: self.school_id,
            class_id: self.class_id,
            section_id: self.section_id,
            first_name: self.first_name,
            last_name: self.last_name,
            roll_number: self.roll_number,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Query string for listing students. Filters are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListParams {
    pub school_id: Option<String>,
    pub class_id: Option<String>,
    pub section_id: Option<String>,
}
