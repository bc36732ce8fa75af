// src/models/standing.rs

use serde::{Deserialize, Serialize};

use crate::models::{
    exam_result::ExamResult,
    scope::{SectionScope, SubjectScope},
};

/// One row of the overall (cross-subject) leaderboard.
/// Recomputed on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAverage {
    pub student_id: String,
    pub total_score: f64,
    pub total_max_marks: f64,
    /// `100 * total_score / total_max_marks`, a ratio of sums rather than a mean of percentages.
    pub average_percentage: f64,
    pub rank: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roll_number: Option<String>,
    pub results: Vec<ExamResult>,
}

/// Query string for `GET /api/rankings/subject`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectLeaderboardParams {
    pub school_id: String,
    pub class_id: String,
    pub section_id: String,
    pub subject_id: String,
    pub top_n: Option<usize>,
}

impl SubjectLeaderboardParams {
    pub fn scope(&self) -> SubjectScope {
        SubjectScope::new(
            self.school_id.clone(),
            self.class_id.clone(),
            self.section_id.clone(),
            self.subject_id.clone(),
        )
    }
}

/// Query string for `GET /api/rankings/overall`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverallLeaderboardParams {
    pub school_id: String,
    pub class_id: String,
    pub section_id: String,
    pub top_n: Option<usize>,
}

impl OverallLeaderboardParams {
    pub fn scope(&self) -> SectionScope {
        SectionScope::new(
            self.school_id.clone(),
            self.class_id.clone(),
            self.section_id.clone(),
        )
    }
}
