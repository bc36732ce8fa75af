// src/store/mod.rs

//! Storage seams for results and students.
//!
//! Handlers and the ranking engine only ever see these traits; `postgres`
//! backs them with sqlx and `memory` keeps everything in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    exam_result::{ExamResult, MarksUpdate},
    scope::{SectionScope, SubjectScope},
    student::{Student, StudentListParams, StudentProfile},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("record '{0}' already exists")]
    Duplicate(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Equality filters plus optional ordering and limit over `exam_results`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultQuery {
    pub school_id: Option<String>,
    pub class_id: Option<String>,
    pub section_id: Option<String>,
    pub subject_id: Option<String>,
    pub student_id: Option<String>,
    pub order_by_score_desc: bool,
    pub limit: Option<usize>,
}

impl ResultQuery {
    pub fn for_subject(scope: &SubjectScope) -> Self {
        Self {
            subject_id: Some(scope.subject_id.clone()),
            ..Self::for_section(&scope.section())
        }
    }

    pub fn for_section(scope: &SectionScope) -> Self {
        Self {
            school_id: Some(scope.school_id.clone()),
            class_id: Some(scope.class_id.clone()),
            section_id: Some(scope.section_id.clone()),
            ..Self::default()
        }
    }

    pub fn by_score_desc(mut self) -> Self {
        self.order_by_score_desc = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Active `(column, value)` filters, in column order.
    pub fn filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("school_id", &self.school_id),
            ("class_id", &self.class_id),
            ("section_id", &self.section_id),
            ("subject_id", &self.subject_id),
            ("student_id", &self.student_id),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }

    pub fn matches(&self, record: &ExamResult) -> bool {
        self.filters().into_iter().all(|(column, value)| {
            let field = match column {
                "school_id" => &record.school_id,
                "class_id" => &record.class_id,
                "section_id" => &record.section_id,
                "subject_id" => &record.subject_id,
                _ => &record.student_id,
            };
            field == value
        })
    }
}

/// The Result Store collaborator.
///
/// Writes are applied independently per record; there is no multi-record transaction.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Records matching every filter. With `order_by_score_desc`, ties keep insertion order.
    async fn find(&self, query: &ResultQuery) -> StoreResult<Vec<ExamResult>>;

    async fn get(&self, id: &str) -> StoreResult<Option<ExamResult>>;

    async fn insert(&self, record: &ExamResult) -> StoreResult<()>;

    /// Returns `false` when no record has this id.
    async fn update_marks(&self, id: &str, update: &MarksUpdate) -> StoreResult<bool>;

    /// Writes `rank` into both `rank_in_class` and `rank_in_section` and refreshes `updated_at`.
    async fn assign_rank(&self, id: &str, rank: i32, at: DateTime<Utc>) -> StoreResult<bool>;

    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

/// The Student Directory collaborator: display data by student id.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn lookup(&self, student_id: &str) -> StoreResult<Option<StudentProfile>>;
}

/// Enrolment records behind the directory.
#[async_trait]
pub trait StudentStore: StudentDirectory {
    async fn insert_student(&self, student: &Student) -> StoreResult<()>;

    async fn get_student(&self, id: &str) -> StoreResult<Option<Student>>;

    async fn list_students(&self, filter: &StudentListParams) -> StoreResult<Vec<Student>>;

    async fn delete_student(&self, id: &str) -> StoreResult<bool>;
}
