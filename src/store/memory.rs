// src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ResultQuery, ResultStore, StoreError, StoreResult, StudentDirectory, StudentStore};
use crate::models::{
    exam_result::{ExamResult, MarksUpdate},
    student::{Student, StudentListParams, StudentProfile},
};

/// In-process store used when no database is configured, and by the tests.
/// Records are kept in insertion order, which is also the tie order for equal scores.
#[derive(Debug, Default)]
pub struct MemoryStore {
    results: RwLock<Vec<ExamResult>>,
    students: RwLock<Vec<Student>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn find(&self, query: &ResultQuery) -> StoreResult<Vec<ExamResult>> {
        let results = self.results.read().await;
        let mut found: Vec<ExamResult> = results
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();

        if query.order_by_score_desc {
            // stable: equal scores stay in insertion order
            found.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }

        Ok(found)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<ExamResult>> {
        let results = self.results.read().await;
        Ok(results.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, record: &ExamResult) -> StoreResult<()> {
        let mut results = self.results.write().await;
        if results.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Duplicate(record.id.clone()));
        }
        results.push(record.clone());
        Ok(())
    }

    async fn update_marks(&self, id: &str, update: &MarksUpdate) -> StoreResult<bool> {
        let mut results = self.results.write().await;
        let Some(record) = results.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };

        record.score = update.score;
        record.max_marks = update.max_marks;
        record.percentage = update.percentage;
        record.result_date = update.result_date;
        record.updated_at = update.updated_at;
        Ok(true)
    }

    async fn assign_rank(&self, id: &str, rank: i32, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut results = self.results.write().await;
        let Some(record) = results.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };

        record.rank_in_class = Some(rank);
        record.rank_in_section = Some(rank);
        record.updated_at = at;
        Ok(true)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut results = self.results.write().await;
        let before = results.len();
        results.retain(|r| r.id != id);
        Ok(results.len() != before)
    }
}

#[async_trait]
impl StudentDirectory for MemoryStore {
    async fn lookup(&self, student_id: &str) -> StoreResult<Option<StudentProfile>> {
        let students = self.students.read().await;
        Ok(students
            .iter()
            .find(|s| s.id == student_id)
            .map(Student::profile))
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn insert_student(&self, student: &Student) -> StoreResult<()> {
        let mut students = self.students.write().await;
        if students.iter().any(|s| s.id == student.id) {
            return Err(StoreError::Duplicate(student.id.clone()));
        }
        students.push(student.clone());
        Ok(())
    }

    async fn get_student(&self, id: &str) -> StoreResult<Option<Student>> {
        let students = self.students.read().await;
        Ok(students.iter().find(|s| s.id == id).cloned())
    }

    async fn list_students(&self, filter: &StudentListParams) -> StoreResult<Vec<Student>> {
        let students = self.students.read().await;
        let keep = |wanted: &Option<String>, actual: &str| {
            wanted.as_deref().is_none_or(|w| w == actual)
        };

        let mut found: Vec<Student> = students
            .iter()
            .filter(|s| {
                keep(&filter.school_id, &s.school_id)
                    && keep(&filter.class_id, &s.class_id)
                    && keep(&filter.section_id, &s.section_id)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.roll_number.cmp(&b.roll_number).then_with(|| a.id.cmp(&b.id)));

        Ok(found)
    }

    async fn delete_student(&self, id: &str) -> StoreResult<bool> {
        let mut students = self.students.write().await;
        let before = students.len();
        students.retain(|s| s.id != id);
        Ok(students.len() != before)
    }
}
