// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{ResultQuery, ResultStore, StoreError, StoreResult, StudentDirectory, StudentStore};
use crate::models::{
    exam_result::{ExamResult, MarksUpdate},
    student::{Student, StudentListParams, StudentProfile},
};

const RESULT_COLUMNS: &str = "id, school_id, class_id, section_id, subject_id, student_id, \
     score, max_marks, percentage, rank_in_class, rank_in_section, \
     result_date, created_at, updated_at";

const STUDENT_COLUMNS: &str =
    "id, school_id, class_id, section_id, first_name, last_name, roll_number, created_at, updated_at";

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres error code for unique violation is 23505.
fn map_insert_error(err: sqlx::Error, id: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Duplicate(id.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl ResultStore for PgStore {
    async fn find(&self, query: &ResultQuery) -> StoreResult<Vec<ExamResult>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        builder.push(RESULT_COLUMNS);
        builder.push(" FROM exam_results WHERE TRUE");

        for (column, value) in query.filters() {
            builder.push(" AND ");
            builder.push(column);
            builder.push(" = ");
            builder.push_bind(value.to_string());
        }

        // created_at/id keep tie order stable across identical requests
        if query.order_by_score_desc {
            builder.push(" ORDER BY score DESC, created_at ASC, id ASC");
        } else {
            builder.push(" ORDER BY created_at ASC, id ASC");
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = builder
            .build_query_as::<ExamResult>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query exam results: {:?}", e);
                StoreError::from(e)
            })?;

        Ok(rows)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<ExamResult>> {
        let sql = format!("SELECT {RESULT_COLUMNS} FROM exam_results WHERE id = $1");
        let row = sqlx::query_as::<_, ExamResult>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn insert(&self, record: &ExamResult) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO exam_results
            (id, school_id, class_id, section_id, subject_id, student_id,
             score, max_marks, percentage, rank_in_class, rank_in_section,
             result_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&record.id)
        .bind(&record.school_id)
        .bind(&record.class_id)
        .bind(&record.section_id)
        .bind(&record.subject_id)
        .bind(&record.student_id)
        .bind(record.score)
        .bind(record.max_marks)
        .bind(record.percentage)
        .bind(record.rank_in_class)
        .bind(record.rank_in_section)
        .bind(record.result_date)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &record.id))?;

        Ok(())
    }

    async fn update_marks(&self, id: &str, update: &MarksUpdate) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE exam_results
            SET score = $1, max_marks = $2, percentage = $3, result_date = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(update.score)
        .bind(update.max_marks)
        .bind(update.percentage)
        .bind(update.result_date)
        .bind(update.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign_rank(&self, id: &str, rank: i32, at: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE exam_results SET rank_in_class = $1, rank_in_section = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(rank)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM exam_results WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StudentDirectory for PgStore {
    async fn lookup(&self, student_id: &str) -> StoreResult<Option<StudentProfile>> {
        let profile = sqlx::query_as::<_, StudentProfile>(
            "SELECT first_name, last_name, roll_number FROM students WHERE id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}

#[async_trait]
impl StudentStore for PgStore {
    async fn insert_student(&self, student: &Student) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO students
            (id, school_id, class_id, section_id, first_name, last_name, roll_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&student.id)
        .bind(&student.school_id)
        .bind(&student.class_id)
        .bind(&student.section_id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.roll_number)
        .bind(student.created_at)
        .bind(student.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &student.id))?;

        Ok(())
    }

    async fn get_student(&self, id: &str) -> StoreResult<Option<Student>> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_students(&self, filter: &StudentListParams) -> StoreResult<Vec<Student>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        builder.push(STUDENT_COLUMNS);
        builder.push(" FROM students WHERE TRUE");

        let filters = [
            ("school_id", &filter.school_id),
            ("class_id", &filter.class_id),
            ("section_id", &filter.section_id),
        ];
        for (column, value) in filters {
            if let Some(value) = value {
                builder.push(" AND ");
                builder.push(column);
                builder.push(" = ");
                builder.push_bind(value.clone());
            }
        }
        builder.push(" ORDER BY roll_number ASC, id ASC");

        let rows = builder
            .build_query_as::<Student>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn delete_student(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
