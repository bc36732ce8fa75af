// src/ranking.rs

//! Dense competition ranking over exam results.
//!
//! Tied entries share a rank and the next distinct value skips past every
//! member of the tie: scores `[90, 90, 80, 70]` rank as `[1, 1, 3, 4]`.
//! The same walk ranks single-subject scores and cross-subject averages.
//!
//! Rank writes are applied one record at a time. If a write fails partway
//! through, the records already written keep their new rank.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;
use tracing::instrument;

use crate::{
    models::{
        exam_result::ExamResult,
        scope::{SectionScope, SubjectScope},
        standing::StudentAverage,
    },
    store::{ResultQuery, ResultStore, StoreError, StudentDirectory},
};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("ranking failed: {0}")]
    RankingFailed(#[source] StoreError),

    #[error("failed to retrieve top students: {0}")]
    TopStudentsFailed(#[source] StoreError),

    #[error("failed to retrieve overall top students: {0}")]
    OverallTopStudentsFailed(#[source] StoreError),
}

/// Assigns dense competition ranks to values already sorted in descending order.
pub fn dense_ranks<I>(values: I) -> Vec<i32>
where
    I: IntoIterator<Item = f64>,
{
    let mut ranks = Vec::new();
    let mut current_rank = 1;
    let mut previous: Option<f64> = None;
    let mut tie_run = 0;

    for value in values {
        match previous {
            None => current_rank = 1,
            Some(prev) if value < prev => {
                current_rank += tie_run + 1;
                tie_run = 0;
            }
            Some(_) => tie_run += 1,
        }
        ranks.push(current_rank);
        previous = Some(value);
    }

    ranks
}

type ScopeMutex = Arc<tokio::sync::Mutex<()>>;

/// Serialises rank computations per subject scope within this process.
/// An entry lives only while some computation holds or waits on it.
#[derive(Debug, Default)]
struct ScopeLocks {
    inner: Mutex<HashMap<SubjectScope, ScopeMutex>>,
}

impl ScopeLocks {
    async fn acquire(self: &Arc<Self>, scope: &SubjectScope) -> ScopeGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(scope.clone()).or_default().clone()
        };
        ScopeGuard {
            guard: Some(lock.lock_owned().await),
            locks: self.clone(),
            scope: scope.clone(),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct ScopeGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<ScopeLocks>,
    scope: SubjectScope,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.guard.take();

        // Waiters clone the mutex under the map lock, so a count of one
        // means the map holds the only reference.
        let mut map = self.locks.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if map.get(&self.scope).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(&self.scope);
        }
    }
}

/// Computes ranks and answers leaderboard queries against injected stores.
#[derive(Clone)]
pub struct RankingEngine {
    results: Arc<dyn ResultStore>,
    directory: Arc<dyn StudentDirectory>,
    locks: Arc<ScopeLocks>,
}

impl RankingEngine {
    pub fn new(results: Arc<dyn ResultStore>, directory: Arc<dyn StudentDirectory>) -> Self {
        Self {
            results,
            directory,
            locks: Arc::default(),
        }
    }

    /// Ranks every result in the subject scope by score and persists the rank
    /// into both `rank_in_class` and `rank_in_section`.
    #[instrument(skip(self))]
    pub async fn compute_and_assign_ranks(&self, scope: &SubjectScope) -> Result<(), RankingError> {
        if let Some(field) = scope.missing_field() {
            return Err(RankingError::MissingField(field));
        }

        let _guard = self.locks.acquire(scope).await;

        let records = self
            .results
            .find(&ResultQuery::for_subject(scope).by_score_desc())
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch results for ranking: {:?}", e);
                RankingError::RankingFailed(e)
            })?;

        let ranks = dense_ranks(records.iter().map(|r| r.score));
        let now = Utc::now();

        for (record, rank) in records.iter().zip(ranks) {
            let found = self
                .results
                .assign_rank(&record.id, rank, now)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to persist rank for result {}: {:?}", record.id, e);
                    RankingError::RankingFailed(e)
                })?;

            if !found {
                tracing::warn!("Result {} disappeared before its rank was written", record.id);
            }
        }

        tracing::info!("Ranked {} results", records.len());
        Ok(())
    }

    /// Highest scores in the subject scope, as stored. Does not recompute ranks.
    #[instrument(skip(self))]
    pub async fn top_students_by_subject(
        &self,
        scope: &SubjectScope,
        top_n: usize,
    ) -> Result<Vec<ExamResult>, RankingError> {
        if let Some(field) = scope.missing_field() {
            return Err(RankingError::MissingField(field));
        }

        self.results
            .find(&ResultQuery::for_subject(scope).by_score_desc().limit(top_n))
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch subject leaderboard: {:?}", e);
                RankingError::TopStudentsFailed(e)
            })
    }

    /// Cross-subject leaderboard: one entry per student, ranked by
    /// `100 * sum(score) / sum(max_marks)`.
    #[instrument(skip(self))]
    pub async fn overall_top_students(
        &self,
        scope: &SectionScope,
        top_n: usize,
    ) -> Result<Vec<StudentAverage>, RankingError> {
        if let Some(field) = scope.missing_field() {
            return Err(RankingError::MissingField(field));
        }

        let records = self
            .results
            .find(&ResultQuery::for_section(scope))
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch results for overall leaderboard: {:?}", e);
                RankingError::OverallTopStudentsFailed(e)
            })?;

        let mut standings = aggregate_by_student(records);

        for standing in standings.iter_mut() {
            let profile = self
                .directory
                .lookup(&standing.student_id)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up student {}: {:?}", standing.student_id, e);
                    RankingError::OverallTopStudentsFailed(e)
                })?;

            match profile {
                Some(p) => {
                    standing.first_name = Some(p.first_name);
                    standing.last_name = Some(p.last_name);
                    standing.roll_number = Some(p.roll_number);
                }
                None => tracing::warn!("Student {} not found in directory", standing.student_id),
            }
        }

        standings.sort_by(|a, b| b.average_percentage.total_cmp(&a.average_percentage));

        let ranks = dense_ranks(standings.iter().map(|s| s.average_percentage));
        for (standing, rank) in standings.iter_mut().zip(ranks) {
            standing.rank = rank;
        }

        standings.truncate(top_n);
        Ok(standings)
    }
}

/// Groups results by student in first-seen order and sums their marks.
/// Duplicate records for the same subject are summed like any other.
fn aggregate_by_student(records: Vec<ExamResult>) -> Vec<StudentAverage> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut standings: Vec<StudentAverage> = Vec::new();

    for record in records {
        let slot = *index.entry(record.student_id.clone()).or_insert_with(|| {
            standings.push(StudentAverage {
                student_id: record.student_id.clone(),
                total_score: 0.0,
                total_max_marks: 0.0,
                average_percentage: 0.0,
                rank: 0,
                first_name: None,
                last_name: None,
                roll_number: None,
                results: Vec::new(),
            });
            standings.len() - 1
        });

        let standing = &mut standings[slot];
        standing.total_score += record.score;
        standing.total_max_marks += record.max_marks;
        standing.results.push(record);
    }

    for standing in standings.iter_mut() {
        standing.average_percentage =
            crate::models::exam_result::percentage(standing.total_score, standing.total_max_marks);
    }

    standings
}
