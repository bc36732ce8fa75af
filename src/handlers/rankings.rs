// src/handlers/rankings.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    config::{DEFAULT_TOP_N, MAX_TOP_N},
    error::AppError,
    models::{
        scope::SubjectScope,
        standing::{OverallLeaderboardParams, SubjectLeaderboardParams},
    },
    ranking::RankingEngine,
};

/// Applies the default leaderboard size and rejects values outside `1..=MAX_TOP_N`.
fn resolve_top_n(top_n: Option<usize>) -> Result<usize, AppError> {
    match top_n {
        None => Ok(DEFAULT_TOP_N),
        Some(n) if (1..=MAX_TOP_N).contains(&n) => Ok(n),
        Some(_) => Err(AppError::BadRequest(format!(
            "topN must be between 1 and {}",
            MAX_TOP_N
        ))),
    }
}

/// Recomputes and stores ranks for one subject in one section.
/// Staff only.
pub async fn compute_ranks(
    State(engine): State<RankingEngine>,
    Json(scope): Json<SubjectScope>,
) -> Result<impl IntoResponse, AppError> {
    engine.compute_and_assign_ranks(&scope).await?;

    Ok(Json(serde_json::json!({
        "message": "Ranks computed successfully"
    })))
}

/// Highest-scoring results for one subject, with the ranks last computed.
pub async fn subject_leaderboard(
    State(engine): State<RankingEngine>,
    Query(params): Query<SubjectLeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let top_n = resolve_top_n(params.top_n)?;
    let leaders = engine.top_students_by_subject(&params.scope(), top_n).await?;

    Ok(Json(leaders))
}

/// Students ranked by their aggregate percentage across every subject in the section.
pub async fn overall_leaderboard(
    State(engine): State<RankingEngine>,
    Query(params): Query<OverallLeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let top_n = resolve_top_n(params.top_n)?;
    let leaders = engine.overall_top_students(&params.scope(), top_n).await?;

    Ok(Json(leaders))
}
