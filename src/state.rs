use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    ranking::RankingEngine,
    store::{ResultStore, StudentStore},
};

pub type SharedResults = Arc<dyn ResultStore>;
pub type SharedStudents = Arc<dyn StudentStore>;

#[derive(Clone)]
pub struct AppState {
    pub results: SharedResults,
    pub students: SharedStudents,
    pub engine: RankingEngine,
    pub config: Config,
}

impl AppState {
    /// Wires every collaborator to the same backing store.
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: ResultStore + StudentStore + 'static,
    {
        let engine = RankingEngine::new(store.clone(), store.clone());
        Self {
            results: store.clone(),
            students: store,
            engine,
            config,
        }
    }
}

impl FromRef<AppState> for SharedResults {
    fn from_ref(state: &AppState) -> Self {
        state.results.clone()
    }
}

impl FromRef<AppState> for SharedStudents {
    fn from_ref(state: &AppState) -> Self {
        state.students.clone()
    }
}

impl FromRef<AppState> for RankingEngine {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
