use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::services::score_recorder::ScoreRecorder;
use crate::store::{AccountStore, QuestionStore, ScoreStore};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub questions: Arc<dyn QuestionStore>,
    pub recorder: ScoreRecorder,
    pub config: Config,
}

impl AppState {
    /// Wires every store trait to the same backend.
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: AccountStore + QuestionStore + ScoreStore + 'static,
    {
        Self::with_recorder(store.clone(), ScoreRecorder::new(store), config)
    }

    /// Like [`AppState::new`] but with a prepared recorder (e.g. a fixed clock).
    pub fn with_recorder<S>(store: Arc<S>, recorder: ScoreRecorder, config: Config) -> Self
    where
        S: AccountStore + QuestionStore + 'static,
    {
        Self {
            accounts: store.clone(),
            questions: store,
            recorder,
            config,
        }
    }
}

impl FromRef<AppState> for Arc<dyn AccountStore> {
    fn from_ref(state: &AppState) -> Self {
        state.accounts.clone()
    }
}

impl FromRef<AppState> for Arc<dyn QuestionStore> {
    fn from_ref(state: &AppState) -> Self {
        state.questions.clone()
    }
}

impl FromRef<AppState> for ScoreRecorder {
    fn from_ref(state: &AppState) -> Self {
        state.recorder.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
