use std::sync::Arc;

use crate::chain::{ChainBuilder, RetrievalChain};
use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::session::{Session, SessionStore};

/// Shared application state: configuration, live sessions and the chain
/// builder. Chains themselves are memoized per session, not here.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    pub builder: ChainBuilder,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let sessions = SessionStore::new(config.max_history_length);
        let builder = ChainBuilder::new(config.clone());
        Arc::new(AppState {
            config,
            sessions,
            builder,
        })
    }

    /// Returns the session's chain, building it on first use.
    ///
    /// The `OnceCell` guarantees one build per session even under races;
    /// a new session triggers its own independent build.
    pub async fn chain_for(&self, session: &Session) -> Result<Arc<RetrievalChain>, ApiError> {
        let chain = session
            .chain
            .get_or_try_init(|| async {
                let chain = self.builder.build().await?;
                Ok::<_, ApiError>(Arc::new(chain))
            })
            .await?;
        Ok(chain.clone())
    }
}
