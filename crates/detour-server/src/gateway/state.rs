use std::sync::Arc;
use std::time::Duration;

use detour::auth::TrustStoreHandle;
use detour::index::NearestNeighbors;
use detour::{Engine, VectorIndex};

/// Shared, immutable-after-init request context handed to every handler.
pub struct HandlerState<N: NearestNeighbors + Send + Sync + 'static = VectorIndex> {
    pub engine: Arc<Engine<N>>,

    pub trust_store: Arc<TrustStoreHandle>,

    pub request_timeout: Duration,
}

impl<N: NearestNeighbors + Send + Sync + 'static> Clone for HandlerState<N> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            trust_store: self.trust_store.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<N: NearestNeighbors + Send + Sync + 'static> HandlerState<N> {
    pub fn new(
        engine: Arc<Engine<N>>,
        trust_store: Arc<TrustStoreHandle>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            trust_store,
            request_timeout,
        }
    }
}
