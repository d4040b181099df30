use std::sync::Arc;

use crate::backend::{BidProxy, SessionBackend};
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::marketplace::MarketplaceApi;
use crate::store::WorkflowStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Marketplace GraphQL API. Default: HttpMarketplace.
    pub marketplace: Arc<dyn MarketplaceApi>,
    /// Account backend: stored tokens and cookies, profile and bid records.
    pub backend: Arc<dyn SessionBackend>,
    pub proxy: Arc<dyn BidProxy>,
    /// Proposal text generation. Default: LlmClient.
    pub generator: Arc<dyn TextGenerator>,
    /// Credential, search session and the open bid draft.
    pub store: Arc<WorkflowStore>,
}

#[cfg(test)]
impl AppState {
    /// State wired to in-memory fakes, plus handles to inspect them.
    pub fn with_fakes(
        marketplace: crate::testing::FakeMarketplace,
        backend: crate::testing::FakeBackend,
        proxy: crate::testing::FakeProxy,
        generator: crate::testing::FakeGenerator,
    ) -> (Self, crate::testing::Fakes) {
        let fakes = crate::testing::Fakes {
            marketplace: Arc::new(marketplace),
            backend: Arc::new(backend),
            proxy: Arc::new(proxy),
            generator: Arc::new(generator),
        };
        let state = AppState {
            config: Config::for_tests(),
            marketplace: fakes.marketplace.clone(),
            backend: fakes.backend.clone(),
            proxy: fakes.proxy.clone(),
            generator: fakes.generator.clone(),
            store: Arc::new(WorkflowStore::default()),
        };
        (state, fakes)
    }
}
