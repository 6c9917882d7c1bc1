use crate::{
    config::QueryOptions,
    errors::QueryResult,
    gremlinc::serializer::SerializedQuery,
    model::{GraphModel, MemberCache},
    query::GremlinQuerySource,
};
use std::sync::Arc;
use tracing::debug;

/// Sends serialized queries to a Gremlin server and returns the raw JSON results.
pub trait QueryExecutor: Send + Sync {
    fn execute(&self, query: &SerializedQuery) -> QueryResult<Vec<serde_json::Value>>;
}

/// Everything a query needs besides its steps: the model, the options and the executor.
pub struct GremlinQueryEnvironment {
    members: MemberCache,
    options: QueryOptions,
    executor: Option<Arc<dyn QueryExecutor>>,
}

impl GremlinQueryEnvironment {
    pub fn new(model: impl GraphModel + 'static) -> Self {
        Self::from_model(Arc::new(model))
    }

    pub fn from_model(model: Arc<dyn GraphModel>) -> Self {
        Self {
            members: MemberCache::new(model),
            options: QueryOptions::default(),
            executor: None,
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        debug!(?options, "configuring query options");
        self.options = options;
        self
    }

    pub fn configure_options(self, configure: impl FnOnce(QueryOptions) -> QueryOptions) -> Self {
        let options = configure(self.options.clone());
        self.with_options(options)
    }

    pub fn with_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn model(&self) -> &Arc<dyn GraphModel> {
        self.members.model()
    }

    pub fn members(&self) -> &MemberCache {
        &self.members
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn executor(&self) -> Option<&Arc<dyn QueryExecutor>> {
        self.executor.as_ref()
    }

    /// Entry point for building queries against this environment.
    pub fn g(self) -> GremlinQuerySource {
        GremlinQuerySource::new(Arc::new(self))
    }
}

impl std::fmt::Debug for GremlinQueryEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GremlinQueryEnvironment")
            .field("members", &self.members)
            .field("options", &self.options)
            .field("executor", &self.executor.is_some())
            .finish()
    }
}
