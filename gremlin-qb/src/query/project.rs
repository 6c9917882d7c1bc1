use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::steps::ProjectBy,
    query::{GremlinQuery, IntoExpression, shapes::Shape},
};
use indexmap::IndexMap;

/// Collects the named `by` modulators of a `project()` step, in insertion order.
pub struct ProjectBuilder<E, S> {
    query: GremlinQuery<E, S>,
    bys: IndexMap<String, ProjectBy>,
}

impl<E, S> ProjectBuilder<E, S> {
    pub(crate) fn new(query: GremlinQuery<E, S>) -> Self {
        Self {
            query,
            bys: IndexMap::new(),
        }
    }

    pub(crate) fn finish(self) -> (IndexMap<String, ProjectBy>, usize) {
        (self.bys, self.query.next_label)
    }

    fn insert(mut self, name: &str, by: ProjectBy) -> QueryResult<Self> {
        if self.bys.contains_key(name) {
            return Err(QueryError::invalid_argument(
                "project",
                format!("duplicate projection key {name}"),
            ));
        }
        self.bys.insert(name.to_string(), by);
        Ok(self)
    }

    pub fn by_identity(self, name: &str) -> QueryResult<Self> {
        self.insert(name, ProjectBy::Identity)
    }
}

impl<E, S: Shape> ProjectBuilder<E, S> {
    /// `name` maps to the member a lambda selects.
    pub fn by(self, name: &str, projection: impl IntoExpression) -> QueryResult<Self> {
        let expression = projection.into_expression()?;
        let key = self
            .query
            .translator()
            .translate_projection(&expression, self.query.binding())?;
        self.insert(name, ProjectBy::Key(key))
    }

    pub fn by_traversal<X, Y>(
        mut self,
        name: &str,
        build: impl FnOnce(GremlinQuery<E, S>) -> QueryResult<GremlinQuery<X, Y>>,
    ) -> QueryResult<Self> {
        let (traversal, next_label) = self.query.subquery(build)?;
        self.query.next_label = next_label;
        self.insert(name, ProjectBy::Traversal(traversal))
    }
}
