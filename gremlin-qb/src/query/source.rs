use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::steps::{PropertyBinding, Step},
    protocol::value::Value,
    query::{
        GremlinQuery,
        environment::GremlinQueryEnvironment,
        shapes::{EdgeElement, EdgeShape, ValueShape, VertexElement, VertexShape},
    },
};
use std::sync::Arc;
use tracing::debug;

/// `g`: where every query starts.
#[derive(Debug, Clone)]
pub struct GremlinQuerySource {
    env: Arc<GremlinQueryEnvironment>,
}

impl GremlinQuerySource {
    pub(crate) fn new(env: Arc<GremlinQueryEnvironment>) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &Arc<GremlinQueryEnvironment> {
        &self.env
    }

    /// Vertices of type `T`, optionally restricted to `ids`.
    pub fn v<T: VertexElement>(&self, ids: &[Value]) -> QueryResult<GremlinQuery<T, VertexShape>> {
        debug!(element = T::NAME, ids = ids.len(), "starting vertex query");
        let query = GremlinQuery::start(Arc::clone(&self.env), Step::V(ids.to_vec()), Some(T::NAME));
        filtered(query, T::NAME)
    }

    /// Edges of type `T`, optionally restricted to `ids`.
    pub fn e<T: EdgeElement>(&self, ids: &[Value]) -> QueryResult<GremlinQuery<T, EdgeShape>> {
        debug!(element = T::NAME, ids = ids.len(), "starting edge query");
        let query = GremlinQuery::start(Arc::clone(&self.env), Step::E(ids.to_vec()), Some(T::NAME));
        filtered(query, T::NAME)
    }

    /// Adds a vertex of type `T` with the given member values.
    pub fn add_v<T: VertexElement>(
        &self,
        properties: &[(&str, Value)],
    ) -> QueryResult<GremlinQuery<T, VertexShape>> {
        let label = element_label(&self.env, T::NAME)?;
        let properties = property_bindings(&self.env, T::NAME, properties)?;
        Ok(GremlinQuery::start(
            Arc::clone(&self.env),
            Step::AddV { label, properties },
            Some(T::NAME),
        ))
    }

    pub fn inject<T: Into<Value>>(
        &self,
        values: impl IntoIterator<Item = T>,
    ) -> GremlinQuery<T, ValueShape> {
        let values = values.into_iter().map(Into::into).collect();
        GremlinQuery::start(Arc::clone(&self.env), Step::Inject(values), None)
    }
}

fn filtered<E, S>(query: GremlinQuery<E, S>, element: &'static str) -> QueryResult<GremlinQuery<E, S>> {
    Ok(match query.type_filter(element)? {
        Some(step) => query.push(step),
        None => query,
    })
}

/// The wire label of a concrete element type.
pub(crate) fn element_label(env: &GremlinQueryEnvironment, element: &str) -> QueryResult<String> {
    env.model()
        .element_label(element)
        .ok_or_else(|| QueryError::UnknownElement(element.to_string()))
}

/// Resolves member names to property keys, leaving out nulls and members that are not
/// written on insert.
pub(crate) fn property_bindings(
    env: &GremlinQueryEnvironment,
    element: &str,
    properties: &[(&str, Value)],
) -> QueryResult<Vec<PropertyBinding>> {
    let mut bindings = Vec::with_capacity(properties.len());
    for (member, value) in properties {
        let metadata = env.members().resolve_member(element, member).ok_or_else(|| {
            QueryError::invalid_argument("properties", format!("{element} has no member {member}"))
        })?;
        if value.is_null() || metadata.serialization.skip_on_add() {
            continue;
        }
        bindings.push(PropertyBinding {
            key: metadata.key,
            value: value.clone(),
        });
    }
    Ok(bindings)
}
