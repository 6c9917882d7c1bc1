use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::steps::{EdgeEndpoint, Step, StepLabel, Traversal},
    model::{FilterLabels, VERTEX_ROOT},
    protocol::value::Value,
    query::{
        GremlinQuery, IntoExpression, ProjectBuilder,
        shapes::{
            AnyVertex, EdgeElement, EdgeShape, Element, ElementShape, ValueShape, VertexElement,
            VertexShape,
        },
        source::{element_label, property_bindings},
    },
};
use indexmap::IndexMap;

impl<E: Element, S: ElementShape> GremlinQuery<E, S> {
    /// Reads the properties selected by member lambdas; no projections reads them all.
    pub fn values<V, X: IntoExpression>(
        &self,
        projections: impl IntoIterator<Item = X>,
    ) -> QueryResult<GremlinQuery<V, ValueShape>> {
        let translator = self.translator();
        let keys = projections
            .into_iter()
            .map(|projection| {
                let expression = projection.into_expression()?;
                translator.translate_projection(&expression, self.binding())
            })
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(self.push_as(Step::Values(keys), None))
    }

    pub fn id(&self) -> GremlinQuery<Value, ValueShape> {
        self.push_as(Step::Id, None)
    }

    pub fn label(&self) -> GremlinQuery<String, ValueShape> {
        self.push_as(Step::Label, None)
    }

    /// Projects each element into a map; at least one `by` is required.
    pub fn project(
        &self,
        build: impl FnOnce(ProjectBuilder<E, S>) -> QueryResult<ProjectBuilder<E, S>>,
    ) -> QueryResult<GremlinQuery<IndexMap<String, Value>, ValueShape>> {
        let (bys, next_label) = build(ProjectBuilder::new(self.clone()))?.finish();
        if bys.is_empty() {
            return Err(QueryError::invalid_argument(
                "project",
                "a projection needs at least one key",
            ));
        }
        Ok(self
            .push_as(Step::Project(bys), None)
            .with_next_label(next_label))
    }

    pub fn drop(&self) -> Self {
        self.push(Step::Drop)
    }

    /// Edge labels selected by `Ed`. `None` means no edge of the model matches.
    fn edge_labels<Ed: EdgeElement>(&self) -> QueryResult<Option<Vec<String>>> {
        let verbosity = self.env.options().filter_labels_verbosity;
        match self.env.model().filter_labels(Ed::NAME, verbosity) {
            None => Err(QueryError::UnknownElement(Ed::NAME.to_string())),
            Some(FilterLabels::Unfiltered) => Ok(Some(Vec::new())),
            Some(FilterLabels::Labels(labels)) if labels.is_empty() => Ok(None),
            Some(FilterLabels::Labels(labels)) => Ok(Some(labels)),
        }
    }

    fn navigate<E2, S2>(
        &self,
        step: fn(Vec<String>) -> Step,
        labels: Option<Vec<String>>,
        element: &'static str,
    ) -> GremlinQuery<E2, S2> {
        match labels {
            Some(labels) => self.push_as(step(labels), Some(element)),
            None => self.push_as(Step::None, Some(element)),
        }
    }
}

impl<E: VertexElement> GremlinQuery<E, VertexShape> {
    pub fn of_type<T: VertexElement>(&self) -> QueryResult<GremlinQuery<T, VertexShape>> {
        let query = self.retype(self.steps.clone(), Some(T::NAME));
        Ok(match self.type_filter(T::NAME)? {
            Some(step) => query.push(step),
            None => query,
        })
    }

    pub fn out<Ed: EdgeElement>(&self) -> QueryResult<GremlinQuery<AnyVertex, VertexShape>> {
        Ok(self.navigate(Step::Out, self.edge_labels::<Ed>()?, VERTEX_ROOT))
    }

    pub fn in_<Ed: EdgeElement>(&self) -> QueryResult<GremlinQuery<AnyVertex, VertexShape>> {
        Ok(self.navigate(Step::In, self.edge_labels::<Ed>()?, VERTEX_ROOT))
    }

    pub fn both<Ed: EdgeElement>(&self) -> QueryResult<GremlinQuery<AnyVertex, VertexShape>> {
        Ok(self.navigate(Step::Both, self.edge_labels::<Ed>()?, VERTEX_ROOT))
    }

    pub fn out_e<Ed: EdgeElement>(&self) -> QueryResult<GremlinQuery<Ed, EdgeShape>> {
        Ok(self.navigate(Step::OutE, self.edge_labels::<Ed>()?, Ed::NAME))
    }

    pub fn in_e<Ed: EdgeElement>(&self) -> QueryResult<GremlinQuery<Ed, EdgeShape>> {
        Ok(self.navigate(Step::InE, self.edge_labels::<Ed>()?, Ed::NAME))
    }

    pub fn both_e<Ed: EdgeElement>(&self) -> QueryResult<GremlinQuery<Ed, EdgeShape>> {
        Ok(self.navigate(Step::BothE, self.edge_labels::<Ed>()?, Ed::NAME))
    }

    /// Adds an edge of type `Ed` starting at the current vertex.
    pub fn add_e<Ed: EdgeElement>(
        &self,
        properties: &[(&str, Value)],
    ) -> QueryResult<GremlinQuery<Ed, EdgeShape>> {
        let label = element_label(&self.env, Ed::NAME)?;
        let properties = property_bindings(&self.env, Ed::NAME, properties)?;
        Ok(self.push_as(Step::AddE { label, properties }, Some(Ed::NAME)))
    }
}

impl<E: EdgeElement> GremlinQuery<E, EdgeShape> {
    pub fn of_type<T: EdgeElement>(&self) -> QueryResult<GremlinQuery<T, EdgeShape>> {
        let query = self.retype(self.steps.clone(), Some(T::NAME));
        Ok(match self.type_filter(T::NAME)? {
            Some(step) => query.push(step),
            None => query,
        })
    }

    pub fn in_v(&self) -> GremlinQuery<AnyVertex, VertexShape> {
        self.push_as(Step::InV, Some(VERTEX_ROOT))
    }

    pub fn out_v(&self) -> GremlinQuery<AnyVertex, VertexShape> {
        self.push_as(Step::OutV, Some(VERTEX_ROOT))
    }

    pub fn other_v(&self) -> GremlinQuery<AnyVertex, VertexShape> {
        self.push_as(Step::OtherV, Some(VERTEX_ROOT))
    }

    pub fn both_v(&self) -> GremlinQuery<AnyVertex, VertexShape> {
        self.push_as(Step::BothV, Some(VERTEX_ROOT))
    }

    pub fn from_label<V: VertexElement>(&self, label: &StepLabel<V, VertexShape>) -> QueryResult<Self> {
        self.check_bound(label.name())?;
        Ok(self.push(Step::From(EdgeEndpoint::Label(label.name().to_string()))))
    }

    pub fn to_label<V: VertexElement>(&self, label: &StepLabel<V, VertexShape>) -> QueryResult<Self> {
        self.check_bound(label.name())?;
        Ok(self.push(Step::To(EdgeEndpoint::Label(label.name().to_string()))))
    }

    /// Sets the out-vertex to the result of `endpoint`, evaluated against the vertex the
    /// edge was added from.
    pub fn from_traversal<V: VertexElement>(
        &self,
        endpoint: impl FnOnce(GremlinQuery<AnyVertex, VertexShape>) -> QueryResult<GremlinQuery<V, VertexShape>>,
    ) -> QueryResult<Self> {
        let (traversal, next_label) = self.endpoint(endpoint)?;
        Ok(self
            .push(Step::From(EdgeEndpoint::Traversal(traversal)))
            .with_next_label(next_label))
    }

    pub fn to_traversal_endpoint<V: VertexElement>(
        &self,
        endpoint: impl FnOnce(GremlinQuery<AnyVertex, VertexShape>) -> QueryResult<GremlinQuery<V, VertexShape>>,
    ) -> QueryResult<Self> {
        let (traversal, next_label) = self.endpoint(endpoint)?;
        Ok(self
            .push(Step::To(EdgeEndpoint::Traversal(traversal)))
            .with_next_label(next_label))
    }

    fn endpoint<V>(
        &self,
        endpoint: impl FnOnce(GremlinQuery<AnyVertex, VertexShape>) -> QueryResult<GremlinQuery<V, VertexShape>>,
    ) -> QueryResult<(Traversal, usize)> {
        let vertices: GremlinQuery<AnyVertex, VertexShape> = self.anonymous_as(Some(VERTEX_ROOT));
        vertices.subquery(endpoint)
    }
}
