//! The typed query builder.
//!
//! A [`GremlinQuery`] is an immutable step stack plus the environment it was built in.
//! Every builder method takes `&self` and returns a new query, so a failed call leaves
//! the original untouched. The phantom parameters track what the query yields: `E` is
//! the element (or value) type and `S` the shape, which decides which methods exist.

mod element;
pub mod environment;
mod order;
mod project;
pub mod shapes;
mod source;
mod value;

pub use order::OrderBuilder;
pub use project::ProjectBuilder;
pub use source::GremlinQuerySource;

use crate::{
    config::{ElementProjection, QueryFormat},
    errors::{QueryError, QueryResult},
    gremlinc::{
        analyzer::{Binding, BoundLabels, Translator},
        expression::Expression,
        optimizer,
        serializer::{Bytecode, GroovyScript, SerializedQuery},
        steps::{
            GroupBy, Key, LimitStep, LogicalKind, ProjectBy, RangeStep, Scope, SkipStep, Step,
            StepLabel, StepStack, TailStep, Traversal,
        },
    },
    model::FilterLabels,
    protocol::value::Value,
    query::{
        environment::GremlinQueryEnvironment,
        shapes::{ArrayShape, Shape, ShapeKind, ValueShape},
    },
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::{marker::PhantomData, sync::Arc};
use tracing::debug;

/// Anything a predicate or projection lambda can be built from.
pub trait IntoExpression {
    fn into_expression(self) -> QueryResult<Expression>;
}

impl IntoExpression for Expression {
    fn into_expression(self) -> QueryResult<Expression> {
        Ok(self)
    }
}

impl IntoExpression for &Expression {
    fn into_expression(self) -> QueryResult<Expression> {
        Ok(self.clone())
    }
}

/// Lambda source text such as `t => t.Age > 36`.
#[cfg(feature = "compiler")]
impl IntoExpression for &str {
    fn into_expression(self) -> QueryResult<Expression> {
        Ok(crate::gremlinc::parser::LambdaParser::parse_lambda_source(self)?)
    }
}

pub struct GremlinQuery<E, S> {
    steps: StepStack,
    env: Arc<GremlinQueryEnvironment>,
    labels: Arc<BoundLabels>,
    /// Labels are named `l1`, `l2`, ... across the whole query, sub-queries included.
    next_label: usize,
    element: Option<&'static str>,
    _marker: PhantomData<fn() -> (E, S)>,
}

impl<E, S> Clone for GremlinQuery<E, S> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
            env: Arc::clone(&self.env),
            labels: Arc::clone(&self.labels),
            next_label: self.next_label,
            element: self.element,
            _marker: PhantomData,
        }
    }
}

impl<E, S> std::fmt::Debug for GremlinQuery<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GremlinQuery")
            .field("steps", &self.steps.to_vec())
            .field("element", &self.element)
            .field("labels", &self.labels)
            .finish()
    }
}

/// The branches of an `and`/`or`, each built from the same starting point.
pub struct Branches<E, S> {
    seed: GremlinQuery<E, S>,
    traversals: Vec<Traversal>,
}

impl<E, S> Branches<E, S> {
    pub fn branch<X, Y>(
        mut self,
        build: impl FnOnce(GremlinQuery<E, S>) -> QueryResult<GremlinQuery<X, Y>>,
    ) -> QueryResult<Self> {
        let (traversal, next_label) = self.seed.subquery(build)?;
        self.seed.next_label = next_label;
        self.traversals.push(traversal);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.traversals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traversals.is_empty()
    }
}

// construction helpers, shared by every shape
impl<E, S> GremlinQuery<E, S> {
    pub(crate) fn start(
        env: Arc<GremlinQueryEnvironment>,
        step: Step,
        element: Option<&'static str>,
    ) -> Self {
        Self {
            steps: optimizer::append(&StepStack::new(), step),
            env,
            labels: Arc::new(BoundLabels::new()),
            next_label: 0,
            element,
            _marker: PhantomData,
        }
    }

    fn retype<E2, S2>(&self, steps: StepStack, element: Option<&'static str>) -> GremlinQuery<E2, S2> {
        GremlinQuery {
            steps,
            env: Arc::clone(&self.env),
            labels: Arc::clone(&self.labels),
            next_label: self.next_label,
            element,
            _marker: PhantomData,
        }
    }

    fn with_steps(&self, steps: StepStack) -> Self {
        self.retype(steps, self.element)
    }

    fn push(&self, step: Step) -> Self {
        self.with_steps(optimizer::append(&self.steps, step))
    }

    fn push_as<E2, S2>(&self, step: Step, element: Option<&'static str>) -> GremlinQuery<E2, S2> {
        self.retype(optimizer::append(&self.steps, step), element)
    }

    fn push_filter(&self, body: &Traversal) -> Self {
        self.with_steps(optimizer::append_filter(&self.steps, body))
    }

    /// An empty query continuing from this one's traverser.
    fn anonymous_as<E2, S2>(&self, element: Option<&'static str>) -> GremlinQuery<E2, S2> {
        self.retype(StepStack::new(), element)
    }

    /// Runs `build` on an anonymous continuation and returns its traversal together with
    /// the label counter it left behind.
    fn subquery<X, Y>(
        &self,
        build: impl FnOnce(Self) -> QueryResult<GremlinQuery<X, Y>>,
    ) -> QueryResult<(Traversal, usize)> {
        let continuation = build(self.anonymous_as(self.element))?;
        let next_label = continuation.next_label.max(self.next_label);
        Ok((continuation.steps.to_traversal(), next_label))
    }

    fn with_next_label(mut self, next_label: usize) -> Self {
        self.next_label = self.next_label.max(next_label);
        self
    }

    fn translator(&self) -> Translator<'_> {
        Translator::new(self.env.members(), self.env.options(), &self.labels)
    }

    /// The `hasLabel` step selecting `element`, if one is needed.
    fn type_filter(&self, element: &'static str) -> QueryResult<Option<Step>> {
        let verbosity = self.env.options().filter_labels_verbosity;
        match self.env.model().filter_labels(element, verbosity) {
            None => Err(QueryError::UnknownElement(element.to_string())),
            Some(FilterLabels::Unfiltered) => Ok(None),
            Some(FilterLabels::Labels(labels)) if labels.is_empty() => Ok(Some(Step::None)),
            Some(FilterLabels::Labels(labels)) => Ok(Some(Step::HasLabel(labels))),
        }
    }

    fn check_bound(&self, name: &str) -> QueryResult<()> {
        if self.labels.contains_key(name) {
            Ok(())
        } else {
            Err(QueryError::UnboundStepLabel(name.to_string()))
        }
    }

    pub fn as_admin(&self) -> QueryAdmin<'_, E, S> {
        QueryAdmin { query: self }
    }

    /// The optimized step sequence built so far.
    pub fn to_traversal(&self) -> Traversal {
        self.steps.to_traversal()
    }
}

impl<E, S: Shape> GremlinQuery<E, S> {
    fn binding(&self) -> Binding {
        match (S::KIND, self.element) {
            (ShapeKind::Vertex | ShapeKind::Edge, Some(element)) => {
                Binding::Element(element.to_string())
            }
            _ => Binding::Scalar,
        }
    }

    pub fn identity(&self) -> Self {
        self.push(Step::Identity)
    }

    pub fn none(&self) -> Self {
        self.push(Step::None)
    }

    /// Keeps the query valid but makes it yield nothing.
    pub fn mute(&self) -> Self {
        self.none()
    }

    /// Filters by a predicate lambda, given as an [`Expression`] or as source text.
    pub fn where_(&self, predicate: impl IntoExpression) -> QueryResult<Self> {
        let expression = predicate.into_expression()?;
        let body = self
            .translator()
            .translate_predicate(&expression, self.binding())?;
        Ok(self.push_filter(&body))
    }

    /// Keeps the traversers for which `filter` yields at least one result.
    pub fn where_traversal<X, Y>(
        &self,
        filter: impl FnOnce(Self) -> QueryResult<GremlinQuery<X, Y>>,
    ) -> QueryResult<Self> {
        let (body, next_label) = self.subquery(filter)?;
        Ok(self.push_filter(&body).with_next_label(next_label))
    }

    pub fn and(
        &self,
        branches: impl FnOnce(Branches<E, S>) -> QueryResult<Branches<E, S>>,
    ) -> QueryResult<Self> {
        self.logical(LogicalKind::And, branches)
    }

    pub fn or(
        &self,
        branches: impl FnOnce(Branches<E, S>) -> QueryResult<Branches<E, S>>,
    ) -> QueryResult<Self> {
        self.logical(LogicalKind::Or, branches)
    }

    fn logical(
        &self,
        kind: LogicalKind,
        build: impl FnOnce(Branches<E, S>) -> QueryResult<Branches<E, S>>,
    ) -> QueryResult<Self> {
        let branches = build(Branches {
            seed: self.clone(),
            traversals: Vec::new(),
        })?;
        let next_label = branches.seed.next_label;
        let body = optimizer::logical(kind, branches.traversals)?;
        Ok(self.push_filter(&body).with_next_label(next_label))
    }

    pub fn not<X, Y>(
        &self,
        filter: impl FnOnce(Self) -> QueryResult<GremlinQuery<X, Y>>,
    ) -> QueryResult<Self> {
        let (body, next_label) = self.subquery(filter)?;
        Ok(self
            .push_filter(&optimizer::not(body))
            .with_next_label(next_label))
    }

    pub fn limit(&self, count: i64) -> QueryResult<Self> {
        Ok(self.push(Step::Limit(LimitStep::new(count, Scope::Global)?)))
    }

    pub fn limit_local(&self, count: i64) -> QueryResult<Self> {
        Ok(self.push(Step::Limit(LimitStep::new(count, Scope::Local)?)))
    }

    pub fn skip(&self, count: i64) -> QueryResult<Self> {
        Ok(self.push(Step::Skip(SkipStep::new(count, Scope::Global)?)))
    }

    pub fn skip_local(&self, count: i64) -> QueryResult<Self> {
        Ok(self.push(Step::Skip(SkipStep::new(count, Scope::Local)?)))
    }

    pub fn tail(&self, count: i64) -> QueryResult<Self> {
        Ok(self.push(Step::Tail(TailStep::new(count, Scope::Global)?)))
    }

    pub fn tail_local(&self, count: i64) -> QueryResult<Self> {
        Ok(self.push(Step::Tail(TailStep::new(count, Scope::Local)?)))
    }

    /// Traversers `lower..upper`; an `upper` of `-1` is unbounded.
    pub fn range(&self, lower: i64, upper: i64) -> QueryResult<Self> {
        Ok(self.push(Step::Range(RangeStep::new(lower, upper, Scope::Global)?)))
    }

    pub fn range_local(&self, lower: i64, upper: i64) -> QueryResult<Self> {
        Ok(self.push(Step::Range(RangeStep::new(lower, upper, Scope::Local)?)))
    }

    pub fn count(&self) -> GremlinQuery<i64, ValueShape> {
        self.push_as(Step::Count(Scope::Global), None)
    }

    pub fn count_local(&self) -> GremlinQuery<i64, ValueShape> {
        self.push_as(Step::Count(Scope::Local), None)
    }

    pub fn fold(&self) -> GremlinQuery<E, ArrayShape<S>> {
        self.push_as(Step::Fold, self.element)
    }

    pub fn dedup(&self) -> Self {
        self.push(Step::Dedup(Scope::Global))
    }

    /// Binds the current position to a fresh step label.
    pub fn as_label(&self) -> (Self, StepLabel<E, S>) {
        let next_label = self.next_label + 1;
        let name = format!("l{next_label}");
        let mut labels = (*self.labels).clone();
        labels.insert(name.clone(), self.element);

        let mut query = self.push(Step::As(name.clone()));
        query.labels = Arc::new(labels);
        query.next_label = next_label;
        debug!(label = %name, element = ?self.element, "bound step label");
        (query, StepLabel::new(name, self.element))
    }

    pub fn select<E2, S2>(&self, label: &StepLabel<E2, S2>) -> QueryResult<GremlinQuery<E2, S2>> {
        self.check_bound(label.name())?;
        Ok(self.push_as(Step::SelectLabel(label.name().to_string()), label.element()))
    }

    pub fn order(
        &self,
        build: impl FnOnce(OrderBuilder<E, S>) -> QueryResult<OrderBuilder<E, S>>,
    ) -> QueryResult<Self> {
        let (bys, next_label) = build(OrderBuilder::new(self.clone()))?.finish();
        Ok(self.push(Step::Order(bys)).with_next_label(next_label))
    }

    pub fn constant<T: Into<Value>>(&self, value: T) -> GremlinQuery<T, ValueShape> {
        self.push_as(Step::Constant(value.into()), None)
    }

    /// The traversal that is actually serialized, with the configured element
    /// projection applied to element results.
    fn serialized_traversal(&self) -> Traversal {
        let projection = self.env.options().element_projection;
        let is_element = matches!(S::KIND, ShapeKind::Vertex | ShapeKind::Edge);
        if !is_element
            || projection == ElementProjection::None
            || matches!(self.steps.peek(), Some(Step::Drop))
        {
            return self.to_traversal();
        }

        let properties = match S::KIND {
            ShapeKind::Vertex => {
                let mut inner: IndexMap<String, ProjectBy> = [
                    ("id".to_string(), ProjectBy::Key(Key::Id)),
                    ("label".to_string(), ProjectBy::Key(Key::Label)),
                    ("value".to_string(), ProjectBy::Key(Key::Value)),
                ]
                .into_iter()
                .collect();
                if projection == ElementProjection::PropertiesWithMeta {
                    inner.insert(
                        "properties".to_string(),
                        ProjectBy::Traversal(Traversal::single(Step::ValueMap(vec![]))),
                    );
                }
                Traversal::from_steps([
                    Step::Properties(vec![]),
                    Step::Group {
                        keys: GroupBy::Key(Key::Label),
                        values: Some(GroupBy::Traversal(Traversal::from_steps([
                            Step::Project(inner),
                            Step::Fold,
                        ]))),
                    },
                ])
            }
            // Edge properties carry no meta-properties.
            _ => Traversal::single(Step::ValueMap(vec![])),
        };
        let bys: IndexMap<String, ProjectBy> = [
            ("id".to_string(), ProjectBy::Key(Key::Id)),
            ("label".to_string(), ProjectBy::Key(Key::Label)),
            ("properties".to_string(), ProjectBy::Traversal(properties)),
        ]
        .into_iter()
        .collect();
        optimizer::append(&self.steps, Step::Project(bys)).to_traversal()
    }

    pub fn to_bytecode(&self) -> Bytecode {
        Bytecode::from_traversal(&self.serialized_traversal())
    }

    pub fn to_groovy(&self) -> GroovyScript {
        GroovyScript::from_bytecode(&self.to_bytecode(), self.env.options().groovy)
    }

    /// The query in the format configured for the executor.
    pub fn serialize(&self) -> SerializedQuery {
        match self.env.options().format {
            QueryFormat::Bytecode => SerializedQuery::Bytecode(self.to_bytecode()),
            QueryFormat::Groovy => SerializedQuery::Groovy(self.to_groovy()),
        }
    }

    /// Sends the query to the environment's executor and deserializes every result.
    pub fn execute<T: DeserializeOwned>(&self) -> QueryResult<Vec<T>> {
        let executor = self.env.executor().ok_or(QueryError::NoExecutor)?;
        let query = self.serialize();
        debug!(steps = self.steps.len(), "executing query");
        let results = executor.execute(&query)?;
        debug!(results = results.len(), "query returned");
        results
            .into_iter()
            .map(|result| serde_json::from_value(result).map_err(QueryError::from))
            .collect()
    }
}

/// Low-level access to a query, for callers that need to bypass the typed surface.
pub struct QueryAdmin<'q, E, S> {
    query: &'q GremlinQuery<E, S>,
}

impl<E, S> QueryAdmin<'_, E, S> {
    pub fn steps(&self) -> Vec<Step> {
        self.query.steps.to_vec()
    }

    pub fn environment(&self) -> &Arc<GremlinQueryEnvironment> {
        &self.query.env
    }

    pub fn bound_labels(&self) -> &BoundLabels {
        &self.query.labels
    }

    pub fn element_type(&self) -> Option<&'static str> {
        self.query.element
    }

    /// Appends a raw step. The optimizer still runs.
    pub fn add_step(&self, step: Step) -> GremlinQuery<E, S> {
        self.query.push(step)
    }

    /// Reinterprets the query as yielding `E2` in shape `S2`.
    pub fn change_query_type<E2, S2>(&self, element: Option<&'static str>) -> GremlinQuery<E2, S2> {
        self.query.retype(self.query.steps.clone(), element)
    }
}
