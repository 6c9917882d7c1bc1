use crate::{
    gremlinc::steps::{Scope, Step},
    query::{
        GremlinQuery,
        shapes::{ArrayShape, Shape, ValueShape},
    },
};

impl<E> GremlinQuery<E, ValueShape> {
    pub fn sum(&self) -> Self {
        self.push(Step::Sum(Scope::Global))
    }

    pub fn min(&self) -> Self {
        self.push(Step::Min(Scope::Global))
    }

    pub fn max(&self) -> Self {
        self.push(Step::Max(Scope::Global))
    }

    pub fn mean(&self) -> GremlinQuery<f64, ValueShape> {
        self.push_as(Step::Mean(Scope::Global), None)
    }
}

impl<E, S: Shape> GremlinQuery<E, ArrayShape<S>> {
    pub fn unfold(&self) -> GremlinQuery<E, S> {
        self.push_as(Step::Unfold, self.element)
    }
}

// aggregates over each folded list
impl<E> GremlinQuery<E, ArrayShape<ValueShape>> {
    pub fn sum_local(&self) -> GremlinQuery<E, ValueShape> {
        self.push_as(Step::Sum(Scope::Local), None)
    }

    pub fn min_local(&self) -> GremlinQuery<E, ValueShape> {
        self.push_as(Step::Min(Scope::Local), None)
    }

    pub fn max_local(&self) -> GremlinQuery<E, ValueShape> {
        self.push_as(Step::Max(Scope::Local), None)
    }

    pub fn mean_local(&self) -> GremlinQuery<f64, ValueShape> {
        self.push_as(Step::Mean(Scope::Local), None)
    }
}
