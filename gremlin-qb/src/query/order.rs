use crate::{
    errors::QueryResult,
    gremlinc::steps::{Order, OrderBy, OrderTarget},
    query::{GremlinQuery, IntoExpression, shapes::Shape},
};

/// Collects the `by` modulators of an `order()` step.
pub struct OrderBuilder<E, S> {
    query: GremlinQuery<E, S>,
    bys: Vec<OrderBy>,
}

impl<E, S> OrderBuilder<E, S> {
    pub(crate) fn new(query: GremlinQuery<E, S>) -> Self {
        Self {
            query,
            bys: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> (Vec<OrderBy>, usize) {
        (self.bys, self.query.next_label)
    }
}

impl<E, S: Shape> OrderBuilder<E, S> {
    /// Ascending by the member a lambda selects.
    pub fn by(self, projection: impl IntoExpression) -> QueryResult<Self> {
        self.by_member(projection, Order::Asc)
    }

    pub fn by_descending(self, projection: impl IntoExpression) -> QueryResult<Self> {
        self.by_member(projection, Order::Desc)
    }

    fn by_member(mut self, projection: impl IntoExpression, order: Order) -> QueryResult<Self> {
        let expression = projection.into_expression()?;
        let key = self
            .query
            .translator()
            .translate_projection(&expression, self.query.binding())?;
        self.bys.push(OrderBy {
            target: OrderTarget::Key(key),
            order,
        });
        Ok(self)
    }

    /// Orders by the first result of a sub-query.
    pub fn by_traversal<X, Y>(
        mut self,
        build: impl FnOnce(GremlinQuery<E, S>) -> QueryResult<GremlinQuery<X, Y>>,
        order: Order,
    ) -> QueryResult<Self> {
        let (traversal, next_label) = self.query.subquery(build)?;
        self.query.next_label = next_label;
        self.bys.push(OrderBy {
            target: OrderTarget::Traversal(traversal),
            order,
        });
        Ok(self)
    }

    /// Orders by the traverser itself.
    pub fn by_value(mut self, order: Order) -> Self {
        self.bys.push(OrderBy {
            target: OrderTarget::Value,
            order,
        });
        self
    }
}
