//! Strongly-typed Gremlin query builder.
//!
//! Typed predicate and projection expressions are compiled into a provider-agnostic
//! step sequence ([`Traversal`]) which is optimized as it is built and serialized to
//! Gremlin bytecode or a Groovy script.

pub mod config;
pub mod errors;
pub mod gremlinc;
pub mod model;
pub mod protocol;
pub mod query;

pub use config::QueryOptions;
pub use errors::{QueryError, QueryResult};
pub use gremlinc::expression::{Expression, ExpressionType};
pub use gremlinc::steps::{Key, P, Scope, Step, StepLabel, Traversal};
pub use model::{GraphModel, StaticGraphModel};
pub use protocol::value::Value;
pub use query::{
    Branches, GremlinQuery, GremlinQuerySource, IntoExpression, OrderBuilder, ProjectBuilder,
    QueryAdmin,
    environment::{GremlinQueryEnvironment, QueryExecutor},
    shapes::{
        AnyEdge, AnyVertex, ArrayShape, EdgeElement, EdgeShape, Element, ValueShape,
        VertexElement, VertexShape,
    },
};
