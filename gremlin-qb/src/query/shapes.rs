//! Marker types that give queries their static shape.

use crate::model::{EDGE_ROOT, VERTEX_ROOT};
use std::marker::PhantomData;

/// A model element type. `NAME` is the type name registered in the graph model.
pub trait Element: 'static {
    const NAME: &'static str;
}

pub trait VertexElement: Element {}

pub trait EdgeElement: Element {}

/// Any vertex, regardless of label.
#[derive(Debug, Clone, Copy)]
pub struct AnyVertex;

impl Element for AnyVertex {
    const NAME: &'static str = VERTEX_ROOT;
}
impl VertexElement for AnyVertex {}

/// Any edge, regardless of label.
#[derive(Debug, Clone, Copy)]
pub struct AnyEdge;

impl Element for AnyEdge {
    const NAME: &'static str = EDGE_ROOT;
}
impl EdgeElement for AnyEdge {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Vertex,
    Edge,
    Value,
    Array,
}

pub trait Shape: 'static {
    const KIND: ShapeKind;
}

/// Shapes whose traversers are graph elements with members.
pub trait ElementShape: Shape {}

#[derive(Debug, Clone, Copy)]
pub struct VertexShape;

#[derive(Debug, Clone, Copy)]
pub struct EdgeShape;

#[derive(Debug, Clone, Copy)]
pub struct ValueShape;

/// The result of `fold()`, remembering the shape `unfold()` returns to.
#[derive(Debug, Clone, Copy)]
pub struct ArrayShape<S>(PhantomData<S>);

impl Shape for VertexShape {
    const KIND: ShapeKind = ShapeKind::Vertex;
}
impl Shape for EdgeShape {
    const KIND: ShapeKind = ShapeKind::Edge;
}
impl Shape for ValueShape {
    const KIND: ShapeKind = ShapeKind::Value;
}
impl<S: Shape> Shape for ArrayShape<S> {
    const KIND: ShapeKind = ShapeKind::Array;
}

impl ElementShape for VertexShape {}
impl ElementShape for EdgeShape {}

/// Declares unit structs as model element types.
///
/// ```
/// gremlin_qb::elements! {
///     vertex Person;
///     edge WorksFor;
/// }
/// ```
#[macro_export]
macro_rules! elements {
    ($($kind:ident $name:ident;)*) => {
        $(
            $crate::elements!(@one $kind $name);
        )*
    };
    (@one vertex $name:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;
        impl $crate::query::shapes::Element for $name {
            const NAME: &'static str = stringify!($name);
        }
        impl $crate::query::shapes::VertexElement for $name {}
    };
    (@one edge $name:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;
        impl $crate::query::shapes::Element for $name {
            const NAME: &'static str = stringify!($name);
        }
        impl $crate::query::shapes::EdgeElement for $name {}
    };
}
