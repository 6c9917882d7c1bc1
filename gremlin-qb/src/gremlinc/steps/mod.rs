//! The provider-agnostic step vocabulary.

pub mod predicate;
pub mod step;
pub mod traversal;

pub use predicate::{P, TextPredicateKind};
pub use step::{
    EdgeEndpoint, GroupBy, LimitStep, LogicalKind, LogicalStep, Order, OrderBy, OrderTarget,
    ProjectBy, PropertyBinding, RangeStep, SkipStep, Step, TailStep,
};
pub use traversal::{StepStack, Traversal};

use serde::{Deserialize, Serialize};
use std::{fmt, marker::PhantomData};

/// Wire-level property key a member resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Id,
    Label,
    Key,
    Value,
    Named(String),
}

impl Key {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// `T` tokens never appear as plain property names on the wire.
    pub fn is_token(&self) -> bool {
        !matches!(self, Self::Named(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Id => write!(f, "T.id"),
            Key::Label => write!(f, "T.label"),
            Key::Key => write!(f, "T.key"),
            Key::Value => write!(f, "T.value"),
            Key::Named(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Global,
    Local,
}

/// A name bound to a position of a query with `as`, typed by the element and shape it
/// captures.
pub struct StepLabel<E, S> {
    name: String,
    element: Option<&'static str>,
    _marker: PhantomData<fn() -> (E, S)>,
}

impl<E, S> StepLabel<E, S> {
    pub(crate) fn new(name: String, element: Option<&'static str>) -> Self {
        Self {
            name,
            element,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The model element type of the labelled position, if it is an element.
    pub fn element(&self) -> Option<&'static str> {
        self.element
    }
}

impl<E, S> Clone for StepLabel<E, S> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone(), self.element)
    }
}

impl<E, S> fmt::Debug for StepLabel<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepLabel")
            .field("name", &self.name)
            .field("element", &self.element)
            .finish()
    }
}

impl<E, S> PartialEq for StepLabel<E, S> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
