//! Mapping from model element types and their members to wire labels and keys.

pub mod key_cache;
pub mod static_model;

pub use key_cache::MemberCache;
pub use static_model::{ElementBuilder, GraphModelBuilder, StaticGraphModel};

use crate::{config::FilterLabelsVerbosity, gremlinc::steps::Key};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Name of the implicit root of every vertex type.
pub const VERTEX_ROOT: &str = "Vertex";
/// Name of the implicit root of every edge type.
pub const EDGE_ROOT: &str = "Edge";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    /// A single value.
    Scalar,
    /// A multi-valued property; `has(key, v)` matches when any value matches.
    Collection,
    /// A vertex property object whose `Value` member is the property value itself.
    VertexProperty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializationBehaviour {
    #[default]
    Default,
    IgnoreOnAdd,
    IgnoreOnUpdate,
    IgnoreAlways,
}

impl SerializationBehaviour {
    pub fn skip_on_add(self) -> bool {
        matches!(self, Self::IgnoreOnAdd | Self::IgnoreAlways)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberMetadata {
    pub key: Key,
    pub kind: MemberKind,
    pub serialization: SerializationBehaviour,
}

impl MemberMetadata {
    pub fn new(key: Key, kind: MemberKind) -> Self {
        Self {
            key,
            kind,
            serialization: SerializationBehaviour::Default,
        }
    }
}

/// Labels a type filter should match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterLabels {
    /// The type covers every element of its kind; no filter step is needed.
    Unfiltered,
    Labels(Vec<String>),
}

/// Read-only view of the graph model consulted during translation.
pub trait GraphModel: Send + Sync + Debug {
    fn element_kind(&self, element: &str) -> Option<ElementKind>;

    /// Wire label of a concrete element type.
    fn element_label(&self, element: &str) -> Option<String>;

    fn resolve_member(&self, element: &str, member: &str) -> Option<MemberMetadata>;

    /// `None` when the element type is unknown.
    fn filter_labels(
        &self,
        element: &str,
        verbosity: FilterLabelsVerbosity,
    ) -> Option<FilterLabels>;
}
