use crate::{
    config::FilterLabelsVerbosity,
    errors::{QueryError, QueryResult},
    gremlinc::steps::Key,
    model::{
        EDGE_ROOT, ElementKind, FilterLabels, GraphModel, MemberKind, MemberMetadata,
        SerializationBehaviour, VERTEX_ROOT,
    },
};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
struct ElementDefinition {
    kind: ElementKind,
    label: String,
    base: Option<String>,
    is_abstract: bool,
    members: IndexMap<String, MemberMetadata>,
}

/// A graph model registered up front through [`GraphModelBuilder`].
///
/// Every vertex type derives from [`VERTEX_ROOT`] and every edge type from
/// [`EDGE_ROOT`] unless another base is given. Members are inherited along the base
/// chain, and `Id`/`Label` resolve to the `T.id`/`T.label` tokens on every type.
#[derive(Debug, Clone)]
pub struct StaticGraphModel {
    elements: IndexMap<String, ElementDefinition>,
}

impl StaticGraphModel {
    pub fn builder() -> GraphModelBuilder {
        GraphModelBuilder::new()
    }

    fn ancestors<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a ElementDefinition> + 'a {
        let mut next = Some(element);
        std::iter::from_fn(move || {
            let current = self.elements.get(next?)?;
            next = current.base.as_deref();
            Some(current)
        })
    }

    fn derives_from(&self, element: &str, ancestor: &str) -> bool {
        let mut next = Some(element);
        while let Some(name) = next {
            if name == ancestor {
                return true;
            }
            next = self.elements.get(name).and_then(|def| def.base.as_deref());
        }
        false
    }

    fn concrete_labels(&self, ancestor: &str) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for (name, def) in &self.elements {
            if !def.is_abstract
                && self.derives_from(name, ancestor)
                && !labels.contains(&def.label)
            {
                labels.push(def.label.clone());
            }
        }
        labels
    }
}

impl GraphModel for StaticGraphModel {
    fn element_kind(&self, element: &str) -> Option<ElementKind> {
        self.elements.get(element).map(|def| def.kind)
    }

    fn element_label(&self, element: &str) -> Option<String> {
        self.elements
            .get(element)
            .filter(|def| !def.is_abstract)
            .map(|def| def.label.clone())
    }

    fn resolve_member(&self, element: &str, member: &str) -> Option<MemberMetadata> {
        self.elements.get(element)?;
        if let Some(metadata) = self
            .ancestors(element)
            .find_map(|def| def.members.get(member))
        {
            return Some(metadata.clone());
        }
        match member {
            "Id" | "id" => Some(MemberMetadata {
                key: Key::Id,
                kind: MemberKind::Scalar,
                serialization: SerializationBehaviour::IgnoreOnUpdate,
            }),
            "Label" | "label" => Some(MemberMetadata {
                key: Key::Label,
                kind: MemberKind::Scalar,
                serialization: SerializationBehaviour::IgnoreAlways,
            }),
            _ => None,
        }
    }

    fn filter_labels(
        &self,
        element: &str,
        verbosity: FilterLabelsVerbosity,
    ) -> Option<FilterLabels> {
        let def = self.elements.get(element)?;
        if element == VERTEX_ROOT || element == EDGE_ROOT {
            return Some(FilterLabels::Unfiltered);
        }
        let labels = self.concrete_labels(element);
        if verbosity == FilterLabelsVerbosity::Minimum {
            let root = match def.kind {
                ElementKind::Vertex => VERTEX_ROOT,
                ElementKind::Edge => EDGE_ROOT,
            };
            let all = self.concrete_labels(root);
            if all.iter().all(|label| labels.contains(label)) {
                return Some(FilterLabels::Unfiltered);
            }
        }
        Some(FilterLabels::Labels(labels))
    }
}

pub struct GraphModelBuilder {
    elements: IndexMap<String, ElementDefinition>,
}

impl GraphModelBuilder {
    pub fn new() -> Self {
        let mut elements = IndexMap::new();
        for (name, kind) in [(VERTEX_ROOT, ElementKind::Vertex), (EDGE_ROOT, ElementKind::Edge)] {
            elements.insert(
                name.to_string(),
                ElementDefinition {
                    kind,
                    label: name.to_string(),
                    base: None,
                    is_abstract: true,
                    members: IndexMap::new(),
                },
            );
        }
        Self { elements }
    }

    pub fn vertex(self, name: &str, configure: impl FnOnce(ElementBuilder) -> ElementBuilder) -> Self {
        self.element(name, ElementKind::Vertex, configure)
    }

    pub fn edge(self, name: &str, configure: impl FnOnce(ElementBuilder) -> ElementBuilder) -> Self {
        self.element(name, ElementKind::Edge, configure)
    }

    fn element(
        mut self,
        name: &str,
        kind: ElementKind,
        configure: impl FnOnce(ElementBuilder) -> ElementBuilder,
    ) -> Self {
        let root = match kind {
            ElementKind::Vertex => VERTEX_ROOT,
            ElementKind::Edge => EDGE_ROOT,
        };
        let builder = configure(ElementBuilder {
            definition: ElementDefinition {
                kind,
                label: name.to_string(),
                base: Some(root.to_string()),
                is_abstract: false,
                members: IndexMap::new(),
            },
        });
        self.elements.insert(name.to_string(), builder.definition);
        self
    }

    /// Fails when a base is unknown, of another kind, or part of a cycle.
    pub fn build(self) -> QueryResult<StaticGraphModel> {
        for (name, def) in &self.elements {
            let mut seen = vec![name.as_str()];
            let mut next = def.base.as_deref();
            while let Some(base) = next {
                let base_def = self.elements.get(base).ok_or_else(|| {
                    QueryError::invalid_argument("base", format!("{name} derives from unknown type {base}"))
                })?;
                if base_def.kind != def.kind {
                    return Err(QueryError::invalid_argument(
                        "base",
                        format!("{name} and its base {base} are of different kinds"),
                    ));
                }
                if seen.contains(&base) {
                    return Err(QueryError::invalid_argument(
                        "base",
                        format!("the base chain of {name} cycles through {base}"),
                    ));
                }
                seen.push(base);
                next = base_def.base.as_deref();
            }
        }
        Ok(StaticGraphModel {
            elements: self.elements,
        })
    }
}

impl Default for GraphModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ElementBuilder {
    definition: ElementDefinition,
}

impl ElementBuilder {
    /// Derives from another registered type of the same kind.
    pub fn base(mut self, base: &str) -> Self {
        self.definition.base = Some(base.to_string());
        self
    }

    /// Overrides the wire label, which defaults to the type name.
    pub fn label(mut self, label: &str) -> Self {
        self.definition.label = label.to_string();
        self
    }

    /// Abstract types never match a label themselves, only through derived types.
    pub fn abstract_type(mut self) -> Self {
        self.definition.is_abstract = true;
        self
    }

    pub fn member(self, name: &str, key: &str) -> Self {
        self.member_with(name, Key::named(key), MemberKind::Scalar)
    }

    pub fn collection(self, name: &str, key: &str) -> Self {
        self.member_with(name, Key::named(key), MemberKind::Collection)
    }

    pub fn vertex_property(self, name: &str, key: &str) -> Self {
        self.member_with(name, Key::named(key), MemberKind::VertexProperty)
    }

    pub fn member_with(mut self, name: &str, key: Key, kind: MemberKind) -> Self {
        self.definition
            .members
            .insert(name.to_string(), MemberMetadata::new(key, kind));
        self
    }

    /// Sets how a previously registered member is written by `addV`/`addE`.
    pub fn serialization(mut self, name: &str, behaviour: SerializationBehaviour) -> Self {
        if let Some(member) = self.definition.members.get_mut(name) {
            member.serialization = behaviour;
        }
        self
    }
}
