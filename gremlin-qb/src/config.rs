use crate::{
    errors::{QueryError, QueryResult},
    gremlinc::steps::TextPredicateKind,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options consulted while translating and serializing queries.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```json
/// { "filter_labels_verbosity": "minimum", "disabled_text_predicates": { "ending_with": true } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub disabled_text_predicates: DisabledTextPredicates,
    #[serde(default)]
    pub filter_labels_verbosity: FilterLabelsVerbosity,
    #[serde(default)]
    pub element_projection: ElementProjection,
    #[serde(default)]
    pub groovy: GroovyFormatting,
    #[serde(default)]
    pub format: QueryFormat,
}

impl QueryOptions {
    pub fn from_json_str(json: &str) -> QueryResult<Self> {
        serde_json::from_str(json).map_err(|e| QueryError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| QueryError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&contents)
    }
}

/// Text predicates the target provider does not support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisabledTextPredicates {
    pub starting_with: bool,
    pub ending_with: bool,
    pub containing: bool,
    pub not_starting_with: bool,
    pub not_ending_with: bool,
    pub not_containing: bool,
}

impl DisabledTextPredicates {
    pub fn all() -> Self {
        Self {
            starting_with: true,
            ending_with: true,
            containing: true,
            not_starting_with: true,
            not_ending_with: true,
            not_containing: true,
        }
    }

    pub fn is_disabled(&self, kind: TextPredicateKind) -> bool {
        match kind {
            TextPredicateKind::StartingWith => self.starting_with,
            TextPredicateKind::EndingWith => self.ending_with,
            TextPredicateKind::Containing => self.containing,
            TextPredicateKind::NotStartingWith => self.not_starting_with,
            TextPredicateKind::NotEndingWith => self.not_ending_with,
            TextPredicateKind::NotContaining => self.not_containing,
        }
    }
}

/// Whether a type filter that would match every label of its kind is still emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLabelsVerbosity {
    #[default]
    Maximum,
    Minimum,
}

/// Steps appended to element-returning queries before serialization so results come
/// back in a uniform shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementProjection {
    /// Elements are returned as the provider serializes them.
    #[default]
    None,
    /// `project('id','label','properties')` with vertex properties grouped by key
    /// into `id`/`label`/`value` maps.
    Properties,
    /// Like `Properties`, with each vertex property also carrying its
    /// meta-properties.
    PropertiesWithMeta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroovyFormatting {
    /// Literals are passed as bindings `_a`, `_b`, ...
    #[default]
    Bindings,
    Inline,
}

/// What [`crate::query::GremlinQuery::execute`] hands to the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryFormat {
    #[default]
    Bytecode,
    Groovy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let options = QueryOptions::from_json_str(
            r#"{ "filter_labels_verbosity": "minimum", "disabled_text_predicates": { "ending_with": true } }"#,
        )
        .unwrap();

        assert_eq!(options.filter_labels_verbosity, FilterLabelsVerbosity::Minimum);
        assert!(options.disabled_text_predicates.is_disabled(TextPredicateKind::EndingWith));
        assert!(!options.disabled_text_predicates.is_disabled(TextPredicateKind::StartingWith));
        assert_eq!(options.element_projection, ElementProjection::None);
        assert_eq!(options.groovy, GroovyFormatting::Bindings);
        assert_eq!(options.format, QueryFormat::Bytecode);
    }

    #[test]
    fn options_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "element_projection": "properties", "groovy": "inline" }}"#).unwrap();

        let options = QueryOptions::from_file(file.path()).unwrap();
        assert_eq!(options.element_projection, ElementProjection::Properties);
        assert_eq!(options.groovy, GroovyFormatting::Inline);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = QueryOptions::from_json_str(r#"{ "groovy": "fancy" }"#).unwrap_err();
        assert!(matches!(err, QueryError::Config(_)));
    }
}
