mod support;

use gremlin_qb::{
    Expression, QueryError, QueryExecutor, QueryOptions, QueryResult, Value,
    config::{ElementProjection, GroovyFormatting, QueryFormat},
    gremlinc::serializer::SerializedQuery,
};
use indexmap::IndexMap;
use serde_json::json;
use std::{
    io::Write,
    sync::{Arc, Mutex},
};
use support::{Person, WorksFor, environment, g_with};

/// Records every query and answers with canned results.
#[derive(Default)]
struct RecordingExecutor {
    queries: Mutex<Vec<SerializedQuery>>,
    results: Vec<serde_json::Value>,
}

impl RecordingExecutor {
    fn returning(results: Vec<serde_json::Value>) -> Arc<Self> {
        Arc::new(Self {
            queries: Mutex::new(Vec::new()),
            results,
        })
    }
}

impl QueryExecutor for RecordingExecutor {
    fn execute(&self, query: &SerializedQuery) -> QueryResult<Vec<serde_json::Value>> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.results.clone())
    }
}

#[test]
fn test_groovy_bindings() {
    let query = g_with(QueryOptions::default())
        .v::<Person>(&[])
        .unwrap()
        .where_(r#"t => t.Name.StartsWith("A") && t.Age != 36"#)
        .unwrap();

    let groovy = query.to_groovy();
    assert_eq!(
        groovy.script,
        "g.V().hasLabel(_a).has(_b, TextP.startingWith(_c)).has(_d, neq(_e))"
    );
    assert_eq!(groovy.bindings["_a"], Value::from("Person"));
    assert_eq!(groovy.bindings["_b"], Value::from("name"));
    assert_eq!(groovy.bindings["_c"], Value::from("A"));
    assert_eq!(groovy.bindings["_d"], Value::from("age"));
    assert_eq!(groovy.bindings["_e"], Value::I64(36));
}

#[test]
fn test_bytecode_json() {
    let query = g_with(QueryOptions::default())
        .v::<Person>(&[])
        .unwrap()
        .where_("t => t.Age == 36 && (t.Age == 42 || t.Age == 99)")
        .unwrap();

    assert_eq!(
        query.to_bytecode().to_json(),
        json!({ "step": [
            ["V"],
            ["hasLabel", "Person"],
            ["and",
                { "bytecode": { "step": [["has", "age", { "P": "eq", "value": 36 }]] } },
                { "bytecode": { "step": [["or",
                    { "bytecode": { "step": [["has", "age", { "P": "eq", "value": 42 }]] } },
                    { "bytecode": { "step": [["has", "age", { "P": "eq", "value": 99 }]] } },
                ]] } },
            ],
        ]})
    );
}

#[test]
fn test_serialized_query_shapes() {
    let people = g_with(QueryOptions::default()).v::<Person>(&[]).unwrap();

    let bytecode = serde_json::to_value(people.serialize()).unwrap();
    assert_eq!(bytecode, json!({ "step": [["V"], ["hasLabel", "Person"]] }));

    let groovy = g_with(QueryOptions {
        format: QueryFormat::Groovy,
        ..Default::default()
    })
    .v::<Person>(&[])
    .unwrap()
    .serialize();
    assert_eq!(
        serde_json::to_value(groovy).unwrap(),
        json!({ "script": "g.V().hasLabel(_a)", "bindings": { "_a": "Person" } })
    );
}

#[test]
fn test_element_projection() {
    let inline = |projection| QueryOptions {
        element_projection: projection,
        groovy: GroovyFormatting::Inline,
        ..Default::default()
    };

    let people = g_with(inline(ElementProjection::Properties))
        .v::<Person>(&[])
        .unwrap();
    assert_eq!(
        people.to_groovy().script,
        "g.V().hasLabel('Person').project('id', 'label', 'properties').by(T.id).by(T.label)\
         .by(__.properties().group().by(T.label)\
         .by(__.project('id', 'label', 'value').by(T.id).by(T.label).by(T.value).fold()))"
    );
    // the projection is a serialization concern only
    assert_eq!(people.as_admin().steps().len(), 2);
    assert_eq!(
        people.count().to_groovy().script,
        "g.V().hasLabel('Person').count()"
    );
    assert_eq!(
        people.drop().to_groovy().script,
        "g.V().hasLabel('Person').drop()"
    );

    let with_meta = g_with(inline(ElementProjection::PropertiesWithMeta));
    assert_eq!(
        with_meta.v::<Person>(&[]).unwrap().to_groovy().script,
        "g.V().hasLabel('Person').project('id', 'label', 'properties').by(T.id).by(T.label)\
         .by(__.properties().group().by(T.label)\
         .by(__.project('id', 'label', 'value', 'properties')\
         .by(T.id).by(T.label).by(T.value).by(__.valueMap()).fold()))"
    );
    assert_eq!(
        with_meta.e::<WorksFor>(&[]).unwrap().to_groovy().script,
        "g.E().hasLabel('worksFor').project('id', 'label', 'properties').by(T.id).by(T.label).by(__.valueMap())"
    );
}

#[test]
fn test_execute_deserializes_results() {
    let executor = RecordingExecutor::returning(vec![json!(36), json!(42)]);
    let g = environment().with_executor(executor.clone()).g();

    let ages: Vec<i64> = g
        .v::<Person>(&[])
        .unwrap()
        .values::<i64, _>(["t => t.Age"])
        .unwrap()
        .execute()
        .unwrap();
    assert_eq!(ages, vec![36, 42]);

    let queries = executor.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert!(matches!(&queries[0], SerializedQuery::Bytecode(_)));
}

#[test]
fn test_execute_with_groovy_format() {
    let executor = RecordingExecutor::returning(vec![json!(3)]);
    let g = environment()
        .configure_options(|options| QueryOptions {
            format: QueryFormat::Groovy,
            ..options
        })
        .with_executor(executor.clone())
        .g();

    let counts: Vec<i64> = g.v::<Person>(&[]).unwrap().count().execute().unwrap();
    assert_eq!(counts, vec![3]);

    let queries = executor.queries.lock().unwrap();
    let SerializedQuery::Groovy(script) = &queries[0] else {
        panic!("expected a groovy script");
    };
    assert_eq!(script.script, "g.V().hasLabel(_a).count()");
}

#[test]
fn test_execute_errors() {
    let query = environment().g().v::<Person>(&[]).unwrap().count();
    assert!(matches!(query.execute::<i64>(), Err(QueryError::NoExecutor)));

    let executor = RecordingExecutor::returning(vec![json!("not a number")]);
    let query = environment()
        .with_executor(executor)
        .g()
        .v::<Person>(&[])
        .unwrap()
        .count();
    assert!(matches!(query.execute::<i64>(), Err(QueryError::Serialization(_))));
}

#[test]
fn test_options_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "groovy": "inline", "disabled_text_predicates": {{ "starting_with": true }} }}"#
    )
    .unwrap();

    let options = QueryOptions::from_file(file.path()).unwrap();
    let people = g_with(options).v::<Person>(&[]).unwrap();

    assert_eq!(people.to_groovy().script, "g.V().hasLabel('Person')");
    assert!(matches!(
        people.where_(r#"t => t.Name.StartsWith("A")"#),
        Err(QueryError::DisabledTextPredicate { .. })
    ));
    assert!(people.where_(r#"t => t.Name.EndsWith("A")"#).is_ok());
}

#[test]
fn test_inline_literals_stay_valid_groovy() {
    let g = support::g();
    let name = |text: &str| {
        g.v::<Person>(&[])
            .unwrap()
            .where_(Expression::lambda(
                "t",
                Expression::parameter("t").member("Name").eq(text),
            ))
            .unwrap()
            .to_groovy()
            .script
    };
    assert_eq!(
        name("a\nb\t'c'\r\\"),
        r"g.V().hasLabel('Person').has('name', eq('a\nb\t\'c\'\r\\'))"
    );

    let score = g
        .v::<Person>(&[])
        .unwrap()
        .where_(Expression::lambda(
            "t",
            Expression::parameter("t").member("Age").eq(36.0f64),
        ))
        .unwrap();
    assert_eq!(
        score.to_groovy().script,
        "g.V().hasLabel('Person').has('age', eq(36.0d))"
    );
    assert_eq!(g.inject([0.5f32]).to_groovy().script, "g.inject(0.5f)");
    assert_eq!(g.inject([f64::NAN]).to_groovy().script, "g.inject(Double.NaN)");

    let object: IndexMap<String, Value> = [("it's".to_string(), Value::I64(1))].into_iter().collect();
    assert_eq!(
        g.inject([Value::Object(object)]).to_groovy().script,
        r"g.inject(['it\'s': 1])"
    );
}
