use crate::{
    gremlinc::steps::{
        EdgeEndpoint, GroupBy, Key, LogicalKind, Order, OrderTarget, P, ProjectBy, Scope, Step,
        Traversal,
    },
    protocol::value::Value,
};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue, json};

/// Gremlin bytecode: the traversal as a flat list of `operator(arguments...)` instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct Bytecode {
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub operator: &'static str,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Value(Value),
    /// `T.id`, `T.label`, ...
    Token(Key),
    Predicate(P),
    Bytecode(Bytecode),
    /// `local`, `asc`, `desc`
    Enum(&'static str),
}

impl Instruction {
    fn new(operator: &'static str, arguments: Vec<Argument>) -> Self {
        Self {
            operator,
            arguments,
        }
    }
}

impl Bytecode {
    pub fn from_traversal(traversal: &Traversal) -> Self {
        let mut instructions = Vec::with_capacity(traversal.len());
        for step in traversal {
            lower_step(step, &mut instructions);
        }
        Self { instructions }
    }

    /// Traversals that start at a graph source are spawned from `g`, all others are
    /// anonymous.
    pub fn is_spawned_from_source(&self) -> bool {
        matches!(
            self.instructions.first().map(|i| i.operator),
            Some("V" | "E" | "addV" | "addE" | "inject")
        )
    }

    pub fn to_json(&self) -> JsonValue {
        let steps = self
            .instructions
            .iter()
            .map(|instruction| {
                let mut row = vec![JsonValue::String(instruction.operator.to_string())];
                row.extend(instruction.arguments.iter().map(Argument::to_json));
                JsonValue::Array(row)
            })
            .collect();
        json!({ "step": JsonValue::Array(steps) })
    }
}

impl Argument {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Argument::Value(value) => serde_json::to_value(value).unwrap_or(JsonValue::Null),
            Argument::Token(key) => match key {
                Key::Named(name) => JsonValue::String(name.clone()),
                Key::Id => json!({ "T": "id" }),
                Key::Label => json!({ "T": "label" }),
                Key::Key => json!({ "T": "key" }),
                Key::Value => json!({ "T": "value" }),
            },
            Argument::Predicate(p) => predicate_json(p),
            Argument::Bytecode(bytecode) => json!({ "bytecode": bytecode.to_json() }),
            Argument::Enum(name) => json!({ "enum": name }),
        }
    }
}

fn predicate_json(p: &P) -> JsonValue {
    let value = match p {
        P::Eq(v) | P::Neq(v) | P::Lt(v) | P::Lte(v) | P::Gt(v) | P::Gte(v) => {
            serde_json::to_value(v).unwrap_or(JsonValue::Null)
        }
        P::Within(values) | P::Without(values) => {
            serde_json::to_value(values).unwrap_or(JsonValue::Null)
        }
        P::Text(_, text) => JsonValue::String(text.clone()),
    };
    let mut map = Map::new();
    let kind = if matches!(p, P::Text(_, _)) { "TextP" } else { "P" };
    map.insert(kind.to_string(), JsonValue::String(p.operator().to_string()));
    map.insert("value".to_string(), value);
    JsonValue::Object(map)
}

impl Serialize for Bytecode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn values(values: &[Value]) -> Vec<Argument> {
    values.iter().cloned().map(Argument::Value).collect()
}

fn labels(labels: &[String]) -> Vec<Argument> {
    labels
        .iter()
        .map(|label| Argument::Value(Value::String(label.clone())))
        .collect()
}

fn count(value: u64) -> Argument {
    Argument::Value(Value::I64(i64::try_from(value).unwrap_or(i64::MAX)))
}

fn nested(traversal: &Traversal) -> Argument {
    Argument::Bytecode(Bytecode::from_traversal(traversal))
}

fn scoped(scope: Scope, mut arguments: Vec<Argument>) -> Vec<Argument> {
    if scope == Scope::Local {
        arguments.insert(0, Argument::Enum("local"));
    }
    arguments
}

fn order(order: Order) -> Argument {
    Argument::Enum(match order {
        Order::Asc => "asc",
        Order::Desc => "desc",
    })
}

fn lower_step(step: &Step, out: &mut Vec<Instruction>) {
    let instruction = match step {
        Step::Identity => Instruction::new("identity", vec![]),
        Step::None => Instruction::new("none", vec![]),
        Step::V(ids) => Instruction::new("V", values(ids)),
        Step::E(ids) => Instruction::new("E", values(ids)),
        Step::Inject(items) => Instruction::new("inject", values(items)),
        Step::AddV { label, properties } | Step::AddE { label, properties } => {
            let operator = if matches!(step, Step::AddV { .. }) { "addV" } else { "addE" };
            out.push(Instruction::new(
                operator,
                vec![Argument::Value(Value::String(label.clone()))],
            ));
            for binding in properties {
                out.push(Instruction::new(
                    "property",
                    vec![
                        Argument::Token(binding.key.clone()),
                        Argument::Value(binding.value.clone()),
                    ],
                ));
            }
            return;
        }
        Step::From(endpoint) | Step::To(endpoint) => {
            let operator = if matches!(step, Step::From(_)) { "from" } else { "to" };
            let argument = match endpoint {
                EdgeEndpoint::Label(label) => Argument::Value(Value::String(label.clone())),
                EdgeEndpoint::Traversal(traversal) => nested(traversal),
            };
            Instruction::new(operator, vec![argument])
        }
        Step::Out(l) => Instruction::new("out", labels(l)),
        Step::In(l) => Instruction::new("in", labels(l)),
        Step::Both(l) => Instruction::new("both", labels(l)),
        Step::OutE(l) => Instruction::new("outE", labels(l)),
        Step::InE(l) => Instruction::new("inE", labels(l)),
        Step::BothE(l) => Instruction::new("bothE", labels(l)),
        Step::OutV => Instruction::new("outV", vec![]),
        Step::InV => Instruction::new("inV", vec![]),
        Step::OtherV => Instruction::new("otherV", vec![]),
        Step::BothV => Instruction::new("bothV", vec![]),
        Step::HasLabel(l) => Instruction::new("hasLabel", labels(l)),
        Step::Has { key, predicate } => Instruction::new(
            "has",
            vec![
                Argument::Token(key.clone()),
                Argument::Predicate(predicate.clone()),
            ],
        ),
        Step::HasKey(key) => Instruction::new("has", vec![Argument::Token(key.clone())]),
        Step::HasNot(key) => Instruction::new("hasNot", vec![Argument::Token(key.clone())]),
        Step::HasTraversal { key, body } => {
            Instruction::new("has", vec![Argument::Token(key.clone()), nested(body)])
        }
        Step::Is(p) => Instruction::new("is", vec![Argument::Predicate(p.clone())]),
        Step::WherePredicate(p) => Instruction::new("where", vec![Argument::Predicate(p.clone())]),
        Step::FilterTraversal(body) => Instruction::new("where", vec![nested(body)]),
        Step::Logical(logical) => Instruction::new(
            match logical.kind() {
                LogicalKind::And => "and",
                LogicalKind::Or => "or",
            },
            logical.branches().iter().map(nested).collect(),
        ),
        Step::Not(body) => Instruction::new("not", vec![nested(body)]),
        Step::Range(range) => Instruction::new(
            "range",
            scoped(
                range.scope(),
                vec![
                    count(range.lower()),
                    Argument::Value(Value::I64(range.upper())),
                ],
            ),
        ),
        Step::Limit(limit) => Instruction::new(
            "limit",
            scoped(limit.scope(), vec![count(limit.count())]),
        ),
        Step::Skip(skip) => Instruction::new(
            "skip",
            scoped(skip.scope(), vec![count(skip.count())]),
        ),
        Step::Tail(tail) => Instruction::new(
            "tail",
            scoped(tail.scope(), vec![count(tail.count())]),
        ),
        Step::Values(keys) => Instruction::new(
            "values",
            keys.iter().cloned().map(Argument::Token).collect(),
        ),
        Step::Properties(keys) => Instruction::new(
            "properties",
            keys.iter().cloned().map(Argument::Token).collect(),
        ),
        Step::ValueMap(keys) => Instruction::new(
            "valueMap",
            keys.iter().cloned().map(Argument::Token).collect(),
        ),
        Step::Id => Instruction::new("id", vec![]),
        Step::Label => Instruction::new("label", vec![]),
        Step::Project(bys) => {
            out.push(Instruction::new(
                "project",
                bys.keys()
                    .map(|name| Argument::Value(Value::String(name.clone())))
                    .collect(),
            ));
            for by in bys.values() {
                let arguments = match by {
                    ProjectBy::Identity => vec![],
                    ProjectBy::Key(key) => vec![Argument::Token(key.clone())],
                    ProjectBy::Traversal(traversal) => vec![nested(traversal)],
                };
                out.push(Instruction::new("by", arguments));
            }
            return;
        }
        Step::Group { keys, values } => {
            out.push(Instruction::new("group", vec![]));
            for by in std::iter::once(keys).chain(values) {
                let argument = match by {
                    GroupBy::Key(key) => Argument::Token(key.clone()),
                    GroupBy::Traversal(traversal) => nested(traversal),
                };
                out.push(Instruction::new("by", vec![argument]));
            }
            return;
        }
        Step::As(label) => Instruction::new("as", vec![Argument::Value(Value::String(label.clone()))]),
        Step::SelectLabel(label) => {
            Instruction::new("select", vec![Argument::Value(Value::String(label.clone()))])
        }
        Step::Count(scope) => Instruction::new("count", scoped(*scope, vec![])),
        Step::Fold => Instruction::new("fold", vec![]),
        Step::Unfold => Instruction::new("unfold", vec![]),
        Step::Dedup(scope) => Instruction::new("dedup", scoped(*scope, vec![])),
        Step::Order(bys) => {
            out.push(Instruction::new("order", vec![]));
            for by in bys {
                let arguments = match &by.target {
                    OrderTarget::Value => vec![order(by.order)],
                    OrderTarget::Key(key) => vec![Argument::Token(key.clone()), order(by.order)],
                    OrderTarget::Traversal(traversal) => vec![nested(traversal), order(by.order)],
                };
                out.push(Instruction::new("by", arguments));
            }
            return;
        }
        Step::Sum(scope) => Instruction::new("sum", scoped(*scope, vec![])),
        Step::Min(scope) => Instruction::new("min", scoped(*scope, vec![])),
        Step::Max(scope) => Instruction::new("max", scoped(*scope, vec![])),
        Step::Mean(scope) => Instruction::new("mean", scoped(*scope, vec![])),
        Step::Constant(value) => Instruction::new("constant", vec![Argument::Value(value.clone())]),
        Step::Drop => Instruction::new("drop", vec![]),
    };
    out.push(instruction);
}
