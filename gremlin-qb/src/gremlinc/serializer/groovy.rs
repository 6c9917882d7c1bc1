use crate::{
    config::GroovyFormatting,
    gremlinc::{
        serializer::bytecode::{Argument, Bytecode},
        steps::{Key, P, Traversal},
    },
    protocol::value::Value,
};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::fmt::{self, Write};

/// A Groovy script plus the values it references by binding name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroovyScript {
    pub script: String,
    pub bindings: IndexMap<String, Value>,
}

impl GroovyScript {
    pub fn from_bytecode(bytecode: &Bytecode, formatting: GroovyFormatting) -> Self {
        let mut writer = GroovyWriter {
            formatting,
            bindings: IndexMap::new(),
        };
        let prefix = if bytecode.is_spawned_from_source() { "g" } else { "__" };
        let script = writer.bytecode(prefix, bytecode);
        Self {
            script,
            bindings: writer.bindings,
        }
    }
}

/// Renders `traversal` with literals inlined, starting from `prefix`.
pub fn render_inline(prefix: &str, traversal: &Traversal) -> String {
    let mut writer = GroovyWriter {
        formatting: GroovyFormatting::Inline,
        bindings: IndexMap::new(),
    };
    writer.bytecode(prefix, &Bytecode::from_traversal(traversal))
}

struct GroovyWriter {
    formatting: GroovyFormatting,
    bindings: IndexMap<String, Value>,
}

impl GroovyWriter {
    fn bytecode(&mut self, prefix: &str, bytecode: &Bytecode) -> String {
        let mut script = prefix.to_string();
        for instruction in &bytecode.instructions {
            let arguments = instruction
                .arguments
                .iter()
                .map(|argument| self.argument(argument))
                .join(", ");
            let _ = write!(script, ".{}({arguments})", instruction.operator);
        }
        script
    }

    fn argument(&mut self, argument: &Argument) -> String {
        match argument {
            Argument::Value(value) => self.value(value),
            Argument::Token(Key::Named(name)) => self.value(&Value::String(name.clone())),
            Argument::Token(key) => key.to_string(),
            Argument::Predicate(p) => self.predicate(p),
            Argument::Bytecode(bytecode) => self.bytecode("__", bytecode),
            Argument::Enum(name) => name.to_string(),
        }
    }

    fn predicate(&mut self, p: &P) -> String {
        match p {
            P::Eq(v) | P::Neq(v) | P::Lt(v) | P::Lte(v) | P::Gt(v) | P::Gte(v) => {
                format!("{}({})", p.operator(), self.value(v))
            }
            P::Within(values) | P::Without(values) => {
                let values = values.iter().map(|v| self.value(v)).join(", ");
                format!("{}({values})", p.operator())
            }
            P::Text(kind, text) => {
                format!("{kind}({})", self.value(&Value::String(text.clone())))
            }
        }
    }

    fn value(&mut self, value: &Value) -> String {
        if value.is_null() {
            return "null".to_string();
        }
        match self.formatting {
            GroovyFormatting::Inline => inline_literal(value),
            GroovyFormatting::Bindings => {
                if let Some((name, _)) = self.bindings.iter().find(|(_, bound)| {
                    *bound == value && bound.to_variant_string() == value.to_variant_string()
                }) {
                    return name.clone();
                }
                let name = binding_name(self.bindings.len());
                self.bindings.insert(name.clone(), value.clone());
                name
            }
        }
    }
}

/// `_a` ... `_z`, `_ba`, `_bb`, ...
fn binding_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'a' + (index % 26) as u8) as char);
        index /= 26;
        if index == 0 {
            break;
        }
    }
    letters.reverse();
    format!("_{}", letters.into_iter().collect::<String>())
}

fn inline_literal(value: &Value) -> String {
    match value {
        Value::String(s) => quoted(s),
        Value::F64(f) => float_literal(*f, 'd', "Double"),
        Value::F32(f) => float_literal(*f, 'f', "Float"),
        Value::Uuid(id) => format!("UUID.fromString('{id}')"),
        Value::Date(date) => format!("datetime('{}')", date.to_rfc3339()),
        Value::Array(items) => format!("[{}]", items.iter().map(inline_literal).join(", ")),
        Value::Object(map) => {
            if map.is_empty() {
                return "[:]".to_string();
            }
            let entries = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quoted(k), inline_literal(v)))
                .join(", ");
            format!("[{entries}]")
        }
        other => other.inner_stringify(),
    }
}

/// A single-quoted Groovy string literal.
fn quoted(s: &str) -> String {
    let mut literal = String::with_capacity(s.len() + 2);
    literal.push('\'');
    for c in s.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '\'' => literal.push_str("\\'"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c => literal.push(c),
        }
    }
    literal.push('\'');
    literal
}

/// Floats keep their type through a decimal point and a `d`/`f` suffix.
fn float_literal<F: Into<f64> + fmt::Debug + Copy>(f: F, suffix: char, class: &str) -> String {
    let wide: f64 = f.into();
    if wide.is_nan() {
        format!("{class}.NaN")
    } else if wide.is_infinite() {
        let sign = if wide > 0.0 { "POSITIVE" } else { "NEGATIVE" };
        format!("{class}.{sign}_INFINITY")
    } else {
        format!("{f:?}{suffix}")
    }
}
