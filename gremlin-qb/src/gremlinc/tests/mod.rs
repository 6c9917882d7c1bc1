
use crate::gremlinc::steps::{Key, P, Step};

pub(super) fn has(key: &str, predicate: P) -> Step {
    Step::Has {
        key: Key::named(key),
        predicate,
    }
}
