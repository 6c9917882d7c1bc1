mod support;

use gremlin_qb::{
    Expression, Key, P, QueryOptions, Scope, Step, Traversal, Value,
    gremlinc::{
        analyzer::{Binding, BoundLabels, Translator},
        expression::ComparisonOp,
        optimizer,
        steps::{LimitStep, LogicalKind, SkipStep, StepStack},
    },
    model::MemberCache,
};
use proptest::prelude::*;
use std::sync::Arc;

fn has_age(age: i64) -> Step {
    Step::Has {
        key: Key::named("age"),
        predicate: P::Eq(Value::I64(age)),
    }
}

fn leaf_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0i64..100).prop_map(has_age),
        Just(Step::Out(vec!["worksFor".to_string()])),
        Just(Step::HasLabel(vec!["Person".to_string()])),
        (0i64..10).prop_map(|n| Step::Limit(LimitStep::new(n, Scope::Global).unwrap())),
        (0i64..10).prop_map(|n| Step::Skip(SkipStep::new(n, Scope::Global).unwrap())),
    ]
}

#[derive(Debug, Clone)]
enum Tree {
    Leaf(i64),
    Identity,
    None,
    Logical(LogicalKind, Vec<Tree>),
}

fn tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        4 => (0i64..20).prop_map(Tree::Leaf),
        1 => Just(Tree::Identity),
        1 => Just(Tree::None),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop_oneof![Just(LogicalKind::And), Just(LogicalKind::Or)],
            prop::collection::vec(inner, 1..4),
        )
            .prop_map(|(kind, branches)| Tree::Logical(kind, branches))
    })
}

fn build(tree: &Tree) -> Traversal {
    match tree {
        Tree::Leaf(age) => Traversal::single(has_age(*age)),
        Tree::Identity => Traversal::identity(),
        Tree::None => Traversal::none(),
        Tree::Logical(kind, branches) => {
            optimizer::logical(*kind, branches.iter().map(build).collect()).unwrap()
        }
    }
}

/// No logical step holds a branch that is a lone logical step of its own kind, nor a
/// neutral or absorbing branch.
fn assert_normalized(traversal: &Traversal) {
    for step in traversal {
        let Step::Logical(logical) = step else {
            continue;
        };
        assert!(logical.branches().len() >= 2);
        for branch in logical.branches() {
            assert!(!branch.is_identity() && !branch.is_none(), "{traversal}");
            if let Some(Step::Logical(inner)) = branch.single_step() {
                assert_ne!(inner.kind(), logical.kind(), "{traversal}");
            }
            assert_normalized(branch);
        }
    }
}

fn stack_of(steps: &[Step]) -> StepStack {
    steps
        .iter()
        .fold(StepStack::new(), |stack, step| optimizer::append(&stack, step.clone()))
}

fn comparison_op() -> impl Strategy<Value = ComparisonOp> {
    prop_oneof![
        Just(ComparisonOp::Eq),
        Just(ComparisonOp::Neq),
        Just(ComparisonOp::Lt),
        Just(ComparisonOp::Lte),
        Just(ComparisonOp::Gt),
        Just(ComparisonOp::Gte),
    ]
}

proptest! {
    #[test]
    fn test_identity_append_is_a_no_op(steps in prop::collection::vec(leaf_step(), 1..8)) {
        let stack = stack_of(&steps);
        let appended = optimizer::append(&stack, Step::Identity);
        prop_assert_eq!(appended.to_vec(), stack.to_vec());
    }

    #[test]
    fn test_appending_is_deterministic(steps in prop::collection::vec(leaf_step(), 0..8)) {
        prop_assert_eq!(stack_of(&steps).to_vec(), stack_of(&steps).to_vec());
    }

    #[test]
    fn test_logical_trees_are_normalized(tree in tree()) {
        assert_normalized(&build(&tree));
    }

    #[test]
    fn test_limits_compose_to_the_minimum(a in 0i64..50, b in 0i64..50) {
        let stack = stack_of(&[
            Step::Limit(LimitStep::new(a, Scope::Global).unwrap()),
            Step::Limit(LimitStep::new(b, Scope::Global).unwrap()),
        ]);
        prop_assert_eq!(
            stack.to_vec(),
            vec![Step::Limit(LimitStep::new(a.min(b), Scope::Global).unwrap())]
        );
    }

    #[test]
    fn test_flipped_comparisons_translate_alike(op in comparison_op(), age in -100i64..100) {
        let members = MemberCache::new(Arc::new(support::model()));
        let options = QueryOptions::default();
        let labels = BoundLabels::new();
        let translator = Translator::new(&members, &options, &labels);
        let member = || Expression::parameter("t").member("Age");

        let forward = Expression::lambda(
            "t",
            member().compare(op, Expression::constant(age)),
        );
        let flipped = Expression::lambda(
            "t",
            Expression::constant(age).compare(op.flip(), member()),
        );

        let binding = || Binding::Element("Person".to_string());
        prop_assert_eq!(
            translator.translate_predicate(&forward, binding()).unwrap(),
            translator.translate_predicate(&flipped, binding()).unwrap()
        );
    }
}
