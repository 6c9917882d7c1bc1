mod support;

use gremlin_qb::{
    AnyEdge, AnyVertex, Expression, Key, P, QueryError, Step, Value,
    gremlinc::steps::{LogicalKind, Order},
};
use support::{Authority, Company, Country, LivesIn, Person, Planet, WorksFor, g};

fn script<E, S: gremlin_qb::query::shapes::Shape>(query: &gremlin_qb::GremlinQuery<E, S>) -> String {
    query.to_groovy().script
}

#[test]
fn test_end_to_end_nested_connectives() {
    let query = g()
        .v::<Person>(&[])
        .unwrap()
        .where_("t => t.Age == 36 && (t.Age == 42 || t.Age == 99)")
        .unwrap();

    assert_eq!(
        script(&query),
        "g.V().hasLabel('Person').and(__.has('age', eq(36)), __.or(__.has('age', eq(42)), __.has('age', eq(99))))"
    );

    let steps = query.as_admin().steps();
    let Some(Step::Logical(and)) = steps.last() else {
        panic!("expected a trailing logical step, got {steps:?}");
    };
    assert_eq!(and.kind(), LogicalKind::And);
    assert_eq!(and.branches().len(), 2);
    let Some(Step::Logical(or)) = and.branches()[1].single_step() else {
        panic!("expected a nested or");
    };
    assert_eq!(or.kind(), LogicalKind::Or);
    assert_eq!(or.branches().len(), 2);
}

#[test]
fn test_expression_builder_matches_parsed_source() {
    let t = || Expression::parameter("t");
    let built = Expression::lambda(
        "t",
        t().member("Age")
            .eq(36i64)
            .and(t().member("Age").eq(42i64).or(t().member("Age").eq(99i64))),
    );

    let source = g().v::<Person>(&[]).unwrap();
    assert_eq!(
        source.where_(built).unwrap().to_traversal(),
        source
            .where_("t => t.Age == 36 && (t.Age == 42 || t.Age == 99)")
            .unwrap()
            .to_traversal()
    );
}

#[test]
fn test_type_filters() {
    let g = g();
    assert_eq!(
        script(&g.v::<Authority>(&[]).unwrap()),
        "g.V().hasLabel('Person', 'Company')"
    );
    assert_eq!(script(&g.v::<AnyVertex>(&[]).unwrap()), "g.V()");
    assert_eq!(script(&g.e::<AnyEdge>(&[]).unwrap()), "g.E()");
    assert_eq!(
        script(&g.v::<Person>(&[Value::from(1i64), Value::from(2i64)]).unwrap()),
        "g.V(1, 2).hasLabel('Person')"
    );
}

#[test]
fn test_of_type_narrows() {
    let g = g();
    let authorities = g.v::<Authority>(&[]).unwrap();
    assert_eq!(
        script(&authorities.of_type::<Person>().unwrap()),
        "g.V().hasLabel('Person')"
    );

    let people = g.v::<Person>(&[]).unwrap();
    assert_eq!(
        script(&people.of_type::<Authority>().unwrap()),
        "g.V().hasLabel('Person')"
    );
    assert_eq!(
        script(&people.of_type::<Company>().unwrap()),
        "g.V().none()"
    );
}

#[test]
fn test_unknown_element() {
    let err = g().v::<Planet>(&[]).unwrap_err();
    assert!(matches!(err, QueryError::UnknownElement(name) if name == "Planet"));
}

#[test]
fn test_navigation() {
    let people = g().v::<Person>(&[]).unwrap();

    let employers = people
        .out::<WorksFor>()
        .unwrap()
        .of_type::<Company>()
        .unwrap();
    assert_eq!(
        script(&employers),
        "g.V().hasLabel('Person').out('worksFor').hasLabel('Company')"
    );

    let colleagues = people.out_e::<WorksFor>().unwrap().in_v().in_::<WorksFor>().unwrap();
    assert_eq!(
        script(&colleagues),
        "g.V().hasLabel('Person').outE('worksFor').inV().in('worksFor')"
    );

    assert_eq!(
        script(&people.both_e::<AnyEdge>().unwrap().other_v()),
        "g.V().hasLabel('Person').bothE().otherV()"
    );
    assert_eq!(
        script(&people.both::<LivesIn>().unwrap()),
        "g.V().hasLabel('Person').both('LivesIn')"
    );
}

#[test]
fn test_edge_filters_use_edge_members() {
    let edges = g()
        .e::<WorksFor>(&[])
        .unwrap()
        .where_("e => e.From > 2010")
        .unwrap();
    assert_eq!(
        script(&edges.out_v()),
        "g.E().hasLabel('worksFor').has('from', gt(2010)).outV()"
    );
}

#[test]
fn test_ranges_compose_through_the_builder() {
    let people = g().v::<Person>(&[]).unwrap();
    assert_eq!(
        script(&people.limit(10).unwrap().limit(3).unwrap()),
        "g.V().hasLabel('Person').limit(3)"
    );
    assert_eq!(
        script(&people.skip(2).unwrap().skip(3).unwrap()),
        "g.V().hasLabel('Person').skip(5)"
    );
    assert_eq!(
        script(&people.range(2, 10).unwrap().range(1, 3).unwrap()),
        "g.V().hasLabel('Person').range(3, 5)"
    );
    assert_eq!(
        script(&people.limit_local(0).unwrap().limit_local(1).unwrap()),
        "g.V().hasLabel('Person').limit(local, 0)"
    );
    assert_eq!(
        script(&people.limit_local(2).unwrap().limit_local(1).unwrap()),
        "g.V().hasLabel('Person').limit(local, 1)"
    );
    assert_eq!(
        script(&people.tail_local(1).unwrap()),
        "g.V().hasLabel('Person').tail(local, 1)"
    );
}

#[test]
fn test_composed_counts_stay_on_the_wire() {
    let people = g().v::<Person>(&[]).unwrap();
    let max = i64::MAX;

    assert_eq!(
        script(&people.skip(max).unwrap().skip(max).unwrap()),
        format!("g.V().hasLabel('Person').skip({max})")
    );
    assert_eq!(
        script(&people.range(max, -1).unwrap().range(5, 10).unwrap()),
        format!("g.V().hasLabel('Person').range({max}, {max})")
    );
}

#[test]
fn test_negative_counts_leave_the_query_untouched() {
    let people = g().v::<Person>(&[]).unwrap();
    let before = people.to_traversal();

    assert!(matches!(people.limit(-1), Err(QueryError::InvalidArgument { .. })));
    assert!(matches!(people.skip_local(-3), Err(QueryError::InvalidArgument { .. })));
    assert!(matches!(people.tail(-1), Err(QueryError::InvalidArgument { .. })));
    assert!(matches!(people.range(-1, 4), Err(QueryError::InvalidArgument { .. })));
    assert_eq!(people.to_traversal(), before);
}

#[test]
fn test_unsupported_expression_leaves_the_query_untouched() {
    let people = g().v::<Person>(&[]).unwrap();
    let before = people.to_traversal();

    let err = people
        .where_("t => t.Age > 3 && ReferenceEquals(t, null)")
        .unwrap_err();
    let QueryError::ExpressionNotSupported { expression } = err else {
        panic!("expected an unsupported expression, got {err:?}");
    };
    assert_eq!(expression.to_string(), "ReferenceEquals(t, null)");
    assert_eq!(people.to_traversal(), before);

    assert!(matches!(
        people.where_("t => t == null"),
        Err(QueryError::ExpressionNotSupported { .. })
    ));
    assert!(matches!(people.where_("t => t.Age =="), Err(QueryError::Parse(_))));
}

#[test]
fn test_or_branches() {
    let people = g().v::<Person>(&[]).unwrap();
    let query = people
        .or(|b| {
            b.branch(|q| q.where_("t => t.Age < 18"))?
                .branch(|q| q.where_("t => t.Age > 65"))
        })
        .unwrap();
    assert_eq!(
        script(&query),
        "g.V().hasLabel('Person').or(__.has('age', lt(18)), __.has('age', gt(65)))"
    );
}

#[test]
fn test_and_branches_drop_identity_and_inline() {
    let people = g().v::<Person>(&[]).unwrap();
    let query = people
        .and(|b| {
            b.branch(|q| Ok(q.identity()))?
                .branch(|q| q.where_("t => t.Age == 3"))
        })
        .unwrap();
    assert_eq!(script(&query), "g.V().hasLabel('Person').has('age', eq(3))");

    let navigating = people
        .and(|b| {
            b.branch(|q| q.out::<WorksFor>())?
                .branch(|q| q.where_("t => t.Age == 3"))
        })
        .unwrap();
    assert_eq!(
        script(&navigating),
        "g.V().hasLabel('Person').and(__.out('worksFor'), __.has('age', eq(3)))"
    );
}

#[test]
fn test_logical_without_branches_is_rejected() {
    let people = g().v::<Person>(&[]).unwrap();
    assert!(matches!(people.and(Ok), Err(QueryError::InvalidArgument { .. })));
    assert!(matches!(people.or(Ok), Err(QueryError::InvalidArgument { .. })));
}

#[test]
fn test_not_and_where_traversal() {
    let people = g().v::<Person>(&[]).unwrap();

    assert_eq!(
        script(&people.not(|q| q.where_("t => t.Age > 36")).unwrap()),
        "g.V().hasLabel('Person').not(__.has('age', gt(36)))"
    );
    assert_eq!(
        script(&people.not(|q| Ok(q.none())).unwrap()),
        "g.V().hasLabel('Person')"
    );
    assert_eq!(
        script(&people.where_traversal(|q| q.out::<WorksFor>()).unwrap()),
        "g.V().hasLabel('Person').where(__.out('worksFor'))"
    );
}

#[test]
fn test_step_labels() {
    let (people, person) = g().v::<Person>(&[]).unwrap().as_label();
    assert_eq!(person.name(), "l1");
    assert_eq!(person.element(), Some("Person"));

    let colleagues = people
        .out::<WorksFor>()
        .unwrap()
        .in_::<WorksFor>()
        .unwrap()
        .where_(format!("t => t != ${}", person.name()).as_str())
        .unwrap();
    assert_eq!(
        script(&colleagues),
        "g.V().hasLabel('Person').as('l1').out('worksFor').in('worksFor').where(neq('l1'))"
    );

    let back = colleagues.select(&person).unwrap().where_("p => p.Age > 30").unwrap();
    assert!(script(&back).ends_with(".select('l1').has('age', gt(30))"));

    let (_, second) = colleagues.as_label();
    assert_eq!(second.name(), "l2");
}

#[test]
fn test_label_members_in_predicates() {
    let (people, person) = g().v::<Person>(&[]).unwrap().as_label();
    let err = people
        .out::<WorksFor>()
        .unwrap()
        .in_::<WorksFor>()
        .unwrap()
        .where_(Expression::lambda(
            "t",
            Expression::parameter("t")
                .member("Age")
                .gt(Expression::label(&person).member("Age")),
        ))
        .unwrap_err();
    // comparing two members across positions has no single-step translation
    assert!(matches!(err, QueryError::ExpressionNotSupported { .. }));

    let older = people
        .out::<WorksFor>()
        .unwrap()
        .where_(format!("t => ${}.Age > 40", person.name()).as_str())
        .unwrap();
    assert_eq!(
        script(&older),
        "g.V().hasLabel('Person').as('l1').out('worksFor').where(__.select('l1').has('age', gt(40)))"
    );
}

#[test]
fn test_labels_from_other_queries_are_unbound() {
    let (_, foreign) = g().v::<Country>(&[]).unwrap().as_label();
    let people = g().v::<Person>(&[]).unwrap();

    assert!(matches!(
        people.select(&foreign),
        Err(QueryError::UnboundStepLabel(name)) if name == "l1"
    ));
    assert!(matches!(
        people.where_("t => t == $l1"),
        Err(QueryError::UnboundStepLabel(_))
    ));
}

#[test]
fn test_labels_stay_unique_across_sub_queries() {
    let people = g().v::<Person>(&[]).unwrap();
    let filtered = people
        .where_traversal(|q| Ok(q.as_label().0.out::<WorksFor>()?))
        .unwrap();
    let (_, label) = filtered.as_label();
    assert_eq!(label.name(), "l2");
}

#[test]
fn test_values_and_scalar_filters() {
    let ages = g()
        .v::<Person>(&[])
        .unwrap()
        .values::<i64, _>(["t => t.Age"])
        .unwrap();
    assert_eq!(script(&ages), "g.V().hasLabel('Person').values('age')");

    assert_eq!(
        script(&ages.where_("a => a > 36").unwrap()),
        "g.V().hasLabel('Person').values('age').is(gt(36))"
    );
    assert_eq!(
        script(&ages.where_("a => a == null || a == 5").unwrap()),
        "g.V().hasLabel('Person').values('age').or(__.is(eq(null)), __.is(eq(5)))"
    );
    assert_eq!(
        script(&ages.where_("a => [1, 2].Contains(a)").unwrap()),
        "g.V().hasLabel('Person').values('age').is(within(1, 2))"
    );
}

#[test]
fn test_aggregates() {
    let ages = g()
        .v::<Person>(&[])
        .unwrap()
        .values::<i64, _>(["t => t.Age"])
        .unwrap();

    assert_eq!(script(&ages.sum()), "g.V().hasLabel('Person').values('age').sum()");
    assert_eq!(script(&ages.mean()), "g.V().hasLabel('Person').values('age').mean()");
    assert_eq!(
        script(&ages.fold().max_local()),
        "g.V().hasLabel('Person').values('age').fold().max(local)"
    );
    assert_eq!(
        script(&ages.fold().unfold().min()),
        "g.V().hasLabel('Person').values('age').fold().unfold().min()"
    );
    assert_eq!(script(&ages.count()), "g.V().hasLabel('Person').values('age').count()");
    assert_eq!(
        script(&ages.fold().count_local()),
        "g.V().hasLabel('Person').values('age').fold().count(local)"
    );
}

#[test]
fn test_order() {
    let people = g().v::<Person>(&[]).unwrap();
    let ordered = people
        .order(|o| o.by("t => t.Age")?.by_descending("t => t.Name.Value"))
        .unwrap();
    assert_eq!(
        script(&ordered),
        "g.V().hasLabel('Person').order().by('age', asc).by('name', desc)"
    );

    let by_employers = people
        .order(|o| o.by_traversal(|q| Ok(q.out::<WorksFor>()?.count()), Order::Desc))
        .unwrap();
    assert_eq!(
        script(&by_employers),
        "g.V().hasLabel('Person').order().by(__.out('worksFor').count(), desc)"
    );

    let ages = people.values::<i64, _>(["t => t.Age"]).unwrap();
    assert_eq!(
        script(&ages.order(|o| Ok(o.by_value(Order::Asc))).unwrap()),
        "g.V().hasLabel('Person').values('age').order().by(asc)"
    );
}

#[test]
fn test_project() {
    let people = g().v::<Person>(&[]).unwrap();
    let projected = people
        .project(|p| {
            p.by("age", "t => t.Age")?
                .by_identity("person")?
                .by_traversal("employers", |q| Ok(q.out::<WorksFor>()?.count()))
        })
        .unwrap();
    assert_eq!(
        script(&projected),
        "g.V().hasLabel('Person').project('age', 'person', 'employers').by('age').by().by(__.out('worksFor').count())"
    );

    assert!(matches!(people.project(Ok), Err(QueryError::InvalidArgument { .. })));
    assert!(matches!(
        people.project(|p| p.by_identity("x")?.by_identity("x")),
        Err(QueryError::InvalidArgument { .. })
    ));
}

#[test]
fn test_element_shape_steps() {
    let people = g().v::<Person>(&[]).unwrap();
    assert_eq!(script(&people.id()), "g.V().hasLabel('Person').id()");
    assert_eq!(script(&people.label()), "g.V().hasLabel('Person').label()");
    assert_eq!(script(&people.dedup()), "g.V().hasLabel('Person').dedup()");
    assert_eq!(script(&people.drop()), "g.V().hasLabel('Person').drop()");
    assert_eq!(script(&people.constant(1i64)), "g.V().hasLabel('Person').constant(1)");
    assert_eq!(script(&people.mute()), "g.V().hasLabel('Person').none()");
    assert_eq!(script(&people.mute().mute()), "g.V().hasLabel('Person').none()");
    assert_eq!(script(&people.identity()), script(&people));
}

#[test]
fn test_add_vertex() {
    let g = g();
    let added = g
        .add_v::<Person>(&[
            ("Name", Value::from("O'Brien")),
            ("Age", Value::from(36i64)),
            ("PhoneNumbers", Value::Null),
            ("RegistrationDate", Value::from(20240101i64)),
            ("Label", Value::from("ignored")),
        ])
        .unwrap();
    assert_eq!(
        script(&added),
        r"g.addV('Person').property('name', 'O\'Brien').property('age', 36)"
    );

    assert!(matches!(
        g.add_v::<Person>(&[("Salary", Value::from(1i64))]),
        Err(QueryError::InvalidArgument { argument: "properties", .. })
    ));
    assert!(matches!(g.add_v::<Authority>(&[]), Err(QueryError::UnknownElement(_))));
}

#[test]
fn test_add_edge_between_labels() {
    let g = g();
    let (person, from) = g.v::<Person>(&[Value::from(1i64)]).unwrap().as_label();
    let edge = person
        .out::<WorksFor>()
        .unwrap()
        .add_e::<WorksFor>(&[("From", Value::from(2015i64))])
        .unwrap()
        .from_label(&from)
        .unwrap();
    assert_eq!(
        script(&edge),
        "g.V(1).hasLabel('Person').as('l1').out('worksFor').addE('worksFor').property('from', 2015).from('l1')"
    );

    let looped = person
        .add_e::<LivesIn>(&[])
        .unwrap()
        .to_traversal_endpoint(|q| q.select(&from))
        .unwrap();
    assert_eq!(
        script(&looped),
        "g.V(1).hasLabel('Person').as('l1').addE('LivesIn').to(__.select('l1'))"
    );
}

#[test]
fn test_admin_escape_hatch() {
    let people = g().v::<Person>(&[]).unwrap();
    let admin = people.as_admin();
    assert_eq!(admin.element_type(), Some("Person"));
    assert_eq!(
        admin.steps(),
        vec![Step::V(vec![]), Step::HasLabel(vec!["Person".to_string()])]
    );

    let raw = admin.add_step(Step::Has {
        key: Key::named("age"),
        predicate: P::Gte(Value::from(18i64)),
    });
    assert_eq!(script(&raw), "g.V().hasLabel('Person').has('age', gte(18))");
    assert!(admin.bound_labels().is_empty());
}
