#![allow(dead_code)]

use gremlin_qb::{
    GremlinQueryEnvironment, GremlinQuerySource, QueryOptions, StaticGraphModel,
    config::GroovyFormatting,
    model::SerializationBehaviour,
};

gremlin_qb::elements! {
    vertex Authority;
    vertex Person;
    vertex Company;
    vertex Country;
    vertex Planet;
    edge WorksFor;
    edge LivesIn;
}

pub fn model() -> StaticGraphModel {
    StaticGraphModel::builder()
        .vertex("Authority", |v| {
            v.abstract_type()
                .vertex_property("Name", "name")
                .collection("PhoneNumbers", "phoneNumbers")
        })
        .vertex("Person", |v| {
            v.base("Authority")
                .member("Age", "age")
                .member("RegistrationDate", "registered")
                .serialization("RegistrationDate", SerializationBehaviour::IgnoreOnAdd)
        })
        .vertex("Company", |v| v.base("Authority").collection("Locations", "locations"))
        .vertex("Country", |v| v.member("CountryCallingCode", "code"))
        .edge("WorksFor", |e| e.label("worksFor").member("From", "from"))
        .edge("LivesIn", |e| e)
        .build()
        .unwrap()
}

pub fn environment() -> GremlinQueryEnvironment {
    GremlinQueryEnvironment::new(model())
}

/// A source whose Groovy output inlines every literal.
pub fn g() -> GremlinQuerySource {
    environment()
        .configure_options(|options| QueryOptions {
            groovy: GroovyFormatting::Inline,
            ..options
        })
        .g()
}

pub fn g_with(options: QueryOptions) -> GremlinQuerySource {
    environment().with_options(options).g()
}
