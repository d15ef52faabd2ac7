//! Shared unit-test fixtures: a small widget catalog.

use crate::{
    model::{ElementRegistry, FieldDef, Schema, TypeDef, TypeExpr},
    value::{Record, Value, ValueEnum},
};

pub(crate) fn widget_schema() -> Schema {
    Schema::new()
        .with_type(TypeDef::enumeration("Color", ["Red", "Green", "Blue"]))
        .with_type(TypeDef::component(
            "Port",
            vec![FieldDef::new("Name", "Text"), FieldDef::new("Pins", "Int")],
        ))
        .with_type(TypeDef::component(
            "Widget",
            vec![
                FieldDef::new("Name", "Text"),
                FieldDef::new("Weight", "Int"),
                FieldDef::new("Rating", "Float"),
                FieldDef::new("Color", "Color"),
                FieldDef::new("Enabled", "Bool"),
                FieldDef::new("Installed", "Date"),
                FieldDef::new("Tags", TypeExpr::list(TypeExpr::named("Text"))),
                FieldDef::new("Ports", TypeExpr::list(TypeExpr::named("Port"))),
                FieldDef::new("Parent", "Widget"),
            ],
        ))
}

pub(crate) fn registry() -> ElementRegistry {
    ElementRegistry::new(widget_schema())
}

pub(crate) fn port(name: &str, pins: i64) -> Value {
    Record::new("Port")
        .with("Name", name)
        .with("Pins", pins)
        .into_value()
}

pub(crate) fn widget(name: &str, weight: i64) -> Record {
    Record::new("Widget")
        .with("Name", name)
        .with("Weight", weight)
        .with("Rating", 2.5)
        .with("Color", ValueEnum::new("Color", "Red"))
        .with("Enabled", true)
        .with("Tags", vec!["alpha", "beta"])
        .with("Ports", Value::List(Vec::new()))
        .with("Parent", Value::Null)
}
