//! Map loosely-typed model objects onto a schema registry.

use serde_json::{Map, Value};
use tracing::debug;

use crate::common::{FieldKind, Record, Schema};

/// Normalized records plus the number of candidates that could not be used.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<Record>,
    /// Non-object elements and objects missing a required field
    pub rejected: usize,
}

/// Coerce one value to what `kind` allows.
pub fn coerce(kind: FieldKind, value: &Value) -> Value {
    match kind {
        FieldKind::Text | FieldKind::List => Value::String(to_text(value)),
        FieldKind::Score => match value.as_f64() {
            Some(score) if (0.0..=1.0).contains(&score) => value.clone(),
            _ => Value::Null,
        },
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_array() && !item.is_object())
            .map(to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Null | Value::Object(_) => String::new(),
    }
}

/// Normalize one object. Returns `None` when a required field ends up empty.
pub fn normalize_object(schema: &'static Schema, object: &Map<String, Value>) -> Option<Record> {
    let mut record = Record::with_defaults(schema);
    for field in schema.fields {
        if let Some(value) = object.get(field.name) {
            record.set(field.name, coerce(field.kind, value));
        }
    }

    let complete = schema
        .fields
        .iter()
        .filter(|f| f.required)
        .all(|f| !record.text(f.name).is_empty());
    complete.then_some(record)
}

/// Normalize extracted candidates in order.
pub fn normalize(schema: &'static Schema, items: &[Value]) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for (index, item) in items.iter().enumerate() {
        let record = item
            .as_object()
            .and_then(|object| normalize_object(schema, object));
        match record {
            Some(record) => outcome.records.push(record),
            None => {
                debug!(index, schema = schema.name, "Rejected candidate row");
                outcome.rejected += 1;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CONTACT_SCHEMA, ENRICHMENT_SCHEMA};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_get_defaults_and_unknown_are_dropped() {
        let items = vec![json!({
            "school_name": "  University of Georgia ",
            "conference": "SEC",
            "mascot": "Bulldogs"
        })];

        let outcome = normalize(&CONTACT_SCHEMA, &items);
        assert_eq!(outcome.rejected, 0);

        let record = &outcome.records[0];
        assert_eq!(record.to_row().len(), CONTACT_SCHEMA.len());
        assert_eq!(record.text("school_name"), "University of Georgia");
        assert_eq!(record.text("athletic_director_email"), "");
        assert_eq!(record.get("data_quality_score"), Some(&Value::Null));
        assert!(record.get("mascot").is_none());
    }

    #[test]
    fn test_score_is_discarded_not_clamped() {
        assert_eq!(coerce(FieldKind::Score, &json!(0.75)), json!(0.75));
        assert_eq!(coerce(FieldKind::Score, &json!(1)), json!(1));
        assert_eq!(coerce(FieldKind::Score, &json!(1.5)), Value::Null);
        assert_eq!(coerce(FieldKind::Score, &json!(-0.1)), Value::Null);
        assert_eq!(coerce(FieldKind::Score, &json!("0.5")), Value::Null);
        assert_eq!(coerce(FieldKind::Score, &json!(true)), Value::Null);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(coerce(FieldKind::Text, &json!(42)), json!("42"));
        assert_eq!(coerce(FieldKind::Text, &json!(false)), json!("false"));
        assert_eq!(coerce(FieldKind::Text, &Value::Null), json!(""));
        assert_eq!(coerce(FieldKind::Text, &json!({"a": 1})), json!(""));
        assert_eq!(
            coerce(FieldKind::List, &json!([" https://a.edu ", "", {"x": 1}, "https://b.edu"])),
            json!("https://a.edu https://b.edu")
        );
    }

    #[test]
    fn test_rejects_non_objects_and_missing_school_name() {
        let items = vec![
            json!("just a string"),
            json!({"school_name": "   "}),
            json!({"conference": "Big Ten"}),
            json!({"school_name": "Ohio State University"}),
        ];

        let outcome = normalize(&CONTACT_SCHEMA, &items);
        assert_eq!(outcome.rejected, 3);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_enrichment_schema_has_no_required_fields() {
        let object = json!({"confidence": 0.4, "source_urls": ["https://ukathletics.com"]});
        let record = normalize_object(&ENRICHMENT_SCHEMA, object.as_object().unwrap()).unwrap();

        assert_eq!(record.get("confidence"), Some(&json!(0.4)));
        assert_eq!(record.text("source_urls"), "https://ukathletics.com");
        assert_eq!(record.text("ad_name"), "");
    }

    fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            (-2.0f64..2.0).prop_map(|f| json!(f)),
            "[ a-zA-Z0-9@.]{0,12}".prop_map(Value::String),
        ]
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            arb_scalar(),
            prop::collection::vec(arb_scalar(), 0..4).prop_map(Value::Array),
            Just(json!({"nested": true})),
        ]
    }

    fn arb_object() -> impl Strategy<Value = Value> {
        let mut keys: Vec<String> = CONTACT_SCHEMA.field_names().map(String::from).collect();
        keys.push("unexpected_key".to_string());
        prop::collection::vec((prop::sample::select(keys), arb_value()), 0..12).prop_map(
            |pairs| {
                let mut map: Map<String, Value> = pairs.into_iter().collect();
                map.insert("school_name".to_string(), json!("Test University"));
                Value::Object(map)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_normalization_is_a_fixed_point(item in arb_object()) {
            let first = normalize(&CONTACT_SCHEMA, &[item]);
            prop_assert_eq!(first.records.len(), 1);

            let again = normalize(&CONTACT_SCHEMA, &[first.records[0].to_object()]);
            prop_assert_eq!(&again.records, &first.records);
        }

        #[test]
        fn prop_every_field_is_present(items in prop::collection::vec(arb_object(), 0..5)) {
            let outcome = normalize(&CONTACT_SCHEMA, &items);
            for record in &outcome.records {
                let names: Vec<_> = record.iter().map(|(name, _)| name).collect();
                let expected: Vec<_> = CONTACT_SCHEMA.field_names().collect();
                prop_assert_eq!(names, expected);
                if let Some(score) = record.get("data_quality_score").and_then(Value::as_f64) {
                    prop_assert!((0.0..=1.0).contains(&score));
                }
            }
        }
    }
}
