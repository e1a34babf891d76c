//! A row that carries every field of its schema, in schema order.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::schema::Schema;

/// Schema-bound row. Only the normalizer builds these from model output, so
/// a `Record` always has full field coverage.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Record {
    #[serde(skip)]
    schema: &'static Schema,
    values: IndexMap<&'static str, Value>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.values == other.values
    }
}

impl Record {
    /// Every field set to its default.
    pub fn with_defaults(schema: &'static Schema) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|f| (f.name, f.kind.default_value()))
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Text value of a field, `""` for null/non-text values.
    pub fn text(&self, field: &str) -> &str {
        self.values
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Set a registry field. Unknown fields are ignored and reported as `false`.
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        match self.values.get_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Cells in schema order.
    pub fn to_row(&self) -> Vec<Value> {
        self.values.values().cloned().collect()
    }

    /// JSON object with keys in schema order.
    pub fn to_object(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::schema::CONTACT_SCHEMA;
    use serde_json::json;

    #[test]
    fn test_defaults_cover_every_field() {
        let record = Record::with_defaults(&CONTACT_SCHEMA);
        let row = record.to_row();

        assert_eq!(row.len(), CONTACT_SCHEMA.len());
        assert_eq!(record.get("school_name"), Some(&json!("")));
        assert_eq!(record.get("data_quality_score"), Some(&Value::Null));
    }

    #[test]
    fn test_set_ignores_unknown_fields() {
        let mut record = Record::with_defaults(&CONTACT_SCHEMA);

        assert!(record.set("state", json!("KY")));
        assert!(!record.set("mascot", json!("Wildcats")));
        assert_eq!(record.text("state"), "KY");
        assert!(record.get("mascot").is_none());
    }

    #[test]
    fn test_serializes_in_schema_order() {
        let mut record = Record::with_defaults(&CONTACT_SCHEMA);
        record.set("notes", json!("last"));
        record.set("school_id", json!("uk"));

        let serialized = serde_json::to_string(&record).unwrap();
        let id_pos = serialized.find("school_id").unwrap();
        let notes_pos = serialized.find("\"notes\"").unwrap();
        assert!(id_pos < notes_pos);
        assert_eq!(serde_json::to_value(&record).unwrap(), record.to_object());
    }
}
