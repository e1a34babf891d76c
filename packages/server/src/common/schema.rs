//! Schema registry - the fixed, ordered field lists rows must conform to.
//!
//! Registries are `'static` and immutable; every persisted row carries every
//! field of its registry, in registry order.

use serde_json::Value;

/// How a field's value is coerced and what it defaults to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text. Defaults to `""`.
    Text,
    /// Multi-valued text (e.g. URLs), stored space-separated. Defaults to `""`.
    List,
    /// Numeric confidence in `[0, 1]`. Defaults to `null`; out-of-range or
    /// non-numeric values are discarded, never clamped.
    Score,
}

impl FieldKind {
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Text | FieldKind::List => Value::String(String::new()),
            FieldKind::Score => Value::Null,
        }
    }

    /// Placeholder shown to the model in a prompt's example object.
    ///
    /// Lists are asked for as JSON arrays even though they are stored joined.
    pub fn prompt_value(&self) -> Value {
        match self {
            FieldKind::List => Value::Array(Vec::new()),
            other => other.default_value(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Rows without a non-empty value here are not schema-conformant.
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: false,
        }
    }

    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: true,
        }
    }

    pub const fn list(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::List,
            required: false,
        }
    }

    pub const fn score(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Score,
            required: false,
        }
    }
}

/// An ordered, named field list.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Columns of the `Contacts_AD_NIL` sheet, in column order.
pub static CONTACT_SCHEMA: Schema = Schema {
    name: "contact",
    fields: &[
        FieldSpec::text("school_id"),
        FieldSpec::required("school_name"),
        FieldSpec::text("school_short_name"),
        FieldSpec::text("association"),
        FieldSpec::text("division"),
        FieldSpec::text("conference"),
        FieldSpec::text("state"),
        FieldSpec::text("city"),
        FieldSpec::text("athletic_director_name"),
        FieldSpec::text("athletic_director_title"),
        FieldSpec::text("athletic_director_email"),
        FieldSpec::text("athletic_director_phone"),
        FieldSpec::text("staff_directory_url"),
        FieldSpec::text("linkedin_url"),
        FieldSpec::text("nil_policy_url"),
        FieldSpec::score("data_quality_score"),
        FieldSpec::text("last_verified_date"),
        FieldSpec::text("verified_by"),
        FieldSpec::text("created_at"),
        FieldSpec::text("created_by"),
        FieldSpec::text("notes"),
    ],
};

/// Per-school athletic director enrichment, written after `school_id, school_name`.
pub static ENRICHMENT_SCHEMA: Schema = Schema {
    name: "enrichment",
    fields: &[
        FieldSpec::text("ad_name"),
        FieldSpec::text("ad_title"),
        FieldSpec::text("ad_email"),
        FieldSpec::text("ad_phone"),
        FieldSpec::text("assistant_name"),
        FieldSpec::text("assistant_email"),
        FieldSpec::score("confidence"),
        FieldSpec::text("notes"),
        FieldSpec::list("source_urls"),
    ],
};
