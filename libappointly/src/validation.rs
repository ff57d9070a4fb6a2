//! Declarative form validation
//!
//! A [`Schema`] is an ordered list of fields, each carrying an ordered list of
//! [`Rule`]s. [`validate`] evaluates every field against the whole
//! [`FormData`] record and reports all failing fields at once; within a single
//! field the first failing rule supplies the message.
//!
//! Rules may look at sibling fields (`EqualsField`, `RequiredIf`), so the
//! validator always receives the full record rather than one value at a time.
//!
//! # Example
//!
//! ```
//! use libappointly::validation::{validate, FormData, Schema};
//!
//! let schema = Schema::builder()
//!     .field("name", |f| f.required("Name is required"))
//!     .field("email", |f| f.required("Email is required").email("Enter a valid email"))
//!     .build();
//!
//! let data = FormData::new().with("name", "").with("email", "not-an-email");
//! let errors = validate(&schema, &data).unwrap_err();
//!
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors.get("email"), Some("Enter a valid email"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("Valid email pattern")
});

/// Field-name to value record handed to the validator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    values: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// True when the field is present and not an empty string
    pub fn is_filled(&self, field: &str) -> bool {
        self.get(field).is_some_and(|value| !value.is_empty())
    }
}

/// Form data that passed a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated(FormData);

impl Validated {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field)
    }

    pub fn into_inner(self) -> FormData {
        self.0
    }
}

/// Human-readable validation failures keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrorSet {
    errors: BTreeMap<String, String>,
}

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; the first message recorded for a field is kept
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for ValidationErrorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrorSet {}

/// A single field rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value must be present and non-empty
    Required { message: String },
    /// Non-empty value must look like an email address
    Email { message: String },
    /// Present value must equal the other field's value
    EqualsField { other: String, message: String },
    /// Behaves like `Required` while the other field is non-empty
    RequiredIf { other: String, message: String },
    /// Non-empty value must have at least `min` characters
    MinLength { min: usize, message: String },
}

impl Rule {
    fn passes(&self, value: Option<&str>, data: &FormData) -> bool {
        let filled = value.is_some_and(|v| !v.is_empty());
        match self {
            Rule::Required { .. } => filled,
            Rule::Email { .. } => !filled || value.is_some_and(|v| EMAIL_REGEX.is_match(v)),
            Rule::EqualsField { other, .. } => match value {
                None => true,
                Some(v) => v == data.get(other).unwrap_or_default(),
            },
            Rule::RequiredIf { other, .. } => !data.is_filled(other) || filled,
            Rule::MinLength { min, .. } => {
                !filled || value.is_some_and(|v| v.chars().count() >= *min)
            }
        }
    }

    fn message(&self) -> &str {
        match self {
            Rule::Required { message }
            | Rule::Email { message }
            | Rule::EqualsField { message, .. }
            | Rule::RequiredIf { message, .. }
            | Rule::MinLength { message, .. } => message,
        }
    }

    fn referenced_field(&self) -> Option<&str> {
        match self {
            Rule::EqualsField { other, .. } | Rule::RequiredIf { other, .. } => Some(other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub rules: Vec<Rule>,
}

/// Collects the rules for one field inside [`SchemaBuilder::field`]
#[derive(Debug)]
pub struct FieldBuilder {
    rules: Vec<Rule>,
}

impl FieldBuilder {
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Required {
            message: message.into(),
        });
        self
    }

    pub fn email(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Email {
            message: message.into(),
        });
        self
    }

    pub fn equals_field(mut self, other: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push(Rule::EqualsField {
            other: other.into(),
            message: message.into(),
        });
        self
    }

    pub fn required_if(mut self, other: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push(Rule::RequiredIf {
            other: other.into(),
            message: message.into(),
        });
        self
    }

    pub fn min_length(mut self, min: usize, message: impl Into<String>) -> Self {
        self.rules.push(Rule::MinLength {
            min,
            message: message.into(),
        });
        self
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSchema>,
}

impl SchemaBuilder {
    pub fn field(
        mut self,
        name: impl Into<String>,
        rules: impl FnOnce(FieldBuilder) -> FieldBuilder,
    ) -> Self {
        let builder = rules(FieldBuilder { rules: Vec::new() });
        self.fields.push(FieldSchema {
            name: name.into(),
            rules: builder.rules,
        });
        self
    }

    /// Finish the schema.
    ///
    /// # Panics
    ///
    /// Panics if a field is declared twice or a rule references a field that
    /// is not part of the schema. Both are programming errors in the schema
    /// definition, not user input problems.
    pub fn build(self) -> Schema {
        let mut names = HashSet::new();
        for field in &self.fields {
            assert!(
                names.insert(field.name.as_str()),
                "field '{}' declared twice in schema",
                field.name
            );
        }
        for field in &self.fields {
            for rule in &field.rules {
                if let Some(other) = rule.referenced_field() {
                    assert!(
                        names.contains(other),
                        "rule on '{}' references unknown field '{}'",
                        field.name,
                        other
                    );
                }
            }
        }
        Schema {
            fields: self.fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn validate(&self, data: &FormData) -> Result<Validated, ValidationErrorSet> {
        validate(self, data)
    }
}

/// Validate `data` against every field of `schema`
pub fn validate(schema: &Schema, data: &FormData) -> Result<Validated, ValidationErrorSet> {
    let mut errors = ValidationErrorSet::new();

    for field in &schema.fields {
        let value = data.get(&field.name);
        if let Some(rule) = field.rules.iter().find(|rule| !rule.passes(value, data)) {
            errors.insert(field.name.clone(), rule.message());
        }
    }

    if errors.is_empty() {
        Ok(Validated(data.clone()))
    } else {
        tracing::debug!(fields = %errors, "form validation failed");
        Err(errors)
    }
}
