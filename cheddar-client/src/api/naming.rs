//! Field name translation between the wire and the canonical form
//!
//! Inbound XML tags and outbound form fields use lower camelCase
//! (`firstName`), entities store snake_case (`first_name`). Composite keys
//! (`subscription[planCode]`) and opaque containers (`metaData[color]`) are
//! handled through [`FieldKey`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::pluralization::singularize;

static ACRONYM_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static WORD_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());

/// Whether an entity kind translates its field names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldNaming {
    /// camelCase on the wire, snake_case locally
    Translated,
    /// Names are caller-defined and kept exactly as given
    Verbatim,
}

impl FieldNaming {
    /// Canonical local name for a field under this naming policy
    pub fn canonical(self, name: &str) -> String {
        match self {
            FieldNaming::Translated => to_canonical(name),
            FieldNaming::Verbatim => name.to_string(),
        }
    }
}

/// `firstName` -> `first_name`, `HTMLParser` -> `html_parser`
pub fn to_canonical(name: &str) -> String {
    let step = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    let step = WORD_BOUNDARY.replace_all(&step, "${1}_${2}");
    step.replace('-', "_").to_lowercase()
}

/// `first_name` -> `firstName`, `plan_code[]` -> `planCode[]`
///
/// Names without an underscore are sent as given. Anything from the first
/// bracket on is an opaque container key and is kept as is.
pub fn to_wire(name: &str) -> String {
    if let Some(bracket) = name.find('[') {
        let (head, tail) = name.split_at(bracket);
        return format!("{}{}", to_wire(head), tail);
    }
    if !name.contains('_') {
        return name.to_string();
    }

    let mut parts = name.split('_').filter(|part| !part.is_empty());
    let mut wire = match parts.next() {
        Some(first) => lowercase_first(first),
        None => return name.to_string(),
    };
    for part in parts {
        wire.push_str(&uppercase_first(part));
    }
    wire
}

/// `gateway_account` or `gatewayAccount` -> `GatewayAccount`
pub fn to_type_name(name: &str) -> String {
    to_canonical(name)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(uppercase_first)
        .collect()
}

/// Entity type name a tag refers to: `items` -> `Item`, `metaData` -> `MetaDatum`
///
/// This only derives the name. Whether a type with that name exists is up to
/// the entity registry.
pub fn type_name_for_tag(tag: &str) -> String {
    to_type_name(&singularize(tag))
}

fn uppercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Key of an outbound form field
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldKey {
    /// Canonical field of the entity being submitted
    Field(String),
    /// Field of a sub-entity submitted together with its parent,
    /// sent as `parent[camelField]`
    Nested { parent: String, field: String },
    /// Opaque key sent exactly as given
    Verbatim(String),
}

impl FieldKey {
    pub fn field(name: impl Into<String>) -> Self {
        FieldKey::Field(name.into())
    }

    pub fn nested(parent: impl Into<String>, field: impl Into<String>) -> Self {
        FieldKey::Nested {
            parent: parent.into(),
            field: field.into(),
        }
    }

    /// `metaData[<name>]` key for a caller-defined metadata entry
    pub fn metadata(name: &str) -> Self {
        FieldKey::Verbatim(format!("metaData[{}]", name))
    }

    /// Name of the form field as the server expects it
    pub fn to_wire(&self) -> String {
        match self {
            FieldKey::Field(name) => to_wire(name),
            FieldKey::Nested { parent, field } => format!("{}[{}]", parent, to_wire(field)),
            FieldKey::Verbatim(raw) => raw.clone(),
        }
    }
}
