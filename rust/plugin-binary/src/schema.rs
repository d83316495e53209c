//! Read-only view over the nodes of an OpenAPI v3 schema as published by the Kubernetes API
//! server.
//!
//! Nodes are kept as the raw [`serde_json`] mappings they were decoded into. Custom resource
//! schemas from third-party API servers are frequently not strictly OpenAPI compliant, so
//! nothing here rejects a node. Every accessor degrades to "not present" instead.
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Keys that carry schema metadata and never name a field of the manifest.
pub const RESERVED_KEYS: [&str; 2] = ["description", "x-kubernetes-preserve-unknown-fields"];

/// A mapping from field name to schema node, in document order.
pub type Fields = Map<String, Value>;

/// The primitive types a schema node can declare in its `type` key.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum SchemaType {
    Boolean,
    String,
    Integer,
    Number,
    Array,
    Object,
}

impl SchemaType {
    /// The placeholder token shown in place of a value, e.g. `<string>`.
    pub fn placeholder(self) -> String {
        format!("<{self}>")
    }
}

/// Classification of the `type` key of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TypeTag<'a> {
    Known(SchemaType),
    /// `type` is present but is not one of the recognized primitives (or not a string at all).
    Unrecognized(&'a Value),
    Absent,
}

#[derive(Clone, Copy, Debug)]
pub struct SchemaNode<'a> {
    raw: &'a Fields,
}

impl<'a> SchemaNode<'a> {
    pub fn new(raw: &'a Fields) -> Self {
        Self { raw }
    }

    /// Returns [`None`] for values that are not mappings, such as the `required` list or
    /// boolean vendor extensions.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(Self::new)
    }

    pub fn type_tag(&self) -> TypeTag<'a> {
        match self.raw.get("type") {
            None | Some(Value::Null) => TypeTag::Absent,
            Some(Value::String(ty)) if ty.is_empty() => TypeTag::Absent,
            Some(value @ Value::String(ty)) => ty
                .parse()
                .map(TypeTag::Known)
                .unwrap_or(TypeTag::Unrecognized(value)),
            Some(value) => TypeTag::Unrecognized(value),
        }
    }

    pub fn default_value(&self) -> Option<&'a Value> {
        self.raw.get("default")
    }

    /// The `properties` mapping, if the node has one and it is a mapping.
    pub fn properties(&self) -> Option<&'a Fields> {
        self.raw.get("properties").and_then(Value::as_object)
    }

    /// The element schema of an array node.
    pub fn items(&self) -> Option<SchemaNode<'a>> {
        self.raw.get("items").and_then(Self::from_value)
    }

    /// The node's own keys, used as the field mapping when `properties` is missing.
    pub fn raw(&self) -> &'a Fields {
        self.raw
    }
}

/// Iterates the entries of `fields` that describe manifest fields, preserving document order.
///
/// Reserved keys are skipped, and so is every entry whose value is not a mapping: only a
/// mapping can be a schema node.
pub fn manifest_fields<'a>(
    fields: &'a Fields,
) -> impl Iterator<Item = (&'a str, SchemaNode<'a>)> + 'a {
    fields
        .iter()
        .filter(|(name, _)| !RESERVED_KEYS.contains(&name.as_str()))
        .filter_map(|(name, value)| Some((name.as_str(), SchemaNode::from_value(value)?)))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be a mapping"),
        }
    }

    #[rstest]
    #[case(json!({"type": "boolean"}), TypeTag::Known(SchemaType::Boolean))]
    #[case(json!({"type": "string"}), TypeTag::Known(SchemaType::String))]
    #[case(json!({"type": "integer"}), TypeTag::Known(SchemaType::Integer))]
    #[case(json!({"type": "number"}), TypeTag::Known(SchemaType::Number))]
    #[case(json!({"type": "array"}), TypeTag::Known(SchemaType::Array))]
    #[case(json!({"type": "object"}), TypeTag::Known(SchemaType::Object))]
    #[case(json!({}), TypeTag::Absent)]
    #[case(json!({"type": null}), TypeTag::Absent)]
    #[case(json!({"type": ""}), TypeTag::Absent)]
    fn test_type_tag(#[case] node: Value, #[case] expected: TypeTag) {
        let node = fields(node);
        assert_eq!(SchemaNode::new(&node).type_tag(), expected);
    }

    #[rstest]
    #[case(json!({"type": "uuid"}))]
    #[case(json!({"type": "String"}))]
    #[case(json!({"type": ["string", "null"]}))]
    fn test_unrecognized_type_tag(#[case] node: Value) {
        let node = fields(node);
        assert!(matches!(
            SchemaNode::new(&node).type_tag(),
            TypeTag::Unrecognized(_)
        ));
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(SchemaType::Integer.placeholder(), "<integer>");
        assert_eq!(SchemaType::Object.placeholder(), "<object>");
    }

    #[test]
    fn test_manifest_fields_skips_metadata_and_keeps_order() {
        let node = fields(json!({
            "zeta": {"type": "string"},
            "description": {"type": "string"},
            "type": "object",
            "required": ["zeta"],
            "x-kubernetes-preserve-unknown-fields": true,
            "alpha": {"type": "integer"},
            "x-kubernetes-int-or-string": true,
            "mid": {}
        }));

        let names: Vec<_> = manifest_fields(&node).map(|(name, _)| name).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_field_named_type_is_kept() {
        let node = fields(json!({"type": {"type": "string"}}));
        let names: Vec<_> = manifest_fields(&node).map(|(name, _)| name).collect();
        assert_eq!(names, ["type"]);
    }

    #[test]
    fn test_accessors_tolerate_malformed_nodes() {
        let node = fields(json!({"type": "array", "items": "string", "properties": []}));
        let node = SchemaNode::new(&node);

        assert!(node.items().is_none());
        assert!(node.properties().is_none());
        assert!(node.default_value().is_none());
    }
}
