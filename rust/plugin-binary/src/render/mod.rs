//! Renders a schema field mapping as an indented, type-annotated YAML skeleton.
//!
//! Every field becomes one line (`name: <type>`), nested objects and arrays of objects become a
//! header line followed by their own fields two columns further in. Values are placeholder
//! tokens rather than real scalars, so the result documents a manifest, it is not meant to be
//! applied as-is.
//!
//! The renderer assumes an acyclic schema, which is what the API server publishes after it
//! inlined all references. Nesting deeper than the configured maximum depth is cut off with a
//! placeholder rather than followed.
use tracing::{debug, warn};

use crate::schema::{self, Fields, SchemaNode, SchemaType, TypeTag};

mod default_value;

pub use default_value::format_default;

/// Columns added per nesting level.
pub const INDENT_STEP: usize = 2;
pub const DEFAULT_MAX_DEPTH: usize = 64;

pub const NO_TYPE_SPECIFIED: &str = "<no_type_specified>";
pub const UNKNOWN_TYPE: &str = "<unknown_type_in_schema>";
pub const MAX_DEPTH_EXCEEDED: &str = "<max_depth_exceeded>";

/// Collects the skeleton lines for one or more field mappings.
///
/// The indentation and nesting depth are threaded through the recursion by value, the only mutable
/// state kept on the renderer is the output collected so far.
#[derive(Debug)]
pub struct SkeletonRenderer {
    max_depth: usize,
    lines: Vec<String>,
}

impl Default for SkeletonRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl SkeletonRenderer {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            lines: Vec::new(),
        }
    }

    /// Appends a line of text that is not derived from a schema, such as a manifest header.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Renders every field of `fields`, in document order, starting at `indent` columns.
    pub fn render(&mut self, fields: &Fields, indent: usize) {
        self.render_fields(fields, indent, 0);
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    fn render_fields(&mut self, fields: &Fields, indent: usize, depth: usize) {
        for (name, node) in schema::manifest_fields(fields) {
            self.render_field(name, node, indent, depth);
        }
    }

    fn render_field(&mut self, name: &str, node: SchemaNode, indent: usize, depth: usize) {
        match node.type_tag() {
            TypeTag::Absent => self.emit(indent, format!("{name}: {NO_TYPE_SPECIFIED}")),
            TypeTag::Unrecognized(ty) => {
                warn!(field = name, %ty, "schema declares an unrecognized type");
                self.emit(indent, format!("{name}: {UNKNOWN_TYPE}"));
            }
            TypeTag::Known(SchemaType::Object) => {
                if self.depth_exceeded(name, indent, depth) {
                    return;
                }
                self.emit(indent, format!("{name}:"));
                self.render_nested(name, node, indent + INDENT_STEP, depth + 1);
            }
            TypeTag::Known(SchemaType::Array) => self.render_array(name, node, indent, depth),
            TypeTag::Known(ty) => {
                let line = annotate(format!("{name}: {}", ty.placeholder()), ty, node);
                self.emit(indent, line);
            }
        }
    }

    fn render_array(&mut self, name: &str, node: SchemaNode, indent: usize, depth: usize) {
        let items = node.items();
        let item_tag = items.map_or(TypeTag::Absent, |items| items.type_tag());

        match (items, item_tag) {
            (Some(items), TypeTag::Known(SchemaType::Object)) => {
                if self.depth_exceeded(name, indent, depth) {
                    return;
                }
                self.emit(indent, format!("{name}:"));
                self.emit(indent, "- ".to_owned());
                self.render_nested(name, items, indent + INDENT_STEP, depth + 1);
            }
            (_, item_tag) => {
                let item = match item_tag {
                    TypeTag::Known(ty) => ty.placeholder(),
                    TypeTag::Unrecognized(_) => UNKNOWN_TYPE.to_owned(),
                    TypeTag::Absent => NO_TYPE_SPECIFIED.to_owned(),
                };
                self.emit(indent, format!("{name}: "));
                self.emit(indent, annotate(format!("- {item}"), SchemaType::Array, node));
            }
        }
    }

    /// Descends into the fields of an object node, falling back to the node's own keys when
    /// it has no `properties`.
    fn render_nested(&mut self, name: &str, node: SchemaNode, indent: usize, depth: usize) {
        let fields = match node.properties() {
            Some(properties) => properties,
            None => {
                debug!(
                    field = name,
                    "object schema has no properties, using its own keys as fields"
                );
                node.raw()
            }
        };
        self.render_fields(fields, indent, depth);
    }

    /// Emits the truncation placeholder for `name` if its children would be nested deeper than
    /// allowed.
    fn depth_exceeded(&mut self, name: &str, indent: usize, depth: usize) -> bool {
        if depth < self.max_depth {
            return false;
        }
        warn!(
            field = name,
            max_depth = self.max_depth,
            "schema nesting exceeds the maximum depth, truncating"
        );
        self.emit(indent, format!("{name}: {MAX_DEPTH_EXCEEDED}"));
        true
    }

    fn emit(&mut self, indent: usize, text: String) {
        self.lines.push(format!("{:indent$}{text}", ""));
    }
}

/// Appends the `# Default: ...` comment if the node declares a default.
fn annotate(line: String, ty: SchemaType, node: SchemaNode) -> String {
    match node.default_value() {
        Some(default) => format!("{line} # Default: {}", format_default(ty, default)),
        None => line,
    }
}
