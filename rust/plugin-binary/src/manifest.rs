//! Assembles the complete skeleton manifest around the rendered `spec` fields.
use crate::{locator::GroupVersion, render::SkeletonRenderer, schema::Fields};

/// Indentation of the fields directly below `spec:`.
pub const SPEC_FIELDS_INDENT: usize = 1;

/// Builds the skeleton manifest of `kind`, ready to be printed in one piece.
pub fn build_skeleton(
    group_version: &GroupVersion,
    kind: &str,
    spec_fields: &Fields,
    max_depth: usize,
) -> String {
    let mut renderer = SkeletonRenderer::new(max_depth);
    renderer.push_line(format!("apiVersion: {group_version}"));
    renderer.push_line(format!("kind: {kind}"));
    renderer.push_line("metadata:");
    renderer.push_line("  name: <string>");
    renderer.push_line("spec:");
    renderer.render(spec_fields, SPEC_FIELDS_INDENT);

    let mut skeleton = renderer.into_lines().join("\n");
    skeleton.push('\n');
    skeleton
}
