//! The schema document.
//!
//! Two schemas are equal when their non-blank lines match after trimming,
//! so blank-line and indentation edits never trigger a recompile.

use mobilehub_core::DiffMark;

use crate::params::TypeDefinition;

pub fn dress_for_dev_backend(schema: String) -> String {
    if schema.contains('\r') {
        schema.replace("\r\n", "\n")
    } else {
        schema
    }
}

fn significant_lines(schema: &str) -> impl Iterator<Item = &str> {
    schema.lines().map(str::trim).filter(|l| !l.is_empty())
}

pub fn same(dev: &str, current: &str) -> bool {
    significant_lines(dev).eq(significant_lines(current))
}

/// No authored schema means nothing to submit.
pub fn diff(dev: Option<&str>, current: Option<&str>) -> DiffMark {
    match (dev, current) {
        (None, _) => DiffMark::None,
        (Some(_), None) => DiffMark::Create,
        (Some(d), Some(c)) if same(d, c) => DiffMark::None,
        (Some(_), Some(_)) => DiffMark::Update,
    }
}

/// Join per-type SDL fragments into one document.
pub fn concat_type_definitions(types: &[TypeDefinition]) -> String {
    let mut schema = types
        .iter()
        .map(|t| t.definition.trim())
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    schema.push('\n');
    schema
}
