//! TypeScript emission.
//!
//! [`emit_types`] turns an [`AggregatedModel`](crate::delta::AggregatedModel)
//! into ordered declarations; [`assemble_artifact`] joins them under the
//! generated-file header into the final text.

pub mod digest;
pub mod naming;
pub mod type_emitter;

pub use digest::compute_artifact_digest;
pub use naming::{pascal_case, property_key, string_literal, TypeNamer};
pub use type_emitter::{
    emit_types, Declaration, DeclarationKind, EmittedTypes, WireNameCollision,
};

/// Final artifact text.
///
/// Each header line becomes a `//` comment, followed by a blank line when
/// the header is non-empty. Declarations are separated by one blank line and
/// the text ends with a single newline.
pub fn assemble_artifact(header: &[String], declarations: &[Declaration]) -> String {
    let mut out = String::new();
    for line in header {
        if line.is_empty() {
            out.push_str("//\n");
        } else {
            out.push_str("// ");
            out.push_str(line);
            out.push('\n');
        }
    }
    if !header.is_empty() {
        out.push('\n');
    }
    let body: Vec<&str> = declarations.iter().map(|d| d.text.as_str()).collect();
    out.push_str(&body.join("\n\n"));
    out.push('\n');
    out
}
