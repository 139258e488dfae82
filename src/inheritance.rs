//! Inheritance flattening: folding a parent classlike's data into a
//! child snapshot.

use tracing::trace;

use crate::docblock::{is_inheritdoc_marker, resolve_inherit_doc};
use crate::types::{
    ClasslikeKind, ClasslikeSnapshot, ConstantInfo, ImplementationInfo, MemberStructureRef,
    MethodInfo, OverrideInfo, PropertyInfo, StructureRef,
};

/// Recursion cap for ancestry walks; protects against cyclic `extends`
/// chains in broken code bases.
pub const MAX_ANCESTRY_DEPTH: usize = 20;

/// Merges a fully resolved `parent` into `child`, in place.
///
/// Callers invoke this once per direct ancestor edge, parent first, so
/// that data arriving through later edges wins where PHP says it should.
/// The merge is deliberately not idempotent: ancestry name lists are
/// appended without deduplication and repeated merges duplicate their
/// entries, mirroring repeated edges in the hierarchy.
pub fn resolve_inheritance_of(parent: &ClasslikeSnapshot, child: &mut ClasslikeSnapshot) {
    if child.short_description.is_none() {
        child.short_description = parent.short_description.clone();
    }

    if child.long_description.is_none() {
        child.long_description = parent.long_description.clone();
    } else {
        child.long_description = resolve_inherit_doc(
            child.long_description.as_deref(),
            parent.long_description.as_deref(),
        );
    }

    child.has_documentation = child.has_documentation || parent.has_documentation;

    child.traits.extend(parent.traits.iter().cloned());
    child.interfaces.extend(parent.interfaces.iter().cloned());
    child.parents.extend(parent.parents.iter().cloned());

    for constant in parent.constants.values() {
        resolve_constant(constant, child);
    }

    for property in parent.properties.values() {
        resolve_property(property, child);
    }

    for method in parent.methods.values() {
        resolve_method(method, child);
    }
}

/// A member whose own docblock is just the inheritDoc marker takes the
/// parent member's documentation wholesale.
fn inherits_full_documentation(short_description: Option<&str>) -> bool {
    short_description.is_some_and(is_inheritdoc_marker)
}

fn member_ref(class_ref: &StructureRef, start_line: usize, end_line: usize) -> MemberStructureRef {
    MemberStructureRef {
        name: class_ref.name.clone(),
        filename: class_ref.filename.clone(),
        start_line: class_ref.start_line,
        end_line: class_ref.end_line,
        kind: class_ref.kind,
        start_line_member: start_line,
        end_line_member: end_line,
    }
}

/// Constants are applied unconditionally (last merge wins) and take on
/// the child's identity, as if redeclared there.
fn resolve_constant(parent_constant: &ConstantInfo, child: &mut ClasslikeSnapshot) {
    let mut inherited = parent_constant.clone();
    inherited.declaring_class = child.structure_ref();
    inherited.declaring_structure =
        child.member_structure_ref(parent_constant.start_line, parent_constant.end_line);
    child.constants.insert(inherited.name.clone(), inherited);
}

fn resolve_property(parent_property: &PropertyInfo, child: &mut ClasslikeSnapshot) {
    let class_ref = child.structure_ref();

    let Some(existing) = child.properties.get_mut(&parent_property.name) else {
        let mut adopted = parent_property.clone();
        adopted.override_info = None;
        child.properties.insert(adopted.name.clone(), adopted);
        return;
    };

    let override_info = OverrideInfo {
        declaring_class: parent_property.declaring_class.clone(),
        declaring_structure: parent_property.declaring_structure.clone(),
        start_line: parent_property.start_line,
        end_line: parent_property.end_line,
        was_abstract: None,
    };

    if parent_property.has_documentation
        && inherits_full_documentation(existing.short_description.as_deref())
    {
        existing.short_description = parent_property.short_description.clone();
        existing.long_description = parent_property.long_description.clone();
    } else {
        existing.long_description = resolve_inherit_doc(
            existing.long_description.as_deref(),
            parent_property.long_description.as_deref(),
        );
    }

    existing.declaring_structure = member_ref(&class_ref, existing.start_line, existing.end_line);
    existing.declaring_class = class_ref;
    existing.override_info = Some(override_info);
}

fn resolve_method(parent_method: &MethodInfo, child: &mut ClasslikeSnapshot) {
    let child_kind = child.kind;

    let Some(existing) = child.methods.get_mut(&parent_method.name) else {
        let mut adopted = parent_method.clone();
        adopted.override_info = None;
        adopted.implementations = Vec::new();
        child.methods.insert(adopted.name.clone(), adopted);
        return;
    };

    if child_kind != ClasslikeKind::Interface
        && parent_method.declaring_structure.kind == ClasslikeKind::Interface
    {
        // The child fulfils an interface requirement rather than
        // overriding an implementation.
        existing.implementations.push(ImplementationInfo {
            declaring_class: parent_method.declaring_class.clone(),
            declaring_structure: parent_method.declaring_structure.clone(),
            start_line: parent_method.start_line,
            end_line: parent_method.end_line,
        });
        existing.override_info = None;
    } else {
        existing.override_info = Some(OverrideInfo {
            declaring_class: parent_method.declaring_class.clone(),
            declaring_structure: parent_method.declaring_structure.clone(),
            start_line: parent_method.start_line,
            end_line: parent_method.end_line,
            was_abstract: Some(parent_method.is_abstract),
        });
        existing.implementations = Vec::new();
    }

    if parent_method.has_documentation
        && inherits_full_documentation(existing.short_description.as_deref())
    {
        existing.short_description = parent_method.short_description.clone();
        existing.long_description = parent_method.long_description.clone();
    } else {
        existing.long_description = resolve_inherit_doc(
            existing.long_description.as_deref(),
            parent_method.long_description.as_deref(),
        );
    }
}

/// Resolves a snapshot's whole ancestry through `lookup`, which maps a
/// fully qualified name to that classlike's unresolved snapshot.
///
/// Each direct ancestor (interfaces first, then parent classes, then
/// traits) is itself resolved recursively before being merged into
/// `child`, so later edges overlay earlier ones.
pub fn resolve_ancestry<F>(child: &mut ClasslikeSnapshot, lookup: &F)
where
    F: Fn(&str) -> Option<ClasslikeSnapshot>,
{
    resolve_ancestry_at(child, lookup, 0);
}

fn resolve_ancestry_at<F>(child: &mut ClasslikeSnapshot, lookup: &F, depth: usize)
where
    F: Fn(&str) -> Option<ClasslikeSnapshot>,
{
    if depth >= MAX_ANCESTRY_DEPTH {
        trace!(name = %child.name, "ancestry depth cap reached");
        return;
    }

    // Snapshot the direct edges before merging; the merges themselves
    // append transitive ancestor names to these lists.
    let direct: Vec<String> = child
        .interfaces
        .iter()
        .chain(child.parents.iter())
        .chain(child.traits.iter())
        .cloned()
        .collect();

    for ancestor_name in direct {
        let Some(mut ancestor) = lookup(&ancestor_name) else {
            trace!(name = %ancestor_name, "ancestor not indexed, skipping");
            continue;
        };
        resolve_ancestry_at(&mut ancestor, lookup, depth + 1);
        resolve_inheritance_of(&ancestor, child);
    }
}
