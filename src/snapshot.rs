//! Building classlike snapshots from whole PHP files.
//!
//! Walks the mago AST for every `class`, `interface`, `trait` and `enum`
//! declaration (top level or inside namespaces), resolves ancestor names
//! to fully qualified form through the namespace and `use` context, and
//! records members with their line spans and docblock descriptions.

use std::collections::HashMap;
use std::panic;

use indexmap::IndexMap;
use mago_span::HasSpan;
use mago_syntax::ast::*;
use tracing::{debug, error};

use crate::docblock;
use crate::types::{
    ClasslikeKind, ClasslikeSnapshot, ConstantInfo, MethodInfo, PropertyInfo,
};

/// Parses `content` and produces one snapshot per classlike found.
/// Anonymous classes are not surfaced.
pub fn build_snapshots(filename: &str, content: &str) -> Vec<ClasslikeSnapshot> {
    // The mago-syntax parser contains `unreachable!()` and `.expect()`
    // calls that can panic on malformed PHP (e.g. partially-written
    // heredocs/nowdocs, which are common while editing).  Wrap the
    // entire parse + extraction in `catch_unwind` so a parser panic
    // surfaces as an empty result instead of tearing down the caller.
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        build_snapshots_inner(filename, content)
    }));

    match result {
        Ok(snapshots) => snapshots,
        Err(_) => {
            error!(filename, "parser panicked; skipping file");
            Vec::new()
        }
    }
}

fn build_snapshots_inner(filename: &str, content: &str) -> Vec<ClasslikeSnapshot> {
    let arena = bumpalo::Bump::new();
    let file_id = mago_database::file::FileId::new(filename);
    let program = mago_syntax::parser::parse_file_content(&arena, file_id, content);

    let ctx = FileCtx {
        filename,
        content,
        trivia: program.trivia.as_slice(),
    };

    let mut snapshots = Vec::new();
    let mut use_map = HashMap::new();
    collect_from_statements(
        program.statements.iter(),
        &ctx,
        None,
        &mut use_map,
        &mut snapshots,
    );
    debug!(filename, count = snapshots.len(), "built classlike snapshots");
    snapshots
}

struct FileCtx<'a> {
    filename: &'a str,
    content: &'a str,
    trivia: &'a [Trivia<'a>],
}

impl FileCtx<'_> {
    fn line_of(&self, offset: u32) -> usize {
        let prefix = &self.content.as_bytes()[..(offset as usize).min(self.content.len())];
        memchr::memchr_iter(b'\n', prefix).count() + 1
    }

    fn lines_of(&self, node: &impl HasSpan) -> (usize, usize) {
        let span = node.span();
        (self.line_of(span.start.offset), self.line_of(span.end.offset))
    }

    /// Short and long description plus whether a docblock exists at all.
    fn descriptions_of(&self, node: &impl HasSpan) -> (Option<String>, Option<String>, bool) {
        match docblock::docblock_for_node(self.trivia, self.content, node) {
            Some(text) => {
                let (short, long) = docblock::split_descriptions(text);
                (short, long, true)
            }
            None => (None, None, false),
        }
    }
}

fn collect_from_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    ctx: &FileCtx<'a>,
    namespace: Option<&str>,
    use_map: &mut HashMap<String, String>,
    snapshots: &mut Vec<ClasslikeSnapshot>,
) {
    for statement in statements {
        match statement {
            Statement::Use(use_stmt) => collect_use_items(&use_stmt.items, use_map),
            Statement::Namespace(ns) => {
                let name = ns.name.as_ref().map(|ident| ident.value().to_string());
                // Use statements do not leak across namespace blocks.
                let mut scoped = HashMap::new();
                collect_from_statements(
                    ns.statements().iter(),
                    ctx,
                    name.as_deref(),
                    &mut scoped,
                    snapshots,
                );
            }
            Statement::Class(class) => {
                let parents = class
                    .extends
                    .as_ref()
                    .map(|ext| {
                        ext.types
                            .iter()
                            .map(|ident| resolve_name(ident.value(), namespace, use_map))
                            .collect()
                    })
                    .unwrap_or_default();
                let interfaces = class
                    .implements
                    .as_ref()
                    .map(|imp| {
                        imp.types
                            .iter()
                            .map(|ident| resolve_name(ident.value(), namespace, use_map))
                            .collect()
                    })
                    .unwrap_or_default();

                snapshots.push(classlike_snapshot(
                    ctx,
                    namespace,
                    use_map,
                    class.name.value,
                    ClasslikeKind::Class,
                    class.modifiers.contains_abstract(),
                    class.modifiers.contains_final(),
                    class,
                    class.members.iter(),
                    parents,
                    interfaces,
                ));
            }
            Statement::Interface(iface) => {
                // Interfaces list their extended interfaces as parents.
                let parents = iface
                    .extends
                    .as_ref()
                    .map(|ext| {
                        ext.types
                            .iter()
                            .map(|ident| resolve_name(ident.value(), namespace, use_map))
                            .collect()
                    })
                    .unwrap_or_default();

                snapshots.push(classlike_snapshot(
                    ctx,
                    namespace,
                    use_map,
                    iface.name.value,
                    ClasslikeKind::Interface,
                    false,
                    false,
                    iface,
                    iface.members.iter(),
                    parents,
                    Vec::new(),
                ));
            }
            Statement::Trait(trait_def) => {
                snapshots.push(classlike_snapshot(
                    ctx,
                    namespace,
                    use_map,
                    trait_def.name.value,
                    ClasslikeKind::Trait,
                    false,
                    false,
                    trait_def,
                    trait_def.members.iter(),
                    Vec::new(),
                    Vec::new(),
                ));
            }
            Statement::Enum(enum_def) => {
                // Enums have no dedicated snapshot kind; a class with
                // constant-like cases is the closest fit.
                let interfaces = enum_def
                    .implements
                    .as_ref()
                    .map(|imp| {
                        imp.types
                            .iter()
                            .map(|ident| resolve_name(ident.value(), namespace, use_map))
                            .collect()
                    })
                    .unwrap_or_default();

                snapshots.push(classlike_snapshot(
                    ctx,
                    namespace,
                    use_map,
                    enum_def.name.value,
                    ClasslikeKind::Class,
                    false,
                    false,
                    enum_def,
                    enum_def.members.iter(),
                    Vec::new(),
                    interfaces,
                ));
            }
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn classlike_snapshot<'a>(
    ctx: &FileCtx<'a>,
    namespace: Option<&str>,
    use_map: &HashMap<String, String>,
    name: &str,
    kind: ClasslikeKind,
    is_abstract: bool,
    is_final: bool,
    node: &impl HasSpan,
    members: impl Iterator<Item = &'a ClassLikeMember<'a>>,
    parents: Vec<String>,
    interfaces: Vec<String>,
) -> ClasslikeSnapshot {
    let fqcn = match namespace {
        Some(ns) => format!("{ns}\\{name}"),
        None => name.to_string(),
    };
    let (start_line, end_line) = ctx.lines_of(node);
    let (short_description, long_description, has_documentation) = ctx.descriptions_of(node);

    let mut snapshot = ClasslikeSnapshot {
        name: fqcn,
        filename: ctx.filename.to_string(),
        start_line,
        end_line,
        kind,
        is_abstract,
        is_final,
        has_documentation,
        short_description,
        long_description,
        parents,
        interfaces,
        traits: Vec::new(),
        constants: IndexMap::new(),
        properties: IndexMap::new(),
        methods: IndexMap::new(),
    };

    for member in members {
        match member {
            ClassLikeMember::TraitUse(trait_use) => {
                for trait_name in trait_use.trait_names.iter() {
                    snapshot
                        .traits
                        .push(resolve_name(trait_name.value(), namespace, use_map));
                }
            }
            ClassLikeMember::Constant(constant) => {
                let (start_line, end_line) = ctx.lines_of(member);
                let (short, long, has_doc) = ctx.descriptions_of(member);
                for item in constant.items.iter() {
                    let info = ConstantInfo {
                        name: item.name.value.to_string(),
                        start_line,
                        end_line,
                        short_description: short.clone(),
                        long_description: long.clone(),
                        has_documentation: has_doc,
                        declaring_class: snapshot.structure_ref(),
                        declaring_structure: snapshot.member_structure_ref(start_line, end_line),
                    };
                    snapshot.constants.insert(info.name.clone(), info);
                }
            }
            ClassLikeMember::EnumCase(enum_case) => {
                let (start_line, end_line) = ctx.lines_of(member);
                let (short, long, has_doc) = ctx.descriptions_of(member);
                let info = ConstantInfo {
                    name: enum_case.item.name().value.to_string(),
                    start_line,
                    end_line,
                    short_description: short,
                    long_description: long,
                    has_documentation: has_doc,
                    declaring_class: snapshot.structure_ref(),
                    declaring_structure: snapshot.member_structure_ref(start_line, end_line),
                };
                snapshot.constants.insert(info.name.clone(), info);
            }
            ClassLikeMember::Property(property) => {
                let (start_line, end_line) = ctx.lines_of(member);
                let (short, long, has_doc) = ctx.descriptions_of(member);
                let is_static = property.modifiers().iter().any(|m| m.is_static());
                let (is_public, is_protected, is_private) =
                    visibility_flags(property.modifiers().iter());
                for var in property.variables().iter() {
                    let raw_name = var.name.to_string();
                    let name = raw_name.strip_prefix('$').unwrap_or(&raw_name).to_string();
                    let info = PropertyInfo {
                        name,
                        start_line,
                        end_line,
                        is_public,
                        is_protected,
                        is_private,
                        is_static,
                        short_description: short.clone(),
                        long_description: long.clone(),
                        has_documentation: has_doc,
                        override_info: None,
                        declaring_class: snapshot.structure_ref(),
                        declaring_structure: snapshot.member_structure_ref(start_line, end_line),
                    };
                    snapshot.properties.insert(info.name.clone(), info);
                }
            }
            ClassLikeMember::Method(method) => {
                let (start_line, end_line) = ctx.lines_of(method);
                let (short, long, has_doc) = ctx.descriptions_of(method);
                let (is_public, is_protected, is_private) =
                    visibility_flags(method.modifiers.iter());
                let info = MethodInfo {
                    name: method.name.value.to_string(),
                    start_line,
                    end_line,
                    is_public,
                    is_protected,
                    is_private,
                    is_static: method.modifiers.iter().any(|m| m.is_static()),
                    is_abstract: method.modifiers.contains_abstract(),
                    is_final: method.modifiers.contains_final(),
                    short_description: short,
                    long_description: long,
                    has_documentation: has_doc,
                    override_info: None,
                    implementations: Vec::new(),
                    declaring_class: snapshot.structure_ref(),
                    declaring_structure: snapshot.member_structure_ref(start_line, end_line),
                };
                snapshot.methods.insert(info.name.clone(), info);
            }
        }
    }

    snapshot
}

fn visibility_flags<'a>(
    modifiers: impl Iterator<Item = &'a Modifier<'a>>,
) -> (bool, bool, bool) {
    for modifier in modifiers {
        if modifier.is_private() {
            return (false, false, true);
        }
        if modifier.is_protected() {
            return (false, true, false);
        }
        if modifier.is_public() {
            return (true, false, false);
        }
    }
    (true, false, false)
}

fn collect_use_items(items: &UseItems, use_map: &mut HashMap<String, String>) {
    match items {
        UseItems::Sequence(seq) => {
            for item in seq.items.iter() {
                register_use_item(item, None, use_map);
            }
        }
        UseItems::TypedSequence(seq) => {
            // Function and constant imports never name classlikes.
            if seq.r#type.is_function() || seq.r#type.is_const() {
                return;
            }
            for item in seq.items.iter() {
                register_use_item(item, None, use_map);
            }
        }
        UseItems::TypedList(list) => {
            if list.r#type.is_function() || list.r#type.is_const() {
                return;
            }
            let prefix = list.namespace.value();
            for item in list.items.iter() {
                register_use_item(item, Some(prefix), use_map);
            }
        }
        UseItems::MixedList(list) => {
            let prefix = list.namespace.value();
            for maybe_typed in list.items.iter() {
                if let Some(ref t) = maybe_typed.r#type
                    && (t.is_function() || t.is_const())
                {
                    continue;
                }
                register_use_item(&maybe_typed.item, Some(prefix), use_map);
            }
        }
    }
}

fn register_use_item(
    item: &UseItem,
    group_prefix: Option<&str>,
    use_map: &mut HashMap<String, String>,
) {
    let item_name = item.name.value();
    let fqcn = match group_prefix {
        Some(prefix) => format!("{prefix}\\{item_name}"),
        None => item_name.to_string(),
    };

    let alias = match &item.alias {
        Some(alias) => alias.identifier.value.to_string(),
        None => fqcn.rsplit('\\').next().unwrap_or(&fqcn).to_string(),
    };

    use_map.insert(alias, fqcn);
}

/// Resolves a possibly relative classlike name to fully qualified form:
/// a leading backslash makes it absolute, otherwise the first segment is
/// looked up among the imports, otherwise the current namespace is
/// prepended.
fn resolve_name(name: &str, namespace: Option<&str>, use_map: &HashMap<String, String>) -> String {
    if let Some(absolute) = name.strip_prefix('\\') {
        return absolute.to_string();
    }

    let (first, rest) = match name.split_once('\\') {
        Some((first, rest)) => (first, Some(rest)),
        None => (name, None),
    };

    if let Some(base) = use_map.get(first) {
        return match rest {
            Some(rest) => format!("{base}\\{rest}"),
            None => base.clone(),
        };
    }

    match namespace {
        Some(ns) => format!("{ns}\\{name}"),
        None => name.to_string(),
    }
}
