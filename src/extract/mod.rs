// Extraction engine - walks one parsed file and yields report records.
//
// Records come out as a lazy pull-driven sequence: the imports record (if
// any) on the first pull, then one class record per pull. Dropping the
// iterator stops the walk; nothing past the last pulled record is visited.
// For one file, import records always precede class records.

mod helpers;

use crate::filter::FilterPolicy;
use crate::report::{
    ClassFieldsRecord, FieldInfo, FileImportsRecord, ImportInfo, ReportRecord, DYNAMIC_TYPE,
};
use helpers::{find_child_by_kind, find_descendant_by_kind, node_text};
use std::path::{Path, PathBuf};
use tracing::warn;
use tree_sitter::{Node, Tree};

// Grammar kinds that wrap an import directive at the top level.
const DIRECTIVE_KINDS: &[&str] = &["import_or_export", "library_import", "import_specification"];

/// Build the lazy record sequence for one parsed file.
pub fn records<'a>(
    tree: &'a Tree,
    source: &'a str,
    file_path: Option<&'a Path>,
    policy: &'a FilterPolicy,
) -> Records<'a> {
    Records {
        root: tree.root_node(),
        source,
        file_path,
        policy,
        phase: Phase::Imports,
        next_child: 0,
    }
}

enum Phase {
    Imports,
    Classes,
    Done,
}

/// Lazy iterator over one file's report records.
pub struct Records<'a> {
    root: Node<'a>,
    source: &'a str,
    file_path: Option<&'a Path>,
    policy: &'a FilterPolicy,
    phase: Phase,
    next_child: usize,
}

impl Records<'_> {
    fn owned_path(&self) -> Option<PathBuf> {
        self.file_path.map(Path::to_path_buf)
    }
}

impl Iterator for Records<'_> {
    type Item = ReportRecord;

    fn next(&mut self) -> Option<ReportRecord> {
        loop {
            match self.phase {
                Phase::Imports => {
                    self.phase = Phase::Classes;
                    if self.policy.no_imports() {
                        continue;
                    }
                    let imports = collect_imports(&self.root, self.source);
                    // A file with no imports yields no imports record at all.
                    if imports.is_empty() {
                        continue;
                    }
                    return Some(ReportRecord::FileImports(FileImportsRecord {
                        imports,
                        file_path: self.owned_path(),
                    }));
                }
                Phase::Classes => {
                    if self.policy.no_classes() {
                        self.phase = Phase::Done;
                        continue;
                    }
                    while self.next_child < self.root.named_child_count() {
                        let child = self.root.named_child(self.next_child)?;
                        self.next_child += 1;
                        if child.kind() != "class_definition" {
                            // Other declaration kinds are not class-shaped.
                            continue;
                        }
                        if let Some(record) =
                            extract_class_record(&child, self.source, self.policy)
                        {
                            return Some(ReportRecord::ClassFields(ClassFieldsRecord {
                                file_path: self.owned_path(),
                                ..record
                            }));
                        }
                    }
                    self.phase = Phase::Done;
                }
                Phase::Done => return None,
            }
        }
    }
}

// === Import directives ===

fn collect_imports(root: &Node, source: &str) -> Vec<ImportInfo> {
    let mut imports = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if let Some(spec) = import_spec_node(&child, source) {
            imports.push(import_from_spec(&spec, source));
        }
    }
    imports
}

// Locate the import specification inside a top-level directive, or None for
// anything that is not an import (exports included). Falls back to the source
// shape of the node when the grammar wraps directives in unexpected kinds.
fn import_spec_node<'a>(node: &Node<'a>, source: &str) -> Option<Node<'a>> {
    if DIRECTIVE_KINDS.contains(&node.kind()) {
        if let Some(spec) = find_descendant_by_kind(node, "import_specification", 2) {
            return Some(spec);
        }
    }
    if looks_like_import(leading_text(node, source, 16)) {
        return Some(*node);
    }
    None
}

// First few characters of a node's source text, enough for a keyword check
// without copying the whole node.
fn leading_text<'s>(node: &Node, source: &'s str, limit: usize) -> &'s str {
    let start = node.start_byte().min(source.len());
    let mut end = node.end_byte().min(start + limit).min(source.len());
    while end > start && !source.is_char_boundary(end) {
        end -= 1;
    }
    &source[start..end]
}

fn looks_like_import(text: &str) -> bool {
    text.trim_start()
        .strip_prefix("import")
        .is_some_and(|rest| rest.starts_with([' ', '\t', '\'', '"']))
}

fn import_from_spec(spec: &Node, source: &str) -> ImportInfo {
    let uri = import_uri(spec, source);
    let (prefix, is_deferred) = import_prefix_and_deferred(spec, source);
    ImportInfo::new(uri, prefix, is_deferred)
}

// URI literal with quotes stripped. A directive whose URI cannot be resolved
// degrades to an empty string; one malformed directive never fails the scan.
fn import_uri(spec: &Node, source: &str) -> String {
    if let Some(literal) = find_descendant_by_kind(spec, "string_literal", 3) {
        return node_text(&literal, source)
            .trim_matches(|c| c == '\'' || c == '"')
            .to_string();
    }
    let text = node_text(spec, source);
    quoted_span(&text).unwrap_or_else(|| {
        warn!("import directive without a resolvable URI: {}", text.trim());
        String::new()
    })
}

fn quoted_span(text: &str) -> Option<String> {
    let open = text.find(['\'', '"'])?;
    let quote = text[open..].chars().next()?;
    let rest = &text[open + quote.len_utf8()..];
    let close = rest.find(quote)?;
    Some(rest[..close].to_string())
}

fn import_prefix_and_deferred(spec: &Node, source: &str) -> (Option<String>, bool) {
    let mut prefix = None;
    let mut is_deferred = false;
    let mut saw_as = false;
    let mut cursor = spec.walk();
    for child in spec.children(&mut cursor) {
        match child.kind() {
            "as" => saw_as = true,
            "deferred" => is_deferred = true,
            "identifier" if saw_as && prefix.is_none() => {
                prefix = Some(node_text(&child, source));
            }
            _ => {}
        }
    }
    // The prefix identifier can parse as a contextual keyword (`as async`);
    // fall back to the directive's source shape.
    let text = node_text(spec, source);
    if prefix.is_none() {
        prefix = prefix_from_text(&text);
    }
    if !is_deferred {
        is_deferred = text.split_whitespace().any(|token| token == "deferred");
    }
    (prefix, is_deferred)
}

fn prefix_from_text(text: &str) -> Option<String> {
    let at = text.find(" as ")?;
    let prefix: String = text[at + 4..]
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix)
    }
}

// === Class fields ===

// Returns a record with an unset path; the iterator fills it in. A class
// with zero kept fields yields no record.
fn extract_class_record(
    class_node: &Node,
    source: &str,
    policy: &FilterPolicy,
) -> Option<ClassFieldsRecord> {
    let name_node = find_child_by_kind(class_node, "identifier")?;
    let class_name = node_text(&name_node, source);
    let body = find_child_by_kind(class_node, "class_body")?;

    let mut kept = Vec::new();
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        // Members may sit inside a class_member_definition wrapper.
        let declaration = match member.kind() {
            "declaration" => Some(member),
            _ => find_child_by_kind(&member, "declaration"),
        };
        match declaration {
            Some(declaration) => collect_fields(&declaration, source, policy, &mut kept),
            // Methods, getters, constructors and unrecognized member kinds
            // are not field declarations.
            None => {}
        }
    }

    if kept.is_empty() {
        return None;
    }
    Some(ClassFieldsRecord {
        class_name,
        fields: kept,
        file_path: None,
    })
}

// One declaration may introduce several names sharing a type and a finality
// flag; both are resolved once per group. Static groups are skipped: only
// instance fields are reported.
fn collect_fields(
    declaration: &Node,
    source: &str,
    policy: &FilterPolicy,
    kept: &mut Vec<FieldInfo>,
) {
    if find_child_by_kind(declaration, "static").is_some() {
        return;
    }
    let is_final = find_child_by_kind(declaration, "final_builtin").is_some()
        || find_child_by_kind(declaration, "final").is_some();
    let ty = declared_type_spelling(declaration, source);

    let Some(list) = find_child_by_kind(declaration, "initialized_identifier_list") else {
        return;
    };
    let mut cursor = list.walk();
    for item in list.named_children(&mut cursor) {
        let name_node = match item.kind() {
            "identifier" => item,
            "initialized_identifier" => match find_child_by_kind(&item, "identifier") {
                Some(node) => node,
                None => continue,
            },
            _ => continue,
        };
        let field = FieldInfo::new(node_text(&name_node, source), ty.clone());
        if policy.keeps_field(&field, is_final) {
            kept.push(field);
        }
    }
}

// Literal spelling of the declared type: base identifier plus type arguments,
// with a `?` suffix for nullable forms. No annotation means the dynamic
// sentinel.
fn declared_type_spelling(declaration: &Node, source: &str) -> String {
    let mut base: Option<String> = None;
    let mut arguments = String::new();
    let mut nullable = false;
    let mut cursor = declaration.walk();
    for child in declaration.children(&mut cursor) {
        match child.kind() {
            "initialized_identifier_list" => break,
            "type_identifier" if base.is_none() => {
                base = Some(node_text(&child, source));
            }
            "type_arguments" if base.is_some() && arguments.is_empty() => {
                arguments = node_text(&child, source);
            }
            "nullable_type" | "?" => nullable = true,
            _ => {}
        }
    }
    match base {
        Some(base) => format!("{base}{arguments}{}", if nullable { "?" } else { "" }),
        None => DYNAMIC_TYPE.to_string(),
    }
}
