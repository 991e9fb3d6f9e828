// Report model - the record types emitted by extraction and their renderings.
//
// Records are plain immutable value objects with structural equality. Each
// record renders three ways: a JSON map with a fixed key set (lossless
// round-trip), a Markdown block, and a plain-text block. Field and import
// order is always source declaration order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Type sentinel for fields declared without a type annotation.
pub const DYNAMIC_TYPE: &str = "dynamic";

/// One instance field of a class: its name and declared type spelling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    /// Declared type as written in source, or [`DYNAMIC_TYPE`] when untyped.
    #[serde(rename = "type")]
    pub ty: String,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// A field with no type annotation.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, DYNAMIC_TYPE)
    }
}

/// One import directive of a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    /// URI literal as written, quotes stripped (e.g. `dart:io`).
    pub uri: String,
    /// Identifier bound with `as`, if any.
    pub prefix: Option<String>,
    /// True for `deferred` imports.
    pub is_deferred: bool,
}

impl ImportInfo {
    pub fn new(uri: impl Into<String>, prefix: Option<String>, is_deferred: bool) -> Self {
        Self {
            uri: uri.into(),
            prefix,
            is_deferred,
        }
    }

    // " as <prefix>" and/or " (deferred)", shared by both human renderings.
    fn annotation_suffix(&self) -> String {
        let mut suffix = String::new();
        if let Some(prefix) = &self.prefix {
            suffix.push_str(" as ");
            suffix.push_str(prefix);
        }
        if self.is_deferred {
            suffix.push_str(" (deferred)");
        }
        suffix
    }
}

/// Instance fields kept for one class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassFieldsRecord {
    pub class_name: String,
    pub fields: Vec<FieldInfo>,
    /// Absent when the source came from memory with no path supplied.
    pub file_path: Option<PathBuf>,
}

impl ClassFieldsRecord {
    pub fn to_markdown(&self, include_path: bool) -> String {
        let mut out = format!("## {}\n", self.class_name);
        if include_path {
            if let Some(path) = &self.file_path {
                out.push_str(&format!("File: `{}`\n", path.display()));
            }
        }
        for field in &self.fields {
            out.push_str(&format!("- {} {}\n", field.ty, field.name));
        }
        out
    }

    pub fn to_text(&self, include_path: bool) -> String {
        let mut out = match (&self.file_path, include_path) {
            (Some(path), true) => format!("{} ({})\n", self.class_name, path.display()),
            _ => format!("{}\n", self.class_name),
        };
        for field in &self.fields {
            out.push_str(&format!("  {} {}\n", field.ty, field.name));
        }
        out
    }
}

/// Imports found in one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileImportsRecord {
    pub imports: Vec<ImportInfo>,
    pub file_path: Option<PathBuf>,
}

impl FileImportsRecord {
    pub fn to_markdown(&self, include_path: bool) -> String {
        let mut out = String::from("## Imports\n");
        if include_path {
            if let Some(path) = &self.file_path {
                out.push_str(&format!("File: `{}`\n", path.display()));
            }
        }
        for import in &self.imports {
            out.push_str(&format!("- `{}`{}\n", import.uri, import.annotation_suffix()));
        }
        out
    }

    pub fn to_text(&self, include_path: bool) -> String {
        let mut out = match (&self.file_path, include_path) {
            (Some(path), true) => format!("Imports ({})\n", path.display()),
            _ => String::from("Imports\n"),
        };
        for import in &self.imports {
            out.push_str(&format!("  {}{}\n", import.uri, import.annotation_suffix()));
        }
        out
    }
}

/// One unit of analysis output. The two shapes are a closed set: consumers
/// only ever distinguish imports summaries from class-field summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReportRecord {
    ClassFields(ClassFieldsRecord),
    FileImports(FileImportsRecord),
}

impl ReportRecord {
    /// JSON map with a fixed key set per variant. `filePath` is always
    /// present (null when absent) so the map round-trips losslessly.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_markdown(&self, include_path: bool) -> String {
        match self {
            ReportRecord::ClassFields(record) => record.to_markdown(include_path),
            ReportRecord::FileImports(record) => record.to_markdown(include_path),
        }
    }

    pub fn to_text(&self, include_path: bool) -> String {
        match self {
            ReportRecord::ClassFields(record) => record.to_text(include_path),
            ReportRecord::FileImports(record) => record.to_text(include_path),
        }
    }

    /// Presentation-boundary helper: Markdown when `markdown` is set,
    /// plain text otherwise.
    pub fn render(&self, markdown: bool, include_path: bool) -> String {
        if markdown {
            self.to_markdown(include_path)
        } else {
            self.to_text(include_path)
        }
    }

    pub fn file_path(&self) -> Option<&std::path::Path> {
        match self {
            ReportRecord::ClassFields(record) => record.file_path.as_deref(),
            ReportRecord::FileImports(record) => record.file_path.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_class_record() -> ReportRecord {
        ReportRecord::ClassFields(ClassFieldsRecord {
            class_name: "User".to_string(),
            fields: vec![
                FieldInfo::new("id", "int"),
                FieldInfo::new("name", "String"),
            ],
            file_path: Some(PathBuf::from("lib/user.dart")),
        })
    }

    fn sample_imports_record() -> ReportRecord {
        ReportRecord::FileImports(FileImportsRecord {
            imports: vec![
                ImportInfo::new("dart:io", None, false),
                ImportInfo::new("dart:async", Some("async".to_string()), true),
            ],
            file_path: Some(PathBuf::from("lib/user.dart")),
        })
    }

    #[test]
    fn test_class_record_markdown() {
        let record = sample_class_record();
        assert_eq!(
            record.to_markdown(true),
            "## User\nFile: `lib/user.dart`\n- int id\n- String name\n"
        );
        assert_eq!(
            record.to_markdown(false),
            "## User\n- int id\n- String name\n",
            "path line must be omitted when not requested"
        );
    }

    #[test]
    fn test_class_record_text() {
        let record = sample_class_record();
        assert_eq!(
            record.to_text(true),
            "User (lib/user.dart)\n  int id\n  String name\n"
        );
        assert_eq!(record.to_text(false), "User\n  int id\n  String name\n");
    }

    #[test]
    fn test_imports_record_markdown() {
        let record = sample_imports_record();
        assert_eq!(
            record.to_markdown(true),
            "## Imports\nFile: `lib/user.dart`\n- `dart:io`\n- `dart:async` as async (deferred)\n"
        );
    }

    #[test]
    fn test_imports_record_text() {
        let record = sample_imports_record();
        assert_eq!(
            record.to_text(false),
            "Imports\n  dart:io\n  dart:async as async (deferred)\n"
        );
    }

    #[test]
    fn test_pathless_record_renders_without_path_even_when_requested() {
        let record = ReportRecord::ClassFields(ClassFieldsRecord {
            class_name: "Config".to_string(),
            fields: vec![FieldInfo::untyped("value")],
            file_path: None,
        });
        assert_eq!(record.to_markdown(true), "## Config\n- dynamic value\n");
        assert_eq!(record.to_text(true), "Config\n  dynamic value\n");
    }

    #[test]
    fn test_json_has_fixed_keys() {
        let json = sample_class_record().to_json();
        let map = json.as_object().expect("class record serializes to a map");
        assert_eq!(map.len(), 3);
        assert_eq!(map["className"], "User");
        assert_eq!(map["filePath"], "lib/user.dart");
        assert_eq!(map["fields"][0]["type"], "int");
        assert_eq!(map["fields"][0]["name"], "id");

        let json = sample_imports_record().to_json();
        let map = json.as_object().expect("imports record serializes to a map");
        assert_eq!(map.len(), 2);
        assert_eq!(map["imports"][1]["uri"], "dart:async");
        assert_eq!(map["imports"][1]["prefix"], "async");
        assert_eq!(map["imports"][1]["isDeferred"], true);
        assert_eq!(map["imports"][0]["prefix"], Value::Null);
    }

    #[test]
    fn test_json_round_trip() {
        for record in [sample_class_record(), sample_imports_record()] {
            let json = record.to_json();
            let restored: ReportRecord =
                serde_json::from_value(json).expect("round-trip deserialization");
            assert_eq!(restored, record);
        }
    }

    #[test]
    fn test_round_trip_without_path() {
        let record = ReportRecord::FileImports(FileImportsRecord {
            imports: vec![ImportInfo::new("package:foo/foo.dart", None, false)],
            file_path: None,
        });
        let restored: ReportRecord = serde_json::from_value(record.to_json()).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let record = sample_imports_record();
        assert_eq!(record.to_markdown(true), record.to_markdown(true));
        assert_eq!(record.to_text(true), record.to_text(true));
        assert_eq!(record.to_json(), record.to_json());
    }

    #[test]
    fn test_render_selects_encoding() {
        let record = sample_class_record();
        assert_eq!(record.render(true, true), record.to_markdown(true));
        assert_eq!(record.render(false, true), record.to_text(true));
    }
}
