// Dartscope - tree-sitter powered import and class-field reports for Dart.
//
// The crate walks parsed Dart syntax trees and emits a lazy stream of report
// records: one imports summary per file, one fields summary per class, each
// renderable as JSON, plain text, or Markdown. Parsing is delegated to
// tree-sitter; directory walking to walkdir. There is no CLI here - callers
// own argument handling and output streams.

// Grammar wiring and source-file detection
pub mod language;

// Record types and their three renderings
pub mod report;

// Field predicates and the policy configuration
pub mod filter;

// The per-file extraction engine
pub mod extract;

// Source / file / directory scan entry points
pub mod scan;

pub use extract::Records;
pub use filter::{FilterPolicy, PolicyBuilder, PolicyError};
pub use report::{
    ClassFieldsRecord, FieldInfo, FileImportsRecord, ImportInfo, ReportRecord, DYNAMIC_TYPE,
};
pub use scan::{ParsedSource, RecordStream, Scanner};
