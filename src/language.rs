//! Language support - shared tree-sitter configuration for Dart
//!
//! This module is the single source of truth for grammar wiring. Parser
//! construction and source-file detection both live here so the scan layer
//! and tests never duplicate the setup.

use anyhow::Result;
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// File extension recognized as a Dart source file.
pub const SOURCE_EXTENSION: &str = "dart";

/// Get the tree-sitter language for Dart.
pub fn dart_language() -> tree_sitter::Language {
    harper_tree_sitter_dart::LANGUAGE.into()
}

/// Create a parser configured for Dart.
pub fn new_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&dart_language())
        .map_err(|e| anyhow::anyhow!("Failed to set Dart parser language: {}", e))?;
    Ok(parser)
}

/// Parse Dart source text into a syntax tree.
///
/// Malformed source still produces a best-effort tree; extraction degrades
/// per node rather than failing the file.
pub fn parse(content: &str) -> Result<Tree> {
    let mut parser = new_parser()?;
    parser
        .parse(content, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse Dart source"))
}

/// Check whether a path names a Dart source file.
pub fn is_dart_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == SOURCE_EXTENSION)
}
