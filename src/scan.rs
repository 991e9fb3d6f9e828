// Scan orchestration - composes the extraction engine over in-memory source,
// a single file, or a directory walk.
//
// All three entry points return the same lazy RecordStream. The stream reads
// and parses one file at a time, only when the caller pulls past the previous
// file's records; dropping it cancels the scan with no further reads.

use crate::extract::{self, Records};
use crate::filter::FilterPolicy;
use crate::language;
use crate::report::ReportRecord;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::Tree;
use walkdir::WalkDir;

/// One parsed source file. Holds the tree and content alive so callers can
/// take the strictly per-record lazy walk over it.
pub struct ParsedSource {
    content: String,
    tree: Tree,
    path: Option<PathBuf>,
}

impl ParsedSource {
    pub fn parse(content: impl Into<String>, path: Option<PathBuf>) -> Result<Self> {
        let content = content.into();
        let tree = language::parse(&content)?;
        Ok(Self {
            content,
            tree,
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lazy per-record walk of this file's tree.
    pub fn records<'a>(&'a self, policy: &'a FilterPolicy) -> Records<'a> {
        extract::records(&self.tree, &self.content, self.path.as_deref(), policy)
    }
}

/// Entry point tying a filter policy to the three scan modes.
pub struct Scanner {
    policy: FilterPolicy,
}

impl Scanner {
    pub fn new(policy: FilterPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Scan in-memory source text, with an optional path recorded on the
    /// emitted records.
    pub fn scan_source(&self, content: impl Into<String>, path: Option<&Path>) -> RecordStream<'_> {
        RecordStream {
            policy: &self.policy,
            buffer: VecDeque::new(),
            pending: Pending::Source {
                content: content.into(),
                path: path.map(Path::to_path_buf),
            },
        }
    }

    /// Scan one source file. Read failures surface as an `Err` item, never
    /// silently skipped.
    pub fn scan_file(&self, path: &Path) -> RecordStream<'_> {
        RecordStream {
            policy: &self.policy,
            buffer: VecDeque::new(),
            pending: Pending::File(path.to_path_buf()),
        }
    }

    /// Scan every Dart source file under a directory root, one file at a
    /// time in filesystem enumeration order (which is not sorted and must
    /// not be assumed to be). Symbolic links are never followed.
    pub fn scan_dir(&self, root: &Path) -> RecordStream<'_> {
        RecordStream {
            policy: &self.policy,
            buffer: VecDeque::new(),
            pending: Pending::Walk(WalkDir::new(root).follow_links(false).into_iter()),
        }
    }
}

enum Pending {
    None,
    Source {
        content: String,
        path: Option<PathBuf>,
    },
    File(PathBuf),
    Walk(walkdir::IntoIter),
}

/// Lazy record stream shared by all scan modes. Yields each file's records
/// in order; filesystem and walk errors appear as `Err` items in the stream
/// at the position the file's records would have taken.
pub struct RecordStream<'a> {
    policy: &'a FilterPolicy,
    buffer: VecDeque<ReportRecord>,
    pending: Pending,
}

impl RecordStream<'_> {
    // Parse one file's content and buffer its records.
    fn load_source(&mut self, content: String, path: Option<PathBuf>) -> Result<()> {
        let parsed = ParsedSource::parse(content, path)?;
        self.buffer.extend(parsed.records(self.policy));
        debug!(
            "extracted {} records from {}",
            self.buffer.len(),
            parsed
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string())
        );
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        self.load_source(content, Some(path.to_path_buf()))
    }
}

impl Iterator for RecordStream<'_> {
    type Item = Result<ReportRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            match std::mem::replace(&mut self.pending, Pending::None) {
                Pending::None => return None,
                Pending::Source { content, path } => {
                    if let Err(e) = self.load_source(content, path) {
                        return Some(Err(e));
                    }
                }
                Pending::File(path) => {
                    if let Err(e) = self.load_file(&path) {
                        return Some(Err(e));
                    }
                }
                Pending::Walk(mut iter) => loop {
                    match iter.next() {
                        None => break,
                        Some(Err(e)) => {
                            // Missing root or unreadable entry; the walk
                            // resumes on the next pull.
                            self.pending = Pending::Walk(iter);
                            return Some(Err(e.into()));
                        }
                        Some(Ok(entry)) => {
                            if !entry.file_type().is_file()
                                || !language::is_dart_file(entry.path())
                            {
                                continue;
                            }
                            let path = entry.path().to_path_buf();
                            self.pending = Pending::Walk(iter);
                            if let Err(e) = self.load_file(&path) {
                                return Some(Err(e));
                            }
                            break;
                        }
                    }
                },
            }
        }
    }
}
