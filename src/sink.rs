//! Output sink boundary.
//!
//! The core's contract ends at producing a correct, complete document
//! tree; sinks own physical persistence, checksum-based skipping, and
//! retry. Re-emitting a path with identical content must be a no-op from
//! the core's perspective, which both sinks here satisfy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::generate::{OutputDoc, TranslationIndexDoc, merge_translation_index};

/// Accepts generated documents for persistence.
pub trait OutputSink {
    fn write(&mut self, doc: &OutputDoc) -> io::Result<()>;
}

/// Collects documents in memory, keyed by path. Mergeable documents are
/// combined; others overwrite.
#[derive(Debug, Default)]
pub struct MemorySink {
    docs: Vec<OutputDoc>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn docs(&self) -> &[OutputDoc] {
        &self.docs
    }

    pub fn get(&self, path: &str) -> Option<&OutputDoc> {
        self.docs.iter().find(|d| d.path == path)
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, doc: &OutputDoc) -> io::Result<()> {
        if let Some(existing) = self.docs.iter_mut().find(|d| d.path == doc.path) {
            if doc.mergeable {
                existing.content = merge_content(&existing.content, &doc.content)?;
            } else {
                existing.content = doc.content.clone();
            }
        } else {
            self.docs.push(doc.clone());
        }
        Ok(())
    }
}

/// Writes documents under a root directory, one JSON file per path.
///
/// Extensionless index paths gain a `.json` suffix on disk; chapter
/// paths already carry one.
#[derive(Debug)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, doc_path: &str) -> PathBuf {
        let relative = doc_path.trim_start_matches('/');
        let mut path = self.root.join(relative);
        if path.extension().is_none() {
            path.set_extension("json");
        }
        path
    }
}

impl OutputSink for FsSink {
    fn write(&mut self, doc: &OutputDoc) -> io::Result<()> {
        let path = self.file_path(&doc.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = if doc.mergeable && path.exists() {
            merge_content(&read_json(&path)?, &doc.content)?
        } else {
            doc.content.clone()
        };
        fs::write(&path, serde_json::to_vec_pretty(&content)?)?;
        Ok(())
    }
}

fn read_json(path: &Path) -> io::Result<serde_json::Value> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(io::Error::other)
}

/// Merge semantics per document kind: only the translation index is
/// mergeable today, and its merge is the typed, auditable one.
fn merge_content(
    existing: &serde_json::Value,
    incoming: &serde_json::Value,
) -> io::Result<serde_json::Value> {
    let mut base: TranslationIndexDoc =
        serde_json::from_value(existing.clone()).map_err(io::Error::other)?;
    let other: TranslationIndexDoc =
        serde_json::from_value(incoming.clone()).map_err(io::Error::other)?;
    merge_translation_index(&mut base, other);
    serde_json::to_value(&base).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fs_sink_adds_json_extension_to_index_paths() {
        let sink = FsSink::new("/out");
        assert_eq!(
            sink.file_path("/bible/available_translations"),
            PathBuf::from("/out/bible/available_translations.json")
        );
        assert_eq!(
            sink.file_path("/bible/bsb/Genesis/1.json"),
            PathBuf::from("/out/bible/bsb/Genesis/1.json")
        );
    }

    #[test]
    fn memory_sink_overwrites_non_mergeable_paths() {
        let mut sink = MemorySink::new();
        let doc = |v: i64| OutputDoc {
            path: "/bible/bsb/books".into(),
            content: json!({"v": v}),
            mergeable: false,
        };
        sink.write(&doc(1)).unwrap();
        sink.write(&doc(2)).unwrap();
        assert_eq!(sink.docs().len(), 1);
        assert_eq!(sink.get("/bible/bsb/books").unwrap().content, json!({"v": 2}));
    }
}
