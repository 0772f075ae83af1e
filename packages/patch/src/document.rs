//! File-backed page module handle.
//!
//! Always constructed from a fresh read of the file so a late writer whose
//! expected original text is stale fails with `TargetNotFound` instead of
//! clobbering an earlier edit.

use crate::errors::PatchResult;
use crate::locator::{locate, LocatedNode, TargetQuery};
use crate::splice::patch_source;
use copydesk_parser::{parse, Module};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct SourceDocument {
    path: PathBuf,
    source: String,
    module: Module,
    dirty: bool,
}

impl SourceDocument {
    /// Read and parse the file at `path`. Never served from a cache.
    pub fn load(path: impl Into<PathBuf>) -> PatchResult<Self> {
        let path = path.into();
        let source = std::fs::read_to_string(&path)?;
        let module = parse(&source)?;
        Ok(Self {
            path,
            source,
            module,
            dirty: false,
        })
    }

    /// Parse source text without a backing file (tests, previews)
    pub fn from_source(path: impl Into<PathBuf>, source: String) -> PatchResult<Self> {
        let path = path.into();
        let module = parse(&source)?;
        Ok(Self {
            path,
            source,
            module,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Resolve a target without modifying anything
    pub fn locate(&self, query: &TargetQuery) -> PatchResult<LocatedNode> {
        locate(&self.module, query)
    }

    /// Locate and patch in memory; the file is untouched until `save`
    pub fn apply(&mut self, query: &TargetQuery, new_value: &str) -> PatchResult<()> {
        let located = self.locate(query)?;
        let (updated, module) = patch_source(&self.source, &located, new_value)?;
        tracing::debug!(
            path = %self.path.display(),
            start = located.start,
            end = located.end,
            "patched source span"
        );
        self.source = updated;
        self.module = module;
        self.dirty = true;
        Ok(())
    }

    /// Write the patched source back to disk
    pub fn save(&mut self) -> PatchResult<()> {
        std::fs::write(&self.path, &self.source)?;
        self.dirty = false;
        Ok(())
    }
}
