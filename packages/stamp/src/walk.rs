//! Source-tree walking shared by the inject and strip passes

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions the identity passes operate on
pub const SOURCE_EXTENSIONS: &[&str] = &["tsx", "jsx", "ts", "js"];

/// Build output, dependency, and VCS directories are never entered
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", ".next", "target"];

/// Structurally shared entry points that are never stamped or stripped:
/// the root layout (any depth) and the top-level page file
const RESERVED_LAYOUT: &str = "layout.tsx";
const RESERVED_PAGE: &str = "page.tsx";

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Include/exclude filters applied to paths relative to the walk root
#[derive(Debug, Default, Clone)]
pub struct WalkOptions {
    pub include: Vec<glob::Pattern>,
    pub exclude: Vec<glob::Pattern>,
}

impl WalkOptions {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, WalkError> {
        Ok(Self {
            include: include
                .iter()
                .map(|p| glob::Pattern::new(p))
                .collect::<Result<_, _>>()?,
            exclude: exclude
                .iter()
                .map(|p| glob::Pattern::new(p))
                .collect::<Result<_, _>>()?,
        })
    }

    fn matches(&self, relative: &Path) -> bool {
        let text = relative.to_string_lossy();
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(&text)) {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(&text))
    }
}

/// True for the entry-point files the identity layer must never touch
pub fn is_reserved(root: &Path, path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name == RESERVED_LAYOUT {
        return true;
    }
    name == RESERVED_PAGE && path.parent() == Some(root)
}

/// All eligible source files under `root`, sorted for stable reporting
pub fn source_files(root: &Path, options: &WalkOptions) -> Result<Vec<PathBuf>, WalkError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_string_lossy();
        !(entry.file_type().is_dir() && EXCLUDED_DIRS.contains(&name.as_ref()))
    });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let has_source_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SOURCE_EXTENSIONS.contains(&e))
            .unwrap_or(false);
        if !has_source_ext || is_reserved(root, path) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if options.matches(relative) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_walk_skips_reserved_and_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("pages/home.tsx"));
        touch(&root.join("pages/about/page.tsx")); // nested page.tsx is content
        touch(&root.join("page.tsx")); // top-level: reserved
        touch(&root.join("layout.tsx")); // reserved anywhere
        touch(&root.join("pages/layout.tsx"));
        touch(&root.join("node_modules/lib/index.js"));
        touch(&root.join("styles/site.css")); // wrong extension

        let files = source_files(root, &WalkOptions::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["pages/about/page.tsx", "pages/home.tsx"]);
    }

    #[test]
    fn test_include_exclude_globs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("pages/home.tsx"));
        touch(&root.join("pages/about.tsx"));
        touch(&root.join("components/hero.tsx"));

        let options = WalkOptions::new(&["pages/*".to_string()], &["*about*".to_string()]).unwrap();
        let files = source_files(root, &options).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("pages/home.tsx"));
    }
}
