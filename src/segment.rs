use crate::config::Category;
use crate::error::{Error, Result};
use crate::token_count::count_tokens;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One source file's content tagged with a user-chosen category, used as a
/// unit of inclusion in the assembled prompt.
#[derive(Debug, Clone)]
pub struct CodeSegment {
    pub path: PathBuf,
    pub category: Category,
    pub content: String,
    pub selected: bool,
    pub token_count: usize,
}

impl CodeSegment {
    /// Reads the file as UTF-8 and counts its tokens.
    pub fn load(path: &Path, category: Category) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let token_count = count_tokens(&content);
        Ok(Self {
            path: path.to_path_buf(),
            category,
            content,
            selected: true,
            token_count,
        })
    }

    /// File name used for display and for prompt headings.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Ordered collection of code segments with category-level operations.
#[derive(Default)]
pub struct SegmentStore {
    segments: Vec<CodeSegment>,
}

impl SegmentStore {
    /// Loads `paths` into `category`, reading and token-counting in parallel.
    ///
    /// Segments are appended in the order of `paths`. One unreadable file does
    /// not abort the batch; its error is returned alongside the added count.
    pub fn add_files(&mut self, paths: &[PathBuf], category: Category) -> (usize, Vec<Error>) {
        let loaded: Vec<Result<CodeSegment>> = paths
            .par_iter()
            .map(|path| CodeSegment::load(path, category))
            .collect();

        let mut added = 0;
        let mut errors = Vec::new();
        for result in loaded {
            match result {
                Ok(segment) => {
                    self.segments.push(segment);
                    added += 1;
                }
                Err(e) => errors.push(e),
            }
        }
        (added, errors)
    }

    /// Removes every segment in `category`, returning how many were dropped.
    pub fn remove_category(&mut self, category: Category) -> usize {
        let before = self.segments.len();
        self.segments.retain(|s| s.category != category);
        before - self.segments.len()
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &CodeSegment> {
        self.segments.iter().filter(move |s| s.category == category)
    }

    pub fn count_in(&self, category: Category) -> usize {
        self.in_category(category).count()
    }

    /// Categories currently holding at least one segment, in display order.
    pub fn categories(&self) -> BTreeSet<Category> {
        self.segments.iter().map(|s| s.category).collect()
    }

    pub fn segments(&self) -> &[CodeSegment] {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut [CodeSegment] {
        &mut self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.segments.iter().filter(|s| s.selected).count()
    }

    /// Total size of the stored contents in bytes.
    pub fn total_bytes(&self) -> usize {
        self.segments.iter().map(|s| s.content.len()).sum()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn add_files_preserves_order_and_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.rs", "fn a() {}");
        let missing = dir.path().join("missing.rs");
        let b = write_file(dir.path(), "b.rs", "fn b() {}");

        let mut store = SegmentStore::default();
        let (added, errors) = store.add_files(&[a, missing, b], Category::Backend);

        assert_eq!(added, 2);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("missing.rs"));
        let names: Vec<String> = store.segments().iter().map(|s| s.file_name()).collect();
        assert_eq!(names, ["a.rs", "b.rs"]);
        assert!(store.segments().iter().all(|s| s.selected));
        assert!(store.segments().iter().all(|s| s.token_count > 0));
    }

    #[test]
    fn remove_category_only_touches_that_category() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.py", "print('a')");
        let b = write_file(dir.path(), "b.py", "print('b')");
        let c = write_file(dir.path(), "c.sql", "select 1;");

        let mut store = SegmentStore::default();
        store.add_files(&[a, b], Category::Backend);
        store.add_files(&[c], Category::Database);

        assert_eq!(store.remove_category(Category::Backend), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.count_in(Category::Database), 1);
        assert_eq!(store.remove_category(Category::Backend), 0);
    }

    #[test]
    fn categories_and_totals_track_contents() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.py", "aaaa");
        let b = write_file(dir.path(), "b.md", "bbbb");

        let mut store = SegmentStore::default();
        store.add_files(&[a], Category::Backend);
        store.add_files(&[b], Category::Docs);

        let cats: Vec<Category> = store.categories().into_iter().collect();
        assert_eq!(cats, [Category::Backend, Category::Docs]);
        assert_eq!(store.total_bytes(), 8);
        assert_eq!(store.selected_count(), 2);

        store.segments_mut()[0].selected = false;
        assert_eq!(store.selected_count(), 1);

        store.clear();
        assert!(store.is_empty());
    }
}
