use crate::config::AppConfig;
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Optional per-project ignore file, one pattern per line.
pub const IGNORE_FILE: &str = ".codexignore";

/// Result of one project scan: the rendered listing plus simple totals.
pub struct ScanReport {
    pub tree: String,
    pub files: usize,
    pub dirs: usize,
    pub total_bytes: u64,
}

/// Builds the ignore set for `root` from the configured directory names plus
/// an optional `.codexignore` at the project root.
///
/// Lines starting with '#' and blank lines are skipped. A trailing '/' marks a
/// directory pattern; every pattern matches at any depth.
pub fn load_ignore_set(root: &Path, config: &AppConfig) -> GlobSet {
    let mut builder = GlobSetBuilder::new();

    for name in &config.ignore_dirs {
        add_glob(&mut builder, &format!("**/{}", name));
        add_glob(&mut builder, &format!("**/{}/**", name));
    }

    let ignore_path = root.join(IGNORE_FILE);
    if let Ok(contents) = fs::read_to_string(&ignore_path) {
        debug!("loading ignore patterns from {:?}", ignore_path);
        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(dir) = trimmed.strip_suffix('/') {
                if !dir.is_empty() {
                    add_glob(&mut builder, &format!("**/{}", dir));
                    add_glob(&mut builder, &format!("**/{}/**", dir));
                }
            } else if trimmed.contains('/') {
                add_glob(&mut builder, &format!("**/{}", trimmed));
            } else {
                let has_glob = trimmed.chars().any(|c| matches!(c, '*' | '?' | '['));
                add_glob(&mut builder, &format!("**/{}", trimmed));
                if !has_glob {
                    // A bare name ignores a file or a whole directory with that name
                    add_glob(&mut builder, &format!("**/{}/**", trimmed));
                }
            }
        }
    }

    builder.build().unwrap()
}

fn add_glob(builder: &mut GlobSetBuilder, pattern: &str) {
    if let Ok(glob) = Glob::new(pattern) {
        builder.add(glob);
    }
}

/// Walks `root` and renders an indented tree listing of the project.
///
/// Ignored entries prune their whole subtree, symlinks and unreadable
/// directories are skipped, directories sort before files (then
/// case-insensitively by name), and only files with a configured code
/// extension are listed.
pub fn scan_tree(root: &Path, config: &AppConfig) -> Result<ScanReport> {
    if !root.is_dir() {
        return Err(Error::Io {
            path: root.to_path_buf(),
            message: "not a directory".into(),
        });
    }

    let ignore_set = load_ignore_set(root, config);
    let root_name = root
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("root"))
        .to_string_lossy();

    let mut report = ScanReport {
        tree: format!("{}/\n", root_name),
        files: 0,
        dirs: 0,
        total_bytes: 0,
    };
    walk(root, root, "", &ignore_set, config, &mut report);
    Ok(report)
}

struct TreeEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
    size: u64,
}

fn walk(
    dir: &Path,
    base: &Path,
    prefix: &str,
    ignore_set: &GlobSet,
    config: &AppConfig,
    report: &mut ScanReport,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    let mut items: Vec<TreeEntry> = Vec::new();
    for entry in entries.flatten() {
        // DirEntry::file_type does not follow symlinks
        let ft = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };
        if ft.is_symlink() {
            continue;
        }

        let path = entry.path();
        let rel_path = match path.strip_prefix(base) {
            Ok(r) => r,
            Err(_) => continue,
        };
        if ignore_set.is_match(rel_path.to_string_lossy().as_ref()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if ft.is_dir() {
            items.push(TreeEntry {
                name,
                path,
                is_dir: true,
                size: 0,
            });
        } else if ft.is_file() {
            let listed = path
                .extension()
                .map(|e| config.code_extensions.contains(&e.to_string_lossy().to_lowercase()))
                .unwrap_or(false);
            if !listed {
                continue;
            }
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            items.push(TreeEntry {
                name,
                path,
                is_dir: false,
                size,
            });
        }
    }

    items.sort_by(|a, b| {
        (!a.is_dir)
            .cmp(&!b.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    let total = items.len();
    for (i, item) in items.into_iter().enumerate() {
        let is_last = i == total - 1;
        let connector = if is_last { "└── " } else { "├── " };
        if item.is_dir {
            report.dirs += 1;
            report.tree.push_str(&format!("{}{}{}/\n", prefix, connector, item.name));
            let child_prefix = if is_last {
                format!("{}    ", prefix)
            } else {
                format!("{}│   ", prefix)
            };
            walk(&item.path, base, &child_prefix, ignore_set, config, report);
        } else {
            report.files += 1;
            report.total_bytes += item.size;
            report.tree.push_str(&format!(
                "{}{}{} ({})\n",
                prefix,
                connector,
                item.name,
                format_size(item.size)
            ));
        }
    }
}

/// Human size suffix used in the listing.
pub fn format_size(bytes: u64) -> String {
    if bytes > 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn fixture() -> (tempfile::TempDir, AppConfig) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("src")).unwrap();
        fs::create_dir(root.join("node_modules")).unwrap();
        write_file(root, "README.md", "# readme\n");
        write_file(root, "data.bin", "\x00\x01");
        write_file(&root.join("src"), "main.rs", "fn main() {}\n");
        write_file(&root.join("src"), "lib.rs", "pub fn lib() {}\n");
        write_file(&root.join("node_modules"), "pkg.js", "module.exports = 1;\n");
        (dir, AppConfig::default())
    }

    #[test]
    fn listing_filters_ignored_dirs_and_unknown_extensions() {
        let (dir, config) = fixture();
        let report = scan_tree(dir.path(), &config).unwrap();

        assert!(report.tree.contains("src/"));
        assert!(report.tree.contains("main.rs"));
        assert!(report.tree.contains("README.md"));
        assert!(!report.tree.contains("node_modules"));
        assert!(!report.tree.contains("data.bin"));
        assert_eq!(report.files, 3);
        assert_eq!(report.dirs, 1);
        assert!(report.total_bytes > 0);
    }

    #[test]
    fn directories_sort_before_files() {
        let (dir, config) = fixture();
        let report = scan_tree(dir.path(), &config).unwrap();

        let src_line = report.tree.find("src/").unwrap();
        let readme_line = report.tree.find("README.md").unwrap();
        assert!(src_line < readme_line);
    }

    #[test]
    fn file_names_sort_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "Beta.md", "b");
        write_file(dir.path(), "alpha.md", "a");
        let report = scan_tree(dir.path(), &AppConfig::default()).unwrap();

        assert!(report.tree.find("alpha.md").unwrap() < report.tree.find("Beta.md").unwrap());
    }

    #[test]
    fn ignore_file_prunes_subtrees() {
        let (dir, config) = fixture();
        write_file(dir.path(), IGNORE_FILE, "# comment\n\nsrc/\n");
        let report = scan_tree(dir.path(), &config).unwrap();

        assert!(!report.tree.contains("main.rs"));
        assert_eq!(report.dirs, 0);
        assert_eq!(report.files, 1); // README.md only
    }

    #[test]
    fn tree_uses_connector_prefixes() {
        let (dir, config) = fixture();
        let report = scan_tree(dir.path(), &config).unwrap();

        assert!(report.tree.contains("├── ") || report.tree.contains("└── "));
        // src/ is the only directory and sorts first, so its children carry
        // the continuation prefix
        assert!(report.tree.contains("│   "));
    }

    #[test]
    fn scanning_a_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "only.rs", "fn f() {}");
        let err = scan_tree(&dir.path().join("only.rs"), &AppConfig::default());
        assert!(err.is_err());
    }

    #[test]
    fn size_suffixes() {
        assert_eq!(format_size(100), "100B");
        assert_eq!(format_size(1024), "1024B");
        assert_eq!(format_size(2048), "2.0KB");
    }
}
