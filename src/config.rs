use egui::Color32;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

pub const APP_NAME: &str = "CODEX";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application configuration, built once in `main` and passed to whichever
/// components need limits or file rules.
#[derive(Clone)]
pub struct AppConfig {
    pub window_title: String,
    pub window_size: [f32; 2],
    pub window_min_size: [f32; 2],

    /// Model id sent to the messages endpoint.
    pub model: String,
    /// Response budget for real requests.
    pub max_tokens: u32,
    /// Response budget for the connection probe.
    pub test_max_tokens: u32,
    pub request_timeout: Duration,

    /// Extensions (without the leading dot) shown by the project scanner.
    pub code_extensions: BTreeSet<String>,
    /// Directory names pruned by the project scanner.
    pub ignore_dirs: BTreeSet<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let code_extensions = [
            "py", "js", "jsx", "ts", "tsx", "java", "cpp", "c", "h", "cs", "php", "rb", "go",
            "rs", "swift", "kt", "html", "css", "scss", "sql", "json", "xml", "yaml", "yml",
            "md", "txt", "vue", "svelte",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let ignore_dirs = [
            ".git",
            "__pycache__",
            "node_modules",
            ".venv",
            "venv",
            "build",
            "dist",
            "target",
            ".idea",
            ".vscode",
            "env",
            ".pytest_cache",
            ".mypy_cache",
            "coverage",
            ".tox",
            "eggs",
            ".eggs",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            window_title: format!("{} - AI Code Assistant", APP_NAME),
            window_size: [1600.0, 1000.0],
            window_min_size: [1200.0, 800.0],
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 8000,
            test_max_tokens: 10,
            request_timeout: Duration::from_secs(120),
            code_extensions,
            ignore_dirs,
        }
    }
}

/// Accent colors used for the connection badge, notifications and warnings.
#[derive(Clone, Copy)]
pub struct Theme {
    pub accent: Color32,
    pub success: Color32,
    pub error: Color32,
    pub warning: Color32,
    pub text_muted: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color32::from_rgb(0x63, 0x66, 0xf1),
            success: Color32::from_rgb(0x10, 0xb9, 0x81),
            error: Color32::from_rgb(0xef, 0x44, 0x44),
            warning: Color32::from_rgb(0xf5, 0x9e, 0x0b),
            text_muted: Color32::from_rgb(0x94, 0xa3, 0xb8),
        }
    }
}

/// Fixed label used purely for grouping code segments in the generated prompt.
///
/// The declaration order is the order categories appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Database,
    Backend,
    Frontend,
    Models,
    Utils,
    Tests,
    Config,
    Docs,
    Api,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Database,
        Category::Backend,
        Category::Frontend,
        Category::Models,
        Category::Utils,
        Category::Tests,
        Category::Config,
        Category::Docs,
        Category::Api,
        Category::Other,
    ];

    /// Stable lowercase key.
    pub fn key(self) -> &'static str {
        match self {
            Category::Database => "database",
            Category::Backend => "backend",
            Category::Frontend => "frontend",
            Category::Models => "models",
            Category::Utils => "utils",
            Category::Tests => "tests",
            Category::Config => "config",
            Category::Docs => "docs",
            Category::Api => "api",
            Category::Other => "other",
        }
    }

    /// Name shown in the UI and in generated prompt headings.
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Database => "Database",
            Category::Backend => "Backend",
            Category::Frontend => "Frontend",
            Category::Models => "Models",
            Category::Utils => "Utilities",
            Category::Tests => "Tests",
            Category::Config => "Config",
            Category::Docs => "Docs",
            Category::Api => "API",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_have_unique_keys() {
        let keys: BTreeSet<_> = Category::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), Category::ALL.len());
    }

    #[test]
    fn category_order_is_declaration_order() {
        assert!(Category::Database < Category::Backend);
        assert!(Category::Api < Category::Other);
        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
    }

    #[test]
    fn default_config_covers_common_source_files() {
        let config = AppConfig::default();
        for ext in ["rs", "py", "ts", "md"] {
            assert!(config.code_extensions.contains(ext), "missing {ext}");
        }
        assert!(config.ignore_dirs.contains(".git"));
        assert!(config.ignore_dirs.contains("node_modules"));
        assert!(config.max_tokens > config.test_max_tokens);
    }
}
